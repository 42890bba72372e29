//! Domain building blocks shared by the HappyHome server and client crates.
//!
//! Nothing in here touches the network or the database: the OTP service
//! talks to an injected [`otp::OtpStore`], and session decisions are pure
//! functions of the cached record and the current time.

pub mod error;
pub mod otp;
pub mod principal;
pub mod roles;
pub mod session;
pub mod types;
