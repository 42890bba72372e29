//! Client-side session handling for HappyHome front ends.
//!
//! A client caches the token it got from login together with the principal
//! and the time the session started. [`SessionValidator::validate`] decides,
//! on each page load, whether that cached session is still usable:
//!
//! 1. Nothing cached: unauthenticated.
//! 2. Local window elapsed: clear, without asking the server.
//! 3. Otherwise ask the server's `/me` endpoint and act on the answer.
//!
//! The decision rules live in [`happyhome_core::session`]; this crate adds
//! storage and the HTTP round-trip.

pub mod error;
pub mod storage;
pub mod validator;
pub mod verifier;

pub use error::SessionError;
pub use storage::{FileSessionStorage, MemorySessionStorage, SessionStorage};
pub use validator::{SessionState, SessionValidator};
pub use verifier::{HttpVerifier, RemoteVerifier};
