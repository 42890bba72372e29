//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- kind-bound JWT bearer-token generation and validation.

pub mod jwt;
pub mod password;
