//! Well-known role name constants.
//!
//! These must match the `CHECK` constraint on `users.role` in
//! `20250301000002_create_users_table.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";
