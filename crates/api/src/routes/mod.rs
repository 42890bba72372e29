pub mod admin;
pub mod health;
pub mod otp;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /admin/login                 admin login (public)
/// /admin/me                    current admin (admin token)
/// /admin/profile               update own profile (PUT, admin token)
/// /admin/users                 list users (admin token)
/// /admin/users/{id}            delete user (DELETE, admin token)
///
/// /users/register              register (public)
/// /users/login                 user login (public)
/// /users/me                    current user, delete own account (user token)
/// /users/profile               update own profile (PUT, user token)
///
/// /otp/send-otp                email a verification code (public)
/// /otp/verify-otp              check a verification code (public)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/admin", admin::router())
        .nest("/users", users::router())
        .nest("/otp", otp::router())
}
