use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::{admin_auth, admin_users};
use crate::state::AppState;

/// Routes mounted at `/admin`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(admin_auth::login))
        .route("/me", get(admin_auth::me))
        .route("/profile", put(admin_auth::update_profile))
        .route("/users", get(admin_users::list_users))
        .route("/users/{id}", delete(admin_users::delete_user))
}
