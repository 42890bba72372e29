//! Admin-only user management.

use axum::extract::State;
use axum::Json;
use happyhome_core::error::CoreError;
use happyhome_core::roles::ROLE_ADMIN;
use happyhome_core::types::DbId;
use happyhome_db::models::user::UserResponse;

use super::gone;
use crate::error::AppResult;
use crate::extract::AppPath;
use crate::middleware::rbac::RequireAdmin;
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/admin/users
///
/// All users, newest first.
pub async fn list_users(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> AppResult<Json<ApiResponse<Vec<UserResponse>>>> {
    let users = state.users.list().await?;
    Ok(Json(ApiResponse::data(
        users.iter().map(UserResponse::from).collect(),
    )))
}

/// DELETE /api/v1/admin/users/{id}
///
/// Removes the user together with their reviews and wishlists. Admin
/// accounts can never be deleted here, whichever store they live in.
pub async fn delete_user(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<ApiResponse<()>>> {
    if state.admins.find_by_id(id).await?.is_some() {
        return Err(CoreError::validation("Cannot delete admin accounts").into());
    }

    let user = state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| gone("User", id))?;
    if user.role == ROLE_ADMIN {
        return Err(CoreError::validation("Cannot delete admin accounts").into());
    }

    if !state.users.delete(id).await? {
        return Err(gone("User", id));
    }

    tracing::info!(user_id = %id, admin_id = %auth.admin.id, "User deleted by admin");
    Ok(Json(ApiResponse::message("User deleted successfully")))
}
