//! Handlers for admin authentication and the admin's own profile.

use axum::extract::State;
use axum::Json;
use happyhome_core::error::CoreError;
use happyhome_core::principal::PrincipalInfo;
use happyhome_db::models::admin::UpdateAdmin;
use serde::Deserialize;

use super::{
    check_password, gone, issue, login_credentials, non_empty, normalize_email, password_change,
    unknown_account, validate_email_format, AuthPayload, LoginRequest,
};
use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::auth::AuthAdmin;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Request body for `PUT /admin/profile`. Blank strings count as absent.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAdminProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// POST /api/v1/admin/login
pub async fn login(
    State(state): State<AppState>,
    AppJson(input): AppJson<LoginRequest>,
) -> AppResult<Json<ApiResponse<AuthPayload>>> {
    let (email, password) = login_credentials(&input)?;

    let Some(admin) = state.admins.find_by_email(&email).await? else {
        return Err(unknown_account(password));
    };
    check_password(password, &admin.password_hash, "Invalid credentials")?;

    tracing::info!(admin_id = %admin.id, "Admin logged in");
    Ok(Json(ApiResponse::data(issue(&state, admin.info())?)))
}

/// GET /api/v1/admin/me
pub async fn me(AuthAdmin { admin }: AuthAdmin) -> AppResult<Json<ApiResponse<PrincipalInfo>>> {
    Ok(Json(ApiResponse::data(admin.info())))
}

/// PUT /api/v1/admin/profile
///
/// Changing the password requires the current one. Returns a fresh token.
pub async fn update_profile(
    State(state): State<AppState>,
    AuthAdmin { admin }: AuthAdmin,
    AppJson(input): AppJson<UpdateAdminProfileRequest>,
) -> AppResult<Json<ApiResponse<AuthPayload>>> {
    let email = non_empty(input.email).map(|e| normalize_email(&e));
    if let Some(email) = &email {
        validate_email_format(email).map_err(CoreError::validation)?;
    }

    let password_hash = password_change(
        &state,
        &admin.password_hash,
        non_empty(input.current_password),
        non_empty(input.new_password),
    )?;

    let update = UpdateAdmin {
        name: non_empty(input.name),
        email,
        password_hash,
    };
    let updated = state
        .admins
        .update(admin.id, &update)
        .await?
        .ok_or_else(|| gone("Admin", admin.id))?;

    tracing::info!(
        admin_id = %updated.id,
        password_changed = update.password_hash.is_some(),
        "Admin profile updated"
    );
    Ok(Json(ApiResponse::with_message(
        issue(&state, updated.info())?,
        "Profile updated successfully",
    )))
}
