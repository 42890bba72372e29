//! Handlers for the `/users` resource: registration, login and the
//! authenticated user's own account.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use happyhome_core::error::CoreError;
use happyhome_core::principal::PrincipalInfo;
use happyhome_core::roles::ROLE_USER;
use happyhome_db::models::user::{CreateUser, UpdateUser};
use serde::Deserialize;

use super::{
    check_password, gone, hash, issue, login_credentials, non_empty, normalize_email,
    password_change, unknown_account, validate_email_format, AuthPayload, LoginRequest,
};
use crate::auth::password::validate_password_strength;
use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /users/register`.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub phone: Option<String>,
}

/// Request body for `PUT /users/profile`. Blank strings count as absent.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/users/register
///
/// Creates the account but does not log it in.
pub async fn register(
    State(state): State<AppState>,
    AppJson(input): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<PrincipalInfo>>)> {
    let name = input.name.trim().to_string();
    let email = normalize_email(&input.email);

    let mut errors = Vec::new();
    if name.is_empty() {
        errors.push("Name is required".to_string());
    }
    if let Err(e) = validate_email_format(&email) {
        errors.push(e);
    }
    if let Err(e) = validate_password_strength(&input.password, state.config.min_password_length) {
        errors.push(e);
    }
    if !errors.is_empty() {
        return Err(CoreError::Validation(errors).into());
    }

    let user = state
        .users
        .create(&CreateUser {
            name,
            email,
            password_hash: hash(&input.password)?,
            phone: non_empty(input.phone),
            role: ROLE_USER.to_string(),
        })
        .await?;

    tracing::info!(user_id = %user.id, "User registered");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            user.info(),
            "Registration successful! Please log in.",
        )),
    ))
}

/// POST /api/v1/users/login
pub async fn login(
    State(state): State<AppState>,
    AppJson(input): AppJson<LoginRequest>,
) -> AppResult<Json<ApiResponse<AuthPayload>>> {
    let (email, password) = login_credentials(&input)?;

    let Some(user) = state.users.find_by_email(&email).await? else {
        return Err(unknown_account(password));
    };
    check_password(password, &user.password_hash, "Invalid credentials")?;

    tracing::info!(user_id = %user.id, "User logged in");
    Ok(Json(ApiResponse::data(issue(&state, user.info())?)))
}

/// GET /api/v1/users/me
pub async fn me(AuthUser { user }: AuthUser) -> AppResult<Json<ApiResponse<PrincipalInfo>>> {
    Ok(Json(ApiResponse::data(user.info())))
}

/// PUT /api/v1/users/profile
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
    AppJson(input): AppJson<UpdateUserProfileRequest>,
) -> AppResult<Json<ApiResponse<AuthPayload>>> {
    let email = non_empty(input.email).map(|e| normalize_email(&e));
    if let Some(email) = &email {
        validate_email_format(email).map_err(CoreError::validation)?;
    }

    let password_hash = password_change(
        &state,
        &user.password_hash,
        non_empty(input.current_password),
        non_empty(input.new_password),
    )?;

    let update = UpdateUser {
        name: non_empty(input.name),
        email,
        phone: non_empty(input.phone),
        password_hash,
    };
    let updated = state
        .users
        .update(user.id, &update)
        .await?
        .ok_or_else(|| gone("User", user.id))?;

    tracing::info!(
        user_id = %updated.id,
        password_changed = update.password_hash.is_some(),
        "User profile updated"
    );
    Ok(Json(ApiResponse::with_message(
        issue(&state, updated.info())?,
        "Profile updated successfully",
    )))
}

/// DELETE /api/v1/users/me
///
/// Outstanding tokens stop working immediately: every request re-resolves
/// the user.
pub async fn delete_me(
    State(state): State<AppState>,
    AuthUser { user }: AuthUser,
) -> AppResult<Json<ApiResponse<()>>> {
    if !state.users.delete(user.id).await? {
        return Err(gone("User", user.id));
    }
    tracing::info!(user_id = %user.id, "User deleted own account");
    Ok(Json(ApiResponse::message("Account deleted successfully")))
}
