//! Bearer-token extractors for Axum handlers.
//!
//! Each extractor validates the token for its own principal kind and then
//! re-resolves the principal from its store, so a deleted account stops
//! authenticating even though its token is still correctly signed.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use happyhome_core::error::CoreError;
use happyhome_core::principal::PrincipalKind;
use happyhome_db::models::admin::Admin;
use happyhome_db::models::user::User;

use crate::auth::jwt::{validate_token, Claims};
use crate::error::AppError;
use crate::state::AppState;

fn unauthenticated(msg: &str) -> AppError {
    AppError::Core(CoreError::Unauthenticated(msg.into()))
}

/// Pull the bearer token out of the `Authorization` header and validate it
/// for `kind`.
fn bearer_claims(parts: &Parts, state: &AppState, kind: PrincipalKind) -> Result<Claims, AppError> {
    let token = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| unauthenticated("No token provided"))?;

    validate_token(token, kind, &state.config.jwt).map_err(|e| {
        tracing::debug!(error = %e, kind = %kind, "Bearer token rejected");
        unauthenticated("Token is invalid or expired")
    })
}

/// Authenticated admin, resolved from the admin store.
///
/// ```ignore
/// async fn me(AuthAdmin { admin }: AuthAdmin) -> AppResult<Json<ApiResponse<PrincipalInfo>>> {
///     Ok(Json(ApiResponse::data(admin.info())))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthAdmin {
    pub admin: Admin,
}

impl FromRequestParts<AppState> for AuthAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = bearer_claims(parts, state, PrincipalKind::Admin)?;
        let admin = state
            .admins
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| unauthenticated("Account not found"))?;
        Ok(AuthAdmin { admin })
    }
}

/// Authenticated user, resolved from the user store.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = bearer_claims(parts, state, PrincipalKind::User)?;
        let user = state
            .users
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| unauthenticated("Account not found"))?;
        Ok(AuthUser { user })
    }
}
