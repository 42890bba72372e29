//! Role-based access control.
//!
//! Authentication resolves *who* is calling; these guards decide whether that
//! principal's role may use the route.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use happyhome_core::error::CoreError;
use happyhome_core::roles::ROLE_ADMIN;

use super::auth::AuthAdmin;
use crate::error::AppError;
use crate::state::AppState;

/// Reject with 403 unless `role` is one of `allowed`.
pub fn require_role(role: &str, allowed: &[&str]) -> Result<(), AppError> {
    if allowed.contains(&role) {
        return Ok(());
    }
    Err(AppError::Core(CoreError::Forbidden(format!(
        "User role {role} is not authorized to access this route"
    ))))
}

/// Authenticated admin whose role is `admin`. Rejects with 403 otherwise.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(auth): RequireAdmin) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthAdmin);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = AuthAdmin::from_request_parts(parts, state).await?;
        require_role(&auth.admin.info().role, &[ROLE_ADMIN])?;
        Ok(RequireAdmin(auth))
    }
}
