pub mod admin_auth;
pub mod admin_users;
pub mod otp;
pub mod users;

use std::sync::OnceLock;

use happyhome_core::error::CoreError;
use happyhome_core::principal::PrincipalInfo;
use happyhome_core::types::DbId;
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use crate::auth::jwt::generate_token;
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types shared by both principal kinds
// ---------------------------------------------------------------------------

/// Request body for `POST /admin/login` and `POST /users/login`.
///
/// Fields default to empty so a missing field is reported as a validation
/// error rather than a body-parse rejection.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Successful authentication response returned by login and profile update.
#[derive(Debug, Serialize)]
pub struct AuthPayload {
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
    pub principal: PrincipalInfo,
}

/// Sign a fresh token for `principal`.
pub(crate) fn issue(state: &AppState, principal: PrincipalInfo) -> AppResult<AuthPayload> {
    let token = generate_token(principal.kind, principal.id, &principal.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;
    Ok(AuthPayload {
        token,
        expires_in: state.config.jwt.expires_in_secs(),
        principal,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Emails are matched case-insensitively and without surrounding whitespace.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Treat missing and blank optional fields the same way.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Normalized login credentials, or the shared 400 when either is missing.
pub(crate) fn login_credentials(input: &LoginRequest) -> AppResult<(String, &str)> {
    let email = normalize_email(&input.email);
    if email.is_empty() || input.password.is_empty() {
        return Err(CoreError::validation("Please provide an email and password").into());
    }
    Ok((email, input.password.as_str()))
}

/// Compare `password` with a stored hash; an unknown account and a wrong
/// password are indistinguishable to the caller.
pub(crate) fn check_password(password: &str, hash: &str, failure: &str) -> AppResult<()> {
    let valid = verify_password(password, hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !valid {
        return Err(CoreError::InvalidCredentials(failure.into()).into());
    }
    Ok(())
}

/// Hash verified against when a login email matches no account, so a miss
/// costs the same Argon2 work as a wrong password.
fn decoy_hash() -> &'static str {
    static DECOY: OnceLock<String> = OnceLock::new();
    DECOY.get_or_init(|| hash_password("happyhome-decoy-password").unwrap_or_default())
}

/// Login failure for an email with no account behind it.
pub(crate) fn unknown_account(password: &str) -> AppError {
    if let Err(e) = verify_password(password, decoy_hash()) {
        tracing::warn!(error = %e, "Decoy password check failed");
    }
    CoreError::InvalidCredentials("Invalid credentials".into()).into()
}

pub(crate) fn validate_email_format(email: &str) -> Result<(), String> {
    if email.validate_email() {
        Ok(())
    } else {
        Err("Please provide a valid email".to_string())
    }
}

pub(crate) fn hash(password: &str) -> AppResult<String> {
    hash_password(password).map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))
}

/// Password fields of a profile update, after the current-password check.
///
/// Returns the hash to store when a new password was requested.
pub(crate) fn password_change(
    state: &AppState,
    stored_hash: &str,
    current: Option<String>,
    new: Option<String>,
) -> AppResult<Option<String>> {
    let Some(new) = new else {
        return Ok(None);
    };
    let current = current.ok_or_else(|| CoreError::validation("Current password is required"))?;
    check_password(&current, stored_hash, "Current password is incorrect")?;
    validate_password_strength(&new, state.config.min_password_length)
        .map_err(CoreError::validation)?;
    Ok(Some(hash(&new)?))
}

/// Id of a principal that no longer exists mid-request.
pub(crate) fn gone(entity: &'static str, id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity, id })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_optional_fields_count_as_absent() {
        assert_eq!(non_empty(Some("  ".into())), None);
        assert_eq!(non_empty(None), None);
        assert_eq!(non_empty(Some(" Ada ".into())), Some("Ada".into()));
    }

    #[test]
    fn emails_are_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  A@X.com "), "a@x.com");
    }

    #[test]
    fn missing_login_field_is_a_validation_error() {
        let input = LoginRequest {
            email: "a@x.com".into(),
            password: String::new(),
        };
        let err = login_credentials(&input).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: Please provide an email and password"
        );
    }

    #[test]
    fn email_format_is_checked() {
        assert!(validate_email_format("a@x.com").is_ok());
        assert!(validate_email_format("not-an-email").is_err());
    }

    #[test]
    fn unknown_account_pays_for_a_real_verification() {
        assert!(decoy_hash().starts_with("$argon2id$"));
        assert_eq!(verify_password("test_password_123!", decoy_hash()), Ok(false));

        let err = unknown_account("test_password_123!");
        assert_eq!(err.to_string(), "Invalid credentials: Invalid credentials");
    }
}
