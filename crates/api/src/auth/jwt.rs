//! Bearer-token generation and validation.
//!
//! Tokens are HS256-signed JWTs carrying a [`Claims`] payload. Every token
//! names the principal kind it was issued for, and validation rejects a token
//! presented at an endpoint for the other kind even when the signature is
//! good. Admin tokens can additionally be signed with their own secret.
//!
//! Tokens are stateless: there is no revocation list. Deleting the principal
//! is the only way to invalidate an outstanding token early.

use happyhome_core::principal::PrincipalKind;
use happyhome_core::types::DbId;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims embedded in every bearer token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the principal's id within its own store.
    pub sub: DbId,
    /// Which store `sub` refers to.
    pub kind: PrincipalKind,
    /// The principal's role name (e.g. `"admin"`, `"user"`).
    pub role: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Unique token identifier (UUID v4) for audit.
    pub jti: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Token was issued for {found} principals, expected {expected}")]
    KindMismatch {
        expected: PrincipalKind,
        found: PrincipalKind,
    },
}

/// Configuration for token generation and validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret for user tokens.
    pub user_secret: String,
    /// HMAC-SHA256 secret for admin tokens.
    pub admin_secret: String,
    /// Token lifetime in days (default: 30).
    pub expiry_days: i64,
}

/// Default token expiry in days.
const DEFAULT_EXPIRY_DAYS: i64 = 30;

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var            | Required | Default        |
    /// |--------------------|----------|----------------|
    /// | `JWT_SECRET`       | **yes**  | --             |
    /// | `JWT_ADMIN_SECRET` | no       | `JWT_SECRET`   |
    /// | `JWT_EXPIRY_DAYS`  | no       | `30`           |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is not set or is empty.
    pub fn from_env() -> Self {
        let user_secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!user_secret.is_empty(), "JWT_SECRET must not be empty");

        let admin_secret = std::env::var("JWT_ADMIN_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| user_secret.clone());

        let expiry_days: i64 = std::env::var("JWT_EXPIRY_DAYS")
            .unwrap_or_else(|_| DEFAULT_EXPIRY_DAYS.to_string())
            .parse()
            .expect("JWT_EXPIRY_DAYS must be a valid i64");

        Self {
            user_secret,
            admin_secret,
            expiry_days,
        }
    }

    /// Token lifetime in seconds, as reported to clients.
    pub fn expires_in_secs(&self) -> i64 {
        self.expiry_days * 24 * 60 * 60
    }

    fn secret_for(&self, kind: PrincipalKind) -> &[u8] {
        match kind {
            PrincipalKind::Admin => self.admin_secret.as_bytes(),
            PrincipalKind::User => self.user_secret.as_bytes(),
        }
    }
}

/// Generate an HS256 token for the given principal.
pub fn generate_token(
    kind: PrincipalKind,
    principal_id: DbId,
    role: &str,
    config: &JwtConfig,
) -> Result<String, TokenError> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: principal_id,
        kind,
        role: role.to_string(),
        exp: now + config.expires_in_secs(),
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    Ok(encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.secret_for(kind)),
    )?)
}

/// Validate a token presented at an endpoint for `expected` principals.
///
/// Checks the signature with that kind's secret, the expiry with no leeway,
/// and the `kind` claim.
pub fn validate_token(
    token: &str,
    expected: PrincipalKind,
    config: &JwtConfig,
) -> Result<Claims, TokenError> {
    let mut validation = Validation::default(); // HS256, validates exp
    validation.leeway = 0;

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret_for(expected)),
        &validation,
    )?
    .claims;

    if claims.kind != expected {
        return Err(TokenError::KindMismatch {
            expected,
            found: claims.kind,
        });
    }
    Ok(claims)
}
