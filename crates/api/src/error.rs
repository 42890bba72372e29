use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use happyhome_core::error::{CoreError, ErrorKind};
use happyhome_core::otp::OtpError;
use happyhome_db::store::StoreError;
use serde_json::json;

/// Message shown to clients in place of internal failure details.
const SANITIZED_MESSAGE: &str = "An internal error occurred";

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`StoreError`] for persistence
/// failures, and adds HTTP-specific variants. Implements [`IntoResponse`] to
/// produce the `{ success: false, error, code, details }` envelope.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `happyhome_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A principal store failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<OtpError> for AppError {
    fn from(err: OtpError) -> Self {
        Self::Core(CoreError::Otp(err))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidCredentials | ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::Validation
        | ErrorKind::Conflict
        | ErrorKind::OtpNotFound
        | ErrorKind::Expired
        | ErrorKind::InvalidCode => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        ErrorKind::ServiceError | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut retry_after = None;

        let (status, code, details) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => {
                let kind = core.kind();
                let details = match core {
                    CoreError::Internal(msg) => {
                        tracing::error!(error = %msg, "Internal core error");
                        vec![SANITIZED_MESSAGE.to_string()]
                    }
                    CoreError::Otp(OtpError::Store(msg)) => {
                        tracing::error!(error = %msg, "OTP store error");
                        vec![SANITIZED_MESSAGE.to_string()]
                    }
                    CoreError::Otp(OtpError::RateLimited { retry_after_secs }) => {
                        retry_after = Some(*retry_after_secs);
                        core.details()
                    }
                    CoreError::Service(msg) => {
                        tracing::error!(error = %msg, "Downstream service error");
                        core.details()
                    }
                    _ => core.details(),
                };
                (status_for(kind), kind.code(), details)
            }

            // --- Store errors ---
            AppError::Store(StoreError::Duplicate { field }) => {
                tracing::debug!(field, "Duplicate value rejected");
                (
                    StatusCode::BAD_REQUEST,
                    ErrorKind::Conflict.code(),
                    vec!["Email already in use".to_string()],
                )
            }
            AppError::Store(StoreError::Database(err)) => {
                tracing::error!(error = %err, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorKind::Internal.code(),
                    vec![SANITIZED_MESSAGE.to_string()],
                )
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => {
                tracing::debug!(error = %msg, "Malformed request");
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", vec![msg.clone()])
            }
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorKind::Internal.code(),
                    vec![SANITIZED_MESSAGE.to_string()],
                )
            }
        };

        let body = json!({
            "success": false,
            "error": details.join("; "),
            "code": code,
            "details": details,
        });

        let mut response = (status, axum::Json(body)).into_response();
        if let Some(secs) = retry_after {
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}
