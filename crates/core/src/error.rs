use crate::otp::OtpError;
use crate::types::DbId;

/// Domain-level failure shared by every layer above the stores.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error(transparent)]
    Otp(#[from] OtpError),

    /// A downstream collaborator (mail transport) failed. The message is
    /// user-facing.
    #[error("Service error: {0}")]
    Service(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a single-message validation failure.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(vec![msg.into()])
    }

    /// The tag rendered into the `code` field of error responses.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::InvalidCredentials(_) => ErrorKind::InvalidCredentials,
            Self::Unauthenticated(_) => ErrorKind::Unauthenticated,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::Otp(otp) => otp.kind(),
            Self::Service(_) => ErrorKind::ServiceError,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Human-readable messages for the response body.
    ///
    /// Validation failures can carry several messages; everything else has
    /// exactly one.
    pub fn details(&self) -> Vec<String> {
        match self {
            Self::NotFound { entity, id } => vec![format!("{entity} with id {id} not found")],
            Self::Validation(msgs) => msgs.clone(),
            Self::Conflict(msg)
            | Self::InvalidCredentials(msg)
            | Self::Unauthenticated(msg)
            | Self::Forbidden(msg)
            | Self::Service(msg)
            | Self::Internal(msg) => vec![msg.clone()],
            Self::Otp(otp) => vec![otp.to_string()],
        }
    }
}

/// Closed set of failure categories exposed to API clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidCredentials,
    Unauthenticated,
    Forbidden,
    Validation,
    Conflict,
    NotFound,
    OtpNotFound,
    Expired,
    InvalidCode,
    RateLimited,
    ServiceError,
    Internal,
}

impl ErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Forbidden => "FORBIDDEN",
            Self::Validation => "VALIDATION_ERROR",
            Self::Conflict => "CONFLICT",
            Self::NotFound => "NOT_FOUND",
            Self::OtpNotFound => "OTP_NOT_FOUND",
            Self::Expired => "OTP_EXPIRED",
            Self::InvalidCode => "INVALID_OTP",
            Self::RateLimited => "RATE_LIMITED",
            Self::ServiceError => "SERVICE_ERROR",
            Self::Internal => "INTERNAL_ERROR",
        }
    }
}
