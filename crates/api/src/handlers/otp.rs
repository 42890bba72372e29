//! Email verification codes for the registration form.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use happyhome_core::error::CoreError;
use serde::Deserialize;

use super::normalize_email;
use crate::error::AppResult;
use crate::extract::AppJson;
use crate::mail::otp_email;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SendOtpRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub otp: String,
}

/// POST /api/v1/otp/send-otp
///
/// Issues a fresh code (replacing any pending one) and mails it. If the mail
/// cannot be delivered the code is withdrawn again.
pub async fn send_otp(
    State(state): State<AppState>,
    AppJson(input): AppJson<SendOtpRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    let email = normalize_email(&input.email);
    if email.is_empty() {
        return Err(CoreError::validation("Email is required").into());
    }

    let record = state.otp.issue(&email, Utc::now()).await?;
    let message = otp_email(&email, &record.code, state.otp.config().ttl_minutes());

    if let Err(e) = state.mailer.send(&message).await {
        tracing::error!(error = %e, email = %email, "Failed to deliver OTP email");
        state.otp.withdraw(&email, &record).await?;
        return Err(CoreError::Service("Failed to send OTP. Please try again.".into()).into());
    }

    Ok(Json(ApiResponse::message("OTP sent to email successfully")))
}

/// POST /api/v1/otp/verify-otp
pub async fn verify_otp(
    State(state): State<AppState>,
    AppJson(input): AppJson<VerifyOtpRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    let email = normalize_email(&input.email);
    let code = input.otp.trim();
    if email.is_empty() || code.is_empty() {
        return Err(CoreError::validation("Email and OTP are required").into());
    }

    state.otp.verify(&email, code, Utc::now()).await?;
    Ok(Json(ApiResponse::message("Email verified successfully")))
}
