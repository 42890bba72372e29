use axum::routing::post;
use axum::Router;

use crate::handlers::otp;
use crate::state::AppState;

/// Routes mounted at `/otp`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/send-otp", post(otp::send_otp))
        .route("/verify-otp", post(otp::verify_otp))
}
