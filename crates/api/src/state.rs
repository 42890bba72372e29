use std::sync::Arc;

use happyhome_core::otp::OtpService;
use happyhome_db::store::{AdminStore, UserStore};

use crate::config::ServerConfig;
use crate::mail::Mailer;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: every field is behind an `Arc` or is itself `Arc`-backed.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Admin principals.
    pub admins: Arc<dyn AdminStore>,
    /// User principals.
    pub users: Arc<dyn UserStore>,
    /// Pending email verification codes.
    pub otp: OtpService,
    pub mailer: Arc<dyn Mailer>,
}
