//! Asking the server whether a cached token is still accepted.

use std::time::Duration;

use async_trait::async_trait;
use happyhome_core::principal::PrincipalKind;
use happyhome_core::session::RemoteVerdict;
use reqwest::StatusCode;

use crate::error::SessionError;

/// Default request timeout for the `/me` round-trip.
pub const DEFAULT_VERIFY_TIMEOUT: Duration = Duration::from_secs(10);

#[async_trait]
pub trait RemoteVerifier: Send + Sync {
    /// Never fails: anything short of an explicit answer is
    /// [`RemoteVerdict::Unreachable`].
    async fn check(&self, kind: PrincipalKind, token: &str) -> RemoteVerdict;
}

/// Calls `GET {base_url}/api/v1/{admin|users}/me` with the bearer token.
pub struct HttpVerifier {
    client: reqwest::Client,
    base_url: String,
}

impl HttpVerifier {
    /// * `base_url` - server origin, e.g. `http://localhost:3000`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, SessionError> {
        Self::with_timeout(base_url, DEFAULT_VERIFY_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SessionError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Reuse an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn me_url(&self, kind: PrincipalKind) -> String {
        let resource = match kind {
            PrincipalKind::Admin => "admin",
            PrincipalKind::User => "users",
        };
        format!("{}/api/v1/{resource}/me", self.base_url)
    }
}

/// Map a `/me` response status onto a verdict.
pub fn verdict_for_status(status: StatusCode) -> RemoteVerdict {
    if status.is_success() {
        RemoteVerdict::Accepted
    } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        RemoteVerdict::Rejected
    } else {
        RemoteVerdict::Unreachable
    }
}

#[async_trait]
impl RemoteVerifier for HttpVerifier {
    async fn check(&self, kind: PrincipalKind, token: &str) -> RemoteVerdict {
        let url = self.me_url(kind);
        match self.client.get(&url).bearer_auth(token).send().await {
            Ok(response) => {
                let verdict = verdict_for_status(response.status());
                tracing::debug!(%url, status = %response.status(), ?verdict, "Session check answered");
                verdict
            }
            Err(e) => {
                tracing::warn!(%url, error = %e, "Session check failed, keeping session");
                RemoteVerdict::Unreachable
            }
        }
    }
}
