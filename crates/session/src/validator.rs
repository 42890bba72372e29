//! Startup check of a cached session.

use std::sync::Arc;

use happyhome_core::principal::{PrincipalInfo, PrincipalKind};
use happyhome_core::session::{
    decide, settle, SessionAction, SessionDecision, SessionPolicy, SessionRecord,
};
use happyhome_core::types::Timestamp;

use crate::error::SessionError;
use crate::storage::SessionStorage;
use crate::verifier::RemoteVerifier;

/// What the client should render after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Authenticated(SessionRecord),
    Unauthenticated,
}

/// Validates and maintains the cached session for one principal kind.
pub struct SessionValidator {
    kind: PrincipalKind,
    storage: Arc<dyn SessionStorage>,
    verifier: Arc<dyn RemoteVerifier>,
    policy: SessionPolicy,
}

impl SessionValidator {
    pub fn new(
        kind: PrincipalKind,
        storage: Arc<dyn SessionStorage>,
        verifier: Arc<dyn RemoteVerifier>,
        policy: SessionPolicy,
    ) -> Self {
        Self {
            kind,
            storage,
            verifier,
            policy,
        }
    }

    pub fn kind(&self) -> PrincipalKind {
        self.kind
    }

    /// Run the full check against the cached session.
    pub async fn validate(&self, now: Timestamp) -> Result<SessionState, SessionError> {
        // A session cached for the other kind is not ours to use.
        let cached = self.storage.load().await?.filter(|s| s.kind == self.kind);

        let session = match decide(cached.as_ref(), now, &self.policy) {
            SessionDecision::Unauthenticated => return Ok(SessionState::Unauthenticated),
            SessionDecision::Expired => {
                tracing::info!(kind = %self.kind, "Session timed out locally, clearing");
                self.storage.clear().await?;
                return Ok(SessionState::Unauthenticated);
            }
            SessionDecision::Valid => {
                return Ok(cached.map_or(SessionState::Unauthenticated, SessionState::Authenticated))
            }
            SessionDecision::NeedsRemoteCheck => match cached {
                Some(session) => session,
                None => return Ok(SessionState::Unauthenticated),
            },
        };

        let verdict = self.verifier.check(self.kind, &session.token).await;
        match settle(verdict, &self.policy) {
            SessionAction::Refresh => {
                let refreshed = SessionRecord {
                    started_at: Some(now),
                    ..session
                };
                self.storage.save(&refreshed).await?;
                Ok(SessionState::Authenticated(refreshed))
            }
            SessionAction::Keep => {
                tracing::debug!(kind = %self.kind, ?verdict, "Keeping session");
                // A session with no start time starts its window now, so the
                // local timeout still fires while the server stays silent.
                if session.started_at.is_some() {
                    return Ok(SessionState::Authenticated(session));
                }
                let stamped = SessionRecord {
                    started_at: Some(now),
                    ..session
                };
                self.storage.save(&stamped).await?;
                Ok(SessionState::Authenticated(stamped))
            }
            SessionAction::Clear => {
                tracing::info!(kind = %self.kind, "Server rejected session token, clearing");
                self.storage.clear().await?;
                Ok(SessionState::Unauthenticated)
            }
        }
    }

    /// Cache a freshly issued token.
    pub async fn login(
        &self,
        principal: PrincipalInfo,
        token: String,
        now: Timestamp,
    ) -> Result<SessionRecord, SessionError> {
        let session = SessionRecord {
            kind: self.kind,
            principal,
            token,
            started_at: Some(now),
        };
        self.storage.save(&session).await?;
        Ok(session)
    }

    pub async fn logout(&self) -> Result<(), SessionError> {
        self.storage.clear().await
    }

    /// Swap in the token and principal returned by a profile update. The
    /// server just accepted the old token, so the window restarts.
    ///
    /// Returns `None` if nothing was cached.
    pub async fn replace_token(
        &self,
        principal: PrincipalInfo,
        token: String,
        now: Timestamp,
    ) -> Result<Option<SessionRecord>, SessionError> {
        let Some(current) = self.storage.load().await?.filter(|s| s.kind == self.kind) else {
            return Ok(None);
        };
        let updated = SessionRecord {
            principal,
            token,
            started_at: Some(now),
            ..current
        };
        self.storage.save(&updated).await?;
        Ok(Some(updated))
    }
}
