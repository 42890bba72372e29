//! Client-side session policy.
//!
//! Pure logic: no storage and no network. The session crate loads the
//! cached record, asks [`decide`] what to do, performs the remote check if
//! needed, and applies [`settle`] to the verdict.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::principal::{PrincipalInfo, PrincipalKind};
use crate::types::Timestamp;

/// Default local session window (24 hours).
pub const DEFAULT_SESSION_TIMEOUT_SECS: i64 = 24 * 60 * 60;

/// What a client caches after a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub kind: PrincipalKind,
    pub principal: PrincipalInfo,
    pub token: String,
    /// When the session was started or last confirmed by the server.
    /// Missing values are treated as "now".
    #[serde(default)]
    pub started_at: Option<Timestamp>,
}

/// What to do with the cached session when the server explicitly rejects
/// its token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RejectionPolicy {
    /// Drop the local session; the user has to log in again.
    #[default]
    Clear,
    /// Keep the local session and leave `started_at` untouched.
    Keep,
}

#[derive(Debug, Clone)]
pub struct SessionPolicy {
    /// Local session window, independent of the token's own expiry.
    pub timeout: Duration,
    /// Skip the remote check while the last confirmation is younger than
    /// this. `None` checks on every validation.
    pub recheck_interval: Option<Duration>,
    pub on_rejection: RejectionPolicy,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::seconds(DEFAULT_SESSION_TIMEOUT_SECS),
            recheck_interval: None,
            on_rejection: RejectionPolicy::Clear,
        }
    }
}

impl SessionPolicy {
    /// Load the client session policy from environment variables.
    ///
    /// | Env Var                | Default        |
    /// |------------------------|----------------|
    /// | `SESSION_TIMEOUT_SECS` | `86400`        |
    /// | `SESSION_RECHECK_SECS` | unset (always) |
    /// | `SESSION_ON_REJECTION` | `clear`        |
    ///
    /// # Panics
    ///
    /// Panics if a variable is set but cannot be parsed.
    pub fn from_env() -> Self {
        let timeout_secs: i64 = std::env::var("SESSION_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_SESSION_TIMEOUT_SECS.to_string())
            .parse()
            .expect("SESSION_TIMEOUT_SECS must be a valid i64");

        let recheck_interval = std::env::var("SESSION_RECHECK_SECS").ok().map(|v| {
            Duration::seconds(v.parse().expect("SESSION_RECHECK_SECS must be a valid i64"))
        });

        let on_rejection = match std::env::var("SESSION_ON_REJECTION").as_deref() {
            Ok("keep") => RejectionPolicy::Keep,
            Ok("clear") | Err(_) => RejectionPolicy::Clear,
            Ok(other) => panic!("SESSION_ON_REJECTION must be 'clear' or 'keep', got '{other}'"),
        };

        Self {
            timeout: Duration::seconds(timeout_secs),
            recheck_interval,
            on_rejection,
        }
    }
}

/// Outcome of the local, offline part of validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionDecision {
    /// Nothing cached.
    Unauthenticated,
    /// Local window elapsed; clear without contacting the server.
    Expired,
    /// Confirmed recently enough to trust without a round-trip.
    Valid,
    NeedsRemoteCheck,
}

/// Result of asking the server whether the token is still accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteVerdict {
    Accepted,
    /// The server answered and refused the token (401/403).
    Rejected,
    /// No usable answer: connection failure, timeout or a server error.
    Unreachable,
}

/// What the client does with its cached session after a remote check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    /// Keep the session and slide `started_at` forward to now.
    Refresh,
    /// Keep the session as-is.
    Keep,
    Clear,
}

/// Decide, from local state only, whether the cached session can be used.
pub fn decide(
    session: Option<&SessionRecord>,
    now: Timestamp,
    policy: &SessionPolicy,
) -> SessionDecision {
    let Some(session) = session.filter(|s| !s.token.is_empty()) else {
        return SessionDecision::Unauthenticated;
    };

    let started_at = session.started_at.unwrap_or(now);
    let elapsed = now - started_at;
    if elapsed > policy.timeout {
        return SessionDecision::Expired;
    }

    match (session.started_at, policy.recheck_interval) {
        (Some(_), Some(interval)) if elapsed < interval => SessionDecision::Valid,
        _ => SessionDecision::NeedsRemoteCheck,
    }
}

/// Map the server's verdict onto a local action.
pub fn settle(verdict: RemoteVerdict, policy: &SessionPolicy) -> SessionAction {
    match verdict {
        RemoteVerdict::Accepted => SessionAction::Refresh,
        RemoteVerdict::Rejected => match policy.on_rejection {
            RejectionPolicy::Clear => SessionAction::Clear,
            RejectionPolicy::Keep => SessionAction::Keep,
        },
        RemoteVerdict::Unreachable => SessionAction::Keep,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn record(started_at: Option<Timestamp>) -> SessionRecord {
        SessionRecord {
            kind: PrincipalKind::User,
            principal: PrincipalInfo {
                id: uuid::Uuid::nil(),
                kind: PrincipalKind::User,
                name: "Ada".into(),
                email: "a@x.com".into(),
                role: "user".into(),
                phone: None,
            },
            token: "token".into(),
            started_at,
        }
    }

    fn policy_hours(hours: i64) -> SessionPolicy {
        SessionPolicy {
            timeout: Duration::hours(hours),
            ..SessionPolicy::default()
        }
    }

    #[test]
    fn nothing_cached_is_unauthenticated() {
        let now = Utc::now();
        assert_eq!(
            decide(None, now, &SessionPolicy::default()),
            SessionDecision::Unauthenticated
        );

        let mut empty = record(Some(now));
        empty.token.clear();
        assert_eq!(
            decide(Some(&empty), now, &SessionPolicy::default()),
            SessionDecision::Unauthenticated
        );
    }

    #[test]
    fn local_timeout_wins_over_remote_check() {
        let now = Utc::now();
        let session = record(Some(now - Duration::hours(2)));
        assert_eq!(
            decide(Some(&session), now, &policy_hours(1)),
            SessionDecision::Expired
        );
    }

    #[test]
    fn missing_start_resets_the_clock() {
        let session = record(None);
        assert_eq!(
            decide(Some(&session), Utc::now(), &policy_hours(1)),
            SessionDecision::NeedsRemoteCheck
        );
    }

    #[test]
    fn fresh_session_needs_remote_check_by_default() {
        let now = Utc::now();
        let session = record(Some(now - Duration::minutes(5)));
        assert_eq!(
            decide(Some(&session), now, &policy_hours(1)),
            SessionDecision::NeedsRemoteCheck
        );
    }

    #[test]
    fn recently_confirmed_session_is_valid_within_recheck_interval() {
        let now = Utc::now();
        let policy = SessionPolicy {
            recheck_interval: Some(Duration::minutes(15)),
            ..policy_hours(1)
        };

        let recent = record(Some(now - Duration::minutes(5)));
        assert_eq!(decide(Some(&recent), now, &policy), SessionDecision::Valid);

        let older = record(Some(now - Duration::minutes(20)));
        assert_eq!(
            decide(Some(&older), now, &policy),
            SessionDecision::NeedsRemoteCheck
        );
    }

    #[test]
    fn settle_follows_rejection_policy() {
        let clear = SessionPolicy::default();
        let keep = SessionPolicy {
            on_rejection: RejectionPolicy::Keep,
            ..SessionPolicy::default()
        };

        assert_eq!(settle(RemoteVerdict::Accepted, &clear), SessionAction::Refresh);
        assert_eq!(settle(RemoteVerdict::Rejected, &clear), SessionAction::Clear);
        assert_eq!(settle(RemoteVerdict::Rejected, &keep), SessionAction::Keep);
        assert_eq!(settle(RemoteVerdict::Unreachable, &clear), SessionAction::Keep);
    }
}
