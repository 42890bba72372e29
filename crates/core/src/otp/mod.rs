//! Email-ownership verification with short-lived numeric codes.
//!
//! Per email there is at most one pending code. [`OtpService::issue`]
//! overwrites whatever was pending, and [`OtpService::verify`] consumes the
//! record on success. Expired records are only cleaned up when somebody
//! tries to verify them.
//!
//! Verification is deliberately not tied to account creation: a successful
//! verify only tells the registration form that the email may proceed.

pub mod code;
pub mod store;

use std::sync::Arc;

use chrono::Duration;

use crate::types::Timestamp;

pub use code::{CodeGenerator, RandomCodeGenerator};
pub use store::{InMemoryOtpStore, OtpStore};

/// Default code lifetime in minutes.
const DEFAULT_TTL_MINS: i64 = 10;
/// Default minimum gap between two sends for the same email, in seconds.
const DEFAULT_RESEND_COOLDOWN_SECS: i64 = 30;

/// A pending code for one email address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpRecord {
    pub code: String,
    pub issued_at: Timestamp,
    pub expires_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OtpError {
    #[error("No OTP found for this email. Please request a new one.")]
    NotFound,

    #[error("OTP has expired. Please request a new one.")]
    Expired,

    #[error("Invalid OTP. Please try again.")]
    InvalidCode,

    #[error("Please wait {retry_after_secs} seconds before requesting a new code.")]
    RateLimited { retry_after_secs: i64 },

    #[error("OTP store error: {0}")]
    Store(String),
}

impl OtpError {
    pub fn kind(&self) -> crate::error::ErrorKind {
        use crate::error::ErrorKind;
        match self {
            Self::NotFound => ErrorKind::OtpNotFound,
            Self::Expired => ErrorKind::Expired,
            Self::InvalidCode => ErrorKind::InvalidCode,
            Self::RateLimited { .. } => ErrorKind::RateLimited,
            Self::Store(_) => ErrorKind::Internal,
        }
    }
}

/// Lifetime and throttling knobs for issued codes.
#[derive(Debug, Clone)]
pub struct OtpConfig {
    /// How long a code stays valid after it is issued.
    pub ttl: Duration,
    /// Minimum gap between sends for the same email. Zero disables the check.
    pub resend_cooldown: Duration,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::minutes(DEFAULT_TTL_MINS),
            resend_cooldown: Duration::seconds(DEFAULT_RESEND_COOLDOWN_SECS),
        }
    }
}

impl OtpConfig {
    /// Load OTP configuration from environment variables.
    ///
    /// | Env Var                    | Default |
    /// |----------------------------|---------|
    /// | `OTP_TTL_MINS`             | `10`    |
    /// | `OTP_RESEND_COOLDOWN_SECS` | `30`    |
    ///
    /// # Panics
    ///
    /// Panics if either variable is set but not a valid integer.
    pub fn from_env() -> Self {
        let ttl_mins: i64 = std::env::var("OTP_TTL_MINS")
            .unwrap_or_else(|_| DEFAULT_TTL_MINS.to_string())
            .parse()
            .expect("OTP_TTL_MINS must be a valid i64");

        let cooldown_secs: i64 = std::env::var("OTP_RESEND_COOLDOWN_SECS")
            .unwrap_or_else(|_| DEFAULT_RESEND_COOLDOWN_SECS.to_string())
            .parse()
            .expect("OTP_RESEND_COOLDOWN_SECS must be a valid i64");

        Self {
            ttl: Duration::minutes(ttl_mins),
            resend_cooldown: Duration::seconds(cooldown_secs.max(0)),
        }
    }

    /// Code lifetime in whole minutes, for the email body.
    pub fn ttl_minutes(&self) -> i64 {
        self.ttl.num_minutes()
    }
}

/// Issues and checks verification codes against an [`OtpStore`].
#[derive(Clone)]
pub struct OtpService {
    store: Arc<dyn OtpStore>,
    codes: Arc<dyn CodeGenerator>,
    config: OtpConfig,
}

impl OtpService {
    pub fn new(store: Arc<dyn OtpStore>, codes: Arc<dyn CodeGenerator>, config: OtpConfig) -> Self {
        Self {
            store,
            codes,
            config,
        }
    }

    /// In-memory store with random codes.
    pub fn in_memory(config: OtpConfig) -> Self {
        Self::new(
            Arc::new(InMemoryOtpStore::new()),
            Arc::new(RandomCodeGenerator),
            config,
        )
    }

    pub fn config(&self) -> &OtpConfig {
        &self.config
    }

    /// Generate and store a fresh code for `email`, replacing any pending one.
    ///
    /// The caller mails the returned code. Fails with
    /// [`OtpError::RateLimited`] when the previous code for this email was
    /// issued less than `resend_cooldown` ago.
    pub async fn issue(&self, email: &str, now: Timestamp) -> Result<OtpRecord, OtpError> {
        let record = OtpRecord {
            code: self.codes.generate(),
            issued_at: now,
            expires_at: now + self.config.ttl,
        };

        let cooldown = self.config.resend_cooldown;
        if let Some(existing) = self
            .store
            .put_unless_recent(email, record.clone(), cooldown)
            .await?
        {
            let wait = (existing.issued_at + cooldown - now).num_seconds().max(1);
            tracing::debug!(email, retry_after_secs = wait, "OTP resend throttled");
            return Err(OtpError::RateLimited {
                retry_after_secs: wait,
            });
        }

        tracing::debug!(email, expires_at = %record.expires_at, "OTP issued");
        Ok(record)
    }

    /// Drop a record previously returned by [`issue`](Self::issue), unless a
    /// newer one has replaced it. Used when the code could not be delivered.
    pub async fn withdraw(&self, email: &str, issued: &OtpRecord) -> Result<(), OtpError> {
        self.store.remove_if(email, issued).await?;
        Ok(())
    }

    /// Check `submitted` against the pending code for `email`.
    ///
    /// A mismatch leaves the record in place so the user can retype within
    /// the remaining window. An expired record is removed as a side effect.
    pub async fn verify(&self, email: &str, submitted: &str, now: Timestamp) -> Result<(), OtpError> {
        let record = self.store.get(email).await?.ok_or(OtpError::NotFound)?;

        if now > record.expires_at {
            self.store.remove_if(email, &record).await?;
            return Err(OtpError::Expired);
        }

        if record.code != submitted {
            return Err(OtpError::InvalidCode);
        }

        // A concurrent send may have replaced the record after we read it;
        // the code the user typed then belongs to a superseded record.
        if !self.store.remove_if(email, &record).await? {
            return Err(OtpError::InvalidCode);
        }

        tracing::debug!(email, "OTP verified");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use assert_matches::assert_matches;
    use chrono::Utc;

    use super::*;

    /// Hands out the given codes in order, repeating the last one.
    struct ScriptedCodes {
        codes: Vec<&'static str>,
        next: AtomicUsize,
    }

    impl ScriptedCodes {
        fn new(codes: Vec<&'static str>) -> Self {
            Self {
                codes,
                next: AtomicUsize::new(0),
            }
        }
    }

    impl CodeGenerator for ScriptedCodes {
        fn generate(&self) -> String {
            let i = self.next.fetch_add(1, Ordering::SeqCst);
            self.codes[i.min(self.codes.len() - 1)].to_string()
        }
    }

    fn service(codes: Vec<&'static str>, cooldown_secs: i64) -> (OtpService, Arc<InMemoryOtpStore>) {
        let store = Arc::new(InMemoryOtpStore::new());
        let config = OtpConfig {
            ttl: Duration::minutes(10),
            resend_cooldown: Duration::seconds(cooldown_secs),
        };
        let svc = OtpService::new(store.clone(), Arc::new(ScriptedCodes::new(codes)), config);
        (svc, store)
    }

    #[tokio::test]
    async fn correct_code_verifies_exactly_once() {
        let (svc, _) = service(vec!["123456"], 0);
        let now = Utc::now();

        let issued = svc.issue("a@x.com", now).await.unwrap();
        assert_eq!(issued.code, "123456");
        assert_eq!(issued.expires_at, now + Duration::minutes(10));

        svc.verify("a@x.com", "123456", now + Duration::minutes(1))
            .await
            .unwrap();
        let again = svc.verify("a@x.com", "123456", now + Duration::minutes(1)).await;
        assert_eq!(again, Err(OtpError::NotFound));
    }

    #[tokio::test]
    async fn wrong_code_does_not_consume_record() {
        let (svc, _) = service(vec!["123456"], 0);
        let now = Utc::now();
        svc.issue("a@x.com", now).await.unwrap();

        assert_eq!(
            svc.verify("a@x.com", "654321", now).await,
            Err(OtpError::InvalidCode)
        );
        assert!(svc.verify("a@x.com", "123456", now).await.is_ok());
    }

    #[tokio::test]
    async fn expired_code_is_rejected_and_removed() {
        let (svc, store) = service(vec!["123456"], 0);
        let now = Utc::now();
        svc.issue("a@x.com", now).await.unwrap();

        let late = now + Duration::minutes(10) + Duration::seconds(1);
        assert_eq!(
            svc.verify("a@x.com", "123456", late).await,
            Err(OtpError::Expired)
        );
        assert!(store.is_empty().await);
        assert_eq!(
            svc.verify("a@x.com", "123456", late).await,
            Err(OtpError::NotFound)
        );
    }

    #[tokio::test]
    async fn code_is_still_valid_at_the_expiry_instant() {
        let (svc, _) = service(vec!["123456"], 0);
        let now = Utc::now();
        svc.issue("a@x.com", now).await.unwrap();

        assert!(svc
            .verify("a@x.com", "123456", now + Duration::minutes(10))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn resend_invalidates_previous_code() {
        let (svc, _) = service(vec!["111111", "222222"], 30);
        let now = Utc::now();
        svc.issue("a@x.com", now).await.unwrap();
        svc.issue("a@x.com", now + Duration::seconds(31)).await.unwrap();

        let at = now + Duration::seconds(40);
        assert_eq!(
            svc.verify("a@x.com", "111111", at).await,
            Err(OtpError::InvalidCode)
        );
        assert!(svc.verify("a@x.com", "222222", at).await.is_ok());
    }

    #[tokio::test]
    async fn resend_within_cooldown_is_throttled() {
        let (svc, _) = service(vec!["111111", "222222"], 30);
        let now = Utc::now();
        svc.issue("a@x.com", now).await.unwrap();

        let result = svc.issue("a@x.com", now + Duration::seconds(10)).await;
        assert_matches!(result, Err(OtpError::RateLimited { retry_after_secs: 20 }));

        // The first code survives the throttled attempt.
        assert!(svc
            .verify("a@x.com", "111111", now + Duration::seconds(10))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn cooldown_is_per_email() {
        let (svc, _) = service(vec!["111111"], 30);
        let now = Utc::now();
        svc.issue("a@x.com", now).await.unwrap();
        assert!(svc.issue("b@x.com", now).await.is_ok());
    }

    #[tokio::test]
    async fn withdraw_removes_only_the_issued_record() {
        let (svc, store) = service(vec!["111111", "222222"], 0);
        let now = Utc::now();
        let first = svc.issue("a@x.com", now).await.unwrap();
        svc.issue("a@x.com", now).await.unwrap();

        svc.withdraw("a@x.com", &first).await.unwrap();
        assert_eq!(store.len().await, 1);

        let second = store.get("a@x.com").await.unwrap().unwrap();
        svc.withdraw("a@x.com", &second).await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_sends_within_cooldown_issue_one_code() {
        let (svc, store) = service(vec!["111111", "222222", "333333"], 30);
        let now = Utc::now();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let svc = svc.clone();
                tokio::spawn(async move { svc.issue("a@x.com", now).await })
            })
            .collect();

        let mut issued = Vec::new();
        let mut throttled = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(record) => issued.push(record),
                Err(OtpError::RateLimited { retry_after_secs }) => {
                    assert_eq!(retry_after_secs, 30);
                    throttled += 1;
                }
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }

        assert_eq!(issued.len(), 1);
        assert_eq!(throttled, 7);
        assert_eq!(store.get("a@x.com").await.unwrap(), Some(issued[0].clone()));
    }
}
