//! Storage seam for pending OTP records.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Duration;
use tokio::sync::Mutex;

use super::{OtpError, OtpRecord};

/// Key-value store of pending codes, keyed by email address.
///
/// The in-process [`InMemoryOtpStore`] is the default; an external TTL cache
/// can implement this trait without touching the service or the handlers.
#[async_trait]
pub trait OtpStore: Send + Sync {
    async fn get(&self, email: &str) -> Result<Option<OtpRecord>, OtpError>;

    /// Insert or overwrite the record for `email`, unless the pending one
    /// was issued less than `cooldown` before `record`. The check and the
    /// write are one atomic step. On refusal the blocking record is returned
    /// and the store is left unchanged.
    async fn put_unless_recent(
        &self,
        email: &str,
        record: OtpRecord,
        cooldown: Duration,
    ) -> Result<Option<OtpRecord>, OtpError>;

    /// Atomically delete the record for `email` only if it still equals
    /// `expected`. Returns `false` when the record was replaced or removed
    /// in the meantime.
    async fn remove_if(&self, email: &str, expected: &OtpRecord) -> Result<bool, OtpError>;
}

/// Process-local store. Stale records are not swept; they linger until the
/// same email sends again or verifies.
#[derive(Debug, Default)]
pub struct InMemoryOtpStore {
    records: Mutex<HashMap<String, OtpRecord>>,
}

impl InMemoryOtpStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held, expired ones included.
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

#[async_trait]
impl OtpStore for InMemoryOtpStore {
    async fn get(&self, email: &str) -> Result<Option<OtpRecord>, OtpError> {
        Ok(self.records.lock().await.get(email).cloned())
    }

    async fn put_unless_recent(
        &self,
        email: &str,
        record: OtpRecord,
        cooldown: Duration,
    ) -> Result<Option<OtpRecord>, OtpError> {
        let mut records = self.records.lock().await;
        if cooldown > Duration::zero() {
            if let Some(existing) = records.get(email) {
                if record.issued_at < existing.issued_at + cooldown {
                    return Ok(Some(existing.clone()));
                }
            }
        }
        records.insert(email.to_string(), record);
        Ok(None)
    }

    async fn remove_if(&self, email: &str, expected: &OtpRecord) -> Result<bool, OtpError> {
        let mut records = self.records.lock().await;
        match records.get(email) {
            Some(current) if current == expected => {
                records.remove(email);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
