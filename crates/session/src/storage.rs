//! Where the cached session lives between runs.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use happyhome_core::session::SessionRecord;
use tokio::sync::Mutex;

use crate::error::SessionError;

#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn load(&self) -> Result<Option<SessionRecord>, SessionError>;

    async fn save(&self, session: &SessionRecord) -> Result<(), SessionError>;

    /// Remove the cached session. Clearing an empty storage is not an error.
    async fn clear(&self) -> Result<(), SessionError>;
}

// ---------------------------------------------------------------------------
// File
// ---------------------------------------------------------------------------

/// One JSON file per session.
///
/// A file that cannot be parsed is treated as no session at all, so a
/// corrupted cache sends the user back to the login form instead of failing.
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionStorage for FileSessionStorage {
    async fn load(&self) -> Result<Option<SessionRecord>, SessionError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice(&bytes) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Ignoring unreadable session file");
                Ok(None)
            }
        }
    }

    async fn save(&self, session: &SessionRecord) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(session)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Memory
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    session: Mutex<Option<SessionRecord>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: SessionRecord) -> Self {
        Self {
            session: Mutex::new(Some(session)),
        }
    }
}

#[async_trait]
impl SessionStorage for MemorySessionStorage {
    async fn load(&self) -> Result<Option<SessionRecord>, SessionError> {
        Ok(self.session.lock().await.clone())
    }

    async fn save(&self, session: &SessionRecord) -> Result<(), SessionError> {
        *self.session.lock().await = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionError> {
        *self.session.lock().await = None;
        Ok(())
    }
}
