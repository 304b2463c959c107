//! Durable session storage.
//!
//! The browser deployment keeps the blob under a single localStorage key;
//! this module is the same contract behind a trait so the store can run on
//! a JSON file (desktop, gateway-side tools) or fully in memory (tests,
//! embedders that bring their own persistence).

use std::path::PathBuf;
use std::sync::Mutex;

use super::types::Session;

#[derive(Debug, thiserror::Error)]
pub enum SessionStorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Durable backend for the session blob. Implementations must be cheap to
/// call on every mutation; the store writes through on each change.
pub trait SessionStorage: Send + Sync {
    /// Load the persisted session, `Ok(None)` when absent or unreadable
    /// as a session (a corrupt blob is not an error, just no session).
    fn load(&self) -> Result<Option<Session>, SessionStorageError>;
    fn save(&self, session: &Session) -> Result<(), SessionStorageError>;
    fn clear(&self) -> Result<(), SessionStorageError>;
}

// =============================================================================
// FILE BACKEND
// =============================================================================

/// JSON blob at a fixed path.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SessionStorage for FileStorage {
    fn load(&self) -> Result<Option<Session>, SessionStorageError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                tracing::warn!(error = %e, path = %self.path.display(), "corrupt session blob ignored");
                Ok(None)
            }
        }
    }

    fn save(&self, session: &Session) -> Result<(), SessionStorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(session)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionStorageError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// =============================================================================
// MEMORY BACKEND
// =============================================================================

/// In-memory backend; nothing survives the process.
#[derive(Default)]
pub struct MemoryStorage {
    inner: Mutex<Option<Session>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self) -> Result<Option<Session>, SessionStorageError> {
        Ok(self.inner.lock().expect("storage lock poisoned").clone())
    }

    fn save(&self, session: &Session) -> Result<(), SessionStorageError> {
        *self.inner.lock().expect("storage lock poisoned") = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionStorageError> {
        *self.inner.lock().expect("storage lock poisoned") = None;
        Ok(())
    }
}

#[cfg(test)]
#[path = "storage_test.rs"]
mod tests;
