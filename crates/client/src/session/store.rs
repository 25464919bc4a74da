//! Persisted session record

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// What survives between runs: the authenticated flag and the cookie jar
/// needed to resume the server-side session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    pub is_authenticated: bool,
    /// Serialized cookie jar, every cookie with its path and expiry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookies: Option<String>,
}

/// Storage for the persisted session record
#[cfg_attr(test, mockall::automock)]
pub trait SessionStore: Send + Sync {
    /// Read the record, `None` when nothing was stored
    fn load(&self) -> Result<Option<PersistedSession>>;

    /// Replace the stored record
    fn save(&self, session: &PersistedSession) -> Result<()>;

    /// Forget the stored record
    fn clear(&self) -> Result<()>;
}

/// Process-local store, lost on exit
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: Mutex<Option<PersistedSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing record, as if a previous run had saved it
    pub fn with_session(session: PersistedSession) -> Self {
        Self {
            session: Mutex::new(Some(session)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<PersistedSession>> {
        Ok(self
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, session: &PersistedSession) -> Result<()> {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        Ok(())
    }
}

/// JSON file store
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<PersistedSession>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn save(&self, session: &PersistedSession) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_round_trip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("nested").join("session.json"));

        assert_eq!(store.load().unwrap(), None);

        let session = PersistedSession {
            is_authenticated: true,
            cookies: Some("accessToken=abc; refreshToken=def".into()),
        };
        store.save(&session).unwrap();
        assert_eq!(store.load().unwrap(), Some(session));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        // clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileSessionStore::new(path);
        assert!(store.load().is_err());
    }

    #[test]
    fn memory_store_starts_from_seed() {
        let store = MemorySessionStore::with_session(PersistedSession {
            is_authenticated: true,
            cookies: None,
        });
        assert!(store.load().unwrap().unwrap().is_authenticated);
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
