//! Single-slot JSON persistence for the session record.

use std::{
    io,
    path::{Path, PathBuf},
};

use super::record::SessionRecord;
use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored record, if any. A file that does not decode counts as no
    /// session.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file exists but cannot be read.
    pub fn load(&self) -> Result<Option<SessionRecord>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::io_at(&self.path, &e)),
        };

        match serde_json::from_str(&content) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "ignoring corrupt session state: {e}");
                Ok(None)
            }
        }
    }

    /// # Errors
    ///
    /// Returns `Error::Io` if the state directory or file cannot be written.
    pub fn save(&self, record: &SessionRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io_at(parent, &e))?;
        }
        let body = serde_json::to_string_pretty(record)?;
        std::fs::write(&self.path, body).map_err(|e| Error::io_at(&self.path, &e))
    }

    /// Remove the record; a missing file is fine.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::io_at(&self.path, &e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use super::*;
    use crate::AgentId;

    fn record() -> Result<SessionRecord> {
        let now = NaiveDateTime::parse_from_str("2026-10-18 09:00", "%Y-%m-%d %H:%M")
            .map_err(|e| Error::Parse(e.to_string()))?;
        Ok(SessionRecord::start(AgentId::new("antigravity"), "tandem", now))
    }

    #[test]
    fn test_save_load_clear() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = SessionStore::new(dir.path().join(".agent/session_state.json"));

        assert_eq!(store.load()?, None);
        let record = record()?;
        store.save(&record)?;
        assert_eq!(store.load()?, Some(record));

        store.clear()?;
        store.clear()?;
        assert_eq!(store.load()?, None);
        Ok(())
    }

    #[test]
    fn test_corrupt_file_is_no_session() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("session_state.json");
        std::fs::write(&path, "{\"status\": \"active\", \"date\": ")?;
        assert_eq!(SessionStore::new(path).load()?, None);
        Ok(())
    }
}
