//! Lock record persistence.
//!
//! `FsLockStore` keeps one JSON file per resource. Creation uses
//! `create_new`, so two writers can never both create the same record, and
//! every read-check-write sequence in the manager runs inside
//! [`LockStore::exclusive`], which holds an `fs2` lock on a sibling guard
//! file.

use std::{
    collections::HashMap,
    fs::{self, File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Mutex,
};

use fs2::FileExt;

use super::types::LockRecord;
use crate::{Error, Result};

/// Durable home of lock records, one per resource name.
pub trait LockStore {
    /// Read the record for `resource`, if any.
    fn load(&self, resource: &str) -> Result<Option<LockRecord>>;

    /// Store `record` unless one already exists. Returns `false` on conflict.
    fn create(&self, record: &LockRecord) -> Result<bool>;

    /// Delete the record for `resource`; absent records are not an error.
    fn remove(&self, resource: &str) -> Result<()>;

    /// Every stored record.
    fn list(&self) -> Result<Vec<LockRecord>>;

    /// Run `f` while no other process can run `exclusive` for `resource`.
    fn exclusive<T>(&self, resource: &str, f: impl FnOnce() -> Result<T>) -> Result<T>;
}

// ═══════════════════════════════════════════════════════════════════════════
// FILESYSTEM STORE
// ═══════════════════════════════════════════════════════════════════════════

const RECORD_EXTENSION: &str = "lock";
const GUARD_EXTENSION: &str = "guard";

#[derive(Debug, Clone)]
pub struct FsLockStore {
    dir: PathBuf,
}

impl FsLockStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, resource: &str) -> PathBuf {
        self.dir.join(format!("{resource}.{RECORD_EXTENSION}"))
    }

    fn guard_path(&self, resource: &str) -> PathBuf {
        self.dir.join(format!(".{resource}.{GUARD_EXTENSION}"))
    }

    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| Error::io_at(&self.dir, &e))
    }
}

impl LockStore for FsLockStore {
    fn load(&self, resource: &str) -> Result<Option<LockRecord>> {
        let path = self.record_path(resource);
        match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).map(Some).map_err(|e| {
                Error::Parse(format!("Corrupt lock record {}: {e}", path.display()))
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::io_at(&path, &e)),
        }
    }

    fn create(&self, record: &LockRecord) -> Result<bool> {
        self.ensure_dir()?;
        let path = self.record_path(&record.resource);
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => return Err(Error::io_at(&path, &e)),
        };

        let body = serde_json::to_string_pretty(record)?;
        file.write_all(body.as_bytes())
            .and_then(|()| file.sync_all())
            .map_err(|e| Error::io_at(&path, &e))?;
        Ok(true)
    }

    fn remove(&self, resource: &str) -> Result<()> {
        let path = self.record_path(resource);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::io_at(&path, &e)),
        }
    }

    fn list(&self) -> Result<Vec<LockRecord>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::io_at(&self.dir, &e)),
        };

        let mut records = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| Error::io_at(&self.dir, &e))?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            let Some(resource) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            match self.load(resource) {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(e) => tracing::warn!(path = %path.display(), "skipping lock record: {e}"),
            }
        }
        records.sort_by(|a, b| a.resource.cmp(&b.resource));
        Ok(records)
    }

    fn exclusive<T>(&self, resource: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
        self.ensure_dir()?;
        let guard_path = self.guard_path(resource);
        let guard = File::options()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&guard_path)
            .map_err(|e| Error::io_at(&guard_path, &e))?;

        guard
            .lock_exclusive()
            .map_err(|e| Error::io_at(&guard_path, &e))?;

        // Closing the descriptor releases the guard.
        let result = f();
        drop(guard);
        result
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// IN-MEMORY STORE
// ═══════════════════════════════════════════════════════════════════════════

/// Process-local store, for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryLockStore {
    records: Mutex<HashMap<String, LockRecord>>,
    critical: Mutex<()>,
}

impl MemoryLockStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_records<T>(&self, f: impl FnOnce(&mut HashMap<String, LockRecord>) -> T) -> Result<T> {
        self.records
            .lock()
            .map(|mut records| f(&mut records))
            .map_err(|_| Error::Io("lock store mutex poisoned".into()))
    }
}

impl LockStore for MemoryLockStore {
    fn load(&self, resource: &str) -> Result<Option<LockRecord>> {
        self.with_records(|records| records.get(resource).cloned())
    }

    fn create(&self, record: &LockRecord) -> Result<bool> {
        self.with_records(|records| {
            if records.contains_key(&record.resource) {
                false
            } else {
                records.insert(record.resource.clone(), record.clone());
                true
            }
        })
    }

    fn remove(&self, resource: &str) -> Result<()> {
        self.with_records(|records| {
            records.remove(resource);
        })
    }

    fn list(&self) -> Result<Vec<LockRecord>> {
        self.with_records(|records| {
            let mut all: Vec<LockRecord> = records.values().cloned().collect();
            all.sort_by(|a, b| a.resource.cmp(&b.resource));
            all
        })
    }

    fn exclusive<T>(&self, _resource: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let _critical = self
            .critical
            .lock()
            .map_err(|_| Error::Io("lock store mutex poisoned".into()))?;
        f()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn temp_store() -> Result<(tempfile::TempDir, FsLockStore)> {
        let dir = tempfile::tempdir().map_err(|e| Error::Io(e.to_string()))?;
        let store = FsLockStore::new(dir.path().join("locks"));
        Ok((dir, store))
    }

    #[test]
    fn test_create_is_exclusive() -> Result<()> {
        let (_dir, store) = temp_store()?;
        let first = LockRecord::new("backlog", "antigravity", Utc::now());
        let second = LockRecord::new("backlog", "claude_code", Utc::now());

        assert!(store.create(&first)?);
        assert!(!store.create(&second)?);
        assert_eq!(store.load("backlog")?, Some(first));
        Ok(())
    }

    #[test]
    fn test_remove_missing_is_noop() -> Result<()> {
        let (_dir, store) = temp_store()?;
        store.remove("backlog")?;
        assert_eq!(store.load("backlog")?, None);
        Ok(())
    }

    #[test]
    fn test_list_skips_guard_files() -> Result<()> {
        let (_dir, store) = temp_store()?;
        store.exclusive("backlog", || {
            store.create(&LockRecord::new("backlog", "a", Utc::now()))
        })?;
        store.create(&LockRecord::new("daylog", "b", Utc::now()))?;

        let resources: Vec<String> = store.list()?.into_iter().map(|r| r.resource).collect();
        assert_eq!(resources, vec!["backlog".to_string(), "daylog".to_string()]);
        Ok(())
    }

    #[test]
    fn test_corrupt_record_is_parse_error() -> Result<()> {
        let (_dir, store) = temp_store()?;
        fs::create_dir_all(store.dir())?;
        fs::write(store.dir().join("backlog.lock"), "{not json")?;
        assert!(matches!(store.load("backlog"), Err(Error::Parse(_))));
        Ok(())
    }

    #[test]
    fn test_memory_store_create_conflict() -> Result<()> {
        let store = MemoryLockStore::new();
        assert!(store.create(&LockRecord::new("backlog", "a", Utc::now()))?);
        assert!(!store.create(&LockRecord::new("backlog", "b", Utc::now()))?);
        store.remove("backlog")?;
        assert!(store.list()?.is_empty());
        Ok(())
    }
}
