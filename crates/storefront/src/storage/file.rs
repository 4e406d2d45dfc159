//! JSON-file key-value store.
//!
//! The whole store is one JSON object (`{"lecas_cart": "[...]", ...}`). Every
//! call re-reads the file so writes made by another process are picked up,
//! and every write replaces the file through a temp-file rename so readers
//! never observe a half-written state.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{KeyValueStore, StorageError};

type Entries = BTreeMap<String, String>;

/// A store persisted as a single JSON file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileStore {
    /// Open a store at `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn load(&self) -> Result<Entries, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Entries::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        if raw.trim().is_empty() {
            return Ok(Entries::new());
        }

        serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    /// Load entries for a write. A corrupt file is replaced rather than
    /// blocking every future write.
    fn load_for_write(&self) -> Result<Entries, StorageError> {
        match self.load() {
            Err(StorageError::Corrupt { path, reason }) => {
                tracing::warn!(
                    path = %path.display(),
                    reason = %reason,
                    "Overwriting corrupt state file"
                );
                Ok(Entries::new())
            }
            other => other,
        }
    }

    fn save(&self, entries: &Entries) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let raw = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, raw).map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        let mut entries = self.load_for_write()?;
        entries.insert(key.to_owned(), value.to_owned());
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        let mut entries = self.load_for_write()?;
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("state.json"));
        assert_eq!(store.get("lecas_cart").unwrap(), None);
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("state.json");

        FileStore::new(&path).set("user", r#"{"id":"u1"}"#).unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(
            reopened.get("user").unwrap().as_deref(),
            Some(r#"{"id":"u1"}"#)
        );
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_two_handles_see_each_others_writes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        let first = FileStore::new(&path);
        let second = FileStore::new(&path);

        first.set("access_token", "a").unwrap();
        second.set("refresh_token", "r").unwrap();

        assert_eq!(first.get("refresh_token").unwrap().as_deref(), Some("r"));
        assert_eq!(second.get("access_token").unwrap().as_deref(), Some("a"));
    }

    #[test]
    fn test_corrupt_file_reports_then_recovers_on_write() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "not json at all").unwrap();

        let store = FileStore::new(&path);
        assert!(matches!(
            store.get("lecas_cart"),
            Err(StorageError::Corrupt { .. })
        ));

        store.set("lecas_cart", "[]").unwrap();
        assert_eq!(store.get("lecas_cart").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_remove_deletes_key() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("state.json"));

        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        store.remove("a").unwrap();
        store.remove("missing").unwrap();

        assert_eq!(store.get("a").unwrap(), None);
        assert_eq!(store.get("b").unwrap().as_deref(), Some("2"));
    }
}
