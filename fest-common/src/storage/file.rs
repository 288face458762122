//! File-backed key-value store
//!
//! Backs the durable scope. The whole map is kept in memory and rewritten to a
//! JSON file on every mutation (write to a sibling temp file, then rename), so a
//! crash mid-write leaves the previous snapshot intact.

use super::KeyValueStore;
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, info};

/// JSON file store
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open (or lazily create) the store at `path`
    ///
    /// A missing file is an empty store; the file and its parent directory are
    /// created on the first write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content).map_err(|e| {
                    Error::Storage(format!("Corrupt storage file {}: {}", path.display(), e))
                })?
            }
        } else {
            BTreeMap::new()
        };

        info!(
            "Opened durable storage {} ({} keys)",
            path.display(),
            entries.len()
        );

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        std::fs::rename(&tmp, &self.path)?;
        debug!("Persisted {} keys to {}", entries.len(), self.path.display());
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().unwrap();
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().unwrap();
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty_store() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path().join("durable.json")).unwrap();
        assert_eq!(store.get("anything").unwrap(), None);
        assert!(!store.path().exists(), "File should not exist before first write");
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("durable.json");

        {
            let store = FileStore::open(&path).unwrap();
            store.set("music_player_state", "playing").unwrap();
            store.set("hasVisitedBefore", "true").unwrap();
            store.remove("hasVisitedBefore").unwrap();
        }

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(
            reopened.get("music_player_state").unwrap().as_deref(),
            Some("playing")
        );
        assert_eq!(reopened.get("hasVisitedBefore").unwrap(), None);
    }

    #[test]
    fn test_corrupt_file_is_storage_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("durable.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result = FileStore::open(&path);
        assert!(matches!(result, Err(Error::Storage(_))));
    }
}
