//! Client-side persistent storage
//!
//! Two scopes mirror what a browser offers:
//! - **Durable**: survives restarts (visitor gate flags, playback intent)
//! - **Session**: lives for one browsing session (playback position, unload snapshot)
//!
//! Controllers never see storage errors. `ClientStorage` absorbs them: failed
//! reads are treated as "absent", failed writes are dropped, and both are logged
//! at `warn` level.

mod file;
pub mod keys;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::Result;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

/// Minimal string key-value store
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Storage scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageScope {
    Durable,
    Session,
}

impl fmt::Display for StorageScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageScope::Durable => write!(f, "durable"),
            StorageScope::Session => write!(f, "session"),
        }
    }
}

/// Pair of stores, one per scope
#[derive(Clone)]
pub struct ClientStorage {
    durable: Arc<dyn KeyValueStore>,
    session: Arc<dyn KeyValueStore>,
}

impl ClientStorage {
    pub fn new(durable: Arc<dyn KeyValueStore>, session: Arc<dyn KeyValueStore>) -> Self {
        Self { durable, session }
    }

    /// Both scopes in memory (tests, headless demos)
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), Arc::new(MemoryStore::new()))
    }

    /// Durable scope backed by a JSON file under `root_folder`, session scope in memory
    pub fn open(root_folder: &Path) -> Result<Self> {
        let durable = FileStore::open(root_folder.join("durable_storage.json"))?;
        Ok(Self::new(Arc::new(durable), Arc::new(MemoryStore::new())))
    }

    /// Raw store for a scope
    pub fn store(&self, scope: StorageScope) -> &Arc<dyn KeyValueStore> {
        match scope {
            StorageScope::Durable => &self.durable,
            StorageScope::Session => &self.session,
        }
    }

    /// Read a value; storage failures read as absent
    pub fn read(&self, scope: StorageScope, key: &str) -> Option<String> {
        match self.store(scope).get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to read {} storage key '{}': {}", scope, key, e);
                None
            }
        }
    }

    /// Write a value; storage failures are logged and dropped
    pub fn write(&self, scope: StorageScope, key: &str, value: &str) {
        if let Err(e) = self.store(scope).set(key, value) {
            warn!("Failed to write {} storage key '{}': {}", scope, key, e);
        }
    }

    /// Remove a key; storage failures are logged and dropped
    pub fn remove(&self, scope: StorageScope, key: &str) {
        if let Err(e) = self.store(scope).remove(key) {
            warn!("Failed to remove {} storage key '{}': {}", scope, key, e);
        }
    }

    /// True when the key holds the literal `"true"`
    pub fn is_flag_set(&self, scope: StorageScope, key: &str) -> bool {
        self.read(scope, key).as_deref() == Some(keys::FLAG_TRUE)
    }

    pub fn set_flag(&self, scope: StorageScope, key: &str) {
        self.write(scope, key, keys::FLAG_TRUE);
    }
}

impl fmt::Debug for ClientStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientStorage").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    /// Store that rejects every operation, like a browser in private mode over quota
    struct RejectingStore;

    impl KeyValueStore for RejectingStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(Error::Storage("unavailable".to_string()))
        }
        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(Error::Storage("quota exceeded".to_string()))
        }
        fn remove(&self, _key: &str) -> Result<()> {
            Err(Error::Storage("unavailable".to_string()))
        }
    }

    #[test]
    fn test_scopes_are_independent() {
        let storage = ClientStorage::in_memory();
        storage.write(StorageScope::Durable, "k", "durable");
        storage.write(StorageScope::Session, "k", "session");

        assert_eq!(storage.read(StorageScope::Durable, "k").as_deref(), Some("durable"));
        assert_eq!(storage.read(StorageScope::Session, "k").as_deref(), Some("session"));

        storage.remove(StorageScope::Session, "k");
        assert_eq!(storage.read(StorageScope::Session, "k"), None);
        assert!(storage.read(StorageScope::Durable, "k").is_some());
    }

    #[test]
    fn test_flags() {
        let storage = ClientStorage::in_memory();
        assert!(!storage.is_flag_set(StorageScope::Durable, keys::VISITOR_SKIPPED));

        storage.set_flag(StorageScope::Durable, keys::VISITOR_SKIPPED);
        assert!(storage.is_flag_set(StorageScope::Durable, keys::VISITOR_SKIPPED));

        storage.write(StorageScope::Durable, keys::VISITOR_SKIPPED, "yes");
        assert!(!storage.is_flag_set(StorageScope::Durable, keys::VISITOR_SKIPPED));
    }

    #[test]
    fn test_failures_are_absorbed() {
        let storage = ClientStorage::new(Arc::new(RejectingStore), Arc::new(RejectingStore));

        storage.write(StorageScope::Durable, keys::HAS_VISITED_BEFORE, "true");
        storage.remove(StorageScope::Session, keys::MUSIC_WAS_PLAYING);
        assert_eq!(storage.read(StorageScope::Durable, keys::HAS_VISITED_BEFORE), None);
        assert!(!storage.is_flag_set(StorageScope::Durable, keys::HAS_VISITED_BEFORE));
    }
}
