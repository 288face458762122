//! Client storage tests against the file-backed durable scope

use fest_common::storage::keys;
use fest_common::{ClientStorage, StorageScope};
use tempfile::TempDir;

#[test]
fn test_durable_scope_survives_restart_session_scope_does_not() {
    let dir = TempDir::new().unwrap();

    {
        let storage = ClientStorage::open(dir.path()).unwrap();
        storage.write(StorageScope::Durable, keys::MUSIC_PLAYER_STATE, "playing");
        storage.set_flag(StorageScope::Durable, keys::HAS_VISITED_BEFORE);
        storage.write(StorageScope::Session, keys::MUSIC_CURRENT_TIME, "42.5");
    }

    let storage = ClientStorage::open(dir.path()).unwrap();
    assert_eq!(
        storage.read(StorageScope::Durable, keys::MUSIC_PLAYER_STATE).as_deref(),
        Some("playing")
    );
    assert!(storage.is_flag_set(StorageScope::Durable, keys::HAS_VISITED_BEFORE));
    assert_eq!(storage.read(StorageScope::Session, keys::MUSIC_CURRENT_TIME), None);
}

#[test]
fn test_clones_share_backing_stores() {
    let storage = ClientStorage::in_memory();
    let other = storage.clone();

    other.set_flag(StorageScope::Durable, keys::VISITOR_SKIPPED);
    assert!(storage.is_flag_set(StorageScope::Durable, keys::VISITOR_SKIPPED));
}
