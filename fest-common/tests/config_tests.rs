//! Configuration resolution tests
//!
//! Tests that manipulate FEST_CONFIG or FEST_ROOT_FOLDER are marked #[serial]
//! so they never race each other.

use fest_common::config::{
    default_root_folder, resolve_config_path, FestConfig, CONFIG_ENV_VAR, ROOT_FOLDER_ENV_VAR,
};
use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[test]
fn test_missing_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let config = FestConfig::load(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, FestConfig::default());
}

#[test]
fn test_load_full_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
root_folder = "/srv/fest"

[server]
bind_addr = "0.0.0.0:8080"
database_file = "visitors.db"

[audio]
asset_path = "/srv/fest/theme.mp3"
public_path = "/audio/theme.mp3"
download_name = "theme.mp3"

[routes]
landing = "/"
music_routes = ["/", "/events", "/gallery"]

[gate]
prompt_delay_ms = 2000
tracking_endpoint = "https://fest.example/api/visitors"
tracking_timeout_ms = 1500

[logging]
level = "debug"
"#,
    )
    .unwrap();

    let config = FestConfig::load(&path).unwrap();
    assert_eq!(config.root_folder, Some(PathBuf::from("/srv/fest")));
    assert_eq!(config.server.bind_addr, "0.0.0.0:8080");
    assert_eq!(config.server.database_file, "visitors.db");
    assert_eq!(config.audio.download_name, "theme.mp3");
    assert!(config.routes.allows("/gallery/day-2"));
    assert!(!config.routes.allows("/news"));
    assert_eq!(config.gate.tracking_endpoint, "https://fest.example/api/visitors");
    assert_eq!(config.gate.tracking_timeout_ms, 1500);
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_load_rejects_invalid_values() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[routes]\nlanding = \"home\"\n").unwrap();

    assert!(FestConfig::load(&path).is_err());
}

#[test]
#[serial]
fn test_config_path_cli_beats_env() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/fest-env-config.toml");

    let resolved = resolve_config_path(Some(Path::new("/tmp/fest-cli-config.toml")));
    assert_eq!(resolved, Some(PathBuf::from("/tmp/fest-cli-config.toml")));

    let resolved = resolve_config_path(None);
    assert_eq!(resolved, Some(PathBuf::from("/tmp/fest-env-config.toml")));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_root_folder_priority() {
    let mut config = FestConfig::default();
    config.root_folder = Some(PathBuf::from("/from/config"));

    env::set_var(ROOT_FOLDER_ENV_VAR, "/from/env");
    assert_eq!(
        config.resolve_root_folder(Some(Path::new("/from/cli"))),
        PathBuf::from("/from/cli")
    );
    assert_eq!(config.resolve_root_folder(None), PathBuf::from("/from/env"));

    env::remove_var(ROOT_FOLDER_ENV_VAR);
    assert_eq!(config.resolve_root_folder(None), PathBuf::from("/from/config"));

    config.root_folder = None;
    assert_eq!(config.resolve_root_folder(None), default_root_folder());
}
