//! SiteShell composed from configuration
//!
//! Kept in its own test binary: `from_config` takes the process-wide player,
//! which no other test in this crate may touch.

use fest_common::config::{AudioConfig, FestConfig};
use fest_common::storage::keys;
use fest_common::{ClientStorage, StorageScope};
use fest_gate::GateState;
use fest_player::SimulatedMedia;
use fest_ui::{build_router, db, AppState, SiteShell};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::net::SocketAddr;
use tempfile::TempDir;

async fn spawn_server() -> (SocketAddr, SqlitePool) {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    db::create_tables(&pool).await.unwrap();

    let app = build_router(AppState::new(pool.clone(), AudioConfig::default()));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, pool)
}

#[tokio::test]
async fn test_shell_from_config_wires_routes_storage_and_tracker() {
    let (addr, pool) = spawn_server().await;
    let root = TempDir::new().unwrap();

    let config = FestConfig::from_toml_str(&format!(
        r#"
        [routes]
        landing = "/"
        music_routes = ["/", "/events"]

        [gate]
        prompt_delay_ms = 60000
        tracking_endpoint = "http://{}/api/visitors"
        "#,
        addr
    ))
    .unwrap();
    config.validate().unwrap();

    let (factory, media) = SimulatedMedia::factory();
    let shell = SiteShell::from_config(&config, root.path(), "/gallery", factory).unwrap();

    // Route list comes from [routes], asset from [audio]
    assert!(!shell.player().music_allowed());
    assert_eq!(media.source().as_deref(), Some("/audio/festival-theme.mp3"));
    assert_eq!(shell.gate().state(), GateState::PendingPrompt);

    shell.navigate("/events").unwrap();
    assert!(shell.player().music_allowed());

    // Skip posts to the configured endpoint and persists under the root folder
    shell.gate().skip_as_anonymous().join().await;
    let summary = db::visitors::summary(&pool).await.unwrap();
    assert_eq!(summary.anonymous, 1);

    let reopened = ClientStorage::open(root.path()).unwrap();
    assert!(reopened.is_flag_set(StorageScope::Durable, keys::HAS_VISITED_BEFORE));
    assert!(reopened.is_flag_set(StorageScope::Durable, keys::VISITOR_SKIPPED));
}
