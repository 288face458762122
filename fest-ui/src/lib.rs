//! fest-ui library - festival site service
//!
//! Serves the background track, ingests anonymous visitor records, and hosts
//! the `SiteShell` that ties the music player to the visitor gate.

use axum::Router;
use fest_common::config::AudioConfig;
use sqlx::SqlitePool;

pub mod api;
pub mod db;
pub mod error;
pub mod shell;

pub use shell::{MusicToggle, SiteShell, ToggleView};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Visitor database
    pub db: SqlitePool,
    /// Background track served under `/audio`
    pub audio: AudioConfig,
}

impl AppState {
    pub fn new(db: SqlitePool, audio: AudioConfig) -> Self {
        Self { db, audio }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/api/visitors", post(api::record_visit))
        .route("/api/visitors/summary", get(api::visitor_summary))
        .merge(api::audio_routes(&state.audio))
        .merge(api::health_routes())
        .with_state(state)
}
