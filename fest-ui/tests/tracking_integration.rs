//! HttpVisitorTracker against a live fest-ui server
//!
//! The server runs on an ephemeral port with an in-memory database.

use chrono::{TimeZone, Utc};
use fest_common::config::AudioConfig;
use fest_gate::{ClientMetadata, HttpVisitorTracker, TrackingError, VisitorTracker};
use fest_ui::{build_router, db, AppState};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::net::SocketAddr;
use std::time::Duration;

/// Spawn the service; returns its address and database
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

fn metadata() -> ClientMetadata {
    ClientMetadata {
        user_agent: "Mozilla/5.0 (iPhone)".to_string(),
        referrer: "https://example.org/festivals".to_string(),
        screen_resolution: "390x844".to_string(),
        timezone: "Asia/Kathmandu".to_string(),
        language: "en-GB".to_string(),
    }
}

#[tokio::test]
async fn test_tracker_posts_to_ingestion_endpoint() {
    let (addr, pool) = spawn_server().await;
    let tracker =
        HttpVisitorTracker::new(format!("http://{}/api/visitors", addr), Duration::from_secs(5))
            .unwrap();

    let timestamp = Utc.with_ymd_and_hms(2026, 10, 2, 17, 45, 0).unwrap();
    tracker
        .record_anonymous_visit(&metadata().anonymous_visit(timestamp))
        .await
        .expect("Tracking should succeed");

    let summary = db::visitors::summary(&pool).await.unwrap();
    assert_eq!(summary.total, 1);
    assert_eq!(summary.anonymous, 1);

    let (referrer, screen): (String, String) =
        sqlx::query_as("SELECT referrer, screen_resolution FROM visitors")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(referrer, "https://example.org/festivals");
    assert_eq!(screen, "390x844");
}

#[tokio::test]
async fn test_tracker_reports_rejected_status() {
    let (addr, _) = spawn_server().await;
    let tracker =
        HttpVisitorTracker::new(format!("http://{}/api/nowhere", addr), Duration::from_secs(5))
            .unwrap();

    let err = tracker
        .record_anonymous_visit(&metadata().anonymous_visit(Utc::now()))
        .await
        .unwrap_err();
    assert!(matches!(err, TrackingError::Status(404)));
}
