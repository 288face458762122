//! Database access for fest-ui
//!
//! One SQLite file in the root folder holds the anonymous visitor records.

pub mod visitors;

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use std::path::Path;

/// Open (creating if needed) the visitor database
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    // mode=rwc: read, write, create
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url)
        .await
        .context("Failed to open visitor database")?;

    create_tables(&pool).await?;
    Ok(pool)
}

/// Create tables if they don't exist
pub async fn create_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS visitors (
            id TEXT PRIMARY KEY,
            anonymous INTEGER NOT NULL,
            visited_at TEXT NOT NULL,
            user_agent TEXT NOT NULL,
            referrer TEXT NOT NULL,
            screen_resolution TEXT NOT NULL,
            timezone TEXT NOT NULL,
            language TEXT NOT NULL,
            received_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create visitors table")?;

    Ok(())
}
