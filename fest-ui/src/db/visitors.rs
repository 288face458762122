//! Visitor record queries

use chrono::Utc;
use fest_common::{AnonymousVisit, Result};
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Counts for the analytics page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisitorSummary {
    pub total: i64,
    pub anonymous: i64,
}

/// Store one visit; returns its id
pub async fn insert_visit(pool: &SqlitePool, visit: &AnonymousVisit) -> Result<Uuid> {
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO visitors (
            id, anonymous, visited_at, user_agent, referrer,
            screen_resolution, timezone, language, received_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(visit.anonymous)
    .bind(visit.timestamp.to_rfc3339())
    .bind(&visit.user_agent)
    .bind(&visit.referrer)
    .bind(&visit.screen_resolution)
    .bind(&visit.timezone)
    .bind(&visit.language)
    .bind(Utc::now().to_rfc3339())
    .execute(pool)
    .await?;

    Ok(id)
}

pub async fn summary(pool: &SqlitePool) -> Result<VisitorSummary> {
    let (total, anonymous): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(SUM(anonymous), 0) FROM visitors",
    )
    .fetch_one(pool)
    .await?;

    Ok(VisitorSummary { total, anonymous })
}
