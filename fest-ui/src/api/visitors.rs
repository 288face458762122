//! Anonymous visitor ingestion
//!
//! The visitor gate posts one record per anonymous skip. Registered visitors
//! go through the registration form and never reach this endpoint.

use axum::{extract::State, http::StatusCode, Json};
use fest_common::AnonymousVisit;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::db::visitors::{self, VisitorSummary};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Response to a stored visit
#[derive(Debug, Serialize)]
pub struct RecordedVisit {
    pub id: Uuid,
}

/// POST /api/visitors
pub async fn record_visit(
    State(state): State<AppState>,
    Json(visit): Json<AnonymousVisit>,
) -> ApiResult<(StatusCode, Json<RecordedVisit>)> {
    if !visit.anonymous {
        return Err(ApiError::BadRequest(
            "only anonymous visits are accepted".to_string(),
        ));
    }

    let id = visitors::insert_visit(&state.db, &visit).await?;
    info!(
        "Recorded anonymous visit {} ({}, {})",
        id, visit.language, visit.timezone
    );

    Ok((StatusCode::CREATED, Json(RecordedVisit { id })))
}

/// GET /api/visitors/summary
pub async fn visitor_summary(State(state): State<AppState>) -> ApiResult<Json<VisitorSummary>> {
    Ok(Json(visitors::summary(&state.db).await?))
}
