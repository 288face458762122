//! Background track delivery
//!
//! The track is streamed from its public path for the player and offered as
//! an attachment for the visitor-facing download button.

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    routing::get,
    Router,
};
use fest_common::config::{AudioConfig, DOWNLOAD_PATH};
use std::io::ErrorKind;
use std::path::Path;
use tower_http::services::ServeFile;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// GET /audio/download
pub async fn download_track(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let bytes = match tokio::fs::read(&state.audio.asset_path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ApiError::NotFound(format!(
                "audio asset {}",
                state.audio.asset_path.display()
            )))
        }
        Err(e) => return Err(e.into()),
    };

    debug!(
        "Serving {} bytes as {}",
        bytes.len(),
        state.audio.download_name
    );

    let headers = [
        (
            header::CONTENT_TYPE,
            content_type(&state.audio.download_name).to_string(),
        ),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", state.audio.download_name),
        ),
    ];
    Ok((headers, bytes))
}

fn content_type(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match extension.as_deref() {
        Some("mp3") => "audio/mpeg",
        Some("ogg") => "audio/ogg",
        Some("wav") => "audio/wav",
        Some("m4a") => "audio/mp4",
        _ => "application/octet-stream",
    }
}

/// Build audio routes for the configured asset
pub fn audio_routes(audio: &AudioConfig) -> Router<AppState> {
    Router::new()
        .route_service(&audio.public_path, ServeFile::new(&audio.asset_path))
        .route(DOWNLOAD_PATH, get(download_track))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_by_extension() {
        assert_eq!(content_type("festival-theme.mp3"), "audio/mpeg");
        assert_eq!(content_type("Theme.MP3"), "audio/mpeg");
        assert_eq!(content_type("theme.ogg"), "audio/ogg");
        assert_eq!(content_type("theme"), "application/octet-stream");
    }
}
