// Caption-track lookup: metadata only. Downloading caption content needs
// an OAuth grant the service does not hold, so the response points the
// user back at YouTube.

use crate::error::AppError;
use crate::models::catalog::{CaptionRequest, CaptionResponse};
use crate::youtube_client::VideoApi;
use crate::AppState;
use axum::{extract::Extension, response::Json, routing::post, Router};
use std::sync::Arc;

pub fn caption_routes() -> Router {
    Router::new().route("/api/youtube/captions", post(lookup_captions))
}

pub async fn lookup_captions(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<CaptionRequest>,
) -> Result<Json<CaptionResponse>, AppError> {
    let client = state
        .youtube_client
        .as_ref()
        .ok_or_else(AppError::api_key_missing)?;

    tracing::info!("Fetching caption tracks for video: {}", payload.video_id);

    let tracks = client.caption_tracks(&payload.video_id).await?;
    if tracks.is_empty() {
        return Err(AppError::NotFound(
            "No captions available for this video".to_string(),
        ));
    }

    // Prefer an English track, otherwise take whatever is first.
    let track = tracks
        .iter()
        .find(|t| t.snippet.language == "en" || t.snippet.language == "en-US")
        .unwrap_or(&tracks[0])
        .clone();

    Ok(Json(CaptionResponse {
        caption_id: track.id,
        language: track.snippet.language,
        track_kind: track.snippet.track_kind,
        message: "Caption track found. Note: Downloading captions requires OAuth \
                  authentication which is not available with API key only. You can \
                  view captions directly on YouTube."
            .to_string(),
        youtube_url: format!("https://www.youtube.com/watch?v={}", payload.video_id),
    }))
}
