// Catalog endpoint: one POST resolves a channel reference and returns the
// channel's full normalized video list. All-or-nothing per request.

use crate::catalog;
use crate::error::AppError;
use crate::models::catalog::{CatalogRequest, CatalogResponse};
use crate::AppState;
use axum::{extract::Extension, response::Json, routing::post, Router};
use std::sync::Arc;

pub fn catalog_routes() -> Router {
    Router::new().route("/api/youtube/catalog", post(fetch_catalog))
}

pub async fn fetch_catalog(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<CatalogRequest>,
) -> Result<Json<CatalogResponse>, AppError> {
    let client = state
        .youtube_client
        .as_ref()
        .ok_or_else(AppError::api_key_missing)?;

    tracing::info!("Processing channel input: {}", payload.channel_input);

    let videos = catalog::fetch_channel_catalog(client, &payload.channel_input).await?;
    let total_videos = videos.len();

    Ok(Json(CatalogResponse {
        videos,
        total_videos,
    }))
}
