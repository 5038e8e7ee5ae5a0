// YouTube Data API v3 client for channel resolution and catalog fetching
// Docs: https://developers.google.com/youtube/v3

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::error::AppError;

const API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// Upstream page-size ceiling for playlistItems and videos list calls.
pub const MAX_PAGE_SIZE: usize = 50;

/// Upstream surface the catalog pipeline depends on. `YouTubeClient` is the
/// real implementation; tests substitute deterministic fakes to verify call
/// order without network access.
#[async_trait]
pub trait VideoApi: Send + Sync {
    /// Look up a channel id by its @handle. Returns the first candidate,
    /// or None when no channel matches.
    async fn channel_id_for_handle(&self, handle: &str) -> Result<Option<String>, AppError>;

    /// Look up a channel id by legacy username (/c/ and /user/ URLs).
    async fn channel_id_for_username(&self, username: &str) -> Result<Option<String>, AppError>;

    /// Resolve the uploads playlist id from the channel's content descriptor.
    async fn uploads_playlist_id(&self, channel_id: &str) -> Result<Option<String>, AppError>;

    /// Fetch one page of up to [`MAX_PAGE_SIZE`] video ids from a playlist.
    async fn playlist_items_page(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> Result<PlaylistPage, AppError>;

    /// Batch-fetch statistics, snippet, and content details for up to
    /// [`MAX_PAGE_SIZE`] video ids.
    async fn video_details(&self, video_ids: &[String]) -> Result<Vec<VideoDetail>, AppError>;

    /// List available caption tracks for a video (metadata only).
    async fn caption_tracks(&self, video_id: &str) -> Result<Vec<CaptionTrack>, AppError>;
}

#[derive(Debug, Clone)]
pub struct YouTubeClient {
    client: Client,
    api_key: String,
}

// ============================================================================
// Response Structures
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ChannelIdResponse {
    #[serde(default)]
    pub items: Vec<ChannelIdItem>,
}

#[derive(Debug, Deserialize)]
pub struct ChannelIdItem {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct ChannelContentResponse {
    #[serde(default)]
    pub items: Vec<ChannelContentItem>,
}

#[derive(Debug, Deserialize)]
pub struct ChannelContentItem {
    #[serde(rename = "contentDetails")]
    pub content_details: ChannelContentDetails,
}

#[derive(Debug, Deserialize)]
pub struct ChannelContentDetails {
    #[serde(rename = "relatedPlaylists")]
    pub related_playlists: RelatedPlaylists,
}

#[derive(Debug, Deserialize)]
pub struct RelatedPlaylists {
    pub uploads: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlaylistItemsResponse {
    #[serde(default)]
    pub items: Vec<PlaylistItem>,
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlaylistItem {
    pub snippet: PlaylistItemSnippet,
}

#[derive(Debug, Deserialize)]
pub struct PlaylistItemSnippet {
    #[serde(rename = "resourceId")]
    pub resource_id: ResourceId,
}

#[derive(Debug, Deserialize)]
pub struct ResourceId {
    #[serde(rename = "videoId")]
    pub video_id: String,
}

/// One page of raw video ids plus the cursor for the next page.
#[derive(Debug)]
pub struct PlaylistPage {
    pub video_ids: Vec<String>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VideoListResponse {
    #[serde(default)]
    pub items: Vec<VideoDetail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoDetail {
    pub id: String,
    pub snippet: VideoSnippet,
    pub statistics: VideoStatistics,
    #[serde(rename = "contentDetails")]
    pub content_details: VideoContentDetails,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoSnippet {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "publishedAt")]
    pub published_at: String,
    #[serde(default)]
    pub thumbnails: Thumbnails,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Thumbnails {
    pub default: Option<ThumbnailInfo>,
    pub medium: Option<ThumbnailInfo>,
    pub high: Option<ThumbnailInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThumbnailInfo {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoStatistics {
    #[serde(rename = "viewCount")]
    pub view_count: Option<String>,
    #[serde(rename = "likeCount")]
    pub like_count: Option<String>,
    #[serde(rename = "commentCount")]
    pub comment_count: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoContentDetails {
    pub duration: String,
    pub caption: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CaptionListResponse {
    #[serde(default)]
    pub items: Vec<CaptionTrack>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CaptionTrack {
    pub id: String,
    pub snippet: CaptionSnippet,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CaptionSnippet {
    pub language: String,
    #[serde(rename = "trackKind")]
    pub track_kind: String,
}

// ============================================================================
// YouTube Client Implementation
// ============================================================================

impl YouTubeClient {
    pub fn new(api_key: String) -> Self {
        // An upstream call that never returns would otherwise stall the
        // whole request; cap it here.
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, api_key }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, AppError> {
        let url = format!("{}/{}", API_BASE, path);

        let response = self
            .client
            .get(&url)
            .query(query)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("YouTube API {} returned {}: {}", path, status, error_text);
            return Err(AppError::Upstream(format!(
                "YouTube API error ({}): {}",
                status, error_text
            )));
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl VideoApi for YouTubeClient {
    async fn channel_id_for_handle(&self, handle: &str) -> Result<Option<String>, AppError> {
        let data: ChannelIdResponse = self
            .get_json("channels", &[("part", "id"), ("forHandle", handle)])
            .await?;
        Ok(data.items.into_iter().next().map(|item| item.id))
    }

    async fn channel_id_for_username(&self, username: &str) -> Result<Option<String>, AppError> {
        let data: ChannelIdResponse = self
            .get_json("channels", &[("part", "id"), ("forUsername", username)])
            .await?;
        Ok(data.items.into_iter().next().map(|item| item.id))
    }

    async fn uploads_playlist_id(&self, channel_id: &str) -> Result<Option<String>, AppError> {
        let data: ChannelContentResponse = self
            .get_json("channels", &[("part", "contentDetails"), ("id", channel_id)])
            .await?;
        Ok(data
            .items
            .into_iter()
            .next()
            .and_then(|item| item.content_details.related_playlists.uploads))
    }

    async fn playlist_items_page(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> Result<PlaylistPage, AppError> {
        let max_results = MAX_PAGE_SIZE.to_string();
        let mut query = vec![
            ("part", "snippet"),
            ("playlistId", playlist_id),
            ("maxResults", max_results.as_str()),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        let data: PlaylistItemsResponse = self.get_json("playlistItems", &query).await?;

        Ok(PlaylistPage {
            video_ids: data
                .items
                .into_iter()
                .map(|item| item.snippet.resource_id.video_id)
                .collect(),
            next_page_token: data.next_page_token,
        })
    }

    async fn video_details(&self, video_ids: &[String]) -> Result<Vec<VideoDetail>, AppError> {
        if video_ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids = video_ids.join(",");
        let data: VideoListResponse = self
            .get_json(
                "videos",
                &[
                    ("part", "statistics,snippet,contentDetails"),
                    ("id", ids.as_str()),
                ],
            )
            .await?;

        Ok(data.items)
    }

    async fn caption_tracks(&self, video_id: &str) -> Result<Vec<CaptionTrack>, AppError> {
        let data: CaptionListResponse = self
            .get_json("captions", &[("part", "snippet"), ("videoId", video_id)])
            .await?;
        Ok(data.items)
    }
}
