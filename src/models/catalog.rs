// Request/response shapes for the catalog and caption endpoints.
// Field names are camelCase on the wire to match the existing frontend.

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CatalogRequest {
    #[serde(rename = "channelInput")]
    pub channel_input: String,
}

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub videos: Vec<VideoRecord>,
    #[serde(rename = "totalVideos")]
    pub total_videos: usize,
}

/// Classification of a published item by duration. Anything under 60
/// seconds counts as short form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentType {
    #[serde(rename = "Short Form")]
    ShortForm,
    #[serde(rename = "Long Form")]
    LongForm,
}

/// One normalized entry of a channel's public catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    pub id: String,
    pub title: String,
    /// View/like counters formatted with comma grouping ("1,234,567").
    pub views: String,
    pub likes: String,
    /// Grouped counter, or the literal "Disabled" when comments are
    /// turned off upstream. A zero count stays "0".
    pub comments: String,
    pub upload_date: String,
    pub thumbnail: String,
    pub url: String,
    pub duration: String,
    pub content_type: ContentType,
    pub tags: Vec<String>,
    pub hashtags: Vec<String>,
    pub has_caption: bool,
}

#[derive(Debug, Deserialize)]
pub struct CaptionRequest {
    #[serde(rename = "videoId")]
    pub video_id: String,
    #[serde(rename = "videoTitle")]
    #[allow(dead_code)]
    pub video_title: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CaptionResponse {
    #[serde(rename = "captionId")]
    pub caption_id: String,
    pub language: String,
    #[serde(rename = "trackKind")]
    pub track_kind: String,
    pub message: String,
    #[serde(rename = "youtubeUrl")]
    pub youtube_url: String,
}
