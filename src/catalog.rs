// Catalog pipeline: resolve -> enumerate uploads -> aggregate details.
// One batch detail fetch per playlist page, strictly in enumeration order.
// Assembly is all-or-nothing; a failure anywhere drops the whole catalog.

use lazy_static::lazy_static;
use regex::Regex;

use crate::duration::{format_duration, parse_iso_duration};
use crate::error::AppError;
use crate::models::catalog::{ContentType, VideoRecord};
use crate::resolver;
use crate::youtube_client::{VideoApi, VideoDetail};

lazy_static! {
    static ref HASHTAG_RE: Regex = Regex::new(r"#(\w+)").unwrap();
}

/// Pull hashtags out of a free-text description, leading '#' stripped,
/// first-occurrence order, duplicates dropped.
pub fn extract_hashtags(description: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for caps in HASHTAG_RE.captures_iter(description) {
        let tag = caps[1].to_string();
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

/// Format an integer with comma grouping separators (1234567 -> "1,234,567").
pub fn group_digits(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn parse_count(raw: Option<&str>) -> u64 {
    raw.and_then(|v| v.parse().ok()).unwrap_or(0)
}

fn format_upload_date(published_at: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(published_at)
        .map(|d| d.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|_| published_at.to_string())
}

/// Fold one upstream detail item into the normalized output record.
fn build_record(video: VideoDetail) -> VideoRecord {
    let seconds = parse_iso_duration(&video.content_details.duration);
    let content_type = if seconds < 60 {
        ContentType::ShortForm
    } else {
        ContentType::LongForm
    };

    let thumbnail = video
        .snippet
        .thumbnails
        .medium
        .or(video.snippet.thumbnails.high)
        .or(video.snippet.thumbnails.default)
        .map(|t| t.url)
        .unwrap_or_default();

    // Comments are a tri-state: a structurally absent counter means the
    // channel turned comments off, not that the count is zero.
    let comments = match video.statistics.comment_count.as_deref() {
        Some(count) => group_digits(parse_count(Some(count))),
        None => "Disabled".to_string(),
    };

    VideoRecord {
        url: format!("https://www.youtube.com/watch?v={}", video.id),
        id: video.id,
        title: video.snippet.title,
        views: group_digits(parse_count(video.statistics.view_count.as_deref())),
        likes: group_digits(parse_count(video.statistics.like_count.as_deref())),
        comments,
        upload_date: format_upload_date(&video.snippet.published_at),
        thumbnail,
        duration: format_duration(seconds),
        content_type,
        tags: video.snippet.tags.unwrap_or_default(),
        hashtags: extract_hashtags(&video.snippet.description),
        has_caption: video.content_details.caption.as_deref() == Some("true"),
    }
}

/// Lazy page walk over a channel's uploads playlist. Consumed once; a page
/// token is never reused after it has been spent.
pub struct UploadsEnumerator<'a> {
    api: &'a dyn VideoApi,
    playlist_id: String,
    page_token: Option<String>,
    done: bool,
}

impl<'a> UploadsEnumerator<'a> {
    pub fn new(api: &'a dyn VideoApi, playlist_id: String) -> Self {
        Self {
            api,
            playlist_id,
            page_token: None,
            done: false,
        }
    }

    /// Next page of video ids, or None once the upstream stops handing
    /// back a continuation token.
    pub async fn next_page(&mut self) -> Result<Option<Vec<String>>, AppError> {
        if self.done {
            return Ok(None);
        }

        let token = self.page_token.take();
        let page = self
            .api
            .playlist_items_page(&self.playlist_id, token.as_deref())
            .await?;

        if page.video_ids.is_empty() {
            self.done = true;
            // An empty page that still advertises a continuation is a
            // malformed response, not end of data.
            return match page.next_page_token {
                Some(_) => Err(AppError::Upstream(
                    "YouTube playlist page returned no items".to_string(),
                )),
                None => Ok(None),
            };
        }

        match page.next_page_token {
            Some(token) => self.page_token = Some(token),
            None => self.done = true,
        }

        Ok(Some(page.video_ids))
    }
}

/// Batch-fetch details for one enumerated page and normalize every returned
/// item. Ids with no matching detail record are silently dropped.
pub async fn aggregate_batch(
    api: &dyn VideoApi,
    video_ids: &[String],
) -> Result<Vec<VideoRecord>, AppError> {
    let details = api.video_details(video_ids).await?;
    Ok(details.into_iter().map(build_record).collect())
}

/// Full pipeline for one request: resolve the channel reference, walk its
/// uploads playlist, and aggregate every page into the final record list.
pub async fn fetch_channel_catalog(
    api: &dyn VideoApi,
    channel_input: &str,
) -> Result<Vec<VideoRecord>, AppError> {
    let channel_id = resolver::resolve(api, channel_input).await?;
    tracing::info!("Resolved channel id: {}", channel_id);

    let playlist_id = api
        .uploads_playlist_id(&channel_id)
        .await?
        .ok_or_else(AppError::not_found)?;
    tracing::info!("Uploads playlist id: {}", playlist_id);

    let mut pages = UploadsEnumerator::new(api, playlist_id);
    let mut videos = Vec::new();
    while let Some(video_ids) = pages.next_page().await? {
        let batch = aggregate_batch(api, &video_ids).await?;
        videos.extend(batch);
        tracing::debug!("Fetched {} videos so far", videos.len());
    }

    tracing::info!("Total videos fetched: {}", videos.len());
    Ok(videos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::youtube_client::{
        CaptionTrack, PlaylistPage, Thumbnails, VideoContentDetails, VideoSnippet,
        VideoStatistics,
    };
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn make_detail(id: &str) -> VideoDetail {
        VideoDetail {
            id: id.to_string(),
            snippet: VideoSnippet {
                title: format!("Video {}", id),
                description: String::new(),
                published_at: "2024-01-05T12:00:00Z".to_string(),
                thumbnails: Thumbnails::default(),
                tags: None,
            },
            statistics: VideoStatistics {
                view_count: Some("1234567".to_string()),
                like_count: Some("89".to_string()),
                comment_count: Some("0".to_string()),
            },
            content_details: VideoContentDetails {
                duration: "PT2M10S".to_string(),
                caption: Some("false".to_string()),
            },
        }
    }

    /// Scripted upstream: a fixed list of playlist pages, details echoed
    /// back per id, optional failure on the nth detail call.
    struct FakeUpstream {
        pages: Mutex<Vec<(Vec<String>, Option<String>)>>,
        page_calls: AtomicUsize,
        detail_calls: AtomicUsize,
        fail_detail_call: Option<usize>,
    }

    impl FakeUpstream {
        fn with_pages(pages: Vec<(Vec<String>, Option<String>)>) -> Self {
            Self {
                pages: Mutex::new(pages),
                page_calls: AtomicUsize::new(0),
                detail_calls: AtomicUsize::new(0),
                fail_detail_call: None,
            }
        }

        fn failing_on_detail_call(mut self, call: usize) -> Self {
            self.fail_detail_call = Some(call);
            self
        }
    }

    #[async_trait]
    impl VideoApi for FakeUpstream {
        async fn channel_id_for_handle(&self, _: &str) -> Result<Option<String>, AppError> {
            Ok(Some("UCfake".to_string()))
        }

        async fn channel_id_for_username(&self, _: &str) -> Result<Option<String>, AppError> {
            Ok(Some("UCfake".to_string()))
        }

        async fn uploads_playlist_id(&self, _: &str) -> Result<Option<String>, AppError> {
            Ok(Some("UUfake".to_string()))
        }

        async fn playlist_items_page(
            &self,
            _: &str,
            _: Option<&str>,
        ) -> Result<PlaylistPage, AppError> {
            self.page_calls.fetch_add(1, Ordering::SeqCst);
            let mut pages = self.pages.lock().unwrap();
            if pages.is_empty() {
                panic!("page fetch after enumeration should have stopped");
            }
            let (video_ids, next_page_token) = pages.remove(0);
            Ok(PlaylistPage {
                video_ids,
                next_page_token,
            })
        }

        async fn video_details(&self, ids: &[String]) -> Result<Vec<VideoDetail>, AppError> {
            let call = self.detail_calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_detail_call == Some(call) {
                return Err(AppError::Upstream("videos.list failed".to_string()));
            }
            Ok(ids.iter().map(|id| make_detail(id)).collect())
        }

        async fn caption_tracks(&self, _: &str) -> Result<Vec<CaptionTrack>, AppError> {
            Ok(Vec::new())
        }
    }

    fn ids(prefix: &str, n: usize) -> Vec<String> {
        (0..n).map(|i| format!("{}{}", prefix, i)).collect()
    }

    #[test]
    fn test_group_digits() {
        assert_eq!(group_digits(0), "0");
        assert_eq!(group_digits(999), "999");
        assert_eq!(group_digits(1000), "1,000");
        assert_eq!(group_digits(1234567), "1,234,567");
    }

    #[test]
    fn test_extract_hashtags() {
        assert_eq!(
            extract_hashtags("Check this out #fun #2024test!"),
            vec!["fun".to_string(), "2024test".to_string()]
        );
        assert!(extract_hashtags("no tags here").is_empty());
        // Duplicates collapse to first occurrence.
        assert_eq!(extract_hashtags("#a #b #a"), vec!["a", "b"]);
    }

    #[test]
    fn test_short_form_boundary() {
        let mut video = make_detail("v1");
        video.content_details.duration = "PT59S".to_string();
        assert_eq!(build_record(video).content_type, ContentType::ShortForm);

        let mut video = make_detail("v2");
        video.content_details.duration = "PT1M".to_string();
        assert_eq!(build_record(video).content_type, ContentType::LongForm);
    }

    #[test]
    fn test_comments_disabled_sentinel() {
        let mut video = make_detail("v1");
        video.statistics.comment_count = None;
        assert_eq!(build_record(video).comments, "Disabled");

        let mut video = make_detail("v2");
        video.statistics.comment_count = Some("0".to_string());
        assert_eq!(build_record(video).comments, "0");
    }

    #[test]
    fn test_record_normalization() {
        let mut video = make_detail("abc123");
        video.snippet.description = "launch day #rust #2024test".to_string();
        video.content_details.caption = Some("true".to_string());
        let record = build_record(video);

        assert_eq!(record.views, "1,234,567");
        assert_eq!(record.likes, "89");
        assert_eq!(record.url, "https://www.youtube.com/watch?v=abc123");
        assert_eq!(record.duration, "2:10");
        assert_eq!(record.upload_date, "Jan 5, 2024");
        assert_eq!(record.hashtags, vec!["rust", "2024test"]);
        assert!(record.has_caption);
        assert!(record.tags.is_empty());
    }

    #[test]
    fn test_caption_flag_requires_literal_true() {
        let mut video = make_detail("v1");
        video.content_details.caption = None;
        assert!(!build_record(video).has_caption);

        let mut video = make_detail("v2");
        video.content_details.caption = Some("false".to_string());
        assert!(!build_record(video).has_caption);
    }

    #[test]
    fn test_missing_counters_default_to_zero() {
        let mut video = make_detail("v1");
        video.statistics.view_count = None;
        video.statistics.like_count = Some("not a number".to_string());
        let record = build_record(video);
        assert_eq!(record.views, "0");
        assert_eq!(record.likes, "0");
    }

    #[tokio::test]
    async fn test_enumeration_is_exhaustive() {
        let api = FakeUpstream::with_pages(vec![
            (ids("a", 50), Some("page2".to_string())),
            (ids("b", 50), Some("page3".to_string())),
            (ids("c", 7), None),
        ]);

        let videos = fetch_channel_catalog(&api, "UCfake").await.unwrap();
        assert_eq!(videos.len(), 107);
        // No page fetch happens after the page with no continuation token.
        assert_eq!(api.page_calls.load(Ordering::SeqCst), 3);
        assert_eq!(api.detail_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_empty_playlist_yields_empty_catalog() {
        let api = FakeUpstream::with_pages(vec![(Vec::new(), None)]);
        let videos = fetch_channel_catalog(&api, "UCfake").await.unwrap();
        assert!(videos.is_empty());
    }

    #[tokio::test]
    async fn test_empty_page_with_token_is_upstream_error() {
        let api = FakeUpstream::with_pages(vec![(Vec::new(), Some("dangling".to_string()))]);
        let err = fetch_channel_catalog(&api, "UCfake").await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
    }

    #[tokio::test]
    async fn test_all_or_nothing_on_batch_failure() {
        let api = FakeUpstream::with_pages(vec![
            (ids("a", 50), Some("page2".to_string())),
            (ids("b", 50), None),
        ])
        .failing_on_detail_call(2);

        let result = fetch_channel_catalog(&api, "UCfake").await;
        // The first batch succeeded, but nothing partial leaks out.
        assert!(matches!(result, Err(AppError::Upstream(_))));
    }

    #[tokio::test]
    async fn test_unmatched_ids_are_dropped() {
        struct DroppingUpstream(FakeUpstream);

        #[async_trait]
        impl VideoApi for DroppingUpstream {
            async fn channel_id_for_handle(&self, h: &str) -> Result<Option<String>, AppError> {
                self.0.channel_id_for_handle(h).await
            }
            async fn channel_id_for_username(&self, u: &str) -> Result<Option<String>, AppError> {
                self.0.channel_id_for_username(u).await
            }
            async fn uploads_playlist_id(&self, c: &str) -> Result<Option<String>, AppError> {
                self.0.uploads_playlist_id(c).await
            }
            async fn playlist_items_page(
                &self,
                p: &str,
                t: Option<&str>,
            ) -> Result<PlaylistPage, AppError> {
                self.0.playlist_items_page(p, t).await
            }
            async fn video_details(&self, ids: &[String]) -> Result<Vec<VideoDetail>, AppError> {
                // Upstream knows nothing about the last id of the batch.
                let known = &ids[..ids.len() - 1];
                self.0.video_details(known).await
            }
            async fn caption_tracks(&self, v: &str) -> Result<Vec<CaptionTrack>, AppError> {
                self.0.caption_tracks(v).await
            }
        }

        let api = DroppingUpstream(FakeUpstream::with_pages(vec![(ids("a", 5), None)]));
        let videos = fetch_channel_catalog(&api, "UCfake").await.unwrap();
        assert_eq!(videos.len(), 4);
    }
}
