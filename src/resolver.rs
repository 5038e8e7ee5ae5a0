// Channel reference resolution.
// Users paste anything from full channel URLs (current and legacy formats)
// to bare @handles or raw channel ids. The input is classified once into a
// tagged variant, then each variant resolves with at most one API lookup.

use crate::error::AppError;
use crate::youtube_client::VideoApi;

/// Result of classifying a raw channel reference. Precedence is fixed:
/// handle URLs win over /channel/ URLs, which win over legacy /c/ and
/// /user/ URLs; anything unrecognized passes through as a raw id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelRef {
    /// An @handle, from a URL or bare input. Needs a forHandle lookup.
    Handle(String),
    /// A /channel/<id> URL; the id is canonical already, no lookup.
    DirectId(String),
    /// A /c/<name> or /user/<name> URL. Needs a forUsername lookup.
    LegacyUsername(String),
    /// Unrecognized input, treated as an already-canonical id. The
    /// subsequent channel lookup surfaces the failure if it is not one.
    RawId(String),
}

fn segment_after<'a>(input: &'a str, marker: &str) -> Option<&'a str> {
    let rest = &input[input.find(marker)? + marker.len()..];
    Some(rest.split('/').next().unwrap_or(rest))
}

pub fn classify(input: &str) -> ChannelRef {
    let input = input.trim();
    let has_host = input.contains("youtube.com") || input.contains("youtu.be");

    if has_host {
        if let Some(handle) = segment_after(input, "/@") {
            return ChannelRef::Handle(handle.to_string());
        }
        if let Some(id) = segment_after(input, "/channel/") {
            return ChannelRef::DirectId(id.to_string());
        }
        if let Some(name) = segment_after(input, "/c/").or_else(|| segment_after(input, "/user/")) {
            return ChannelRef::LegacyUsername(name.to_string());
        }
    } else if let Some(handle) = input.strip_prefix('@') {
        return ChannelRef::Handle(handle.to_string());
    }

    ChannelRef::RawId(input.to_string())
}

/// Resolve an arbitrary channel reference to the canonical channel id.
pub async fn resolve(api: &dyn VideoApi, input: &str) -> Result<String, AppError> {
    match classify(input) {
        ChannelRef::Handle(handle) => {
            tracing::info!("Resolving channel by handle: {}", handle);
            api.channel_id_for_handle(&handle)
                .await?
                .ok_or_else(AppError::not_found)
        }
        ChannelRef::LegacyUsername(username) => {
            tracing::info!("Resolving channel by legacy username: {}", username);
            api.channel_id_for_username(&username)
                .await?
                .ok_or_else(AppError::not_found)
        }
        ChannelRef::DirectId(id) | ChannelRef::RawId(id) => Ok(id),
    }
}
