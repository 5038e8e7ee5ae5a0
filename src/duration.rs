// ISO 8601 duration handling for YouTube contentDetails.duration values
// (e.g. "PT1H2M3S"). Malformed input decodes to zero rather than erroring.

use regex::Regex;

lazy_static::lazy_static! {
    static ref DURATION_RE: Regex = Regex::new(r"PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?").unwrap();
}

/// Parse an ISO 8601 duration token into total seconds.
pub fn parse_iso_duration(iso: &str) -> u64 {
    let caps = match DURATION_RE.captures(iso) {
        Some(c) => c,
        None => return 0,
    };
    let hours: u64 = caps.get(1).map_or(0, |m| m.as_str().parse().unwrap_or(0));
    let minutes: u64 = caps.get(2).map_or(0, |m| m.as_str().parse().unwrap_or(0));
    let seconds: u64 = caps.get(3).map_or(0, |m| m.as_str().parse().unwrap_or(0));
    hours * 3600 + minutes * 60 + seconds
}

/// Format seconds as a clock string: "H:MM:SS" above an hour, "M:SS" below.
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}
