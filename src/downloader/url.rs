// YouTube URL helpers
//
// Pure string transforms, no network access.

use regex::Regex;

lazy_static::lazy_static! {
    /// Captures the 11-char video id from every link shape we understand
    static ref VIDEO_ID_RE: Regex = Regex::new(
        r"(?i)^(?:https?://)?(?:[a-z0-9-]+\.)*(?:youtube\.com/(?:watch\?(?:[^#]*&)?v=|embed/|v/|shorts/)|youtu\.be/)([A-Za-z0-9_-]{11})(?:[^A-Za-z0-9_-]|$)"
    ).unwrap();

    /// Same host test the web form applies before submitting
    static ref YOUTUBE_HOST_RE: Regex = Regex::new(
        r"(?i)^(?:https?://)?(?:www\.)?(?:youtube\.com|youtu\.be|music\.youtube\.com)/.+$"
    ).unwrap();
}

const CANONICAL_WATCH_PREFIX: &str = "https://www.youtube.com/watch?v=";

/// Extract the video id from a recognised YouTube link
pub fn extract_video_id(raw: &str) -> Option<&str> {
    VIDEO_ID_RE
        .captures(raw.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Rewrite any recognised YouTube link to `https://www.youtube.com/watch?v=<id>`.
///
/// Input that carries no recognisable id is returned unchanged; the extractor
/// may still accept it.
pub fn normalize_youtube_url(raw: &str) -> String {
    match extract_video_id(raw) {
        Some(id) => format!("{}{}", CANONICAL_WATCH_PREFIX, id),
        None => raw.to_string(),
    }
}

/// True when the string starts with an `http://` or `https://` scheme
pub fn has_http_scheme(raw: &str) -> bool {
    let lower = raw.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Loose host check for youtube.com, youtu.be and music.youtube.com links
pub fn is_youtube_url(raw: &str) -> bool {
    YOUTUBE_HOST_RE.is_match(raw.trim())
}
