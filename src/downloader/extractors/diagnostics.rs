// Extractor failure diagnostics
//
// yt-dlp reports every failure as free text on stderr. This module matches that
// text against known phrases and turns it into a typed `DownloadError`.

use lazy_static::lazy_static;
use regex::Regex;

use crate::downloader::errors::{DownloadError, UnavailableReason};

/// Why the extractor refused or failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockingReason {
    /// "This content isn't available"
    ContentNotAvailable,
    /// Deleted or removed
    VideoUnavailable,
    PrivateVideo,
    AgeRestricted,
    GeoBlocked,
    /// DRM, paid or members-only content
    Protected,
    /// 429 / too many requests
    RateLimited,
    /// "Sign in to confirm you're not a bot"
    BotDetection,
    NetworkTimeout,
    /// The extractor's own interpreter or helper is missing
    ToolMissing,
    ToolPermission,
    Unknown,
}

/// Phrases per reason, checked in order; the first hit wins
const PATTERNS: &[(BlockingReason, &[&str])] = &[
    (
        BlockingReason::ContentNotAvailable,
        &["this content isn't available", "this content isn’t available"],
    ),
    (
        BlockingReason::VideoUnavailable,
        &["video unavailable", "has been removed", "no longer available", "video is unavailable"],
    ),
    (BlockingReason::PrivateVideo, &["private video", "video is private"]),
    (
        BlockingReason::AgeRestricted,
        &["age-restricted", "confirm your age", "age restricted"],
    ),
    (
        BlockingReason::GeoBlocked,
        &["not available in your country", "blocked in your country"],
    ),
    (
        BlockingReason::Protected,
        &["drm", "members only", "members-only", "requires payment", "youtube premium"],
    ),
    (BlockingReason::RateLimited, &["http error 429", "too many requests"]),
    (BlockingReason::BotDetection, &["not a bot", "captcha", "unusual traffic"]),
    (
        BlockingReason::NetworkTimeout,
        &["timed out", "timeout", "connection refused", "network is unreachable"],
    ),
    (BlockingReason::ToolMissing, &["command not found", "no module named"]),
    (BlockingReason::ToolPermission, &["permission denied"]),
];

lazy_static! {
    // `[youtube] <video id>:` and URLs are echoed back verbatim and may contain any letters
    static ref ECHOED_INPUT_RE: Regex =
        Regex::new(r"\[[^\]\n]+\]\s*[^\s:]+:|https?://\S+").unwrap();

    static ref RULES: Vec<(BlockingReason, Regex)> = PATTERNS
        .iter()
        .map(|(reason, phrases)| (*reason, phrase_regex(phrases)))
        .collect();
}

/// Case-insensitive alternation that only matches whole words
fn phrase_regex(phrases: &[&str]) -> Regex {
    let alternatives: Vec<String> = phrases.iter().map(|p| regex::escape(p)).collect();
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternatives.join("|"))).unwrap()
}

impl BlockingReason {
    fn unavailable_reason(&self) -> Option<UnavailableReason> {
        match self {
            Self::ContentNotAvailable => Some(UnavailableReason::NotAvailable),
            Self::VideoUnavailable => Some(UnavailableReason::Removed),
            Self::PrivateVideo => Some(UnavailableReason::Private),
            Self::AgeRestricted => Some(UnavailableReason::AgeRestricted),
            Self::GeoBlocked => Some(UnavailableReason::GeoBlocked),
            Self::Protected => Some(UnavailableReason::Protected),
            _ => None,
        }
    }

    /// Build the typed error carrying the raw extractor text as detail
    pub fn into_error(self, detail: String) -> DownloadError {
        if let Some(reason) = self.unavailable_reason() {
            return DownloadError::ContentUnavailable { reason, detail };
        }

        match self {
            Self::ToolMissing => DownloadError::ToolNotFound(detail),
            Self::ToolPermission => DownloadError::ToolPermissionDenied(detail),
            _ => DownloadError::ExtractorFailed(detail),
        }
    }
}

/// Match extractor output against the known phrases
pub fn diagnose_error(error: &str) -> BlockingReason {
    let message = ECHOED_INPUT_RE.replace_all(error, " ");

    RULES
        .iter()
        .find(|(_, rule)| rule.is_match(&message))
        .map(|(reason, _)| *reason)
        .unwrap_or(BlockingReason::Unknown)
}

/// Classify a failed extractor run
pub fn classify_failure(stderr: &str) -> DownloadError {
    let detail = summarize(stderr);
    diagnose_error(stderr).into_error(detail)
}

/// The first `ERROR:` line is the useful one; fall back to the whole text
fn summarize(stderr: &str) -> String {
    stderr
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with("ERROR:"))
        .unwrap_or_else(|| stderr.trim())
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downloader::errors::ErrorKind;

    #[test]
    fn test_private_video() {
        let stderr = "ERROR: [youtube] abc: Private video. Sign in if you've been granted access";
        assert_eq!(diagnose_error(stderr), BlockingReason::PrivateVideo);
        assert_eq!(classify_failure(stderr).kind(), ErrorKind::ContentUnavailable);
    }

    #[test]
    fn test_content_not_available() {
        let stderr = "ERROR: [youtube] abc: This content isn't available.";
        assert_eq!(diagnose_error(stderr), BlockingReason::ContentNotAvailable);
    }

    #[test]
    fn test_video_unavailable() {
        let stderr = "ERROR: [youtube] abc: Video unavailable. This video has been removed by the uploader";
        assert_eq!(diagnose_error(stderr), BlockingReason::VideoUnavailable);
        assert_eq!(
            classify_failure(stderr),
            DownloadError::ContentUnavailable {
                reason: UnavailableReason::Removed,
                detail: stderr.to_string(),
            }
        );
    }

    #[test]
    fn test_age_restricted() {
        let stderr = "ERROR: [youtube] abc: Sign in to confirm your age. This video may be inappropriate";
        assert_eq!(diagnose_error(stderr), BlockingReason::AgeRestricted);
    }

    #[test]
    fn test_rate_limit_is_not_a_content_restriction() {
        let stderr = "ERROR: unable to download video data: HTTP Error 429: Too Many Requests";
        assert_eq!(diagnose_error(stderr), BlockingReason::RateLimited);
        assert_eq!(classify_failure(stderr).kind(), ErrorKind::Unknown);
    }

    #[test]
    fn test_missing_interpreter_is_tool_unavailable() {
        let stderr = "/usr/bin/env: 'python3': No such file or directory\nsh: python3: command not found";
        assert_eq!(classify_failure(stderr).kind(), ErrorKind::ToolUnavailable);
    }

    #[test]
    fn test_unknown_keeps_error_line() {
        let stderr = "WARNING: something\nERROR: Unsupported URL: https://example.com\n";
        let error = classify_failure(stderr);
        assert_eq!(
            error,
            DownloadError::ExtractorFailed("ERROR: Unsupported URL: https://example.com".to_string())
        );
    }

    #[test]
    fn test_video_id_is_not_matched_as_a_phrase() {
        let stderr = "ERROR: [youtube] aDrM1234567: Unable to download API page: HTTP Error 429: Too Many Requests";
        assert_eq!(diagnose_error(stderr), BlockingReason::RateLimited);

        let error = classify_failure(stderr);
        assert_eq!(error.kind(), ErrorKind::Unknown);
        assert_eq!(error.http_status(), 500);
    }

    #[test]
    fn test_phrases_match_whole_words_only() {
        let stderr = "ERROR: [generic] clip: Unable to extract data from https://cdn.example/drm/timeout";
        assert_eq!(diagnose_error(stderr), BlockingReason::Unknown);

        let protected = "ERROR: [youtube] abcdefghijk: This video is DRM protected";
        assert_eq!(diagnose_error(protected), BlockingReason::Protected);
    }
}
