// Error types for link resolution

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::models::MediaKind;
use crate::config::Locale;

/// Coarse failure taxonomy exposed to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// Missing or malformed URL; the fetcher was never called
    InvalidInput,
    /// Upstream says the video is gone, private or restricted
    ContentUnavailable,
    /// Metadata came back but no stream matched the request
    ExtractionFailed,
    /// The extractor binary could not be started
    ToolUnavailable,
    Unknown,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidInput => "invalidInput",
            Self::ContentUnavailable => "contentUnavailable",
            Self::ExtractionFailed => "extractionFailed",
            Self::ToolUnavailable => "toolUnavailable",
            Self::Unknown => "unknown",
        }
    }
}

/// Why upstream refused to hand out the content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailableReason {
    /// Metadata came back without a title
    NotFound,
    /// "This content isn't available"
    NotAvailable,
    /// Deleted, removed or otherwise "Video unavailable"
    Removed,
    Private,
    AgeRestricted,
    GeoBlocked,
    /// DRM, paid or members-only
    Protected,
}

impl UnavailableReason {
    pub fn description(&self) -> &'static str {
        match self {
            Self::NotFound => "video not found",
            Self::NotAvailable => "content not available",
            Self::Removed => "video unavailable",
            Self::Private => "private video",
            Self::AgeRestricted => "age-restricted video",
            Self::GeoBlocked => "not available in this country",
            Self::Protected => "protected content",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DownloadError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Content unavailable ({}): {detail}", .reason.description())]
    ContentUnavailable {
        reason: UnavailableReason,
        detail: String,
    },

    #[error("No {} format with a direct URL among {available} formats", .kind.as_str())]
    NoMatchingFormat { kind: MediaKind, available: usize },

    /// Binary missing from disk or PATH
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Binary present but not executable by this process
    #[error("Permission denied starting tool: {0}")]
    ToolPermissionDenied(String),

    #[error("Extractor timed out after {0:?}")]
    Timeout(Duration),

    #[error("Extraction cancelled")]
    Cancelled,

    #[error("Parse error: {0}")]
    ParseError(String),

    /// Extractor exited non-zero with an unrecognised message
    #[error("Extractor failed: {0}")]
    ExtractorFailed(String),
}

impl DownloadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidUrl(_) | Self::InvalidRequest(_) => ErrorKind::InvalidInput,
            Self::ContentUnavailable { .. } => ErrorKind::ContentUnavailable,
            Self::NoMatchingFormat { .. } => ErrorKind::ExtractionFailed,
            Self::ToolNotFound(_) | Self::ToolPermissionDenied(_) => ErrorKind::ToolUnavailable,
            Self::Timeout(_) | Self::Cancelled | Self::ParseError(_) | Self::ExtractorFailed(_) => {
                ErrorKind::Unknown
            }
        }
    }

    /// HTTP status for the failure envelope
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidUrl(_) | Self::InvalidRequest(_) => 400,
            Self::ContentUnavailable { .. } => 404,
            Self::Timeout(_) => 504,
            Self::Cancelled => 503,
            Self::NoMatchingFormat { .. }
            | Self::ToolNotFound(_)
            | Self::ToolPermissionDenied(_)
            | Self::ParseError(_)
            | Self::ExtractorFailed(_) => 500,
        }
    }

    /// Caller mistakes and upstream refusals are not operator problems
    pub fn is_client_side(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::InvalidInput | ErrorKind::ContentUnavailable
        )
    }

    /// Message shown in the UI
    pub fn user_message(&self, locale: Locale) -> String {
        match locale {
            Locale::En => self.english_message().to_string(),
            Locale::Ar => self.arabic_message().to_string(),
        }
    }

    fn english_message(&self) -> &'static str {
        match self {
            Self::InvalidUrl(_) => "Invalid YouTube URL",
            Self::InvalidRequest(_) => "Invalid request: expected a URL and a type of video or audio",
            Self::ContentUnavailable { reason, .. } => match reason {
                UnavailableReason::NotFound => "Video not found or not available",
                UnavailableReason::NotAvailable => {
                    "This content isn't available on YouTube. Try another video link."
                }
                UnavailableReason::Removed => "The video is unavailable. Try another link.",
                UnavailableReason::Private => "This is a private video. Try a public video link.",
                UnavailableReason::AgeRestricted => {
                    "This video is age-restricted. Try another link."
                }
                UnavailableReason::GeoBlocked => {
                    "This video is not available in the server's region. Try another link."
                }
                UnavailableReason::Protected => {
                    "This video is protected and cannot be downloaded. Try another link."
                }
            },
            Self::NoMatchingFormat { .. } => {
                "Could not extract download URL. Try a different quality or type."
            }
            Self::ToolNotFound(_) => "YouTube downloader service is not available on this server",
            Self::ToolPermissionDenied(_) => {
                "Server does not have permission to access YouTube downloader"
            }
            Self::Timeout(_) => "YouTube took too long to respond. Please try again.",
            Self::Cancelled => "The server is shutting down. Please try again shortly.",
            Self::ParseError(_) | Self::ExtractorFailed(_) => {
                "An error occurred while processing your request. Check the link and try again."
            }
        }
    }

    fn arabic_message(&self) -> &'static str {
        match self {
            Self::ContentUnavailable { reason, .. } => match reason {
                UnavailableReason::Removed => "الفيديو غير متاح. جرب رابط آخر.",
                UnavailableReason::Private => "هذا فيديو خاص. جرب رابط فيديو عام.",
                UnavailableReason::AgeRestricted => "هذا الفيديو مقيد بالعمر. جرب رابط آخر.",
                UnavailableReason::NotFound
                | UnavailableReason::NotAvailable
                | UnavailableReason::GeoBlocked
                | UnavailableReason::Protected => {
                    "هذا المحتوى غير متاح على YouTube. جرب رابط فيديو آخر."
                }
            },
            Self::Timeout(_) | Self::Cancelled | Self::ParseError(_) | Self::ExtractorFailed(_) => {
                "حدث خطأ أثناء معالجة طلبك. تأكد من أن الرابط صحيح وجرب مرة أخرى."
            }
            // Operator-facing and validation messages stay in English
            _ => self.english_message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_status_mapping() {
        let cases = [
            (DownloadError::InvalidUrl("ftp://x".into()), ErrorKind::InvalidInput, 400),
            (
                DownloadError::ContentUnavailable {
                    reason: UnavailableReason::Private,
                    detail: "ERROR: Private video".into(),
                },
                ErrorKind::ContentUnavailable,
                404,
            ),
            (
                DownloadError::NoMatchingFormat { kind: MediaKind::Audio, available: 0 },
                ErrorKind::ExtractionFailed,
                500,
            ),
            (DownloadError::ToolNotFound("yt-dlp".into()), ErrorKind::ToolUnavailable, 500),
            (DownloadError::Timeout(Duration::from_secs(60)), ErrorKind::Unknown, 504),
            (DownloadError::Cancelled, ErrorKind::Unknown, 503),
        ];

        for (error, kind, status) in cases {
            assert_eq!(error.kind(), kind, "{error}");
            assert_eq!(error.http_status(), status, "{error}");
        }
    }

    #[test]
    fn test_extraction_failed_is_distinct_from_unavailable() {
        let no_format = DownloadError::NoMatchingFormat { kind: MediaKind::Video, available: 3 };
        assert_ne!(no_format.kind(), ErrorKind::ContentUnavailable);
        assert!(!no_format.is_client_side());
    }

    #[test]
    fn test_arabic_falls_back_to_english_for_operator_errors() {
        let error = DownloadError::ToolNotFound("yt-dlp".into());
        assert_eq!(error.user_message(Locale::Ar), error.user_message(Locale::En));

        let private = DownloadError::ContentUnavailable {
            reason: UnavailableReason::Private,
            detail: String::new(),
        };
        assert_ne!(private.user_message(Locale::Ar), private.user_message(Locale::En));
    }

    #[test]
    fn test_error_kind_serializes_camel_case() {
        let json = serde_json::to_string(&ErrorKind::ToolUnavailable).unwrap();
        assert_eq!(json, "\"toolUnavailable\"");
        assert_eq!(ErrorKind::ToolUnavailable.as_str(), "toolUnavailable");
    }
}
