// Common data models for link resolution

use serde::{Deserialize, Serialize};

use super::errors::ErrorKind;

/// Which stream the caller wants a link for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Video,
    Audio,
}

impl MediaKind {
    /// Parse the `type` field sent by the form
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "video" => Some(Self::Video),
            "audio" => Some(Self::Audio),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }
}

/// Raw form body, before validation. `url` stays untyped so a non-string can be
/// reported as invalid input instead of a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DownloadPayload {
    #[serde(default)]
    pub url: serde_json::Value,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub quality: Option<String>,
}

/// A validated request for one direct link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRequest {
    pub url: String,
    pub kind: MediaKind,
    /// Free-form preference matched against `StreamFormat::quality_label`
    pub quality_hint: Option<String>,
}

/// One concrete stream variant reported by the metadata fetcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamFormat {
    /// Extractor format id (e.g., "140", "18")
    pub id: String,
    pub has_audio: bool,
    pub has_video: bool,
    /// Human label such as "720p" or "medium"
    pub quality_label: Option<String>,
    /// Container tag (mp4, webm, m4a)
    pub container: Option<String>,
    pub file_size_bytes: Option<u64>,
    /// Direct, time-limited link owned by the upstream host. Empty when unknown.
    pub resource_url: String,
}

impl StreamFormat {
    /// Audio track only
    pub fn is_audio_only(&self) -> bool {
        self.has_audio && !self.has_video
    }

    /// Audio and video muxed together
    pub fn is_combined(&self) -> bool {
        self.has_audio && self.has_video
    }

    pub fn has_resource_url(&self) -> bool {
        !self.resource_url.trim().is_empty()
    }

    pub fn is_m4a(&self) -> bool {
        self.container
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case("m4a"))
    }
}

/// Metadata document produced fresh for every request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaMetadata {
    pub title: String,
    pub duration_seconds: u64,
    pub thumbnail_url: String,
    /// Ordered as the fetcher reported them
    pub formats: Vec<StreamFormat>,
}

/// JSON envelope returned to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(default, rename = "error", skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl DownloadResult {
    pub fn ok(download_url: impl Into<String>) -> Self {
        Self {
            success: true,
            download_url: Some(download_url.into()),
            error_kind: None,
            error_message: None,
        }
    }

    pub fn failed(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            download_url: None,
            error_kind: Some(kind),
            error_message: Some(message.into()),
        }
    }
}
