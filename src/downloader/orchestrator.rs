// Request pipeline: validate -> fetch -> select -> respond

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, Instrument};

use super::errors::{DownloadError, UnavailableReason};
use super::extractors::{classify_failure, MetadataFetcher};
use super::format_selector::FormatSelector;
use super::models::{DownloadPayload, MediaKind, MediaRequest};
use super::url::{has_http_scheme, is_youtube_url, normalize_youtube_url};

/// Where a request is in its lifecycle; failures are logged with the stage they hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validating,
    Fetching,
    Selecting,
    Responding,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validating => write!(f, "validating"),
            Self::Fetching => write!(f, "fetching"),
            Self::Selecting => write!(f, "selecting"),
            Self::Responding => write!(f, "responding"),
        }
    }
}

/// A failed request together with the stage that failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub stage: Stage,
    pub error: DownloadError,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.stage, self.error)
    }
}

impl std::error::Error for Failure {}

/// Resolves one request into one direct link
#[derive(Clone)]
pub struct Downloader {
    fetcher: Arc<dyn MetadataFetcher>,
}

impl Downloader {
    pub fn new(fetcher: Arc<dyn MetadataFetcher>) -> Self {
        Self { fetcher }
    }

    /// Check the raw body before anything else runs
    pub fn validate(payload: &DownloadPayload) -> Result<MediaRequest, DownloadError> {
        let url = match payload.url.as_str() {
            Some(url) => url.trim(),
            None if payload.url.is_null() => {
                return Err(DownloadError::InvalidUrl("missing url".to_string()))
            }
            None => return Err(DownloadError::InvalidUrl("url must be a string".to_string())),
        };

        if url.is_empty() || !has_http_scheme(url) {
            return Err(DownloadError::InvalidUrl(url.to_string()));
        }

        let kind = match payload.kind.as_deref() {
            None => MediaKind::default(),
            Some(value) => MediaKind::parse(value).ok_or_else(|| {
                DownloadError::InvalidRequest(format!("unsupported type {:?}", value))
            })?,
        };

        let quality_hint = payload
            .quality
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string);

        Ok(MediaRequest {
            url: url.to_string(),
            kind,
            quality_hint,
        })
    }

    /// Run the whole pipeline for one form submission
    pub async fn handle(&self, payload: &DownloadPayload) -> Result<String, Failure> {
        let request = Self::validate(payload).map_err(|error| Failure {
            stage: Stage::Validating,
            error,
        })?;

        let span = tracing::info_span!(
            "download",
            kind = request.kind.as_str(),
            quality = request.quality_hint.as_deref().unwrap_or("best"),
        );
        self.resolve(&request).instrument(span).await
    }

    /// Fetch metadata for a validated request and pick its stream
    pub async fn resolve(&self, request: &MediaRequest) -> Result<String, Failure> {
        let url = normalize_youtube_url(&request.url);
        if !is_youtube_url(&url) {
            debug!(url = %url, "not a YouTube link, passing through to extractor");
        }

        debug!(stage = %Stage::Fetching, fetcher = self.fetcher.name(), url = %url);
        let fail_fetch = |error: DownloadError| Failure {
            stage: Stage::Fetching,
            error,
        };
        let metadata = self
            .fetcher
            .fetch_metadata(&url)
            .await
            .map_err(|error| fail_fetch(classify_fetch_error(error)))?;

        if metadata.title.trim().is_empty() {
            return Err(fail_fetch(DownloadError::ContentUnavailable {
                reason: UnavailableReason::NotFound,
                detail: format!("no title in metadata for {}", url),
            }));
        }

        debug!(
            stage = %Stage::Selecting,
            title = %metadata.title,
            formats = metadata.formats.len(),
        );
        let chosen = FormatSelector::select(
            &metadata.formats,
            request.kind,
            request.quality_hint.as_deref(),
        )
        .ok_or_else(|| Failure {
            stage: Stage::Selecting,
            error: DownloadError::NoMatchingFormat {
                kind: request.kind,
                available: metadata.formats.len(),
            },
        })?;

        info!(
            stage = %Stage::Responding,
            format_id = %chosen.id,
            quality = chosen.quality_label.as_deref().unwrap_or("-"),
            "format selected"
        );
        Ok(chosen.resource_url.clone())
    }
}

/// Unclassified failure text from any fetcher is matched against the known phrases
fn classify_fetch_error(error: DownloadError) -> DownloadError {
    match error {
        DownloadError::ExtractorFailed(detail) => classify_failure(&detail),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::downloader::errors::ErrorKind;
    use crate::downloader::models::{MediaMetadata, StreamFormat};

    /// Returns a canned result and remembers what it was asked
    struct StubFetcher {
        result: Result<MediaMetadata, DownloadError>,
        calls: AtomicUsize,
        last_url: Mutex<Option<String>>,
    }

    impl StubFetcher {
        fn new(result: Result<MediaMetadata, DownloadError>) -> Arc<Self> {
            Arc::new(Self {
                result,
                calls: AtomicUsize::new(0),
                last_url: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl MetadataFetcher for StubFetcher {
        async fn fetch_metadata(&self, url: &str) -> Result<MediaMetadata, DownloadError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_url.lock().unwrap() = Some(url.to_string());
            self.result.clone()
        }
    }

    fn metadata(formats: Vec<StreamFormat>) -> MediaMetadata {
        MediaMetadata {
            title: "Sample".to_string(),
            duration_seconds: 10,
            thumbnail_url: String::new(),
            formats,
        }
    }

    fn audio_m4a(url: &str) -> StreamFormat {
        StreamFormat {
            id: "140".to_string(),
            has_audio: true,
            has_video: false,
            quality_label: None,
            container: Some("m4a".to_string()),
            file_size_bytes: None,
            resource_url: url.to_string(),
        }
    }

    fn payload(value: serde_json::Value) -> DownloadPayload {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_validate_rejects_non_http() {
        for url in [json!(null), json!(42), json!(""), json!("ftp://youtu.be/x"), json!("youtu.be/x")] {
            let err = Downloader::validate(&payload(json!({ "url": url, "type": "video" }))).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput);
        }
    }

    #[test]
    fn test_validate_defaults_and_trims() {
        let request = Downloader::validate(&payload(json!({
            "url": " https://youtu.be/dQw4w9WgXcQ ",
            "quality": "  "
        })))
        .unwrap();

        assert_eq!(request.url, "https://youtu.be/dQw4w9WgXcQ");
        assert_eq!(request.kind, MediaKind::Video);
        assert_eq!(request.quality_hint, None);
    }

    #[test]
    fn test_validate_rejects_unknown_type() {
        let err = Downloader::validate(&payload(json!({
            "url": "https://youtu.be/dQw4w9WgXcQ",
            "type": "subtitles"
        })))
        .unwrap_err();
        assert!(matches!(err, DownloadError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_invalid_input_never_calls_fetcher() {
        let stub = StubFetcher::new(Ok(metadata(vec![])));
        let downloader = Downloader::new(stub.clone());

        let failure = downloader
            .handle(&payload(json!({ "url": "file:///etc/passwd", "type": "audio" })))
            .await
            .unwrap_err();

        assert_eq!(failure.stage, Stage::Validating);
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fetcher_receives_normalized_url() {
        let stub = StubFetcher::new(Ok(metadata(vec![audio_m4a("https://cdn.example/a.m4a")])));
        let downloader = Downloader::new(stub.clone());

        let url = downloader
            .handle(&payload(json!({ "url": "https://youtu.be/dQw4w9WgXcQ", "type": "audio" })))
            .await
            .unwrap();

        assert_eq!(url, "https://cdn.example/a.m4a");
        assert_eq!(
            stub.last_url.lock().unwrap().as_deref(),
            Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
        );
    }

    #[tokio::test]
    async fn test_empty_formats_is_extraction_failed() {
        let stub = StubFetcher::new(Ok(metadata(vec![])));
        let downloader = Downloader::new(stub);

        let failure = downloader
            .handle(&payload(json!({ "url": "https://youtu.be/dQw4w9WgXcQ", "type": "video" })))
            .await
            .unwrap_err();

        assert_eq!(failure.stage, Stage::Selecting);
        assert_eq!(failure.error.kind(), ErrorKind::ExtractionFailed);
    }

    #[tokio::test]
    async fn test_missing_title_is_not_found() {
        let mut untitled = metadata(vec![audio_m4a("https://cdn.example/a.m4a")]);
        untitled.title.clear();
        let downloader = Downloader::new(StubFetcher::new(Ok(untitled)));

        let failure = downloader
            .handle(&payload(json!({ "url": "https://youtu.be/dQw4w9WgXcQ", "type": "audio" })))
            .await
            .unwrap_err();

        assert_eq!(failure.stage, Stage::Fetching);
        assert_eq!(failure.error.kind(), ErrorKind::ContentUnavailable);
        assert_eq!(failure.error.http_status(), 404);
    }

    #[tokio::test]
    async fn test_fetch_error_is_passed_through() {
        let stub = StubFetcher::new(Err(DownloadError::Timeout(Duration::from_secs(60))));
        let downloader = Downloader::new(stub.clone());

        let failure = downloader
            .handle(&payload(json!({ "url": "https://youtu.be/dQw4w9WgXcQ" })))
            .await
            .unwrap_err();

        assert_eq!(failure.stage, Stage::Fetching);
        assert_eq!(failure.error, DownloadError::Timeout(Duration::from_secs(60)));
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_raw_fetch_failure_is_classified() {
        let stub = StubFetcher::new(Err(DownloadError::ExtractorFailed(
            "ERROR: [youtube] dQw4w9WgXcQ: Private video. Sign in if you've been granted access".to_string(),
        )));
        let downloader = Downloader::new(stub);

        let failure = downloader
            .handle(&payload(json!({ "url": "https://youtu.be/dQw4w9WgXcQ", "type": "video" })))
            .await
            .unwrap_err();

        assert_eq!(failure.stage, Stage::Fetching);
        assert_eq!(
            failure.error,
            DownloadError::ContentUnavailable {
                reason: UnavailableReason::Private,
                detail: "ERROR: [youtube] dQw4w9WgXcQ: Private video. Sign in if you've been granted access"
                    .to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_unrecognised_fetch_failure_stays_unknown() {
        let stub = StubFetcher::new(Err(DownloadError::ExtractorFailed(
            "ERROR: Unsupported URL: https://example.com".to_string(),
        )));
        let downloader = Downloader::new(stub);

        let failure = downloader
            .handle(&payload(json!({ "url": "https://example.com" })))
            .await
            .unwrap_err();

        assert_eq!(failure.error.kind(), ErrorKind::Unknown);
        assert_eq!(failure.error.http_status(), 500);
    }
}
