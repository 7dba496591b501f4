// MetadataFetcher trait and its configuration

use std::time::Duration;

use async_trait::async_trait;

use crate::downloader::errors::DownloadError;
use crate::downloader::models::MediaMetadata;

/// Browser identification sent to YouTube with every extractor request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";

pub const DEFAULT_REFERER: &str = "youtube.com";

/// Options passed to the extractor on every call
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Explicit extractor binary; discovered on common paths when `None`
    pub binary_path: Option<String>,
    /// Hard upper bound on one extractor run
    pub timeout: Duration,
    pub user_agent: String,
    pub referer: String,
    /// Skip TLS certificate validation (`--no-check-certificates`)
    pub no_check_certificates: bool,
    /// Prefer open containers when the extractor orders formats
    pub prefer_free_formats: bool,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            binary_path: None,
            timeout: Duration::from_secs(60),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            referer: DEFAULT_REFERER.to_string(),
            no_check_certificates: true,
            prefer_free_formats: true,
        }
    }
}

impl FetcherConfig {
    pub fn with_binary_path(mut self, path: Option<String>) -> Self {
        self.binary_path = path;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Resolves a media URL into structured format metadata.
///
/// Injected into the request pipeline so tests can substitute a stub.
#[async_trait]
pub trait MetadataFetcher: Send + Sync {
    /// Name of the fetcher (for logging)
    fn name(&self) -> &'static str {
        "metadata-fetcher"
    }

    async fn fetch_metadata(&self, url: &str) -> Result<MediaMetadata, DownloadError>;
}
