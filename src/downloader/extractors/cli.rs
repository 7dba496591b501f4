// yt-dlp MetadataFetcher - runs the native `yt-dlp` binary
//
// One subprocess per request: `--dump-single-json` on stdout is the metadata
// document, stderr is the failure text on a non-zero exit.

use async_trait::async_trait;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::diagnostics::classify_failure;
use super::traits::{FetcherConfig, MetadataFetcher};
use crate::downloader::errors::DownloadError;
use crate::downloader::models::{MediaMetadata, StreamFormat};
use crate::downloader::utils::run_output_with_timeout;

const YTDLP_BINARY: &str = "yt-dlp";

const COMMON_PATHS: [&str; 3] = [
    "/opt/homebrew/bin/yt-dlp",
    "/usr/local/bin/yt-dlp",
    "/usr/bin/yt-dlp",
];

/// Subprocess-backed fetcher
pub struct YtDlpFetcher {
    ytdlp_path: String,
    config: FetcherConfig,
    cancel: CancellationToken,
}

impl YtDlpFetcher {
    /// Use `config.binary_path` as given, or bare `yt-dlp` resolved through `PATH`
    /// at spawn time. `cancel` aborts every in-flight run, e.g. on server shutdown
    pub fn new(config: FetcherConfig, cancel: CancellationToken) -> Self {
        let ytdlp_path = config
            .binary_path
            .clone()
            .unwrap_or_else(|| YTDLP_BINARY.to_string());
        Self {
            ytdlp_path,
            config,
            cancel,
        }
    }

    /// Like `new`, but without an explicit path checks the usual install
    /// locations first, which a service manager's `PATH` often leaves out
    pub async fn discover(config: FetcherConfig, cancel: CancellationToken) -> Self {
        let mut fetcher = Self::new(config, cancel);
        if fetcher.config.binary_path.is_none() {
            if let Some(path) = Self::find_installed().await {
                fetcher.ytdlp_path = path;
            }
        }
        fetcher
    }

    pub fn binary_path(&self) -> &str {
        &self.ytdlp_path
    }

    async fn find_installed() -> Option<String> {
        for path in COMMON_PATHS {
            if tokio::fs::try_exists(path).await.unwrap_or(false) {
                return Some(path.to_string());
            }
        }
        None
    }

    /// Version string, or `None` when the binary cannot run
    pub async fn version(&self) -> Option<String> {
        let out = run_output_with_timeout(
            &self.ytdlp_path,
            &["--version".to_string()],
            self.config.timeout,
            &self.cancel,
        )
        .await
        .ok()?;

        out.status
            .success()
            .then(|| String::from_utf8_lossy(&out.stdout).trim().to_string())
    }

    fn build_args(&self, url: &str) -> Vec<String> {
        let mut args = vec![
            "--dump-single-json".to_string(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "--socket-timeout".to_string(),
            self.config.timeout.as_secs().max(1).to_string(),
            "--add-header".to_string(),
            format!("referer:{}", self.config.referer),
            "--add-header".to_string(),
            format!("user-agent:{}", self.config.user_agent),
        ];

        if self.config.no_check_certificates {
            args.push("--no-check-certificates".to_string());
        }
        if self.config.prefer_free_formats {
            args.push("--prefer-free-formats".to_string());
        }

        // End option parsing so a URL can never be read as a flag
        args.push("--".to_string());
        args.push(url.to_string());
        args
    }

    fn parse_json(stdout: &[u8]) -> Result<MediaMetadata, DownloadError> {
        let raw: RawInfo = serde_json::from_slice(stdout)
            .map_err(|e| DownloadError::ParseError(format!("Invalid JSON: {}", e)))?;

        Ok(MediaMetadata {
            title: raw.title.unwrap_or_default(),
            duration_seconds: raw.duration.map(|d| d.max(0.0) as u64).unwrap_or(0),
            thumbnail_url: raw.thumbnail.unwrap_or_default(),
            formats: raw.formats.into_iter().map(RawFormat::into_stream_format).collect(),
        })
    }
}

#[async_trait]
impl MetadataFetcher for YtDlpFetcher {
    fn name(&self) -> &'static str {
        "cli-yt-dlp"
    }

    async fn fetch_metadata(&self, url: &str) -> Result<MediaMetadata, DownloadError> {
        let args = self.build_args(url);
        debug!(binary = %self.ytdlp_path, args = %args.join(" "), "running extractor");

        let out = run_output_with_timeout(&self.ytdlp_path, &args, self.config.timeout, &self.cancel)
            .await?;

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            warn!(status = %out.status, stderr = %stderr.trim(), "extractor exited with failure");
            return Err(classify_failure(&stderr));
        }

        Self::parse_json(&out.stdout)
    }
}

/// Subset of the extractor's JSON document we read
#[derive(Debug, Deserialize)]
struct RawInfo {
    title: Option<String>,
    duration: Option<f64>,
    thumbnail: Option<String>,
    #[serde(default)]
    formats: Vec<RawFormat>,
}

#[derive(Debug, Deserialize)]
struct RawFormat {
    #[serde(default)]
    format_id: String,
    ext: Option<String>,
    vcodec: Option<String>,
    acodec: Option<String>,
    format_note: Option<String>,
    filesize: Option<f64>,
    filesize_approx: Option<f64>,
    url: Option<String>,
}

impl RawFormat {
    fn into_stream_format(self) -> StreamFormat {
        // A missing codec field counts as present; only an explicit "none" rules it out
        let has_audio = self.acodec.as_deref() != Some("none");
        let has_video = self.vcodec.as_deref() != Some("none");

        StreamFormat {
            id: self.format_id,
            has_audio,
            has_video,
            quality_label: self.format_note,
            container: self.ext,
            file_size_bytes: self.filesize.or(self.filesize_approx).map(|s| s.max(0.0) as u64),
            resource_url: self.url.unwrap_or_default(),
        }
    }
}
