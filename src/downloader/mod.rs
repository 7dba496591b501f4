// Downloader module - resolves a link into one direct stream URL

pub mod errors;
pub mod extractors;
pub mod format_selector;
pub mod models;
pub mod orchestrator;
pub mod url;
pub mod utils;

pub use errors::{DownloadError, ErrorKind, UnavailableReason};
pub use extractors::{FetcherConfig, MetadataFetcher, YtDlpFetcher};
pub use format_selector::FormatSelector;
pub use models::{DownloadPayload, DownloadResult, MediaKind, MediaMetadata, MediaRequest, StreamFormat};
pub use orchestrator::{Downloader, Failure, Stage};
