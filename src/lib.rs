//! Resolves a YouTube link into a direct video or audio stream URL.
//!
//! Extraction is delegated to `yt-dlp`; this crate validates and normalizes the
//! link, picks one stream out of the reported formats and maps every failure to
//! a JSON envelope.

pub mod config;
pub mod downloader;
pub mod logging;
pub mod server;

pub use config::{Locale, RuntimeMode, ServerConfig};
pub use downloader::{
    DownloadError, DownloadResult, Downloader, ErrorKind, MediaKind, MetadataFetcher,
};
pub use server::{build_router, run_server, serve_with_listener, AppState};
