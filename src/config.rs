//! Process-wide configuration.
//!
//! Parsed once at startup from flags and environment, then shared read-only.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::downloader::FetcherConfig;

/// Where the service is deployed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RuntimeMode {
    /// Developer machine, bound to loopback
    #[default]
    Local,
    /// Hosted platform, bound to all interfaces
    Hosted,
}

impl RuntimeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Hosted => "hosted",
        }
    }

    fn bind_ip(&self) -> IpAddr {
        match self {
            Self::Local => IpAddr::V4(Ipv4Addr::LOCALHOST),
            Self::Hosted => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        }
    }
}

/// Language of user-facing error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Locale {
    #[default]
    En,
    Ar,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "youtube-link-server")]
#[command(about = "Resolves YouTube links into direct stream URLs", version)]
pub struct ServerConfig {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 4000)]
    pub port: u16,

    #[arg(long, env = "APP_MODE", value_enum, default_value_t = RuntimeMode::Local)]
    pub mode: RuntimeMode,

    /// Extra CORS origins (substring match), comma separated
    #[arg(long, env = "ALLOWED_ORIGINS", value_delimiter = ',')]
    pub allowed_origins: Vec<String>,

    /// Path to the yt-dlp binary
    #[arg(long, env = "YTDLP_PATH")]
    pub ytdlp_path: Option<String>,

    /// Upper bound for one extractor run, in seconds
    #[arg(long, env = "EXTRACT_TIMEOUT_SECS", default_value_t = 60)]
    pub extract_timeout_secs: u64,

    #[arg(long, env = "APP_LOCALE", value_enum, default_value_t = Locale::En)]
    pub locale: Locale,

    /// Default log filter when RUST_LOG is unset
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 4000,
            mode: RuntimeMode::Local,
            allowed_origins: Vec::new(),
            ytdlp_path: None,
            extract_timeout_secs: 60,
            locale: Locale::En,
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.mode.bind_ip(), self.port)
    }

    pub fn extract_timeout(&self) -> Duration {
        Duration::from_secs(self.extract_timeout_secs.max(1))
    }

    /// Allow-list entries with blanks removed
    pub fn origin_allow_list(&self) -> Vec<String> {
        self.allowed_origins
            .iter()
            .map(|o| o.trim())
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig::default()
            .with_binary_path(self.ytdlp_path.clone())
            .with_timeout(self.extract_timeout())
    }
}
