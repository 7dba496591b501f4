//! HTTP surface: JSON API consumed by the web form

mod cors;
mod handlers;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::downloader::{Downloader, MetadataFetcher, YtDlpFetcher};

pub use cors::{cors_layer, is_origin_allowed};

/// Shared, read-only state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub downloader: Downloader,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(fetcher: Arc<dyn MetadataFetcher>, config: Arc<ServerConfig>) -> Self {
        Self {
            downloader: Downloader::new(fetcher),
            config,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(state.config.origin_allow_list());

    Router::new()
        .route("/", get(handlers::health))
        .route("/api/test", get(handlers::api_test))
        .route("/api/download", post(handlers::download))
        .route("/download", post(handlers::download))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serve on an already bound listener until `shutdown` is cancelled
pub async fn serve_with_listener(
    listener: TcpListener,
    state: AppState,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}

/// Bind, wire the yt-dlp fetcher and serve until `shutdown` is cancelled.
///
/// In-flight extractor runs are killed when `shutdown` fires.
pub async fn run_server(
    config: ServerConfig,
    shutdown: CancellationToken,
) -> Result<(), Box<dyn std::error::Error>> {
    let fetcher = YtDlpFetcher::discover(config.fetcher_config(), shutdown.child_token()).await;
    match fetcher.version().await {
        Some(version) => info!(binary = fetcher.binary_path(), %version, "yt-dlp found"),
        None => warn!(
            binary = fetcher.binary_path(),
            "yt-dlp is not runnable; download requests will fail until it is installed"
        ),
    }

    let addr = config.bind_addr();
    let mode = config.mode;
    let state = AppState::new(Arc::new(fetcher), Arc::new(config));

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, mode = mode.as_str(), "YouTube downloader backend running");

    serve_with_listener(listener, state, shutdown).await?;
    info!("server stopped");
    Ok(())
}
