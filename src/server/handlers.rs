//! HTTP handlers

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{error, info, warn};

use super::AppState;
use crate::downloader::{DownloadError, DownloadPayload, DownloadResult, Failure, Stage};

/// Liveness probe
pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "message": "YouTube Downloader Backend is running!",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": now_rfc3339(),
        "environment": state.config.mode.as_str(),
    }))
}

pub async fn api_test() -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "message": "API is working!",
        "timestamp": now_rfc3339(),
    }))
}

/// Resolve a form submission into a direct link envelope
pub async fn download(
    State(state): State<AppState>,
    payload: Result<Json<DownloadPayload>, JsonRejection>,
) -> Response {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            let failure = Failure {
                stage: Stage::Validating,
                error: DownloadError::InvalidRequest(rejection.body_text()),
            };
            return failure_response(&state, failure);
        }
    };

    match state.downloader.handle(&payload).await {
        Ok(download_url) => {
            info!("download URL extracted successfully");
            (StatusCode::OK, Json(DownloadResult::ok(download_url))).into_response()
        }
        Err(failure) => failure_response(&state, failure),
    }
}

fn failure_response(state: &AppState, failure: Failure) -> Response {
    let Failure { stage, error } = failure;

    if error.is_client_side() {
        warn!(stage = %stage, kind = error.kind().as_str(), "{}", error);
    } else {
        error!(stage = %stage, kind = error.kind().as_str(), "{}", error);
    }

    let status =
        StatusCode::from_u16(error.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = DownloadResult::failed(error.kind(), error.user_message(state.config.locale));
    (status, Json(body)).into_response()
}

fn now_rfc3339() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(&Rfc3339)
        .unwrap_or_else(|_| now.unix_timestamp().to_string())
}
