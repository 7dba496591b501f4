//! Cross-origin policy for the web form

use std::sync::Arc;

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::debug;

const LOCAL_ORIGIN_PREFIXES: [&str; 4] = [
    "http://localhost",
    "https://localhost",
    "http://127.0.0.1",
    "https://127.0.0.1",
];

/// Static hosting platforms the form is usually deployed to
const HOSTED_ORIGIN_SUFFIXES: [&str; 2] = ["vercel.app", "netlify.app"];

/// Whether a browser origin may call the API.
///
/// Entries in `allow_list` match as substrings of the origin.
pub fn is_origin_allowed(origin: &str, allow_list: &[String]) -> bool {
    LOCAL_ORIGIN_PREFIXES.iter().any(|p| origin.starts_with(p))
        || HOSTED_ORIGIN_SUFFIXES.iter().any(|h| origin.contains(h))
        || allow_list.iter().any(|allowed| origin.contains(allowed.as_str()))
}

/// Requests without an `Origin` header pass through untouched; disallowed
/// origins get no CORS headers and the browser blocks the response.
pub fn cors_layer(allow_list: Vec<String>) -> CorsLayer {
    let allow_list = Arc::new(allow_list);

    let allow_origin = AllowOrigin::predicate(move |origin: &HeaderValue, _| {
        let allowed = origin
            .to_str()
            .is_ok_and(|value| is_origin_allowed(value, &allow_list));
        if !allowed {
            debug!(origin = ?origin, "CORS origin rejected");
        }
        allowed
    });

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_origins() {
        assert!(is_origin_allowed("http://localhost:5173", &[]));
        assert!(is_origin_allowed("https://127.0.0.1:3000", &[]));
        assert!(!is_origin_allowed("http://192.168.1.10:5173", &[]));
    }

    #[test]
    fn test_hosting_platforms() {
        assert!(is_origin_allowed("https://my-app.vercel.app", &[]));
        assert!(is_origin_allowed("https://my-app.netlify.app", &[]));
        assert!(!is_origin_allowed("https://evil.example", &[]));
    }

    #[test]
    fn test_configured_allow_list() {
        let list = vec!["downloader.example.org".to_string()];
        assert!(is_origin_allowed("https://downloader.example.org", &list));
        assert!(!is_origin_allowed("https://other.example.org", &list));
    }
}
