//! HTTP Client Factory
//!
//! Provides a factory function for building reqwest clients with the default
//! headers the backend requires.

use reqwest::header::{HeaderMap, HeaderValue, COOKIE, USER_AGENT};

/// Browser-like user agent. The backend serves its streamed endpoint to
/// browser sessions and rejects obvious non-browser clients.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Build a `reqwest::Client` for the backend.
///
/// - `Some(cookie)` -> attach the session cookie header to every request
///   (authenticated session)
/// - `None` -> anonymous session
pub fn build_http_client(cookie: Option<&str>) -> reqwest::Client {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));

    if let Some(cookie) = cookie {
        match HeaderValue::from_str(cookie) {
            Ok(value) => {
                headers.insert(COOKIE, value);
            }
            Err(_) => {
                tracing::warn!("cookie contains invalid header bytes, continuing anonymously");
            }
        }
    }

    reqwest::Client::builder()
        .default_headers(headers)
        .build()
        .expect("failed to build reqwest client")
}
