//! Client Types
//!
//! Request vocabulary (search mode, result sources, model preference) and
//! the error taxonomy for talking to the backend.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Search mode selecting the backend product tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    #[default]
    Auto,
    Pro,
    Reasoning,
    DeepResearch,
}

impl SearchMode {
    /// The request-envelope mode string the backend expects.
    pub fn wire_mode(&self) -> &'static str {
        match self {
            SearchMode::Auto => "concise",
            _ => "copilot",
        }
    }

    /// Default model preference for this mode.
    fn default_preference(&self) -> &'static str {
        match self {
            SearchMode::Auto => "turbo",
            SearchMode::Pro => "pplx_pro",
            SearchMode::Reasoning => "pplx_reasoning",
            SearchMode::DeepResearch => "pplx_alpha",
        }
    }
}

/// Result source selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchSource {
    Web,
    Scholar,
    Social,
}

impl SearchSource {
    /// The source name the backend expects in the request envelope.
    pub fn wire_name(&self) -> &'static str {
        match self {
            SearchSource::Web => "web",
            SearchSource::Scholar => "scholar",
            SearchSource::Social => "social",
        }
    }
}

/// Map a mode plus an optional friendly model name to the backend's
/// model preference tag. Unknown names fall back to the mode default.
pub fn model_preference(mode: SearchMode, model: Option<&str>) -> &'static str {
    let Some(model) = model else {
        return mode.default_preference();
    };
    match (mode, model) {
        (SearchMode::Pro, "sonar") => "experimental",
        (SearchMode::Pro, "gpt-4.5") => "gpt45",
        (SearchMode::Pro, "gpt-4o") => "gpt4o",
        (SearchMode::Pro, "claude 3.7 sonnet") => "claude2",
        (SearchMode::Pro, "gemini 2.0 flash") => "gemini2flash",
        (SearchMode::Pro, "grok-2") => "grok",
        (SearchMode::Reasoning, "r1") => "r1",
        (SearchMode::Reasoning, "o3-mini") => "o3mini",
        (SearchMode::Reasoning, "claude 3.7 sonnet") => "claude37sonnetthinking",
        _ => mode.default_preference(),
    }
}

/// Options for one search request.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub mode: SearchMode,
    /// Friendly model name; `None` uses the mode default.
    pub model: Option<String>,
    pub sources: Vec<SearchSource>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            mode: SearchMode::Auto,
            model: None,
            sources: vec![SearchSource::Web],
        }
    }
}

/// Errors surfaced by the client.
///
/// Transport failures are fatal and propagated; the extraction pipeline
/// never retries. Frame-level decode failures never appear here; they are
/// swallowed inside the pipeline.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("network error: {message}")]
    Network { message: String },

    #[error("authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("rate limited: {message}")]
    RateLimited { message: String },

    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("backend error (HTTP {status}): {message}")]
    ServerError { status: u16, message: String },
}

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Map a non-success HTTP status from the backend to a client error.
pub fn parse_http_error(status: u16, body: &str) -> ClientError {
    match status {
        401 | 403 => ClientError::AuthenticationFailed {
            message: body.to_string(),
        },
        429 => ClientError::RateLimited {
            message: body.to_string(),
        },
        400 => ClientError::InvalidRequest {
            message: body.to_string(),
        },
        _ => ClientError::ServerError {
            status,
            message: body.to_string(),
        },
    }
}
