//! HTTP Routes
//!
//! The OpenAI-compatible surface over the extraction pipeline. Tools that
//! speak the official Perplexity (or OpenAI) chat-completions API point
//! their base URL here and keep working unchanged.

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

use pplx_bridge_client::{SearchMode, SearchOptions, SearchSource};
use pplx_bridge_core::recovery::recover_structured;

use crate::keys::approximate_tokens;
use crate::state::AppState;

/// Build the router with all routes and CORS enabled.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/chat/completions", post(chat_completions))
        .route("/v1/chat/completions", post(chat_completions))
        .route("/models", get(list_models))
        .route("/health", get(health))
        .route("/api/generate-key", post(generate_key))
        .route("/api/list-keys", get(list_keys))
        .route("/api/delete-key", post(delete_key))
        .route("/api/toggle-key", post(toggle_key))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ============================================================================
// Request/response shapes
// ============================================================================

#[derive(Debug, Deserialize)]
struct ChatCompletionRequest {
    #[serde(default)]
    messages: Vec<ChatMessage>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    sources: Option<Vec<String>>,
    #[serde(default)]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Debug, Deserialize)]
struct GenerateKeyRequest {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct KeyActionRequest {
    #[serde(default)]
    key: Option<String>,
}

type ApiError = (StatusCode, Json<Value>);

fn api_error(status: StatusCode, error_type: &str, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(json!({
            "error": {
                "message": message.into(),
                "type": error_type,
            }
        })),
    )
}

// ============================================================================
// Helpers
// ============================================================================

/// Extract the API key from the Authorization header. Supports both
/// "Bearer <key>" and a bare key.
fn bearer_key(headers: &HeaderMap) -> Option<String> {
    let auth = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    Some(auth.strip_prefix("Bearer ").unwrap_or(auth).to_string())
}

/// Map OpenAI-style model names (and direct mode names) to a search mode.
fn mode_for_model(model: &str) -> SearchMode {
    match model.to_lowercase().as_str() {
        "sonar" | "sonar-small" | "sonar-medium" | "auto" => SearchMode::Auto,
        "sonar-pro" | "pro" => SearchMode::Pro,
        "sonar-reasoning" | "sonar-reasoning-pro" | "reasoning" => SearchMode::Reasoning,
        "sonar-deep-research" | "deep research" => SearchMode::DeepResearch,
        _ => SearchMode::Auto,
    }
}

/// Parse the optional request source list; unrecognized names are dropped
/// and an absent or empty list defaults to web.
fn parse_sources(raw: Option<&[String]>) -> Vec<SearchSource> {
    let sources: Vec<SearchSource> = raw
        .unwrap_or_default()
        .iter()
        .filter_map(|s| match s.as_str() {
            "web" => Some(SearchSource::Web),
            "scholar" => Some(SearchSource::Scholar),
            "social" => Some(SearchSource::Social),
            _ => None,
        })
        .collect();
    if sources.is_empty() {
        vec![SearchSource::Web]
    } else {
        sources
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn chat_completions(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ChatCompletionRequest>,
) -> Result<Json<Value>, ApiError> {
    let key = bearer_key(&headers).filter(|k| state.keys.validate(k)).ok_or_else(|| {
        api_error(
            StatusCode::UNAUTHORIZED,
            "invalid_request_error",
            "Invalid API key",
        )
    })?;
    if let Err(e) = state.keys.record_usage(&key) {
        tracing::warn!(error = %e, "failed to record key usage");
    }

    let model = req.model.as_deref().unwrap_or("sonar").to_string();

    // The query is the first user message in the conversation.
    let Some(query) = req
        .messages
        .iter()
        .find(|m| m.role == "user")
        .map(|m| m.content.clone())
    else {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "invalid_request_error",
            "No user message found in messages array",
        ));
    };

    let options = SearchOptions {
        mode: mode_for_model(&model),
        model: None,
        sources: parse_sources(req.sources.as_deref()),
    };
    let expects_json = req
        .response_format
        .as_ref()
        .is_some_and(|f| f.format_type == "json_object");

    tracing::info!(model = %model, mode = ?options.mode, "chat completion request");
    let started = std::time::Instant::now();

    let answer = state.client.search(&query, &options).await.map_err(|e| {
        tracing::error!(error = %e, "backend request failed");
        api_error(StatusCode::BAD_GATEWAY, "server_error", e.to_string())
    })?;

    tracing::info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        "answer resolved"
    );

    // Callers expecting structured output get the recovered JSON substring
    // when the backend wrapped it in prose.
    let answer = recover_structured(&answer, expects_json).to_string();

    let prompt_tokens = approximate_tokens(&query);
    let completion_tokens = approximate_tokens(&answer);
    if let Err(e) = state.keys.record_tokens(&key, prompt_tokens, completion_tokens) {
        tracing::warn!(error = %e, "failed to record token usage");
    }

    let now = Utc::now().timestamp();
    Ok(Json(json!({
        "id": format!("chatcmpl-{}", now),
        "object": "chat.completion",
        "created": now,
        "model": model,
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": answer,
            },
            "finish_reason": "stop"
        }],
        "usage": {
            "prompt_tokens": prompt_tokens,
            "completion_tokens": completion_tokens,
            "total_tokens": prompt_tokens + completion_tokens
        }
    })))
}

async fn list_models() -> Json<Value> {
    let models = [
        "sonar",
        "sonar-pro",
        "sonar-reasoning",
        "sonar-reasoning-pro",
        "sonar-deep-research",
    ];
    Json(json!({
        "object": "list",
        "data": models
            .iter()
            .map(|id| json!({
                "id": id,
                "object": "model",
                "created": 1234567890,
                "owned_by": "perplexity"
            }))
            .collect::<Vec<_>>(),
    }))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "pplx-bridge",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn generate_key(
    State(state): State<AppState>,
    body: Option<Json<GenerateKeyRequest>>,
) -> Result<Json<Value>, ApiError> {
    let name = body
        .and_then(|Json(b)| b.name)
        .unwrap_or_else(|| "Unnamed Key".to_string());

    let key = state.keys.generate(name).map_err(|e| {
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "server_error", e.to_string())
    })?;
    Ok(Json(json!({ "success": true, "api_key": key })))
}

async fn list_keys(State(state): State<AppState>) -> Json<Value> {
    let keys: Vec<Value> = state
        .keys
        .list()
        .into_iter()
        .map(|(full_key, entry)| {
            let mut obj = serde_json::to_value(entry).unwrap_or_else(|_| json!({}));
            obj["full_key"] = json!(full_key);
            obj
        })
        .collect();
    Json(json!({ "success": true, "keys": keys }))
}

async fn delete_key(
    State(state): State<AppState>,
    Json(req): Json<KeyActionRequest>,
) -> Result<Json<Value>, ApiError> {
    let Some(key) = req.key else {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "invalid_request_error",
            "No key specified",
        ));
    };
    state.keys.delete(&key).map_err(|e| {
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "server_error", e.to_string())
    })?;
    Ok(Json(json!({ "success": true })))
}

async fn toggle_key(
    State(state): State<AppState>,
    Json(req): Json<KeyActionRequest>,
) -> Result<Json<Value>, ApiError> {
    let Some(key) = req.key else {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "invalid_request_error",
            "No key specified",
        ));
    };
    match state.keys.toggle(&key).map_err(|e| {
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "server_error", e.to_string())
    })? {
        Some(active) => Ok(Json(json!({ "success": true, "active": active }))),
        None => Err(api_error(
            StatusCode::NOT_FOUND,
            "invalid_request_error",
            "Key not found",
        )),
    }
}
