//! Perplexity Backend Client
//!
//! Drives one search request against the backend's server-push endpoint and
//! extracts the answer: POST the request envelope, then fold the response
//! byte stream frame-by-frame through the adapter until the terminal event
//! or transport close.
//!
//! Each call owns its own frame buffer and resolution state; concurrent
//! requests run as independent pipeline instances with nothing shared. The
//! client enforces no timeout of its own; the transport layer owns that
//! policy.

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;

use pplx_bridge_core::streaming::{FrameBuffer, SearchStreamEvent, StreamAdapter};

use crate::http_client::build_http_client;
use crate::streaming_adapters::PerplexityAdapter;
use crate::types::{model_preference, parse_http_error, ClientError, ClientResult, SearchOptions};

/// Default backend endpoint
const PERPLEXITY_API_URL: &str = "https://www.perplexity.ai/rest/sse/perplexity_ask";

/// Request envelope version the backend currently accepts.
const ENVELOPE_VERSION: &str = "2.18";

/// Client configuration.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// Session cookie header for authenticated requests
    pub cookie: Option<String>,
    /// Endpoint override (tests, self-hosted relays)
    pub base_url: Option<String>,
}

/// Client for the backend's streamed ask endpoint.
///
/// Cheap to clone; clones share only the connection pool, never request
/// state.
#[derive(Clone)]
pub struct PerplexityClient {
    config: ClientConfig,
    client: reqwest::Client,
}

impl PerplexityClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig) -> Self {
        let client = build_http_client(config.cookie.as_deref());
        Self { config, client }
    }

    /// Get the endpoint URL.
    fn base_url(&self) -> &str {
        self.config.base_url.as_deref().unwrap_or(PERPLEXITY_API_URL)
    }

    /// Build the request envelope for one query.
    fn build_request_body(&self, query: &str, options: &SearchOptions) -> serde_json::Value {
        let sources: Vec<&str> = options.sources.iter().map(|s| s.wire_name()).collect();
        serde_json::json!({
            "query_str": query,
            "params": {
                "attachments": [],
                "frontend_context_uuid": Uuid::new_v4().to_string(),
                "frontend_uuid": Uuid::new_v4().to_string(),
                "is_incognito": false,
                "language": "en-US",
                "last_backend_uuid": null,
                "mode": options.mode.wire_mode(),
                "model_preference": model_preference(options.mode, options.model.as_deref()),
                "source": "default",
                "sources": sources,
                "version": ENVELOPE_VERSION,
            }
        })
    }

    /// Batch mode: consume the whole stream, suppress intermediate output,
    /// and return only the finalized answer.
    pub async fn search(&self, query: &str, options: &SearchOptions) -> ClientResult<String> {
        self.run(query, options, None).await
    }

    /// Streaming mode: forward each event through `tx` as it is produced,
    /// then return the finalized answer.
    ///
    /// A closed receiver cancels the request: reading stops and the
    /// transport is released, with no partial state reported.
    pub async fn search_with_events(
        &self,
        query: &str,
        options: &SearchOptions,
        tx: mpsc::Sender<SearchStreamEvent>,
    ) -> ClientResult<String> {
        self.run(query, options, Some(tx)).await
    }

    /// Spawned streaming mode: the answer as a finite sequence of events,
    /// ending when the backend stream completes or the transport closes.
    /// Transport failures arrive in-band as `SearchStreamEvent::Error`.
    pub fn stream_search(
        &self,
        query: impl Into<String>,
        options: SearchOptions,
    ) -> ReceiverStream<SearchStreamEvent> {
        let (tx, rx) = mpsc::channel(32);
        let client = self.clone();
        let query = query.into();
        tokio::spawn(async move {
            if let Err(e) = client.search_with_events(&query, &options, tx.clone()).await {
                let _ = tx
                    .send(SearchStreamEvent::Error {
                        message: e.to_string(),
                    })
                    .await;
            }
        });
        ReceiverStream::new(rx)
    }

    async fn run(
        &self,
        query: &str,
        options: &SearchOptions,
        tx: Option<mpsc::Sender<SearchStreamEvent>>,
    ) -> ClientResult<String> {
        let body = self.build_request_body(query, options);

        let response = self
            .client
            .post(self.base_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| ClientError::Network {
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        if status != 200 {
            let body_text = response.text().await.unwrap_or_default();
            return Err(parse_http_error(status, &body_text));
        }

        let mut adapter = PerplexityAdapter::new();
        let mut frames = FrameBuffer::new();
        let mut stream = response.bytes_stream();
        let mut done = false;

        'read: while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| ClientError::Network {
                message: e.to_string(),
            })?;
            frames.push(&chunk);

            while let Some(frame) = frames.next_frame() {
                let events = match adapter.adapt(&frame) {
                    Ok(events) => events,
                    Err(e) => {
                        tracing::warn!(error = %e, "skipping unadaptable frame");
                        continue;
                    }
                };
                for event in events {
                    if matches!(event, SearchStreamEvent::Complete) {
                        done = true;
                    }
                    if let Some(tx) = &tx {
                        if tx.send(event).await.is_err() {
                            // Caller dropped the receiver: stop reading and
                            // release the transport.
                            tracing::debug!("stream receiver closed, aborting read");
                            break 'read;
                        }
                    }
                }
                if done {
                    break 'read;
                }
            }
        }

        // The transport may close without an explicit end_of_stream frame;
        // whatever is still buffered feeds the fold the same way.
        if !done {
            if let Some(frame) = frames.take_remainder() {
                if let Ok(events) = adapter.adapt(&frame) {
                    if let Some(tx) = &tx {
                        for event in events {
                            let _ = tx.send(event).await;
                        }
                    }
                }
            }
        }

        Ok(adapter.finish())
    }
}
