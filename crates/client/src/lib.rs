//! pplx-bridge Client
//!
//! Client for the Perplexity web search backend: request construction, the
//! streamed transport, and the frame-to-answer extraction pipeline.
//!
//! The backend pushes its response as SSE-style event frames with
//! inconsistent framing, partial-answer resends, and a double-JSON-encoded
//! terminal structure. This crate folds that stream into one reliable answer
//! string, in batch or streaming form.

pub mod http_client;
pub mod perplexity;
pub mod streaming_adapters;
pub mod types;

// Re-export main types
pub use http_client::build_http_client;
pub use perplexity::{ClientConfig, PerplexityClient};
pub use types::*;

// Re-export the stream adapter and resolution types
pub use streaming_adapters::{
    classify_frame, BackendEvent, MessagePayload, PerplexityAdapter, ResolutionState, NO_ANSWER,
};
