//! pplx-bridge - Rust Backend Library
//!
//! Local OpenAI-compatible API server bridging tools that expect the official
//! Perplexity API to the free web backend. It includes:
//! - OpenAI-shaped HTTP routes (`/chat/completions`, `/models`, `/health`)
//! - API key registry with usage and token accounting
//! - Environment-driven server configuration

pub mod config;
pub mod keys;
pub mod routes;
pub mod state;

// Re-export commonly used items
pub use config::ServerConfig;
pub use keys::{approximate_tokens, ApiKeyEntry, ApiKeyStore};
pub use routes::router;
pub use state::AppState;
