//! Application State
//!
//! Shared state handed to every route handler.

use std::sync::Arc;

use pplx_bridge_client::PerplexityClient;

use crate::keys::ApiKeyStore;

/// Server-wide state. Cloned per request; the backend client shares only a
/// connection pool and the key store is internally synchronized.
#[derive(Clone)]
pub struct AppState {
    /// Client for the search backend
    pub client: PerplexityClient,
    /// Issued API keys with usage accounting
    pub keys: Arc<ApiKeyStore>,
}

impl AppState {
    pub fn new(client: PerplexityClient, keys: Arc<ApiKeyStore>) -> Self {
        Self { client, keys }
    }
}
