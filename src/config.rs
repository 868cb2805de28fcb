//! Server Configuration
//!
//! Environment-driven configuration for the bridge server.

use std::path::PathBuf;

use pplx_bridge_core::{CoreError, CoreResult};

/// Default listen port for the local bridge.
const DEFAULT_PORT: u16 = 8765;

/// Configuration read once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen port (`PORT`)
    pub port: u16,
    /// Backend session cookie header (`PERPLEXITY_COOKIE`); `None` runs the
    /// backend client anonymously
    pub cookie: Option<String>,
    /// API key store location (`PPLX_BRIDGE_KEYS`)
    pub keys_path: PathBuf,
}

impl ServerConfig {
    /// Read configuration from the environment.
    pub fn from_env() -> CoreResult<Self> {
        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| CoreError::config(format!("invalid PORT value: {}", raw)))?,
            Err(_) => DEFAULT_PORT,
        };

        let cookie = std::env::var("PERPLEXITY_COOKIE")
            .ok()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        let keys_path = std::env::var("PPLX_BRIDGE_KEYS")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_keys_path());

        Ok(Self {
            port,
            cookie,
            keys_path,
        })
    }
}

fn default_keys_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pplx-bridge")
        .join("api_keys.json")
}
