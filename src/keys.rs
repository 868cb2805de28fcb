//! API Key Store
//!
//! File-backed registry of issued API keys with usage and token accounting.
//! The store is a plain JSON map on disk, loaded at startup and rewritten on
//! every mutation; the bridge is a single local process, so no finer-grained
//! persistence is needed.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use pplx_bridge_core::{CoreError, CoreResult};

/// Prefix for generated keys, matching the official key shape.
const KEY_PREFIX: &str = "pplx_";

/// Rough token approximation. The backend exposes no tokenizer, so usage is
/// estimated at 1.3 tokens per whitespace-separated word.
pub fn approximate_tokens(text: &str) -> u32 {
    (text.split_whitespace().count() as f64 * 1.3) as u32
}

/// Metadata for one issued key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyEntry {
    pub name: String,
    /// Creation time, unix seconds
    pub created: i64,
    #[serde(default)]
    pub last_used: Option<i64>,
    #[serde(default)]
    pub usage_count: u64,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub total_input_tokens: u64,
    #[serde(default)]
    pub total_output_tokens: u64,
}

fn default_active() -> bool {
    true
}

/// File-backed API key registry.
pub struct ApiKeyStore {
    path: PathBuf,
    keys: Mutex<HashMap<String, ApiKeyEntry>>,
}

impl ApiKeyStore {
    /// Open the store at `path`, loading existing keys. A missing or
    /// unreadable file starts an empty registry.
    pub fn open(path: PathBuf) -> Self {
        let keys = std::fs::read_to_string(&path)
            .ok()
            .and_then(|data| serde_json::from_str(&data).ok())
            .unwrap_or_default();
        Self {
            path,
            keys: Mutex::new(keys),
        }
    }

    fn persist(&self, keys: &HashMap<String, ApiKeyEntry>) -> CoreResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(keys)?;
        std::fs::write(&self.path, data)?;
        Ok(())
    }

    fn locked(&self) -> CoreResult<std::sync::MutexGuard<'_, HashMap<String, ApiKeyEntry>>> {
        self.keys
            .lock()
            .map_err(|_| CoreError::internal("key store lock poisoned"))
    }

    /// Generate, register, and persist a new key.
    pub fn generate(&self, name: impl Into<String>) -> CoreResult<String> {
        let key = format!(
            "{}{}{}",
            KEY_PREFIX,
            Uuid::new_v4().simple(),
            Uuid::new_v4().simple()
        );
        let mut keys = self.locked()?;
        keys.insert(
            key.clone(),
            ApiKeyEntry {
                name: name.into(),
                created: Utc::now().timestamp(),
                last_used: None,
                usage_count: 0,
                active: true,
                total_input_tokens: 0,
                total_output_tokens: 0,
            },
        );
        self.persist(&keys)?;
        Ok(key)
    }

    /// Check whether a key exists and is active.
    pub fn validate(&self, key: &str) -> bool {
        self.keys
            .lock()
            .map(|keys| keys.get(key).is_some_and(|e| e.active))
            .unwrap_or(false)
    }

    /// Record one use of a key.
    pub fn record_usage(&self, key: &str) -> CoreResult<()> {
        let mut keys = self.locked()?;
        if let Some(entry) = keys.get_mut(key) {
            entry.last_used = Some(Utc::now().timestamp());
            entry.usage_count += 1;
            self.persist(&keys)?;
        }
        Ok(())
    }

    /// Add token usage to a key's running totals.
    pub fn record_tokens(&self, key: &str, input_tokens: u32, output_tokens: u32) -> CoreResult<()> {
        let mut keys = self.locked()?;
        if let Some(entry) = keys.get_mut(key) {
            entry.total_input_tokens += u64::from(input_tokens);
            entry.total_output_tokens += u64::from(output_tokens);
            self.persist(&keys)?;
        }
        Ok(())
    }

    /// List all keys with their metadata.
    pub fn list(&self) -> Vec<(String, ApiKeyEntry)> {
        self.keys
            .lock()
            .map(|keys| {
                let mut entries: Vec<_> =
                    keys.iter().map(|(k, e)| (k.clone(), e.clone())).collect();
                entries.sort_by_key(|(_, e)| e.created);
                entries
            })
            .unwrap_or_default()
    }

    /// Remove a key. Returns whether it existed.
    pub fn delete(&self, key: &str) -> CoreResult<bool> {
        let mut keys = self.locked()?;
        let existed = keys.remove(key).is_some();
        if existed {
            self.persist(&keys)?;
        }
        Ok(existed)
    }

    /// Flip a key's active flag. Returns the new state, or `None` if the key
    /// does not exist.
    pub fn toggle(&self, key: &str) -> CoreResult<Option<bool>> {
        let mut keys = self.locked()?;
        let Some(entry) = keys.get_mut(key) else {
            return Ok(None);
        };
        entry.active = !entry.active;
        let active = entry.active;
        self.persist(&keys)?;
        Ok(Some(active))
    }
}
