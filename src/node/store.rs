use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Error;

/// Per-node conversion settings. `fiat_currency` drives the structured
/// strategy, the from/to pair drives the textual one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub fiat_currency: String,
    pub from_currency: String,
    pub to_currency: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        NodeConfig {
            fiat_currency: "USD".to_string(),
            from_currency: "CHF".to_string(),
            to_currency: "USD".to_string(),
        }
    }
}

impl NodeConfig {
    /// Builds a config from raw form fields, trimming whitespace. Any empty
    /// field rejects the whole update.
    pub fn from_form(fiat: &str, from: &str, to: &str) -> Result<Self, Error> {
        let config = NodeConfig {
            fiat_currency: fiat.trim().to_string(),
            from_currency: from.trim().to_string(),
            to_currency: to.trim().to_string(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        let fields = [&self.fiat_currency, &self.from_currency, &self.to_currency];
        if fields.iter().any(|f| f.trim().is_empty()) {
            return Err(Error::ConfigInvalid("empty currency".to_string()));
        }
        Ok(())
    }
}

/// External key-value store holding one configuration record per node id.
/// Implementations round-trip on every call; there is no local cache.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn load(&self, node_id: &str) -> Result<Vec<u8>, Error>;
    async fn save(&self, node_id: &str, config: &NodeConfig) -> Result<(), Error>;
}

/// Loads the stored configuration, falling back to defaults when no record
/// exists or the stored bytes fail to parse.
pub async fn load_or_default(store: &dyn ConfigStore, node_id: &str) -> NodeConfig {
    let bytes = match store.load(node_id).await {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!(node_id = %node_id, "no stored config, using defaults: {e}");
            return NodeConfig::default();
        }
    };
    serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        debug!(node_id = %node_id, "stored config unparseable, using defaults: {e}");
        NodeConfig::default()
    })
}

/// Configuration store backed by the workflow host's REST API.
pub struct HttpConfigStore {
    base_url: String,
    client: reqwest::Client,
}

impl HttpConfigStore {
    pub fn new(base_url: &str) -> Self {
        HttpConfigStore {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn config_url(&self, node_id: &str) -> String {
        format!("{}/api/node/{}/config", self.base_url, node_id)
    }
}

#[async_trait]
impl ConfigStore for HttpConfigStore {
    async fn load(&self, node_id: &str) -> Result<Vec<u8>, Error> {
        let response = self
            .client
            .get(self.config_url(node_id))
            .send()
            .await
            .map_err(|e| Error::ConfigStoreFailure(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::ConfigStoreFailure(format!(
                "config load for node {node_id} returned {status}"
            )));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::ConfigStoreFailure(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn save(&self, node_id: &str, config: &NodeConfig) -> Result<(), Error> {
        let response = self
            .client
            .post(self.config_url(node_id))
            .json(config)
            .send()
            .await
            .map_err(|e| Error::ConfigStoreFailure(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::ConfigStoreFailure(format!(
                "config save for node {node_id} returned {status}"
            )));
        }
        Ok(())
    }
}

/// In-memory configuration store, used by tests and standalone runs.
#[derive(Default)]
pub struct MemoryConfigStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn load(&self, node_id: &str) -> Result<Vec<u8>, Error> {
        self.entries
            .read()
            .map_err(|_| Error::ConfigStoreFailure("store lock poisoned".to_string()))?
            .get(node_id)
            .cloned()
            .ok_or_else(|| {
                Error::ConfigStoreFailure(format!("no config stored for node {node_id}"))
            })
    }

    async fn save(&self, node_id: &str, config: &NodeConfig) -> Result<(), Error> {
        let bytes = serde_json::to_vec(config)
            .map_err(|e| Error::ConfigStoreFailure(e.to_string()))?;
        self.entries
            .write()
            .map_err(|_| Error::ConfigStoreFailure("store lock poisoned".to_string()))?
            .insert(node_id.to_string(), bytes);
        Ok(())
    }
}
