use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{Result, RsInitError};
use crate::settle::SettlePolicy;
use crate::types::ReplicaSetConfig;

pub const DEFAULT_URI: &str = "mongodb://localhost:27017";
pub const DEFAULT_SERVER_SELECTION_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    pub uri: String,
    pub server_selection_timeout_ms: u64,
    pub app_name: Option<String>,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            uri: DEFAULT_URI.to_string(),
            server_selection_timeout_ms: DEFAULT_SERVER_SELECTION_TIMEOUT_MS,
            app_name: Some("rsinit".to_string()),
        }
    }
}

impl ConnectionSettings {
    pub fn server_selection_timeout(&self) -> Duration {
        Duration::from_millis(self.server_selection_timeout_ms)
    }
}

/// Everything one run needs: where to connect, what to initiate, how to wait.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitConfig {
    pub connection: ConnectionSettings,
    pub replica_set: ReplicaSetConfig,
    pub settle: SettlePolicy,
}

impl InitConfig {
    /// Load configuration from a JSON file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RsInitError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config: InitConfig = serde_json::from_str(&content).map_err(|e| {
            RsInitError::Config(format!("failed to parse {}: {}", path.display(), e))
        })?;
        config.validate()?;

        tracing::info!(
            "Loaded config from {}: set={}, members={}",
            path.display(),
            config.replica_set.id,
            config.replica_set.members.len()
        );
        Ok(config)
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.connection.uri.trim().is_empty() {
            return Err(RsInitError::Config("connection uri must not be empty".into()));
        }
        self.replica_set.validate()
    }
}
