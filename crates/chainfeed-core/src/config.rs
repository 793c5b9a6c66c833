//! ChainFeed configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::FeedError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub reader: ReaderConfig,
}

impl FeedConfig {
    /// Parse a JSON document. Missing sections take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, FeedError> {
        serde_json::from_str(json).map_err(|e| FeedError::Config(e.to_string()))
    }

    /// Load a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FeedError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| FeedError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&raw)
    }
}

/// Log level per component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Global default level: "trace" | "debug" | "info" | "warn" | "error"
    #[serde(default = "default_level")]
    pub level: String,
    /// Override per component: component_name → level
    #[serde(default)]
    pub components: HashMap<String, String>,
    /// Emit JSON structured logs (true) or human-readable text (false)
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            components: HashMap::new(),
            json: false,
        }
    }
}

impl LogConfig {
    /// Build an `EnvFilter`-style directive string, e.g. `info,chainfeed_core=debug`.
    pub fn directives(&self) -> String {
        let mut components: Vec<_> = self.components.iter().collect();
        components.sort();
        let mut directives = self.level.clone();
        for (component, level) in components {
            directives.push_str(&format!(",{}={}", component.replace('-', "_"), level));
        }
        directives
    }
}

/// Event query limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Maximum number of events a single filter request may return.
    #[serde(default = "default_logs_limit")]
    pub logs_limit: u64,
}

fn default_logs_limit() -> u64 { 1_000 }

impl Default for QueryConfig {
    fn default() -> Self {
        Self { logs_limit: default_logs_limit() }
    }
}

/// Block reader settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// Cap on blocks returned per read by engines that support it.
    #[serde(default)]
    pub batch_limit: Option<usize>,
}
