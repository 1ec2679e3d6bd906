//! Storage configuration

use super::*;
use serde::{Deserialize, Serialize};

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Document database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL; `memory://` keeps documents in process
    #[serde(default = "default_database_url")]
    pub url: String,
    /// Maximum connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Connection timeout in seconds
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
            connection_timeout: default_connection_timeout(),
        }
    }
}

impl DatabaseConfig {
    /// Whether the in-process store is selected
    pub fn is_memory(&self) -> bool {
        self.url.starts_with("memory://")
    }

    /// Validate database configuration
    pub fn validate(&self) -> Result<(), String> {
        let supported = ["memory://", "sqlite:", "postgres://", "postgresql://"];
        if !supported.iter().any(|scheme| self.url.starts_with(scheme)) {
            return Err(format!("Unsupported database URL: {}", self.url));
        }
        if self.max_connections == 0 {
            return Err("Max connections cannot be 0".to_string());
        }
        Ok(())
    }
}

fn default_database_url() -> String {
    "memory://".to_string()
}
