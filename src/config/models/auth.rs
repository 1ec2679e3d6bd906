//! Authentication configuration

use super::*;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to sign bearer tokens
    pub jwt_secret: String,
    /// Token lifetime in seconds
    #[serde(default = "default_jwt_expiration")]
    pub jwt_expiration: u64,
    /// Token issuer
    #[serde(default = "default_issuer")]
    pub issuer: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me-in-production-0123456789-abcdef".to_string(),
            jwt_expiration: default_jwt_expiration(),
            issuer: default_issuer(),
        }
    }
}

impl AuthConfig {
    /// Validate auth configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.jwt_secret.len() < 32 {
            return Err("JWT secret must be at least 32 characters long".to_string());
        }
        if self.jwt_expiration < 300 {
            return Err("JWT expiration should be at least 5 minutes (300 seconds)".to_string());
        }
        if self.issuer.is_empty() {
            return Err("JWT issuer cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Log a warning when the built-in secret is still in use
pub fn warn_insecure_config(config: &AuthConfig) {
    if config.jwt_secret == AuthConfig::default().jwt_secret {
        warn!("Using the default JWT secret. Set JWT_SECRET before deploying.");
    }
}

fn default_issuer() -> String {
    "taskhub".to_string()
}
