//! Top-level application configuration

use super::*;
use crate::utils::error::{AppError, Result};
use serde::{Deserialize, Serialize};

/// Every configuration section, as read from YAML
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub uploads: UploadConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Defaults overlaid with environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Overlay values from a variable lookup onto this configuration
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("TASKHUB_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("TASKHUB_PORT").or_else(|| lookup("PORT")) {
            self.server.port = parse_env("TASKHUB_PORT", &port)?;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.storage.database.url = url;
        }
        if let Some(secret) = lookup("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(expiration) = lookup("JWT_EXPIRATION") {
            self.auth.jwt_expiration = parse_env("JWT_EXPIRATION", &expiration)?;
        }
        if let Some(origin) = lookup("CLIENT_URL") {
            self.server.cors.allowed_origins = vec![origin];
        }
        if let Some(dir) = lookup("UPLOAD_DIR") {
            self.uploads.directory = dir;
        }
        if let Some(size) = lookup("MAX_FILE_SIZE") {
            self.uploads.max_file_size = parse_env("MAX_FILE_SIZE", &size)?;
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::Config(format!("Invalid value for {}: {}", key, value)))
}
