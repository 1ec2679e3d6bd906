//! Configuration loading and the `run_server` entry point

use crate::config::Config;
use crate::utils::error::Result;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

/// Where the running configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Environment,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::Environment => write!(f, "environment variables"),
        }
    }
}

/// Read `path` when it exists, otherwise defaults overlaid with the environment
///
/// A config file that exists but fails to parse or validate is an error
/// rather than a silent fallback.
pub async fn load_config(path: &Path) -> Result<(Config, ConfigSource)> {
    if tokio::fs::try_exists(path).await.unwrap_or(false) {
        let config = Config::from_file(path).await?;
        return Ok((config, ConfigSource::File(path.to_path_buf())));
    }
    Ok((Config::from_env()?, ConfigSource::Environment))
}

/// Run the server until it is stopped
pub async fn run_server(config: Config) -> Result<()> {
    info!("Starting TaskHub v{}", crate::VERSION);

    let hub = crate::TaskHub::new(config.clone()).await?;
    info!("Server starting at: http://{}", config.server().address());
    info!("API endpoints:");
    info!("   GET  /api/health - Health check");
    info!("   POST /api/auth/login - Sign in");
    info!("   GET  /api/workspaces - Workspaces");
    info!("   GET  /api/socket - Realtime updates");

    hub.run().await
}
