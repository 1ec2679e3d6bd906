//! # TaskHub
//!
//! A collaborative project-management backend: workspaces with role-based
//! membership, teams, projects with sections and custom fields, tasks with
//! subtasks, dependencies, comments and attachments, rule-based automations,
//! notifications, an activity feed, and realtime room broadcasts over a
//! WebSocket.
//!
//! ## Running
//!
//! ```rust,no_run
//! use taskhub::{Config, TaskHub};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config/taskhub.yaml").await?;
//!     TaskHub::new(config).await?.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! Documents live behind [`storage::Store`], either in process or in a
//! SeaORM-managed SQLite/Postgres table; all business rules sit in
//! [`services`] and the HTTP layer in [`server`] only extracts and shapes.

#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod auth;
pub mod config;
pub mod models;
pub mod realtime;
pub mod server;
pub mod services;
pub mod storage;
pub mod utils;

pub use config::Config;
pub use utils::error::{AppError, Result};

use tracing::info;

/// A configured TaskHub server
pub struct TaskHub {
    server: server::server::HttpServer,
}

impl TaskHub {
    /// Open storage and build the application state
    pub async fn new(config: Config) -> Result<Self> {
        info!("Creating TaskHub instance");
        let server = server::server::HttpServer::new(&config).await?;
        Ok(Self { server })
    }

    /// Serve until stopped
    pub async fn run(self) -> Result<()> {
        self.server.start().await
    }
}

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
