//! Storage layer
//!
//! Document persistence plus local file storage for uploads.

/// SeaORM document backend
pub mod database;
/// Local upload storage
pub mod files;
/// In-process document backend
pub mod memory;
/// Typed document access
pub mod store;

pub use files::LocalFileStorage;
pub use store::{Document, DocumentBackend, Store};

use crate::config::Config;
use crate::utils::error::Result;
use std::sync::Arc;
use tracing::{debug, info};

/// Every storage backend the service uses
#[derive(Debug, Clone)]
pub struct StorageLayer {
    /// Document store
    pub store: Store,
    /// Upload storage
    pub files: LocalFileStorage,
}

impl StorageLayer {
    /// Create a new storage layer
    pub async fn new(config: &Config) -> Result<Self> {
        info!("Initializing storage layer");

        let db_config = &config.storage().database;
        let store = if db_config.is_memory() {
            debug!("Using in-memory document store");
            Store::memory()
        } else {
            debug!("Connecting to database");
            Store::new(Arc::new(database::SeaOrmBackend::new(db_config).await?))
        };

        let files = LocalFileStorage::new(&config.uploads().directory).await?;

        info!("Storage layer initialized");
        Ok(Self { store, files })
    }

    /// Health check for the document store
    pub async fn health_check(&self) -> StorageHealthStatus {
        let database = self.store.health_check().await.is_ok();
        let files = self.files.base_path().is_dir();
        StorageHealthStatus {
            overall: database && files,
            database,
            files,
        }
    }
}

/// Storage health status
#[derive(Debug, Clone, serde::Serialize)]
pub struct StorageHealthStatus {
    pub overall: bool,
    pub database: bool,
    pub files: bool,
}
