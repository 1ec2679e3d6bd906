//! SeaORM-backed document storage
//!
//! Documents live in a single `documents` table keyed by
//! `(collection, id)` with a JSON body. Runs on SQLite by default and on
//! PostgreSQL with the `postgres` feature.

pub mod entities;
pub mod migration;

use super::store::DocumentBackend;
use crate::config::DatabaseConfig;
use crate::utils::error::{AppError, Result};
use async_trait::async_trait;
use entities::document;
use sea_orm::*;
use sea_orm_migration::MigratorTrait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use migration::Migrator;

/// Document backend over a SeaORM connection
#[derive(Debug, Clone)]
pub struct SeaOrmBackend {
    db: DatabaseConnection,
}

impl SeaOrmBackend {
    /// Connect and bring the schema up to date
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let mut opt = ConnectOptions::new(config.url.clone());
        opt.max_connections(config.max_connections)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(config.connection_timeout))
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .sqlx_logging(true)
            .sqlx_logging_level(log::LevelFilter::Debug);

        let db = Database::connect(opt).await.map_err(AppError::Database)?;
        info!("Database connection established");

        let backend = Self { db };
        backend.migrate().await?;
        Ok(backend)
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        info!("Running database migrations...");
        Migrator::up(&self.db, None).await.map_err(|e| {
            warn!("Migration failed: {}", e);
            AppError::Database(e)
        })?;
        info!("Database migrations completed successfully");
        Ok(())
    }

    async fn find_row(&self, collection: &str, id: Uuid) -> Result<Option<document::Model>> {
        entities::Document::find_by_id((collection.to_string(), id.to_string()))
            .one(&self.db)
            .await
            .map_err(AppError::Database)
    }
}

#[async_trait]
impl DocumentBackend for SeaOrmBackend {
    async fn insert(&self, collection: &str, id: Uuid, body: Value) -> Result<()> {
        debug!("Inserting {} into {}", id, collection);
        let now = chrono::Utc::now();

        let active_model = document::ActiveModel {
            collection: Set(collection.to_string()),
            id: Set(id.to_string()),
            body: Set(body),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        entities::Document::insert(active_model)
            .exec(&self.db)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }

    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<Value>> {
        Ok(self.find_row(collection, id).await?.map(|row| row.body))
    }

    async fn replace(&self, collection: &str, id: Uuid, body: Value) -> Result<bool> {
        let Some(row) = self.find_row(collection, id).await? else {
            return Ok(false);
        };

        let mut active_model: document::ActiveModel = row.into();
        active_model.body = Set(body);
        active_model.updated_at = Set(chrono::Utc::now().into());
        active_model
            .update(&self.db)
            .await
            .map_err(AppError::Database)?;
        Ok(true)
    }

    async fn delete(&self, collection: &str, id: Uuid) -> Result<bool> {
        let result = entities::Document::delete_many()
            .filter(document::Column::Collection.eq(collection))
            .filter(document::Column::Id.eq(id.to_string()))
            .exec(&self.db)
            .await
            .map_err(AppError::Database)?;
        Ok(result.rows_affected > 0)
    }

    async fn list(&self, collection: &str) -> Result<Vec<Value>> {
        let rows = entities::Document::find()
            .filter(document::Column::Collection.eq(collection))
            .all(&self.db)
            .await
            .map_err(AppError::Database)?;
        Ok(rows.into_iter().map(|row| row.body).collect())
    }

    async fn health_check(&self) -> Result<()> {
        debug!("Performing database health check");
        self.db.ping().await.map_err(AppError::Database)
    }
}
