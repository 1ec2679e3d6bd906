//! Application state shared across HTTP handlers

use crate::auth::AuthSystem;
use crate::config::Config;
use crate::realtime::EventHub;
use crate::server::middleware::AuthRateLimiter;
use crate::services::ServiceContext;
use crate::storage::{StorageLayer, Store};
use std::sync::Arc;

/// Shared resources handed to every request handler
///
/// Cloning is cheap: everything is behind an `Arc` or is itself a handle.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration (shared read-only)
    pub config: Arc<Config>,
    /// Token issuing and verification
    pub auth: Arc<AuthSystem>,
    /// Document store and upload directory
    pub storage: Arc<StorageLayer>,
    /// Realtime broadcast hub
    pub events: EventHub,
    /// Failed-login lockouts
    pub auth_limiter: Arc<AuthRateLimiter>,
}

impl AppState {
    pub fn new(config: Config, storage: StorageLayer) -> Self {
        let auth = AuthSystem::new(config.auth(), storage.store.clone());
        let auth_limiter = AuthRateLimiter::from_config(&config.app.rate_limit);
        Self {
            config: Arc::new(config),
            auth: Arc::new(auth),
            storage: Arc::new(storage),
            events: EventHub::new(),
            auth_limiter: Arc::new(auth_limiter),
        }
    }

    pub fn store(&self) -> &Store {
        &self.storage.store
    }

    /// Context the domain services are built from
    pub fn services(&self) -> ServiceContext {
        ServiceContext::new(self.storage.store.clone(), self.events.clone())
    }
}
