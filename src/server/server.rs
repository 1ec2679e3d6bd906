//! HTTP server core implementation
//!
//! Builds the storage layer and shared state, wires the middleware stack and
//! the `/api` routes, and starts the background housekeeping tasks.

use crate::config::{Config, ServerConfig};
use crate::server::middleware::RequestIdMiddleware;
use crate::server::routes;
use crate::server::state::AppState;
use crate::services::Maintenance;
use crate::services::maintenance::SWEEP_INTERVAL;
use crate::storage::StorageLayer;
use crate::utils::error::{AppError, Result};
use actix_cors::Cors;
use actix_web::{App, HttpServer as ActixHttpServer, middleware::DefaultHeaders, web};
use std::time::Duration;
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;

/// How often expired login lockouts are forgotten
const LIMITER_CLEANUP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// HTTP server
pub struct HttpServer {
    config: ServerConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server
    pub async fn new(config: &Config) -> Result<Self> {
        info!("Creating HTTP server");

        let storage = StorageLayer::new(config).await?;
        let state = AppState::new(config.clone(), storage);

        Ok(Self {
            config: config.server().clone(),
            state,
        })
    }

    fn cors(config: &ServerConfig) -> Cors {
        let cors_config = &config.cors;
        let mut cors = Cors::default()
            .allow_any_method()
            .allow_any_header()
            .max_age(cors_config.max_age as usize);

        if cors_config.allows_all_origins() {
            cors = cors.allow_any_origin();
        } else {
            for origin in &cors_config.allowed_origins {
                cors = cors.allowed_origin(origin);
            }
        }
        if cors_config.allow_credentials && !cors_config.allows_all_origins() {
            cors = cors.supports_credentials();
        }
        cors
    }

    /// Create the Actix-web application
    pub fn create_app(
        state: web::Data<AppState>,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let server_config = state.config.server().clone();
        let uploads_dir = state.storage.files.base_path().to_path_buf();

        let json_config = web::JsonConfig::default()
            .limit(server_config.max_body_size)
            .error_handler(|err, _req| AppError::bad_request(err.to_string()).into());
        let path_config = web::PathConfig::default()
            .error_handler(|_err, _req| AppError::bad_request("Invalid resource id").into());
        let query_config = web::QueryConfig::default()
            .error_handler(|err, _req| AppError::bad_request(err.to_string()).into());

        App::new()
            .app_data(state)
            .app_data(json_config)
            .app_data(path_config)
            .app_data(query_config)
            // The last `.wrap` is the outermost layer: CORS sees requests first
            .wrap(DefaultHeaders::new().add(("Server", "TaskHub")))
            .wrap(RequestIdMiddleware)
            .wrap(TracingLogger::default())
            .wrap(Self::cors(&server_config))
            .service(
                web::scope("/api")
                    .configure(routes::configure_routes)
                    .default_service(web::to(routes::not_found)),
            )
            .service(actix_files::Files::new("/uploads", uploads_dir))
            .default_service(web::to(routes::not_found))
    }

    /// Spawn maintenance sweeps and limiter cleanup
    fn spawn_background_tasks(state: &AppState) {
        Maintenance::new(state.services()).spawn(SWEEP_INTERVAL);

        let limiter = state.auth_limiter.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(LIMITER_CLEANUP_INTERVAL);
            loop {
                ticker.tick().await;
                limiter.cleanup();
            }
        });
    }

    /// Start the HTTP server
    pub async fn start(self) -> Result<()> {
        let bind_addr = self.config.address();
        info!("Starting HTTP server on {}", bind_addr);

        Self::spawn_background_tasks(&self.state);
        let state = web::Data::new(self.state);

        let server = ActixHttpServer::new(move || Self::create_app(state.clone()))
            .workers(self.config.worker_count())
            .bind(&bind_addr)
            .map_err(|e| {
                warn!("Failed to bind {}: {}", bind_addr, e);
                AppError::Config(format!("Failed to bind to {}: {}", bind_addr, e))
            })?
            .run();

        info!("HTTP server listening on {}", bind_addr);
        server
            .await
            .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

        info!("HTTP server stopped");
        Ok(())
    }
}
