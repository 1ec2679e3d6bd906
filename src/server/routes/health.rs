//! Health check and service information

use crate::server::routes::ok;
use crate::server::state::AppState;
use crate::storage::StorageHealthStatus;
use crate::utils::error::Result;
use actix_web::{HttpResponse, web};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use std::borrow::Cow;
use tracing::debug;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(api_info))
        .route("/", web::get().to(api_info))
        .service(
            web::scope("/health")
                .route("", web::get().to(health_check))
                .route("/detailed", web::get().to(detailed_health_check)),
        );
}

#[derive(Debug, Serialize)]
struct HealthStatus {
    success: bool,
    message: &'static str,
    timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DetailedHealthStatus {
    status: Cow<'static, str>,
    timestamp: DateTime<Utc>,
    version: &'static str,
    storage: StorageHealthStatus,
    blocked_login_attempts: u64,
}

/// `GET /api/health`
pub async fn health_check() -> Result<HttpResponse> {
    debug!("Health check requested");
    Ok(HttpResponse::Ok().json(HealthStatus {
        success: true,
        message: "Server is running",
        timestamp: Utc::now(),
    }))
}

/// `GET /api/health/detailed`
async fn detailed_health_check(state: web::Data<AppState>) -> Result<HttpResponse> {
    let storage = state.storage.health_check().await;
    let status = if storage.overall {
        Cow::Borrowed("healthy")
    } else {
        Cow::Borrowed("degraded")
    };

    Ok(ok(DetailedHealthStatus {
        status,
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION"),
        storage,
        blocked_login_attempts: state.auth_limiter.blocked_attempts(),
    }))
}

/// `GET /api`
async fn api_info() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(json!({
        "name": "TaskHub API",
        "version": env!("CARGO_PKG_VERSION"),
        "build": { "time": env!("BUILD_TIME"), "git": env!("GIT_HASH") },
        "endpoints": {
            "auth": "/api/auth",
            "users": "/api/users",
            "workspaces": "/api/workspaces",
            "teams": "/api/teams",
            "projects": "/api/projects",
            "tasks": "/api/tasks",
            "automations": "/api/automations",
            "upload": "/api/upload",
            "socket": "/api/socket",
            "health": "/api/health",
        },
    })))
}
