//! HTTP route modules
//!
//! Every handler lives under `/api` and answers with the [`ApiResponse`]
//! envelope; failures are rendered by [`crate::utils::error::AppError`].

pub mod auth;
pub mod automations;
pub mod comments;
pub mod health;
pub mod projects;
pub mod tasks;
pub mod teams;
pub mod uploads;
pub mod users;
pub mod workspaces;

use crate::utils::error::AppError;
use actix_web::{HttpResponse, web};
use serde::Serialize;

/// Standard success envelope
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn with_message<S: Into<String>>(data: T, message: S) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
        }
    }
}

impl ApiResponse<()> {
    /// Success with nothing but a message
    pub fn message<S: Into<String>>(message: S) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
        }
    }
}

/// 200 with `data`
pub fn ok<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success(data))
}

/// 201 with `data`
pub fn created<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Created().json(ApiResponse::success(data))
}

/// 200 with only a message
pub fn done<S: Into<String>>(message: S) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::message(message))
}

/// Parse a comma separated query value, dropping blanks
pub(crate) fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Mount every `/api` route
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(health::configure_routes)
        .configure(auth::configure_routes)
        .configure(users::configure_routes)
        .configure(workspaces::configure_routes)
        .configure(teams::configure_routes)
        .configure(projects::configure_routes)
        .configure(automations::configure_routes)
        .configure(tasks::configure_routes)
        .configure(uploads::configure_routes)
        .route("/socket", web::get().to(crate::realtime::socket::socket));
}

/// Fallback for anything no route matched
pub async fn not_found() -> Result<HttpResponse, AppError> {
    Err(AppError::not_found("Route not found"))
}
