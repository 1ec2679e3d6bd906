//! User registration endpoint

use super::models::AuthResponse;
use crate::server::routes::created;
use crate::server::state::AppState;
use crate::services::AccountService;
use crate::services::auth::RegisterRequest;
use crate::utils::error::Result;
use actix_web::{HttpResponse, web};
use tracing::info;

/// `POST /api/auth/register`
pub async fn register(
    state: web::Data<AppState>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    let user = AccountService::new(state.services())
        .register(request.into_inner())
        .await?;
    info!("User registered successfully: {}", user.email);

    Ok(created(AuthResponse::issue(&state.auth, &user)?))
}
