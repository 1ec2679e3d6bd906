//! User login endpoint

use super::models::AuthResponse;
use crate::server::routes::ok;
use crate::server::state::AppState;
use crate::services::AccountService;
use crate::services::auth::LoginRequest;
use crate::utils::error::Result;
use actix_web::{HttpRequest, HttpResponse, web};
use tracing::{info, warn};

/// Lockout key: the peer address plus the attempted email
fn client_key(req: &HttpRequest, email: &str) -> String {
    let peer = req
        .connection_info()
        .peer_addr()
        .unwrap_or("unknown")
        .to_string();
    format!("{}|{}", peer, email.trim().to_lowercase())
}

/// `POST /api/auth/login`
pub async fn login(
    state: web::Data<AppState>,
    req: HttpRequest,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    let key = client_key(&req, &request.email);
    state.auth_limiter.check(&key)?;

    let user = match AccountService::new(state.services())
        .login(request.into_inner())
        .await
    {
        Ok(user) => user,
        Err(e) => {
            warn!("Login failed for {}: {}", key, e);
            state.auth_limiter.record_failure(&key);
            return Err(e);
        }
    };
    state.auth_limiter.record_success(&key);
    info!("User logged in successfully: {}", user.email);

    Ok(ok(AuthResponse::issue(&state.auth, &user)?))
}
