//! Password change endpoint

use crate::auth::AuthUser;
use crate::server::routes::done;
use crate::server::state::AppState;
use crate::services::AccountService;
use crate::services::auth::ChangePasswordRequest;
use crate::utils::error::Result;
use actix_web::{HttpResponse, web};
use tracing::info;

/// `POST /api/auth/change-password`
pub async fn change_password(
    state: web::Data<AppState>,
    user: AuthUser,
    request: web::Json<ChangePasswordRequest>,
) -> Result<HttpResponse> {
    AccountService::new(state.services())
        .change_password(&user, request.into_inner())
        .await?;
    info!("Password changed for user: {}", user.email);
    Ok(done("Password updated successfully"))
}
