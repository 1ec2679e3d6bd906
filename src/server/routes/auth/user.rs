//! Current-user endpoints

use super::models::OnboardingResponse;
use crate::auth::AuthUser;
use crate::server::routes::ok;
use crate::server::state::AppState;
use crate::services::AccountService;
use crate::services::auth::{OnboardingRequest, ProfileUpdate};
use crate::utils::error::Result;
use actix_web::{HttpResponse, web};

/// `GET /api/auth/me`
pub async fn get_current_user(state: web::Data<AppState>, user: AuthUser) -> Result<HttpResponse> {
    let ctx = state.services();
    let account = ctx.populator().account(&user).await?;
    Ok(ok(account))
}

/// `PUT /api/auth/profile`
pub async fn update_profile(
    state: web::Data<AppState>,
    user: AuthUser,
    update: web::Json<ProfileUpdate>,
) -> Result<HttpResponse> {
    let updated = AccountService::new(state.services())
        .update_profile(&user, update.into_inner())
        .await?;
    Ok(ok(updated.profile()))
}

/// `POST /api/auth/onboarding`
pub async fn onboarding(
    state: web::Data<AppState>,
    user: AuthUser,
    request: web::Json<OnboardingRequest>,
) -> Result<HttpResponse> {
    let (user, workspace) = AccountService::new(state.services())
        .complete_onboarding(&user, request.into_inner())
        .await?;
    Ok(ok(OnboardingResponse {
        user: user.profile(),
        workspace,
    }))
}
