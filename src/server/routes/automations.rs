//! Automation rule endpoints addressed by rule id

use crate::auth::AuthUser;
use crate::server::routes::{done, ok};
use crate::server::state::AppState;
use crate::services::AutomationService;
use crate::services::automations::UpdateAutomation;
use crate::utils::error::Result;
use actix_web::{HttpResponse, web};
use uuid::Uuid;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/automations")
            .route("/{id}", web::put().to(update_automation))
            .route("/{id}", web::delete().to(delete_automation)),
    );
}

async fn update_automation(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
    input: web::Json<UpdateAutomation>,
) -> Result<HttpResponse> {
    let automation = AutomationService::new(state.services())
        .update(&user, path.into_inner(), input.into_inner())
        .await?;
    Ok(ok(automation))
}

async fn delete_automation(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    AutomationService::new(state.services())
        .delete(&user, path.into_inner())
        .await?;
    Ok(done("Automation deleted successfully"))
}
