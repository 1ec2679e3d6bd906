//! Standalone team endpoints

use super::workspaces::populated_teams;
use crate::auth::AuthUser;
use crate::server::routes::{done, ok};
use crate::server::state::AppState;
use crate::services::TeamService;
use crate::services::teams::{AddTeamMember, UpdateTeam, UpdateTeamMember};
use crate::utils::error::Result;
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use uuid::Uuid;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/teams")
            .route("", web::get().to(list_teams))
            .route("/{id}", web::get().to(get_team))
            .route("/{id}", web::put().to(update_team))
            .route("/{id}", web::delete().to(delete_team))
            .route("/{id}/members", web::post().to(add_member))
            .route("/{id}/members/{member_id}", web::put().to(update_member))
            .route("/{id}/members/{member_id}", web::delete().to(remove_member)),
    );
}

#[derive(Debug, Deserialize)]
struct TeamQuery {
    workspace: Option<Uuid>,
}

/// `GET /api/teams?workspace=`
async fn list_teams(
    state: web::Data<AppState>,
    user: AuthUser,
    query: web::Query<TeamQuery>,
) -> Result<HttpResponse> {
    let ctx = state.services();
    let teams = TeamService::new(ctx.clone())
        .list(&user, query.workspace)
        .await?;
    Ok(ok(populated_teams(&mut ctx.populator(), &teams).await?))
}

async fn get_team(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let ctx = state.services();
    let team = TeamService::new(ctx.clone())
        .get(&user, path.into_inner())
        .await?;
    Ok(ok(ctx.populator().team(&team).await?))
}

async fn update_team(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
    input: web::Json<UpdateTeam>,
) -> Result<HttpResponse> {
    let ctx = state.services();
    let team = TeamService::new(ctx.clone())
        .update(&user, path.into_inner(), input.into_inner())
        .await?;
    Ok(ok(ctx.populator().team(&team).await?))
}

async fn delete_team(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    TeamService::new(state.services())
        .delete(&user, path.into_inner())
        .await?;
    Ok(done("Team deleted successfully"))
}

async fn add_member(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
    input: web::Json<AddTeamMember>,
) -> Result<HttpResponse> {
    let ctx = state.services();
    let team = TeamService::new(ctx.clone())
        .add_member(&user, path.into_inner(), input.into_inner())
        .await?;
    Ok(ok(ctx.populator().team(&team).await?))
}

async fn update_member(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<(Uuid, Uuid)>,
    input: web::Json<UpdateTeamMember>,
) -> Result<HttpResponse> {
    let (id, member) = path.into_inner();
    let ctx = state.services();
    let team = TeamService::new(ctx.clone())
        .update_member(&user, id, member, input.into_inner())
        .await?;
    Ok(ok(ctx.populator().team(&team).await?))
}

async fn remove_member(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    let (id, member) = path.into_inner();
    let ctx = state.services();
    let team = TeamService::new(ctx.clone())
        .remove_member(&user, id, member)
        .await?;
    Ok(ok(ctx.populator().team(&team).await?))
}
