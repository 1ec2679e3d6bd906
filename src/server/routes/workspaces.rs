//! Workspace endpoints

use crate::auth::AuthUser;
use crate::models::Team;
use crate::server::routes::{ApiResponse, created, done, ok};
use crate::server::state::AppState;
use crate::services::teams::CreateTeam;
use crate::services::workspaces::{
    AddMember, BulkInvite, CreateWorkspace, UpdateMemberRole, UpdateWorkspace,
    invitation_summary,
};
use crate::services::{Populator, TeamService, WorkspaceService};
use crate::utils::error::Result;
use actix_web::{HttpResponse, web};
use serde_json::{Value, json};
use uuid::Uuid;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/workspaces")
            .route("", web::get().to(list_workspaces))
            .route("", web::post().to(create_workspace))
            .route("/{id}", web::get().to(get_workspace))
            .route("/{id}", web::put().to(update_workspace))
            .route("/{id}", web::delete().to(delete_workspace))
            .route("/{id}/members", web::post().to(add_member))
            .route("/{id}/members/{user_id}", web::put().to(update_member_role))
            .route("/{id}/members/{user_id}", web::delete().to(remove_member))
            .route("/{id}/invite", web::post().to(invite))
            .route("/{id}/teams", web::get().to(list_teams))
            .route("/{id}/teams", web::post().to(create_team)),
    );
}

pub(crate) async fn populated_teams(
    populator: &mut Populator<'_>,
    teams: &[Team],
) -> Result<Vec<Value>> {
    let mut out = Vec::with_capacity(teams.len());
    for team in teams {
        out.push(populator.team(team).await?);
    }
    Ok(out)
}

/// `GET /api/workspaces`
async fn list_workspaces(state: web::Data<AppState>, user: AuthUser) -> Result<HttpResponse> {
    let ctx = state.services();
    let workspaces = WorkspaceService::new(ctx.clone()).list_for(&user).await?;

    let mut populator = ctx.populator();
    let mut out = Vec::with_capacity(workspaces.len());
    for workspace in &workspaces {
        out.push(populator.workspace(workspace).await?);
    }
    Ok(ok(out))
}

/// `GET /api/workspaces/{id}`
async fn get_workspace(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let ctx = state.services();
    let workspace = WorkspaceService::new(ctx.clone())
        .get(&user, path.into_inner())
        .await?;
    Ok(ok(ctx.populator().workspace(&workspace).await?))
}

/// `POST /api/workspaces`
async fn create_workspace(
    state: web::Data<AppState>,
    user: AuthUser,
    input: web::Json<CreateWorkspace>,
) -> Result<HttpResponse> {
    let ctx = state.services();
    let workspace = WorkspaceService::new(ctx.clone())
        .create(&user, input.into_inner())
        .await?;
    Ok(created(ctx.populator().workspace(&workspace).await?))
}

/// `PUT /api/workspaces/{id}`
async fn update_workspace(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
    input: web::Json<UpdateWorkspace>,
) -> Result<HttpResponse> {
    let ctx = state.services();
    let workspace = WorkspaceService::new(ctx.clone())
        .update(&user, path.into_inner(), input.into_inner())
        .await?;
    Ok(ok(ctx.populator().workspace(&workspace).await?))
}

/// `DELETE /api/workspaces/{id}`
async fn delete_workspace(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    WorkspaceService::new(state.services())
        .delete(&user, path.into_inner())
        .await?;
    Ok(done("Workspace deleted successfully"))
}

/// `POST /api/workspaces/{id}/members`
async fn add_member(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
    input: web::Json<AddMember>,
) -> Result<HttpResponse> {
    let ctx = state.services();
    let workspace = WorkspaceService::new(ctx.clone())
        .add_member(&user, path.into_inner(), input.into_inner())
        .await?;
    Ok(ok(ctx.populator().workspace(&workspace).await?))
}

/// `DELETE /api/workspaces/{id}/members/{user_id}`
async fn remove_member(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    let (id, member) = path.into_inner();
    let ctx = state.services();
    let workspace = WorkspaceService::new(ctx.clone())
        .remove_member(&user, id, member)
        .await?;
    Ok(ok(ctx.populator().workspace(&workspace).await?))
}

/// `PUT /api/workspaces/{id}/members/{user_id}`
async fn update_member_role(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<(Uuid, Uuid)>,
    input: web::Json<UpdateMemberRole>,
) -> Result<HttpResponse> {
    let (id, member) = path.into_inner();
    let ctx = state.services();
    let workspace = WorkspaceService::new(ctx.clone())
        .update_member_role(&user, id, member, input.into_inner())
        .await?;
    Ok(ok(ctx.populator().workspace(&workspace).await?))
}

/// `POST /api/workspaces/{id}/invite`
async fn invite(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
    input: web::Json<BulkInvite>,
) -> Result<HttpResponse> {
    let ctx = state.services();
    let (workspace, invitations) = WorkspaceService::new(ctx.clone())
        .invite(&user, path.into_inner(), input.into_inner())
        .await?;
    let workspace = ctx.populator().workspace(&workspace).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        json!({ "workspace": workspace, "invitations": invitations }),
        invitation_summary(&invitations),
    )))
}

/// `GET /api/workspaces/{id}/teams`
async fn list_teams(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let ctx = state.services();
    let teams = TeamService::new(ctx.clone())
        .list_in_workspace(&user, path.into_inner())
        .await?;
    Ok(ok(populated_teams(&mut ctx.populator(), &teams).await?))
}

/// `POST /api/workspaces/{id}/teams`
async fn create_team(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
    input: web::Json<CreateTeam>,
) -> Result<HttpResponse> {
    let ctx = state.services();
    let team = TeamService::new(ctx.clone())
        .create(&user, path.into_inner(), input.into_inner())
        .await?;
    Ok(created(ctx.populator().team(&team).await?))
}
