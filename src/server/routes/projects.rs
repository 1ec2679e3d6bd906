//! Project endpoints, including sections, custom fields and automations

use crate::auth::AuthUser;
use crate::models::Project;
use crate::server::routes::{created, done, ok};
use crate::server::state::AppState;
use crate::services::automations::CreateAutomation;
use crate::services::projects::{
    AddProjectMember, CreateCustomField, CreateProject, CreateSection, ProjectFilter,
    UpdateProject, UpdateSection,
};
use crate::services::{AutomationService, ProjectService, ServiceContext};
use crate::utils::error::Result;
use actix_web::{HttpResponse, web};
use uuid::Uuid;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/projects")
            .route("", web::get().to(list_projects))
            .route("", web::post().to(create_project))
            .route("/workspace/{workspace_id}", web::get().to(list_workspace_projects))
            .route("/workspace/{workspace_id}", web::post().to(create_workspace_project))
            .route("/{id}", web::get().to(get_project))
            .route("/{id}", web::put().to(update_project))
            .route("/{id}", web::delete().to(delete_project))
            .route("/{id}/members", web::post().to(add_member))
            .route("/{id}/members/{user_id}", web::delete().to(remove_member))
            .route("/{id}/sections", web::post().to(add_section))
            .route("/{id}/sections/{section_id}", web::put().to(update_section))
            .route("/{id}/sections/{section_id}", web::delete().to(delete_section))
            .route("/{id}/custom-fields", web::post().to(add_custom_field))
            .route("/{id}/automations", web::get().to(list_automations))
            .route("/{id}/automations", web::post().to(create_automation)),
    );
}

async fn render(ctx: &ServiceContext, project: &Project) -> Result<serde_json::Value> {
    ctx.populator().project(project).await
}

async fn list(state: &AppState, user: &AuthUser, filter: ProjectFilter) -> Result<HttpResponse> {
    let ctx = state.services();
    let projects = ProjectService::new(ctx.clone()).list(user, filter).await?;

    let mut populator = ctx.populator();
    let mut out = Vec::with_capacity(projects.len());
    for project in &projects {
        out.push(populator.project(project).await?);
    }
    Ok(ok(out))
}

async fn create(state: &AppState, user: &AuthUser, input: CreateProject) -> Result<HttpResponse> {
    let ctx = state.services();
    let project = ProjectService::new(ctx.clone()).create(user, input).await?;
    Ok(created(render(&ctx, &project).await?))
}

/// `GET /api/projects?workspace=&status=&team=`
async fn list_projects(
    state: web::Data<AppState>,
    user: AuthUser,
    query: web::Query<ProjectFilter>,
) -> Result<HttpResponse> {
    list(&state, &user, query.into_inner()).await
}

/// `GET /api/projects/workspace/{workspace_id}`
async fn list_workspace_projects(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
    query: web::Query<ProjectFilter>,
) -> Result<HttpResponse> {
    let filter = ProjectFilter {
        workspace: Some(path.into_inner()),
        ..query.into_inner()
    };
    list(&state, &user, filter).await
}

/// `POST /api/projects`
async fn create_project(
    state: web::Data<AppState>,
    user: AuthUser,
    input: web::Json<CreateProject>,
) -> Result<HttpResponse> {
    create(&state, &user, input.into_inner()).await
}

/// `POST /api/projects/workspace/{workspace_id}`
async fn create_workspace_project(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
    input: web::Json<CreateProject>,
) -> Result<HttpResponse> {
    let input = CreateProject {
        workspace: Some(path.into_inner()),
        ..input.into_inner()
    };
    create(&state, &user, input).await
}

async fn get_project(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let ctx = state.services();
    let project = ProjectService::new(ctx.clone())
        .get(&user, path.into_inner())
        .await?;
    Ok(ok(render(&ctx, &project).await?))
}

async fn update_project(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
    input: web::Json<UpdateProject>,
) -> Result<HttpResponse> {
    let ctx = state.services();
    let project = ProjectService::new(ctx.clone())
        .update(&user, path.into_inner(), input.into_inner())
        .await?;
    Ok(ok(render(&ctx, &project).await?))
}

async fn delete_project(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    ProjectService::new(state.services())
        .delete(&user, path.into_inner())
        .await?;
    Ok(done("Project deleted successfully"))
}

async fn add_member(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
    input: web::Json<AddProjectMember>,
) -> Result<HttpResponse> {
    let ctx = state.services();
    let project = ProjectService::new(ctx.clone())
        .add_member(&user, path.into_inner(), input.into_inner())
        .await?;
    Ok(ok(render(&ctx, &project).await?))
}

async fn remove_member(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    let (id, member) = path.into_inner();
    let ctx = state.services();
    let project = ProjectService::new(ctx.clone())
        .remove_member(&user, id, member)
        .await?;
    Ok(ok(render(&ctx, &project).await?))
}

async fn add_section(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
    input: web::Json<CreateSection>,
) -> Result<HttpResponse> {
    let ctx = state.services();
    let project = ProjectService::new(ctx.clone())
        .add_section(&user, path.into_inner(), input.into_inner())
        .await?;
    Ok(created(render(&ctx, &project).await?))
}

async fn update_section(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<(Uuid, Uuid)>,
    input: web::Json<UpdateSection>,
) -> Result<HttpResponse> {
    let (id, section) = path.into_inner();
    let ctx = state.services();
    let project = ProjectService::new(ctx.clone())
        .update_section(&user, id, section, input.into_inner())
        .await?;
    Ok(ok(render(&ctx, &project).await?))
}

async fn delete_section(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    let (id, section) = path.into_inner();
    let ctx = state.services();
    let project = ProjectService::new(ctx.clone())
        .delete_section(&user, id, section)
        .await?;
    Ok(ok(render(&ctx, &project).await?))
}

/// `POST /api/projects/{id}/custom-fields`
async fn add_custom_field(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
    input: web::Json<CreateCustomField>,
) -> Result<HttpResponse> {
    let ctx = state.services();
    let project = ProjectService::new(ctx.clone())
        .add_custom_field(&user, path.into_inner(), input.into_inner())
        .await?;
    Ok(created(render(&ctx, &project).await?))
}

async fn list_automations(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let automations = AutomationService::new(state.services())
        .list(&user, path.into_inner())
        .await?;
    Ok(ok(automations))
}

async fn create_automation(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
    input: web::Json<CreateAutomation>,
) -> Result<HttpResponse> {
    let automation = AutomationService::new(state.services())
        .create(&user, path.into_inner(), input.into_inner())
        .await?;
    Ok(created(automation))
}
