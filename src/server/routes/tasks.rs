//! Task endpoints
//!
//! Comment routes share the `/tasks` scope and are mounted from
//! [`super::comments`].

use crate::auth::AuthUser;
use crate::models::{Priority, Task, TaskStatus};
use crate::server::routes::{created, done, ok, split_list};
use crate::server::state::AppState;
use crate::services::tasks::{
    AddDependency, CreateTask, NewAttachment, SearchFilter, TaskFilter, UpdateSubtask, UpdateTask,
};
use crate::services::{Populator, ServiceContext, TaskService};
use crate::utils::error::{AppError, Result};
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/tasks")
            .configure(super::comments::configure_routes)
            .route("", web::get().to(list_tasks))
            .route("", web::post().to(create_task))
            .route("/my-tasks", web::get().to(my_tasks))
            .route("/search", web::get().to(search_tasks))
            .route("/project/{project_id}", web::get().to(list_project_tasks))
            .route("/project/{project_id}", web::post().to(create_project_task))
            .route("/{id}", web::get().to(get_task))
            .route("/{id}", web::put().to(update_task))
            .route("/{id}", web::delete().to(delete_task))
            .route("/{id}/subtasks", web::post().to(add_subtask))
            .route("/{id}/subtasks/{subtask_id}", web::put().to(update_subtask))
            .route("/{id}/subtasks/{subtask_id}", web::delete().to(delete_subtask))
            .route("/{id}/followers", web::post().to(add_follower))
            .route("/{id}/followers/{user_id}", web::delete().to(remove_follower))
            .route("/{id}/dependencies", web::post().to(add_dependency))
            .route("/{id}/dependencies/{dependency_id}", web::delete().to(remove_dependency))
            .route("/{id}/attachments", web::post().to(add_attachment))
            .route("/{id}/attachments/{attachment_id}", web::delete().to(delete_attachment)),
    );
}

#[derive(Debug, Deserialize)]
struct TaskQuery {
    project: Option<Uuid>,
    status: Option<TaskStatus>,
    assignee: Option<Uuid>,
    priority: Option<Priority>,
    section: Option<Uuid>,
    tags: Option<String>,
}

impl TaskQuery {
    fn into_filter(self, project: Option<Uuid>) -> Result<TaskFilter> {
        let project = project
            .or(self.project)
            .ok_or_else(|| AppError::bad_request("Project ID is required"))?;
        Ok(TaskFilter {
            project,
            status: self.status,
            assignee: self.assignee,
            priority: self.priority,
            section: self.section,
            tags: split_list(self.tags.as_deref()),
        })
    }
}

#[derive(Debug, Deserialize)]
struct MyTasksQuery {
    status: Option<TaskStatus>,
    workspace: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
struct NewSubtask {
    title: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FollowerInput {
    user_id: Uuid,
}

async fn with_projects(populator: &mut Populator<'_>, tasks: &[Task]) -> Result<Vec<Value>> {
    let mut out = Vec::with_capacity(tasks.len());
    for task in tasks {
        out.push(populator.task_with_project(task).await?);
    }
    Ok(out)
}

async fn render(ctx: &ServiceContext, task: &Task) -> Result<Value> {
    ctx.populator().task(task).await
}

async fn list(state: &AppState, user: &AuthUser, filter: TaskFilter) -> Result<HttpResponse> {
    let ctx = state.services();
    let tasks = TaskService::new(ctx.clone()).list(user, filter).await?;
    Ok(ok(ctx.populator().tasks(&tasks).await?))
}

async fn create(state: &AppState, user: &AuthUser, input: CreateTask) -> Result<HttpResponse> {
    let ctx = state.services();
    let task = TaskService::new(ctx.clone()).create(user, input).await?;
    Ok(created(render(&ctx, &task).await?))
}

/// `GET /api/tasks?project=&status=&assignee=&priority=&section=&tags=`
async fn list_tasks(
    state: web::Data<AppState>,
    user: AuthUser,
    query: web::Query<TaskQuery>,
) -> Result<HttpResponse> {
    let filter = query.into_inner().into_filter(None)?;
    list(&state, &user, filter).await
}

/// `GET /api/tasks/project/{project_id}`
async fn list_project_tasks(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
    query: web::Query<TaskQuery>,
) -> Result<HttpResponse> {
    let filter = query.into_inner().into_filter(Some(path.into_inner()))?;
    list(&state, &user, filter).await
}

/// `POST /api/tasks`
async fn create_task(
    state: web::Data<AppState>,
    user: AuthUser,
    input: web::Json<CreateTask>,
) -> Result<HttpResponse> {
    create(&state, &user, input.into_inner()).await
}

/// `POST /api/tasks/project/{project_id}`
async fn create_project_task(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
    input: web::Json<CreateTask>,
) -> Result<HttpResponse> {
    let input = CreateTask {
        project: Some(path.into_inner()),
        ..input.into_inner()
    };
    create(&state, &user, input).await
}

/// `GET /api/tasks/my-tasks?status=&workspace=`
async fn my_tasks(
    state: web::Data<AppState>,
    user: AuthUser,
    query: web::Query<MyTasksQuery>,
) -> Result<HttpResponse> {
    let ctx = state.services();
    let grouped = TaskService::new(ctx.clone())
        .my_tasks(&user, query.status, query.workspace)
        .await?;

    let mut populator = ctx.populator();
    Ok(ok(json!({
        "recentlyAssigned": with_projects(&mut populator, &grouped.recently_assigned).await?,
        "doToday": with_projects(&mut populator, &grouped.do_today).await?,
        "doNextWeek": with_projects(&mut populator, &grouped.do_next_week).await?,
        "doLater": with_projects(&mut populator, &grouped.do_later).await?,
        "completed": with_projects(&mut populator, &grouped.completed).await?,
    })))
}

/// `GET /api/tasks/search?q=&workspace=&project=&assignee=&status=&priority=`
async fn search_tasks(
    state: web::Data<AppState>,
    user: AuthUser,
    query: web::Query<SearchFilter>,
) -> Result<HttpResponse> {
    let ctx = state.services();
    let tasks = TaskService::new(ctx.clone())
        .search(&user, query.into_inner())
        .await?;
    Ok(ok(with_projects(&mut ctx.populator(), &tasks).await?))
}

/// `GET /api/tasks/{id}`
async fn get_task(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let ctx = state.services();
    let task = TaskService::new(ctx.clone())
        .get(&user, path.into_inner())
        .await?;
    Ok(ok(ctx.populator().task_detail(&task).await?))
}

async fn update_task(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
    input: web::Json<UpdateTask>,
) -> Result<HttpResponse> {
    let ctx = state.services();
    let task = TaskService::new(ctx.clone())
        .update(&user, path.into_inner(), input.into_inner())
        .await?;
    Ok(ok(render(&ctx, &task).await?))
}

async fn delete_task(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    TaskService::new(state.services())
        .delete(&user, path.into_inner())
        .await?;
    Ok(done("Task deleted successfully"))
}

async fn add_subtask(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
    input: web::Json<NewSubtask>,
) -> Result<HttpResponse> {
    let ctx = state.services();
    let task = TaskService::new(ctx.clone())
        .add_subtask(&user, path.into_inner(), input.into_inner().title)
        .await?;
    Ok(created(render(&ctx, &task).await?))
}

async fn update_subtask(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<(Uuid, Uuid)>,
    input: web::Json<UpdateSubtask>,
) -> Result<HttpResponse> {
    let (id, subtask) = path.into_inner();
    let ctx = state.services();
    let task = TaskService::new(ctx.clone())
        .update_subtask(&user, id, subtask, input.into_inner())
        .await?;
    Ok(ok(render(&ctx, &task).await?))
}

async fn delete_subtask(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    let (id, subtask) = path.into_inner();
    let ctx = state.services();
    let task = TaskService::new(ctx.clone())
        .delete_subtask(&user, id, subtask)
        .await?;
    Ok(ok(render(&ctx, &task).await?))
}

async fn add_follower(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
    input: web::Json<FollowerInput>,
) -> Result<HttpResponse> {
    let ctx = state.services();
    let task = TaskService::new(ctx.clone())
        .add_follower(&user, path.into_inner(), input.user_id)
        .await?;
    Ok(ok(render(&ctx, &task).await?))
}

async fn remove_follower(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    let (id, follower) = path.into_inner();
    let ctx = state.services();
    let task = TaskService::new(ctx.clone())
        .remove_follower(&user, id, follower)
        .await?;
    Ok(ok(render(&ctx, &task).await?))
}

async fn add_dependency(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
    input: web::Json<AddDependency>,
) -> Result<HttpResponse> {
    let ctx = state.services();
    let task = TaskService::new(ctx.clone())
        .add_dependency(&user, path.into_inner(), input.into_inner())
        .await?;
    Ok(ok(ctx.populator().task_detail(&task).await?))
}

async fn remove_dependency(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    let (id, dependency) = path.into_inner();
    let ctx = state.services();
    let task = TaskService::new(ctx.clone())
        .remove_dependency(&user, id, dependency)
        .await?;
    Ok(ok(ctx.populator().task_detail(&task).await?))
}

async fn add_attachment(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
    input: web::Json<NewAttachment>,
) -> Result<HttpResponse> {
    let ctx = state.services();
    let task = TaskService::new(ctx.clone())
        .add_attachment(&user, path.into_inner(), input.into_inner())
        .await?;
    Ok(created(render(&ctx, &task).await?))
}

async fn delete_attachment(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    let (id, attachment) = path.into_inner();
    let ctx = state.services();
    let task = TaskService::new(ctx.clone())
        .delete_attachment(&user, id, attachment)
        .await?;
    Ok(ok(render(&ctx, &task).await?))
}
