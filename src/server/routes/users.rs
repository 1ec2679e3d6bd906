//! User directory, inbox and activity feed

use crate::auth::AuthUser;
use crate::server::routes::{done, ok};
use crate::server::state::AppState;
use crate::services::activity::ActivityFilter;
use crate::services::{ActivityService, UserService};
use crate::utils::error::Result;
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

const DEFAULT_LIMIT: usize = 50;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .route("/search", web::get().to(search))
            .route("/notifications", web::get().to(notifications))
            .route("/notifications/read-all", web::put().to(mark_all_read))
            .route("/notifications/{id}/read", web::put().to(mark_read))
            .route("/activity", web::get().to(activity))
            .route("/{id}", web::get().to(get_user)),
    );
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

#[derive(Debug, Deserialize)]
struct InboxQuery {
    read: Option<bool>,
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Inbox {
    notifications: Vec<Value>,
    unread_count: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActivityQuery {
    workspace_id: Option<Uuid>,
    project_id: Option<Uuid>,
    limit: Option<usize>,
}

/// `GET /api/users/search?q=`
async fn search(
    state: web::Data<AppState>,
    _user: AuthUser,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse> {
    let users = UserService::new(state.services()).search(&query.q).await?;
    Ok(ok(users))
}

/// `GET /api/users/notifications?read=&limit=`
async fn notifications(
    state: web::Data<AppState>,
    user: AuthUser,
    query: web::Query<InboxQuery>,
) -> Result<HttpResponse> {
    let ctx = state.services();
    let (inbox, unread_count) = ctx
        .notifier()
        .inbox(user.id, query.read, query.limit.unwrap_or(DEFAULT_LIMIT))
        .await?;

    let mut populator = ctx.populator();
    let mut notifications = Vec::with_capacity(inbox.len());
    for notification in &inbox {
        notifications.push(populator.notification(notification).await?);
    }
    Ok(ok(Inbox {
        notifications,
        unread_count,
    }))
}

/// `PUT /api/users/notifications/{id}/read`
async fn mark_read(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let notification = state
        .services()
        .notifier()
        .mark_read(user.id, path.into_inner())
        .await?;
    Ok(ok(notification))
}

/// `PUT /api/users/notifications/read-all`
async fn mark_all_read(state: web::Data<AppState>, user: AuthUser) -> Result<HttpResponse> {
    state.services().notifier().mark_all_read(user.id).await?;
    Ok(done("All notifications marked as read"))
}

/// `GET /api/users/activity?workspaceId=&projectId=&limit=`
async fn activity(
    state: web::Data<AppState>,
    user: AuthUser,
    query: web::Query<ActivityQuery>,
) -> Result<HttpResponse> {
    let ctx = state.services();
    let filter = ActivityFilter {
        workspace: query.workspace_id,
        project: query.project_id,
        limit: query.limit.unwrap_or(DEFAULT_LIMIT),
    };
    let entries = ActivityService::new(ctx.clone()).feed(&user, filter).await?;

    let mut populator = ctx.populator();
    let mut feed = Vec::with_capacity(entries.len());
    for entry in &entries {
        feed.push(populator.activity(entry).await?);
    }
    Ok(ok(feed))
}

/// `GET /api/users/{id}`
async fn get_user(
    state: web::Data<AppState>,
    _user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let user = UserService::new(state.services())
        .get(path.into_inner())
        .await?;
    Ok(ok(user))
}
