//! Comment endpoints, mounted inside the `/tasks` scope

use crate::auth::AuthUser;
use crate::models::Comment;
use crate::server::routes::{created, done, ok};
use crate::server::state::AppState;
use crate::services::comments::CreateComment;
use crate::services::{CommentService, ServiceContext};
use crate::utils::error::Result;
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/comments/{id}", web::put().to(update_comment))
        .route("/comments/{id}", web::delete().to(delete_comment))
        .route("/comments/{id}/reactions", web::post().to(add_reaction))
        .route(
            "/comments/{id}/reactions/{reaction_id}",
            web::delete().to(remove_reaction),
        )
        .route("/{id}/comments", web::get().to(list_comments))
        .route("/{id}/comments", web::post().to(create_comment));
}

#[derive(Debug, Deserialize)]
struct EditComment {
    content: String,
}

#[derive(Debug, Deserialize)]
struct NewReaction {
    emoji: String,
}

async fn render(ctx: &ServiceContext, comment: &Comment) -> Result<Value> {
    ctx.populator().comment(comment).await
}

/// `GET /api/tasks/{id}/comments`
async fn list_comments(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let ctx = state.services();
    let comments = CommentService::new(ctx.clone())
        .list(&user, path.into_inner())
        .await?;

    let mut populator = ctx.populator();
    let mut out = Vec::with_capacity(comments.len());
    for comment in &comments {
        out.push(populator.comment(comment).await?);
    }
    Ok(ok(out))
}

/// `POST /api/tasks/{id}/comments`
async fn create_comment(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
    input: web::Json<CreateComment>,
) -> Result<HttpResponse> {
    let ctx = state.services();
    let comment = CommentService::new(ctx.clone())
        .create(&user, path.into_inner(), input.into_inner())
        .await?;
    Ok(created(render(&ctx, &comment).await?))
}

/// `PUT /api/tasks/comments/{id}`
async fn update_comment(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
    input: web::Json<EditComment>,
) -> Result<HttpResponse> {
    let ctx = state.services();
    let comment = CommentService::new(ctx.clone())
        .update(&user, path.into_inner(), input.into_inner().content)
        .await?;
    Ok(ok(render(&ctx, &comment).await?))
}

/// `DELETE /api/tasks/comments/{id}`
async fn delete_comment(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    CommentService::new(state.services())
        .delete(&user, path.into_inner())
        .await?;
    Ok(done("Comment deleted successfully"))
}

async fn add_reaction(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
    input: web::Json<NewReaction>,
) -> Result<HttpResponse> {
    let ctx = state.services();
    let comment = CommentService::new(ctx.clone())
        .add_reaction(&user, path.into_inner(), input.into_inner().emoji)
        .await?;
    Ok(ok(render(&ctx, &comment).await?))
}

async fn remove_reaction(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    let (id, reaction) = path.into_inner();
    let ctx = state.services();
    let comment = CommentService::new(ctx.clone())
        .remove_reaction(&user, id, reaction)
        .await?;
    Ok(ok(render(&ctx, &comment).await?))
}
