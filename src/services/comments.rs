//! Task comments and reactions

use super::tasks::require_change;
use super::{ServiceContext, isolate};
use crate::auth::access;
use crate::models::{ActivityAction, ActivityLog, Comment, Project, Reaction, Task, User};
use crate::utils::error::{AppError, Result};
use crate::utils::validation::Validator;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

const MAX_COMMENT_LEN: usize = 5000;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateComment {
    pub content: String,
    #[serde(default)]
    pub mentions: Vec<Uuid>,
    pub parent_comment: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct CommentService {
    ctx: ServiceContext,
}

impl CommentService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    async fn task_and_project(&self, task: Uuid) -> Result<(Task, Project)> {
        let task: Task = self.ctx.store.require(task, "Task not found").await?;
        let project: Project = self.ctx.store.require(task.project, "Project not found").await?;
        Ok((task, project))
    }

    async fn load(&self, id: Uuid) -> Result<Comment> {
        self.ctx.store.require(id, "Comment not found").await
    }

    /// The comment, provided the caller wrote it
    async fn authored(&self, user: &User, id: Uuid, denied: &str) -> Result<Comment> {
        let comment = self.load(id).await?;
        if comment.author != user.id {
            return Err(AppError::forbidden(denied));
        }
        Ok(comment)
    }

    /// Newest first
    pub async fn list(&self, user: &User, task_id: Uuid) -> Result<Vec<Comment>> {
        let (_, project) = self.task_and_project(task_id).await?;
        access::require_project_view(&project, user.id)?;

        let mut comments = self
            .ctx
            .store
            .find(|c: &Comment| c.task == task_id)
            .await?;
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(comments)
    }

    pub async fn create(&self, user: &User, task_id: Uuid, input: CreateComment) -> Result<Comment> {
        let (mut task, project) = self.task_and_project(task_id).await?;
        require_change(&project, user.id)?;
        Validator::validate_required("Comment content", &input.content, MAX_COMMENT_LEN)?;

        let mut comment = Comment::new(input.content.trim().to_string(), task.id, user.id);
        comment.mentions = input.mentions;
        comment.mentions.sort_unstable();
        comment.mentions.dedup();
        comment.parent_comment = input.parent_comment;
        self.ctx.store.insert(&comment).await?;

        task.comment_count += 1;
        self.ctx.store.save(&mut task).await?;

        let notifier = self.ctx.notifier();
        if !comment.mentions.is_empty() {
            isolate(
                "Mention notices",
                notifier.notify_comment_mention(&comment, &task).await,
            );
        }
        isolate(
            "Comment notices",
            notifier.notify_new_comment(&comment, &task).await,
        );
        isolate(
            "Activity logging",
            self.ctx
                .activity()
                .log(
                    ActivityLog::new(
                        user.id,
                        ActivityAction::CommentAdded,
                        format!("Commented on \"{}\"", task.title),
                    )
                    .workspace(project.workspace)
                    .project(project.id)
                    .task(task.id),
                )
                .await,
        );
        self.ctx
            .events
            .emit_to_project(project.id, "comment-added", &comment);

        Ok(comment)
    }

    pub async fn update(&self, user: &User, id: Uuid, content: String) -> Result<Comment> {
        let mut comment = self
            .authored(user, id, "Not authorized to update this comment")
            .await?;
        Validator::validate_required("Comment content", &content, MAX_COMMENT_LEN)?;

        comment.content = content.trim().to_string();
        comment.edited = true;
        comment.edited_at = Some(Utc::now());
        self.ctx.store.save(&mut comment).await?;

        if let Some(task) = self.ctx.store.get::<Task>(comment.task).await? {
            self.ctx
                .events
                .emit_to_project(task.project, "comment-updated", &comment);
        }
        Ok(comment)
    }

    pub async fn delete(&self, user: &User, id: Uuid) -> Result<()> {
        let comment = self
            .authored(user, id, "Not authorized to delete this comment")
            .await?;
        self.ctx.store.delete::<Comment>(id).await?;

        if let Some(mut task) = self.ctx.store.get::<Task>(comment.task).await? {
            task.comment_count = task.comment_count.saturating_sub(1);
            self.ctx.store.save(&mut task).await?;

            let project = self.ctx.store.get::<Project>(task.project).await?;
            let mut entry = ActivityLog::new(
                user.id,
                ActivityAction::CommentDeleted,
                format!("Deleted a comment on \"{}\"", task.title),
            )
            .project(task.project)
            .task(task.id);
            if let Some(project) = project {
                entry = entry.workspace(project.workspace);
            }
            isolate("Activity logging", self.ctx.activity().log(entry).await);
            self.ctx.events.emit_to_project(
                task.project,
                "comment-deleted",
                &json!({ "commentId": id, "taskId": task.id }),
            );
        }
        Ok(())
    }

    /// One reaction per user and emoji
    pub async fn add_reaction(&self, user: &User, id: Uuid, emoji: String) -> Result<Comment> {
        let mut comment = self.load(id).await?;
        let (_, project) = self.task_and_project(comment.task).await?;
        access::require_project_view(&project, user.id)?;

        let emoji = emoji.trim().to_string();
        if emoji.is_empty() {
            return Err(AppError::validation("Emoji is required"));
        }
        if comment
            .reactions
            .iter()
            .any(|r| r.user == user.id && r.emoji == emoji)
        {
            return Err(AppError::bad_request("Already reacted with this emoji"));
        }

        comment.reactions.push(Reaction {
            id: Uuid::new_v4(),
            emoji,
            user: user.id,
        });
        self.ctx.store.save(&mut comment).await?;
        self.ctx
            .events
            .emit_to_project(project.id, "comment-updated", &comment);
        Ok(comment)
    }

    /// Only the reacting user can take a reaction back
    pub async fn remove_reaction(&self, user: &User, id: Uuid, reaction: Uuid) -> Result<Comment> {
        let mut comment = self.load(id).await?;
        let before = comment.reactions.len();
        comment
            .reactions
            .retain(|r| !(r.id == reaction && r.user == user.id));
        if comment.reactions.len() == before {
            return Err(AppError::not_found("Reaction not found"));
        }
        self.ctx.store.save(&mut comment).await?;

        if let Some(task) = self.ctx.store.get::<Task>(comment.task).await? {
            self.ctx
                .events
                .emit_to_project(task.project, "comment-updated", &comment);
        }
        Ok(comment)
    }
}
