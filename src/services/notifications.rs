//! Notification creation and inbox management
//!
//! Every stored notification is pushed to the recipient's `user:<id>` room.
//! The `notify_*` helpers build the standard message for each event kind.

use super::ServiceContext;
use crate::models::{
    Comment, NewNotification, Notification, NotificationType, Project, Task, Workspace,
};
use crate::utils::error::{AppError, Result};
use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Notifier {
    ctx: ServiceContext,
}

impl Notifier {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub async fn create(&self, new: NewNotification) -> Result<Notification> {
        let notification = new.build();
        self.ctx.store.insert(&notification).await?;
        self.ctx
            .events
            .emit_to_user(notification.recipient, "notification", &notification);
        debug!(
            "Notified {} ({:?})",
            notification.recipient, notification.kind
        );
        Ok(notification)
    }

    pub async fn create_bulk(&self, batch: Vec<NewNotification>) -> Result<Vec<Notification>> {
        let mut created = Vec::with_capacity(batch.len());
        for new in batch {
            created.push(self.create(new).await?);
        }
        Ok(created)
    }

    /// Skipped when someone assigns a task to themselves
    pub async fn notify_task_assignment(
        &self,
        task: &Task,
        assigned_by: Uuid,
        assignee: Uuid,
    ) -> Result<Option<Notification>> {
        if assigned_by == assignee {
            return Ok(None);
        }
        let new = NewNotification::new(
            assignee,
            NotificationType::TaskAssigned,
            "New task assigned",
            "You have been assigned a new task".to_string(),
        )
        .sender(assigned_by)
        .link(task_link(task))
        .task(task.id)
        .project(task.project);
        self.create(new).await.map(Some)
    }

    pub async fn notify_task_completion(
        &self,
        task: &Task,
        completed_by: Uuid,
        followers: &[Uuid],
    ) -> Result<Vec<Notification>> {
        let batch = followers
            .iter()
            .filter(|f| **f != completed_by)
            .map(|f| {
                NewNotification::new(
                    *f,
                    NotificationType::TaskCompleted,
                    "Task completed",
                    format!("Task \"{}\" has been completed", task.title),
                )
                .sender(completed_by)
                .link(task_link(task))
                .task(task.id)
                .project(task.project)
            })
            .collect();
        self.create_bulk(batch).await
    }

    pub async fn notify_comment_mention(
        &self,
        comment: &Comment,
        task: &Task,
    ) -> Result<Vec<Notification>> {
        let batch = comment
            .mentions
            .iter()
            .map(|m| {
                NewNotification::new(
                    *m,
                    NotificationType::CommentMention,
                    "You were mentioned",
                    "You were mentioned in a comment".to_string(),
                )
                .sender(comment.author)
                .link(task_link(task))
                .task(task.id)
                .comment(comment.id)
                .project(task.project)
            })
            .collect();
        self.create_bulk(batch).await
    }

    /// Followers other than the comment's author
    pub async fn notify_new_comment(
        &self,
        comment: &Comment,
        task: &Task,
    ) -> Result<Vec<Notification>> {
        let batch = task
            .followers
            .iter()
            .filter(|f| **f != comment.author)
            .map(|f| {
                NewNotification::new(
                    *f,
                    NotificationType::CommentAdded,
                    "New comment",
                    format!("New comment on \"{}\"", task.title),
                )
                .sender(comment.author)
                .link(task_link(task))
                .task(task.id)
                .comment(comment.id)
                .project(task.project)
            })
            .collect();
        self.create_bulk(batch).await
    }

    pub async fn notify_due_date_approaching(
        &self,
        task: &Task,
        days_until_due: i64,
    ) -> Result<Option<Notification>> {
        let Some(assignee) = task.assignee else {
            return Ok(None);
        };
        let new = NewNotification::new(
            assignee,
            NotificationType::TaskDueSoon,
            "Task due soon",
            due_soon_message(&task.title, days_until_due),
        )
        .link(task_link(task))
        .task(task.id)
        .project(task.project);
        self.create(new).await.map(Some)
    }

    pub async fn notify_overdue_task(&self, task: &Task) -> Result<Option<Notification>> {
        let Some(assignee) = task.assignee else {
            return Ok(None);
        };
        let new = NewNotification::new(
            assignee,
            NotificationType::TaskOverdue,
            "Task overdue",
            format!("Task \"{}\" is overdue", task.title),
        )
        .link(task_link(task))
        .task(task.id)
        .project(task.project);
        self.create(new).await.map(Some)
    }

    pub async fn notify_project_invitation(
        &self,
        project: &Project,
        invited_by: Uuid,
        invited: Uuid,
    ) -> Result<Notification> {
        let new = NewNotification::new(
            invited,
            NotificationType::ProjectInvite,
            "Project invitation",
            format!("You have been invited to join \"{}\"", project.name),
        )
        .sender(invited_by)
        .link(format!("/projects/{}", project.id))
        .project(project.id)
        .workspace(project.workspace);
        self.create(new).await
    }

    pub async fn notify_workspace_invitation(
        &self,
        workspace: &Workspace,
        invited_by: Uuid,
        invited: Uuid,
    ) -> Result<Notification> {
        let new = NewNotification::new(
            invited,
            NotificationType::WorkspaceInvite,
            "Workspace invitation",
            format!("You have been invited to join \"{}\"", workspace.name),
        )
        .sender(invited_by)
        .link(format!("/workspaces/{}", workspace.id))
        .workspace(workspace.id);
        self.create(new).await
    }

    /// A user's inbox, newest first, plus their unread count
    pub async fn inbox(
        &self,
        user: Uuid,
        read: Option<bool>,
        limit: usize,
    ) -> Result<(Vec<Notification>, usize)> {
        let mut mine: Vec<Notification> = self
            .ctx
            .store
            .find(|n: &Notification| n.recipient == user)
            .await?;
        let unread = mine.iter().filter(|n| !n.read).count();

        if let Some(read) = read {
            mine.retain(|n| n.read == read);
        }
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        mine.truncate(limit);
        Ok((mine, unread))
    }

    pub async fn mark_read(&self, user: Uuid, id: Uuid) -> Result<Notification> {
        let mut notification = self
            .ctx
            .store
            .get::<Notification>(id)
            .await?
            .filter(|n| n.recipient == user)
            .ok_or_else(|| AppError::not_found("Notification not found"))?;
        notification.mark_read();
        self.ctx.store.save(&mut notification).await?;
        Ok(notification)
    }

    pub async fn mark_all_read(&self, user: Uuid) -> Result<usize> {
        self.ctx
            .store
            .update_where(
                |n: &Notification| n.recipient == user && !n.read,
                |n: &mut Notification| {
                    n.mark_read();
                    true
                },
            )
            .await
    }

    /// Drop notifications created before `cutoff`
    pub async fn purge_before(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        self.ctx
            .store
            .delete_where(|n: &Notification| n.created_at < cutoff)
            .await
    }
}

fn task_link(task: &Task) -> String {
    format!("/tasks/{}", task.id)
}

fn due_soon_message(title: &str, days: i64) -> String {
    let unit = if days > 1 { "days" } else { "day" };
    format!("Task \"{}\" is due in {} {}", title, days, unit)
}
