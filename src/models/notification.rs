//! In-app notifications

use crate::storage::Document;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Notifications older than this are purged by the maintenance sweep
pub const NOTIFICATION_RETENTION_DAYS: i64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub recipient: Uuid,
    #[serde(default)]
    pub sender: Option<Uuid>,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub related_task: Option<Uuid>,
    #[serde(default)]
    pub related_project: Option<Uuid>,
    #[serde(default)]
    pub related_workspace: Option<Uuid>,
    #[serde(default)]
    pub related_comment: Option<Uuid>,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Notification {
    const COLLECTION: &'static str = "notifications";

    fn id(&self) -> Uuid {
        self.id
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Notification {
    pub fn mark_read(&mut self) {
        self.read = true;
        self.read_at = Some(Utc::now());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    TaskAssigned,
    TaskCompleted,
    TaskDueSoon,
    TaskOverdue,
    CommentAdded,
    CommentMention,
    ProjectInvite,
    WorkspaceInvite,
    TaskUpdated,
    TaskDeleted,
    SubtaskCompleted,
}

/// Fields a caller supplies; ids and timestamps are filled in on creation
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub recipient: Uuid,
    pub sender: Option<Uuid>,
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
    pub related_task: Option<Uuid>,
    pub related_project: Option<Uuid>,
    pub related_workspace: Option<Uuid>,
    pub related_comment: Option<Uuid>,
}

impl NewNotification {
    pub fn new(recipient: Uuid, kind: NotificationType, title: &str, message: String) -> Self {
        Self {
            recipient,
            sender: None,
            kind,
            title: title.to_string(),
            message,
            link: None,
            related_task: None,
            related_project: None,
            related_workspace: None,
            related_comment: None,
        }
    }

    pub fn sender(mut self, sender: Uuid) -> Self {
        self.sender = Some(sender);
        self
    }

    pub fn link(mut self, link: String) -> Self {
        self.link = Some(link);
        self
    }

    pub fn task(mut self, task: Uuid) -> Self {
        self.related_task = Some(task);
        self
    }

    pub fn project(mut self, project: Uuid) -> Self {
        self.related_project = Some(project);
        self
    }

    pub fn workspace(mut self, workspace: Uuid) -> Self {
        self.related_workspace = Some(workspace);
        self
    }

    pub fn comment(mut self, comment: Uuid) -> Self {
        self.related_comment = Some(comment);
        self
    }

    pub fn build(self) -> Notification {
        let now = Utc::now();
        Notification {
            id: Uuid::new_v4(),
            recipient: self.recipient,
            sender: self.sender,
            kind: self.kind,
            title: self.title,
            message: self.message,
            link: self.link,
            related_task: self.related_task,
            related_project: self.related_project,
            related_workspace: self.related_workspace,
            related_comment: self.related_comment,
            read: false,
            read_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}
