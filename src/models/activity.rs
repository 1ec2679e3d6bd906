//! Activity log entries

use crate::storage::Document;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Activity older than this is purged by the maintenance sweep
pub const ACTIVITY_RETENTION_DAYS: i64 = 90;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user: Uuid,
    #[serde(default)]
    pub workspace: Option<Uuid>,
    #[serde(default)]
    pub project: Option<Uuid>,
    #[serde(default)]
    pub task: Option<Uuid>,
    pub action: ActivityAction,
    pub description: String,
    #[serde(default)]
    pub changes: Option<Value>,
    #[serde(default)]
    pub metadata: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for ActivityLog {
    const COLLECTION: &'static str = "activity_logs";

    fn id(&self) -> Uuid {
        self.id
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl ActivityLog {
    pub fn new(user: Uuid, action: ActivityAction, description: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user,
            workspace: None,
            project: None,
            task: None,
            action,
            description,
            changes: None,
            metadata: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn workspace(mut self, workspace: Uuid) -> Self {
        self.workspace = Some(workspace);
        self
    }

    pub fn project(mut self, project: Uuid) -> Self {
        self.project = Some(project);
        self
    }

    pub fn task(mut self, task: Uuid) -> Self {
        self.task = Some(task);
        self
    }

    pub fn changes(mut self, changes: Value) -> Self {
        self.changes = Some(changes);
        self
    }

    pub fn metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    TaskCreated,
    TaskUpdated,
    TaskDeleted,
    TaskCompleted,
    TaskAssigned,
    TaskMoved,
    CommentAdded,
    CommentDeleted,
    ProjectCreated,
    ProjectUpdated,
    ProjectDeleted,
    SectionAdded,
    SectionDeleted,
    WorkspaceCreated,
    WorkspaceUpdated,
    MemberInvited,
    MemberRemoved,
    MemberAdded,
    SubtaskAdded,
    SubtaskCompleted,
    FileUploaded,
    FileDeleted,
    InvitationsSent,
    TeamCreated,
    AutomationCreated,
}
