//! Workspaces: the top-level tenant container

use super::project::ProjectView;
use crate::storage::Document;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub owner: Uuid,
    #[serde(default)]
    pub members: Vec<WorkspaceMember>,
    #[serde(default)]
    pub teams: Vec<Uuid>,
    #[serde(default)]
    pub projects: Vec<Uuid>,
    #[serde(default)]
    pub settings: WorkspaceSettings,
    #[serde(default)]
    pub pending_invitations: Vec<PendingInvitation>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Workspace {
    const COLLECTION: &'static str = "workspaces";

    fn id(&self) -> Uuid {
        self.id
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Workspace {
    /// A workspace whose only member is its owner
    pub fn new(name: String, description: String, owner: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            description,
            owner,
            members: vec![WorkspaceMember::new(owner, WorkspaceRole::Owner)],
            teams: Vec::new(),
            projects: Vec::new(),
            settings: WorkspaceSettings::default(),
            pending_invitations: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn member(&self, user: Uuid) -> Option<&WorkspaceMember> {
        self.members.iter().find(|m| m.user == user)
    }

    pub fn is_member(&self, user: Uuid) -> bool {
        self.member(user).is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceMember {
    pub user: Uuid,
    pub role: WorkspaceRole,
    pub joined_at: DateTime<Utc>,
}

impl WorkspaceMember {
    pub fn new(user: Uuid, role: WorkspaceRole) -> Self {
        Self {
            user,
            role,
            joined_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WorkspaceRole {
    Owner,
    Admin,
    #[default]
    Member,
    Guest,
}

impl WorkspaceRole {
    /// Position in the owner > admin > member > guest hierarchy
    pub fn rank(self) -> u8 {
        match self {
            WorkspaceRole::Owner => 4,
            WorkspaceRole::Admin => 3,
            WorkspaceRole::Member => 2,
            WorkspaceRole::Guest => 1,
        }
    }

    pub fn at_least(self, required: WorkspaceRole) -> bool {
        self.rank() >= required.rank()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceSettings {
    pub allow_guests: bool,
    pub default_project_view: ProjectView,
    /// ISO weekdays, Monday = 1
    pub working_days: Vec<u8>,
}

impl Default for WorkspaceSettings {
    fn default() -> Self {
        Self {
            allow_guests: true,
            default_project_view: ProjectView::List,
            working_days: vec![1, 2, 3, 4, 5],
        }
    }
}

/// Partial settings accepted by create and update
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceSettingsUpdate {
    pub allow_guests: Option<bool>,
    pub default_project_view: Option<ProjectView>,
    pub working_days: Option<Vec<u8>>,
}

impl WorkspaceSettings {
    pub fn merge(&mut self, update: WorkspaceSettingsUpdate) {
        if let Some(allow) = update.allow_guests {
            self.allow_guests = allow;
        }
        if let Some(view) = update.default_project_view {
            self.default_project_view = view;
        }
        if let Some(days) = update.working_days {
            self.working_days = days;
        }
    }
}

/// Invitation addressed to an email with no account yet
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingInvitation {
    pub email: String,
    pub invited_by: Uuid,
    pub invited_at: DateTime<Utc>,
}
