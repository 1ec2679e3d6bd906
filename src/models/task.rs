//! Tasks and the data nested inside them

use crate::storage::Document;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub project: Uuid,
    #[serde(default)]
    pub section: Option<Uuid>,
    #[serde(default)]
    pub assignee: Option<Uuid>,
    #[serde(default)]
    pub assigned_by: Option<Uuid>,
    pub creator: Uuid,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub followers: Vec<Uuid>,
    #[serde(default)]
    pub dependencies: Dependencies,
    #[serde(default)]
    pub custom_fields: BTreeMap<String, Value>,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub comment_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Task {
    const COLLECTION: &'static str = "tasks";

    fn id(&self) -> Uuid {
        self.id
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Task {
    pub fn new(title: String, project: Uuid, creator: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            description: String::new(),
            project,
            section: None,
            assignee: None,
            assigned_by: None,
            creator,
            status: TaskStatus::Todo,
            priority: Priority::Medium,
            tags: Vec::new(),
            start_date: None,
            due_date: None,
            completed_at: None,
            subtasks: Vec::new(),
            attachments: Vec::new(),
            followers: vec![creator],
            dependencies: Dependencies::default(),
            custom_fields: BTreeMap::new(),
            order: 0,
            comment_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Set the status, stamping `completed_at` on completion and clearing it otherwise
    pub fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
        if status == TaskStatus::Completed {
            if self.completed_at.is_none() {
                self.completed_at = Some(Utc::now());
            }
        } else {
            self.completed_at = None;
        }
    }

    /// Add a follower unless already present; returns whether it was added
    pub fn add_follower(&mut self, user: Uuid) -> bool {
        if self.followers.contains(&user) {
            return false;
        }
        self.followers.push(user);
        true
    }

    /// Add a tag unless already present; returns whether it was added
    pub fn add_tag(&mut self, tag: &str) -> bool {
        if self.tags.iter().any(|t| t == tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    pub fn subtask_mut(&mut self, id: Uuid) -> Option<&mut Subtask> {
        self.subtasks.iter_mut().find(|s| s.id == id)
    }

    /// Strip `other` from both dependency lists
    pub fn forget_dependency(&mut self, other: Uuid) -> bool {
        let before = self.dependencies.blocked_by.len() + self.dependencies.blocking.len();
        self.dependencies.blocked_by.retain(|id| *id != other);
        self.dependencies.blocking.retain(|id| *id != other);
        before != self.dependencies.blocked_by.len() + self.dependencies.blocking.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Completed,
    Blocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subtask {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_by: Option<Uuid>,
}

impl Subtask {
    pub fn new(title: String, order: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            completed: false,
            order,
            completed_at: None,
            completed_by: None,
        }
    }

    /// Toggle completion, recording who completed it
    pub fn set_completed(&mut self, completed: bool, by: Uuid) {
        self.completed = completed;
        if completed {
            self.completed_at = Some(Utc::now());
            self.completed_by = Some(by);
        } else {
            self.completed_at = None;
            self.completed_by = None;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(rename = "type", default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub uploaded_by: Option<Uuid>,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependencies {
    #[serde(default)]
    pub blocked_by: Vec<Uuid>,
    #[serde(default)]
    pub blocking: Vec<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DependencyType {
    #[serde(rename = "blockedBy")]
    BlockedBy,
    #[serde(rename = "blocking")]
    Blocking,
}
