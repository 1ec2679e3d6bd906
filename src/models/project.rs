//! Projects, their sections and custom field definitions

use crate::storage::Document;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub workspace: Uuid,
    #[serde(default)]
    pub team: Option<Uuid>,
    pub owner: Uuid,
    #[serde(default)]
    pub members: Vec<ProjectMember>,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub custom_fields: Vec<CustomField>,
    pub color: String,
    pub icon: String,
    #[serde(default)]
    pub view: ProjectView,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub privacy: Privacy,
    #[serde(default)]
    pub task_count: u32,
    #[serde(default)]
    pub completed_task_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Project {
    const COLLECTION: &'static str = "projects";

    fn id(&self) -> Uuid {
        self.id
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Project {
    /// A project with the three default sections and its owner as sole member
    pub fn new(name: String, workspace: Uuid, owner: Uuid) -> Self {
        let now = Utc::now();
        let sections = ["To Do", "In Progress", "Done"]
            .iter()
            .enumerate()
            .map(|(order, name)| Section::new(name.to_string(), order as u32))
            .collect();

        Self {
            id: Uuid::new_v4(),
            name,
            description: String::new(),
            workspace,
            team: None,
            owner,
            members: vec![ProjectMember::new(owner, ProjectRole::Owner)],
            sections,
            custom_fields: Vec::new(),
            color: "#4A90E2".to_string(),
            icon: "folder".to_string(),
            view: ProjectView::List,
            status: ProjectStatus::Active,
            start_date: None,
            due_date: None,
            privacy: Privacy::Public,
            task_count: 0,
            completed_task_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn member(&self, user: Uuid) -> Option<&ProjectMember> {
        self.members.iter().find(|m| m.user == user)
    }

    pub fn section(&self, id: Uuid) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn section_mut(&mut self, id: Uuid) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.id == id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMember {
    pub user: Uuid,
    pub role: ProjectRole,
    pub added_at: DateTime<Utc>,
}

impl ProjectMember {
    pub fn new(user: Uuid, role: ProjectRole) -> Self {
        Self {
            user,
            role,
            added_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProjectRole {
    Owner,
    #[default]
    Editor,
    Viewer,
}

impl ProjectRole {
    /// Position in the owner > editor > viewer hierarchy
    pub fn rank(self) -> u8 {
        match self {
            ProjectRole::Owner => 3,
            ProjectRole::Editor => 2,
            ProjectRole::Viewer => 1,
        }
    }

    pub fn at_least(self, required: ProjectRole) -> bool {
        self.rank() >= required.rank()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub order: u32,
    #[serde(default)]
    pub collapsed: bool,
}

impl Section {
    pub fn new(name: String, order: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            order,
            collapsed: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomField {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: CustomFieldType,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomFieldType {
    Text,
    Number,
    Date,
    Dropdown,
    Checkbox,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProjectView {
    #[default]
    List,
    Board,
    Timeline,
    Calendar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Active,
    Archived,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Privacy {
    #[default]
    Public,
    Private,
}
