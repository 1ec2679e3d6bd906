//! Teams: named subgroups of workspace members

use crate::storage::Document;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub workspace: Uuid,
    #[serde(default)]
    pub members: Vec<TeamMember>,
    #[serde(default)]
    pub projects: Vec<Uuid>,
    #[serde(default = "default_team_color")]
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Team {
    const COLLECTION: &'static str = "teams";

    fn id(&self) -> Uuid {
        self.id
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Team {
    pub fn new(name: String, description: String, workspace: Uuid, members: Vec<TeamMember>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            description,
            workspace,
            members,
            projects: Vec::new(),
            color: default_team_color(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn member(&self, user: Uuid) -> Option<&TeamMember> {
        self.members.iter().find(|m| m.user == user)
    }

    pub fn is_lead(&self, user: Uuid) -> bool {
        self.member(user).is_some_and(|m| m.role == TeamRole::Lead)
    }

    pub fn lead_count(&self) -> usize {
        self.members
            .iter()
            .filter(|m| m.role == TeamRole::Lead)
            .count()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub user: Uuid,
    pub role: TeamRole,
    pub joined_at: DateTime<Utc>,
}

impl TeamMember {
    pub fn new(user: Uuid, role: TeamRole) -> Self {
        Self {
            user,
            role,
            joined_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TeamRole {
    Lead,
    #[default]
    Member,
}

fn default_team_color() -> String {
    "#6366F1".to_string()
}
