//! Read-time reference population
//!
//! Documents are serialized first and then have their reference ids swapped
//! for compact summaries. Lookups are cached per populator, so one response
//! resolves each user at most once. A reference that no longer resolves is
//! dropped from arrays and rendered `null` in single slots.

use crate::models::{
    ActivityLog, Comment, Notification, Project, Task, Team, User, Workspace,
};
use crate::storage::{Document, Store};
use crate::utils::error::Result;
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use uuid::Uuid;

pub struct Populator<'a> {
    store: &'a Store,
    users: HashMap<Uuid, Value>,
}

impl<'a> Populator<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self {
            store,
            users: HashMap::new(),
        }
    }

    /// `{_id, name, email, avatar}`, or `null`
    pub async fn user(&mut self, id: Uuid) -> Result<Value> {
        if let Some(cached) = self.users.get(&id) {
            return Ok(cached.clone());
        }
        let summary = match self.store.get::<User>(id).await? {
            Some(user) => serde_json::to_value(user.summary())?,
            None => Value::Null,
        };
        self.users.insert(id, summary.clone());
        Ok(summary)
    }

    pub async fn users(&mut self, ids: &[Uuid]) -> Result<Vec<Value>> {
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            let summary = self.user(*id).await?;
            if !summary.is_null() {
                out.push(summary);
            }
        }
        Ok(out)
    }

    /// `{_id, name, color, icon, workspace}`, or `null`
    pub async fn project_summary(&mut self, id: Uuid) -> Result<Value> {
        Ok(match self.store.get::<Project>(id).await? {
            Some(p) => json!({
                "_id": p.id,
                "name": p.name,
                "color": p.color,
                "icon": p.icon,
                "workspace": p.workspace,
            }),
            None => Value::Null,
        })
    }

    /// `{_id, title, status}` per task, dangling ids dropped
    pub async fn task_summaries(&mut self, ids: &[Uuid]) -> Result<Vec<Value>> {
        let tasks: Vec<Task> = self.store.get_many(ids).await?;
        Ok(tasks
            .into_iter()
            .map(|t| json!({ "_id": t.id, "title": t.title, "status": t.status }))
            .collect())
    }

    async fn named<T>(&mut self, ids: &[Uuid], describe: fn(&T) -> Value) -> Result<Vec<Value>>
    where
        T: Document,
    {
        let docs: Vec<T> = self.store.get_many(ids).await?;
        Ok(docs.iter().map(describe).collect())
    }

    /// Replace a single user reference in place
    async fn user_slot(&mut self, slot: Option<&mut Value>) -> Result<()> {
        if let Some(slot) = slot {
            if let Some(id) = as_uuid(slot) {
                *slot = self.user(id).await?;
            }
        }
        Ok(())
    }

    /// Replace an array of user references in place
    async fn user_array(&mut self, slot: Option<&mut Value>) -> Result<()> {
        if let Some(Value::Array(items)) = slot {
            let ids: Vec<Uuid> = items.iter().filter_map(as_uuid).collect();
            *items = self.users(&ids).await?;
        }
        Ok(())
    }

    /// Replace the `user` field of every member entry
    async fn member_users(&mut self, slot: Option<&mut Value>) -> Result<()> {
        if let Some(Value::Array(members)) = slot {
            let mut kept = Vec::with_capacity(members.len());
            for mut member in members.drain(..) {
                let Some(id) = member.get("user").and_then(as_uuid) else {
                    continue;
                };
                let summary = self.user(id).await?;
                if summary.is_null() {
                    continue;
                }
                member["user"] = summary;
                kept.push(member);
            }
            *members = kept;
        }
        Ok(())
    }

    /// Task with people populated, as listed on boards
    pub async fn task(&mut self, task: &Task) -> Result<Value> {
        let mut doc = to_doc(task)?;
        for field in ["assignee", "assignedBy", "creator"] {
            self.user_slot(doc.get_mut(field)).await?;
        }
        self.user_array(doc.get_mut("followers")).await?;
        if let Some(Value::Array(subtasks)) = doc.get_mut("subtasks") {
            for subtask in subtasks.iter_mut() {
                self.user_slot(subtask.get_mut("completedBy")).await?;
            }
        }
        Ok(doc)
    }

    pub async fn tasks(&mut self, tasks: &[Task]) -> Result<Vec<Value>> {
        let mut out = Vec::with_capacity(tasks.len());
        for task in tasks {
            out.push(self.task(task).await?);
        }
        Ok(out)
    }

    /// Task with its project and dependencies resolved as well
    pub async fn task_detail(&mut self, task: &Task) -> Result<Value> {
        let mut doc = self.task(task).await?;
        doc["project"] = self.project_summary(task.project).await?;
        doc["dependencies"] = json!({
            "blockedBy": self.task_summaries(&task.dependencies.blocked_by).await?,
            "blocking": self.task_summaries(&task.dependencies.blocking).await?,
        });
        Ok(doc)
    }

    /// Task with only its project resolved, as used by personal task lists
    pub async fn task_with_project(&mut self, task: &Task) -> Result<Value> {
        let mut doc = to_doc(task)?;
        doc["project"] = self.project_summary(task.project).await?;
        self.user_slot(doc.get_mut("assignedBy")).await?;
        self.user_slot(doc.get_mut("creator")).await?;
        Ok(doc)
    }

    pub async fn workspace(&mut self, workspace: &Workspace) -> Result<Value> {
        let mut doc = to_doc(workspace)?;
        self.user_slot(doc.get_mut("owner")).await?;
        self.member_users(doc.get_mut("members")).await?;
        doc["teams"] = Value::Array(
            self.named(&workspace.teams, |t: &Team| {
                json!({ "_id": t.id, "name": t.name, "color": t.color })
            })
            .await?,
        );
        doc["projects"] = Value::Array(
            self.named(&workspace.projects, |p: &Project| {
                json!({ "_id": p.id, "name": p.name, "color": p.color, "icon": p.icon })
            })
            .await?,
        );
        Ok(doc)
    }

    pub async fn team(&mut self, team: &Team) -> Result<Value> {
        let mut doc = to_doc(team)?;
        self.member_users(doc.get_mut("members")).await?;
        doc["projects"] = Value::Array(
            self.named(&team.projects, |p: &Project| {
                json!({ "_id": p.id, "name": p.name, "color": p.color })
            })
            .await?,
        );
        Ok(doc)
    }

    pub async fn project(&mut self, project: &Project) -> Result<Value> {
        let mut doc = to_doc(project)?;
        self.user_slot(doc.get_mut("owner")).await?;
        self.member_users(doc.get_mut("members")).await?;
        if let Some(team) = project.team {
            let teams = self
                .named(&[team], |t: &Team| json!({ "_id": t.id, "name": t.name }))
                .await?;
            doc["team"] = teams.into_iter().next().unwrap_or(Value::Null);
        }
        Ok(doc)
    }

    pub async fn comment(&mut self, comment: &Comment) -> Result<Value> {
        let mut doc = to_doc(comment)?;
        self.user_slot(doc.get_mut("author")).await?;
        self.user_array(doc.get_mut("mentions")).await?;
        Ok(doc)
    }

    pub async fn notification(&mut self, notification: &Notification) -> Result<Value> {
        let mut doc = to_doc(notification)?;
        self.user_slot(doc.get_mut("sender")).await?;
        Ok(doc)
    }

    pub async fn activity(&mut self, entry: &ActivityLog) -> Result<Value> {
        let mut doc = to_doc(entry)?;
        self.user_slot(doc.get_mut("user")).await?;
        Ok(doc)
    }

    /// The caller's own account with workspaces and teams as `{_id, name, description}`
    pub async fn account(&mut self, user: &User) -> Result<Value> {
        let mut doc = to_doc(&user.profile())?;
        doc["workspaces"] = Value::Array(
            self.named(&user.workspaces, |w: &Workspace| {
                json!({ "_id": w.id, "name": w.name, "description": w.description })
            })
            .await?,
        );
        doc["teams"] = Value::Array(
            self.named(&user.teams, |t: &Team| {
                json!({ "_id": t.id, "name": t.name, "description": t.description })
            })
            .await?,
        );
        Ok(doc)
    }
}

fn to_doc<T: Serialize>(value: &T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

fn as_uuid(value: &Value) -> Option<Uuid> {
    value.as_str().and_then(|s| Uuid::parse_str(s).ok())
}
