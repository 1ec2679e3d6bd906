//! Project automations: CRUD and the rule engine
//!
//! [`AutomationService::execute`] runs after a task mutation has been saved.
//! Actions write straight to the task and never re-enter the engine, so an
//! automation cannot trigger another one.

use super::{ServiceContext, isolate};
use crate::auth::access;
use crate::models::{
    ActionType, ActivityAction, ActivityLog, Automation, AutomationAction, Comment,
    NewNotification, NotificationType, Priority, Project, TaskStatus, Task, Trigger,
    TriggerType, User,
};
use crate::utils::error::{AppError, Result};
use crate::utils::validation::Validator;
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAutomation {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub trigger: Trigger,
    #[serde(default)]
    pub actions: Vec<AutomationAction>,
    #[serde(default)]
    pub active: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAutomation {
    pub name: Option<String>,
    pub description: Option<String>,
    pub active: Option<bool>,
    pub trigger: Option<Trigger>,
    pub actions: Option<Vec<AutomationAction>>,
}

#[derive(Debug, Clone)]
pub struct AutomationService {
    ctx: ServiceContext,
}

impl AutomationService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    async fn project(&self, id: Uuid) -> Result<Project> {
        self.ctx.store.require(id, "Project not found").await
    }

    pub async fn list(&self, user: &User, project_id: Uuid) -> Result<Vec<Automation>> {
        let project = self.project(project_id).await?;
        access::require_project_view(&project, user.id)?;

        let mut automations: Vec<Automation> = self
            .ctx
            .store
            .find(|a: &Automation| a.project == project_id)
            .await?;
        automations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(automations)
    }

    pub async fn create(
        &self,
        user: &User,
        project_id: Uuid,
        input: CreateAutomation,
    ) -> Result<Automation> {
        let project = self.project(project_id).await?;
        access::require_project_edit(&project, user.id)?;
        Validator::validate_required("Automation name", &input.name, 100)?;

        let now = Utc::now();
        let automation = Automation {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            description: input.description.unwrap_or_default(),
            project: project.id,
            workspace: project.workspace,
            creator: user.id,
            active: input.active.unwrap_or(true),
            trigger: input.trigger,
            actions: input.actions,
            execution_count: 0,
            last_executed: None,
            created_at: now,
            updated_at: now,
        };
        self.ctx.store.insert(&automation).await?;

        isolate(
            "Activity logging",
            self.ctx
                .activity()
                .log(
                    ActivityLog::new(
                        user.id,
                        ActivityAction::AutomationCreated,
                        format!("Created automation \"{}\"", automation.name),
                    )
                    .workspace(project.workspace)
                    .project(project.id),
                )
                .await,
        );

        info!("Automation {} created on project {}", automation.id, project.id);
        Ok(automation)
    }

    pub async fn update(&self, user: &User, id: Uuid, input: UpdateAutomation) -> Result<Automation> {
        let mut automation: Automation = self.ctx.store.require(id, "Automation not found").await?;
        let project = self.project(automation.project).await?;
        access::require_project_edit(&project, user.id)?;

        if let Some(name) = input.name {
            Validator::validate_required("Automation name", &name, 100)?;
            automation.name = name.trim().to_string();
        }
        if let Some(description) = input.description {
            automation.description = description;
        }
        if let Some(active) = input.active {
            automation.active = active;
        }
        if let Some(trigger) = input.trigger {
            automation.trigger = trigger;
        }
        if let Some(actions) = input.actions {
            automation.actions = actions;
        }

        self.ctx.store.save(&mut automation).await?;
        Ok(automation)
    }

    pub async fn delete(&self, user: &User, id: Uuid) -> Result<()> {
        let automation: Automation = self.ctx.store.require(id, "Automation not found").await?;
        let project = self.project(automation.project).await?;
        access::require_project_edit(&project, user.id)?;

        self.ctx.store.delete::<Automation>(id).await?;
        Ok(())
    }

    /// Run every active automation of the task's project listening for `trigger`
    ///
    /// `task` is updated in place and saved when an action changes it. Failures
    /// are logged and never propagate.
    pub async fn execute(&self, trigger: TriggerType, task: &mut Task) {
        let current: &Task = task;
        let automations = match self
            .ctx
            .store
            .find(|a: &Automation| a.project == current.project && a.applies_to(trigger, current))
            .await
        {
            Ok(automations) => automations,
            Err(e) => {
                warn!("Loading automations failed: {}", e);
                return;
            }
        };

        for mut automation in automations {
            debug!("Running automation {} for task {}", automation.id, task.id);
            let mut changed = false;
            for action in &automation.actions {
                match self.apply(action, task, &automation).await {
                    Ok(c) => changed |= c,
                    Err(e) => warn!("Automation action {:?} failed: {}", action.action_type, e),
                }
            }
            if changed {
                isolate("Saving automated task", self.ctx.store.save(task).await);
            }

            automation.execution_count += 1;
            automation.last_executed = Some(Utc::now());
            isolate(
                "Recording automation run",
                self.ctx.store.save(&mut automation).await,
            );
        }
    }

    /// Apply one action; returns whether the task itself changed
    async fn apply(
        &self,
        action: &AutomationAction,
        task: &mut Task,
        automation: &Automation,
    ) -> Result<bool> {
        match action.action_type {
            ActionType::AssignTask => {
                task.assignee = Some(value_as::<Uuid>(&action.value)?);
                task.assigned_by = Some(automation.creator);
                Ok(true)
            }
            ActionType::MoveToSection => {
                task.section = Some(value_as::<Uuid>(&action.value)?);
                Ok(true)
            }
            ActionType::SetStatus => {
                task.set_status(value_as::<TaskStatus>(&action.value)?);
                Ok(true)
            }
            ActionType::SetPriority => {
                task.priority = value_as::<Priority>(&action.value)?;
                Ok(true)
            }
            ActionType::AddTag => {
                let tag = value_as::<String>(&action.value)?;
                Ok(task.add_tag(&tag))
            }
            ActionType::MarkComplete => {
                task.status = TaskStatus::Completed;
                task.completed_at = Some(Utc::now());
                Ok(true)
            }
            ActionType::SendNotification => {
                if let Some(assignee) = task.assignee {
                    let message = action
                        .value
                        .as_str()
                        .filter(|m| !m.is_empty())
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("Automation \"{}\" was triggered", automation.name));
                    self.ctx
                        .notifier()
                        .create(
                            NewNotification::new(
                                assignee,
                                NotificationType::TaskUpdated,
                                "Automation triggered",
                                message,
                            )
                            .link(format!("/tasks/{}", task.id))
                            .task(task.id)
                            .project(task.project),
                        )
                        .await?;
                }
                Ok(false)
            }
            ActionType::AddComment => {
                let content = value_as::<String>(&action.value)?;
                let comment = Comment::new(content, task.id, automation.creator);
                self.ctx.store.insert(&comment).await?;
                task.comment_count += 1;
                Ok(true)
            }
            ActionType::SetDueDate => {
                task.due_date = Some(Utc::now() + Duration::days(days_from(&action.value)));
                Ok(true)
            }
            ActionType::Unknown => {
                info!("Skipping unknown automation action in {}", automation.id);
                Ok(false)
            }
        }
    }
}

fn value_as<T: serde::de::DeserializeOwned>(value: &Value) -> Result<T> {
    serde_json::from_value(value.clone())
        .map_err(|e| AppError::bad_request(format!("Invalid action value: {}", e)))
}

/// Integer day offset from a number or numeric string; anything else is 0
fn days_from(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n.as_i64().unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}
