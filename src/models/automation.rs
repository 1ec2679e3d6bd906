//! Project automation rules

use super::task::{Priority, Task, TaskStatus};
use crate::storage::Document;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Automation {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub project: Uuid,
    pub workspace: Uuid,
    pub creator: Uuid,
    #[serde(default = "crate::config::models::default_true")]
    pub active: bool,
    pub trigger: Trigger,
    #[serde(default)]
    pub actions: Vec<AutomationAction>,
    #[serde(default)]
    pub execution_count: u64,
    #[serde(default)]
    pub last_executed: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Automation {
    const COLLECTION: &'static str = "automations";

    fn id(&self) -> Uuid {
        self.id
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Automation {
    /// Active, listening for `trigger`, and every condition holds for `task`
    pub fn applies_to(&self, trigger: TriggerType, task: &Task) -> bool {
        self.active && self.trigger.trigger_type == trigger && self.trigger.conditions.matches(task)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trigger {
    #[serde(rename = "type")]
    pub trigger_type: TriggerType,
    #[serde(default)]
    pub conditions: TriggerConditions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    TaskCreated,
    TaskCompleted,
    TaskMoved,
    StatusChanged,
    AssigneeChanged,
    DueDateApproaching,
    TagAdded,
}

/// Filters narrowing a trigger; unset fields match anything
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriggerConditions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<Uuid>,
}

impl TriggerConditions {
    pub fn matches(&self, task: &Task) -> bool {
        if self.section.is_some_and(|s| task.section != Some(s)) {
            return false;
        }
        if self.status.is_some_and(|s| task.status != s) {
            return false;
        }
        if self.priority.is_some_and(|p| task.priority != p) {
            return false;
        }
        if let Some(tag) = &self.tag {
            if !task.tags.iter().any(|t| t == tag) {
                return false;
            }
        }
        if self.assignee.is_some_and(|a| task.assignee != Some(a)) {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomationAction {
    #[serde(rename = "type")]
    pub action_type: ActionType,
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    AssignTask,
    MoveToSection,
    SetStatus,
    SetPriority,
    AddTag,
    SendNotification,
    AddComment,
    SetDueDate,
    MarkComplete,
    #[serde(other)]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn automation(conditions: TriggerConditions) -> Automation {
        let now = Utc::now();
        Automation {
            id: Uuid::new_v4(),
            name: "rule".into(),
            description: String::new(),
            project: Uuid::new_v4(),
            workspace: Uuid::new_v4(),
            creator: Uuid::new_v4(),
            active: true,
            trigger: Trigger {
                trigger_type: TriggerType::TaskCreated,
                conditions,
            },
            actions: vec![],
            execution_count: 0,
            last_executed: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_empty_conditions_match() {
        let rule = automation(TriggerConditions::default());
        let task = Task::new("t".into(), rule.project, Uuid::new_v4());
        assert!(rule.applies_to(TriggerType::TaskCreated, &task));
        assert!(!rule.applies_to(TriggerType::TaskCompleted, &task));
    }

    #[test]
    fn test_conditions_are_conjunctive() {
        let rule = automation(TriggerConditions {
            priority: Some(Priority::High),
            tag: Some("bug".into()),
            ..Default::default()
        });
        let mut task = Task::new("t".into(), rule.project, Uuid::new_v4());
        task.priority = Priority::High;
        assert!(!rule.applies_to(TriggerType::TaskCreated, &task));

        task.tags.push("bug".into());
        assert!(rule.applies_to(TriggerType::TaskCreated, &task));
    }

    #[test]
    fn test_inactive_never_applies() {
        let mut rule = automation(TriggerConditions::default());
        rule.active = false;
        let task = Task::new("t".into(), rule.project, Uuid::new_v4());
        assert!(!rule.applies_to(TriggerType::TaskCreated, &task));
    }

    #[test]
    fn test_unknown_action_type_parses() {
        let action: AutomationAction =
            serde_json::from_value(serde_json::json!({"type": "launch_rocket"})).unwrap();
        assert_eq!(action.action_type, ActionType::Unknown);
    }
}
