//! Tasks and everything nested in them
//!
//! Reading a task needs visibility of its project. Changing one needs any
//! project role (or ownership). Every mutation logs activity and emits an
//! event to the project's room; notification and automation side effects are
//! isolated so they never fail the request.

use super::{ServiceContext, isolate};
use crate::auth::access;
use crate::models::{
    ActivityAction, ActivityLog, Attachment, Comment, DependencyType, Priority, Project, Subtask,
    Task, TaskStatus, TriggerType, User,
};
use crate::utils::error::{AppError, Result};
use crate::utils::validation::Validator;
use chrono::{DateTime, Days, Duration, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use tracing::info;
use uuid::Uuid;

const SEARCH_LIMIT: usize = 50;
const RECENT_DAYS: i64 = 3;
const RECENT_LIMIT: usize = 10;

#[derive(Debug, Clone)]
pub struct TaskFilter {
    pub project: Uuid,
    pub status: Option<TaskStatus>,
    pub assignee: Option<Uuid>,
    pub priority: Option<Priority>,
    pub section: Option<Uuid>,
    pub tags: Vec<String>,
}

impl TaskFilter {
    pub fn project(project: Uuid) -> Self {
        Self {
            project,
            status: None,
            assignee: None,
            priority: None,
            section: None,
            tags: Vec::new(),
        }
    }

    fn matches(&self, task: &Task) -> bool {
        task.project == self.project
            && self.status.is_none_or(|s| task.status == s)
            && self.assignee.is_none_or(|a| task.assignee == Some(a))
            && self.priority.is_none_or(|p| task.priority == p)
            && self.section.is_none_or(|s| task.section == Some(s))
            && (self.tags.is_empty() || task.tags.iter().any(|t| self.tags.contains(t)))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchFilter {
    pub q: Option<String>,
    pub workspace: Option<Uuid>,
    pub project: Option<Uuid>,
    pub assignee: Option<Uuid>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
}

/// The caller's assigned tasks bucketed by urgency
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MyTasks {
    pub recently_assigned: Vec<Task>,
    pub do_today: Vec<Task>,
    pub do_next_week: Vec<Task>,
    pub do_later: Vec<Task>,
    pub completed: Vec<Task>,
}

impl MyTasks {
    /// Bucket `tasks` against local calendar days as seen at `now`
    ///
    /// Buckets overlap: a fresh task due today is in both `recently_assigned`
    /// and `do_today`.
    pub fn group(tasks: Vec<Task>, now: DateTime<Local>) -> Self {
        let (today, tomorrow, next_week) = day_bounds(&now);
        let recent_cutoff = now.with_timezone(&Utc) - Duration::days(RECENT_DAYS);

        let mut grouped = MyTasks::default();
        for task in tasks {
            if task.created_at >= recent_cutoff && grouped.recently_assigned.len() < RECENT_LIMIT {
                grouped.recently_assigned.push(task.clone());
            }
            if task.is_completed() {
                grouped.completed.push(task);
                continue;
            }
            match task.due_date {
                Some(due) if due < tomorrow => grouped.do_today.push(task),
                Some(due) if due < next_week => grouped.do_next_week.push(task),
                _ => grouped.do_later.push(task),
            }
        }
        grouped
    }
}

/// Local midnight of today, tomorrow and a week from today
///
/// Each boundary is its own calendar day's midnight, so a day that gains or
/// loses an hour to a clock change still ends at midnight.
fn day_bounds<Tz: TimeZone>(now: &DateTime<Tz>) -> (DateTime<Utc>, DateTime<Utc>, DateTime<Utc>) {
    let tz = now.timezone();
    let today = now.date_naive();
    let fallback = now.with_timezone(&Utc);
    let at = |date: Option<NaiveDate>, days: i64| {
        date.and_then(|d| local_midnight(&tz, d))
            .unwrap_or_else(|| fallback + Duration::days(days))
    };
    (
        at(Some(today), 0),
        at(today.succ_opt(), 1),
        at(today.checked_add_days(Days::new(7)), 7),
    )
}

/// First instant of `date` in `tz`; when a clock change skips midnight, the
/// first hour after it
fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Option<DateTime<Utc>> {
    let midnight = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(midnight + Duration::hours(1))).earliest())
        .map(|d| d.with_timezone(&Utc))
}

#[derive(Debug, Deserialize)]
pub struct SubtaskInput {
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTask {
    pub title: String,
    pub description: Option<String>,
    pub project: Option<Uuid>,
    pub section: Option<Uuid>,
    pub assignee: Option<Uuid>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub subtasks: Vec<SubtaskInput>,
    #[serde(default)]
    pub custom_fields: BTreeMap<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub section: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub assignee: Option<Option<Uuid>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub start_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub custom_fields: Option<BTreeMap<String, Value>>,
    pub order: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateSubtask {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddDependency {
    pub task_id: Uuid,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Deserialize)]
pub struct NewAttachment {
    pub name: String,
    pub url: String,
    pub size: Option<u64>,
    #[serde(rename = "type")]
    pub mime_type: Option<String>,
}

/// Old and new values of every field an update touched
#[derive(Debug, Default)]
struct ChangeSet(Map<String, Value>);

impl ChangeSet {
    fn record<T: Serialize + PartialEq>(&mut self, field: &str, old: &T, new: &T) {
        if old != new {
            self.0.insert(
                field.to_string(),
                json!({ "old": json!(old), "new": json!(new) }),
            );
        }
    }

    fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

#[derive(Debug, Clone)]
pub struct TaskService {
    ctx: ServiceContext,
}

impl TaskService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    async fn project(&self, id: Uuid) -> Result<Project> {
        self.ctx.store.require(id, "Project not found").await
    }

    async fn load(&self, id: Uuid) -> Result<Task> {
        self.ctx.store.require(id, "Task not found").await
    }

    /// Task and project, after checking the caller can see the project
    async fn viewable(&self, user: &User, id: Uuid) -> Result<(Task, Project)> {
        let task = self.load(id).await?;
        let project = self.project(task.project).await?;
        access::require_project_view(&project, user.id)?;
        Ok((task, project))
    }

    /// Task and project, after checking the caller holds a project role
    async fn changeable(&self, user: &User, id: Uuid) -> Result<(Task, Project)> {
        let task = self.load(id).await?;
        let project = self.project(task.project).await?;
        require_change(&project, user.id)?;
        Ok((task, project))
    }

    async fn log(&self, entry: ActivityLog) {
        isolate("Activity logging", self.ctx.activity().log(entry).await);
    }

    fn task_entry(user: &User, project: &Project, task: &Task, action: ActivityAction, description: String) -> ActivityLog {
        ActivityLog::new(user.id, action, description)
            .workspace(project.workspace)
            .project(project.id)
            .task(task.id)
    }

    async fn adjust_counts(&self, project: Uuid, total: i32, completed: i32) -> Result<()> {
        self.ctx
            .store
            .update_where(
                |p: &Project| p.id == project,
                |p: &mut Project| {
                    p.task_count = p.task_count.saturating_add_signed(total);
                    p.completed_task_count = p.completed_task_count.saturating_add_signed(completed);
                    true
                },
            )
            .await?;
        Ok(())
    }

    /// Project tasks, by `order` then newest first
    pub async fn list(&self, user: &User, filter: TaskFilter) -> Result<Vec<Task>> {
        let project = self.project(filter.project).await?;
        access::require_project_view(&project, user.id)?;

        let mut tasks = self.ctx.store.find(|t: &Task| filter.matches(t)).await?;
        tasks.sort_by(|a, b| {
            a.order
                .cmp(&b.order)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(tasks)
    }

    pub async fn my_tasks(
        &self,
        user: &User,
        status: Option<TaskStatus>,
        workspace: Option<Uuid>,
    ) -> Result<MyTasks> {
        let mut tasks = self
            .ctx
            .store
            .find(|t: &Task| t.assignee == Some(user.id) && status.is_none_or(|s| t.status == s))
            .await?;

        if let Some(workspace) = workspace {
            let projects: Vec<Uuid> = self
                .ctx
                .store
                .find(|p: &Project| p.workspace == workspace)
                .await?
                .iter()
                .map(|p| p.id)
                .collect();
            tasks.retain(|t| projects.contains(&t.project));
        }

        // due date ascending with undated last, then newest first
        tasks.sort_by(|a, b| match (a.due_date, b.due_date) {
            (Some(x), Some(y)) => x.cmp(&y).then_with(|| b.created_at.cmp(&a.created_at)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => b.created_at.cmp(&a.created_at),
        });

        Ok(MyTasks::group(tasks, Local::now()))
    }

    /// Text search over tasks in projects the caller can see
    ///
    /// The workspace filter applies after the result limit.
    pub async fn search(&self, user: &User, filter: SearchFilter) -> Result<Vec<Task>> {
        let needle = filter
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);

        let visible: Vec<Project> = self
            .ctx
            .store
            .find(|p: &Project| access::can_view_project(p, user.id))
            .await?;
        let visible_ids: Vec<Uuid> = visible.iter().map(|p| p.id).collect();

        let mut tasks = self
            .ctx
            .store
            .find(|t: &Task| {
                visible_ids.contains(&t.project)
                    && filter.project.is_none_or(|p| t.project == p)
                    && filter.assignee.is_none_or(|a| t.assignee == Some(a))
                    && filter.status.is_none_or(|s| t.status == s)
                    && filter.priority.is_none_or(|p| t.priority == p)
                    && needle.as_ref().is_none_or(|q| {
                        t.title.to_lowercase().contains(q)
                            || t.description.to_lowercase().contains(q)
                            || t.tags.iter().any(|tag| tag.to_lowercase().contains(q))
                    })
            })
            .await?;
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        tasks.truncate(SEARCH_LIMIT);

        if let Some(workspace) = filter.workspace {
            tasks.retain(|t| {
                visible
                    .iter()
                    .any(|p| p.id == t.project && p.workspace == workspace)
            });
        }
        Ok(tasks)
    }

    pub async fn get(&self, user: &User, id: Uuid) -> Result<Task> {
        self.viewable(user, id).await.map(|(task, _)| task)
    }

    pub async fn create(&self, user: &User, input: CreateTask) -> Result<Task> {
        let project_id = input
            .project
            .ok_or_else(|| AppError::not_found("Project not found"))?;
        let project = self.project(project_id).await?;
        require_change(&project, user.id)?;

        Validator::validate_required("Title", &input.title, 200)?;
        Validator::validate_description(input.description.as_deref(), 5000)?;
        Validator::validate_date_range(input.start_date, input.due_date)?;
        if let Some(section) = input.section {
            if project.section(section).is_none() {
                return Err(AppError::not_found("Section not found"));
            }
        }

        let mut task = Task::new(input.title.trim().to_string(), project.id, user.id);
        task.description = input.description.unwrap_or_default();
        task.section = input.section;
        task.priority = input.priority.unwrap_or_default();
        for tag in &input.tags {
            task.add_tag(tag);
        }
        task.start_date = input.start_date;
        task.due_date = input.due_date;
        task.custom_fields = input.custom_fields;
        task.order = i64::from(project.task_count);
        task.subtasks = input
            .subtasks
            .into_iter()
            .enumerate()
            .map(|(order, s)| {
                let mut subtask = Subtask::new(s.title, order as u32);
                if s.completed {
                    subtask.set_completed(true, user.id);
                }
                subtask
            })
            .collect();
        if let Some(assignee) = input.assignee {
            task.assignee = Some(assignee);
            task.assigned_by = Some(user.id);
        }
        task.set_status(input.status.unwrap_or_default());

        self.ctx.store.insert(&task).await?;
        self.adjust_counts(project.id, 1, i32::from(task.is_completed()))
            .await?;

        if let Some(assignee) = task.assignee {
            isolate(
                "Assignment notice",
                self.ctx
                    .notifier()
                    .notify_task_assignment(&task, user.id, assignee)
                    .await,
            );
        }
        self.log(Self::task_entry(
            user,
            &project,
            &task,
            ActivityAction::TaskCreated,
            format!("Created task \"{}\"", task.title),
        ))
        .await;
        self.ctx
            .automations()
            .execute(TriggerType::TaskCreated, &mut task)
            .await;
        self.ctx
            .events
            .emit_to_project(project.id, "task-created", &task);

        info!("Task {} created in project {}", task.id, project.id);
        Ok(task)
    }

    pub async fn update(&self, user: &User, id: Uuid, input: UpdateTask) -> Result<Task> {
        let (mut task, project) = self.changeable(user, id).await?;
        let before = task.clone();
        let mut changes = ChangeSet::default();

        if let Some(title) = input.title {
            Validator::validate_required("Title", &title, 200)?;
            task.title = title.trim().to_string();
            changes.record("title", &before.title, &task.title);
        }
        if let Some(description) = input.description {
            Validator::validate_description(Some(&description), 5000)?;
            task.description = description;
            changes.record("description", &before.description, &task.description);
        }
        if let Some(section) = input.section {
            if let Some(id) = section {
                if project.section(id).is_none() {
                    return Err(AppError::not_found("Section not found"));
                }
            }
            task.section = section;
            changes.record("section", &before.section, &task.section);
        }
        if let Some(priority) = input.priority {
            task.priority = priority;
            changes.record("priority", &before.priority, &task.priority);
        }
        if let Some(tags) = input.tags {
            task.tags.clear();
            for tag in &tags {
                task.add_tag(tag);
            }
            changes.record("tags", &before.tags, &task.tags);
        }
        if let Some(start) = input.start_date {
            task.start_date = start;
            changes.record("startDate", &before.start_date, &task.start_date);
        }
        if let Some(due) = input.due_date {
            task.due_date = due;
            changes.record("dueDate", &before.due_date, &task.due_date);
        }
        Validator::validate_date_range(task.start_date, task.due_date)?;
        if let Some(fields) = input.custom_fields {
            task.custom_fields = fields;
            changes.record("customFields", &before.custom_fields, &task.custom_fields);
        }
        if let Some(order) = input.order {
            task.order = order;
            changes.record("order", &before.order, &task.order);
        }

        let new_assignee = match input.assignee {
            Some(assignee) if assignee != before.assignee => {
                task.assignee = assignee;
                changes.record("assignee", &before.assignee, &task.assignee);
                if let Some(assignee) = assignee {
                    task.assigned_by = Some(user.id);
                    task.add_follower(assignee);
                }
                assignee
            }
            _ => None,
        };

        let status_changed = match input.status {
            Some(status) if status != before.status => {
                task.set_status(status);
                changes.record("status", &before.status, &task.status);
                true
            }
            _ => false,
        };
        let newly_completed = status_changed && task.is_completed();
        let section_changed = task.section != before.section;
        let tag_added = task.tags.iter().any(|t| !before.tags.contains(t));

        self.ctx.store.save(&mut task).await?;

        if status_changed {
            let delta = i32::from(task.is_completed()) - i32::from(before.is_completed());
            if delta != 0 {
                self.adjust_counts(project.id, 0, delta).await?;
            }
        }

        let notifier = self.ctx.notifier();
        let automations = self.ctx.automations();
        if let Some(assignee) = new_assignee {
            isolate(
                "Assignment notice",
                notifier.notify_task_assignment(&task, user.id, assignee).await,
            );
            automations.execute(TriggerType::AssigneeChanged, &mut task).await;
        }
        if newly_completed {
            let followers = task.followers.clone();
            isolate(
                "Completion notice",
                notifier
                    .notify_task_completion(&task, user.id, &followers)
                    .await,
            );
            automations.execute(TriggerType::TaskCompleted, &mut task).await;
        }
        if status_changed {
            automations.execute(TriggerType::StatusChanged, &mut task).await;
        }
        if section_changed {
            automations.execute(TriggerType::TaskMoved, &mut task).await;
        }
        if tag_added {
            automations.execute(TriggerType::TagAdded, &mut task).await;
        }

        let description = format!("Updated task \"{}\"", task.title);
        self.log(
            Self::task_entry(user, &project, &task, ActivityAction::TaskUpdated, description)
                .changes(changes.into_value()),
        )
        .await;
        self.ctx
            .events
            .emit_to_project(project.id, "task-updated", &task);

        Ok(task)
    }

    /// Removes the task's comments and every dependency reference to it
    pub async fn delete(&self, user: &User, id: Uuid) -> Result<()> {
        let (task, project) = self.changeable(user, id).await?;
        let store = &self.ctx.store;

        store.delete_where(|c: &Comment| c.task == id).await?;
        store
            .update_where(
                |t: &Task| t.id != id,
                |t: &mut Task| t.forget_dependency(id),
            )
            .await?;
        store.delete::<Task>(id).await?;
        self.adjust_counts(project.id, -1, -i32::from(task.is_completed()))
            .await?;

        self.log(
            ActivityLog::new(
                user.id,
                ActivityAction::TaskDeleted,
                format!("Deleted task \"{}\"", task.title),
            )
            .workspace(project.workspace)
            .project(project.id),
        )
        .await;
        self.ctx
            .events
            .emit_to_project(project.id, "task-deleted", &json!({ "taskId": id }));
        Ok(())
    }

    pub async fn add_subtask(&self, user: &User, id: Uuid, title: String) -> Result<Task> {
        let (mut task, project) = self.changeable(user, id).await?;
        Validator::validate_required("Subtask title", &title, 200)?;

        let subtask = Subtask::new(title.trim().to_string(), task.subtasks.len() as u32);
        task.subtasks.push(subtask.clone());
        self.ctx.store.save(&mut task).await?;

        self.log(Self::task_entry(
            user,
            &project,
            &task,
            ActivityAction::SubtaskAdded,
            format!("Added subtask \"{}\"", subtask.title),
        ))
        .await;
        self.ctx.events.emit_to_project(
            project.id,
            "subtask-added",
            &json!({ "taskId": task.id, "subtask": subtask }),
        );
        Ok(task)
    }

    pub async fn update_subtask(
        &self,
        user: &User,
        id: Uuid,
        subtask_id: Uuid,
        input: UpdateSubtask,
    ) -> Result<Task> {
        let (mut task, project) = self.changeable(user, id).await?;

        let subtask = task
            .subtask_mut(subtask_id)
            .ok_or_else(|| AppError::not_found("Subtask not found"))?;
        if let Some(title) = input.title {
            Validator::validate_required("Subtask title", &title, 200)?;
            subtask.title = title.trim().to_string();
        }
        let completed_now = match input.completed {
            Some(completed) if completed != subtask.completed => {
                subtask.set_completed(completed, user.id);
                completed
            }
            _ => false,
        };
        let subtask = subtask.clone();
        self.ctx.store.save(&mut task).await?;

        if completed_now {
            self.log(Self::task_entry(
                user,
                &project,
                &task,
                ActivityAction::SubtaskCompleted,
                format!("Completed subtask \"{}\"", subtask.title),
            ))
            .await;
        }
        self.ctx.events.emit_to_project(
            project.id,
            "subtask-updated",
            &json!({ "taskId": task.id, "subtask": subtask }),
        );
        Ok(task)
    }

    pub async fn delete_subtask(&self, user: &User, id: Uuid, subtask_id: Uuid) -> Result<Task> {
        let (mut task, project) = self.changeable(user, id).await?;
        if !task.subtasks.iter().any(|s| s.id == subtask_id) {
            return Err(AppError::not_found("Subtask not found"));
        }
        task.subtasks.retain(|s| s.id != subtask_id);
        self.ctx.store.save(&mut task).await?;

        self.ctx.events.emit_to_project(
            project.id,
            "subtask-deleted",
            &json!({ "taskId": task.id, "subtaskId": subtask_id }),
        );
        Ok(task)
    }

    /// Idempotent
    pub async fn add_follower(&self, user: &User, id: Uuid, follower: Uuid) -> Result<Task> {
        let (mut task, _) = self.changeable(user, id).await?;
        self.ctx
            .store
            .require::<User>(follower, "User not found")
            .await?;
        if task.add_follower(follower) {
            self.ctx.store.save(&mut task).await?;
        }
        Ok(task)
    }

    pub async fn remove_follower(&self, user: &User, id: Uuid, follower: Uuid) -> Result<Task> {
        let (mut task, _) = self.changeable(user, id).await?;
        task.followers.retain(|f| *f != follower);
        self.ctx.store.save(&mut task).await?;
        Ok(task)
    }

    /// Record the link on both tasks; cycles are not checked
    pub async fn add_dependency(&self, user: &User, id: Uuid, input: AddDependency) -> Result<Task> {
        let kind: DependencyType = serde_json::from_value(Value::String(input.kind))
            .map_err(|_| AppError::bad_request("Invalid dependency type"))?;
        if input.task_id == id {
            return Err(AppError::bad_request("A task cannot depend on itself"));
        }

        let (mut task, _) = self.changeable(user, id).await?;
        let mut other: Task = self
            .ctx
            .store
            .require(input.task_id, "Dependent task not found")
            .await?;

        let (mine, theirs) = match kind {
            DependencyType::BlockedBy => (
                &mut task.dependencies.blocked_by,
                &mut other.dependencies.blocking,
            ),
            DependencyType::Blocking => (
                &mut task.dependencies.blocking,
                &mut other.dependencies.blocked_by,
            ),
        };
        if !mine.contains(&other.id) {
            mine.push(other.id);
        }
        if !theirs.contains(&task.id) {
            theirs.push(task.id);
        }

        self.ctx.store.save(&mut task).await?;
        self.ctx.store.save(&mut other).await?;
        Ok(task)
    }

    pub async fn remove_dependency(&self, user: &User, id: Uuid, dependency: Uuid) -> Result<Task> {
        let (mut task, _) = self.changeable(user, id).await?;
        task.forget_dependency(dependency);
        self.ctx.store.save(&mut task).await?;

        if let Some(mut other) = self.ctx.store.get::<Task>(dependency).await? {
            if other.forget_dependency(id) {
                self.ctx.store.save(&mut other).await?;
            }
        }
        Ok(task)
    }

    pub async fn add_attachment(&self, user: &User, id: Uuid, input: NewAttachment) -> Result<Task> {
        let (mut task, project) = self.changeable(user, id).await?;
        Validator::validate_required("Attachment name", &input.name, 255)?;
        Validator::validate_required("Attachment url", &input.url, 2048)?;

        let attachment = Attachment {
            id: Uuid::new_v4(),
            name: input.name,
            url: input.url,
            size: input.size,
            mime_type: input.mime_type,
            uploaded_by: Some(user.id),
            uploaded_at: Utc::now(),
        };
        task.attachments.push(attachment.clone());
        self.ctx.store.save(&mut task).await?;

        self.log(
            Self::task_entry(
                user,
                &project,
                &task,
                ActivityAction::FileUploaded,
                format!("Attached \"{}\"", attachment.name),
            )
            .metadata(json!({ "attachmentId": attachment.id, "url": attachment.url })),
        )
        .await;
        self.ctx.events.emit_to_project(
            project.id,
            "attachment-added",
            &json!({ "taskId": task.id, "attachment": attachment }),
        );
        Ok(task)
    }

    pub async fn delete_attachment(&self, user: &User, id: Uuid, attachment_id: Uuid) -> Result<Task> {
        let (mut task, project) = self.changeable(user, id).await?;
        let attachment = task
            .attachments
            .iter()
            .find(|a| a.id == attachment_id)
            .cloned()
            .ok_or_else(|| AppError::not_found("Attachment not found"))?;
        task.attachments.retain(|a| a.id != attachment_id);
        self.ctx.store.save(&mut task).await?;

        self.log(Self::task_entry(
            user,
            &project,
            &task,
            ActivityAction::FileDeleted,
            format!("Removed \"{}\"", attachment.name),
        ))
        .await;
        Ok(task)
    }
}

/// Any project role, or ownership
pub(crate) fn require_change(project: &Project, user: Uuid) -> Result<()> {
    if access::project_role(project, user).is_none() {
        return Err(AppError::forbidden("Not authorized to modify this task"));
    }
    Ok(())
}
