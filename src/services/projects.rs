//! Projects, their members, sections and custom fields

use super::{ServiceContext, isolate};
use crate::auth::access;
use crate::models::{
    ActivityAction, ActivityLog, Automation, Comment, CustomField, CustomFieldType, Privacy,
    Project, ProjectMember, ProjectRole, ProjectStatus, ProjectView, Section, Task, Team, User,
    Workspace,
};
use crate::utils::error::{AppError, Result};
use crate::utils::validation::Validator;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectFilter {
    pub workspace: Option<Uuid>,
    pub status: Option<ProjectStatus>,
    pub team: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProject {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub view: Option<ProjectView>,
    pub team: Option<Uuid>,
    pub privacy: Option<Privacy>,
    pub start_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub workspace: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub view: Option<ProjectView>,
    pub status: Option<ProjectStatus>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub start_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub privacy: Option<Privacy>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddProjectMember {
    pub user_id: Uuid,
    #[serde(default)]
    pub role: ProjectRole,
}

#[derive(Debug, Deserialize)]
pub struct CreateSection {
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateSection {
    pub name: Option<String>,
    pub order: Option<u32>,
    pub collapsed: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCustomField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: CustomFieldType,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone)]
pub struct ProjectService {
    ctx: ServiceContext,
}

impl ProjectService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    async fn load(&self, id: Uuid) -> Result<Project> {
        self.ctx.store.require(id, "Project not found").await
    }

    async fn log(&self, entry: ActivityLog) {
        isolate("Activity logging", self.ctx.activity().log(entry).await);
    }

    /// Visible projects, newest first
    ///
    /// Scoped to one workspace (which the caller must belong to) or to every
    /// workspace the caller belongs to.
    pub async fn list(&self, user: &User, filter: ProjectFilter) -> Result<Vec<Project>> {
        let scope: Vec<Uuid> = match filter.workspace {
            Some(id) => {
                let workspace: Workspace = self.ctx.store.require(id, "Workspace not found").await?;
                access::require_workspace_member(&workspace, user.id)?;
                vec![id]
            }
            None => self
                .ctx
                .store
                .find(|w: &Workspace| w.is_member(user.id))
                .await?
                .iter()
                .map(|w| w.id)
                .collect(),
        };

        let mut projects: Vec<Project> = self
            .ctx
            .store
            .find(|p: &Project| {
                scope.contains(&p.workspace)
                    && access::can_view_project(p, user.id)
                    && filter.status.is_none_or(|s| p.status == s)
                    && filter.team.is_none_or(|t| p.team == Some(t))
            })
            .await?;
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(projects)
    }

    pub async fn get(&self, user: &User, id: Uuid) -> Result<Project> {
        let project = self.load(id).await?;
        access::require_project_view(&project, user.id)?;
        Ok(project)
    }

    pub async fn create(&self, user: &User, input: CreateProject) -> Result<Project> {
        let workspace_id = input
            .workspace
            .ok_or_else(|| AppError::not_found("Workspace not found"))?;
        let mut workspace: Workspace = self
            .ctx
            .store
            .require(workspace_id, "Workspace not found")
            .await?;
        if !workspace.is_member(user.id) {
            return Err(AppError::forbidden(
                "Not authorized to create projects in this workspace",
            ));
        }
        Validator::validate_required("Project name", &input.name, 100)?;
        Validator::validate_description(input.description.as_deref(), 1000)?;
        Validator::validate_date_range(input.start_date, input.due_date)?;

        let mut project = Project::new(input.name.trim().to_string(), workspace.id, user.id);
        project.description = input.description.unwrap_or_default();
        if let Some(color) = input.color {
            Validator::validate_hex_color(&color)?;
            project.color = color;
        }
        if let Some(icon) = input.icon {
            project.icon = icon;
        }
        if let Some(view) = input.view {
            project.view = view;
        }
        if let Some(privacy) = input.privacy {
            project.privacy = privacy;
        }
        project.start_date = input.start_date;
        project.due_date = input.due_date;

        let mut team = match input.team {
            Some(team_id) => {
                let team: Team = self.ctx.store.require(team_id, "Team not found").await?;
                if team.workspace != workspace.id {
                    return Err(AppError::bad_request("Team belongs to another workspace"));
                }
                project.team = Some(team.id);
                Some(team)
            }
            None => None,
        };

        self.ctx.store.insert(&project).await?;
        workspace.projects.push(project.id);
        self.ctx.store.save(&mut workspace).await?;
        if let Some(team) = team.as_mut() {
            team.projects.push(project.id);
            self.ctx.store.save(team).await?;
        }

        self.log(
            ActivityLog::new(
                user.id,
                ActivityAction::ProjectCreated,
                format!("Created project \"{}\"", project.name),
            )
            .workspace(workspace.id)
            .project(project.id),
        )
        .await;
        self.ctx
            .events
            .emit_to_workspace(workspace.id, "project-created", &project);

        info!("Project {} created in workspace {}", project.id, workspace.id);
        Ok(project)
    }

    pub async fn update(&self, user: &User, id: Uuid, input: UpdateProject) -> Result<Project> {
        let mut project = self.load(id).await?;
        if !access::can_edit_project(&project, user.id) {
            return Err(AppError::forbidden("Not authorized to update this project"));
        }

        if let Some(name) = input.name {
            Validator::validate_required("Project name", &name, 100)?;
            project.name = name.trim().to_string();
        }
        if let Some(description) = input.description {
            Validator::validate_description(Some(&description), 1000)?;
            project.description = description;
        }
        if let Some(color) = input.color {
            Validator::validate_hex_color(&color)?;
            project.color = color;
        }
        if let Some(icon) = input.icon {
            project.icon = icon;
        }
        if let Some(view) = input.view {
            project.view = view;
        }
        if let Some(status) = input.status {
            project.status = status;
        }
        if let Some(start) = input.start_date {
            project.start_date = start;
        }
        if let Some(due) = input.due_date {
            project.due_date = due;
        }
        if let Some(privacy) = input.privacy {
            project.privacy = privacy;
        }
        Validator::validate_date_range(project.start_date, project.due_date)?;
        self.ctx.store.save(&mut project).await?;

        self.log(
            ActivityLog::new(
                user.id,
                ActivityAction::ProjectUpdated,
                format!("Updated project \"{}\"", project.name),
            )
            .workspace(project.workspace)
            .project(project.id),
        )
        .await;
        self.ctx
            .events
            .emit_to_project(project.id, "project-updated", &project);

        Ok(project)
    }

    /// Owner only; removes the project's tasks and their comments
    pub async fn delete(&self, user: &User, id: Uuid) -> Result<()> {
        let project = self.load(id).await?;
        access::require_project_owner(&project, user.id, "Only owner can delete project")?;

        let store = &self.ctx.store;
        let tasks: Vec<Uuid> = store
            .find(|t: &Task| t.project == id)
            .await?
            .iter()
            .map(|t| t.id)
            .collect();
        store.delete_where(|c: &Comment| tasks.contains(&c.task)).await?;
        store.delete_where(|t: &Task| t.project == id).await?;
        store.delete_where(|a: &Automation| a.project == id).await?;
        store
            .update_where(
                |w: &Workspace| w.id == project.workspace,
                |w: &mut Workspace| {
                    w.projects.retain(|p| *p != id);
                    true
                },
            )
            .await?;
        if let Some(team) = project.team {
            store
                .update_where(
                    |t: &Team| t.id == team,
                    |t: &mut Team| {
                        t.projects.retain(|p| *p != id);
                        true
                    },
                )
                .await?;
        }
        store.delete::<Project>(id).await?;

        self.log(
            ActivityLog::new(
                user.id,
                ActivityAction::ProjectDeleted,
                format!("Deleted project \"{}\"", project.name),
            )
            .workspace(project.workspace),
        )
        .await;
        self.ctx.events.emit_to_workspace(
            project.workspace,
            "project-deleted",
            &json!({ "projectId": id }),
        );

        info!("Project {} deleted with {} tasks", id, tasks.len());
        Ok(())
    }

    pub async fn add_member(&self, user: &User, id: Uuid, input: AddProjectMember) -> Result<Project> {
        let mut project = self.load(id).await?;
        access::require_project_owner(&project, user.id, "Only owner can add members")?;

        let invitee: User = self.ctx.store.require(input.user_id, "User not found").await?;
        if project.member(invitee.id).is_some() {
            return Err(AppError::bad_request("User is already a member"));
        }

        project
            .members
            .push(ProjectMember::new(invitee.id, input.role));
        self.ctx.store.save(&mut project).await?;

        isolate(
            "Project invitation notice",
            self.ctx
                .notifier()
                .notify_project_invitation(&project, user.id, invitee.id)
                .await,
        );
        self.log(
            ActivityLog::new(
                user.id,
                ActivityAction::MemberAdded,
                format!("Added {} to project", invitee.name),
            )
            .workspace(project.workspace)
            .project(project.id)
            .metadata(json!({ "addedUserId": invitee.id, "role": input.role })),
        )
        .await;
        self.ctx.events.emit_to_project(
            project.id,
            "member-added",
            &json!({ "project": project.id, "user": invitee.summary(), "role": input.role }),
        );

        Ok(project)
    }

    pub async fn remove_member(&self, user: &User, id: Uuid, member: Uuid) -> Result<Project> {
        let mut project = self.load(id).await?;
        access::require_project_owner(&project, user.id, "Only owner can remove members")?;
        if project.owner == member {
            return Err(AppError::bad_request("Cannot remove project owner"));
        }

        project.members.retain(|m| m.user != member);
        self.ctx.store.save(&mut project).await?;
        self.ctx.events.emit_to_project(
            project.id,
            "member-removed",
            &json!({ "project": project.id, "userId": member }),
        );
        Ok(project)
    }

    pub async fn add_section(&self, user: &User, id: Uuid, input: CreateSection) -> Result<Project> {
        let mut project = self.load(id).await?;
        if !access::can_edit_project(&project, user.id) {
            return Err(AppError::forbidden("Not authorized to add sections"));
        }
        Validator::validate_required("Section name", &input.name, 100)?;

        let order = project.sections.len() as u32;
        let section = Section::new(input.name.trim().to_string(), order);
        project.sections.push(section.clone());
        self.ctx.store.save(&mut project).await?;

        self.log(
            ActivityLog::new(
                user.id,
                ActivityAction::SectionAdded,
                format!("Added section \"{}\"", section.name),
            )
            .workspace(project.workspace)
            .project(project.id),
        )
        .await;
        self.ctx.events.emit_to_project(
            project.id,
            "section-created",
            &json!({ "projectId": project.id, "section": section }),
        );

        Ok(project)
    }

    pub async fn update_section(
        &self,
        user: &User,
        id: Uuid,
        section_id: Uuid,
        input: UpdateSection,
    ) -> Result<Project> {
        let mut project = self.load(id).await?;
        access::require_project_edit(&project, user.id)?;

        let section = project
            .section_mut(section_id)
            .ok_or_else(|| AppError::not_found("Section not found"))?;
        if let Some(name) = input.name {
            Validator::validate_required("Section name", &name, 100)?;
            section.name = name.trim().to_string();
        }
        if let Some(order) = input.order {
            section.order = order;
        }
        if let Some(collapsed) = input.collapsed {
            section.collapsed = collapsed;
        }
        let section = section.clone();
        self.ctx.store.save(&mut project).await?;

        self.ctx.events.emit_to_project(
            project.id,
            "section-updated",
            &json!({ "projectId": project.id, "section": section }),
        );
        Ok(project)
    }

    /// Tasks of a removed section become unsectioned
    pub async fn delete_section(&self, user: &User, id: Uuid, section_id: Uuid) -> Result<Project> {
        let mut project = self.load(id).await?;
        access::require_project_edit(&project, user.id)?;

        let section = project
            .section(section_id)
            .cloned()
            .ok_or_else(|| AppError::not_found("Section not found"))?;
        project.sections.retain(|s| s.id != section_id);
        self.ctx.store.save(&mut project).await?;

        self.ctx
            .store
            .update_where(
                |t: &Task| t.project == id && t.section == Some(section_id),
                |t: &mut Task| {
                    t.section = None;
                    true
                },
            )
            .await?;

        self.log(
            ActivityLog::new(
                user.id,
                ActivityAction::SectionDeleted,
                format!("Deleted section \"{}\"", section.name),
            )
            .workspace(project.workspace)
            .project(project.id),
        )
        .await;
        self.ctx.events.emit_to_project(
            project.id,
            "section-deleted",
            &json!({ "projectId": project.id, "sectionId": section_id }),
        );
        Ok(project)
    }

    pub async fn add_custom_field(
        &self,
        user: &User,
        id: Uuid,
        input: CreateCustomField,
    ) -> Result<Project> {
        let mut project = self.load(id).await?;
        access::require_project_edit(&project, user.id)?;
        Validator::validate_required("Field name", &input.name, 100)?;
        if input.field_type == CustomFieldType::Dropdown && input.options.is_empty() {
            return Err(AppError::validation("Dropdown fields need at least one option"));
        }

        project.custom_fields.push(CustomField {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            field_type: input.field_type,
            options: input.options,
            required: input.required,
        });
        self.ctx.store.save(&mut project).await?;
        Ok(project)
    }
}
