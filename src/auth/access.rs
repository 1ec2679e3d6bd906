//! Membership and role checks
//!
//! Every check is a linear scan over the small member arrays stored on the
//! workspace, project or team document.

use crate::models::{Privacy, Project, ProjectRole, Team, Workspace, WorkspaceRole};
use crate::utils::error::{AppError, Result};
use uuid::Uuid;

pub fn workspace_role(workspace: &Workspace, user: Uuid) -> Option<WorkspaceRole> {
    workspace.member(user).map(|m| m.role)
}

/// The caller's role, or 403 when they are not a member at all
pub fn require_workspace_member(workspace: &Workspace, user: Uuid) -> Result<WorkspaceRole> {
    workspace_role(workspace, user)
        .ok_or_else(|| AppError::forbidden("Not authorized to access this workspace"))
}

/// The caller's role when it ranks at least `min`; `denied` is the 403 message otherwise
pub fn require_workspace_role(
    workspace: &Workspace,
    user: Uuid,
    min: WorkspaceRole,
    denied: &str,
) -> Result<WorkspaceRole> {
    let role = require_workspace_member(workspace, user)?;
    if !role.at_least(min) {
        return Err(AppError::forbidden(denied));
    }
    Ok(role)
}

/// The owner always counts as `owner`, listed as a member or not
pub fn project_role(project: &Project, user: Uuid) -> Option<ProjectRole> {
    if project.owner == user {
        return Some(ProjectRole::Owner);
    }
    project.member(user).map(|m| m.role)
}

/// Owner, member, or any public project
pub fn can_view_project(project: &Project, user: Uuid) -> bool {
    project_role(project, user).is_some() || project.privacy == Privacy::Public
}

/// Owner or editor
pub fn can_edit_project(project: &Project, user: Uuid) -> bool {
    project_role(project, user).is_some_and(|r| r.at_least(ProjectRole::Editor))
}

pub fn require_project_view(project: &Project, user: Uuid) -> Result<()> {
    if !can_view_project(project, user) {
        return Err(AppError::forbidden("Not authorized to access this project"));
    }
    Ok(())
}

pub fn require_project_edit(project: &Project, user: Uuid) -> Result<()> {
    if !can_edit_project(project, user) {
        return Err(AppError::forbidden("Not authorized to modify this project"));
    }
    Ok(())
}

pub fn require_project_owner(project: &Project, user: Uuid, denied: &str) -> Result<()> {
    if project_role(project, user) != Some(ProjectRole::Owner) {
        return Err(AppError::forbidden(denied));
    }
    Ok(())
}

pub fn require_team_lead(team: &Team, user: Uuid, denied: &str) -> Result<()> {
    if !team.is_lead(user) {
        return Err(AppError::forbidden(denied));
    }
    Ok(())
}
