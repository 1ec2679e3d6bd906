//! Workspaces and their membership

use super::{ServiceContext, isolate};
use crate::auth::access;
use crate::models::{
    ActivityAction, ActivityLog, Automation, Comment, PendingInvitation, Project, Task, Team,
    User, Workspace, WorkspaceMember, WorkspaceRole, WorkspaceSettingsUpdate,
};
use crate::utils::error::{AppError, Result};
use crate::utils::validation::Validator;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateWorkspace {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub settings: Option<WorkspaceSettingsUpdate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateWorkspace {
    pub name: Option<String>,
    pub description: Option<String>,
    pub settings: Option<WorkspaceSettingsUpdate>,
}

#[derive(Debug, Deserialize)]
pub struct AddMember {
    pub email: String,
    #[serde(default)]
    pub role: WorkspaceRole,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMemberRole {
    pub role: WorkspaceRole,
}

#[derive(Debug, Deserialize)]
pub struct BulkInvite {
    #[serde(default)]
    pub emails: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    AlreadyMember,
    Added,
    Invited,
}

/// Per-email outcome of a bulk invite
#[derive(Debug, Clone, Serialize)]
pub struct InvitationResult {
    pub email: String,
    pub status: InvitationStatus,
    pub message: &'static str,
}

#[derive(Debug, Clone)]
pub struct WorkspaceService {
    ctx: ServiceContext,
}

impl WorkspaceService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    async fn load(&self, id: Uuid) -> Result<Workspace> {
        self.ctx.store.require(id, "Workspace not found").await
    }

    async fn log(&self, entry: ActivityLog) {
        isolate("Activity logging", self.ctx.activity().log(entry).await);
    }

    pub async fn list_for(&self, user: &User) -> Result<Vec<Workspace>> {
        let mut workspaces: Vec<Workspace> = self
            .ctx
            .store
            .find(|w: &Workspace| w.is_member(user.id))
            .await?;
        workspaces.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(workspaces)
    }

    /// A workspace the caller belongs to
    pub async fn get(&self, user: &User, id: Uuid) -> Result<Workspace> {
        let workspace = self.load(id).await?;
        access::require_workspace_member(&workspace, user.id)?;
        Ok(workspace)
    }

    pub async fn create(&self, user: &User, input: CreateWorkspace) -> Result<Workspace> {
        Validator::validate_required("Workspace name", &input.name, 100)?;
        Validator::validate_description(input.description.as_deref(), 500)?;

        let mut workspace = Workspace::new(
            input.name.trim().to_string(),
            input.description.unwrap_or_default(),
            user.id,
        );
        if let Some(settings) = input.settings {
            workspace.settings.merge(settings);
        }
        self.ctx.store.insert(&workspace).await?;

        let mut owner = user.clone();
        owner.workspaces.push(workspace.id);
        self.ctx.store.save(&mut owner).await?;

        self.log(
            ActivityLog::new(
                user.id,
                ActivityAction::WorkspaceCreated,
                format!("Created workspace \"{}\"", workspace.name),
            )
            .workspace(workspace.id),
        )
        .await;

        info!("Workspace {} created by {}", workspace.id, user.id);
        Ok(workspace)
    }

    pub async fn update(&self, user: &User, id: Uuid, input: UpdateWorkspace) -> Result<Workspace> {
        let mut workspace = self.load(id).await?;
        access::require_workspace_role(
            &workspace,
            user.id,
            WorkspaceRole::Admin,
            "Not authorized to update this workspace",
        )?;

        if let Some(name) = input.name.filter(|n| !n.trim().is_empty()) {
            Validator::validate_required("Workspace name", &name, 100)?;
            workspace.name = name.trim().to_string();
        }
        if let Some(description) = input.description {
            Validator::validate_description(Some(&description), 500)?;
            workspace.description = description;
        }
        if let Some(settings) = input.settings {
            workspace.settings.merge(settings);
        }
        self.ctx.store.save(&mut workspace).await?;

        self.log(
            ActivityLog::new(
                user.id,
                ActivityAction::WorkspaceUpdated,
                format!("Updated workspace \"{}\"", workspace.name),
            )
            .workspace(workspace.id),
        )
        .await;
        self.ctx
            .events
            .emit_to_workspace(workspace.id, "workspace-updated", &workspace);

        Ok(workspace)
    }

    /// Owner only; removes the workspace's projects, their tasks, and its teams
    pub async fn delete(&self, user: &User, id: Uuid) -> Result<()> {
        let workspace = self.load(id).await?;
        if workspace.owner != user.id {
            return Err(AppError::forbidden("Not authorized to delete this workspace"));
        }

        let store = &self.ctx.store;
        let projects: Vec<Uuid> = store
            .find(|p: &Project| p.workspace == id)
            .await?
            .iter()
            .map(|p| p.id)
            .collect();
        let tasks: Vec<Uuid> = store
            .find(|t: &Task| projects.contains(&t.project))
            .await?
            .iter()
            .map(|t| t.id)
            .collect();

        store.delete_where(|c: &Comment| tasks.contains(&c.task)).await?;
        store.delete_where(|t: &Task| projects.contains(&t.project)).await?;
        store.delete_where(|a: &Automation| a.workspace == id).await?;
        store.delete_where(|p: &Project| p.workspace == id).await?;
        let teams: Vec<Uuid> = workspace.teams.clone();
        store.delete_where(|t: &Team| t.workspace == id).await?;
        store
            .update_where(
                |u: &User| u.workspaces.contains(&id),
                |u: &mut User| {
                    u.workspaces.retain(|w| *w != id);
                    u.teams.retain(|t| !teams.contains(t));
                    true
                },
            )
            .await?;
        store.delete::<Workspace>(id).await?;

        info!(
            "Workspace {} deleted with {} projects and {} tasks",
            id,
            projects.len(),
            tasks.len()
        );
        Ok(())
    }

    /// Add an existing user by email
    pub async fn add_member(&self, user: &User, id: Uuid, input: AddMember) -> Result<Workspace> {
        let mut workspace = self.load(id).await?;
        access::require_workspace_role(
            &workspace,
            user.id,
            WorkspaceRole::Admin,
            "Not authorized to invite members",
        )?;
        if input.role == WorkspaceRole::Owner {
            return Err(AppError::bad_request("Cannot assign owner role"));
        }

        let email = Validator::normalize_email(&input.email);
        let mut invitee: User = self
            .ctx
            .store
            .find_one(|u: &User| u.email == email)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;
        if workspace.is_member(invitee.id) {
            return Err(AppError::bad_request("User is already a member"));
        }

        workspace
            .members
            .push(WorkspaceMember::new(invitee.id, input.role));
        self.ctx.store.save(&mut workspace).await?;
        invitee.workspaces.push(workspace.id);
        self.ctx.store.save(&mut invitee).await?;

        isolate(
            "Workspace invitation notice",
            self.ctx
                .notifier()
                .notify_workspace_invitation(&workspace, user.id, invitee.id)
                .await,
        );
        self.log(
            ActivityLog::new(
                user.id,
                ActivityAction::MemberInvited,
                format!("Invited {} to workspace", invitee.name),
            )
            .workspace(workspace.id)
            .metadata(json!({ "invitedUserId": invitee.id, "role": input.role })),
        )
        .await;
        self.ctx.events.emit_to_workspace(
            workspace.id,
            "member-added",
            &json!({ "workspace": workspace.id, "user": invitee.summary(), "role": input.role }),
        );

        Ok(workspace)
    }

    pub async fn remove_member(&self, user: &User, id: Uuid, member: Uuid) -> Result<Workspace> {
        let mut workspace = self.load(id).await?;
        access::require_workspace_role(
            &workspace,
            user.id,
            WorkspaceRole::Admin,
            "Not authorized to remove members",
        )?;
        if workspace.owner == member {
            return Err(AppError::bad_request("Cannot remove workspace owner"));
        }

        workspace.members.retain(|m| m.user != member);
        self.ctx.store.save(&mut workspace).await?;
        self.ctx
            .store
            .update_where(
                |u: &User| u.id == member,
                |u: &mut User| {
                    u.workspaces.retain(|w| *w != id);
                    true
                },
            )
            .await?;

        self.log(
            ActivityLog::new(
                user.id,
                ActivityAction::MemberRemoved,
                "Removed member from workspace".to_string(),
            )
            .workspace(workspace.id)
            .metadata(json!({ "removedUserId": member })),
        )
        .await;
        self.ctx.events.emit_to_workspace(
            workspace.id,
            "member-removed",
            &json!({ "workspace": workspace.id, "userId": member }),
        );

        Ok(workspace)
    }

    pub async fn update_member_role(
        &self,
        user: &User,
        id: Uuid,
        member: Uuid,
        input: UpdateMemberRole,
    ) -> Result<Workspace> {
        let mut workspace = self.load(id).await?;
        if workspace.owner != user.id {
            return Err(AppError::forbidden("Only owner can change member roles"));
        }
        if workspace.owner == member {
            return Err(AppError::bad_request("Cannot change owner role"));
        }
        if input.role == WorkspaceRole::Owner {
            return Err(AppError::bad_request("Cannot assign owner role"));
        }

        let entry = workspace
            .members
            .iter_mut()
            .find(|m| m.user == member)
            .ok_or_else(|| AppError::not_found("Member not found"))?;
        entry.role = input.role;
        self.ctx.store.save(&mut workspace).await?;

        self.ctx.events.emit_to_workspace(
            workspace.id,
            "member-role-updated",
            &json!({ "workspace": workspace.id, "userId": member, "role": input.role }),
        );
        Ok(workspace)
    }

    /// Invite many emails at once; known users join immediately, unknown ones are queued
    pub async fn invite(
        &self,
        user: &User,
        id: Uuid,
        input: BulkInvite,
    ) -> Result<(Workspace, Vec<InvitationResult>)> {
        let mut workspace = self.load(id).await?;
        access::require_workspace_role(
            &workspace,
            user.id,
            WorkspaceRole::Admin,
            "Not authorized to send invitations",
        )?;
        if input.emails.is_empty() {
            return Err(AppError::bad_request("Please provide at least one email"));
        }

        let mut results = Vec::with_capacity(input.emails.len());
        let mut sent = Vec::new();
        for raw in &input.emails {
            let email = Validator::normalize_email(raw);
            if email.is_empty() {
                continue;
            }

            let existing: Option<User> = self
                .ctx
                .store
                .find_one(|u: &User| u.email == email)
                .await?;
            let outcome = match existing {
                Some(member) if workspace.is_member(member.id) => InvitationResult {
                    email,
                    status: InvitationStatus::AlreadyMember,
                    message: "User is already a member",
                },
                Some(mut member) => {
                    workspace
                        .members
                        .push(WorkspaceMember::new(member.id, WorkspaceRole::Member));
                    member.workspaces.push(workspace.id);
                    self.ctx.store.save(&mut member).await?;
                    sent.push(email.clone());
                    InvitationResult {
                        email,
                        status: InvitationStatus::Added,
                        message: "User added to workspace",
                    }
                }
                None => {
                    if !workspace.pending_invitations.iter().any(|i| i.email == email) {
                        workspace.pending_invitations.push(PendingInvitation {
                            email: email.clone(),
                            invited_by: user.id,
                            invited_at: Utc::now(),
                        });
                    }
                    sent.push(email.clone());
                    InvitationResult {
                        email,
                        status: InvitationStatus::Invited,
                        message: "Invitation sent",
                    }
                }
            };
            results.push(outcome);
        }
        self.ctx.store.save(&mut workspace).await?;

        self.log(
            ActivityLog::new(
                user.id,
                ActivityAction::InvitationsSent,
                format!("Sent invitations to {} {}", sent.len(), plural(sent.len(), "email")),
            )
            .workspace(workspace.id)
            .metadata(json!({ "emails": sent, "totalInvitations": input.emails.len() })),
        )
        .await;
        self.ctx.events.emit_to_workspace(
            workspace.id,
            "invitations-sent",
            &json!({ "workspace": workspace.id, "invitations": results }),
        );

        Ok((workspace, results))
    }
}

/// `"Sent invitations to N teammate(s)"`
pub fn invitation_summary(results: &[InvitationResult]) -> String {
    let sent = results
        .iter()
        .filter(|r| r.status != InvitationStatus::AlreadyMember)
        .count();
    format!("Sent invitations to {} {}", sent, plural(sent, "teammate"))
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        noun.to_string()
    } else {
        format!("{}s", noun)
    }
}
