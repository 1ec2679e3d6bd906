//! Teams within a workspace

use super::{ServiceContext, isolate};
use crate::auth::access;
use crate::models::{
    ActivityAction, ActivityLog, Project, Team, TeamMember, TeamRole, User, Workspace,
    WorkspaceRole,
};
use crate::utils::error::{AppError, Result};
use crate::utils::validation::Validator;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct MemberInput {
    pub user: Uuid,
    #[serde(default)]
    pub role: TeamRole,
}

#[derive(Debug, Deserialize)]
pub struct CreateTeam {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub members: Option<Vec<MemberInput>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTeam {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddTeamMember {
    pub user_id: Uuid,
    #[serde(default)]
    pub role: TeamRole,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTeamMember {
    pub role: TeamRole,
}

#[derive(Debug, Clone)]
pub struct TeamService {
    ctx: ServiceContext,
}

impl TeamService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    async fn load(&self, id: Uuid) -> Result<Team> {
        self.ctx.store.require(id, "Team not found").await
    }

    async fn workspace(&self, id: Uuid) -> Result<Workspace> {
        self.ctx.store.require(id, "Workspace not found").await
    }

    /// Owner/admin only; the creator leads the team unless members are given
    pub async fn create(&self, user: &User, workspace_id: Uuid, input: CreateTeam) -> Result<Team> {
        let mut workspace = self.workspace(workspace_id).await?;
        access::require_workspace_role(
            &workspace,
            user.id,
            WorkspaceRole::Admin,
            "Not authorized to create teams",
        )?;
        Validator::validate_required("Team name", &input.name, 100)?;

        let members = match input.members.filter(|m| !m.is_empty()) {
            Some(members) => {
                let mut list: Vec<TeamMember> = Vec::with_capacity(members.len());
                for m in members {
                    if !workspace.is_member(m.user) {
                        return Err(AppError::bad_request("User must be a workspace member first"));
                    }
                    if list.iter().all(|existing| existing.user != m.user) {
                        list.push(TeamMember::new(m.user, m.role));
                    }
                }
                list
            }
            None => vec![TeamMember::new(user.id, TeamRole::Lead)],
        };

        let team = Team::new(
            input.name.trim().to_string(),
            input.description.unwrap_or_default(),
            workspace.id,
            members,
        );
        self.ctx.store.insert(&team).await?;

        workspace.teams.push(team.id);
        self.ctx.store.save(&mut workspace).await?;

        let member_ids: Vec<Uuid> = team.members.iter().map(|m| m.user).collect();
        let team_id = team.id;
        self.ctx
            .store
            .update_where(
                |u: &User| member_ids.contains(&u.id),
                |u: &mut User| {
                    if u.teams.contains(&team_id) {
                        return false;
                    }
                    u.teams.push(team_id);
                    true
                },
            )
            .await?;

        isolate(
            "Activity logging",
            self.ctx
                .activity()
                .log(
                    ActivityLog::new(
                        user.id,
                        ActivityAction::TeamCreated,
                        format!("Created team \"{}\"", team.name),
                    )
                    .workspace(workspace.id),
                )
                .await,
        );

        info!("Team {} created in workspace {}", team.id, workspace.id);
        Ok(team)
    }

    /// Teams of one workspace the caller belongs to
    pub async fn list_in_workspace(&self, user: &User, workspace_id: Uuid) -> Result<Vec<Team>> {
        let workspace = self.workspace(workspace_id).await?;
        access::require_workspace_member(&workspace, user.id)?;
        self.ctx
            .store
            .find(|t: &Team| t.workspace == workspace_id)
            .await
    }

    /// Teams of the given workspace, or of every workspace the caller belongs to
    pub async fn list(&self, user: &User, workspace: Option<Uuid>) -> Result<Vec<Team>> {
        if let Some(workspace) = workspace {
            return self.list_in_workspace(user, workspace).await;
        }
        let mine: Vec<Uuid> = self
            .ctx
            .store
            .find(|w: &Workspace| w.is_member(user.id))
            .await?
            .iter()
            .map(|w| w.id)
            .collect();
        self.ctx
            .store
            .find(|t: &Team| mine.contains(&t.workspace))
            .await
    }

    /// Visible to team members and to members of the team's workspace
    pub async fn get(&self, user: &User, id: Uuid) -> Result<Team> {
        let team = self.load(id).await?;
        if team.member(user.id).is_some() {
            return Ok(team);
        }
        let workspace = self.workspace(team.workspace).await?;
        if !workspace.is_member(user.id) {
            return Err(AppError::forbidden("Not authorized to view this team"));
        }
        Ok(team)
    }

    pub async fn update(&self, user: &User, id: Uuid, input: UpdateTeam) -> Result<Team> {
        let mut team = self.load(id).await?;
        access::require_team_lead(&team, user.id, "Only team leads can update the team")?;

        if let Some(name) = input.name {
            Validator::validate_required("Team name", &name, 100)?;
            team.name = name.trim().to_string();
        }
        if let Some(description) = input.description {
            team.description = description;
        }
        if let Some(color) = input.color {
            Validator::validate_hex_color(&color)?;
            team.color = color;
        }
        self.ctx.store.save(&mut team).await?;
        Ok(team)
    }

    /// Lead only; detaches the team from its workspace, members and projects
    pub async fn delete(&self, user: &User, id: Uuid) -> Result<()> {
        let team = self.load(id).await?;
        access::require_team_lead(&team, user.id, "Only team leads can delete the team")?;

        let store = &self.ctx.store;
        store
            .update_where(
                |w: &Workspace| w.id == team.workspace,
                |w: &mut Workspace| {
                    w.teams.retain(|t| *t != id);
                    true
                },
            )
            .await?;
        store
            .update_where(
                |u: &User| u.teams.contains(&id),
                |u: &mut User| {
                    u.teams.retain(|t| *t != id);
                    true
                },
            )
            .await?;
        store
            .update_where(
                |p: &Project| p.team == Some(id),
                |p: &mut Project| {
                    p.team = None;
                    true
                },
            )
            .await?;
        store.delete::<Team>(id).await?;

        info!("Team {} deleted", id);
        Ok(())
    }

    pub async fn add_member(&self, user: &User, id: Uuid, input: AddTeamMember) -> Result<Team> {
        let mut team = self.load(id).await?;
        access::require_team_lead(&team, user.id, "Only team leads can add members")?;

        let mut member: User = self.ctx.store.require(input.user_id, "User not found").await?;
        let workspace = self.workspace(team.workspace).await?;
        if !workspace.is_member(member.id) {
            return Err(AppError::bad_request("User must be a workspace member first"));
        }
        if team.member(member.id).is_some() {
            return Err(AppError::bad_request("User is already a team member"));
        }

        team.members.push(TeamMember::new(member.id, input.role));
        self.ctx.store.save(&mut team).await?;
        if !member.teams.contains(&team.id) {
            member.teams.push(team.id);
            self.ctx.store.save(&mut member).await?;
        }
        Ok(team)
    }

    /// Change a member's role; the team always keeps at least one lead
    pub async fn update_member(
        &self,
        user: &User,
        id: Uuid,
        member: Uuid,
        input: UpdateTeamMember,
    ) -> Result<Team> {
        let mut team = self.load(id).await?;
        access::require_team_lead(&team, user.id, "Only team leads can update member roles")?;

        let lead_count = team.lead_count();
        let entry = team
            .members
            .iter_mut()
            .find(|m| m.user == member)
            .ok_or_else(|| AppError::not_found("Member not found in team"))?;
        if entry.role == TeamRole::Lead && input.role != TeamRole::Lead && lead_count == 1 {
            return Err(AppError::bad_request(
                "Cannot remove the last team lead. Promote another member first.",
            ));
        }
        entry.role = input.role;
        self.ctx.store.save(&mut team).await?;
        Ok(team)
    }

    /// Leads may remove anyone and members may remove themselves
    pub async fn remove_member(&self, user: &User, id: Uuid, member: Uuid) -> Result<Team> {
        let mut team = self.load(id).await?;
        if !team.is_lead(user.id) && user.id != member {
            return Err(AppError::forbidden("Only team leads can remove members"));
        }

        let index = team
            .members
            .iter()
            .position(|m| m.user == member)
            .ok_or_else(|| AppError::not_found("Member not found in team"))?;
        if team.members[index].role == TeamRole::Lead && team.lead_count() == 1 {
            return Err(AppError::bad_request(
                "Cannot remove the last team lead. Promote another member first.",
            ));
        }
        team.members.remove(index);
        self.ctx.store.save(&mut team).await?;

        self.ctx
            .store
            .update_where(
                |u: &User| u.id == member,
                |u: &mut User| {
                    u.teams.retain(|t| *t != id);
                    true
                },
            )
            .await?;
        Ok(team)
    }
}
