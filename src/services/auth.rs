//! Account lifecycle: registration, credentials, profile and onboarding

use super::{ServiceContext, isolate};
use crate::models::{ActivityAction, ActivityLog, PreferencesUpdate, User, Workspace};
use crate::utils::crypto::{hash_password, verify_password};
use crate::utils::error::{AppError, Result};
use crate::utils::validation::Validator;
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub preferences: Option<PreferencesUpdate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingRequest {
    pub workspace_name: Option<String>,
    pub workspace_description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone)]
pub struct AccountService {
    ctx: ServiceContext,
}

impl AccountService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = Validator::normalize_email(email);
        self.ctx.store.find_one(|u: &User| u.email == email).await
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<User> {
        Validator::validate_name(&request.name)?;
        Validator::validate_email(&request.email)?;
        Validator::validate_password(&request.password)?;

        let email = Validator::normalize_email(&request.email);
        if self.find_by_email(&email).await?.is_some() {
            return Err(AppError::bad_request("User already exists"));
        }

        let user = User::new(
            request.name.trim().to_string(),
            email.clone(),
            hash_password(&request.password)?,
        );
        let inserted = self
            .ctx
            .store
            .insert_unique(&format!("user-email:{}", email), &user, |u: &User| {
                u.email == email
            })
            .await?;
        if !inserted {
            return Err(AppError::bad_request("User already exists"));
        }

        info!("User registered: {}", user.id);
        Ok(user)
    }

    /// Verify credentials; both unknown emails and bad passwords are "Invalid credentials"
    pub async fn login(&self, request: LoginRequest) -> Result<User> {
        let invalid = || AppError::unauthorized("Invalid credentials");

        let mut user = self
            .find_by_email(&request.email)
            .await?
            .ok_or_else(invalid)?;
        if !verify_password(&request.password, &user.password_hash)? {
            warn!("Failed login for user {}", user.id);
            return Err(invalid());
        }

        user.last_active = Utc::now();
        self.ctx.store.save(&mut user).await?;
        Ok(user)
    }

    pub async fn update_profile(&self, user: &User, update: ProfileUpdate) -> Result<User> {
        let mut user = user.clone();
        if let Some(name) = update.name.filter(|n| !n.is_empty()) {
            Validator::validate_name(&name)?;
            user.name = name.trim().to_string();
        }
        if let Some(avatar) = update.avatar {
            user.avatar = avatar;
        }
        if let Some(preferences) = update.preferences {
            user.preferences.merge(preferences);
        }
        self.ctx.store.save(&mut user).await?;
        Ok(user)
    }

    /// Create the user's first workspace and mark them onboarded
    pub async fn complete_onboarding(
        &self,
        user: &User,
        request: OnboardingRequest,
    ) -> Result<(User, Workspace)> {
        let name = request
            .workspace_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("{}'s Workspace", user.name));
        Validator::validate_required("Workspace name", &name, 100)?;

        let workspace = Workspace::new(
            name,
            request.workspace_description.unwrap_or_default(),
            user.id,
        );
        self.ctx.store.insert(&workspace).await?;

        let mut user = user.clone();
        user.workspaces.push(workspace.id);
        user.onboarded = true;
        self.ctx.store.save(&mut user).await?;

        isolate(
            "Activity logging",
            self.ctx
                .activity()
                .log(
                    ActivityLog::new(
                        user.id,
                        ActivityAction::WorkspaceCreated,
                        format!("Created workspace \"{}\"", workspace.name),
                    )
                    .workspace(workspace.id),
                )
                .await,
        );

        Ok((user, workspace))
    }

    pub async fn change_password(&self, user: &User, request: ChangePasswordRequest) -> Result<()> {
        if !verify_password(&request.current_password, &user.password_hash)? {
            return Err(AppError::unauthorized("Current password is incorrect"));
        }
        Validator::validate_password(&request.new_password)?;

        let mut user = user.clone();
        user.password_hash = hash_password(&request.new_password)?;
        self.ctx.store.save(&mut user).await?;

        info!("Password changed for user {}", user.id);
        Ok(())
    }
}
