//! Response bodies for the account endpoints

use crate::auth::AuthSystem;
use crate::models::{User, UserProfile, Workspace};
use crate::utils::error::Result;
use serde::Serialize;

/// Issued on register and login
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserProfile,
    pub token: String,
}

impl AuthResponse {
    pub fn issue(auth: &AuthSystem, user: &User) -> Result<Self> {
        Ok(Self {
            user: user.profile(),
            token: auth.issue_token(user)?,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct OnboardingResponse {
    pub user: UserProfile,
    pub workspace: Workspace,
}
