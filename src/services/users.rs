//! User directory lookups

use super::ServiceContext;
use crate::models::{User, UserRole, UserSummary};
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

const SEARCH_LIMIT: usize = 10;
const MIN_QUERY_LEN: usize = 2;

/// Another user's public card
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct UserService {
    ctx: ServiceContext,
}

impl UserService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Case-insensitive substring match on name or email
    pub async fn search(&self, query: &str) -> Result<Vec<UserSummary>> {
        let needle = query.trim().to_lowercase();
        if needle.chars().count() < MIN_QUERY_LEN {
            return Ok(Vec::new());
        }

        let mut matches: Vec<User> = self
            .ctx
            .store
            .find(|u: &User| {
                u.name.to_lowercase().contains(&needle) || u.email.contains(&needle)
            })
            .await?;
        matches.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(matches
            .iter()
            .take(SEARCH_LIMIT)
            .map(User::summary)
            .collect())
    }

    pub async fn get(&self, id: Uuid) -> Result<PublicUser> {
        let user: User = self.ctx.store.require(id, "User not found").await?;
        Ok(PublicUser {
            id: user.id,
            name: user.name,
            email: user.email,
            avatar: user.avatar,
            role: user.role,
            created_at: user.created_at,
        })
    }
}
