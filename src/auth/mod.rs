//! Authentication and authorization
//!
//! Bearer tokens are HS256 JWTs whose subject is a user id. Requests resolve
//! the subject to a stored user through [`AuthSystem::authenticate_token`];
//! handlers receive it through the [`AuthUser`] extractor.

pub mod access;
pub mod extractor;
pub mod jwt;

pub use extractor::AuthUser;
pub use jwt::{Claims, JwtHandler};

use crate::config::AuthConfig;
use crate::models::User;
use crate::storage::Store;
use crate::utils::error::{AppError, Result};
use tracing::debug;

/// Token issuing and verification bound to the user store
#[derive(Debug, Clone)]
pub struct AuthSystem {
    jwt: JwtHandler,
    store: Store,
}

impl AuthSystem {
    pub fn new(config: &AuthConfig, store: Store) -> Self {
        Self {
            jwt: JwtHandler::new(config),
            store,
        }
    }

    pub fn issue_token(&self, user: &User) -> Result<String> {
        self.jwt.create_access_token(user.id)
    }

    /// Resolve an `Authorization` header value to a user
    pub async fn authenticate_header(&self, header: Option<&str>) -> Result<User> {
        let token = header
            .and_then(JwtHandler::extract_token_from_header)
            .ok_or_else(|| AppError::unauthorized("Not authorized, no token"))?;
        self.authenticate_token(token).await
    }

    /// Resolve a raw token to a user
    pub async fn authenticate_token(&self, token: &str) -> Result<User> {
        let claims = self
            .jwt
            .verify_token(token)
            .map_err(|_| AppError::unauthorized("Not authorized, token failed"))?;

        let user = self
            .store
            .get::<User>(claims.sub)
            .await?
            .ok_or_else(|| AppError::unauthorized("Not authorized, user not found"))?;

        debug!("Authenticated user {}", user.id);
        Ok(user)
    }
}
