use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Audience every TaskHub token is minted for
pub(super) const AUDIENCE: &str = "taskhub-api";

/// Registered claims carried by a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// The authenticated user
    pub sub: Uuid,
    pub iat: u64,
    pub exp: u64,
    pub iss: String,
    pub aud: String,
    /// Unique per issued token
    pub jti: Uuid,
}

impl Claims {
    pub(super) fn issue(user_id: Uuid, issuer: &str, now: u64, lifetime: u64) -> Self {
        Self {
            sub: user_id,
            iat: now,
            exp: now.saturating_add(lifetime),
            iss: issuer.to_string(),
            aud: AUDIENCE.to_string(),
            jti: Uuid::new_v4(),
        }
    }

    /// Seconds between issue and expiry
    pub fn lifetime(&self) -> u64 {
        self.exp.saturating_sub(self.iat)
    }
}
