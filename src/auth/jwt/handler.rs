use super::claims::{AUDIENCE, Claims};
use crate::config::AuthConfig;
use crate::utils::error::{AppError, Result};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};
use uuid::Uuid;

/// Signs and verifies session tokens with the configured secret
#[derive(Clone)]
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: u64,
    issuer: String,
}

impl fmt::Debug for JwtHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtHandler")
            .field("issuer", &self.issuer)
            .field("lifetime", &self.lifetime)
            .field("keys", &"[REDACTED]")
            .finish()
    }
}

impl JwtHandler {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[AUDIENCE]);
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            lifetime: config.jwt_expiration,
            issuer: config.issuer.clone(),
        }
    }

    /// Mint a token for `user_id`
    pub fn create_access_token(&self, user_id: Uuid) -> Result<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| AppError::internal(format!("System time error: {}", e)))?
            .as_secs();

        let claims = Claims::issue(user_id, &self.issuer, now, self.lifetime);
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(AppError::Jwt)?;

        debug!("Issued token {} for user {}", claims.jti, user_id);
        Ok(token)
    }

    /// Check signature, issuer, audience and expiry
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                warn!("Rejected token: {}", e);
                AppError::Jwt(e)
            })
    }

    /// `Authorization: Bearer <token>`
    pub fn extract_token_from_header(auth_header: &str) -> Option<&str> {
        auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}
