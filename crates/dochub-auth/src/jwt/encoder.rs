//! Token signing for local development and tests.

use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use dochub_core::config::AuthConfig;
use dochub_core::error::AppError;

use super::claims::Claims;

/// Signs HS256 tokens shaped like the ones Supabase issues.
#[derive(Clone)]
pub struct JwtEncoder {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder").finish_non_exhaustive()
    }
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
        }
    }

    /// Signs arbitrary claims.
    pub fn encode(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode access token: {e}")))
    }

    /// Issues an access token for a signed-in user.
    pub fn issue(
        &self,
        user_id: Uuid,
        email: Option<String>,
        ttl: chrono::Duration,
    ) -> Result<String, AppError> {
        self.encode(&Claims::for_user(user_id, email, ttl))
    }
}
