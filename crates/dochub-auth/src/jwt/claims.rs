//! Claims carried by a Supabase access token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role Supabase assigns to tokens minted for signed-in users.
pub const AUTHENTICATED_ROLE: &str = "authenticated";

/// JWT claims payload of a Supabase access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the auth user ID.
    pub sub: Uuid,
    /// The user's email address, when the provider supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Postgres role the token maps to (`authenticated`, `anon`, ...).
    #[serde(default)]
    pub role: String,
    /// Audience.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    /// Supabase session the token belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Uuid>,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

impl Claims {
    /// Claims for a signed-in user, valid for `ttl`.
    pub fn for_user(user_id: Uuid, email: Option<String>, ttl: chrono::Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            email,
            role: AUTHENTICATED_ROLE.to_string(),
            aud: Some(AUTHENTICATED_ROLE.to_string()),
            session_id: None,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    /// Returns the user ID from the subject claim.
    pub fn user_id(&self) -> Uuid {
        self.sub
    }

    /// Whether the token belongs to a signed-in user rather than the
    /// anonymous API key.
    pub fn is_authenticated(&self) -> bool {
        self.role == AUTHENTICATED_ROLE || self.role == "service_role"
    }

    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supabase_payload_parses() {
        let payload = serde_json::json!({
            "aud": "authenticated",
            "exp": 1_900_000_000,
            "iat": 1_800_000_000,
            "sub": "6f1c2a34-8f0e-4b8c-9d4b-3d1f0b2a7e11",
            "email": "dev@example.com",
            "phone": "",
            "app_metadata": { "provider": "github" },
            "role": "authenticated",
            "session_id": "0b6c5d4e-1a2b-4c3d-8e9f-001122334455"
        });
        let claims: Claims = serde_json::from_value(payload).unwrap();
        assert_eq!(claims.email.as_deref(), Some("dev@example.com"));
        assert!(claims.is_authenticated());
        assert!(claims.expires_at().is_some());
    }

    #[test]
    fn test_anon_role_is_not_authenticated() {
        let mut claims = Claims::for_user(Uuid::new_v4(), None, chrono::Duration::minutes(5));
        claims.role = "anon".to_string();
        assert!(!claims.is_authenticated());
    }
}
