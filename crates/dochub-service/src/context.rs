//! Request context carrying the authenticated user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Context for the current authenticated request.
///
/// Built by the auth extractor and passed into service methods so that
/// every operation knows *who* is acting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID (token subject).
    pub user_id: Uuid,
    /// The user's email, when the token carries one.
    pub email: Option<String>,
    /// The token's role claim.
    pub role: String,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(user_id: Uuid, email: Option<String>, role: impl Into<String>) -> Self {
        Self {
            user_id,
            email,
            role: role.into(),
            request_time: Utc::now(),
        }
    }

    /// Context for a signed-in user with no other claims.
    pub fn for_user(user_id: Uuid) -> Self {
        Self::new(user_id, None, "authenticated")
    }
}
