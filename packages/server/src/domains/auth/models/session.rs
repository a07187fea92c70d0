use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Verification session - binds a one-time code to a phone number
///
/// Lives from `create_session` until it is consumed by a successful
/// verification, removed after a failed dispatch, or expires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
    pub session_id: String, // 64 hex chars, primary key
    pub phone: String,      // E.164
    pub code: i32,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(session_id: String, phone: String, code: i32) -> Self {
        Self {
            session_id,
            phone,
            code,
            created_at: Utc::now(),
        }
    }

    /// A session is expired once `ttl` has elapsed since creation.
    pub fn is_expired(&self, ttl: chrono::Duration, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.created_at) >= ttl
    }
}
