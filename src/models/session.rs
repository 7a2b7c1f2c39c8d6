use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub token: String,
    pub expires_at: String,
    pub created_at: String,
}

impl Session {
    pub fn new(user_id: String, token: String, duration_hours: i64) -> Self {
        let now = chrono::Utc::now();
        let expires_at = now + chrono::Duration::hours(duration_hours);

        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            token,
            expires_at: expires_at.to_rfc3339(),
            created_at: now.to_rfc3339(),
        }
    }

    pub fn is_expired(&self) -> bool {
        match chrono::DateTime::parse_from_rfc3339(&self.expires_at) {
            Ok(expires_at) => expires_at < chrono::Utc::now(),
            Err(_) => true,
        }
    }
}

/// One-time CSRF/PKCE state persisted between the two halves of the
/// provider handshake
#[derive(Debug, Clone)]
pub struct OauthState {
    pub state: String,
    pub nonce: String,
    pub pkce_verifier: String,
    pub created_at: String,
    pub expires_at: String,
}

impl OauthState {
    pub fn new(state: String, nonce: String, pkce_verifier: String) -> Self {
        let now = chrono::Utc::now();
        // The provider round trip should take seconds; 10 minutes is generous
        let expires_at = now + chrono::Duration::minutes(10);

        Self {
            state,
            nonce,
            pkce_verifier,
            created_at: now.to_rfc3339(),
            expires_at: expires_at.to_rfc3339(),
        }
    }

    pub fn is_expired(&self) -> bool {
        match chrono::DateTime::parse_from_rfc3339(&self.expires_at) {
            Ok(expires_at) => expires_at < chrono::Utc::now(),
            Err(_) => true,
        }
    }
}
