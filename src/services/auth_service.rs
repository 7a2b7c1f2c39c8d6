use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::RngCore;

use crate::{
    api::middleware::error::{ApiError, ApiResult},
    database::Database,
    models::{AuthData, AuthRequest, Session, User},
};

/// Hash a password with Argon2id and a random salt
pub fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> ApiResult<bool> {
    let parsed = PasswordHash::new(hash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Generate a 256-bit session token, hex encoded
pub fn generate_session_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Password authentication and session bookkeeping
#[derive(Clone)]
pub struct AuthService {
    db: Database,
    session_duration_hours: i64,
}

impl AuthService {
    pub fn new(db: Database, session_duration_hours: i64) -> Self {
        Self {
            db,
            session_duration_hours,
        }
    }

    /// Exchange credentials for a session token. Unknown users and wrong
    /// passwords are indistinguishable to the caller.
    pub async fn authenticate(&self, request: AuthRequest) -> ApiResult<AuthData> {
        if request.email.trim().is_empty() || request.password.is_empty() {
            return Err(ApiError::BadRequest(
                "Email and password are required".to_string(),
            ));
        }

        let user = self
            .db
            .get_user_by_email(&request.email)
            .await?
            .ok_or_else(|| ApiError::BadRequest("Invalid email or password".to_string()))?;

        // Users provisioned through the provider handshake have no password
        let Some(password_hash) = user.password_hash.as_deref() else {
            return Err(ApiError::BadRequest(
                "Invalid email or password".to_string(),
            ));
        };

        if !verify_password(&request.password, password_hash)? {
            return Err(ApiError::BadRequest(
                "Invalid email or password".to_string(),
            ));
        }

        self.issue_session(&user).await
    }

    /// Persist a fresh session for the user and package it as AuthData
    pub async fn issue_session(&self, user: &User) -> ApiResult<AuthData> {
        let token = generate_session_token();
        let session = Session::new(user.id.clone(), token.clone(), self.session_duration_hours);

        self.db.create_session(&session).await.map_err(|e| {
            tracing::error!(code = "SESSION_CREATE_ERROR", "Error creating session: {}", e);
            ApiError::Internal("Failed to create session".to_string())
        })?;

        Ok(AuthData {
            token,
            expires_at: session.expires_at,
            user: user.clone().into(),
        })
    }

    pub async fn get_session_by_token(&self, token: &str) -> ApiResult<Option<Session>> {
        self.db.get_session_by_token(token).await
    }

    pub async fn delete_session(&self, token: &str) -> ApiResult<()> {
        self.db.delete_session(token).await
    }

    pub async fn get_user_by_id(&self, id: &str) -> ApiResult<Option<User>> {
        self.db.get_user_by_id(id).await
    }

    pub async fn cleanup_expired_sessions(&self) -> ApiResult<u64> {
        self.db.cleanup_expired_sessions().await
    }
}
