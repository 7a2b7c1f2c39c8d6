use sqlx::{any::AnyPoolOptions, AnyPool, Row};

use crate::{
    api::middleware::error::ApiResult,
    models::*,
};

pub mod segments;
pub mod templates;

/// Shared persistence handle. Cloning is cheap (the pool is internally
/// reference counted); services receive a clone at construction instead of
/// reaching for process-wide state.
#[derive(Clone)]
pub struct Database {
    pool: AnyPool,
}

impl Database {
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = AnyPoolOptions::new()
            .max_connections(20)
            .min_connections(5)
            .connect(database_url)
            .await?;

        // Enable foreign keys for SQLite
        if database_url.starts_with("sqlite") {
            sqlx::query("PRAGMA foreign_keys = ON")
                .execute(&pool)
                .await?;
        }

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("migrations/sqlite").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    // Organization operations
    pub async fn create_organization(&self, organization: &Organization) -> ApiResult<()> {
        sqlx::query(
            "INSERT INTO organizations (id, name, created_at, updated_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(&organization.id)
        .bind(&organization.name)
        .bind(&organization.created_at)
        .bind(&organization.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_organization_by_id(&self, id: &str) -> ApiResult<Option<Organization>> {
        let row = sqlx::query(
            "SELECT id, name, created_at, updated_at
             FROM organizations
             WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = row {
            Ok(Some(Organization {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                created_at: row.try_get("created_at")?,
                updated_at: row.try_get("updated_at")?,
            }))
        } else {
            Ok(None)
        }
    }

    // User operations
    pub async fn create_user(&self, user: &User) -> ApiResult<()> {
        sqlx::query(
            "INSERT INTO users (id, email, name, password_hash, google_id, current_organization_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(user.name.as_deref())
        .bind(user.password_hash.as_deref())
        .bind(user.google_id.as_deref())
        .bind(&user.current_organization_id)
        .bind(&user.created_at)
        .bind(&user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn map_user_row(row: &sqlx::any::AnyRow) -> ApiResult<User> {
        Ok(User {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            name: row.try_get("name").ok(),
            password_hash: row.try_get("password_hash").ok(),
            google_id: row.try_get("google_id").ok(),
            current_organization_id: row.try_get("current_organization_id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    pub async fn get_user_by_id(&self, id: &str) -> ApiResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, email, name, password_hash, google_id, current_organization_id, created_at, updated_at
             FROM users
             WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(Self::map_user_row(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn get_user_by_email(&self, email: &str) -> ApiResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, email, name, password_hash, google_id, current_organization_id, created_at, updated_at
             FROM users
             WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(Self::map_user_row(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn get_user_by_google_id(&self, google_id: &str) -> ApiResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, email, name, password_hash, google_id, current_organization_id, created_at, updated_at
             FROM users
             WHERE google_id = ?",
        )
        .bind(google_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(Self::map_user_row(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn link_google_id(&self, user_id: &str, google_id: &str) -> ApiResult<()> {
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            "UPDATE users
             SET google_id = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(google_id)
        .bind(&now)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // Session operations
    pub async fn create_session(&self, session: &Session) -> ApiResult<()> {
        sqlx::query(
            "INSERT INTO sessions (id, user_id, token, expires_at, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&session.id)
        .bind(&session.user_id)
        .bind(&session.token)
        .bind(&session.expires_at)
        .bind(&session.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_session_by_token(&self, token: &str) -> ApiResult<Option<Session>> {
        let row = sqlx::query(
            "SELECT id, user_id, token, expires_at, created_at
             FROM sessions
             WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = row {
            Ok(Some(Session {
                id: row.try_get("id")?,
                user_id: row.try_get("user_id")?,
                token: row.try_get("token")?,
                expires_at: row.try_get("expires_at")?,
                created_at: row.try_get("created_at")?,
            }))
        } else {
            Ok(None)
        }
    }

    pub async fn delete_session(&self, token: &str) -> ApiResult<()> {
        sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn cleanup_expired_sessions(&self) -> ApiResult<u64> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query("DELETE FROM sessions WHERE expires_at < ?")
            .bind(&now)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    // Oauth handshake state operations
    pub async fn create_oauth_state(&self, state: &OauthState) -> ApiResult<()> {
        sqlx::query(
            "INSERT INTO oauth_states (state, nonce, pkce_verifier, created_at, expires_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&state.state)
        .bind(&state.nonce)
        .bind(&state.pkce_verifier)
        .bind(&state.created_at)
        .bind(&state.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetch-and-delete so a state value can only complete one handshake
    pub async fn consume_oauth_state(&self, state: &str) -> ApiResult<Option<OauthState>> {
        let row = sqlx::query(
            "SELECT state, nonce, pkce_verifier, created_at, expires_at
             FROM oauth_states
             WHERE state = ?",
        )
        .bind(state)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM oauth_states WHERE state = ?")
            .bind(state)
            .execute(&self.pool)
            .await?;

        Ok(Some(OauthState {
            state: row.try_get("state")?,
            nonce: row.try_get("nonce")?,
            pkce_verifier: row.try_get("pkce_verifier")?,
            created_at: row.try_get("created_at")?,
            expires_at: row.try_get("expires_at")?,
        }))
    }

    pub async fn cleanup_expired_oauth_states(&self) -> ApiResult<u64> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query("DELETE FROM oauth_states WHERE expires_at < ?")
            .bind(&now)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
