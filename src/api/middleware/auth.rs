use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{
    api::middleware::error::ApiError,
    models::{Session, User},
};

#[derive(Clone)]
pub struct AppState {
    pub db: crate::database::Database,
    pub config: crate::config::Config,
    pub auth_service: crate::services::AuthService,
    pub google_auth_service: crate::services::GoogleAuthService,
    pub template_service: crate::services::TemplateService,
    pub segmentation_service: crate::services::SegmentationService,
}

/// Identity resolved once per request; its current organization id scopes
/// every persistence call the handler makes
#[derive(Clone)]
pub struct AuthenticatedUser {
    pub user: User,
    pub session: Session,
    pub token: String,
}

impl AuthenticatedUser {
    pub fn organization_id(&self) -> &str {
        &self.user.current_organization_id
    }
}

/// Extract and validate the session token from the Authorization header
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    let token = match auth_header.and_then(|value| value.strip_prefix("Bearer ")) {
        Some(token) => token,
        None => return Err(ApiError::Unauthorized),
    };

    let session = state
        .auth_service
        .get_session_by_token(token)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    if session.is_expired() {
        // Delete expired session
        state.auth_service.delete_session(token).await.ok();
        return Err(ApiError::Unauthorized);
    }

    let user = state
        .auth_service
        .get_user_by_id(&session.user_id)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    let token_owned = token.to_string();

    request.extensions_mut().insert(AuthenticatedUser {
        user,
        session,
        token: token_owned,
    });

    Ok(next.run(request).await)
}
