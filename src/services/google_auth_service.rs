use openidconnect::{
    core::{CoreAuthenticationFlow, CoreClient, CoreProviderMetadata},
    reqwest::async_http_client,
    AuthorizationCode, ClientId, ClientSecret, CsrfToken, IssuerUrl, Nonce, PkceCodeChallenge,
    PkceCodeVerifier, RedirectUrl, Scope, TokenResponse,
};

use crate::{
    api::middleware::error::{ApiError, ApiResult},
    database::Database,
    models::{AuthData, OauthState, Organization, User},
    services::AuthService,
};

const GOOGLE_ISSUER_URL: &str = "https://accounts.google.com";

/// Bridges the Google redirect handshake into the request/response model:
/// `begin_handshake` yields the authorize URL to redirect to,
/// `complete_handshake` exchanges the callback payload for a session token.
/// No retries and no timeout handling of its own.
#[derive(Clone)]
pub struct GoogleAuthService {
    db: Database,
    auth_service: AuthService,
    client_id: String,
    client_secret: String,
    redirect_url: String,
}

impl GoogleAuthService {
    pub fn new(
        db: Database,
        auth_service: AuthService,
        client_id: String,
        client_secret: String,
        redirect_url: String,
    ) -> Self {
        Self {
            db,
            auth_service,
            client_id,
            client_secret,
            redirect_url,
        }
    }

    async fn create_client(&self) -> ApiResult<CoreClient> {
        if self.client_id.is_empty() || self.client_secret.is_empty() {
            return Err(ApiError::Internal(
                "Google authentication is not configured".to_string(),
            ));
        }

        let issuer = IssuerUrl::new(GOOGLE_ISSUER_URL.to_string())
            .map_err(|e| ApiError::Internal(format!("Invalid issuer URL: {}", e)))?;

        let provider_metadata = CoreProviderMetadata::discover_async(issuer, async_http_client)
            .await
            .map_err(|e| ApiError::Internal(format!("Provider discovery failed: {}", e)))?;

        let redirect = RedirectUrl::new(self.redirect_url.clone())
            .map_err(|e| ApiError::Internal(format!("Invalid redirect URL: {}", e)))?;

        Ok(CoreClient::from_provider_metadata(
            provider_metadata,
            ClientId::new(self.client_id.clone()),
            Some(ClientSecret::new(self.client_secret.clone())),
        )
        .set_redirect_uri(redirect))
    }

    /// Build the provider authorize URL, persisting the CSRF state, nonce
    /// and PKCE verifier for the callback half
    pub async fn begin_handshake(&self) -> ApiResult<String> {
        let client = self.create_client().await?;

        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let (authorize_url, csrf_state, nonce) = client
            .authorize_url(
                CoreAuthenticationFlow::AuthorizationCode,
                CsrfToken::new_random,
                Nonce::new_random,
            )
            .set_pkce_challenge(pkce_challenge)
            .add_scope(Scope::new("openid".to_string()))
            .add_scope(Scope::new("email".to_string()))
            .add_scope(Scope::new("profile".to_string()))
            .url();

        let state = OauthState::new(
            csrf_state.secret().clone(),
            nonce.secret().clone(),
            pkce_verifier.secret().clone(),
        );
        self.db.create_oauth_state(&state).await?;

        Ok(authorize_url.to_string())
    }

    /// Exchange the callback payload for a session. Any fault propagates to
    /// the controller, which collapses it into a generic failure redirect.
    pub async fn complete_handshake(&self, code: String, state: String) -> ApiResult<AuthData> {
        let stored = self
            .db
            .consume_oauth_state(&state)
            .await?
            .ok_or_else(|| ApiError::BadRequest("Unknown authentication state".to_string()))?;

        if stored.is_expired() {
            return Err(ApiError::BadRequest(
                "Authentication state expired".to_string(),
            ));
        }

        let client = self.create_client().await?;

        let token_response = client
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(PkceCodeVerifier::new(stored.pkce_verifier))
            .request_async(async_http_client)
            .await
            .map_err(|e| ApiError::Internal(format!("Token exchange failed: {}", e)))?;

        let id_token = token_response
            .id_token()
            .ok_or_else(|| ApiError::Internal("Provider returned no ID token".to_string()))?;

        let claims = id_token
            .claims(&client.id_token_verifier(), &Nonce::new(stored.nonce))
            .map_err(|e| ApiError::Internal(format!("ID token verification failed: {}", e)))?;

        let subject = claims.subject().as_str().to_string();
        let email = claims
            .email()
            .map(|email| email.as_str().to_string())
            .ok_or_else(|| {
                ApiError::BadRequest("Google account has no email address".to_string())
            })?;
        let name = claims
            .name()
            .and_then(|name| name.get(None))
            .map(|name| name.as_str().to_string());

        let user = self.find_or_create_user(&subject, &email, name).await?;

        self.auth_service.issue_session(&user).await
    }

    /// Match by Google subject first, then by email (linking the subject),
    /// otherwise provision a user with a personal organization
    async fn find_or_create_user(
        &self,
        subject: &str,
        email: &str,
        name: Option<String>,
    ) -> ApiResult<User> {
        if let Some(user) = self.db.get_user_by_google_id(subject).await? {
            return Ok(user);
        }

        if let Some(mut user) = self.db.get_user_by_email(email).await? {
            self.db.link_google_id(&user.id, subject).await?;
            user.google_id = Some(subject.to_string());
            return Ok(user);
        }

        let organization = Organization::new(format!(
            "{}'s Organization",
            name.as_deref().unwrap_or(email)
        ));
        self.db.create_organization(&organization).await?;

        let mut user = User::new(email.to_string(), name, organization.id.clone());
        user.google_id = Some(subject.to_string());
        self.db.create_user(&user).await?;

        tracing::info!("Provisioned user {} via Google sign-in", user.id);

        Ok(user)
    }
}
