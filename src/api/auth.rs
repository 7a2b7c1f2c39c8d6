use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Redirect,
    Json,
};
use serde::Deserialize;

use crate::{
    api::middleware::{ApiError, AppState},
    config::Config,
    models::{ApiResponse, AuthData, AuthRequest},
};

/// POST /auth/authenticate
///
/// The one envelope endpoint that also signals through the HTTP status:
/// 400 for recognized bad-request faults, 500 otherwise.
pub async fn authenticate(
    State(state): State<AppState>,
    Json(body): Json<AuthRequest>,
) -> (StatusCode, Json<ApiResponse<AuthData>>) {
    match state.auth_service.authenticate(body).await {
        Ok(auth_data) => (
            StatusCode::OK,
            Json(ApiResponse::success(auth_data, "Authentication successful")),
        ),
        Err(err @ ApiError::BadRequest(_)) => (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(
                err.envelope_message("An unexpected error occurred"),
            )),
        ),
        Err(err) => {
            tracing::error!("Authentication failed: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(
                    err.envelope_message("An unexpected error occurred"),
                )),
            )
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GoogleCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// GET /auth/google — hand control to the provider's redirect
pub async fn google_begin(State(state): State<AppState>) -> Redirect {
    match state.google_auth_service.begin_handshake().await {
        Ok(authorize_url) => Redirect::temporary(&authorize_url),
        Err(err) => {
            tracing::error!("Failed to begin Google handshake: {}", err);
            failure_redirect(&state.config)
        }
    }
}

/// GET /auth/google/callback — complete the handshake. Every failure
/// collapses into the same generic redirect so the external party never
/// observes failure details.
pub async fn google_callback(
    State(state): State<AppState>,
    Query(query): Query<GoogleCallbackQuery>,
) -> Redirect {
    if let Some(provider_error) = query.error {
        tracing::warn!("Google callback returned error: {}", provider_error);
        return failure_redirect(&state.config);
    }

    let (Some(code), Some(csrf_state)) = (query.code, query.state) else {
        tracing::warn!("Google callback missing code or state");
        return failure_redirect(&state.config);
    };

    match state
        .google_auth_service
        .complete_handshake(code, csrf_state)
        .await
    {
        Ok(auth_data) => {
            let query = url::form_urlencoded::Serializer::new(String::new())
                .append_pair("token", &auth_data.token)
                .finish();
            Redirect::temporary(&format!("{}?{}", state.config.login_success_url, query))
        }
        Err(err) => {
            tracing::error!("Google authentication failed: {}", err);
            failure_redirect(&state.config)
        }
    }
}

fn failure_redirect(config: &Config) -> Redirect {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("error", "Google authentication failed")
        .finish();
    Redirect::temporary(&format!("{}?{}", config.login_failure_url, query))
}
