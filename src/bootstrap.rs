use crate::{
    api::middleware::AppState,
    config::Config,
    database::Database,
    services::{AuthService, GoogleAuthService, SegmentationService, TemplateService},
};

/// Wire services to the shared database handle. Each service receives its
/// own clone at construction; nothing reaches for process-wide state.
pub fn build_app_state(db: Database, config: &Config) -> AppState {
    let auth_service = AuthService::new(db.clone(), config.session_duration_hours);

    let google_auth_service = GoogleAuthService::new(
        db.clone(),
        auth_service.clone(),
        config.google_client_id.clone(),
        config.google_client_secret.clone(),
        config.google_redirect_url.clone(),
    );

    let template_service = TemplateService::new(db.clone());
    let segmentation_service = SegmentationService::new(db.clone());

    AppState {
        db,
        config: config.clone(),
        auth_service,
        google_auth_service,
        template_service,
        segmentation_service,
    }
}
