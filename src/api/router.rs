use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::api::{auth, middleware::AppState, middleware::require_auth, segments, templates};

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Explicit route table: method + path to handler. Tenant-scoped routes sit
/// behind the session middleware; auth routes are reachable without it.
pub fn build_router(state: AppState) -> Router {
    let tenant_routes = Router::new()
        .route("/segments", post(segments::create_segment).get(segments::list_segments))
        .route(
            "/segments/:id",
            get(segments::get_segment)
                .put(segments::update_segment)
                .delete(segments::delete_segment),
        )
        .route("/segments/:id/entities", get(segments::get_entities_in_segment))
        .route(
            "/segments/:id/entities/:entity_id",
            post(segments::add_entity_to_segment).delete(segments::remove_entity_from_segment),
        )
        .route("/segments/:id/analytics", get(segments::get_segment_analytics))
        .route("/segments/entity/:entity_id", get(segments::get_segments_for_entity))
        .route("/templates", post(templates::create_template).get(templates::list_templates))
        .route(
            "/templates/:id",
            get(templates::get_template)
                .put(templates::update_template)
                .delete(templates::delete_template),
        )
        .route("/templates/:id/duplicate", post(templates::duplicate_template))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/health", get(health))
        .route("/auth/authenticate", post(auth::authenticate))
        .route("/auth/google", get(auth::google_begin))
        .route("/auth/google/callback", get(auth::google_callback))
        .merge(tenant_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
