use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};

use crate::{
    api::middleware::{AppState, AuthenticatedUser},
    models::*,
};

/// POST /templates
pub async fn create_template(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(body): Json<CreateTemplateRequest>,
) -> Json<ApiResponse<Template>> {
    let response = match state
        .template_service
        .create_template(user.organization_id(), body)
        .await
    {
        Ok(template) => ApiResponse::success(template, "Template created successfully"),
        Err(err) => ApiResponse::error(
            err.envelope_message("An error occurred while creating the template"),
        ),
    };

    Json(response)
}

/// GET /templates/:id
pub async fn get_template(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(template_id): Path<String>,
) -> Json<ApiResponse<Template>> {
    let response = match state
        .template_service
        .get_template(&template_id, user.organization_id())
        .await
    {
        Ok(Some(template)) => ApiResponse::success(template, "Template retrieved successfully"),
        Ok(None) => ApiResponse::error("Template not found"),
        Err(err) => ApiResponse::error(
            err.envelope_message("An error occurred while retrieving the template"),
        ),
    };

    Json(response)
}

/// PUT /templates/:id
pub async fn update_template(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(template_id): Path<String>,
    Json(body): Json<UpdateTemplateRequest>,
) -> Json<ApiResponse<Template>> {
    let response = match state
        .template_service
        .update_template(&template_id, user.organization_id(), body)
        .await
    {
        Ok(Some(template)) => ApiResponse::success(template, "Template updated successfully"),
        Ok(None) => ApiResponse::error("Template not found"),
        Err(err) => ApiResponse::error(
            err.envelope_message("An error occurred while updating the template"),
        ),
    };

    Json(response)
}

/// DELETE /templates/:id
pub async fn delete_template(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(template_id): Path<String>,
) -> Json<ApiResponse<bool>> {
    let response = match state
        .template_service
        .delete_template(&template_id, user.organization_id())
        .await
    {
        Ok(deleted) => {
            let message = if deleted {
                "Template deleted successfully"
            } else {
                "Template not found or already deleted"
            };
            ApiResponse::success(deleted, message)
        }
        Err(err) => ApiResponse::error_with(
            false,
            err.envelope_message("An error occurred while deleting the template"),
        ),
    };

    Json(response)
}

/// GET /templates
pub async fn list_templates(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(filters): Query<TemplateFilters>,
) -> Json<ApiResponse<Vec<Template>>> {
    let response = match state
        .template_service
        .list_templates(user.organization_id(), filters)
        .await
    {
        Ok(templates) => ApiResponse::success(templates, "Templates retrieved successfully"),
        Err(err) => ApiResponse::error(
            err.envelope_message("An error occurred while retrieving templates"),
        ),
    };

    Json(response)
}

/// POST /templates/:id/duplicate
pub async fn duplicate_template(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(template_id): Path<String>,
) -> Json<ApiResponse<Template>> {
    let response = match state
        .template_service
        .duplicate_template(&template_id, user.organization_id())
        .await
    {
        Ok(template) => ApiResponse::success(template, "Template duplicated successfully"),
        Err(err) => ApiResponse::error(
            err.envelope_message("An error occurred while duplicating the template"),
        ),
    };

    Json(response)
}
