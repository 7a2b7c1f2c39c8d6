use axum::{
    extract::{Path, State},
    Extension, Json,
};

use crate::{
    api::middleware::{AppState, AuthenticatedUser},
    models::*,
};

/// POST /segments
pub async fn create_segment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(body): Json<CreateSegmentRequest>,
) -> Json<ApiResponse<Segment>> {
    let response = match state
        .segmentation_service
        .create_segment(user.organization_id(), body)
        .await
    {
        Ok(segment) => ApiResponse::success(segment, "Segment created successfully"),
        Err(err) => ApiResponse::error(
            err.envelope_message("An error occurred while creating the segment"),
        ),
    };

    Json(response)
}

/// GET /segments/:id
pub async fn get_segment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(segment_id): Path<String>,
) -> Json<ApiResponse<Segment>> {
    let response = match state
        .segmentation_service
        .get_segment(&segment_id, user.organization_id())
        .await
    {
        Ok(Some(segment)) => ApiResponse::success(segment, "Segment retrieved successfully"),
        Ok(None) => ApiResponse::error("Segment not found"),
        Err(err) => ApiResponse::error(
            err.envelope_message("An error occurred while retrieving the segment"),
        ),
    };

    Json(response)
}

/// PUT /segments/:id
pub async fn update_segment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(segment_id): Path<String>,
    Json(body): Json<UpdateSegmentRequest>,
) -> Json<ApiResponse<Segment>> {
    let response = match state
        .segmentation_service
        .update_segment(&segment_id, user.organization_id(), body)
        .await
    {
        Ok(Some(segment)) => ApiResponse::success(segment, "Segment updated successfully"),
        Ok(None) => ApiResponse::error("Segment not found"),
        Err(err) => ApiResponse::error(
            err.envelope_message("An error occurred while updating the segment"),
        ),
    };

    Json(response)
}

/// DELETE /segments/:id
pub async fn delete_segment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(segment_id): Path<String>,
) -> Json<ApiResponse<bool>> {
    let response = match state
        .segmentation_service
        .delete_segment(&segment_id, user.organization_id())
        .await
    {
        Ok(deleted) => {
            let message = if deleted {
                "Segment deleted successfully"
            } else {
                "Segment not found or already deleted"
            };
            ApiResponse::success(deleted, message)
        }
        Err(err) => ApiResponse::error_with(
            false,
            err.envelope_message("An error occurred while deleting the segment"),
        ),
    };

    Json(response)
}

/// GET /segments
pub async fn list_segments(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Json<ApiResponse<Vec<Segment>>> {
    let response = match state
        .segmentation_service
        .list_segments(user.organization_id())
        .await
    {
        Ok(segments) => ApiResponse::success(segments, "Segments retrieved successfully"),
        Err(err) => ApiResponse::error(
            err.envelope_message("An error occurred while retrieving segments"),
        ),
    };

    Json(response)
}

/// GET /segments/:id/entities
pub async fn get_entities_in_segment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(segment_id): Path<String>,
) -> Json<ApiResponse<Vec<String>>> {
    let response = match state
        .segmentation_service
        .get_entities_in_segment(&segment_id, user.organization_id())
        .await
    {
        Ok(entities) => {
            ApiResponse::success(entities, "Entities in segment retrieved successfully")
        }
        Err(err) => ApiResponse::error(
            err.envelope_message("An error occurred while retrieving entities in the segment"),
        ),
    };

    Json(response)
}

/// GET /segments/:id/analytics
pub async fn get_segment_analytics(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(segment_id): Path<String>,
) -> Json<ApiResponse<SegmentAnalytics>> {
    let response = match state
        .segmentation_service
        .get_segment_analytics(&segment_id, user.organization_id())
        .await
    {
        Ok(analytics) => {
            ApiResponse::success(analytics, "Segment analytics retrieved successfully")
        }
        Err(err) => ApiResponse::error(
            err.envelope_message("An error occurred while retrieving segment analytics"),
        ),
    };

    Json(response)
}

/// GET /segments/entity/:entity_id
pub async fn get_segments_for_entity(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(entity_id): Path<String>,
) -> Json<ApiResponse<Vec<Segment>>> {
    let response = match state
        .segmentation_service
        .get_segments_for_entity(&entity_id, user.organization_id())
        .await
    {
        Ok(segments) => {
            ApiResponse::success(segments, "Segments for entity retrieved successfully")
        }
        Err(err) => ApiResponse::error(
            err.envelope_message("An error occurred while retrieving segments for the entity"),
        ),
    };

    Json(response)
}

/// POST /segments/:id/entities/:entity_id
pub async fn add_entity_to_segment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((segment_id, entity_id)): Path<(String, String)>,
) -> Json<ApiResponse<bool>> {
    let response = match state
        .segmentation_service
        .add_entity_to_segment(&segment_id, &entity_id, user.organization_id())
        .await
    {
        Ok(added) => {
            let message = if added {
                "Entity added to segment successfully"
            } else {
                "Entity is already in the segment"
            };
            ApiResponse::success(added, message)
        }
        Err(err) => ApiResponse::error(
            err.envelope_message("An error occurred while adding the entity to the segment"),
        ),
    };

    Json(response)
}

/// DELETE /segments/:id/entities/:entity_id
pub async fn remove_entity_from_segment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((segment_id, entity_id)): Path<(String, String)>,
) -> Json<ApiResponse<bool>> {
    let response = match state
        .segmentation_service
        .remove_entity_from_segment(&segment_id, &entity_id, user.organization_id())
        .await
    {
        Ok(removed) => {
            let message = if removed {
                "Entity removed from segment successfully"
            } else {
                "Entity was not in the segment"
            };
            ApiResponse::success(removed, message)
        }
        Err(err) => ApiResponse::error_with(
            false,
            err.envelope_message("An error occurred while removing the entity from the segment"),
        ),
    };

    Json(response)
}
