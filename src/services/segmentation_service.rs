use crate::{
    api::middleware::error::{ApiError, ApiResult},
    database::Database,
    models::{
        CreateSegmentRequest, Segment, SegmentAnalytics, SegmentMember, UpdateSegmentRequest,
    },
};

/// SQLite reports "UNIQUE constraint failed", Postgres "duplicate key value
/// violates unique constraint"
fn is_duplicate_member(err: &ApiError) -> bool {
    let message = err.to_string().to_lowercase();
    message.contains("unique") || message.contains("duplicate key")
}

/// Tenant-scoped CRUD over audience segments plus the membership store
/// backing the derived entity/analytics views
#[derive(Clone)]
pub struct SegmentationService {
    db: Database,
}

impl SegmentationService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn create_segment(
        &self,
        organization_id: &str,
        request: CreateSegmentRequest,
    ) -> ApiResult<Segment> {
        if request.name.trim().is_empty() {
            return Err(ApiError::BadRequest(
                "Segment name cannot be empty".to_string(),
            ));
        }

        let segment = Segment::new(organization_id.to_string(), request);

        self.db.insert_segment(&segment).await.map_err(|e| {
            tracing::error!(code = "SEGMENT_CREATE_ERROR", "Error creating segment: {}", e);
            ApiError::Internal("Failed to create segment".to_string())
        })?;

        Ok(segment)
    }

    pub async fn get_segment(&self, id: &str, organization_id: &str) -> ApiResult<Option<Segment>> {
        self.db.get_segment(id, organization_id).await.map_err(|e| {
            tracing::error!(code = "SEGMENT_FETCH_ERROR", "Error fetching segment: {}", e);
            ApiError::Internal("Failed to fetch segment".to_string())
        })
    }

    pub async fn update_segment(
        &self,
        id: &str,
        organization_id: &str,
        request: UpdateSegmentRequest,
    ) -> ApiResult<Option<Segment>> {
        let Some(mut segment) = self.get_segment(id, organization_id).await? else {
            return Ok(None);
        };

        if let Some(name) = request.name {
            segment.name = name;
        }
        if let Some(description) = request.description {
            segment.description = Some(description);
        }
        if let Some(conditions) = request.conditions {
            segment.conditions = Some(conditions);
        }
        segment.updated_at = chrono::Utc::now().to_rfc3339();

        let affected = self
            .db
            .update_segment(id, organization_id, &segment)
            .await
            .map_err(|e| {
                tracing::error!(code = "SEGMENT_UPDATE_ERROR", "Error updating segment: {}", e);
                ApiError::Internal("Failed to update segment".to_string())
            })?;

        if affected == 0 {
            return Ok(None);
        }

        Ok(Some(segment))
    }

    /// Idempotent delete: `true` once, `false` thereafter, never a fault
    pub async fn delete_segment(&self, id: &str, organization_id: &str) -> ApiResult<bool> {
        let affected = self
            .db
            .delete_segment(id, organization_id)
            .await
            .map_err(|e| {
                tracing::error!(code = "SEGMENT_DELETE_ERROR", "Error deleting segment: {}", e);
                ApiError::Internal("Failed to delete segment".to_string())
            })?;

        Ok(affected > 0)
    }

    pub async fn list_segments(&self, organization_id: &str) -> ApiResult<Vec<Segment>> {
        self.db.list_segments(organization_id).await.map_err(|e| {
            tracing::error!(code = "SEGMENTS_FETCH_ERROR", "Error fetching segments: {}", e);
            ApiError::Internal("Failed to fetch segments".to_string())
        })
    }

    // ========== Membership and derived views ==========

    async fn require_segment(&self, id: &str, organization_id: &str) -> ApiResult<Segment> {
        self.get_segment(id, organization_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Segment not found".to_string()))
    }

    pub async fn get_entities_in_segment(
        &self,
        segment_id: &str,
        organization_id: &str,
    ) -> ApiResult<Vec<String>> {
        self.require_segment(segment_id, organization_id).await?;

        self.db
            .list_segment_entities(segment_id, organization_id)
            .await
            .map_err(|e| {
                tracing::error!(
                    code = "SEGMENT_ENTITIES_ERROR",
                    "Error fetching entities in segment: {}",
                    e
                );
                ApiError::Internal("Failed to fetch entities in segment".to_string())
            })
    }

    pub async fn get_segment_analytics(
        &self,
        segment_id: &str,
        organization_id: &str,
    ) -> ApiResult<SegmentAnalytics> {
        self.require_segment(segment_id, organization_id).await?;

        let (entity_count, last_membership_change) = self
            .db
            .count_segment_members(segment_id, organization_id)
            .await
            .map_err(|e| {
                tracing::error!(
                    code = "SEGMENT_ANALYTICS_ERROR",
                    "Error fetching segment analytics: {}",
                    e
                );
                ApiError::Internal("Failed to fetch segment analytics".to_string())
            })?;

        Ok(SegmentAnalytics {
            segment_id: segment_id.to_string(),
            entity_count,
            last_membership_change,
        })
    }

    pub async fn get_segments_for_entity(
        &self,
        entity_id: &str,
        organization_id: &str,
    ) -> ApiResult<Vec<Segment>> {
        self.db
            .list_segments_for_entity(entity_id, organization_id)
            .await
            .map_err(|e| {
                tracing::error!(
                    code = "ENTITY_SEGMENTS_ERROR",
                    "Error fetching segments for entity: {}",
                    e
                );
                ApiError::Internal("Failed to fetch segments for entity".to_string())
            })
    }

    /// Returns `false` when the entity is already a member (idempotent)
    pub async fn add_entity_to_segment(
        &self,
        segment_id: &str,
        entity_id: &str,
        organization_id: &str,
    ) -> ApiResult<bool> {
        self.require_segment(segment_id, organization_id).await?;

        let member = SegmentMember::new(
            segment_id.to_string(),
            entity_id.to_string(),
            organization_id.to_string(),
        );

        match self.db.insert_segment_member(&member).await {
            Ok(()) => Ok(true),
            Err(e) if is_duplicate_member(&e) => Ok(false),
            Err(e) => {
                tracing::error!(
                    code = "SEGMENT_MEMBER_ADD_ERROR",
                    "Error adding entity to segment: {}",
                    e
                );
                Err(ApiError::Internal(
                    "Failed to add entity to segment".to_string(),
                ))
            }
        }
    }

    /// Returns `false` when the entity was not a member (idempotent)
    pub async fn remove_entity_from_segment(
        &self,
        segment_id: &str,
        entity_id: &str,
        organization_id: &str,
    ) -> ApiResult<bool> {
        self.require_segment(segment_id, organization_id).await?;

        let affected = self
            .db
            .delete_segment_member(segment_id, entity_id, organization_id)
            .await
            .map_err(|e| {
                tracing::error!(
                    code = "SEGMENT_MEMBER_REMOVE_ERROR",
                    "Error removing entity from segment: {}",
                    e
                );
                ApiError::Internal("Failed to remove entity from segment".to_string())
            })?;

        Ok(affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_member_detection_covers_both_driver_messages() {
        let sqlite = ApiError::Internal(
            "Database error: UNIQUE constraint failed: segment_members.segment_id".to_string(),
        );
        assert!(is_duplicate_member(&sqlite));

        let postgres = ApiError::Internal(
            "Database error: duplicate key value violates unique constraint \
             \"segment_members_pkey\""
                .to_string(),
        );
        assert!(is_duplicate_member(&postgres));

        let unrelated = ApiError::Internal("Database error: disk I/O error".to_string());
        assert!(!is_duplicate_member(&unrelated));
    }
}
