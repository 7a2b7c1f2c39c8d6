use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Audience segment scoped to one organization. Conditions are stored as
/// opaque JSON; evaluation happens outside this service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub id: String,
    pub organization_id: String,
    pub name: String,
    pub description: Option<String>,
    pub conditions: Option<serde_json::Value>,
    pub created_at: String,
    pub updated_at: String,
}

impl Segment {
    pub fn new(organization_id: String, request: CreateSegmentRequest) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            organization_id,
            name: request.name,
            description: request.description,
            conditions: request.conditions,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// Membership row linking an entity (contact, account, ...) to a segment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentMember {
    pub segment_id: String,
    pub entity_id: String,
    pub organization_id: String,
    pub added_at: String,
}

impl SegmentMember {
    pub fn new(segment_id: String, entity_id: String, organization_id: String) -> Self {
        Self {
            segment_id,
            entity_id,
            organization_id,
            added_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Derived view over the membership store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentAnalytics {
    pub segment_id: String,
    pub entity_count: i64,
    pub last_membership_change: Option<String>,
}

// ========== DTOs ==========

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSegmentRequest {
    pub name: String,
    pub description: Option<String>,
    pub conditions: Option<serde_json::Value>,
}

/// Partial update; absent fields keep their current value. A JSON `null` is
/// indistinguishable from an absent field, so `description` and `conditions`
/// cannot be cleared back to null through this request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSegmentRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub conditions: Option<serde_json::Value>,
}
