use sqlx::Row;

use crate::{
    api::middleware::error::ApiResult,
    database::Database,
    models::{Segment, SegmentMember},
};

impl Database {
    fn map_segment_row(row: &sqlx::any::AnyRow) -> ApiResult<Segment> {
        // Conditions are stored as a JSON text column; unparseable content
        // surfaces as absent rather than failing the whole read
        let conditions = row
            .try_get::<String, _>("conditions")
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok());

        Ok(Segment {
            id: row.try_get("id")?,
            organization_id: row.try_get("organization_id")?,
            name: row.try_get("name")?,
            description: row.try_get("description").ok(),
            conditions,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    pub async fn insert_segment(&self, segment: &Segment) -> ApiResult<()> {
        let conditions = segment.conditions.as_ref().map(|c| c.to_string());

        sqlx::query(
            "INSERT INTO segments (id, organization_id, name, description, conditions, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&segment.id)
        .bind(&segment.organization_id)
        .bind(&segment.name)
        .bind(segment.description.as_deref())
        .bind(conditions)
        .bind(&segment.created_at)
        .bind(&segment.updated_at)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    pub async fn get_segment(&self, id: &str, organization_id: &str) -> ApiResult<Option<Segment>> {
        let row = sqlx::query(
            "SELECT id, organization_id, name, description, conditions, created_at, updated_at
             FROM segments
             WHERE id = ? AND organization_id = ?",
        )
        .bind(id)
        .bind(organization_id)
        .fetch_optional(self.pool())
        .await?;

        match row {
            Some(row) => Ok(Some(Self::map_segment_row(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn update_segment(
        &self,
        id: &str,
        organization_id: &str,
        segment: &Segment,
    ) -> ApiResult<u64> {
        let conditions = segment.conditions.as_ref().map(|c| c.to_string());

        let result = sqlx::query(
            "UPDATE segments
             SET name = ?, description = ?, conditions = ?, updated_at = ?
             WHERE id = ? AND organization_id = ?",
        )
        .bind(&segment.name)
        .bind(segment.description.as_deref())
        .bind(conditions)
        .bind(&segment.updated_at)
        .bind(id)
        .bind(organization_id)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete_segment(&self, id: &str, organization_id: &str) -> ApiResult<u64> {
        let result = sqlx::query("DELETE FROM segments WHERE id = ? AND organization_id = ?")
            .bind(id)
            .bind(organization_id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn list_segments(&self, organization_id: &str) -> ApiResult<Vec<Segment>> {
        let rows = sqlx::query(
            "SELECT id, organization_id, name, description, conditions, created_at, updated_at
             FROM segments
             WHERE organization_id = ?
             ORDER BY updated_at DESC",
        )
        .bind(organization_id)
        .fetch_all(self.pool())
        .await?;

        let mut segments = Vec::new();
        for row in rows {
            segments.push(Self::map_segment_row(&row)?);
        }

        Ok(segments)
    }

    // Membership operations
    pub async fn insert_segment_member(&self, member: &SegmentMember) -> ApiResult<()> {
        sqlx::query(
            "INSERT INTO segment_members (segment_id, entity_id, organization_id, added_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(&member.segment_id)
        .bind(&member.entity_id)
        .bind(&member.organization_id)
        .bind(&member.added_at)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    pub async fn delete_segment_member(
        &self,
        segment_id: &str,
        entity_id: &str,
        organization_id: &str,
    ) -> ApiResult<u64> {
        let result = sqlx::query(
            "DELETE FROM segment_members
             WHERE segment_id = ? AND entity_id = ? AND organization_id = ?",
        )
        .bind(segment_id)
        .bind(entity_id)
        .bind(organization_id)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn list_segment_entities(
        &self,
        segment_id: &str,
        organization_id: &str,
    ) -> ApiResult<Vec<String>> {
        let rows = sqlx::query(
            "SELECT entity_id
             FROM segment_members
             WHERE segment_id = ? AND organization_id = ?
             ORDER BY added_at ASC, entity_id ASC",
        )
        .bind(segment_id)
        .bind(organization_id)
        .fetch_all(self.pool())
        .await?;

        let mut entities = Vec::new();
        for row in rows {
            entities.push(row.try_get("entity_id")?);
        }

        Ok(entities)
    }

    pub async fn count_segment_members(
        &self,
        segment_id: &str,
        organization_id: &str,
    ) -> ApiResult<(i64, Option<String>)> {
        let row = sqlx::query(
            "SELECT COUNT(*) as count, MAX(added_at) as last_added
             FROM segment_members
             WHERE segment_id = ? AND organization_id = ?",
        )
        .bind(segment_id)
        .bind(organization_id)
        .fetch_one(self.pool())
        .await?;

        let count: i64 = row.try_get("count")?;
        let last_added: Option<String> = row.try_get("last_added").ok();

        Ok((count, last_added))
    }

    pub async fn list_segments_for_entity(
        &self,
        entity_id: &str,
        organization_id: &str,
    ) -> ApiResult<Vec<Segment>> {
        let rows = sqlx::query(
            "SELECT s.id, s.organization_id, s.name, s.description, s.conditions, s.created_at, s.updated_at
             FROM segments s
             INNER JOIN segment_members sm ON sm.segment_id = s.id
             WHERE sm.entity_id = ? AND s.organization_id = ? AND sm.organization_id = ?
             ORDER BY s.updated_at DESC",
        )
        .bind(entity_id)
        .bind(organization_id)
        .bind(organization_id)
        .fetch_all(self.pool())
        .await?;

        let mut segments = Vec::new();
        for row in rows {
            segments.push(Self::map_segment_row(&row)?);
        }

        Ok(segments)
    }
}
