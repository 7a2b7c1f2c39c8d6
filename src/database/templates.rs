use sqlx::Row;

use crate::{
    api::middleware::error::ApiResult,
    database::Database,
    models::{ChannelType, Template, TemplateFilters, TemplateStatus},
};

impl Database {
    fn map_template_row(row: &sqlx::any::AnyRow) -> ApiResult<Template> {
        let channel: String = row.try_get("channel")?;
        let status: String = row.try_get("status")?;

        Ok(Template {
            id: row.try_get("id")?,
            organization_id: row.try_get("organization_id")?,
            name: row.try_get("name")?,
            channel: channel.parse().unwrap_or(ChannelType::Email),
            subject: row.try_get("subject").ok(),
            content: row.try_get("content")?,
            status: status.parse().unwrap_or(TemplateStatus::Draft),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    pub async fn insert_template(&self, template: &Template) -> ApiResult<()> {
        sqlx::query(
            "INSERT INTO templates (id, organization_id, name, channel, subject, content, status, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&template.id)
        .bind(&template.organization_id)
        .bind(&template.name)
        .bind(template.channel.as_str())
        .bind(template.subject.as_deref())
        .bind(&template.content)
        .bind(template.status.as_str())
        .bind(&template.created_at)
        .bind(&template.updated_at)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    pub async fn get_template(&self, id: &str, organization_id: &str) -> ApiResult<Option<Template>> {
        let row = sqlx::query(
            "SELECT id, organization_id, name, channel, subject, content, status, created_at, updated_at
             FROM templates
             WHERE id = ? AND organization_id = ?",
        )
        .bind(id)
        .bind(organization_id)
        .fetch_optional(self.pool())
        .await?;

        match row {
            Some(row) => Ok(Some(Self::map_template_row(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn update_template(
        &self,
        id: &str,
        organization_id: &str,
        template: &Template,
    ) -> ApiResult<u64> {
        let result = sqlx::query(
            "UPDATE templates
             SET name = ?, channel = ?, subject = ?, content = ?, status = ?, updated_at = ?
             WHERE id = ? AND organization_id = ?",
        )
        .bind(&template.name)
        .bind(template.channel.as_str())
        .bind(template.subject.as_deref())
        .bind(&template.content)
        .bind(template.status.as_str())
        .bind(&template.updated_at)
        .bind(id)
        .bind(organization_id)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete_template(&self, id: &str, organization_id: &str) -> ApiResult<u64> {
        let result = sqlx::query("DELETE FROM templates WHERE id = ? AND organization_id = ?")
            .bind(id)
            .bind(organization_id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected())
    }

    /// List templates for one organization, most recently updated first.
    /// Optional filters are ANDed against the tenant filter.
    pub async fn list_templates(
        &self,
        organization_id: &str,
        limit: i64,
        offset: i64,
        filters: &TemplateFilters,
    ) -> ApiResult<Vec<Template>> {
        let mut query = String::from(
            "SELECT id, organization_id, name, channel, subject, content, status, created_at, updated_at
             FROM templates
             WHERE organization_id = ?",
        );

        if filters.channel.is_some() {
            query.push_str(" AND channel = ?");
        }
        if filters.status.is_some() {
            query.push_str(" AND status = ?");
        }
        if filters.search.is_some() {
            query.push_str(
                " AND (LOWER(name) LIKE ? ESCAPE '\\' OR LOWER(content) LIKE ? ESCAPE '\\')",
            );
        }

        query.push_str(" ORDER BY updated_at DESC LIMIT ? OFFSET ?");

        let mut sql_query = sqlx::query(&query).bind(organization_id);

        if let Some(channel) = filters.channel {
            sql_query = sql_query.bind(channel.as_str());
        }
        if let Some(status) = filters.status {
            sql_query = sql_query.bind(status.as_str());
        }
        if let Some(search) = &filters.search {
            // The search term is literal text, not a pattern
            let escaped = search
                .to_lowercase()
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_");
            let pattern = format!("%{}%", escaped);
            sql_query = sql_query.bind(pattern.clone()).bind(pattern);
        }

        sql_query = sql_query.bind(limit).bind(offset);

        let rows = sql_query.fetch_all(self.pool()).await?;

        let mut templates = Vec::new();
        for row in rows {
            templates.push(Self::map_template_row(&row)?);
        }

        Ok(templates)
    }
}
