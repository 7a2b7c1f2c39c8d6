use crate::{
    api::middleware::error::{ApiError, ApiResult},
    database::Database,
    models::{CreateTemplateRequest, Template, TemplateFilters, UpdateTemplateRequest},
};

pub const DEFAULT_LIST_LIMIT: i64 = 100;

/// Tenant-scoped CRUD over messaging templates. Every query is constrained
/// by the caller's organization id; persistence faults are re-raised with a
/// fixed operation message after logging the underlying error.
#[derive(Clone)]
pub struct TemplateService {
    db: Database,
}

impl TemplateService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn create_template(
        &self,
        organization_id: &str,
        request: CreateTemplateRequest,
    ) -> ApiResult<Template> {
        if request.name.trim().is_empty() {
            return Err(ApiError::BadRequest(
                "Template name cannot be empty".to_string(),
            ));
        }

        let template = Template::new(organization_id.to_string(), request);

        self.db.insert_template(&template).await.map_err(|e| {
            tracing::error!(code = "TEMPLATE_CREATE_ERROR", "Error creating template: {}", e);
            ApiError::Internal("Failed to create template".to_string())
        })?;

        Ok(template)
    }

    pub async fn get_template(
        &self,
        id: &str,
        organization_id: &str,
    ) -> ApiResult<Option<Template>> {
        self.db.get_template(id, organization_id).await.map_err(|e| {
            tracing::error!(code = "TEMPLATE_FETCH_ERROR", "Error fetching template: {}", e);
            ApiError::Internal("Failed to fetch template".to_string())
        })
    }

    /// Partial update; absent fields keep their current value. Returns
    /// `None` when no template with this id exists in the organization.
    pub async fn update_template(
        &self,
        id: &str,
        organization_id: &str,
        request: UpdateTemplateRequest,
    ) -> ApiResult<Option<Template>> {
        let Some(mut template) = self.get_template(id, organization_id).await? else {
            return Ok(None);
        };

        if let Some(name) = request.name {
            template.name = name;
        }
        if let Some(channel) = request.channel {
            template.channel = channel;
        }
        if let Some(subject) = request.subject {
            template.subject = Some(subject);
        }
        if let Some(content) = request.content {
            template.content = content;
        }
        if let Some(status) = request.status {
            template.status = status;
        }
        template.updated_at = chrono::Utc::now().to_rfc3339();

        let affected = self
            .db
            .update_template(id, organization_id, &template)
            .await
            .map_err(|e| {
                tracing::error!(code = "TEMPLATE_UPDATE_ERROR", "Error updating template: {}", e);
                ApiError::Internal("Failed to update template".to_string())
            })?;

        if affected == 0 {
            return Ok(None);
        }

        Ok(Some(template))
    }

    /// Idempotent delete: `true` when a row was removed, `false` when there
    /// was nothing to delete. Never a fault for an absent id.
    pub async fn delete_template(&self, id: &str, organization_id: &str) -> ApiResult<bool> {
        let affected = self
            .db
            .delete_template(id, organization_id)
            .await
            .map_err(|e| {
                tracing::error!(code = "TEMPLATE_DELETE_ERROR", "Error deleting template: {}", e);
                ApiError::Internal("Failed to delete template".to_string())
            })?;

        Ok(affected > 0)
    }

    pub async fn list_templates(
        &self,
        organization_id: &str,
        filters: TemplateFilters,
    ) -> ApiResult<Vec<Template>> {
        // Negative values would disable the cap in SQLite; treat them as unset
        let limit = filters.limit.filter(|l| *l >= 0).unwrap_or(DEFAULT_LIST_LIMIT);
        let offset = filters.offset.filter(|o| *o >= 0).unwrap_or(0);

        self.db
            .list_templates(organization_id, limit, offset, &filters)
            .await
            .map_err(|e| {
                tracing::error!(code = "TEMPLATES_FETCH_ERROR", "Error fetching templates: {}", e);
                ApiError::Internal("Failed to fetch templates".to_string())
            })
    }

    /// Fresh create from an existing template: all fields copied except
    /// identity and timestamps, name suffixed " (Copy)"
    pub async fn duplicate_template(&self, id: &str, organization_id: &str) -> ApiResult<Template> {
        let source = self
            .get_template(id, organization_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Template not found".to_string()))?;

        let copy = Template::new(
            organization_id.to_string(),
            CreateTemplateRequest {
                name: format!("{} (Copy)", source.name),
                channel: source.channel,
                subject: source.subject,
                content: source.content,
                status: Some(source.status),
            },
        );

        self.db.insert_template(&copy).await.map_err(|e| {
            tracing::error!(code = "TEMPLATE_DUPLICATE_ERROR", "Error duplicating template: {}", e);
            ApiError::Internal("Failed to duplicate template".to_string())
        })?;

        Ok(copy)
    }
}
