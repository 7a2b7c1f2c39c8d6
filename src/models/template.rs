use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelType {
    Email,
    Sms,
    Push,
}

impl ChannelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelType::Email => "email",
            ChannelType::Sms => "sms",
            ChannelType::Push => "push",
        }
    }
}

impl std::str::FromStr for ChannelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "email" => Ok(ChannelType::Email),
            "sms" => Ok(ChannelType::Sms),
            "push" => Ok(ChannelType::Push),
            _ => Err(format!("Invalid channel type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateStatus {
    Draft,
    Active,
    Archived,
}

impl TemplateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateStatus::Draft => "draft",
            TemplateStatus::Active => "active",
            TemplateStatus::Archived => "archived",
        }
    }
}

impl std::str::FromStr for TemplateStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(TemplateStatus::Draft),
            "active" => Ok(TemplateStatus::Active),
            "archived" => Ok(TemplateStatus::Archived),
            _ => Err(format!("Invalid template status: {}", s)),
        }
    }
}

/// Messaging template scoped to one organization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub organization_id: String,
    pub name: String,
    pub channel: ChannelType,
    pub subject: Option<String>,
    pub content: String,
    pub status: TemplateStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl Template {
    pub fn new(organization_id: String, request: CreateTemplateRequest) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            organization_id,
            name: request.name,
            channel: request.channel,
            subject: request.subject,
            content: request.content,
            status: request.status.unwrap_or(TemplateStatus::Draft),
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

// ========== DTOs ==========

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTemplateRequest {
    pub name: String,
    pub channel: ChannelType,
    pub subject: Option<String>,
    pub content: String,
    pub status: Option<TemplateStatus>,
}

/// Partial update; absent fields keep their current value. A JSON `null` is
/// indistinguishable from an absent field here, so `subject` cannot be
/// cleared back to null through this request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTemplateRequest {
    pub name: Option<String>,
    pub channel: Option<ChannelType>,
    pub subject: Option<String>,
    pub content: Option<String>,
    pub status: Option<TemplateStatus>,
}

/// Listing filters, ANDed against the tenant filter
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplateFilters {
    pub channel: Option<ChannelType>,
    pub status: Option<TemplateStatus>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
