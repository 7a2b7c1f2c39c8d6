use serde::{Deserialize, Serialize};

/// Uniform response wrapper returned by every handler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: ResponseStatus,
    pub data: Option<T>,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Success,
            data: Some(data),
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            data: None,
            message: message.into(),
        }
    }

    /// Error envelope carrying an explicit payload (boolean deletes report
    /// `data: false` instead of null)
    pub fn error_with(data: T, message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            data: Some(data),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_carries_data_and_message() {
        let envelope = ApiResponse::success(42, "Answer retrieved successfully");
        assert_eq!(envelope.status, ResponseStatus::Success);
        assert_eq!(envelope.data, Some(42));
        assert_eq!(envelope.message, "Answer retrieved successfully");
    }

    #[test]
    fn error_envelope_has_null_data() {
        let envelope: ApiResponse<String> = ApiResponse::error("Segment not found");
        assert_eq!(envelope.status, ResponseStatus::Error);
        assert!(envelope.data.is_none());
    }

    #[test]
    fn status_serializes_lowercase() {
        let envelope = ApiResponse::success(true, "Deleted");
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["data"], true);

        let envelope: ApiResponse<bool> = ApiResponse::error("boom");
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["data"], serde_json::Value::Null);
    }

    #[test]
    fn delete_error_envelope_reports_false_not_null() {
        let envelope = ApiResponse::error_with(false, "An error occurred while deleting");
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["data"], false);
    }
}
