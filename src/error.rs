// Shared error response body for the API

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Consistent error response structure
///
/// Every error returned by the API serializes to this shape, giving both a
/// machine-readable `error_code` and a human-readable `message`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g., "EMAIL_IN_USE", "NOT_FOUND")
    pub error_code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details (e.g., field-level validation errors)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,

    /// ISO 8601 timestamp of when the error occurred
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_code: &str, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.to_string(),
            message: message.into(),
            details: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}
