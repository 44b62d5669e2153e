//! REST API request/response data transfer objects

use serde::{Deserialize, Serialize};

use crate::service::{AppliedSettings, ConversionOutcome};
use crate::storage::ImageRecord;

/// Process-image response
#[derive(Debug, Serialize)]
pub struct ProcessImageResponse {
    pub url: String,
    pub settings: AppliedSettings,
}

impl From<ConversionOutcome> for ProcessImageResponse {
    fn from(outcome: ConversionOutcome) -> Self {
        Self {
            url: outcome.data_url,
            settings: outcome.settings,
        }
    }
}

/// History query parameters
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

/// History response. `error` is set when the store failed and `images` is empty.
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub images: Vec<ImageRecordDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecordDto {
    pub id: String,
    pub original_name: String,
    pub processed_url: String,
    pub settings: serde_json::Value,
    /// RFC 3339
    pub created_at: String,
}

impl From<ImageRecord> for ImageRecordDto {
    fn from(record: ImageRecord) -> Self {
        let settings = serde_json::from_str(&record.settings)
            .unwrap_or(serde_json::Value::String(record.settings));
        let created_at = chrono::DateTime::from_timestamp_millis(record.created_at)
            .map(|t| t.to_rfc3339())
            .unwrap_or_default();

        Self {
            id: record.id,
            original_name: record.original_name,
            processed_url: record.processed_url,
            settings,
            created_at,
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub healthy: bool,
    pub version: String,
    pub advisor_configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisor_model: Option<String>,
    pub storage: String,
    pub uptime_seconds: u64,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: &str, code: &str) -> Self {
        Self {
            error: error.to_string(),
            code: code.to_string(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}
