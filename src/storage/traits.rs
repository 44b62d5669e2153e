//! Storage abstraction traits
//!
//! Defines the interface for conversion history persistence.
//! Implementations can be swapped between SQLite and the no-op store.

use async_trait::async_trait;
use anyhow::Result;

/// Longest original file name kept in the history table
pub const MAX_NAME_LEN: usize = 255;

/// A conversion to be recorded
#[derive(Debug, Clone)]
pub struct NewImageRecord {
    pub original_name: String,
    /// Resulting data URL
    pub processed_url: String,
    /// Applied settings serialized as JSON
    pub settings: String,
}

impl NewImageRecord {
    pub fn new(original_name: &str, processed_url: String, settings: String) -> Self {
        Self {
            original_name: original_name.chars().take(MAX_NAME_LEN).collect(),
            processed_url,
            settings,
        }
    }
}

/// A stored conversion record
#[derive(Debug, Clone)]
pub struct ImageRecord {
    /// Unique record ID (UUID)
    pub id: String,
    pub original_name: String,
    pub processed_url: String,
    /// Settings as JSON text
    pub settings: String,
    /// Creation timestamp, Unix milliseconds
    pub created_at: i64,
}

impl ImageRecord {
    /// Build a record from a new one with a fresh ID and timestamp
    pub fn from_new(record: &NewImageRecord) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            original_name: record.original_name.clone(),
            processed_url: record.processed_url.clone(),
            settings: record.settings.clone(),
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Image history storage trait
/// Implementations must be thread-safe and async-compatible
#[async_trait]
pub trait ImageStore: Send + Sync + 'static {
    /// Persist a conversion record
    async fn save_record(&self, record: &NewImageRecord) -> Result<ImageRecord>;

    /// Most recent records, newest first
    async fn recent_records(&self, limit: i64) -> Result<Vec<ImageRecord>>;

    /// Backend name for health output
    fn backend_name(&self) -> &'static str;
}
