//! No-op storage used when no database is available

use async_trait::async_trait;
use anyhow::Result;
use tracing::debug;

use super::traits::{ImageStore, ImageRecord, NewImageRecord};

/// Accepts writes without persisting and lists nothing
#[derive(Debug, Default)]
pub struct NullStorage;

#[async_trait]
impl ImageStore for NullStorage {
    async fn save_record(&self, record: &NewImageRecord) -> Result<ImageRecord> {
        debug!("History disabled, not saving {}", record.original_name);
        Ok(ImageRecord::from_new(record))
    }

    async fn recent_records(&self, _limit: i64) -> Result<Vec<ImageRecord>> {
        Ok(Vec::new())
    }

    fn backend_name(&self) -> &'static str {
        "disabled"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_null_storage_is_empty() {
        let storage = NullStorage;
        let saved = storage
            .save_record(&NewImageRecord::new("a.png", "data:".to_string(), "{}".to_string()))
            .await
            .unwrap();
        assert_eq!(saved.original_name, "a.png");
        assert!(storage.recent_records(20).await.unwrap().is_empty());
    }
}
