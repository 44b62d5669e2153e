//! SQLite storage implementation

use std::path::Path;

use async_trait::async_trait;
use sqlx::{sqlite::{SqlitePool, SqlitePoolOptions}, Row};
use anyhow::{Result, Context};
use tracing::{info, debug};

use super::traits::{ImageStore, ImageRecord, NewImageRecord};

/// SQLite-based conversion history
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Create a new SQLite storage
    pub async fn new(db_path: &str) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory {:?}", parent))?;
            }
        }

        let database_url = format!("sqlite:{}?mode=rwc", db_path);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&database_url)
            .await
            .context("Failed to connect to SQLite database")?;

        let storage = Self { pool };
        storage.initialize().await?;

        Ok(storage)
    }

    /// Create the history table if absent
    async fn initialize(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS images (
                id TEXT PRIMARY KEY,
                original_name TEXT NOT NULL,
                processed_url TEXT NOT NULL,
                settings TEXT NOT NULL,
                created_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_images_created_at ON images(created_at DESC)
            "#,
        )
        .execute(&self.pool)
        .await?;

        info!("SQLite database initialized");
        Ok(())
    }
}

#[async_trait]
impl ImageStore for SqliteStorage {
    async fn save_record(&self, record: &NewImageRecord) -> Result<ImageRecord> {
        let stored = ImageRecord::from_new(record);

        sqlx::query(
            r#"
            INSERT INTO images (id, original_name, processed_url, settings, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&stored.id)
        .bind(&stored.original_name)
        .bind(&stored.processed_url)
        .bind(&stored.settings)
        .bind(stored.created_at)
        .execute(&self.pool)
        .await?;

        debug!("Saved image record: {}", stored.id);
        Ok(stored)
    }

    async fn recent_records(&self, limit: i64) -> Result<Vec<ImageRecord>> {
        // rowid breaks ties between records saved in the same millisecond
        let rows = sqlx::query(
            r#"
            SELECT id, original_name, processed_url, settings, created_at
            FROM images
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?
            "#,
        )
        .bind(limit.max(0))
        .fetch_all(&self.pool)
        .await?;

        let records: Vec<ImageRecord> = rows
            .into_iter()
            .map(|row| ImageRecord {
                id: row.get("id"),
                original_name: row.get("original_name"),
                processed_url: row.get("processed_url"),
                settings: row.get("settings"),
                created_at: row.get("created_at"),
            })
            .collect();

        Ok(records)
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(name: &str) -> NewImageRecord {
        NewImageRecord::new(
            name,
            "data:image/png;base64,AQID".to_string(),
            r#"{"width":10,"height":10}"#.to_string(),
        )
    }

    #[tokio::test]
    async fn test_sqlite_storage() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested").join("test.db");
        let storage = SqliteStorage::new(db_path.to_str().unwrap()).await.unwrap();

        // Save
        let saved = storage.save_record(&record("cat.png")).await.unwrap();
        assert_eq!(saved.original_name, "cat.png");

        // List
        let records = storage.recent_records(10).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, saved.id);
        assert_eq!(records[0].processed_url, "data:image/png;base64,AQID");
        assert_eq!(records[0].settings, r#"{"width":10,"height":10}"#);
    }

    #[tokio::test]
    async fn test_recent_records_newest_first_and_limited() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("history.db");
        let storage = SqliteStorage::new(db_path.to_str().unwrap()).await.unwrap();

        for i in 0..5 {
            storage.save_record(&record(&format!("img-{}.jpg", i))).await.unwrap();
        }

        let records = storage.recent_records(3).await.unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.original_name.as_str()).collect();
        assert_eq!(names, vec!["img-4.jpg", "img-3.jpg", "img-2.jpg"]);
        assert!(records.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[tokio::test]
    async fn test_reopen_keeps_history() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("persist.db");
        let path = db_path.to_str().unwrap();

        {
            let storage = SqliteStorage::new(path).await.unwrap();
            storage.save_record(&record("kept.webp")).await.unwrap();
        }

        let storage = SqliteStorage::new(path).await.unwrap();
        let records = storage.recent_records(20).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].original_name, "kept.webp");
    }
}
