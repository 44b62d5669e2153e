//! Conversion Service - Core business logic
//!
//! Orchestrates the advisory call, the image transform, and history storage.
//! The advisory and storage steps are best-effort: their failures are logged
//! and reported in the outcome, never returned as errors.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::{info, warn};

use crate::advisor::{ContentAdvisor, MediaType};
use crate::engine::{self, to_data_url};
use crate::storage::{ImageRecord, ImageStore, NewImageRecord};

use super::types::*;

/// Hard cap on history page size
pub const MAX_HISTORY_LIMIT: i64 = 100;

/// Name recorded when the upload carries no file name
const UNNAMED_UPLOAD: &str = "upload";

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("No image file provided")]
    MissingImage,

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Failed to process image")]
    Processing(#[source] anyhow::Error),
}

impl ConversionError {
    /// True for errors caused by the request rather than the server
    pub fn is_client_error(&self) -> bool {
        matches!(self, ConversionError::MissingImage | ConversionError::InvalidSettings(_))
    }

    /// Diagnostic chain for processing failures
    pub fn details(&self) -> Option<String> {
        match self {
            ConversionError::Processing(e) => Some(format!("{:#}", e)),
            _ => None,
        }
    }
}

/// Image conversion service
pub struct ConversionService {
    advisor: Option<Arc<dyn ContentAdvisor>>,
    storage: Arc<dyn ImageStore>,
    history_limit: i64,
}

impl ConversionService {
    /// Create a new conversion service
    pub fn new(
        advisor: Option<Arc<dyn ContentAdvisor>>,
        storage: Arc<dyn ImageStore>,
        history_limit: i64,
    ) -> Self {
        Self {
            advisor,
            storage,
            history_limit: history_limit.clamp(1, MAX_HISTORY_LIMIT),
        }
    }

    pub fn advisor_configured(&self) -> bool {
        self.advisor.is_some()
    }

    pub fn advisor_name(&self) -> Option<&str> {
        self.advisor.as_ref().map(|a| a.name())
    }

    pub fn storage_backend(&self) -> &'static str {
        self.storage.backend_name()
    }

    /// Convert an upload according to `settings`
    pub async fn convert(
        &self,
        upload: Option<ImageUpload>,
        mut settings: ImageSettings,
    ) -> Result<ConversionOutcome, ConversionError> {
        let start = Instant::now();

        let upload = upload
            .filter(|u| !u.data.is_empty())
            .ok_or(ConversionError::MissingImage)?;
        settings.validate().map_err(ConversionError::InvalidSettings)?;

        let advice = self.advise(&upload, &mut settings).await;

        let target = settings.resolve();
        let data = upload.data;
        let transformed = tokio::task::spawn_blocking(move || engine::transform(&data, &target))
            .await
            .context("Transform task panicked")
            .and_then(|r| r)
            .map_err(ConversionError::Processing)?;

        let data_url = to_data_url(&transformed.data, target.format);
        let applied = AppliedSettings {
            target,
            actual_width: transformed.width,
            actual_height: transformed.height,
        };

        let original_name = upload.file_name.as_deref().unwrap_or(UNNAMED_UPLOAD);
        let persisted = match self.persist(original_name, &data_url, &applied).await {
            Ok(record) => {
                info!("Saved history record {}", record.id);
                true
            }
            Err(e) => {
                warn!("Skipping history record: {:#}", e);
                false
            }
        };

        info!(
            "Converted {} to {} {}x{} in {}ms",
            original_name,
            target.format.as_str(),
            applied.actual_width,
            applied.actual_height,
            start.elapsed().as_millis()
        );

        Ok(ConversionOutcome {
            data_url,
            settings: applied,
            advice,
            persisted,
        })
    }

    /// Ask the advisor and fill unset dimensions from its suggestion
    async fn advise(&self, upload: &ImageUpload, settings: &mut ImageSettings) -> AdviceOutcome {
        let Some(advisor) = &self.advisor else {
            return AdviceOutcome::Skipped;
        };

        let media_type = MediaType::normalize(upload.content_type.as_deref());
        let advice = match advisor.advise(&upload.data, media_type).await {
            Ok(advice) => advice,
            Err(e) => {
                warn!("Advisory step failed, keeping caller settings: {:#}", e);
                return AdviceOutcome::Failed(format!("{:#}", e));
            }
        };

        if !settings.has_unset_dimensions() {
            return AdviceOutcome::NotNeeded;
        }

        let suggested = &advice.suggested_settings;
        let width = settings
            .width
            .is_none()
            .then_some(suggested.width)
            .flatten()
            .filter(|w| is_valid_dimension(*w));
        let height = settings
            .height
            .is_none()
            .then_some(suggested.height)
            .flatten()
            .filter(|h| is_valid_dimension(*h));

        if width.is_none() && height.is_none() {
            warn!("Ignoring unusable suggested dimensions {:?}x{:?}", suggested.width, suggested.height);
            return AdviceOutcome::NotNeeded;
        }

        settings.width = settings.width.or(width);
        settings.height = settings.height.or(height);
        info!("Applied suggested dimensions {:?}x{:?}", width, height);

        AdviceOutcome::Applied { width, height }
    }

    async fn persist(
        &self,
        original_name: &str,
        data_url: &str,
        applied: &AppliedSettings,
    ) -> Result<ImageRecord> {
        let settings = serde_json::to_string(applied).context("Failed to serialize settings")?;
        let record = NewImageRecord::new(original_name, data_url.to_string(), settings);
        self.storage.save_record(&record).await
    }

    /// Most recent conversions, newest first
    pub async fn history(&self, limit: Option<i64>) -> Result<Vec<ImageRecord>> {
        let limit = limit.unwrap_or(self.history_limit).clamp(1, MAX_HISTORY_LIMIT);
        self.storage.recent_records(limit).await
    }
}
