//! Service layer types

use serde::{Deserialize, Serialize};

/// Dimensions used when neither the caller nor the advisor picked one
pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 600;
pub const DEFAULT_QUALITY: u8 = 85;

/// Largest accepted output side, from the caller or the advisor
pub const MAX_DIMENSION: u32 = 8192;

/// Output encoding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
    Webp,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Png => "png",
            OutputFormat::Webp => "webp",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::Webp => "image/webp",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Rgb,
    Grayscale,
    /// Approximate print colorspace pass; output stays RGB-encoded
    Cmyk,
}

/// Caller-requested conversion settings.
///
/// `width`/`height` are `None` when the caller left them unset; only unset
/// dimensions are filled from the advisor's suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageSettings {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub quality: u8,
    pub format: OutputFormat,
    pub color_mode: ColorMode,
    pub maintain_aspect_ratio: bool,
    pub allow_enlargement: bool,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            quality: DEFAULT_QUALITY,
            format: OutputFormat::default(),
            color_mode: ColorMode::default(),
            maintain_aspect_ratio: false,
            allow_enlargement: true,
        }
    }
}

impl ImageSettings {
    /// Check ranges the type system does not cover
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [("width", self.width), ("height", self.height)] {
            if let Some(value) = value {
                if !is_valid_dimension(value) {
                    return Err(format!(
                        "{} must be between 1 and {}, got {}",
                        name, MAX_DIMENSION, value
                    ));
                }
            }
        }
        if !(1..=100).contains(&self.quality) {
            return Err(format!("quality must be between 1 and 100, got {}", self.quality));
        }
        Ok(())
    }

    pub fn has_unset_dimensions(&self) -> bool {
        self.width.is_none() || self.height.is_none()
    }

    /// Fix the target box, falling back to the service defaults
    pub fn resolve(&self) -> TargetSettings {
        TargetSettings {
            width: self.width.unwrap_or(DEFAULT_WIDTH),
            height: self.height.unwrap_or(DEFAULT_HEIGHT),
            quality: self.quality,
            format: self.format,
            color_mode: self.color_mode,
            maintain_aspect_ratio: self.maintain_aspect_ratio,
            allow_enlargement: self.allow_enlargement,
        }
    }
}

pub fn is_valid_dimension(value: u32) -> bool {
    (1..=MAX_DIMENSION).contains(&value)
}

/// Fully resolved settings handed to the transform engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetSettings {
    pub width: u32,
    pub height: u32,
    pub quality: u8,
    pub format: OutputFormat,
    pub color_mode: ColorMode,
    pub maintain_aspect_ratio: bool,
    pub allow_enlargement: bool,
}

/// Settings actually applied, with the real pixel size of the output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedSettings {
    #[serde(flatten)]
    pub target: TargetSettings,
    pub actual_width: u32,
    pub actual_height: u32,
}

/// What happened in the advisory step
#[derive(Debug, Clone, PartialEq)]
pub enum AdviceOutcome {
    /// Suggested dimensions were applied to unset fields
    Applied { width: Option<u32>, height: Option<u32> },
    /// Advice was obtained but the caller had set both dimensions
    NotNeeded,
    /// No advisor configured
    Skipped,
    /// The advisor call or its response failed; caller settings were kept
    Failed(String),
}

/// Result of a single conversion request
#[derive(Debug, Clone)]
pub struct ConversionOutcome {
    pub data_url: String,
    pub settings: AppliedSettings,
    pub advice: AdviceOutcome,
    pub persisted: bool,
}

/// An uploaded image as received from the client
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub data: Vec<u8>,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
}
