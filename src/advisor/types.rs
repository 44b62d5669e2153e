//! Advisory types

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Image media types accepted by the vision API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MediaType {
    #[serde(rename = "image/jpeg")]
    Jpeg,
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/gif")]
    Gif,
    #[serde(rename = "image/webp")]
    Webp,
}

impl MediaType {
    /// Map a declared upload MIME type onto a supported media type.
    /// Unknown or missing types are sent as JPEG.
    pub fn normalize(declared: Option<&str>) -> Self {
        let declared = declared.unwrap_or_default().to_ascii_lowercase();

        if declared.contains("jpeg") || declared.contains("jpg") {
            MediaType::Jpeg
        } else if declared.contains("png") {
            MediaType::Png
        } else if declared.contains("gif") {
            MediaType::Gif
        } else if declared.contains("webp") {
            MediaType::Webp
        } else {
            MediaType::Jpeg
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Jpeg => "image/jpeg",
            MediaType::Png => "image/png",
            MediaType::Gif => "image/gif",
            MediaType::Webp => "image/webp",
        }
    }
}

/// Parameters the model suggests. Every field is optional since the model
/// output is free text coerced into JSON.
///
/// Only `width`/`height` are ever applied, so they are the only strictly
/// typed fields. The rest fall back to their default on any odd value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SuggestedSettings {
    pub width: Option<u32>,
    pub height: Option<u32>,
    #[serde(deserialize_with = "lenient")]
    pub quality: Option<u8>,
    #[serde(deserialize_with = "lenient")]
    pub format: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub color_mode: Option<String>,
}

/// Parsed advisory response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Advice {
    #[serde(deserialize_with = "lenient")]
    pub content_type: String,
    pub suggested_settings: SuggestedSettings,
    #[serde(deserialize_with = "lenient")]
    pub reason: String,
}

/// Accept any JSON value, keeping it only if it has the expected type
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_media_type() {
        assert_eq!(MediaType::normalize(Some("image/JPG")), MediaType::Jpeg);
        assert_eq!(MediaType::normalize(Some("image/pjpeg")), MediaType::Jpeg);
        assert_eq!(MediaType::normalize(Some("image/png")), MediaType::Png);
        assert_eq!(MediaType::normalize(Some("image/gif")), MediaType::Gif);
        assert_eq!(MediaType::normalize(Some("image/webp")), MediaType::Webp);
        assert_eq!(MediaType::normalize(Some("image/heic")), MediaType::Jpeg);
        assert_eq!(MediaType::normalize(Some("")), MediaType::Jpeg);
        assert_eq!(MediaType::normalize(None), MediaType::Jpeg);
    }

    #[test]
    fn test_media_type_serializes_as_mime() {
        let json = serde_json::to_string(&MediaType::Webp).unwrap();
        assert_eq!(json, "\"image/webp\"");
    }
}
