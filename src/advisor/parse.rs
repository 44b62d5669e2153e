//! Pull the advice JSON out of free-text model output

use anyhow::{Context, Result};

use super::types::Advice;

/// Slice from the first `{` to the last `}`, the span a greedy
/// `\{[\s\S]*\}` match would return.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

pub fn parse_advice(text: &str) -> Result<Advice> {
    let json = extract_json_object(text).context("No JSON object in advisory response")?;
    let advice: Advice =
        serde_json::from_str(json).context("Advisory response JSON did not match the expected shape")?;
    Ok(advice)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_from_chatter() {
        let text = "Sure! Here it is:\n```json\n{\"a\": {\"b\": 1}}\n```\nHope that helps.";
        assert_eq!(extract_json_object(text), Some("{\"a\": {\"b\": 1}}"));
    }

    #[test]
    fn test_extract_none() {
        assert_eq!(extract_json_object("no json here"), None);
        assert_eq!(extract_json_object("} backwards {"), None);
    }

    #[test]
    fn test_parse_full_advice() {
        let text = r#"{
            "contentType": "landscape",
            "suggestedSettings": {"width": 1920, "height": 1080, "quality": 82, "format": "webp", "colorMode": "rgb"},
            "reason": "wide scenic shot"
        }"#;
        let advice = parse_advice(text).unwrap();

        assert_eq!(advice.content_type, "landscape");
        assert_eq!(advice.suggested_settings.width, Some(1920));
        assert_eq!(advice.suggested_settings.height, Some(1080));
        assert_eq!(advice.suggested_settings.format.as_deref(), Some("webp"));
    }

    #[test]
    fn test_parse_partial_advice() {
        let advice = parse_advice(r#"{"suggestedSettings": {"width": 640}}"#).unwrap();
        assert_eq!(advice.suggested_settings.width, Some(640));
        assert_eq!(advice.suggested_settings.height, None);
        assert!(advice.reason.is_empty());
    }

    #[test]
    fn test_odd_extra_fields_keep_dimensions() {
        let advice = parse_advice(
            r#"{"contentType": 7, "suggestedSettings": {"width": 1200, "height": 800, "quality": 0.85, "colorMode": null}, "reason": null}"#,
        )
        .unwrap();

        assert_eq!(advice.suggested_settings.width, Some(1200));
        assert_eq!(advice.suggested_settings.height, Some(800));
        assert_eq!(advice.suggested_settings.quality, None);
        assert_eq!(advice.suggested_settings.color_mode, None);
        assert!(advice.content_type.is_empty());
        assert!(advice.reason.is_empty());
    }

    #[test]
    fn test_out_of_range_quality_ignored() {
        let advice =
            parse_advice(r#"{"suggestedSettings": {"width": 640, "height": 480, "quality": 300}, "reason": "ok"}"#)
                .unwrap();
        assert_eq!(advice.suggested_settings.quality, None);
        assert_eq!(advice.suggested_settings.width, Some(640));
        assert_eq!(advice.reason, "ok");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(parse_advice("I cannot help with that.").is_err());
        assert!(parse_advice(r#"{"suggestedSettings": {"width": "wide"}}"#).is_err());
    }
}
