//! Prompts for the image advisory call.
//!
//! The response shape requested here must stay in sync with
//! [`super::types::Advice`].

/// System prompt demanding a strict JSON reply
pub const SYSTEM_PROMPT: &str = r#"You are a professional image analysis assistant. Analyze the image the user uploads and recommend the best processing settings for its content.

Reply with JSON in exactly this shape and nothing else:
{
  "contentType": "main content category of the image (portrait, landscape, product, document, ...)",
  "suggestedSettings": {
    "width": suggested width in pixels,
    "height": suggested height in pixels,
    "quality": suggested quality (1-100),
    "format": "suggested format (jpeg/png/webp)",
    "colorMode": "suggested color mode (rgb/grayscale/cmyk)"
  },
  "reason": "why these settings suit this image"
}"#;

/// User turn sent alongside the image
pub const USER_INSTRUCTION: &str =
    "Analyze this image and recommend the best processing settings. Return JSON only, with no other text.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_names_every_advice_field() {
        for key in ["contentType", "suggestedSettings", "width", "height", "quality", "format", "colorMode", "reason"] {
            assert!(SYSTEM_PROMPT.contains(key), "missing {}", key);
        }
    }
}
