//! Anthropic Messages API client

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::AdvisorConfig;

use super::parse::parse_advice;
use super::prompts::{SYSTEM_PROMPT, USER_INSTRUCTION};
use super::types::{Advice, MediaType};
use super::ContentAdvisor;

const API_VERSION: &str = "2023-06-01";

/// Vision advisor backed by the Anthropic Messages API
pub struct AnthropicAdvisor {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicAdvisor {
    pub fn new(config: &AdvisorConfig, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build advisory HTTP client")?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    fn build_request<'a>(&'a self, image: &[u8], media_type: MediaType) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system: SYSTEM_PROMPT,
            messages: vec![Message {
                role: "user",
                content: vec![
                    ContentBlock::Image {
                        source: ImageSource {
                            kind: "base64",
                            media_type,
                            data: STANDARD.encode(image),
                        },
                    },
                    ContentBlock::Text { text: USER_INSTRUCTION },
                ],
            }],
        }
    }
}

#[async_trait]
impl ContentAdvisor for AnthropicAdvisor {
    async fn advise(&self, image: &[u8], media_type: MediaType) -> Result<Advice> {
        let request = self.build_request(image, media_type);

        debug!(
            "Advisory request to {}/v1/messages ({}, {} bytes)",
            self.base_url,
            media_type.as_str(),
            image.len()
        );

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await
            .context("Failed to call advisory API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("Advisory API error {}: {}", status, body);
            anyhow::bail!("Advisory API returned {}: {}", status, body);
        }

        let body: MessagesResponse = response
            .json()
            .await
            .context("Failed to parse advisory API response")?;

        let text = body.first_text().context("Advisory response has no text block")?;
        let advice = parse_advice(text)?;

        info!(
            "Advisory result: {} ({:?}) - {}",
            advice.content_type, advice.suggested_settings, advice.reason
        );

        Ok(advice)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: Vec<ContentBlock<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ContentBlock<'a> {
    Image { source: ImageSource },
    Text { text: &'a str },
}

#[derive(Debug, Serialize)]
struct ImageSource {
    #[serde(rename = "type")]
    kind: &'static str,
    media_type: MediaType,
    data: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ResponseBlock>,
}

#[derive(Debug, Deserialize)]
struct ResponseBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl MessagesResponse {
    /// Only the first block is considered, matching how the reply is requested
    fn first_text(&self) -> Option<&str> {
        self.content
            .first()
            .filter(|block| block.kind == "text")
            .and_then(|block| block.text.as_deref())
    }
}
