//! Content advisory module
//!
//! Asks a vision-capable language model to classify an uploaded image and
//! suggest output settings. The client is built once at startup and passed
//! into the service as a trait object so tests can substitute fakes.

pub mod anthropic;
pub mod parse;
pub mod prompts;
pub mod types;

use anyhow::Result;
use async_trait::async_trait;

pub use anthropic::AnthropicAdvisor;
pub use types::{Advice, MediaType, SuggestedSettings};

/// Vision advisory backend
#[async_trait]
pub trait ContentAdvisor: Send + Sync + 'static {
    /// Suggest settings for `image`, declared as `media_type`
    async fn advise(&self, image: &[u8], media_type: MediaType) -> Result<Advice>;

    /// Model or backend name for logs and health output
    fn name(&self) -> &str;
}
