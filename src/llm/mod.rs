// LLM module
// Prompt-in, text-out clients used by the lineage analyzer

pub mod anthropic;
pub mod bedrock;


use anyhow::Result;
use tracing::{info, warn};

use crate::config::{LlmConfig, LlmProvider};

pub use anthropic::AnthropicClient;
pub use bedrock::BedrockClient;

/// Text returned when no provider is configured
pub const LLM_UNAVAILABLE_MESSAGE: &str = "LLM not available - configure an LLM provider";

/// A language model that completes a single user prompt
pub trait LlmClient: Send + Sync {
    /// Completion text for `prompt`, at most `max_tokens` long
    fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String>;

    /// Short description for logs and CLI output
    fn describe(&self) -> String;
}

/// Stand-in used when no provider is usable; always answers with [`LLM_UNAVAILABLE_MESSAGE`]
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledClient;

impl LlmClient for DisabledClient {
    fn complete(&self, _prompt: &str, _max_tokens: u32) -> Result<String> {
        Ok(LLM_UNAVAILABLE_MESSAGE.to_string())
    }

    fn describe(&self) -> String {
        "disabled".to_string()
    }
}

/// Client for the configured provider.
///
/// Falls back to [`DisabledClient`] when the provider is disabled or the
/// Anthropic API key variable is not set. Bedrock resolves AWS credentials
/// lazily, on the first request.
#[inline]
pub fn client_from_config(config: &LlmConfig) -> Result<Box<dyn LlmClient>> {
    match config.provider {
        LlmProvider::Disabled => {
            info!("LLM provider disabled");
            Ok(Box::new(DisabledClient))
        }
        LlmProvider::Bedrock => Ok(Box::new(BedrockClient::new(config)?)),
        LlmProvider::Anthropic => match config.api_key() {
            Some(api_key) => Ok(Box::new(AnthropicClient::new(config, api_key)?)),
            None => {
                warn!(
                    "{} is not set, lineage analysis will run without an LLM",
                    config.api_key_env
                );
                Ok(Box::new(DisabledClient))
            }
        },
    }
}
