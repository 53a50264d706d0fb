
use anyhow::{Context, Result};
use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_bedrockruntime::primitives::Blob;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};

use super::LlmClient;
use super::anthropic::{Message, first_text_block};
use crate::config::LlmConfig;

/// Anthropic message format version expected by Bedrock's `invoke_model`
pub const BEDROCK_ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

/// Anthropic models hosted on AWS Bedrock.
///
/// Credentials come from the standard AWS provider chain. The SDK is async, so
/// each client drives its own single-threaded runtime and blocks on it.
pub struct BedrockClient {
    model_id: String,
    region: String,
    client: aws_sdk_bedrockruntime::Client,
    runtime: tokio::runtime::Runtime,
}

impl fmt::Debug for BedrockClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BedrockClient")
            .field("model_id", &self.model_id)
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct InvokeRequest<'a> {
    anthropic_version: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

impl BedrockClient {
    #[inline]
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to start runtime for the Bedrock client")?;

        let sdk_config = runtime.block_on(
            aws_config::defaults(BehaviorVersion::latest())
                .region(Region::new(config.aws_region.clone()))
                .retry_config(RetryConfig::standard().with_max_attempts(config.retry_attempts.max(1)))
                .timeout_config(
                    TimeoutConfig::builder()
                        .operation_timeout(Duration::from_secs(config.timeout_seconds))
                        .build(),
                )
                .load(),
        );

        Ok(Self {
            model_id: config.model.clone(),
            region: config.aws_region.clone(),
            client: aws_sdk_bedrockruntime::Client::new(&sdk_config),
            runtime,
        })
    }

    #[inline]
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    #[inline]
    pub fn region(&self) -> &str {
        &self.region
    }
}

/// JSON body for `invoke_model` with a single user message
fn request_body(prompt: &str, max_tokens: u32) -> Result<Vec<u8>> {
    let request = InvokeRequest {
        anthropic_version: BEDROCK_ANTHROPIC_VERSION,
        max_tokens,
        messages: vec![Message {
            role: "user",
            content: prompt,
        }],
    };
    serde_json::to_vec(&request).context("Failed to serialize Bedrock request")
}

impl LlmClient for BedrockClient {
    fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let body = request_body(prompt, max_tokens)?;

        info!(
            "Invoking {} in {} ({} prompt characters)",
            self.model_id,
            self.region,
            prompt.chars().count()
        );

        let output = self
            .runtime
            .block_on(
                self.client
                    .invoke_model()
                    .model_id(&self.model_id)
                    .content_type("application/json")
                    .accept("application/json")
                    .body(Blob::new(body))
                    .send(),
            )
            .context("Failed to invoke Bedrock model")?;

        let response_text = std::str::from_utf8(output.body().as_ref())
            .context("Bedrock response was not UTF-8")?;
        let text = first_text_block(response_text)?;

        debug!("Received {} characters of completion", text.chars().count());
        Ok(text)
    }

    fn describe(&self) -> String {
        format!("bedrock ({}, {})", self.model_id, self.region)
    }
}
