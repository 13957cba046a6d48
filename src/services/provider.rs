//! Adapters that let any edgequake-llm provider back an audit stage.
//!
//! The provider carries its own authentication (usually read by
//! `ProviderFactory` from the provider's environment variable), so the
//! per-call key is not forwarded and the orchestrator does not ask for it.

use crate::config::ApiKey;
use crate::error::{AuditError, ServiceError};
use crate::pipeline::encode;
use crate::pipeline::input::UploadedImage;
use crate::services::{ServiceReply, TextService, VisionService};
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::sync::Arc;
use tracing::debug;

/// Instantiate a named provider with the given model.
pub fn create_provider(
    provider_name: &str,
    model: &str,
) -> Result<Arc<dyn LLMProvider>, AuditError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        AuditError::InvalidConfig(format!(
            "LLM provider '{provider_name}' is not configured: {e}"
        ))
    })
}

fn options(temperature: Option<f32>, max_tokens: Option<usize>) -> CompletionOptions {
    CompletionOptions {
        temperature,
        max_tokens,
        ..Default::default()
    }
}

async fn chat(
    provider: &Arc<dyn LLMProvider>,
    messages: Vec<ChatMessage>,
    options: &CompletionOptions,
) -> Result<ServiceReply, ServiceError> {
    let response = provider
        .chat(&messages, Some(options))
        .await
        .map_err(|e| ServiceError::Provider(e.to_string()))?;

    if response.content.trim().is_empty() {
        return Err(ServiceError::EmptyResponse);
    }
    debug!(
        "{} input tokens, {} output tokens",
        response.prompt_tokens, response.completion_tokens
    );
    Ok(ServiceReply {
        text: response.content,
        input_tokens: response.prompt_tokens as usize,
        output_tokens: response.completion_tokens as usize,
    })
}

/// Vision stage over an edgequake-llm provider.
pub struct ProviderVision {
    provider: Arc<dyn LLMProvider>,
    label: String,
    options: CompletionOptions,
}

impl ProviderVision {
    pub fn new(provider: Arc<dyn LLMProvider>, label: impl Into<String>) -> Self {
        Self {
            provider,
            label: label.into(),
            options: options(None, None),
        }
    }

    pub fn temperature(mut self, t: Option<f32>) -> Self {
        self.options.temperature = t;
        self
    }
}

#[async_trait]
impl VisionService for ProviderVision {
    fn name(&self) -> &str {
        &self.label
    }

    fn requires_key(&self) -> bool {
        false
    }

    async fn analyze(
        &self,
        _key: &ApiKey,
        prompt: &str,
        image: &UploadedImage,
    ) -> Result<ServiceReply, ServiceError> {
        let messages = vec![ChatMessage::user_with_images(
            prompt,
            vec![encode::to_image_data(image)],
        )];
        chat(&self.provider, messages, &self.options).await
    }
}

/// Verdict stage over an edgequake-llm provider.
pub struct ProviderText {
    provider: Arc<dyn LLMProvider>,
    label: String,
    options: CompletionOptions,
}

impl ProviderText {
    pub fn new(provider: Arc<dyn LLMProvider>, label: impl Into<String>, max_tokens: usize) -> Self {
        Self {
            provider,
            label: label.into(),
            options: options(None, Some(max_tokens)),
        }
    }

    pub fn temperature(mut self, t: Option<f32>) -> Self {
        self.options.temperature = t;
        self
    }
}

#[async_trait]
impl TextService for ProviderText {
    fn name(&self) -> &str {
        &self.label
    }

    fn requires_key(&self) -> bool {
        false
    }

    async fn complete(&self, _key: &ApiKey, prompt: &str) -> Result<ServiceReply, ServiceError> {
        let messages = vec![ChatMessage::user_with_images(prompt, Vec::new())];
        chat(&self.provider, messages, &self.options).await
    }
}
