//! Gemini vision backend over the `generateContent` REST endpoint.
//!
//! The prompt and the screenshot travel in a single `user` turn: one text
//! part followed by one `inline_data` part carrying the base64 image.

use crate::config::{ApiKey, AuditConfig};
use crate::error::ServiceError;
use crate::pipeline::encode;
use crate::pipeline::input::UploadedImage;
use crate::services::{http_client, status_error, transport_error, ServiceReply, VisionService};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

/// Vision backend for Google Gemini.
#[derive(Debug, Clone)]
pub struct GeminiVision {
    client: reqwest::Client,
    base_url: String,
    model: String,
    temperature: Option<f32>,
    timeout: Duration,
}

impl GeminiVision {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ServiceError> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: base_url.into(),
            model: model.into(),
            temperature: None,
            timeout,
        })
    }

    pub fn from_config(config: &AuditConfig) -> Result<Self, ServiceError> {
        let mut backend = Self::new(
            &config.vision_base_url,
            &config.vision_model,
            config.api_timeout,
        )?;
        backend.temperature = config.temperature;
        Ok(backend)
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

/// Request body for one prompt + one inline image.
pub(crate) fn request_body(prompt: &str, image: &UploadedImage, temperature: Option<f32>) -> Value {
    let mut body = json!({
        "contents": [{
            "role": "user",
            "parts": [
                { "text": prompt },
                {
                    "inline_data": {
                        "mime_type": image.mime_type(),
                        "data": encode::to_base64(image),
                    }
                }
            ]
        }]
    });
    if let Some(t) = temperature {
        body["generationConfig"] = json!({ "temperature": t });
    }
    body
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: usize,
    #[serde(default)]
    candidates_token_count: usize,
}

/// Concatenate the text parts of the first candidate.
pub(crate) fn parse_response(body: &str) -> Result<ServiceReply, ServiceError> {
    let parsed: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| ServiceError::MalformedResponse(e.to_string()))?;

    let text: String = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(ServiceError::EmptyResponse);
    }

    let usage = parsed.usage_metadata;
    Ok(ServiceReply {
        text,
        input_tokens: usage.as_ref().map_or(0, |u| u.prompt_token_count),
        output_tokens: usage.as_ref().map_or(0, |u| u.candidates_token_count),
    })
}

#[async_trait]
impl VisionService for GeminiVision {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn analyze(
        &self,
        key: &ApiKey,
        prompt: &str,
        image: &UploadedImage,
    ) -> Result<ServiceReply, ServiceError> {
        debug!("POST {} ({} image bytes)", self.endpoint(), image.len());
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", key.expose())
            .json(&request_body(prompt, image, self.temperature))
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(e, self.timeout))?;

        if !status.is_success() {
            return Err(status_error(status.as_u16(), &body));
        }
        parse_response(&body)
    }
}
