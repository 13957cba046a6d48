//! Verdict backend for Groq's OpenAI-compatible chat-completions API.
//!
//! Works against any endpoint speaking the same `/chat/completions` shape;
//! point [`crate::AuditConfig::verdict_base_url`] elsewhere to use one.

use crate::config::{ApiKey, AuditConfig};
use crate::error::ServiceError;
use crate::services::{http_client, status_error, transport_error, ServiceReply, TextService};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Text backend for Groq chat completions.
#[derive(Debug, Clone)]
pub struct GroqChat {
    client: reqwest::Client,
    base_url: String,
    model: String,
    temperature: Option<f32>,
    max_tokens: usize,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: usize,
    #[serde(default)]
    completion_tokens: usize,
}

impl GroqChat {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        max_tokens: usize,
        timeout: Duration,
    ) -> Result<Self, ServiceError> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: base_url.into(),
            model: model.into(),
            temperature: None,
            max_tokens,
            timeout,
        })
    }

    pub fn from_config(config: &AuditConfig) -> Result<Self, ServiceError> {
        let mut backend = Self::new(
            &config.verdict_base_url,
            &config.verdict_model,
            config.verdict_max_tokens,
            config.api_timeout,
        )?;
        backend.temperature = config.temperature;
        Ok(backend)
    }

    pub(crate) fn request<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

/// Content of the first choice.
pub(crate) fn parse_response(body: &str) -> Result<ServiceReply, ServiceError> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| ServiceError::MalformedResponse(e.to_string()))?;

    let text = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(ServiceError::EmptyResponse);
    }

    Ok(ServiceReply {
        text,
        input_tokens: parsed.usage.as_ref().map_or(0, |u| u.prompt_tokens),
        output_tokens: parsed.usage.as_ref().map_or(0, |u| u.completion_tokens),
    })
}

#[async_trait]
impl TextService for GroqChat {
    fn name(&self) -> &str {
        "groq"
    }

    async fn complete(&self, key: &ApiKey, prompt: &str) -> Result<ServiceReply, ServiceError> {
        debug!("POST {} (model {})", self.endpoint(), self.model);
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(key.expose())
            .json(&self.request(prompt))
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

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> GroqChat {
        GroqChat::new(
            "https://api.groq.com/openai/v1",
            "llama-3.3-70b-versatile",
            300,
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn request_is_single_user_message() {
        let g = backend();
        let json = serde_json::to_value(g.request("give a verdict")).unwrap();
        assert_eq!(json["model"], "llama-3.3-70b-versatile");
        assert_eq!(json["messages"].as_array().unwrap().len(), 1);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "give a verdict");
        assert_eq!(json["max_tokens"], 300);
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn endpoint_path() {
        assert_eq!(
            backend().endpoint(),
            "https://api.groq.com/openai/v1/chat/completions"
        );
    }

    #[test]
    fn parses_first_choice() {
        let body = r#"{
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant",
                "content": "Verdict: HIGH RISK. Fonts overlap in the UTR."}}],
            "usage": {"prompt_tokens": 180, "completion_tokens": 24, "total_tokens": 204}
        }"#;
        let reply = parse_response(body).unwrap();
        assert_eq!(reply.text, "Verdict: HIGH RISK. Fonts overlap in the UTR.");
        assert_eq!(reply.input_tokens, 180);
        assert_eq!(reply.output_tokens, 24);
    }

    #[test]
    fn null_content_is_empty_response() {
        let body = r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#;
        assert_eq!(parse_response(body).unwrap_err(), ServiceError::EmptyResponse);
    }

    #[test]
    fn missing_choices_is_empty_response() {
        assert_eq!(parse_response("{}").unwrap_err(), ServiceError::EmptyResponse);
    }
}
