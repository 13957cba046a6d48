//! Remote model services used by the two network stages.
//!
//! The orchestrator only sees the [`VisionService`] and [`TextService`]
//! traits. Three backends implement them:
//!
//! * [`gemini::GeminiVision`] — Gemini `generateContent` REST API (vision)
//! * [`groq::GroqChat`] — Groq's OpenAI-compatible chat API (verdict)
//! * [`provider`] — any `edgequake_llm::LLMProvider`, for either stage
//!
//! The credential is passed on every call rather than stored in the
//! backend, so one backend value can serve audits with different keys.
//! Provider-backed stages authenticate on their own and opt out of the key
//! through `requires_key`.

pub mod gemini;
pub mod groq;
pub mod provider;

use crate::config::ApiKey;
use crate::error::ServiceError;
use crate::pipeline::input::UploadedImage;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use gemini::GeminiVision;
pub use groq::GroqChat;
pub use provider::{create_provider, ProviderText, ProviderVision};

/// Text returned by a remote model plus its token accounting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceReply {
    pub text: String,
    pub input_tokens: usize,
    pub output_tokens: usize,
}

impl ServiceReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

/// A vision-capable model: prompt + image in, free text out.
#[async_trait]
pub trait VisionService: Send + Sync {
    /// Short backend name used in logs and error messages.
    fn name(&self) -> &str;

    /// Whether this backend authenticates with the per-call key. Backends
    /// that carry their own credentials return `false`, and the audit then
    /// starts without the matching key.
    fn requires_key(&self) -> bool {
        true
    }

    /// Issue exactly one call with the prompt and the raw image.
    async fn analyze(
        &self,
        key: &ApiKey,
        prompt: &str,
        image: &UploadedImage,
    ) -> Result<ServiceReply, ServiceError>;
}

/// A text-completion model: one user message in, free text out.
#[async_trait]
pub trait TextService: Send + Sync {
    /// Short backend name used in logs and error messages.
    fn name(&self) -> &str;

    /// See [`VisionService::requires_key`].
    fn requires_key(&self) -> bool {
        true
    }

    /// Issue exactly one call with `prompt` as the sole `user` message.
    async fn complete(&self, key: &ApiKey, prompt: &str) -> Result<ServiceReply, ServiceError>;
}

/// Shared reqwest client for the HTTP backends.
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client, ServiceError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("truthlens/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ServiceError::Network(e.to_string()))
}

/// Classify a transport-level reqwest failure.
pub(crate) fn transport_error(e: reqwest::Error, timeout: Duration) -> ServiceError {
    if e.is_timeout() {
        ServiceError::Timeout {
            elapsed_ms: timeout.as_millis() as u64,
        }
    } else if e.is_decode() {
        ServiceError::MalformedResponse(e.to_string())
    } else {
        ServiceError::Network(e.to_string())
    }
}

/// Map a non-success status and its body to a [`ServiceError`].
///
/// Both Gemini and OpenAI-compatible APIs wrap failures as
/// `{"error": {"message": "..."}}`; the message is kept verbatim. Anything
/// else falls back to the raw body.
pub(crate) fn status_error(status: u16, body: &str) -> ServiceError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "no error body".to_string()
            } else {
                trimmed.to_string()
            }
        });

    match status {
        401 | 403 => ServiceError::Unauthorized { message },
        _ => ServiceError::Http { status, message },
    }
}
