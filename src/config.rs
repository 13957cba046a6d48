//! Configuration types for a forensic audit.
//!
//! All audit behaviour is controlled through [`AuditConfig`], built via its
//! [`AuditConfigBuilder`] and handed to [`crate::Auditor`] at construction.
//! Nothing in the library reads credentials or endpoints from process-wide
//! state, so two auditors with different keys can run side by side.
//!
//! Credentials are wrapped in [`ApiKey`], whose `Debug` output is redacted.
//! `AuditConfig` implements `Debug` by hand for the same reason.

use crate::error::AuditError;
use std::fmt;
use std::time::Duration;

/// Default vision model (Gemini).
pub const DEFAULT_VISION_MODEL: &str = "gemini-2.0-flash";
/// Default verdict model (Groq-hosted Llama).
pub const DEFAULT_VERDICT_MODEL: &str = "llama-3.3-70b-versatile";
/// Gemini REST root.
pub const DEFAULT_VISION_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Groq OpenAI-compatible REST root.
pub const DEFAULT_VERDICT_BASE_URL: &str = "https://api.groq.com/openai/v1";
/// 8 MiB: comfortably above any phone screenshot.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 8 * 1024 * 1024;

/// An opaque access token.
///
/// Never printed: both `Debug` and `Display` render `***`.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw token, for building the outbound request only.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Empty or whitespace-only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

impl From<&str> for ApiKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ApiKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// The two keys an audit needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Key for the vision service (Gemini by default).
    pub vision: Option<ApiKey>,
    /// Key for the text service (Groq by default).
    pub verdict: Option<ApiKey>,
}

impl Credentials {
    pub fn new(vision: impl Into<ApiKey>, verdict: impl Into<ApiKey>) -> Self {
        Self {
            vision: Some(vision.into()),
            verdict: Some(verdict.into()),
        }
    }

    /// Names of the keys that are absent or blank, in stage order.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.vision.as_ref().is_none_or(ApiKey::is_blank) {
            missing.push("vision");
        }
        if self.verdict.as_ref().is_none_or(ApiKey::is_blank) {
            missing.push("verdict");
        }
        missing
    }

    /// Both keys present and non-blank.
    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }
}

/// Configuration for a forensic audit.
///
/// Built via [`AuditConfig::builder()`] or using [`AuditConfig::default()`].
///
/// # Example
/// ```rust
/// use truthlens::AuditConfig;
///
/// let config = AuditConfig::builder()
///     .vision_key("gemini-key")
///     .verdict_key("groq-key")
///     .api_timeout_secs(30)
///     .build()
///     .unwrap();
/// assert!(config.credentials.is_complete());
/// ```
#[derive(Clone)]
pub struct AuditConfig {
    /// Vision and verdict keys. Checked when the audit starts, not at build
    /// time, so a config can be built before the user has typed them.
    pub credentials: Credentials,

    /// Vision model identifier. Default: `gemini-2.0-flash`.
    pub vision_model: String,

    /// Text model identifier for the verdict. Default: `llama-3.3-70b-versatile`.
    pub verdict_model: String,

    /// Root URL of the Gemini REST API.
    pub vision_base_url: String,

    /// Root URL of the OpenAI-compatible chat API used for the verdict.
    pub verdict_base_url: String,

    /// Sampling temperature sent with both calls. `None` leaves the service
    /// default in place.
    pub temperature: Option<f32>,

    /// Upper bound on verdict tokens. Default: 300, ample for the ~100 word
    /// rationale the prompt asks for.
    pub verdict_max_tokens: usize,

    /// Caller-side timeout applied to each remote call. Default: 60 s.
    ///
    /// Expiry is reported as the failing stage's service error rather than
    /// left to hang.
    pub api_timeout: Duration,

    /// Largest accepted upload in bytes. Default: 8 MiB.
    pub max_upload_bytes: u64,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            credentials: Credentials::default(),
            vision_model: DEFAULT_VISION_MODEL.to_string(),
            verdict_model: DEFAULT_VERDICT_MODEL.to_string(),
            vision_base_url: DEFAULT_VISION_BASE_URL.to_string(),
            verdict_base_url: DEFAULT_VERDICT_BASE_URL.to_string(),
            temperature: None,
            verdict_max_tokens: 300,
            api_timeout: Duration::from_secs(60),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl fmt::Debug for AuditConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuditConfig")
            .field("credentials", &self.credentials)
            .field("vision_model", &self.vision_model)
            .field("verdict_model", &self.verdict_model)
            .field("vision_base_url", &self.vision_base_url)
            .field("verdict_base_url", &self.verdict_base_url)
            .field("temperature", &self.temperature)
            .field("verdict_max_tokens", &self.verdict_max_tokens)
            .field("api_timeout", &self.api_timeout)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}

impl AuditConfig {
    /// Create a new builder for `AuditConfig`.
    pub fn builder() -> AuditConfigBuilder {
        AuditConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`AuditConfig`].
#[derive(Debug)]
pub struct AuditConfigBuilder {
    config: AuditConfig,
}

impl AuditConfigBuilder {
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.config.credentials = credentials;
        self
    }

    pub fn vision_key(mut self, key: impl Into<ApiKey>) -> Self {
        self.config.credentials.vision = Some(key.into());
        self
    }

    pub fn verdict_key(mut self, key: impl Into<ApiKey>) -> Self {
        self.config.credentials.verdict = Some(key.into());
        self
    }

    pub fn vision_model(mut self, model: impl Into<String>) -> Self {
        self.config.vision_model = model.into();
        self
    }

    pub fn verdict_model(mut self, model: impl Into<String>) -> Self {
        self.config.verdict_model = model.into();
        self
    }

    pub fn vision_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.vision_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn verdict_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.verdict_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = Some(t.clamp(0.0, 2.0));
        self
    }

    pub fn verdict_max_tokens(mut self, n: usize) -> Self {
        self.config.verdict_max_tokens = n;
        self
    }

    pub fn api_timeout(mut self, timeout: Duration) -> Self {
        self.config.api_timeout = timeout;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout = Duration::from_secs(secs);
        self
    }

    pub fn max_upload_bytes(mut self, bytes: u64) -> Self {
        self.config.max_upload_bytes = bytes;
        self
    }

    /// Build the configuration, validating constraints.
    ///
    /// Credentials are deliberately not validated here.
    pub fn build(self) -> Result<AuditConfig, AuditError> {
        let c = &self.config;
        if c.api_timeout.is_zero() {
            return Err(AuditError::InvalidConfig(
                "API timeout must be greater than zero".into(),
            ));
        }
        if c.max_upload_bytes == 0 {
            return Err(AuditError::InvalidConfig(
                "Upload limit must be greater than zero".into(),
            ));
        }
        if c.verdict_max_tokens == 0 {
            return Err(AuditError::InvalidConfig(
                "Verdict max tokens must be ≥ 1".into(),
            ));
        }
        if c.vision_model.trim().is_empty() || c.verdict_model.trim().is_empty() {
            return Err(AuditError::InvalidConfig(
                "Model identifiers must not be empty".into(),
            ));
        }
        for url in [&c.vision_base_url, &c.verdict_base_url] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(AuditError::InvalidConfig(format!(
                    "Base URL must be http(s), got '{url}'"
                )));
            }
        }
        Ok(self.config)
    }
}
