//! Audit orchestration: the state machine that sequences the stages.
//!
//! [`Auditor`] owns one configuration, one pair of service backends and at
//! most one uploaded image. [`Auditor::run`] walks the stages strictly in
//! order; the first failure moves the auditor to `Failed` and skips every
//! later stage, so a failed vision call never reaches the text service.
//!
//! Dropping the future returned by `run` abandons any in-flight remote
//! call. The auditor keeps its upload, returns to `Ready` and a later
//! `run` starts over.

use crate::config::{ApiKey, AuditConfig, Credentials};
use crate::error::AuditError;
use crate::output::{AuditReport, AuditStats};
use crate::pipeline::classify::{RiskGlyph, VerdictLabel};
use crate::pipeline::input::UploadedImage;
use crate::pipeline::{metadata, verdict, vision};
use crate::progress::{NoopObserver, ObserverHandle};
use crate::services::{GeminiVision, GroqChat, TextService, VisionService};
use crate::state::{AuditState, Stage};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// What the presentation layer shows once an audit has finished.
#[derive(Debug, Clone, PartialEq)]
pub enum AuditOutcome {
    Complete(AuditReport),
    /// Display text of the error that ended the audit.
    Failed(String),
}

/// The audit orchestrator.
pub struct Auditor {
    config: AuditConfig,
    vision: Arc<dyn VisionService>,
    text: Arc<dyn TextService>,
    observer: ObserverHandle,
    state: AuditState,
    image: Option<Arc<UploadedImage>>,
    outcome: Option<AuditOutcome>,
}

impl std::fmt::Debug for Auditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Auditor")
            .field("config", &self.config)
            .field("vision", &self.vision.name())
            .field("text", &self.text.name())
            .field("state", &self.state)
            .field("image", &self.image)
            .finish()
    }
}

impl Auditor {
    /// Build an auditor with the default Gemini + Groq backends.
    pub fn new(config: AuditConfig) -> Result<Self, AuditError> {
        let vision = GeminiVision::from_config(&config)
            .map_err(|e| AuditError::Internal(format!("vision client: {e}")))?;
        let text = GroqChat::from_config(&config)
            .map_err(|e| AuditError::Internal(format!("verdict client: {e}")))?;
        Ok(Self::with_services(config, Arc::new(vision), Arc::new(text)))
    }

    /// Build an auditor over caller-supplied backends.
    pub fn with_services(
        config: AuditConfig,
        vision: Arc<dyn VisionService>,
        text: Arc<dyn TextService>,
    ) -> Self {
        Self {
            config,
            vision,
            text,
            observer: Arc::new(NoopObserver),
            state: AuditState::Idle,
            image: None,
            outcome: None,
        }
    }

    pub fn with_observer(mut self, observer: ObserverHandle) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    pub fn state(&self) -> AuditState {
        self.state
    }

    /// Progress text for the current state.
    pub fn stage_label(&self) -> &'static str {
        self.state.label()
    }

    /// The last finished audit's verdict or error, if any.
    pub fn outcome(&self) -> Option<&AuditOutcome> {
        self.outcome.as_ref()
    }

    pub fn image(&self) -> Option<&UploadedImage> {
        self.image.as_deref()
    }

    /// Replace both keys, e.g. after the user types them in.
    pub fn set_credentials(&mut self, credentials: Credentials) {
        self.config.credentials = credentials;
    }

    /// `Idle → AwaitingUpload`. A no-op in any other state.
    pub fn open(&mut self) {
        if self.state == AuditState::Idle {
            self.transition(AuditState::AwaitingUpload);
        }
    }

    /// Accept an upload and move to `Ready`, discarding any previous
    /// image and outcome.
    pub fn upload(&mut self, image: UploadedImage) {
        debug!("Upload accepted: {:?}", image);
        self.image = Some(Arc::new(image));
        self.outcome = None;
        self.transition(AuditState::Ready);
    }

    /// Read, validate and upload an image file.
    pub async fn upload_path(&mut self, path: impl AsRef<Path>) -> Result<(), AuditError> {
        let image = UploadedImage::from_path(path, self.config.max_upload_bytes).await?;
        self.upload(image);
        Ok(())
    }

    /// Drop the upload and outcome and wait for a new upload.
    pub fn reset(&mut self) {
        self.image = None;
        self.outcome = None;
        self.transition(AuditState::AwaitingUpload);
    }

    /// Run the full audit on the current upload.
    ///
    /// Allowed from `Ready`, and from `Complete`/`Failed` as a re-run. A
    /// missing key returns [`AuditError::MissingCredentials`] and leaves the
    /// auditor in `Ready` without contacting either service. Dropping the
    /// returned future mid-audit also lands in `Ready`.
    pub async fn run(&mut self) -> Result<AuditReport, AuditError> {
        let image = match (&self.image, self.state) {
            (_, AuditState::Idle | AuditState::AwaitingUpload) | (None, _) => {
                return Err(AuditError::InvalidState {
                    state: self.state.label().to_string(),
                });
            }
            (Some(image), _) => Arc::clone(image),
        };

        let creds = &self.config.credentials;
        let keys = (
            stage_key(&creds.vision, self.vision.requires_key()),
            stage_key(&creds.verdict, self.text.requires_key()),
        );
        let (vision_key, verdict_key) = match keys {
            (Some(v), Some(t)) => (v, t),
            (v, t) => {
                let mut missing = Vec::new();
                if v.is_none() {
                    missing.push("vision");
                }
                if t.is_none() {
                    missing.push("verdict");
                }
                warn!("Audit not started, missing keys: {}", missing.join(", "));
                self.outcome = None;
                self.transition(AuditState::Ready);
                return Err(AuditError::MissingCredentials { missing });
            }
        };

        let mut guard = AbandonGuard {
            auditor: self,
            armed: true,
        };
        let result = guard
            .auditor
            .run_stages(&image, &vision_key, &verdict_key)
            .await;
        guard.armed = false;
        result
    }

    async fn run_stages(
        &mut self,
        image: &UploadedImage,
        vision_key: &ApiKey,
        verdict_key: &ApiKey,
    ) -> Result<AuditReport, AuditError> {
        let total_start = Instant::now();
        self.outcome = None;
        info!(
            "Starting audit: {} ({} bytes)",
            image.name().unwrap_or("<upload>"),
            image.len()
        );

        // ── Stage 1: metadata ─────────────────────────────────────────────
        self.enter(Stage::Metadata);
        let meta_start = Instant::now();
        let summary = metadata::extract(image);
        let metadata_duration_ms = meta_start.elapsed().as_millis() as u64;
        info!(
            "Metadata: {}",
            if summary.is_absent() {
                "none found".to_string()
            } else {
                format!("{} tags", summary.len())
            }
        );
        self.observer
            .on_stage_complete(Stage::Metadata, metadata_duration_ms);

        // ── Stage 2: vision ───────────────────────────────────────────────
        self.enter(Stage::Vision);
        let report = match vision::analyze(
            self.vision.as_ref(),
            vision_key,
            image,
            self.config.api_timeout,
        )
        .await
        {
            Ok(report) => report,
            Err(e) => return Err(self.fail(e)),
        };
        self.observer
            .on_stage_complete(Stage::Vision, report.usage.duration_ms);

        // ── Stage 3: verdict ──────────────────────────────────────────────
        self.enter(Stage::Verdict);
        let verdict = match verdict::synthesize(
            self.text.as_ref(),
            verdict_key,
            &summary,
            &report,
            self.config.api_timeout,
        )
        .await
        {
            Ok(verdict) => verdict,
            Err(e) => return Err(self.fail(e)),
        };
        self.observer
            .on_stage_complete(Stage::Verdict, verdict.usage.duration_ms);

        // ── Classify + assemble ───────────────────────────────────────────
        let glyph = RiskGlyph::from_verdict(&verdict.text);
        let label = VerdictLabel::extract(&verdict.text);
        let report = AuditReport {
            glyph,
            label,
            verdict: verdict.text,
            metadata: summary,
            vision_report: report.text,
            image_name: image.name().map(str::to_string),
            vision_service: self.vision.name().to_string(),
            verdict_service: self.text.name().to_string(),
            stats: AuditStats {
                metadata_duration_ms,
                vision: report.usage,
                verdict: verdict.usage,
                total_duration_ms: total_start.elapsed().as_millis() as u64,
            },
        };

        info!(
            "Audit complete: {} ({}), {}ms total",
            label, glyph, report.stats.total_duration_ms
        );
        self.outcome = Some(AuditOutcome::Complete(report.clone()));
        self.transition(AuditState::Complete);
        self.observer.on_audit_complete(&report);
        Ok(report)
    }

    fn transition(&mut self, state: AuditState) {
        if self.state != state {
            debug!("State: {:?} → {:?}", self.state, state);
        }
        self.state = state;
        self.observer.on_state_change(state);
    }

    fn enter(&mut self, stage: Stage) {
        self.transition(AuditState::Running(stage));
        self.observer.on_stage_start(stage);
    }

    fn fail(&mut self, error: AuditError) -> AuditError {
        self.outcome = Some(AuditOutcome::Failed(error.to_string()));
        self.transition(AuditState::Failed);
        self.observer.on_audit_failed(&error);
        error
    }

    /// The run future was dropped while a stage was in flight.
    fn abandon(&mut self) {
        warn!("Audit abandoned during {:?}", self.state);
        self.outcome = None;
        self.transition(AuditState::Ready);
    }
}

/// The key a stage runs with: the configured one when present and
/// non-blank, an empty one for backends that authenticate on their own,
/// `None` when the stage cannot start.
fn stage_key(key: &Option<ApiKey>, required: bool) -> Option<ApiKey> {
    match key {
        Some(key) if !key.is_blank() => Some(key.clone()),
        _ if !required => Some(ApiKey::new("")),
        _ => None,
    }
}

/// Moves the auditor back to `Ready` if `run` is dropped before it finishes.
struct AbandonGuard<'a> {
    auditor: &'a mut Auditor,
    armed: bool,
}

impl Drop for AbandonGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.auditor.abandon();
        }
    }
}

/// Audit one image with the default backends.
///
/// # Example
/// ```rust,no_run
/// use truthlens::{audit, AuditConfig, UploadedImage};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = AuditConfig::builder()
///     .vision_key(std::env::var("GEMINI_API_KEY")?)
///     .verdict_key(std::env::var("GROQ_API_KEY")?)
///     .build()?;
/// let bytes = std::fs::read("payment.png")?;
/// let image = UploadedImage::from_bytes(bytes, config.max_upload_bytes)?;
/// let report = audit(image, &config).await?;
/// println!("{} {}", report.glyph, report.verdict);
/// # Ok(())
/// # }
/// ```
pub async fn audit(image: UploadedImage, config: &AuditConfig) -> Result<AuditReport, AuditError> {
    let mut auditor = Auditor::new(config.clone())?;
    auditor.upload(image);
    auditor.run().await
}

/// Read an image file and audit it with the default backends.
pub async fn audit_file(
    path: impl AsRef<Path>,
    config: &AuditConfig,
) -> Result<AuditReport, AuditError> {
    let image = UploadedImage::from_path(path, config.max_upload_bytes).await?;
    audit(image, config).await
}

/// Synchronous wrapper around [`audit`].
///
/// Creates a temporary tokio runtime internally.
pub fn audit_sync(image: UploadedImage, config: &AuditConfig) -> Result<AuditReport, AuditError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| AuditError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(audit(image, config))
}
