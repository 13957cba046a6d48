//! Vision stage: screenshot + fixed prompt → free-text technical report.
//!
//! Exactly one call is made. There is no retry: a failure here ends the
//! audit and the user re-runs it.

use crate::config::ApiKey;
use crate::error::AuditError;
use crate::output::StageUsage;
use crate::pipeline::input::UploadedImage;
use crate::pipeline::remote;
use crate::prompts::VISION_PROMPT;
use crate::services::VisionService;
use std::time::Duration;

/// Observations returned by the vision model. Treated as opaque text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisionReport {
    pub text: String,
    pub usage: StageUsage,
}

/// Run the vision call under a caller-side timeout.
///
/// Auth, network, timeout and malformed-response failures all come back as
/// [`AuditError::VisionService`].
pub async fn analyze(
    service: &dyn VisionService,
    key: &ApiKey,
    image: &UploadedImage,
    timeout: Duration,
) -> Result<VisionReport, AuditError> {
    let (text, usage) = remote::call_once(
        "Vision",
        service.name(),
        timeout,
        service.analyze(key, VISION_PROMPT, image),
        |service, source| AuditError::VisionService { service, source },
    )
    .await?;
    Ok(VisionReport { text, usage })
}
