//! Verdict stage: metadata summary + vision report → verdict text.
//!
//! The text is returned verbatim. Whether it actually names one of the
//! three labels is checked afterwards by [`crate::pipeline::classify`].

use crate::config::ApiKey;
use crate::error::AuditError;
use crate::output::StageUsage;
use crate::pipeline::metadata::MetadataSummary;
use crate::pipeline::remote;
use crate::pipeline::vision::VisionReport;
use crate::prompts::verdict_prompt;
use crate::services::TextService;
use std::time::Duration;

/// Verdict text as returned by the text model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerdictText {
    pub text: String,
    pub usage: StageUsage,
}

/// Run the verdict call under a caller-side timeout.
pub async fn synthesize(
    service: &dyn TextService,
    key: &ApiKey,
    metadata: &MetadataSummary,
    report: &VisionReport,
    timeout: Duration,
) -> Result<VerdictText, AuditError> {
    let prompt = verdict_prompt(&metadata.to_string(), &report.text);
    let (text, usage) = remote::call_once(
        "Verdict",
        service.name(),
        timeout,
        service.complete(key, &prompt),
        |service, source| AuditError::VerdictService { service, source },
    )
    .await?;
    Ok(VerdictText { text, usage })
}
