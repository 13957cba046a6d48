//! Result types returned by a completed audit.

use crate::pipeline::classify::{RiskGlyph, VerdictLabel};
use crate::pipeline::metadata::MetadataSummary;
use serde::{Deserialize, Serialize};

/// Token and timing accounting for one remote stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageUsage {
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub duration_ms: u64,
}

/// Timing and token statistics for one audit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStats {
    pub metadata_duration_ms: u64,
    pub vision: StageUsage,
    pub verdict: StageUsage,
    pub total_duration_ms: u64,
}

impl AuditStats {
    pub fn total_input_tokens(&self) -> usize {
        self.vision.input_tokens + self.verdict.input_tokens
    }

    pub fn total_output_tokens(&self) -> usize {
        self.vision.output_tokens + self.verdict.output_tokens
    }
}

/// Everything the presentation layer needs to render a finished audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    /// Verdict text exactly as returned by the text service.
    pub verdict: String,
    /// Two-valued display indicator.
    pub glyph: RiskGlyph,
    /// Tolerant label extraction; `Unknown` means needs review.
    pub label: VerdictLabel,
    /// Embedded metadata, or the sentinel.
    pub metadata: MetadataSummary,
    /// Vision model observations fed into the verdict.
    pub vision_report: String,
    /// Upload filename, when known.
    pub image_name: Option<String>,
    pub vision_service: String,
    pub verdict_service: String,
    pub stats: AuditStats,
}
