//! Audit state machine.
//!
//! ```text
//! Idle ─▶ AwaitingUpload ─▶ Ready ─▶ Running(Metadata) ─▶ Running(Vision)
//!                             ▲  │                               │
//!                             └──┘ missing keys                  ▼
//!                                          Failed ◀── Running(Verdict) ─▶ Complete
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// A running sub-stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Metadata,
    Vision,
    Verdict,
}

impl Stage {
    /// Progress text shown while the stage runs.
    pub fn label(self) -> &'static str {
        match self {
            Stage::Metadata => "Scanning Image Metadata (EXIF)...",
            Stage::Vision => "Detecting UI Artifacts & Font Tampering...",
            Stage::Verdict => "Cross-referencing with Fraud Patterns...",
        }
    }
}

/// Orchestrator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "stage")]
pub enum AuditState {
    Idle,
    AwaitingUpload,
    Ready,
    Running(Stage),
    Complete,
    Failed,
}

impl AuditState {
    /// Human-readable label for progress display.
    pub fn label(self) -> &'static str {
        match self {
            AuditState::Idle => "Idle",
            AuditState::AwaitingUpload => "Upload a screenshot",
            AuditState::Ready => "Ready to audit",
            AuditState::Running(stage) => stage.label(),
            AuditState::Complete => "Audit Complete!",
            AuditState::Failed => "Audit Failed",
        }
    }

    pub fn is_running(self) -> bool {
        matches!(self, AuditState::Running(_))
    }

    /// `Complete` or `Failed`.
    pub fn is_finished(self) -> bool {
        matches!(self, AuditState::Complete | AuditState::Failed)
    }
}

impl fmt::Display for AuditState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
