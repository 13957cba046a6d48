//! Observer trait for audit stage events.
//!
//! Inject an [`Arc<dyn AuditObserver>`] via [`crate::Auditor::with_observer`]
//! to follow an audit as it moves through its stages. A terminal spinner,
//! a web socket or a test recorder can all sit behind the same trait; the
//! library knows nothing about how the host renders progress.
//!
//! # Example
//!
//! ```rust
//! use truthlens::{AuditObserver, AuditState};
//! use std::sync::Mutex;
//!
//! #[derive(Default)]
//! struct Trail(Mutex<Vec<AuditState>>);
//!
//! impl AuditObserver for Trail {
//!     fn on_state_change(&self, state: AuditState) {
//!         self.0.lock().unwrap().push(state);
//!     }
//! }
//! ```

use crate::error::AuditError;
use crate::output::AuditReport;
use crate::state::{AuditState, Stage};
use std::sync::Arc;

/// Called by the orchestrator as an audit progresses.
///
/// All methods have default no-op implementations so callers only
/// override what they care about.
pub trait AuditObserver: Send + Sync {
    /// Every state transition, including the final one.
    fn on_state_change(&self, state: AuditState) {
        let _ = state;
    }

    /// Just before a stage runs.
    fn on_stage_start(&self, stage: Stage) {
        let _ = stage;
    }

    /// After a stage succeeds, with its wall-clock duration.
    fn on_stage_complete(&self, stage: Stage, duration_ms: u64) {
        let _ = (stage, duration_ms);
    }

    /// The audit reached `Complete`.
    fn on_audit_complete(&self, report: &AuditReport) {
        let _ = report;
    }

    /// The audit reached `Failed`.
    fn on_audit_failed(&self, error: &AuditError) {
        let _ = error;
    }
}

/// A no-op observer; the default when none is configured.
pub struct NoopObserver;

impl AuditObserver for NoopObserver {}

/// Convenience alias for the stored observer type.
pub type ObserverHandle = Arc<dyn AuditObserver>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counting {
        starts: AtomicUsize,
        completes: AtomicUsize,
    }

    impl AuditObserver for Counting {
        fn on_stage_start(&self, _stage: Stage) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_stage_complete(&self, _stage: Stage, _duration_ms: u64) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_observer_does_not_panic() {
        let obs = NoopObserver;
        obs.on_state_change(AuditState::Ready);
        obs.on_stage_start(Stage::Metadata);
        obs.on_stage_complete(Stage::Metadata, 3);
        obs.on_audit_failed(&AuditError::Internal("x".into()));
    }

    #[test]
    fn arc_dyn_observer_counts() {
        let counting = Arc::new(Counting::default());
        let obs: ObserverHandle = counting.clone();
        obs.on_stage_start(Stage::Vision);
        obs.on_stage_complete(Stage::Vision, 1200);
        obs.on_stage_start(Stage::Verdict);
        assert_eq!(counting.starts.load(Ordering::SeqCst), 2);
        assert_eq!(counting.completes.load(Ordering::SeqCst), 1);
    }
}
