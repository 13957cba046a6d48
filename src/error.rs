//! Error types for the truthlens library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`AuditError`] — **Fatal** for the current audit: the upload is not a
//!   usable image, a credential is missing, or one of the remote stages
//!   failed. Returned as `Err(AuditError)` from [`crate::Auditor::run`] and
//!   the top-level `audit*` functions. No partial verdict is ever produced.
//!
//! * [`ServiceError`] — the fault reported by a single remote call (auth,
//!   HTTP status, network, timeout, unparseable body). It never escapes on
//!   its own; the stage that issued the call wraps it into
//!   [`AuditError::VisionService`] or [`AuditError::VerdictService`] so the
//!   caller knows which stage failed.
//!
//! Metadata extraction has no error variant here: an unreadable tag table
//! degrades to [`crate::pipeline::metadata::MetadataSummary::Absent`].

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the truthlens library.
#[derive(Debug, Error)]
pub enum AuditError {
    // ── Upload errors ─────────────────────────────────────────────────────
    /// Upload file was not found at the given path.
    #[error("Image file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The upload is not a JPEG or PNG image.
    #[error("Unsupported image: {detail}\nUpload a JPEG or PNG screenshot.")]
    UnsupportedImage { detail: String },

    /// The upload exceeds the configured size bound.
    #[error("Image is {size} bytes, larger than the {limit} byte upload limit")]
    ImageTooLarge { size: u64, limit: u64 },

    // ── Orchestration errors ──────────────────────────────────────────────
    /// One or both API keys are absent or blank. No remote call was made.
    #[error("Missing API keys: {}\nProvide them before running the audit.", .missing.join(", "))]
    MissingCredentials { missing: Vec<&'static str> },

    /// `run` was called before an image was uploaded.
    #[error("Cannot run an audit from state '{state}'")]
    InvalidState { state: String },

    // ── Remote stage errors ───────────────────────────────────────────────
    /// The vision stage failed; the verdict stage was not attempted.
    #[error("Vision analysis failed ({service}): {source}")]
    VisionService {
        service: String,
        #[source]
        source: ServiceError,
    },

    /// The verdict stage failed.
    #[error("Verdict synthesis failed ({service}): {source}")]
    VerdictService {
        service: String,
        #[source]
        source: ServiceError,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuditError {
    /// True for errors the user fixes by supplying keys, as opposed to
    /// service faults that call for a re-run.
    pub fn is_missing_credentials(&self) -> bool {
        matches!(self, AuditError::MissingCredentials { .. })
    }
}

/// The fault reported by one remote model call.
///
/// Display strings keep the service-provided message verbatim so it can be
/// surfaced to the user unchanged.
#[derive(Debug, Clone, Error, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ServiceError {
    /// HTTP 401/403: the key was rejected. Retrying will not help.
    #[error("authentication rejected: {message}")]
    Unauthorized { message: String },

    /// Any other non-success HTTP status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Connection, TLS or transport failure.
    #[error("network error: {0}")]
    Network(String),

    /// The caller-side timeout expired before a response arrived.
    #[error("no response within {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    /// The body could not be decoded into the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The response decoded but carried no text.
    #[error("response contained no text")]
    EmptyResponse,

    /// Error reported by an edgequake-llm provider, verbatim.
    #[error("{0}")]
    Provider(String),
}
