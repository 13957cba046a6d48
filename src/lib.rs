//! # truthlens
//!
//! Forensic audit of payment-confirmation screenshots.
//!
//! A forged "Transaction Successful" screenshot usually gives itself away
//! in two places: its provenance (editors rewrite or strip the EXIF table)
//! and its pixels (re-typed amounts leave ghosting, off-palette greens and
//! overlapping glyphs). This crate checks both by chaining a local metadata
//! read with a vision model and a text model, and reports the verdict.
//!
//! ## Pipeline Overview
//!
//! ```text
//! screenshot (JPEG/PNG)
//!  │
//!  ├─ 1. Metadata  read the EXIF tag table, or the "no metadata" sentinel
//!  ├─ 2. Vision    one call: fixed prompt + raw image → technical report
//!  ├─ 3. Verdict   one call: metadata + report → SAFE / SUSPICIOUS / HIGH RISK
//!  └─ 4. Classify  display glyph + tolerant verdict label
//! ```
//!
//! Stages run strictly in sequence. A failing stage ends the audit: no
//! retry, no partial verdict.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use truthlens::{audit_file, AuditConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AuditConfig::builder()
//!         .vision_key(std::env::var("GEMINI_API_KEY")?)
//!         .verdict_key(std::env::var("GROQ_API_KEY")?)
//!         .build()?;
//!     let report = audit_file("payment.jpg", &config).await?;
//!     println!("{}\nRisk Level: {}", report.verdict, report.glyph);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `truthlens` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod audit;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod services;
pub mod state;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use audit::{audit, audit_file, audit_sync, AuditOutcome, Auditor};
pub use config::{ApiKey, AuditConfig, AuditConfigBuilder, Credentials};
pub use error::{AuditError, ServiceError};
pub use output::{AuditReport, AuditStats, StageUsage};
pub use pipeline::classify::{RiskGlyph, VerdictLabel};
pub use pipeline::input::{ImageKind, UploadedImage};
pub use pipeline::metadata::{MetadataSummary, TagValue};
pub use progress::{AuditObserver, NoopObserver, ObserverHandle};
pub use services::{ServiceReply, TextService, VisionService};
pub use state::{AuditState, Stage};
