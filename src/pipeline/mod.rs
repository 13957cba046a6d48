//! Pipeline stages for a forensic audit.
//!
//! Each submodule implements exactly one step, so each can be tested
//! without the others and a backend can be swapped without touching the
//! orchestration in [`crate::audit`].
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ metadata ──▶ vision ──▶ verdict ──▶ classify
//! (bytes)    (EXIF)      (VLM)     (LLM)       (glyph + label)
//! ```
//!
//! 1. [`input`]    — validate the upload as a size-bounded JPEG/PNG
//! 2. [`metadata`] — read the embedded tag table; never fails
//! 3. [`encode`]   — base64-wrap the raw bytes for multimodal requests
//! 4. [`vision`]   — one vision call with the fixed prompt
//! 5. [`verdict`]  — one text call fusing metadata and the vision report
//! 6. [`classify`] — derive the display glyph and verdict label
//!
//! Stages 4 and 5 share `remote::call_once` for the timeout and
//! empty-reply rules.

pub mod classify;
pub mod encode;
pub mod input;
pub mod metadata;
pub(crate) mod remote;
pub mod verdict;
pub mod vision;
