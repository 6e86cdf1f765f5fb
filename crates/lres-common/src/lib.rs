//! Common types and utilities for the lres resolution engine.
//!
//! This crate provides foundational types used across all lres crates:
//! - Text ranges (`TextRange`) for byte offsets into source text
//! - Resolution limits and thresholds
//! - Resolve options (the engine's configuration surface)
//! - Diagnostics attached to declarations during resolution

// Text ranges - Source location tracking (byte offsets)
pub mod span;
pub use span::TextRange;

// Centralized limits and thresholds
pub mod limits;

// Engine configuration
pub mod options;
pub use options::ResolveOptions;

// Semantic diagnostics recorded by the phase transformers
pub mod diagnostics;
pub use diagnostics::{DiagnosticCategory, DiagnosticKind, ResolveDiagnostic};
