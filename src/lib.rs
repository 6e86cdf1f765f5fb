//! lres: lazy, designation-scoped declaration resolution.
//!
//! The engine resolves one declaration at a time, on demand, walking only
//! the chain of classes that encloses it. Speculative edits are resolved
//! "on air" against a private copy while the shared state stays untouched.
//!
//! Crates:
//! - [`lres_common`]: text ranges, limits, options, diagnostics
//! - [`lres_syntax`]: syntax trees and the test factory
//! - [`lres_fir`]: the semantic model, builders and designations
//! - [`lres_resolve`]: phase transformers, resolve state and the session
//!
//! This crate re-exports the public surface and adds configuration loading
//! and tracing setup.

pub use lres_common as common;
pub use lres_fir as fir;
pub use lres_resolve as resolve;
pub use lres_syntax as syntax;

pub use lres_common::{DiagnosticKind, ResolveDiagnostic, ResolveOptions, TextRange};
pub use lres_fir::{
    ConeType, Declaration, Designation, FileId, FirFile, InMemoryProvider, ReplacementPair,
    ResolveError, ResolvePhase, TypeRef,
};
pub use lres_resolve::{
    AnalysisSession, CancellationToken, ResolveState, TowerContext, TowerLevelKind,
};

pub mod config;
pub use config::{find_config, load_options, parse_options};
#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod config_tests;

pub mod tracing_config;
