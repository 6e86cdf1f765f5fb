//! Lazy, designation-scoped resolution.
//!
//! - [`transformers`]: the resolution stages and the designated driver
//! - [`state`]: the shared base state and on-air overlays
//! - [`tower`]: scopes visible inside bodies
//! - [`AnalysisSession`]: the facade tying them together

pub mod cancellation;
pub use cancellation::{CancellationToken, Progress};

pub mod scope;

pub mod session;
pub use session::AnalysisSession;

pub mod state;
pub use state::{BaseResolveState, DependentResolveState, OnAirRequest, ResolveState};

pub mod tower;
pub use tower::{ScopeEntry, TowerContext, TowerContextCollector, TowerLevel, TowerLevelKind};

pub mod transformers;
pub use transformers::{
    DesignatedResolver, PhaseTransformer, ResolveMode, ResolveStats, TransformContext,
    transformer_for,
};

#[cfg(test)]
#[path = "../tests/transformer_tests.rs"]
mod transformer_tests;

#[cfg(test)]
#[path = "../tests/state_tests.rs"]
mod state_tests;

#[cfg(test)]
#[path = "../tests/session_tests.rs"]
mod session_tests;
