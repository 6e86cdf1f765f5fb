//! Resolve options: the configuration surface of the engine.
//!
//! Options are deserialized with serde so an editor integration can pass them
//! through as JSON. Missing fields fall back to the defaults in
//! [`crate::limits`].

use crate::limits::{
    DEFAULT_CANCELLATION_CHECK_INTERVAL, DEFAULT_IMPORTS, DEFAULT_MAX_DESIGNATION_DEPTH,
};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolveOptions {
    /// Packages star-imported into every file.
    pub default_imports: Vec<String>,
    /// Units of work between two cancellation checks (clamped to at least 1).
    pub cancellation_check_interval: u32,
    /// Longest accepted designation path.
    pub max_designation_depth: usize,
    /// Whether on-air resolution records tower contexts for the edited element.
    pub record_tower_contexts: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        ResolveOptions {
            default_imports: DEFAULT_IMPORTS.iter().map(|s| s.to_string()).collect(),
            cancellation_check_interval: DEFAULT_CANCELLATION_CHECK_INTERVAL,
            max_designation_depth: DEFAULT_MAX_DESIGNATION_DEPTH,
            record_tower_contexts: true,
        }
    }
}

impl ResolveOptions {
    /// Parse options from a JSON document.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Cancellation interval, never zero.
    pub fn check_interval(&self) -> u32 {
        self.cancellation_check_interval.max(1)
    }
}

#[cfg(test)]
#[path = "../tests/options_tests.rs"]
mod options_tests;
