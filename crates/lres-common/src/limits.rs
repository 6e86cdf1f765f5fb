//! Centralized limits and thresholds for the resolution engine.
//!
//! Shared constants for walk depths, iteration counts and default option
//! values. Defaults for [`crate::ResolveOptions`] are taken from here so that
//! the configuration surface and the hard limits cannot drift apart.

// =============================================================================
// Tree Walk Limits
// =============================================================================

/// Maximum number of steps when walking up a parent chain.
///
/// Bounds ancestor walks in the syntax layer (enclosing declaration lookup,
/// type-constraint detection) so that a malformed tree with a parent cycle can
/// never hang an editor thread.
pub const MAX_TREE_WALK_ITERATIONS: usize = 10_000;

/// Maximum nesting depth of a designation path.
///
/// A designation is the chain of classes leading to a declaration:
///
/// ```kotlin
/// class A {            // depth 1
///     inner class B {  // depth 2
///         fun foo() {} // depth 3, the target
///     }
/// }
/// ```
///
/// Real code rarely exceeds a handful of levels; anything deeper than this
/// is rejected as an invalid designation.
pub const DEFAULT_MAX_DESIGNATION_DEPTH: usize = 64;

// =============================================================================
// Cancellation
// =============================================================================

/// Number of units of work between two cancellation checks.
///
/// A unit is a statement, a member declaration or a phase step. Every phase
/// boundary is checked regardless of this interval.
pub const DEFAULT_CANCELLATION_CHECK_INTERVAL: u32 = 16;

// =============================================================================
// Default Imports
// =============================================================================

/// Packages imported into every file with a star import.
pub const DEFAULT_IMPORTS: &[&str] = &["kotlin", "kotlin.collections"];
