//! Errors surfaced by the resolution API.
//!
//! Problems in the analyzed code are not errors; they are recorded as
//! [`lres_common::ResolveDiagnostic`]s on the declarations. A `ResolveError`
//! always means the request itself cannot be served.

use crate::file::FileId;
use crate::phase::ResolvePhase;
use lres_syntax::SyntaxKind;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolveError {
    /// A replacement pair whose nodes have different syntax kinds.
    InvalidReplacementKind {
        original: SyntaxKind,
        substitute: SyntaxKind,
    },
    /// A transformer was asked to advance a declaration that has not reached
    /// the phase preceding the transformer's own.
    PhaseOrderViolation {
        declaration: String,
        current: ResolvePhase,
        requested: ResolvePhase,
    },
    /// A speculative declaration has no counterpart at the same offset in the
    /// real file.
    DesignationNotFound { file: String, offset: u32 },
    /// A designation path that does not describe a chain of containers.
    InvalidDesignation { reason: String },
    /// An overlay-only operation was given a base state (or vice versa).
    InvalidStateVariant { expected: &'static str },
    UnknownFile(FileId),
    /// A syntax node that does not convert to a declaration.
    UnsupportedDeclaration(SyntaxKind),
    /// The caller's cancellation signal fired; nothing was published.
    Cancelled,
}

impl ResolveError {
    /// Cancellation is an abort signal rather than a failure.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, ResolveError::Cancelled)
    }

    pub fn invalid_designation(reason: impl Into<String>) -> Self {
        ResolveError::InvalidDesignation {
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveError::InvalidReplacementKind {
                original,
                substitute,
            } => write!(
                f,
                "Replacement kind mismatch: original is {original:?}, substitute is {substitute:?}"
            ),
            ResolveError::PhaseOrderViolation {
                declaration,
                current,
                requested,
            } => write!(
                f,
                "Cannot run {requested} on '{declaration}': declaration is only at {current}"
            ),
            ResolveError::DesignationNotFound { file, offset } => write!(
                f,
                "No declaration in '{file}' corresponds to the speculative element at offset {offset}"
            ),
            ResolveError::InvalidDesignation { reason } => {
                write!(f, "Invalid designation: {reason}")
            }
            ResolveError::InvalidStateVariant { expected } => {
                write!(f, "Operation requires a {expected} resolve state")
            }
            ResolveError::UnknownFile(id) => write!(f, "File {} is not open", id.0),
            ResolveError::UnsupportedDeclaration(kind) => {
                write!(f, "{kind:?} nodes do not describe a declaration")
            }
            ResolveError::Cancelled => write!(f, "Resolution was cancelled"),
        }
    }
}

impl std::error::Error for ResolveError {}
