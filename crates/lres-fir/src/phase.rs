//! Resolution phases.
//!
//! Every declaration walks the phases in order. A phase that does not apply
//! to a declaration's kind is skipped: the marker advances past it without
//! the stage running.
//!
//! | Phase        | Class | Function | Property | Type alias |
//! |--------------|-------|----------|----------|------------|
//! | Imports      | yes   | yes      | yes      | yes        |
//! | SuperTypes   | yes   |          |          |            |
//! | Types        | yes   | yes      | yes      | yes        |
//! | Contracts    |       | yes      | yes      |            |
//! | BodyResolve  | yes   | yes      | yes      |            |

use crate::declarations::DeclKind;
use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResolvePhase {
    /// Freshly built from syntax; nothing resolved.
    Raw,
    Imports,
    SuperTypes,
    /// Explicit header types: bounds, parameters, return and property types.
    Types,
    Contracts,
    BodyResolve,
}

impl ResolvePhase {
    pub const ALL: [ResolvePhase; 6] = [
        ResolvePhase::Raw,
        ResolvePhase::Imports,
        ResolvePhase::SuperTypes,
        ResolvePhase::Types,
        ResolvePhase::Contracts,
        ResolvePhase::BodyResolve,
    ];

    pub const fn ordinal(self) -> usize {
        self as usize
    }

    pub fn prev(self) -> Option<ResolvePhase> {
        self.ordinal()
            .checked_sub(1)
            .map(|i| ResolvePhase::ALL[i])
    }

    pub fn next(self) -> Option<ResolvePhase> {
        ResolvePhase::ALL.get(self.ordinal() + 1).copied()
    }

    /// Stages that run to bring a declaration to `self`, in order.
    pub fn stages_up_to(self) -> impl Iterator<Item = ResolvePhase> {
        ResolvePhase::ALL[1..=self.ordinal()].iter().copied()
    }

    /// Header stages are the ones a container receives on the way to a
    /// nested target.
    pub fn is_header(self) -> bool {
        matches!(
            self,
            ResolvePhase::Imports | ResolvePhase::SuperTypes | ResolvePhase::Types
        )
    }

    pub fn applies_to(self, kind: DeclKind) -> bool {
        match self {
            ResolvePhase::Raw | ResolvePhase::Imports | ResolvePhase::Types => true,
            ResolvePhase::SuperTypes => kind == DeclKind::Class,
            ResolvePhase::Contracts => matches!(kind, DeclKind::Function | DeclKind::Property),
            ResolvePhase::BodyResolve => kind != DeclKind::TypeAlias,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ResolvePhase::Raw => "RAW",
            ResolvePhase::Imports => "IMPORTS",
            ResolvePhase::SuperTypes => "SUPER_TYPES",
            ResolvePhase::Types => "TYPES",
            ResolvePhase::Contracts => "CONTRACTS",
            ResolvePhase::BodyResolve => "BODY_RESOLVE",
        }
    }
}

impl fmt::Display for ResolvePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
