//! Diagnostics recorded on declarations by the phase transformers.
//!
//! These describe problems in the analyzed code (an unresolved name, a
//! misplaced constraint). They are data, not errors: resolution always
//! completes and presentation is left to the editor layer.

use crate::span::TextRange;
use serde::Serialize;
use std::fmt;

/// Diagnostic category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticCategory {
    Warning = 0,
    Error = 1,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticKind {
    UnresolvedImport,
    UnresolvedType,
    UnresolvedReference,
    ManyClassSupertypes,
    MisplacedTypeParameterConstraints,
    UnknownContractEffect,
    UnresolvedContractParameter,
    UnboundReturnTarget,
    ImplicitTypeNotInferred,
}

impl DiagnosticKind {
    pub const fn category(self) -> DiagnosticCategory {
        match self {
            DiagnosticKind::MisplacedTypeParameterConstraints => DiagnosticCategory::Warning,
            _ => DiagnosticCategory::Error,
        }
    }

    /// Reported while resolving a declaration's header rather than its body.
    /// Header diagnostics survive a body-only edit.
    pub const fn is_header(self) -> bool {
        matches!(
            self,
            DiagnosticKind::UnresolvedImport
                | DiagnosticKind::UnresolvedType
                | DiagnosticKind::ManyClassSupertypes
                | DiagnosticKind::MisplacedTypeParameterConstraints
        )
    }

    /// Stable numeric code, for editor integrations that key on numbers.
    pub const fn code(self) -> u32 {
        match self {
            DiagnosticKind::UnresolvedImport => 1001,
            DiagnosticKind::UnresolvedType => 1002,
            DiagnosticKind::UnresolvedReference => 1003,
            DiagnosticKind::ManyClassSupertypes => 1101,
            DiagnosticKind::MisplacedTypeParameterConstraints => 1102,
            DiagnosticKind::UnknownContractEffect => 1201,
            DiagnosticKind::UnresolvedContractParameter => 1202,
            DiagnosticKind::UnboundReturnTarget => 1301,
            DiagnosticKind::ImplicitTypeNotInferred => 1302,
        }
    }
}

/// A semantic diagnostic with an optional source range.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResolveDiagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<TextRange>,
}

impl ResolveDiagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>, range: Option<TextRange>) -> Self {
        ResolveDiagnostic {
            kind,
            message: message.into(),
            range,
        }
    }

    pub fn category(&self) -> DiagnosticCategory {
        self.kind.category()
    }
}

impl fmt::Display for ResolveDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.category() {
            DiagnosticCategory::Warning => "warning",
            DiagnosticCategory::Error => "error",
        };
        match self.range {
            Some(range) => write!(
                f,
                "{severity} LR{}: {} at {range}",
                self.kind.code(),
                self.message
            ),
            None => write!(f, "{severity} LR{}: {}", self.kind.code(), self.message),
        }
    }
}
