//! Types and type references.

use crate::symbols::SymbolId;
use lres_syntax::SourceElement;
use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BuiltinType {
    Unit,
    Int,
    Long,
    Boolean,
    String,
    Any,
    Nothing,
}

impl BuiltinType {
    pub const ALL: [BuiltinType; 7] = [
        BuiltinType::Unit,
        BuiltinType::Int,
        BuiltinType::Long,
        BuiltinType::Boolean,
        BuiltinType::String,
        BuiltinType::Any,
        BuiltinType::Nothing,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BuiltinType::Unit => "Unit",
            BuiltinType::Int => "Int",
            BuiltinType::Long => "Long",
            BuiltinType::Boolean => "Boolean",
            BuiltinType::String => "String",
            BuiltinType::Any => "Any",
            BuiltinType::Nothing => "Nothing",
        }
    }

    pub fn from_name(name: &str) -> Option<BuiltinType> {
        BuiltinType::ALL.into_iter().find(|b| b.name() == name)
    }
}

/// A resolved type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ConeType {
    Builtin(BuiltinType),
    Class { fq_name: String },
    TypeParameter { name: String, symbol: SymbolId },
    /// Resolution failed; the message names what could not be resolved.
    Error(String),
}

impl ConeType {
    pub const UNIT: ConeType = ConeType::Builtin(BuiltinType::Unit);
    pub const ANY: ConeType = ConeType::Builtin(BuiltinType::Any);
    pub const NOTHING: ConeType = ConeType::Builtin(BuiltinType::Nothing);

    pub fn class(fq_name: impl Into<String>) -> ConeType {
        ConeType::Class {
            fq_name: fq_name.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ConeType::Error(_))
    }
}

impl fmt::Display for ConeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConeType::Builtin(b) => f.write_str(b.name()),
            ConeType::Class { fq_name } => f.write_str(fq_name),
            ConeType::TypeParameter { name, .. } => f.write_str(name),
            ConeType::Error(msg) => write!(f, "<error: {msg}>"),
        }
    }
}

/// A type as written on a declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeRef {
    /// Written in source, not yet resolved.
    Unresolved {
        name: String,
        source: Option<SourceElement>,
    },
    Resolved {
        ty: ConeType,
        source: Option<SourceElement>,
    },
    /// Not written; to be inferred from the body.
    Implicit,
    /// Inferred from the body.
    Inferred(ConeType),
}

impl TypeRef {
    pub fn unresolved(name: impl Into<String>, source: Option<SourceElement>) -> TypeRef {
        TypeRef::Unresolved {
            name: name.into(),
            source,
        }
    }

    pub fn resolved(ty: ConeType) -> TypeRef {
        TypeRef::Resolved { ty, source: None }
    }

    pub fn cone_type(&self) -> Option<&ConeType> {
        match self {
            TypeRef::Resolved { ty, .. } | TypeRef::Inferred(ty) => Some(ty),
            TypeRef::Unresolved { .. } | TypeRef::Implicit => None,
        }
    }

    pub fn source(&self) -> Option<&SourceElement> {
        match self {
            TypeRef::Unresolved { source, .. } | TypeRef::Resolved { source, .. } => {
                source.as_ref()
            }
            TypeRef::Implicit | TypeRef::Inferred(_) => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.cone_type().is_some()
    }

    /// Explicitly written in source (resolved or not).
    pub fn is_explicit(&self) -> bool {
        matches!(self, TypeRef::Unresolved { .. } | TypeRef::Resolved { .. })
    }
}
