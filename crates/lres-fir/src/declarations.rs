//! Declarations: classes, functions, properties and type aliases.
//!
//! A `Declaration` is a plain value. The arena holds it behind an `Arc`, and
//! every change (a phase transition, a resolved type) produces a new value in
//! the slot; readers holding the old `Arc` keep seeing the old state.

use crate::arena::DeclId;
use crate::expressions::{Block, Expr};
use crate::phase::ResolvePhase;
use crate::symbols::SymbolId;
use crate::types::{ConeType, TypeRef};
use bitflags::bitflags;
use lres_common::ResolveDiagnostic;
use lres_syntax::{SourceElement, SyntaxKind};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Class,
    Function,
    Property,
    TypeAlias,
}

impl DeclKind {
    pub fn from_syntax(kind: SyntaxKind) -> Option<DeclKind> {
        match kind {
            SyntaxKind::Class => Some(DeclKind::Class),
            SyntaxKind::Function => Some(DeclKind::Function),
            SyntaxKind::Property => Some(DeclKind::Property),
            SyntaxKind::TypeAlias => Some(DeclKind::TypeAlias),
            _ => None,
        }
    }

    pub fn syntax_kind(self) -> SyntaxKind {
        match self {
            DeclKind::Class => SyntaxKind::Class,
            DeclKind::Function => SyntaxKind::Function,
            DeclKind::Property => SyntaxKind::Property,
            DeclKind::TypeAlias => SyntaxKind::TypeAlias,
        }
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct DeclFlags: u8 {
        /// `inner class`: sees the outer class's type parameters.
        const INNER = 1 << 0;
        /// `var` property.
        const VAR = 1 << 1;
        /// Declared inside a body.
        const LOCAL = 1 << 2;
        /// Produced by the copy builder for a speculative edit.
        const COPY = 1 << 3;
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeParameter {
    pub symbol: SymbolId,
    pub name: String,
    /// Inline bound first, then bounds from `where` clauses.
    pub bounds: Vec<TypeRef>,
    pub source: Option<SourceElement>,
}

/// A type parameter of an enclosing declaration visible at this one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeParameterRef {
    pub name: String,
    pub symbol: SymbolId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValueParameter {
    pub symbol: SymbolId,
    pub name: String,
    pub return_type: TypeRef,
    pub source: Option<SourceElement>,
}

// =============================================================================
// Contracts
// =============================================================================

/// A contract effect as written: `returns`, `returnsNotNull`,
/// `callsInPlace p`, `returnsImplies p`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawContractEffect {
    pub effect: String,
    pub parameter: Option<String>,
    pub source: Option<SourceElement>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContractEffect {
    Returns,
    ReturnsNotNull,
    /// Index into the function's value parameters.
    CallsInPlace { parameter: usize },
    ReturnsImplies { parameter: usize },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContractDescription {
    Raw(Vec<RawContractEffect>),
    Resolved(Vec<ContractEffect>),
}

// =============================================================================
// Kind payloads
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassData {
    pub self_type: ConeType,
    pub super_types: Vec<TypeRef>,
    pub members: Vec<DeclId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionData {
    pub dispatch_receiver: Option<ConeType>,
    pub value_parameters: Vec<ValueParameter>,
    pub return_type: TypeRef,
    pub contract: Option<ContractDescription>,
    pub body: Option<Block>,
}

/// Getter or setter of a property. Accessors have their own symbol so
/// returns inside them bind to the accessor, not the property.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Accessor {
    pub symbol: SymbolId,
    pub source: Option<SourceElement>,
    /// The assigned value of a setter.
    pub value_parameter: Option<ValueParameter>,
    pub return_type: TypeRef,
    pub body: Option<Block>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyData {
    pub dispatch_receiver: Option<ConeType>,
    pub return_type: TypeRef,
    pub initializer: Option<Expr>,
    pub getter: Option<Accessor>,
    pub setter: Option<Accessor>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeAliasData {
    pub expanded: TypeRef,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeclData {
    Class(ClassData),
    Function(FunctionData),
    Property(PropertyData),
    TypeAlias(TypeAliasData),
}

// =============================================================================
// Declaration
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    pub symbol: SymbolId,
    pub name: String,
    pub kind: DeclKind,
    pub flags: DeclFlags,
    pub phase: ResolvePhase,
    pub source: Option<SourceElement>,
    pub type_parameters: Vec<TypeParameter>,
    /// Type parameters of enclosing classes visible here.
    pub captured_type_parameters: Vec<TypeParameterRef>,
    pub data: DeclData,
    pub diagnostics: Vec<ResolveDiagnostic>,
}

impl Declaration {
    pub fn is_inner(&self) -> bool {
        self.flags.contains(DeclFlags::INNER)
    }

    pub fn is_local(&self) -> bool {
        self.flags.contains(DeclFlags::LOCAL)
    }

    /// Members of a class; empty for every other kind.
    pub fn members(&self) -> &[DeclId] {
        match &self.data {
            DeclData::Class(class) => &class.members,
            _ => &[],
        }
    }

    pub fn as_class(&self) -> Option<&ClassData> {
        match &self.data {
            DeclData::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionData> {
        match &self.data {
            DeclData::Function(function) => Some(function),
            _ => None,
        }
    }

    pub fn as_function_mut(&mut self) -> Option<&mut FunctionData> {
        match &mut self.data {
            DeclData::Function(function) => Some(function),
            _ => None,
        }
    }

    pub fn as_property(&self) -> Option<&PropertyData> {
        match &self.data {
            DeclData::Property(property) => Some(property),
            _ => None,
        }
    }

    pub fn as_type_alias(&self) -> Option<&TypeAliasData> {
        match &self.data {
            DeclData::TypeAlias(alias) => Some(alias),
            _ => None,
        }
    }

    /// Declared (or inferred) type of a function result or property value.
    pub fn return_type(&self) -> Option<&TypeRef> {
        match &self.data {
            DeclData::Function(function) => Some(&function.return_type),
            DeclData::Property(property) => Some(&property.return_type),
            DeclData::TypeAlias(alias) => Some(&alias.expanded),
            DeclData::Class(_) => None,
        }
    }

    /// Phases only move forward.
    pub fn advance_phase(&mut self, phase: ResolvePhase) {
        if phase > self.phase {
            self.phase = phase;
        }
    }

    /// Record a diagnostic; re-running a stage reports nothing twice.
    pub fn report(&mut self, diagnostic: ResolveDiagnostic) {
        if !self.diagnostics.contains(&diagnostic) {
            self.diagnostics.push(diagnostic);
        }
    }

    /// Every body owned by the declaration: function body, or accessor bodies.
    pub fn bodies(&self) -> Vec<&Block> {
        match &self.data {
            DeclData::Function(function) => function.body.iter().collect(),
            DeclData::Property(property) => [&property.getter, &property.setter]
                .into_iter()
                .flatten()
                .filter_map(|a| a.body.as_ref())
                .collect(),
            _ => Vec::new(),
        }
    }

    pub(crate) fn remap_decl_ids(&mut self, map: &impl Fn(DeclId) -> DeclId) {
        match &mut self.data {
            DeclData::Class(class) => {
                for member in &mut class.members {
                    *member = map(*member);
                }
            }
            DeclData::Function(function) => {
                if let Some(body) = &mut function.body {
                    body.remap_decl_ids(map);
                }
            }
            DeclData::Property(property) => {
                for accessor in [&mut property.getter, &mut property.setter]
                    .into_iter()
                    .flatten()
                {
                    if let Some(body) = &mut accessor.body {
                        body.remap_decl_ids(map);
                    }
                }
            }
            DeclData::TypeAlias(_) => {}
        }
    }
}
