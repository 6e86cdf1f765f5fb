//! Resolve states: the shared base and per-request dependent overlays.

pub mod base;
pub mod dependent;

pub use base::BaseResolveState;
pub use dependent::{DependentResolveState, OnAirRequest};

use lres_fir::{ConeType, Declaration, Expr, FirFile, ResolveError, Statement};
use lres_syntax::{NodeKey, SourceElement, SyntaxNode};
use std::sync::Arc;

#[derive(Debug)]
pub enum ResolveState {
    Base(Arc<BaseResolveState>),
    Dependent(Box<DependentResolveState>),
}

impl ResolveState {
    pub fn is_dependent(&self) -> bool {
        matches!(self, ResolveState::Dependent(_))
    }

    /// The shared base, whichever variant this is.
    pub fn base(&self) -> &Arc<BaseResolveState> {
        match self {
            ResolveState::Base(base) => base,
            ResolveState::Dependent(dependent) => dependent.base(),
        }
    }

    pub fn as_dependent(&self) -> Result<&DependentResolveState, ResolveError> {
        match self {
            ResolveState::Dependent(dependent) => Ok(dependent),
            ResolveState::Base(_) => Err(ResolveError::InvalidStateVariant {
                expected: "dependent",
            }),
        }
    }

    pub fn as_base(&self) -> Result<&Arc<BaseResolveState>, ResolveError> {
        match self {
            ResolveState::Base(base) => Ok(base),
            ResolveState::Dependent(_) => Err(ResolveError::InvalidStateVariant { expected: "base" }),
        }
    }

    pub fn find_declaration(&self, element: &SyntaxNode) -> Option<Arc<Declaration>> {
        match self {
            ResolveState::Base(base) => base.find_declaration(element),
            ResolveState::Dependent(dependent) => dependent.find_declaration(element),
        }
    }

    pub fn expression_type(&self, element: &SyntaxNode) -> Option<ConeType> {
        match self {
            ResolveState::Base(base) => base.expression_type(element),
            ResolveState::Dependent(dependent) => dependent.expression_type(element),
        }
    }
}

/// Type of the expression (or local variable) built from the node `key`,
/// searched through every reachable body and initializer of `file`.
pub(crate) fn find_expression_type(file: &FirFile, key: NodeKey) -> Option<ConeType> {
    let is_key = |source: Option<&SourceElement>| source.is_some_and(|s| s.key() == key);
    for id in file.reachable() {
        let Some(decl) = file.decl(id) else {
            continue;
        };
        let mut found: Option<Option<ConeType>> = None;
        {
            let mut visit = |expr: &Expr| {
                if found.is_none() && is_key(expr.source.as_ref()) {
                    found = Some(expr.ty.clone());
                }
            };
            if let Some(initializer) = decl.as_property().and_then(|p| p.initializer.as_ref()) {
                initializer.walk(&mut visit);
            }
            for body in decl.bodies() {
                body.walk(&mut visit);
            }
        }
        if found.is_none() {
            found = decl
                .bodies()
                .iter()
                .flat_map(|b| &b.statements)
                .find_map(|statement| match statement {
                    Statement::Local(local) if is_key(local.source.as_ref()) => {
                        Some(local.return_type.cone_type().cloned())
                    }
                    _ => None,
                });
        }
        if let Some(ty) = found {
            return ty;
        }
    }
    None
}
