//! Fragment builder: rebuilds one declaration of a file in isolation.
//!
//! The containers on the designation are replayed into a fresh
//! [`BuilderContext`] from their semantic form; only the target is read
//! from syntax. The result is a self-contained [`Fragment`]: nothing in the
//! file, and nothing in any cache, is touched.

use super::context::BuilderContext;
use super::{RawBuilder, type_parameter_refs};
use crate::arena::DeclId;
use crate::declarations::DeclKind;
use crate::error::ResolveError;
use crate::file::{FirFile, Fragment};
use crate::session::FirSession;
use lres_syntax::SyntaxNode;
use tracing::debug;

/// A node to swap in for another while building. Both must have the same
/// syntax kind.
#[derive(Clone, Debug)]
pub struct ReplacementPair {
    pub original: SyntaxNode,
    pub substitute: SyntaxNode,
}

impl ReplacementPair {
    pub fn new(original: SyntaxNode, substitute: SyntaxNode) -> ReplacementPair {
        ReplacementPair {
            original,
            substitute,
        }
    }

    pub fn validate(&self) -> Result<(), ResolveError> {
        if self.original.kind() != self.substitute.kind() {
            return Err(ResolveError::InvalidReplacementKind {
                original: self.original.kind(),
                substitute: self.substitute.kind(),
            });
        }
        Ok(())
    }
}

/// Build `target` as it would be built in place, below `containers`.
///
/// `containers` are the non-terminal elements of a designation, outermost
/// first; each must be a class of `file`.
pub fn build_fragment(
    session: &FirSession,
    file: &FirFile,
    containers: &[DeclId],
    target: &SyntaxNode,
    replacement: Option<&ReplacementPair>,
) -> Result<Fragment, ResolveError> {
    if let Some(pair) = replacement {
        pair.validate()?;
    }

    let mut ctx = BuilderContext::new(file.package.clone());
    for &id in containers {
        let decl = file.decl(id).ok_or_else(|| {
            ResolveError::invalid_designation(format!("{id:?} is not in '{}'", file.name))
        })?;
        if decl.kind != DeclKind::Class {
            return Err(ResolveError::invalid_designation(format!(
                "container '{}' is a {:?}, not a class",
                decl.name, decl.kind
            )));
        }
        // Containers stay entered for the rest of the build.
        let _frame = ctx.enter_class(
            &decl.name,
            decl.is_inner() || decl.is_local(),
            type_parameter_refs(&decl.type_parameters),
        );
    }

    let mut builder = RawBuilder::new(session, ctx, replacement);
    let root = builder.convert_declaration(target)?;
    let fragment = Fragment {
        arena: builder.into_arena(),
        root,
    };
    debug!(
        file = %file.name,
        depth = containers.len() + 1,
        declarations = fragment.arena.len(),
        replaced = replacement.is_some(),
        "fragment built"
    );
    Ok(fragment)
}
