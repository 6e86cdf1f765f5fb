//! Declaration copy builder.
//!
//! When only the body of a resolved declaration changed, the header does not
//! need resolving again. The copy takes the header (type parameters, value
//! parameters, supertypes, explicit types) from the resolved original and
//! the content (body, initializer, accessors, members) from a fresh build of
//! the updated syntax.
//!
//! Returns in the fresh content are bound to the symbol of the freshly built
//! skeleton, which is discarded. Every return is rebound to the copy.

use crate::builder::{ReplacementPair, build_fragment};
use crate::declarations::{
    Accessor, ClassData, DeclData, DeclFlags, DeclKind, Declaration, FunctionData, PropertyData,
    TypeAliasData,
};
use crate::designation::Designation;
use crate::error::ResolveError;
use crate::file::{FirFile, Fragment};
use crate::phase::ResolvePhase;
use crate::session::FirSession;
use crate::types::TypeRef;
use lres_syntax::SyntaxNode;
use tracing::debug;

/// Copy the target of `designation` with content taken from `updated`.
///
/// `updated` is the target's declaration node in the edited tree. The
/// returned fragment's root is the copy; nested declarations (class members)
/// come straight from the fresh build.
pub fn build_declaration_copy(
    session: &FirSession,
    file: &FirFile,
    designation: &Designation,
    updated: &SyntaxNode,
    replacement: Option<&ReplacementPair>,
) -> Result<Fragment, ResolveError> {
    let original = file
        .decl(designation.target())
        .ok_or_else(|| ResolveError::invalid_designation("target is not in the file"))?;
    if DeclKind::from_syntax(updated.kind()) != Some(original.kind) {
        return Err(ResolveError::InvalidReplacementKind {
            original: original.kind.syntax_kind(),
            substitute: updated.kind(),
        });
    }

    let mut fragment = build_fragment(
        session,
        file,
        designation.containers(),
        updated,
        replacement,
    )?;
    let built = fragment
        .root_decl()
        .cloned()
        .ok_or(ResolveError::UnsupportedDeclaration(updated.kind()))?;

    let copy = copy_declaration(session, original, &built);
    debug!(
        name = %copy.name,
        original = ?original.symbol,
        copy = ?copy.symbol,
        phase = %copy.phase,
        "declaration copied"
    );
    fragment.arena.replace(fragment.root, copy);
    Ok(fragment)
}

fn copy_declaration(session: &FirSession, original: &Declaration, built: &Declaration) -> Declaration {
    let symbol = session.fresh_symbol();
    let data = match (&original.data, &built.data) {
        (DeclData::Function(header), DeclData::Function(content)) => {
            DeclData::Function(FunctionData {
                dispatch_receiver: header.dispatch_receiver.clone(),
                value_parameters: header.value_parameters.clone(),
                return_type: reusable_type(&header.return_type),
                contract: content.contract.clone(),
                body: content
                    .body
                    .as_ref()
                    .map(|b| b.rebind_return_targets(built.symbol, symbol)),
            })
        }
        (DeclData::Property(header), DeclData::Property(content)) => {
            DeclData::Property(PropertyData {
                dispatch_receiver: header.dispatch_receiver.clone(),
                return_type: reusable_type(&header.return_type),
                initializer: content.initializer.clone(),
                getter: content
                    .getter
                    .as_ref()
                    .map(|g| copy_accessor(session, header.getter.as_ref(), g)),
                // The setter is re-copied on every edit, even one that only
                // touched the getter.
                setter: content
                    .setter
                    .as_ref()
                    .map(|s| copy_accessor(session, header.setter.as_ref(), s)),
            })
        }
        (DeclData::Class(header), DeclData::Class(content)) => DeclData::Class(ClassData {
            self_type: header.self_type.clone(),
            super_types: header.super_types.clone(),
            members: content.members.clone(),
        }),
        (DeclData::TypeAlias(_), DeclData::TypeAlias(content)) => {
            DeclData::TypeAlias(TypeAliasData {
                expanded: content.expanded.clone(),
            })
        }
        // Kinds are checked before building; keep the fresh build otherwise.
        (_, content) => content.clone(),
    };

    Declaration {
        symbol,
        name: original.name.clone(),
        kind: original.kind,
        flags: original.flags | DeclFlags::COPY,
        phase: original.phase.min(ResolvePhase::Types),
        source: built.source.clone(),
        type_parameters: original.type_parameters.clone(),
        captured_type_parameters: original.captured_type_parameters.clone(),
        data,
        diagnostics: original
            .diagnostics
            .iter()
            .filter(|d| d.kind.is_header())
            .cloned()
            .collect(),
    }
}

/// Accessor with the resolved header of `header` (when there is one) and the
/// body of `content`, under a fresh symbol.
fn copy_accessor(session: &FirSession, header: Option<&Accessor>, content: &Accessor) -> Accessor {
    let symbol = session.fresh_symbol();
    let (value_parameter, return_type) = match header {
        Some(h) => (h.value_parameter.clone(), reusable_type(&h.return_type)),
        None => (content.value_parameter.clone(), content.return_type.clone()),
    };
    Accessor {
        symbol,
        source: content.source.clone(),
        value_parameter,
        return_type,
        body: content
            .body
            .as_ref()
            .map(|b| b.rebind_return_targets(content.symbol, symbol)),
    }
}

/// Explicit types carry over; a type inferred from the old body does not.
fn reusable_type(ty: &TypeRef) -> TypeRef {
    match ty {
        TypeRef::Inferred(_) => TypeRef::Implicit,
        other => other.clone(),
    }
}
