//! Structural questions about the syntax behind a semantic element.
//!
//! Callers hold an optional [`SourceElement`] and do not care whether a full
//! tree or a light tree backs it. Synthetic elements have no source, and a
//! source may outlive its tree; both cases answer "the fact does not hold".

use crate::kind::SyntaxKind;
use crate::source::SourceElement;

/// Whether the type reference is the callee of a constructor call
/// (`class A : Base()` as opposed to `class A : Iface`).
pub fn is_in_constructor_callee(source: Option<&SourceElement>) -> bool {
    source
        .and_then(SourceElement::node)
        .is_some_and(|node| node.is_in_constructor_callee())
}

/// Whether the type reference sits in a `where` clause constraint.
pub fn is_in_type_constraint(source: Option<&SourceElement>) -> bool {
    source
        .and_then(SourceElement::node)
        .is_some_and(|node| node.is_in_type_constraint())
}

/// Kinds of the source's ancestors, innermost first. Empty without source.
pub fn parent_chain(source: Option<&SourceElement>) -> Vec<SyntaxKind> {
    source
        .and_then(SourceElement::node)
        .map(|node| node.parent_chain())
        .unwrap_or_default()
}
