//! Locating declarations in syntax trees.

use crate::kind::SyntaxKind;
use crate::node::SyntaxNode;

pub fn is_declaration_kind(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::Class | SyntaxKind::Function | SyntaxKind::Property | SyntaxKind::TypeAlias
    )
}

/// A declaration is local when any ancestor is a block: it lives in a body,
/// or it is a member of a class that does.
fn is_local(node: &SyntaxNode) -> bool {
    node.ancestors().any(|a| a.kind() == SyntaxKind::Block)
}

/// Nearest declaration at or above `position` that can anchor resolution:
/// a top-level declaration or a member of a non-local class.
pub fn find_enclosing_non_local_declaration(position: &SyntaxNode) -> Option<SyntaxNode> {
    std::iter::once(position.clone())
        .chain(position.ancestors())
        .find(|node| is_declaration_kind(node.kind()) && !is_local(node))
}

/// The node of the same kind starting at the same offset under `root`.
///
/// Maps a declaration of a speculative copy back onto the real file; the
/// edit is expected not to shift the declaration's start.
pub fn locate_declaration_by_offset(
    declaration: &SyntaxNode,
    root: &SyntaxNode,
) -> Option<SyntaxNode> {
    let offset = declaration.range().start;
    let element = root.find_element_at(offset)?;
    std::iter::once(element.clone())
        .chain(element.ancestors())
        .find(|node| node.kind() == declaration.kind())
        .filter(|node| node.range().start == offset)
}
