//! `SyntaxNode`: one handle over both tree representations.
//!
//! The representation is fixed when the handle is created. Every capability
//! is answered by matching on the variant; the two variants navigate very
//! differently (links vs. depth scanning) but agree on the results.

use crate::kind::SyntaxKind;
use crate::light::LightTree;
use crate::tree::{SyntaxTree, TreeId, TreeOrigin};
use lres_common::TextRange;
use lres_common::limits::MAX_TREE_WALK_ITERATIONS;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Stable, hashable identity of a node: its tree plus its pre-order index.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey {
    pub tree: TreeId,
    pub index: u32,
}

#[derive(Clone)]
pub struct FullNode {
    tree: Arc<SyntaxTree>,
    index: u32,
}

impl FullNode {
    pub(crate) fn new(tree: Arc<SyntaxTree>, index: u32) -> Self {
        FullNode { tree, index }
    }

    pub fn tree(&self) -> &Arc<SyntaxTree> {
        &self.tree
    }

    fn parent(&self) -> Option<FullNode> {
        let parent = self.tree.data(self.index).parent?;
        Some(FullNode::new(Arc::clone(&self.tree), parent))
    }

    /// The type reference is the callee of a constructor call when its
    /// direct parent is a constructor-callee node.
    fn is_in_constructor_callee(&self) -> bool {
        self.tree
            .data(self.index)
            .parent
            .is_some_and(|p| self.tree.data(p).kind == SyntaxKind::ConstructorCallee)
    }
}

#[derive(Clone)]
pub struct LightNode {
    tree: Arc<LightTree>,
    index: u32,
}

impl LightNode {
    pub(crate) fn new(tree: Arc<LightTree>, index: u32) -> Self {
        LightNode { tree, index }
    }

    pub fn tree(&self) -> &Arc<LightTree> {
        &self.tree
    }

    fn parent(&self) -> Option<LightNode> {
        let parent = self.tree.parent_index(self.index)?;
        Some(LightNode::new(Arc::clone(&self.tree), parent))
    }

    fn is_in_constructor_callee(&self) -> bool {
        self.tree
            .parent_index(self.index)
            .is_some_and(|p| self.tree.data(p).kind == SyntaxKind::ConstructorCallee)
    }
}

#[derive(Clone)]
pub enum SyntaxNode {
    Full(FullNode),
    Light(LightNode),
}

impl SyntaxNode {
    pub fn key(&self) -> NodeKey {
        match self {
            SyntaxNode::Full(n) => NodeKey {
                tree: n.tree.id(),
                index: n.index,
            },
            SyntaxNode::Light(n) => NodeKey {
                tree: n.tree.id(),
                index: n.index,
            },
        }
    }

    pub fn tree_id(&self) -> TreeId {
        self.key().tree
    }

    pub fn kind(&self) -> SyntaxKind {
        match self {
            SyntaxNode::Full(n) => n.tree.data(n.index).kind,
            SyntaxNode::Light(n) => n.tree.data(n.index).kind,
        }
    }

    pub fn range(&self) -> TextRange {
        match self {
            SyntaxNode::Full(n) => n.tree.data(n.index).range,
            SyntaxNode::Light(n) => n.tree.data(n.index).range,
        }
    }

    /// Token text; `None` for composite nodes.
    pub fn text(&self) -> Option<&str> {
        match self {
            SyntaxNode::Full(n) => n.tree.data(n.index).text.as_deref(),
            SyntaxNode::Light(n) => n.tree.data(n.index).text.as_deref(),
        }
    }

    pub fn file_name(&self) -> &str {
        match self {
            SyntaxNode::Full(n) => n.tree.file_name(),
            SyntaxNode::Light(n) => n.tree.file_name(),
        }
    }

    pub fn origin(&self) -> TreeOrigin {
        match self {
            SyntaxNode::Full(n) => n.tree.origin(),
            SyntaxNode::Light(n) => n.tree.origin(),
        }
    }

    pub fn is_physical(&self) -> bool {
        self.origin() == TreeOrigin::Physical
    }

    pub fn is_light(&self) -> bool {
        matches!(self, SyntaxNode::Light(_))
    }

    pub fn parent(&self) -> Option<SyntaxNode> {
        match self {
            SyntaxNode::Full(n) => n.parent().map(SyntaxNode::Full),
            SyntaxNode::Light(n) => n.parent().map(SyntaxNode::Light),
        }
    }

    pub fn children(&self) -> Vec<SyntaxNode> {
        match self {
            SyntaxNode::Full(n) => n
                .tree
                .data(n.index)
                .children
                .iter()
                .map(|&c| SyntaxNode::Full(FullNode::new(Arc::clone(&n.tree), c)))
                .collect(),
            SyntaxNode::Light(n) => n
                .tree
                .child_indices(n.index)
                .into_iter()
                .map(|c| SyntaxNode::Light(LightNode::new(Arc::clone(&n.tree), c)))
                .collect(),
        }
    }

    pub fn first_child(&self, kind: SyntaxKind) -> Option<SyntaxNode> {
        self.children().into_iter().find(|c| c.kind() == kind)
    }

    pub fn children_of(&self, kind: SyntaxKind) -> Vec<SyntaxNode> {
        self.children()
            .into_iter()
            .filter(|c| c.kind() == kind)
            .collect()
    }

    /// Strict ancestors, innermost first.
    pub fn ancestors(&self) -> Ancestors {
        Ancestors {
            next: self.parent(),
            steps: 0,
        }
    }

    /// This node and all nodes below it, in pre-order.
    pub fn descendants(&self) -> Vec<SyntaxNode> {
        let mut out = Vec::new();
        let mut stack = vec![self.clone()];
        while let Some(node) = stack.pop() {
            let mut children = node.children();
            children.reverse();
            out.push(node);
            stack.extend(children);
        }
        out
    }

    /// Deepest node at or below this one whose range contains `offset`.
    pub fn find_element_at(&self, offset: u32) -> Option<SyntaxNode> {
        if let SyntaxNode::Full(n) = self {
            if n.index == 0 {
                return n.tree.find_element_at(offset);
            }
        }
        if !self.range().contains(offset) {
            return None;
        }
        let mut current = self.clone();
        'descend: loop {
            for child in current.children() {
                if child.range().contains(offset) {
                    current = child;
                    continue 'descend;
                }
            }
            return Some(current);
        }
    }

    /// Text of the first identifier child, the name of most declarations.
    pub fn name(&self) -> Option<String> {
        self.first_child(SyntaxKind::Identifier)
            .and_then(|id| id.text().map(str::to_string))
    }

    /// Whether a keyword child (directly or inside a modifier list) has `text`.
    pub fn has_keyword(&self, text: &str) -> bool {
        self.children().iter().any(|child| match child.kind() {
            SyntaxKind::Keyword => child.text() == Some(text),
            SyntaxKind::ModifierList => child
                .children_of(SyntaxKind::Keyword)
                .iter()
                .any(|k| k.text() == Some(text)),
            _ => false,
        })
    }

    /// Whether this node lies inside `other` (same tree, range nested).
    /// A node is inside itself.
    pub fn is_inside(&self, other: &SyntaxNode) -> bool {
        self.tree_id() == other.tree_id() && other.range().contains_range(self.range())
    }

    pub fn is_in_constructor_callee(&self) -> bool {
        match self {
            SyntaxNode::Full(n) => n.is_in_constructor_callee(),
            SyntaxNode::Light(n) => n.is_in_constructor_callee(),
        }
    }

    /// The first ancestor that is a type constraint or a type parameter
    /// decides: a reference below a `where` constraint is in a type constraint,
    /// one below a type parameter (an inline bound) is not.
    pub fn is_in_type_constraint(&self) -> bool {
        self.ancestors()
            .find(|a| {
                matches!(
                    a.kind(),
                    SyntaxKind::TypeConstraint | SyntaxKind::TypeParameter
                )
            })
            .is_some_and(|a| a.kind() == SyntaxKind::TypeConstraint)
    }

    /// Kinds of all strict ancestors, innermost first.
    pub fn parent_chain(&self) -> Vec<SyntaxKind> {
        self.ancestors().map(|a| a.kind()).collect()
    }
}

/// Iterator over strict ancestors, bounded by
/// [`MAX_TREE_WALK_ITERATIONS`].
pub struct Ancestors {
    next: Option<SyntaxNode>,
    steps: usize,
}

impl Iterator for Ancestors {
    type Item = SyntaxNode;

    fn next(&mut self) -> Option<SyntaxNode> {
        if self.steps >= MAX_TREE_WALK_ITERATIONS {
            return None;
        }
        self.steps += 1;
        let current = self.next.take()?;
        self.next = current.parent();
        Some(current)
    }
}

impl PartialEq for SyntaxNode {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for SyntaxNode {}

impl Hash for SyntaxNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Debug for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = if self.is_light() { "light" } else { "full" };
        write!(f, "{:?}@{} ({repr} #{})", self.kind(), self.range(), self.key().index)?;
        if let Some(text) = self.text() {
            write!(f, " {text:?}")?;
        }
        Ok(())
    }
}
