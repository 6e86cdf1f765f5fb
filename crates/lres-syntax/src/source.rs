//! Weak source references held by semantic declarations.

use crate::kind::SyntaxKind;
use crate::light::LightTree;
use crate::node::{FullNode, LightNode, NodeKey, SyntaxNode};
use crate::tree::SyntaxTree;
use lres_common::TextRange;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};

#[derive(Clone)]
enum WeakTree {
    Full(Weak<SyntaxTree>),
    Light(Weak<LightTree>),
}

/// Points a declaration (or type reference, or expression) at the syntax it
/// was built from without keeping that syntax alive.
///
/// Kind and range are cached so they stay answerable after the tree is gone;
/// structural questions need [`SourceElement::node`] and get `None` then.
#[derive(Clone)]
pub struct SourceElement {
    key: NodeKey,
    kind: SyntaxKind,
    range: TextRange,
    tree: WeakTree,
}

impl SourceElement {
    pub fn new(node: &SyntaxNode) -> SourceElement {
        let tree = match node {
            SyntaxNode::Full(n) => WeakTree::Full(Arc::downgrade(n.tree())),
            SyntaxNode::Light(n) => WeakTree::Light(Arc::downgrade(n.tree())),
        };
        SourceElement {
            key: node.key(),
            kind: node.kind(),
            range: node.range(),
            tree,
        }
    }

    pub fn key(&self) -> NodeKey {
        self.key
    }

    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn is_light(&self) -> bool {
        matches!(self.tree, WeakTree::Light(_))
    }

    /// Upgrade to a live node; `None` once the owning tree has been dropped.
    pub fn node(&self) -> Option<SyntaxNode> {
        match &self.tree {
            WeakTree::Full(tree) => tree
                .upgrade()
                .map(|t| SyntaxNode::Full(FullNode::new(t, self.key.index))),
            WeakTree::Light(tree) => tree
                .upgrade()
                .map(|t| SyntaxNode::Light(LightNode::new(t, self.key.index))),
        }
    }

    /// Whether this source lies within `node`'s range in the same tree.
    pub fn is_inside(&self, node: &SyntaxNode) -> bool {
        self.key.tree == node.tree_id() && node.range().contains_range(self.range)
    }
}

impl From<&SyntaxNode> for SourceElement {
    fn from(node: &SyntaxNode) -> Self {
        SourceElement::new(node)
    }
}

impl PartialEq for SourceElement {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for SourceElement {}

impl Hash for SourceElement {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Debug for SourceElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Source({:?}@{} tree {} #{})",
            self.kind, self.range, self.key.tree.0, self.key.index
        )
    }
}
