//! Full syntax tree: every node stores its parent and children.

use crate::kind::SyntaxKind;
use crate::node::{FullNode, SyntaxNode};
use lres_common::TextRange;
use smallvec::SmallVec;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_TREE_ID: AtomicU32 = AtomicU32::new(1);

/// Process-unique identity of a syntax tree (either representation).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreeId(pub u32);

impl TreeId {
    pub(crate) fn fresh() -> TreeId {
        TreeId(NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Whether a tree mirrors a real file or a hypothetical edit.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TreeOrigin {
    /// Backed by a file the editor has open.
    Physical,
    /// Built for speculative analysis; never persisted.
    NonPhysical,
}

#[derive(Clone, Debug)]
pub(crate) struct NodeData {
    pub(crate) kind: SyntaxKind,
    pub(crate) range: TextRange,
    pub(crate) parent: Option<u32>,
    pub(crate) children: SmallVec<[u32; 4]>,
    pub(crate) text: Option<Box<str>>,
}

/// A fully linked syntax tree. Node 0 is the root.
#[derive(Debug)]
pub struct SyntaxTree {
    pub(crate) id: TreeId,
    pub(crate) file_name: String,
    pub(crate) origin: TreeOrigin,
    pub(crate) text: String,
    pub(crate) nodes: Vec<NodeData>,
}

impl SyntaxTree {
    pub fn id(&self) -> TreeId {
        self.id
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn origin(&self) -> TreeOrigin {
        self.origin
    }

    pub fn is_physical(&self) -> bool {
        self.origin == TreeOrigin::Physical
    }

    /// Source text reconstructed from the tokens, separated by single spaces.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(self: &Arc<Self>) -> SyntaxNode {
        SyntaxNode::Full(FullNode::new(Arc::clone(self), 0))
    }

    pub fn node(self: &Arc<Self>, index: u32) -> Option<SyntaxNode> {
        if (index as usize) < self.nodes.len() {
            Some(SyntaxNode::Full(FullNode::new(Arc::clone(self), index)))
        } else {
            None
        }
    }

    /// Deepest node whose range contains `offset`.
    pub fn find_element_at(self: &Arc<Self>, offset: u32) -> Option<SyntaxNode> {
        let root = self.nodes.first()?;
        if !root.range.contains(offset) {
            return None;
        }
        let mut current = 0u32;
        'descend: loop {
            for &child in &self.nodes[current as usize].children {
                if self.nodes[child as usize].range.contains(offset) {
                    current = child;
                    continue 'descend;
                }
            }
            break;
        }
        self.node(current)
    }

    #[inline]
    pub(crate) fn data(&self, index: u32) -> &NodeData {
        &self.nodes[index as usize]
    }
}
