//! Light tree: a flat pre-order array of nodes annotated with their depth.
//!
//! Nothing links a node to its parent or children. Both are recovered by
//! scanning the array, which keeps the representation compact and cheap to
//! build for files that are only compiled, never edited.

use crate::kind::SyntaxKind;
use crate::node::{LightNode, SyntaxNode};
use crate::tree::{TreeId, TreeOrigin};
use lres_common::TextRange;
use smallvec::SmallVec;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub(crate) struct LightData {
    pub(crate) kind: SyntaxKind,
    pub(crate) range: TextRange,
    pub(crate) depth: u16,
    pub(crate) text: Option<Box<str>>,
}

#[derive(Debug)]
pub struct LightTree {
    pub(crate) id: TreeId,
    pub(crate) file_name: String,
    pub(crate) origin: TreeOrigin,
    pub(crate) nodes: Vec<LightData>,
}

impl LightTree {
    pub fn id(&self) -> TreeId {
        self.id
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn origin(&self) -> TreeOrigin {
        self.origin
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(self: &Arc<Self>) -> SyntaxNode {
        SyntaxNode::Light(LightNode::new(Arc::clone(self), 0))
    }

    pub fn node(self: &Arc<Self>, index: u32) -> Option<SyntaxNode> {
        if (index as usize) < self.nodes.len() {
            Some(SyntaxNode::Light(LightNode::new(Arc::clone(self), index)))
        } else {
            None
        }
    }

    #[inline]
    pub(crate) fn data(&self, index: u32) -> &LightData {
        &self.nodes[index as usize]
    }

    /// Parent of `index`: the closest preceding entry one level shallower.
    pub(crate) fn parent_index(&self, index: u32) -> Option<u32> {
        let depth = self.nodes.get(index as usize)?.depth;
        if depth == 0 {
            return None;
        }
        self.nodes[..index as usize]
            .iter()
            .rposition(|n| n.depth == depth - 1)
            .map(|i| i as u32)
    }

    /// Direct children of `index`: following entries one level deeper, up to
    /// the first entry that is not deeper than `index`.
    pub(crate) fn child_indices(&self, index: u32) -> SmallVec<[u32; 4]> {
        let mut children = SmallVec::new();
        let Some(node) = self.nodes.get(index as usize) else {
            return children;
        };
        for (offset, entry) in self.nodes[index as usize + 1..].iter().enumerate() {
            if entry.depth <= node.depth {
                break;
            }
            if entry.depth == node.depth + 1 {
                children.push(index + 1 + offset as u32);
            }
        }
        children
    }
}
