//! Syntax layer for the lres resolution engine.
//!
//! Two tree representations back the same [`SyntaxNode`] handle:
//! - [`SyntaxTree`]: full tree with parent and child links per node
//! - [`LightTree`]: flat pre-order array with depths, parents found by scanning
//!
//! Declarations keep a weak [`SourceElement`] into whichever tree produced
//! them; structural questions about that source go through [`navigator`].
//! The [`factory`] module stands in for the parser and builds trees from
//! declarative specs.

pub mod kind;
pub use kind::SyntaxKind;

mod tree;
pub use tree::{SyntaxTree, TreeId, TreeOrigin};

mod light;
pub use light::LightTree;

pub mod builder;
pub use builder::TreeBuilder;

mod node;
pub use node::{Ancestors, FullNode, LightNode, NodeKey, SyntaxNode};

mod source;
pub use source::SourceElement;

pub mod navigator;

pub mod enclosing;
pub use enclosing::{
    find_enclosing_non_local_declaration, is_declaration_kind, locate_declaration_by_offset,
};

pub mod factory;
