//! Event-based tree builder producing either tree representation.
//!
//! Callers emit `start_node` / `token` / `finish_node` events; offsets are
//! assigned as tokens arrive, with one separator byte between tokens. The same
//! event stream can be materialized as a full tree or as a light tree, and the
//! two agree on every node's kind, range and pre-order index.

use crate::kind::SyntaxKind;
use crate::light::{LightData, LightTree};
use crate::tree::{NodeData, SyntaxTree, TreeId, TreeOrigin};
use lres_common::TextRange;
use smallvec::SmallVec;
use std::sync::Arc;

#[derive(Clone, Debug)]
enum Event {
    Start(SyntaxKind),
    Token(SyntaxKind, Box<str>),
    Finish,
}

#[derive(Clone, Debug, Default)]
pub struct TreeBuilder {
    events: Vec<Event>,
    open: usize,
}

impl TreeBuilder {
    pub fn new() -> TreeBuilder {
        TreeBuilder::default()
    }

    pub fn start_node(&mut self, kind: SyntaxKind) -> &mut Self {
        debug_assert!(!kind.is_token(), "{kind:?} is a token kind");
        self.events.push(Event::Start(kind));
        self.open += 1;
        self
    }

    pub fn token(&mut self, kind: SyntaxKind, text: &str) -> &mut Self {
        debug_assert!(kind.is_token(), "{kind:?} is not a token kind");
        self.events.push(Event::Token(kind, text.into()));
        self
    }

    pub fn finish_node(&mut self) -> &mut Self {
        debug_assert!(self.open > 0, "finish_node without start_node");
        self.events.push(Event::Finish);
        self.open -= 1;
        self
    }

    /// Materialize the events as a full tree.
    pub fn finish(self, file_name: &str, origin: TreeOrigin) -> Arc<SyntaxTree> {
        debug_assert_eq!(self.open, 0, "unbalanced tree builder events");
        let mut nodes: Vec<NodeData> = Vec::with_capacity(self.events.len());
        let mut text = String::new();
        let mut stack: Vec<u32> = Vec::new();
        let mut offset = 0u32;
        let mut last_end: Option<u32> = None;

        for event in self.events {
            match event {
                Event::Start(kind) => {
                    let index = nodes.len() as u32;
                    let parent = stack.last().copied();
                    if let Some(parent) = parent {
                        nodes[parent as usize].children.push(index);
                    }
                    nodes.push(NodeData {
                        kind,
                        range: TextRange::empty(offset),
                        parent,
                        children: SmallVec::new(),
                        text: None,
                    });
                    stack.push(index);
                }
                Event::Token(kind, token_text) => {
                    let range = push_token_text(&mut text, &mut offset, &token_text);
                    last_end = Some(range.end);
                    let index = nodes.len() as u32;
                    let parent = stack.last().copied();
                    if let Some(parent) = parent {
                        nodes[parent as usize].children.push(index);
                    }
                    nodes.push(NodeData {
                        kind,
                        range,
                        parent,
                        children: SmallVec::new(),
                        text: Some(token_text),
                    });
                }
                Event::Finish => {
                    if let Some(index) = stack.pop() {
                        let node = &mut nodes[index as usize];
                        node.range = close_range(node.range.start, last_end);
                    }
                }
            }
        }

        Arc::new(SyntaxTree {
            id: TreeId::fresh(),
            file_name: file_name.to_string(),
            origin,
            text,
            nodes,
        })
    }

    /// Materialize the events as a light tree.
    pub fn finish_light(self, file_name: &str, origin: TreeOrigin) -> Arc<LightTree> {
        debug_assert_eq!(self.open, 0, "unbalanced tree builder events");
        let mut nodes: Vec<LightData> = Vec::with_capacity(self.events.len());
        let mut text = String::new();
        let mut stack: Vec<u32> = Vec::new();
        let mut offset = 0u32;
        let mut last_end: Option<u32> = None;

        for event in self.events {
            match event {
                Event::Start(kind) => {
                    stack.push(nodes.len() as u32);
                    nodes.push(LightData {
                        kind,
                        range: TextRange::empty(offset),
                        depth: (stack.len() - 1) as u16,
                        text: None,
                    });
                }
                Event::Token(kind, token_text) => {
                    let range = push_token_text(&mut text, &mut offset, &token_text);
                    last_end = Some(range.end);
                    nodes.push(LightData {
                        kind,
                        range,
                        depth: stack.len() as u16,
                        text: Some(token_text),
                    });
                }
                Event::Finish => {
                    if let Some(index) = stack.pop() {
                        let node = &mut nodes[index as usize];
                        node.range = close_range(node.range.start, last_end);
                    }
                }
            }
        }

        Arc::new(LightTree {
            id: TreeId::fresh(),
            file_name: file_name.to_string(),
            origin,
            nodes,
        })
    }
}

fn push_token_text(text: &mut String, offset: &mut u32, token: &str) -> TextRange {
    if !text.is_empty() {
        text.push(' ');
    }
    text.push_str(token);
    let start = *offset;
    let end = start + token.len() as u32;
    *offset = end + 1;
    TextRange::new(start, end)
}

/// A node ends at the last token emitted before it was closed, or is empty
/// when it received no tokens.
fn close_range(start: u32, last_end: Option<u32>) -> TextRange {
    match last_end {
        Some(end) if end > start => TextRange::new(start, end),
        _ => TextRange::empty(start),
    }
}
