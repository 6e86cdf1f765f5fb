//! Tower contexts: the stack of scopes visible at a point in a body.
//!
//! Levels are ordered outermost first:
//! default imports, explicit imports, file, enclosing classes, type
//! parameters, value parameters, locals. Lookups walk innermost first, so a
//! local shadows a parameter which shadows a member.

use indexmap::IndexMap;
use lres_fir::{ConeType, SymbolId};
use lres_syntax::{NodeKey, SourceElement, SyntaxNode};
use rustc_hash::FxHashMap;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TowerLevelKind {
    DefaultImports,
    ExplicitImports,
    File,
    Class { name: String },
    TypeParameters,
    ValueParameters,
    Locals,
}

/// A name visible at some level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScopeEntry {
    pub symbol: Option<SymbolId>,
    /// `None` while the declaration's type is not known yet.
    pub ty: Option<ConeType>,
}

impl ScopeEntry {
    pub fn new(symbol: Option<SymbolId>, ty: Option<ConeType>) -> ScopeEntry {
        ScopeEntry { symbol, ty }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TowerLevel {
    pub kind: TowerLevelKind,
    pub types: IndexMap<String, ScopeEntry>,
    pub values: IndexMap<String, ScopeEntry>,
}

impl TowerLevel {
    pub fn new(kind: TowerLevelKind) -> TowerLevel {
        TowerLevel {
            kind,
            types: IndexMap::new(),
            values: IndexMap::new(),
        }
    }

    pub fn add_type(&mut self, name: impl Into<String>, entry: ScopeEntry) {
        self.types.insert(name.into(), entry);
    }

    pub fn add_value(&mut self, name: impl Into<String>, entry: ScopeEntry) {
        self.values.insert(name.into(), entry);
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TowerContext {
    levels: Vec<TowerLevel>,
}

impl TowerContext {
    pub fn new() -> TowerContext {
        TowerContext::default()
    }

    pub fn levels(&self) -> &[TowerLevel] {
        &self.levels
    }

    pub fn push(&mut self, level: TowerLevel) {
        self.levels.push(level);
    }

    pub fn pop(&mut self) -> Option<TowerLevel> {
        self.levels.pop()
    }

    /// Innermost level, when it has `kind`.
    pub fn innermost_mut(&mut self, kind: &TowerLevelKind) -> Option<&mut TowerLevel> {
        self.levels.last_mut().filter(|l| l.kind == *kind)
    }

    pub fn lookup_type(&self, name: &str) -> Option<&ScopeEntry> {
        self.levels.iter().rev().find_map(|l| l.types.get(name))
    }

    pub fn lookup_value(&self, name: &str) -> Option<&ScopeEntry> {
        self.levels.iter().rev().find_map(|l| l.values.get(name))
    }

    /// Every value name visible here, innermost first, without duplicates.
    pub fn visible_values(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for level in self.levels.iter().rev() {
            for name in level.values.keys() {
                if !seen.contains(&name.as_str()) {
                    seen.push(name.as_str());
                }
            }
        }
        seen
    }
}

/// Records the tower context at each statement and expression whose source
/// lies inside `filter`.
#[derive(Debug)]
pub struct TowerContextCollector {
    filter: Option<SyntaxNode>,
    contexts: FxHashMap<NodeKey, TowerContext>,
}

impl TowerContextCollector {
    /// Collect for every node.
    pub fn new() -> TowerContextCollector {
        TowerContextCollector {
            filter: None,
            contexts: FxHashMap::default(),
        }
    }

    /// Collect only for nodes inside `element`.
    pub fn inside(element: SyntaxNode) -> TowerContextCollector {
        TowerContextCollector {
            filter: Some(element),
            contexts: FxHashMap::default(),
        }
    }

    pub fn record(&mut self, source: Option<&SourceElement>, context: &TowerContext) {
        let Some(source) = source else {
            return;
        };
        if let Some(filter) = &self.filter {
            if !source.is_inside(filter) {
                return;
            }
        }
        self.contexts.insert(source.key(), context.clone());
    }

    pub fn get(&self, key: NodeKey) -> Option<&TowerContext> {
        self.contexts.get(&key)
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    pub fn into_contexts(self) -> FxHashMap<NodeKey, TowerContext> {
        self.contexts
    }
}

impl Default for TowerContextCollector {
    fn default() -> Self {
        TowerContextCollector::new()
    }
}
