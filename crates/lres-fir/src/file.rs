//! Files and fragments.

use crate::arena::{DeclArena, DeclId};
use crate::declarations::{DeclKind, Declaration};
use crate::symbols::SymbolId;
use lres_common::ResolveDiagnostic;
use lres_syntax::{NodeKey, SourceElement, SyntaxNode};
use rustc_hash::FxHashMap;
use std::sync::Arc;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub u32);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImportTarget {
    Class { fq_name: String },
    /// Star import of a package.
    Package(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FirImport {
    /// Dotted path as written, `a.b.C` or `a.b.*`.
    pub path: String,
    pub source: Option<SourceElement>,
    /// `None` until imports are resolved, and after if resolution failed.
    pub resolved: Option<ImportTarget>,
}

impl FirImport {
    pub fn is_star(&self) -> bool {
        self.path.ends_with(".*")
    }

    /// Simple name the import brings into scope; `None` for star imports.
    pub fn imported_name(&self) -> Option<&str> {
        if self.is_star() {
            return None;
        }
        self.path.rsplit('.').next()
    }
}

/// Semantic model of one file.
///
/// Cloning is cheap: the arena clone shares every declaration. The syntax
/// root is held strongly so that the weak sources of the declarations stay
/// answerable for as long as the file is alive.
#[derive(Clone, Debug)]
pub struct FirFile {
    pub id: FileId,
    pub name: String,
    /// Dotted package name; empty for the root package.
    pub package: String,
    pub imports: Vec<FirImport>,
    pub imports_resolved: bool,
    /// File-level diagnostics, from import resolution.
    pub diagnostics: Vec<ResolveDiagnostic>,
    pub declarations: Vec<DeclId>,
    pub arena: DeclArena,
    pub syntax: SyntaxNode,
}

impl FirFile {
    pub fn decl(&self, id: DeclId) -> Option<&Declaration> {
        self.arena.get(id)
    }

    pub fn decl_arc(&self, id: DeclId) -> Option<&Arc<Declaration>> {
        self.arena.get_arc(id)
    }

    /// All declarations reachable from the top level, pre-order. Includes
    /// class members and classes declared in bodies.
    pub fn reachable(&self) -> Vec<DeclId> {
        let mut out = Vec::new();
        let mut stack: Vec<DeclId> = self.declarations.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let Some(decl) = self.arena.get(id) else {
                continue;
            };
            out.push(id);
            let mut nested: Vec<DeclId> = decl.members().to_vec();
            for body in decl.bodies() {
                nested.extend(body.local_classes());
            }
            stack.extend(nested.into_iter().rev());
        }
        out
    }

    /// Path from the top level to `target` through class members.
    /// Declarations inside bodies have no path.
    pub fn path_to(&self, target: DeclId) -> Option<Vec<DeclId>> {
        fn search(file: &FirFile, ids: &[DeclId], target: DeclId, path: &mut Vec<DeclId>) -> bool {
            for &id in ids {
                path.push(id);
                if id == target {
                    return true;
                }
                if let Some(decl) = file.arena.get(id) {
                    if search(file, decl.members(), target, path) {
                        return true;
                    }
                }
                path.pop();
            }
            false
        }
        let mut path = Vec::new();
        search(self, &self.declarations, target, &mut path).then_some(path)
    }

    /// Reachable declaration built from the node `key`.
    pub fn find_by_source(&self, key: NodeKey) -> Option<DeclId> {
        self.reachable().into_iter().find(|&id| {
            self.arena
                .get(id)
                .and_then(|d| d.source.as_ref())
                .is_some_and(|s| s.key() == key)
        })
    }

    pub fn find_by_symbol(&self, symbol: SymbolId) -> Option<DeclId> {
        self.reachable()
            .into_iter()
            .find(|&id| self.arena.get(id).is_some_and(|d| d.symbol == symbol))
    }

    /// Declaration reached by following names from the top level:
    /// `["Outer", "Inner", "foo"]`.
    pub fn find_path(&self, names: &[&str]) -> Option<Vec<DeclId>> {
        let mut path = Vec::with_capacity(names.len());
        let mut candidates: &[DeclId] = &self.declarations;
        for name in names {
            let id = candidates
                .iter()
                .copied()
                .find(|&id| self.arena.get(id).is_some_and(|d| d.name == *name))?;
            path.push(id);
            candidates = self.arena.get(id)?.members();
        }
        Some(path)
    }

    /// Fully qualified names of every non-local class in the file.
    pub fn class_fq_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        let mut stack: Vec<DeclId> = self.declarations.clone();
        while let Some(id) = stack.pop() {
            let Some(decl) = self.arena.get(id) else {
                continue;
            };
            if let Some(class) = decl.as_class() {
                names.push(class.self_type.to_string());
                stack.extend(class.members.iter().copied());
            }
        }
        names.sort();
        names
    }

    /// Replace the declaration at `at` with the root of `fragment`, moving
    /// the fragment's other declarations into this arena.
    ///
    /// Declarations previously nested under `at` stay in the arena but are
    /// no longer reachable.
    pub fn transplant(&mut self, at: DeclId, fragment: Fragment) {
        let mut mapping: FxHashMap<DeclId, DeclId> = FxHashMap::default();
        let mut next = self.arena.len() as u32;
        for id in fragment.arena.ids() {
            if id == fragment.root {
                mapping.insert(id, at);
            } else {
                mapping.insert(id, DeclId(next));
                next += 1;
            }
        }
        let remap = |id: DeclId| mapping.get(&id).copied().unwrap_or(id);

        for (id, decl) in fragment.arena.iter() {
            let mut decl = decl.clone();
            decl.remap_decl_ids(&remap);
            if id == fragment.root {
                self.arena.replace(at, decl);
            } else {
                self.arena.alloc(decl);
            }
        }
    }
}

/// A self-contained piece of semantic model: one declaration and everything
/// nested in it, in an arena of its own.
#[derive(Clone, Debug)]
pub struct Fragment {
    pub arena: DeclArena,
    pub root: DeclId,
}

impl Fragment {
    pub fn root_decl(&self) -> Option<&Declaration> {
        self.arena.get(self.root)
    }

    pub fn kind(&self) -> Option<DeclKind> {
        self.root_decl().map(|d| d.kind)
    }
}
