//! Designations: root-to-target paths to one nested declaration.
//!
//! ```kotlin
//! class A {            // container
//!     inner class B {  // container
//!         fun foo() {} // target
//!     }
//! }
//! ```
//!
//! The designation for `foo` is `[A, B, foo]`. Resolution re-enters the file
//! along this path only; siblings of `A`, `B` and `foo` are never visited.

use crate::arena::DeclId;
use crate::declarations::DeclKind;
use crate::error::ResolveError;
use crate::file::{FileId, FirFile};
use smallvec::SmallVec;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Designation {
    file: FileId,
    path: SmallVec<[DeclId; 4]>,
}

impl Designation {
    /// Validate `path` against `file`: it must start at the top level, every
    /// non-terminal element must be a class, and every element must be a
    /// member of the one before it.
    pub fn new(file: &FirFile, path: &[DeclId], max_depth: usize) -> Result<Designation, ResolveError> {
        let Some((&first, _)) = path.split_first() else {
            return Err(ResolveError::invalid_designation("empty path"));
        };
        if path.len() > max_depth {
            return Err(ResolveError::invalid_designation(format!(
                "depth {} exceeds the limit of {max_depth}",
                path.len()
            )));
        }
        if !file.declarations.contains(&first) {
            return Err(ResolveError::invalid_designation(format!(
                "{first:?} is not a top-level declaration of '{}'",
                file.name
            )));
        }
        for window in path.windows(2) {
            let (container, next) = (window[0], window[1]);
            let decl = file.decl(container).ok_or_else(|| {
                ResolveError::invalid_designation(format!("{container:?} is not in '{}'", file.name))
            })?;
            if decl.kind != DeclKind::Class {
                return Err(ResolveError::invalid_designation(format!(
                    "container '{}' is a {:?}, not a class",
                    decl.name, decl.kind
                )));
            }
            if !decl.members().contains(&next) {
                return Err(ResolveError::invalid_designation(format!(
                    "{next:?} is not a member of '{}'",
                    decl.name
                )));
            }
        }
        if let Some(&target) = path.last() {
            if file.decl(target).is_none() {
                return Err(ResolveError::invalid_designation(format!(
                    "{target:?} is not in '{}'",
                    file.name
                )));
            }
        }
        Ok(Designation {
            file: file.id,
            path: path.iter().copied().collect(),
        })
    }

    /// Designation of a declaration reachable through class members.
    pub fn for_declaration(
        file: &FirFile,
        target: DeclId,
        max_depth: usize,
    ) -> Result<Designation, ResolveError> {
        let path = file.path_to(target).ok_or_else(|| {
            ResolveError::invalid_designation(format!(
                "{target:?} is not reachable from the top level of '{}'",
                file.name
            ))
        })?;
        Designation::new(file, &path, max_depth)
    }

    pub fn file(&self) -> FileId {
        self.file
    }

    pub fn path(&self) -> &[DeclId] {
        &self.path
    }

    pub fn target(&self) -> DeclId {
        // Construction rejects empty paths.
        self.path[self.path.len() - 1]
    }

    /// Every element but the target.
    pub fn containers(&self) -> &[DeclId] {
        &self.path[..self.path.len() - 1]
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }
}
