//! Declaration arena.

use crate::declarations::Declaration;
use std::sync::Arc;

/// Index of a declaration in its file's arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId(pub u32);

/// Declarations of one file (or one fragment), addressed by [`DeclId`].
///
/// Slots hold `Arc<Declaration>`. Cloning the arena shares every slot;
/// [`DeclArena::update`] copies a slot's declaration before changing it when
/// anything else still shares it, so a clone taken before a resolution pass
/// is never affected by that pass.
#[derive(Clone, Debug, Default)]
pub struct DeclArena {
    decls: Vec<Arc<Declaration>>,
}

impl DeclArena {
    pub fn new() -> DeclArena {
        DeclArena::default()
    }

    pub fn alloc(&mut self, decl: Declaration) -> DeclId {
        let id = DeclId(self.decls.len() as u32);
        self.decls.push(Arc::new(decl));
        id
    }

    pub fn get(&self, id: DeclId) -> Option<&Declaration> {
        self.decls.get(id.0 as usize).map(Arc::as_ref)
    }

    pub fn get_arc(&self, id: DeclId) -> Option<&Arc<Declaration>> {
        self.decls.get(id.0 as usize)
    }

    /// Copy-on-write update of one slot. Returns `false` for an unknown id.
    pub fn update(&mut self, id: DeclId, f: impl FnOnce(&mut Declaration)) -> bool {
        match self.decls.get_mut(id.0 as usize) {
            Some(slot) => {
                f(Arc::make_mut(slot));
                true
            }
            None => false,
        }
    }

    /// Put a new declaration into an existing slot.
    pub fn replace(&mut self, id: DeclId, decl: Declaration) -> bool {
        match self.decls.get_mut(id.0 as usize) {
            Some(slot) => {
                *slot = Arc::new(decl);
                true
            }
            None => false,
        }
    }

    /// Whether two arenas share the same allocation for `id`.
    pub fn shares_slot(&self, other: &DeclArena, id: DeclId) -> bool {
        match (self.get_arc(id), other.get_arc(id)) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = DeclId> + '_ {
        (0..self.decls.len() as u32).map(DeclId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (DeclId, &Declaration)> + '_ {
        self.decls
            .iter()
            .enumerate()
            .map(|(i, d)| (DeclId(i as u32), d.as_ref()))
    }
}
