//! Symbol identities.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::trace;

/// Session-unique identity of a declaration, accessor, parameter or local.
///
/// Declarations are copied on every phase transition; the symbol is what
/// stays the same. Return targets and resolved references point at symbols.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

impl SymbolId {
    /// Sentinel value for invalid `SymbolId`.
    pub const INVALID: Self = Self(0);

    /// First valid `SymbolId`.
    pub const FIRST_VALID: u32 = 1;

    pub const fn is_valid(self) -> bool {
        self.0 >= Self::FIRST_VALID
    }
}

impl fmt::Debug for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// Hands out fresh symbols. Shared by every builder of a session, so symbols
/// built for speculative fragments never collide with real ones.
#[derive(Debug)]
pub struct SymbolAllocator {
    next_id: AtomicU32,
}

impl Default for SymbolAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolAllocator {
    pub fn new() -> Self {
        SymbolAllocator {
            next_id: AtomicU32::new(SymbolId::FIRST_VALID),
        }
    }

    pub fn fresh(&self) -> SymbolId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        trace!(symbol = id, "SymbolAllocator::fresh");
        SymbolId(id)
    }

    /// Number of symbols handed out so far.
    pub fn allocated(&self) -> u32 {
        self.next_id.load(Ordering::SeqCst) - SymbolId::FIRST_VALID
    }
}
