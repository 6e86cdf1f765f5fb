//! The semantic session: symbols, builtins and the class provider.

use crate::file::FileId;
use crate::symbols::{SymbolAllocator, SymbolId};
use crate::types::{BuiltinType, ConeType};
use dashmap::DashMap;
use lres_common::ResolveOptions;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::trace;

/// Classes known outside the file being resolved.
pub trait SymbolProvider: Send + Sync {
    fn has_class(&self, fq_name: &str) -> bool;
    fn has_package(&self, package: &str) -> bool;
}

/// Provider backed by a concurrent map. Open files register their classes
/// here, and libraries can be seeded up front.
#[derive(Default)]
pub struct InMemoryProvider {
    classes: DashMap<String, FileOrigin>,
    packages: DashMap<String, usize>,
}

/// Where a provided class comes from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FileOrigin {
    Library,
    File(FileId),
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_classes<'a>(classes: impl IntoIterator<Item = &'a str>) -> Self {
        let provider = Self::new();
        for fq_name in classes {
            provider.register_class(fq_name, FileOrigin::Library);
        }
        provider
    }

    pub fn register_class(&self, fq_name: &str, origin: FileOrigin) {
        trace!(fq_name, ?origin, "InMemoryProvider::register_class");
        if self.classes.insert(fq_name.to_string(), origin).is_none() {
            for package in package_prefixes(fq_name) {
                *self.packages.entry(package.to_string()).or_insert(0) += 1;
            }
        }
    }

    /// Drop every class registered by `file`.
    pub fn unregister_file(&self, file: FileId) {
        let owned: Vec<String> = self
            .classes
            .iter()
            .filter(|e| *e.value() == FileOrigin::File(file))
            .map(|e| e.key().clone())
            .collect();
        for fq_name in owned {
            self.classes.remove(&fq_name);
            for package in package_prefixes(&fq_name) {
                let now_empty = match self.packages.get_mut(package) {
                    Some(mut count) => {
                        *count -= 1;
                        *count == 0
                    }
                    None => false,
                };
                if now_empty {
                    self.packages.remove(package);
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// `a.b.C` -> `a`, `a.b`.
fn package_prefixes(fq_name: &str) -> impl Iterator<Item = &str> {
    fq_name
        .match_indices('.')
        .map(move |(i, _)| &fq_name[..i])
}

impl SymbolProvider for InMemoryProvider {
    fn has_class(&self, fq_name: &str) -> bool {
        self.classes.contains_key(fq_name)
    }

    fn has_package(&self, package: &str) -> bool {
        self.packages.contains_key(package)
    }
}

/// Long-lived semantic environment shared by every request of an analysis
/// session. Carries the scope provider used for name resolution.
pub struct FirSession {
    pub options: ResolveOptions,
    symbols: SymbolAllocator,
    provider: Arc<dyn SymbolProvider>,
    next_file: AtomicU32,
}

impl FirSession {
    pub fn new(options: ResolveOptions, provider: Arc<dyn SymbolProvider>) -> FirSession {
        FirSession {
            options,
            symbols: SymbolAllocator::new(),
            provider,
            next_file: AtomicU32::new(1),
        }
    }

    pub fn fresh_symbol(&self) -> SymbolId {
        self.symbols.fresh()
    }

    pub fn symbols_allocated(&self) -> u32 {
        self.symbols.allocated()
    }

    pub fn next_file_id(&self) -> FileId {
        FileId(self.next_file.fetch_add(1, Ordering::SeqCst))
    }

    pub fn provider(&self) -> &dyn SymbolProvider {
        self.provider.as_ref()
    }

    pub fn builtin(&self, name: &str) -> Option<ConeType> {
        BuiltinType::from_name(name).map(ConeType::Builtin)
    }

    /// Class `name` in `package`, if the provider knows it.
    pub fn class_in_package(&self, package: &str, name: &str) -> Option<ConeType> {
        let fq_name = if package.is_empty() {
            name.to_string()
        } else {
            format!("{package}.{name}")
        };
        self.provider.has_class(&fq_name).then(|| ConeType::class(fq_name))
    }
}

impl fmt::Debug for FirSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirSession")
            .field("options", &self.options)
            .field("symbols_allocated", &self.symbols.allocated())
            .finish_non_exhaustive()
    }
}
