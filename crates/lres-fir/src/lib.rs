//! Semantic model of the lres resolution engine.
//!
//! - [`Declaration`]s live in a per-file [`DeclArena`], copied on write
//! - [`builder`] turns syntax into raw declarations, a whole file at a time or
//!   one designated [`Fragment`] at a time
//! - [`copy`] reuses a resolved header around freshly built content
//! - [`FirSession`] hands out symbols and answers class lookups

pub mod arena;
pub use arena::{DeclArena, DeclId};

pub mod builder;
pub use builder::{ReplacementPair, build_file, build_fragment};

pub mod copy;
pub use copy::build_declaration_copy;

pub mod declarations;
pub use declarations::{
    Accessor, ClassData, ContractDescription, ContractEffect, DeclData, DeclFlags, DeclKind,
    Declaration, FunctionData, PropertyData, RawContractEffect, TypeAliasData, TypeParameter,
    TypeParameterRef, ValueParameter,
};

pub mod designation;
pub use designation::Designation;

pub mod error;
pub use error::ResolveError;

pub mod expressions;
pub use expressions::{Block, Expr, ExprKind, LocalVariable, ReturnTarget, Statement};

pub mod file;
pub use file::{FileId, FirFile, FirImport, Fragment, ImportTarget};

pub mod phase;
pub use phase::ResolvePhase;

pub mod session;
pub use session::{FileOrigin, FirSession, InMemoryProvider, SymbolProvider};

pub mod symbols;
pub use symbols::{SymbolAllocator, SymbolId};

pub mod types;
pub use types::{BuiltinType, ConeType, TypeRef};

#[cfg(test)]
#[path = "../tests/builder_tests.rs"]
mod builder_tests;

#[cfg(test)]
#[path = "../tests/copy_tests.rs"]
mod copy_tests;

#[cfg(test)]
#[path = "../tests/designation_tests.rs"]
mod designation_tests;
