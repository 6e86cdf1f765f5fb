//! Phase transformers.
//!
//! Each resolution stage is a [`PhaseTransformer`]. A transformer works on
//! one declaration at a time inside a file the request owns; the designated
//! driver decides which declarations it sees.
//!
//! - [`imports`]: file imports (once per file; failed ones are retried)
//! - [`supertypes`]: class supertypes
//! - [`types`]: explicit types in headers, type parameter bounds
//! - [`contracts`]: function contracts
//! - [`body`]: bodies, inferred types, tower contexts

pub mod body;
pub mod contracts;
pub mod designated;
pub mod imports;
pub mod supertypes;
pub mod types;

use crate::cancellation::Progress;
use crate::tower::TowerContextCollector;
use lres_common::TextRange;
use lres_fir::{DeclId, Declaration, FirFile, FirSession, ResolveError, ResolvePhase};
use lres_syntax::SourceElement;
use tracing::trace;

pub use body::BodyResolveTransformer;
pub use contracts::ContractsTransformer;
pub use designated::{DesignatedResolver, ResolveMode, ResolveStats};
pub use imports::ImportsTransformer;
pub use supertypes::SuperTypesTransformer;
pub use types::TypesTransformer;

/// Everything a transformer may touch while working on one declaration.
pub struct TransformContext<'a> {
    pub session: &'a FirSession,
    pub file: &'a mut FirFile,
    /// Enclosing classes of the declaration being transformed, outermost
    /// first.
    pub containers: Vec<DeclId>,
    pub progress: &'a mut Progress,
    pub collector: Option<&'a mut TowerContextCollector>,
    /// Declarations whose bodies are being resolved, outermost first.
    pub(crate) resolving: Vec<DeclId>,
    /// Invocations spent on declarations a body depends on, not yet counted
    /// by the driver.
    pub(crate) dependency_invocations: u32,
}

impl<'a> TransformContext<'a> {
    pub fn new(session: &'a FirSession, file: &'a mut FirFile, progress: &'a mut Progress) -> Self {
        TransformContext {
            session,
            file,
            containers: Vec::new(),
            progress,
            collector: None,
            resolving: Vec::new(),
            dependency_invocations: 0,
        }
    }

    pub fn with_collector(mut self, collector: &'a mut TowerContextCollector) -> Self {
        self.collector = Some(collector);
        self
    }

    pub(crate) fn decl(&self, id: DeclId) -> Result<std::sync::Arc<Declaration>, ResolveError> {
        self.file
            .decl_arc(id)
            .cloned()
            .ok_or_else(|| ResolveError::invalid_designation("declaration is not in the file"))
    }
}

pub trait PhaseTransformer: Send + Sync {
    fn phase(&self) -> ResolvePhase;

    /// Do the stage's work on `id`. Called only for declarations the stage
    /// applies to; the phase marker is advanced by [`PhaseTransformer::apply`].
    fn transform(&self, cx: &mut TransformContext<'_>, id: DeclId) -> Result<(), ResolveError>;

    /// Whether an on-air run should redo this stage on a declaration whose
    /// marker already shows it.
    fn need_replace_phase(&self, _decl: &Declaration) -> bool {
        false
    }

    /// Run the stage on `id` and move its marker to this phase.
    ///
    /// Stages not applicable to the declaration's kind only move the marker.
    /// Returns whether [`PhaseTransformer::transform`] was invoked.
    fn apply(&self, cx: &mut TransformContext<'_>, id: DeclId) -> Result<bool, ResolveError> {
        let phase = self.phase();
        let decl = cx.decl(id)?;
        if let Some(required) = phase.prev() {
            if decl.phase < required {
                return Err(ResolveError::PhaseOrderViolation {
                    declaration: decl.name.clone(),
                    current: decl.phase,
                    requested: phase,
                });
            }
        }
        let applicable = phase.applies_to(decl.kind);
        if applicable {
            cx.progress.checkpoint()?;
            trace!(name = %decl.name, %phase, "transform");
            self.transform(cx, id)?;
        }
        cx.file.arena.update(id, |d| d.advance_phase(phase));
        Ok(applicable)
    }
}

static IMPORTS: ImportsTransformer = ImportsTransformer;
static SUPER_TYPES: SuperTypesTransformer = SuperTypesTransformer;
static TYPES: TypesTransformer = TypesTransformer;
static CONTRACTS: ContractsTransformer = ContractsTransformer;
static BODY_RESOLVE: BodyResolveTransformer = BodyResolveTransformer;

/// Transformer for `phase`; `Raw` has none, building is not a stage.
pub fn transformer_for(phase: ResolvePhase) -> Option<&'static dyn PhaseTransformer> {
    match phase {
        ResolvePhase::Raw => None,
        ResolvePhase::Imports => Some(&IMPORTS),
        ResolvePhase::SuperTypes => Some(&SUPER_TYPES),
        ResolvePhase::Types => Some(&TYPES),
        ResolvePhase::Contracts => Some(&CONTRACTS),
        ResolvePhase::BodyResolve => Some(&BODY_RESOLVE),
    }
}

pub(crate) fn range_of(source: Option<&SourceElement>) -> Option<TextRange> {
    source.map(SourceElement::range)
}
