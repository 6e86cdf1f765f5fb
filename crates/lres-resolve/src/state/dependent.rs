//! Resolve state of one on-air request.
//!
//! The overlay is a private clone of the base snapshot with the target
//! replaced by its speculative copy. Resolving the copy only ever touches
//! the overlay; the base and its published snapshots stay as they were.

use super::find_expression_type;
use crate::cancellation::{CancellationToken, Progress};
use crate::state::base::BaseResolveState;
use crate::tower::{TowerContext, TowerContextCollector};
use crate::transformers::{DesignatedResolver, ResolveMode, ResolveStats, TransformContext};
use lres_fir::{
    ConeType, DeclId, Declaration, Designation, FileId, FirFile, ReplacementPair, ResolveError,
    ResolvePhase, build_declaration_copy,
};
use lres_syntax::{NodeKey, SyntaxNode};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::{debug, debug_span};

#[derive(Debug)]
pub struct DependentResolveState {
    base: Arc<BaseResolveState>,
    file: FileId,
    overlay: FirFile,
    target: DeclId,
    original: Arc<Declaration>,
    towers: FxHashMap<NodeKey, TowerContext>,
    stats: ResolveStats,
    /// Keeps the speculative tree alive for the overlay's sources.
    _edit: Option<SyntaxNode>,
}

/// What an on-air request resolves.
pub struct OnAirRequest<'a> {
    pub designation: &'a Designation,
    /// Declaration node the copy is built from.
    pub updated: &'a SyntaxNode,
    pub replacement: Option<&'a ReplacementPair>,
    /// Tower contexts are recorded for nodes inside this element.
    pub record_inside: Option<SyntaxNode>,
}

impl DependentResolveState {
    /// Copy the target of the request and resolve the copy to body
    /// resolution inside a fresh overlay. The base target must already have
    /// its header resolved.
    pub fn resolve_on_air(
        base: Arc<BaseResolveState>,
        request: OnAirRequest<'_>,
        cancel: &CancellationToken,
    ) -> Result<DependentResolveState, ResolveError> {
        let designation = request.designation;
        let session = Arc::clone(base.session());
        let snapshot = base.snapshot(designation.file())?;
        let original = snapshot
            .decl_arc(designation.target())
            .cloned()
            .ok_or_else(|| ResolveError::invalid_designation("target is not in the file"))?;
        let _span = debug_span!(
            "resolve_on_air",
            file = %snapshot.name,
            target = %original.name,
            edited = request.replacement.is_some()
        )
        .entered();

        let fragment = build_declaration_copy(
            &session,
            &snapshot,
            designation,
            request.updated,
            request.replacement,
        )?;
        let mut overlay = FirFile::clone(&snapshot);
        overlay.transplant(designation.target(), fragment);

        let mut collector = request
            .record_inside
            .clone()
            .filter(|_| session.options.record_tower_contexts)
            .map(TowerContextCollector::inside);
        let mut progress = Progress::new(cancel.clone(), session.options.check_interval());
        let stats = {
            let mut cx = TransformContext::new(&session, &mut overlay, &mut progress);
            if let Some(collector) = collector.as_mut() {
                cx = cx.with_collector(collector);
            }
            DesignatedResolver::new(designation, ResolvePhase::BodyResolve, ResolveMode::OnAir)
                .resolve(&mut cx)?
        };
        debug!(
            file = %overlay.name,
            target = %original.name,
            invocations = stats.invocations,
            contexts = collector.as_ref().map_or(0, TowerContextCollector::len),
            "on-air resolution finished"
        );

        Ok(DependentResolveState {
            base,
            file: designation.file(),
            overlay,
            target: designation.target(),
            original,
            towers: collector
                .map(TowerContextCollector::into_contexts)
                .unwrap_or_default(),
            stats,
            _edit: request.record_inside,
        })
    }

    pub fn base(&self) -> &Arc<BaseResolveState> {
        &self.base
    }

    pub fn file(&self) -> FileId {
        self.file
    }

    pub fn overlay(&self) -> &FirFile {
        &self.overlay
    }

    /// The resolved speculative copy.
    pub fn declaration(&self) -> Option<&Declaration> {
        self.overlay.decl(self.target)
    }

    /// The real declaration the copy stands in for, as the base had it.
    pub fn original(&self) -> &Arc<Declaration> {
        &self.original
    }

    pub fn stats(&self) -> &ResolveStats {
        &self.stats
    }

    pub fn tower_context(&self, element: &SyntaxNode) -> Option<&TowerContext> {
        self.towers.get(&element.key())
    }

    pub fn recorded_contexts(&self) -> usize {
        self.towers.len()
    }

    /// Declaration built from `element`: the overlay first, then the base.
    pub fn find_declaration(&self, element: &SyntaxNode) -> Option<Arc<Declaration>> {
        match self.overlay.find_by_source(element.key()) {
            Some(id) => self.overlay.decl_arc(id).cloned(),
            None => self.base.find_declaration(element),
        }
    }

    /// Type of the expression built from `element`: the overlay first, then
    /// the base.
    pub fn expression_type(&self, element: &SyntaxNode) -> Option<ConeType> {
        find_expression_type(&self.overlay, element.key())
            .or_else(|| self.base.expression_type(element))
    }
}
