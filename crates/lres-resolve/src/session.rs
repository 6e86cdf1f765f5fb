//! The analysis session: the entry point an editor integration talks to.
//!
//! Owns the shared base state and the class provider. Every operation is
//! safe to call from many threads at once.

use crate::cancellation::CancellationToken;
use crate::state::{BaseResolveState, DependentResolveState, OnAirRequest, ResolveState};
use crate::tower::TowerContext;
use crate::transformers::ResolveStats;
use lres_common::ResolveOptions;
use lres_fir::{
    ConeType, Declaration, Designation, FileId, FileOrigin, FirFile, FirSession, InMemoryProvider,
    ReplacementPair, ResolveError, ResolvePhase, build_file,
};
use lres_syntax::{SyntaxNode, find_enclosing_non_local_declaration, locate_declaration_by_offset};
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, info};

pub struct AnalysisSession {
    provider: Arc<InMemoryProvider>,
    base: Arc<BaseResolveState>,
}

impl AnalysisSession {
    pub fn start(options: ResolveOptions, provider: Arc<InMemoryProvider>) -> AnalysisSession {
        let session = Arc::new(FirSession::new(options, provider.clone()));
        info!(
            library_classes = provider.len(),
            "analysis session started"
        );
        AnalysisSession {
            provider,
            base: Arc::new(BaseResolveState::new(session)),
        }
    }

    pub fn shutdown(self) {
        info!(
            open_files = self.base.files().len(),
            invocations = self.base.invocations(),
            "analysis session shut down"
        );
    }

    pub fn session(&self) -> &Arc<FirSession> {
        self.base.session()
    }

    pub fn provider(&self) -> &Arc<InMemoryProvider> {
        &self.provider
    }

    pub fn base_state(&self) -> ResolveState {
        ResolveState::Base(Arc::clone(&self.base))
    }

    pub fn invocations(&self) -> u64 {
        self.base.invocations()
    }

    // =========================================================================
    // Files
    // =========================================================================

    /// Build the raw model of a physical file and make its classes visible
    /// to every other file.
    pub fn open_file(&self, root: &SyntaxNode) -> Result<FileId, ResolveError> {
        let file = build_file(self.session(), root)?;
        for fq_name in file.class_fq_names() {
            self.provider.register_class(&fq_name, FileOrigin::File(file.id));
        }
        info!(file = %file.name, declarations = file.declarations.len(), "file opened");
        Ok(self.base.open(file))
    }

    pub fn close_file(&self, id: FileId) -> Result<(), ResolveError> {
        let file = self.base.close(id).ok_or(ResolveError::UnknownFile(id))?;
        self.provider.unregister_file(id);
        info!(file = %file.name, "file closed");
        Ok(())
    }

    pub fn file(&self, id: FileId) -> Result<Arc<FirFile>, ResolveError> {
        self.base.snapshot(id)
    }

    // =========================================================================
    // Designations
    // =========================================================================

    /// Designation of the declaration `node` (a declaration node in an open
    /// file).
    pub fn designation_for(&self, node: &SyntaxNode) -> Result<Designation, ResolveError> {
        let not_found = || ResolveError::DesignationNotFound {
            file: node.file_name().to_string(),
            offset: node.range().start,
        };
        let file_id = self.base.file_of(node).ok_or_else(not_found)?;
        let file = self.base.snapshot(file_id)?;
        let id = file.find_by_source(node.key()).ok_or_else(not_found)?;
        Designation::for_declaration(&file, id, self.session().options.max_designation_depth)
    }

    /// Designation of the nearest non-local declaration at or above
    /// `position`.
    pub fn find_enclosing_declaration(&self, position: &SyntaxNode) -> Option<Designation> {
        let declaration = find_enclosing_non_local_declaration(position)?;
        self.designation_for(&declaration).ok()
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    pub fn resolve_to_phase(
        &self,
        designation: &Designation,
        phase: ResolvePhase,
        cancel: &CancellationToken,
    ) -> Result<Arc<Declaration>, ResolveError> {
        self.base.resolve(designation, phase, cancel)
    }

    pub fn resolve_to_phase_with_stats(
        &self,
        designation: &Designation,
        phase: ResolvePhase,
        cancel: &CancellationToken,
    ) -> Result<(Arc<Declaration>, ResolveStats), ResolveError> {
        self.base.resolve_with_stats(designation, phase, cancel)
    }

    /// Resolve the declaration enclosing `replacement.original` as if the
    /// original node were replaced by the substitute. The real file is not
    /// touched.
    pub fn resolve_speculative(
        &self,
        replacement: &ReplacementPair,
        cancel: &CancellationToken,
    ) -> Result<ResolveState, ResolveError> {
        replacement.validate()?;
        let declaration = find_enclosing_non_local_declaration(&replacement.original).ok_or_else(
            || ResolveError::DesignationNotFound {
                file: replacement.original.file_name().to_string(),
                offset: replacement.original.range().start,
            },
        )?;
        let designation = self.designation_for(&declaration)?;
        self.on_air(
            OnAirRequest {
                designation: &designation,
                updated: &declaration,
                replacement: Some(replacement),
                record_inside: Some(replacement.substitute.clone()),
            },
            cancel,
        )
    }

    /// Resolve `element`, which lives in a non-physical copy of the open
    /// file `original_file`, against the real file. The declaration around
    /// `element` must start at the same offset as its real counterpart.
    pub fn resolve_for_dependent_copy(
        &self,
        original_file: FileId,
        element: &SyntaxNode,
        cancel: &CancellationToken,
    ) -> Result<ResolveState, ResolveError> {
        let file = self.base.snapshot(original_file)?;
        let not_found = |offset: u32| ResolveError::DesignationNotFound {
            file: file.name.clone(),
            offset,
        };
        let declaration = find_enclosing_non_local_declaration(element)
            .ok_or_else(|| not_found(element.range().start))?;
        let real = locate_declaration_by_offset(&declaration, &file.syntax)
            .ok_or_else(|| not_found(declaration.range().start))?;
        let id = file
            .find_by_source(real.key())
            .ok_or_else(|| not_found(declaration.range().start))?;
        let designation =
            Designation::for_declaration(&file, id, self.session().options.max_designation_depth)?;
        debug!(file = %file.name, offset = declaration.range().start, "dependent copy located");
        self.on_air(
            OnAirRequest {
                designation: &designation,
                updated: &declaration,
                replacement: None,
                record_inside: Some(element.clone()),
            },
            cancel,
        )
    }

    /// Resolve the declaration around `place` on air, recording the tower
    /// context at every statement and expression of it.
    pub fn tower_context_provider(
        &self,
        place: &SyntaxNode,
        cancel: &CancellationToken,
    ) -> Result<ResolveState, ResolveError> {
        let declaration = find_enclosing_non_local_declaration(place).ok_or_else(|| {
            ResolveError::DesignationNotFound {
                file: place.file_name().to_string(),
                offset: place.range().start,
            }
        })?;
        let designation = self.designation_for(&declaration)?;
        self.on_air(
            OnAirRequest {
                designation: &designation,
                updated: &declaration,
                replacement: None,
                record_inside: Some(declaration.clone()),
            },
            cancel,
        )
    }

    fn on_air(
        &self,
        request: OnAirRequest<'_>,
        cancel: &CancellationToken,
    ) -> Result<ResolveState, ResolveError> {
        self.base
            .resolve(request.designation, ResolvePhase::BodyResolve, cancel)?;
        let dependent = DependentResolveState::resolve_on_air(Arc::clone(&self.base), request, cancel)?;
        Ok(ResolveState::Dependent(Box::new(dependent)))
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Tower context recorded at `element` by an on-air request.
    pub fn get_tower_context(
        &self,
        state: &ResolveState,
        element: &SyntaxNode,
    ) -> Result<Option<TowerContext>, ResolveError> {
        Ok(state.as_dependent()?.tower_context(element).cloned())
    }

    pub fn expression_type(&self, state: &ResolveState, element: &SyntaxNode) -> Option<ConeType> {
        state.expression_type(element)
    }

    /// Bring every top-level declaration of `files` to `phase`, one file per
    /// worker.
    pub fn resolve_files_parallel(
        &self,
        files: &[FileId],
        phase: ResolvePhase,
        cancel: &CancellationToken,
    ) -> Result<(), ResolveError> {
        let max_depth = self.session().options.max_designation_depth;
        files.par_iter().try_for_each(|&file_id| {
            let file = self.base.snapshot(file_id)?;
            for &id in &file.declarations {
                let designation = Designation::new(&file, &[id], max_depth)?;
                self.base.resolve(&designation, phase, cancel)?;
            }
            Ok(())
        })
    }
}
