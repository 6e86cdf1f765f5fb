//! Shared resolve state of the real files.
//!
//! Each open file has a published snapshot. A writer takes the file's write
//! lock, clones the snapshot (declarations are shared until touched),
//! resolves into the clone and swaps it in. Readers only ever take the
//! snapshot `Arc` and never wait for a writer. A writer that fails or is
//! cancelled publishes nothing.

use super::find_expression_type;
use crate::cancellation::{CancellationToken, Progress};
use crate::transformers::imports::retry_unresolved_imports;
use crate::transformers::{DesignatedResolver, ResolveMode, ResolveStats, TransformContext};
use dashmap::DashMap;
use lres_fir::{
    ConeType, Declaration, Designation, FileId, FirFile, FirSession, ResolveError, ResolvePhase,
};
use lres_syntax::SyntaxNode;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, debug_span, trace};

#[derive(Debug)]
struct FileEntry {
    write: Mutex<()>,
    snapshot: RwLock<Arc<FirFile>>,
    version: AtomicU64,
}

impl FileEntry {
    fn read(&self) -> Arc<FirFile> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn publish(&self, file: FirFile) {
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(file);
        self.version.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug)]
pub struct BaseResolveState {
    session: Arc<FirSession>,
    files: DashMap<FileId, Arc<FileEntry>>,
    invocations: AtomicU64,
}

impl BaseResolveState {
    pub fn new(session: Arc<FirSession>) -> BaseResolveState {
        BaseResolveState {
            session,
            files: DashMap::new(),
            invocations: AtomicU64::new(0),
        }
    }

    pub fn session(&self) -> &Arc<FirSession> {
        &self.session
    }

    pub fn open(&self, file: FirFile) -> FileId {
        let id = file.id;
        trace!(file = %file.name, ?id, "BaseResolveState::open");
        self.files.insert(
            id,
            Arc::new(FileEntry {
                write: Mutex::new(()),
                snapshot: RwLock::new(Arc::new(file)),
                version: AtomicU64::new(0),
            }),
        );
        id
    }

    /// Forget `id`; returns its last snapshot.
    pub fn close(&self, id: FileId) -> Option<Arc<FirFile>> {
        self.files.remove(&id).map(|(_, entry)| entry.read())
    }

    /// Open files, in id order.
    pub fn files(&self) -> Vec<FileId> {
        let mut ids: Vec<FileId> = self.files.iter().map(|e| *e.key()).collect();
        ids.sort();
        ids
    }

    fn entry(&self, id: FileId) -> Result<Arc<FileEntry>, ResolveError> {
        self.files
            .get(&id)
            .map(|e| Arc::clone(e.value()))
            .ok_or(ResolveError::UnknownFile(id))
    }

    pub fn snapshot(&self, id: FileId) -> Result<Arc<FirFile>, ResolveError> {
        Ok(self.entry(id)?.read())
    }

    /// Number of snapshots published for `id` since it was opened.
    pub fn version(&self, id: FileId) -> Result<u64, ResolveError> {
        Ok(self.entry(id)?.version.load(Ordering::SeqCst))
    }

    /// Total transformer invocations over the lifetime of the state.
    pub fn invocations(&self) -> u64 {
        self.invocations.load(Ordering::SeqCst)
    }

    /// The open file whose syntax tree holds `element`.
    pub fn file_of(&self, element: &SyntaxNode) -> Option<FileId> {
        let tree = element.tree_id();
        self.files
            .iter()
            .find(|e| e.value().read().syntax.tree_id() == tree)
            .map(|e| *e.key())
    }

    pub fn resolve(
        &self,
        designation: &Designation,
        phase: ResolvePhase,
        cancel: &CancellationToken,
    ) -> Result<Arc<Declaration>, ResolveError> {
        self.resolve_with_stats(designation, phase, cancel)
            .map(|(decl, _)| decl)
    }

    /// Bring the target of `designation` to `phase`.
    pub fn resolve_with_stats(
        &self,
        designation: &Designation,
        phase: ResolvePhase,
        cancel: &CancellationToken,
    ) -> Result<(Arc<Declaration>, ResolveStats), ResolveError> {
        let entry = self.entry(designation.file())?;
        let _writer = entry.write.lock().unwrap_or_else(PoisonError::into_inner);
        let current = entry.read();
        let _span = debug_span!(
            "resolve",
            file = %current.name,
            target = ?designation.target(),
            depth = designation.depth(),
            %phase
        )
        .entered();

        let mut working = FirFile::clone(&current);
        if retry_unresolved_imports(&self.session, &mut working) {
            debug!(file = %current.name, "previously unresolved imports resolved");
        }
        let mut progress = Progress::new(cancel.clone(), self.session.options.check_interval());
        let result = {
            let mut cx = TransformContext::new(&self.session, &mut working, &mut progress);
            DesignatedResolver::new(designation, phase, ResolveMode::Lazy).resolve(&mut cx)
        };
        let stats = match result {
            Ok(stats) => stats,
            Err(err) => {
                debug!(file = %current.name, %phase, error = %err, "resolution aborted, nothing published");
                return Err(err);
            }
        };

        let decl = working
            .decl_arc(designation.target())
            .cloned()
            .ok_or_else(|| ResolveError::invalid_designation("target is not in the file"))?;
        if changed(&current, &working) {
            entry.publish(working);
        }
        self.invocations
            .fetch_add(u64::from(stats.invocations + stats.dependency_invocations), Ordering::SeqCst);
        Ok((decl, stats))
    }

    /// Type recorded on the expression built from `element`.
    pub fn expression_type(&self, element: &SyntaxNode) -> Option<ConeType> {
        let file = self.snapshot(self.file_of(element)?).ok()?;
        find_expression_type(&file, element.key())
    }

    /// The declaration built from `element` in its open file.
    pub fn find_declaration(&self, element: &SyntaxNode) -> Option<Arc<Declaration>> {
        let file = self.snapshot(self.file_of(element)?).ok()?;
        let id = file.find_by_source(element.key())?;
        file.decl_arc(id).cloned()
    }
}

fn changed(before: &FirFile, after: &FirFile) -> bool {
    before.imports_resolved != after.imports_resolved
        || before.imports != after.imports
        || before.arena.len() != after.arena.len()
        || after.arena.ids().any(|id| !after.arena.shares_slot(&before.arena, id))
}
