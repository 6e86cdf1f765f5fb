//! The designated driver.
//!
//! Runs the stages up to a target phase along one designation, in phase
//! order. Containers get the header stages only; the target gets every
//! stage, and so does everything nested in it. Siblings of the path are
//! never visited, so the work is bounded by the depth of the designation
//! and the size of the target.

use super::{PhaseTransformer, TransformContext, transformer_for};
use lres_fir::{DeclId, Designation, FirFile, ResolveError, ResolvePhase};
use tracing::{debug, trace};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ResolveMode {
    /// Bring the real declarations up to the phase.
    Lazy,
    /// Resolve a speculative copy; the target may redo stages its marker
    /// already shows.
    OnAir,
}

/// What one driver run did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolveStats {
    /// Number of transformer invocations on the designation.
    pub invocations: u32,
    /// Invocations on other declarations of the file that a resolved body
    /// needed the types of.
    pub dependency_invocations: u32,
    /// Each invocation, in order.
    pub trace: Vec<(DeclId, ResolvePhase)>,
}

impl ResolveStats {
    pub fn merge(&mut self, other: ResolveStats) {
        self.invocations += other.invocations;
        self.dependency_invocations += other.dependency_invocations;
        self.trace.extend(other.trace);
    }
}

pub struct DesignatedResolver<'d> {
    designation: &'d Designation,
    target_phase: ResolvePhase,
    mode: ResolveMode,
}

impl<'d> DesignatedResolver<'d> {
    pub fn new(designation: &'d Designation, target_phase: ResolvePhase, mode: ResolveMode) -> Self {
        DesignatedResolver {
            designation,
            target_phase,
            mode,
        }
    }

    pub fn resolve(&self, cx: &mut TransformContext<'_>) -> Result<ResolveStats, ResolveError> {
        let containers = self.designation.containers();
        let target = self.designation.target();
        let content = nested_content(cx.file, target, containers);
        let mut stats = ResolveStats::default();

        for phase in self.target_phase.stages_up_to() {
            let Some(transformer) = transformer_for(phase) else {
                continue;
            };
            if phase.is_header() {
                for (depth, &container) in containers.iter().enumerate() {
                    self.run(cx, transformer, container, &containers[..depth], false, &mut stats)?;
                }
            }
            self.run(cx, transformer, target, containers, true, &mut stats)?;
            for (id, scope) in &content {
                self.run(cx, transformer, *id, scope, false, &mut stats)?;
            }
        }

        debug!(
            target = ?target,
            depth = self.designation.depth(),
            phase = %self.target_phase,
            mode = ?self.mode,
            invocations = stats.invocations,
            dependencies = stats.dependency_invocations,
            "designation resolved"
        );
        Ok(stats)
    }

    fn run(
        &self,
        cx: &mut TransformContext<'_>,
        transformer: &dyn PhaseTransformer,
        id: DeclId,
        containers: &[DeclId],
        is_target: bool,
        stats: &mut ResolveStats,
    ) -> Result<(), ResolveError> {
        let phase = transformer.phase();
        let decl = cx.decl(id)?;
        if decl.phase > phase {
            return Ok(());
        }
        if decl.phase == phase {
            let replace =
                self.mode == ResolveMode::OnAir && is_target && transformer.need_replace_phase(&decl);
            if !replace {
                return Ok(());
            }
            trace!(name = %decl.name, %phase, "redoing phase on speculative target");
        }
        cx.containers = containers.to_vec();
        let applied = transformer.apply(cx, id)?;
        stats.dependency_invocations += std::mem::take(&mut cx.dependency_invocations);
        if applied {
            stats.invocations += 1;
            stats.trace.push((id, phase));
        }
        Ok(())
    }
}

/// Declarations nested in `root` (class members, classes local to bodies),
/// each with its chain of enclosing classes.
fn nested_content(file: &FirFile, root: DeclId, containers: &[DeclId]) -> Vec<(DeclId, Vec<DeclId>)> {
    fn collect(
        file: &FirFile,
        id: DeclId,
        scope: &mut Vec<DeclId>,
        out: &mut Vec<(DeclId, Vec<DeclId>)>,
    ) {
        let Some(decl) = file.decl(id) else {
            return;
        };
        let mut nested: Vec<DeclId> = decl.members().to_vec();
        for body in decl.bodies() {
            nested.extend(body.local_classes());
        }
        if nested.is_empty() {
            return;
        }
        let is_class = decl.as_class().is_some();
        if is_class {
            scope.push(id);
        }
        for child in nested {
            out.push((child, scope.clone()));
            collect(file, child, scope, out);
        }
        if is_class {
            scope.pop();
        }
    }

    let mut out = Vec::new();
    let mut scope = containers.to_vec();
    collect(file, root, &mut scope, &mut out);
    out
}
