use super::{PhaseTransformer, TransformContext, range_of};
use lres_common::{DiagnosticKind, ResolveDiagnostic};
use lres_fir::{DeclId, FirFile, FirSession, ImportTarget, ResolveError, ResolvePhase};
use tracing::debug;

/// Resolves the file's imports the first time any declaration of the file
/// passes through. Nothing per declaration.
///
/// Imports that fail stay pending: every later writer pass over the file
/// retries them (see [`retry_unresolved_imports`]), so a class that appears
/// in a file opened afterwards is picked up. Declarations already past
/// `Types` keep the types they were given.
pub struct ImportsTransformer;

impl PhaseTransformer for ImportsTransformer {
    fn phase(&self) -> ResolvePhase {
        ResolvePhase::Imports
    }

    fn transform(&self, cx: &mut TransformContext<'_>, _id: DeclId) -> Result<(), ResolveError> {
        if !cx.file.imports_resolved {
            resolve_imports(cx.session, cx.file);
        }
        Ok(())
    }
}

/// Retry the imports that failed on an earlier pass. Returns whether any of
/// them resolved now.
pub fn retry_unresolved_imports(session: &FirSession, file: &mut FirFile) -> bool {
    let pending = file.imports.iter().filter(|i| i.resolved.is_none()).count();
    if !file.imports_resolved || pending == 0 {
        return false;
    }
    resolve_imports(session, file) < pending
}

/// Resolve every pending import of `file` and rebuild its unresolved-import
/// diagnostics. Returns the number still unresolved.
pub fn resolve_imports(session: &FirSession, file: &mut FirFile) -> usize {
    let own_classes = file.class_fq_names();
    let package = file.package.clone();
    let package_exists = |p: &str| {
        p == package
            || session.provider().has_package(p)
            || own_classes.iter().any(|c| c.starts_with(p) && c[p.len()..].starts_with('.'))
    };

    let mut diagnostics = Vec::new();
    for import in &mut file.imports {
        if import.resolved.is_some() {
            continue;
        }
        import.resolved = if import.is_star() {
            let target = import.path.trim_end_matches(".*");
            package_exists(target).then(|| ImportTarget::Package(target.to_string()))
        } else if own_classes.contains(&import.path) || session.provider().has_class(&import.path) {
            Some(ImportTarget::Class {
                fq_name: import.path.clone(),
            })
        } else {
            None
        };
        if import.resolved.is_none() {
            diagnostics.push(ResolveDiagnostic::new(
                DiagnosticKind::UnresolvedImport,
                format!("Unresolved import '{}'", import.path),
                range_of(import.source.as_ref()),
            ));
        }
    }
    let unresolved = file.imports.iter().filter(|i| i.resolved.is_none()).count();
    debug!(
        file = %file.name,
        imports = file.imports.len(),
        unresolved,
        "imports resolved"
    );
    file.diagnostics.retain(|d| d.kind != DiagnosticKind::UnresolvedImport);
    for diagnostic in diagnostics {
        if !file.diagnostics.contains(&diagnostic) {
            file.diagnostics.push(diagnostic);
        }
    }
    file.imports_resolved = true;
    unresolved
}
