use super::{PhaseTransformer, TransformContext, range_of};
use crate::scope::{build_tower, resolve_type_name};
use lres_common::{DiagnosticKind, ResolveDiagnostic};
use lres_fir::{ConeType, DeclData, DeclId, ResolveError, ResolvePhase, TypeRef};
use lres_syntax::navigator;

/// Resolves the supertype list of a class. A class without supertypes gets
/// `Any`; at most one supertype may be a class (a constructor call entry).
pub struct SuperTypesTransformer;

impl PhaseTransformer for SuperTypesTransformer {
    fn phase(&self) -> ResolvePhase {
        ResolvePhase::SuperTypes
    }

    fn transform(&self, cx: &mut TransformContext<'_>, id: DeclId) -> Result<(), ResolveError> {
        let decl = cx.decl(id)?;
        let Some(class) = decl.as_class() else {
            return Ok(());
        };
        let tower = build_tower(cx.session, cx.file, &cx.containers, &decl);

        let mut diagnostics = Vec::new();
        let mut super_types: Vec<TypeRef> = class
            .super_types
            .iter()
            .map(|st| match st {
                TypeRef::Unresolved { name, source } => {
                    let ty = resolve_type_name(cx.session, cx.file, &tower, name).unwrap_or_else(|| {
                        diagnostics.push(ResolveDiagnostic::new(
                            DiagnosticKind::UnresolvedType,
                            format!("Unresolved supertype '{name}'"),
                            range_of(source.as_ref()),
                        ));
                        ConeType::Error(name.clone())
                    });
                    TypeRef::Resolved {
                        ty,
                        source: source.clone(),
                    }
                }
                other => other.clone(),
            })
            .collect();

        let class_supertypes = super_types
            .iter()
            .filter(|st| navigator::is_in_constructor_callee(st.source()))
            .count();
        if class_supertypes > 1 {
            diagnostics.push(ResolveDiagnostic::new(
                DiagnosticKind::ManyClassSupertypes,
                format!("Class '{}' has {class_supertypes} class supertypes", decl.name),
                range_of(decl.source.as_ref()),
            ));
        }
        if super_types.is_empty() {
            super_types.push(TypeRef::resolved(ConeType::ANY));
        }

        cx.file.arena.update(id, |d| {
            if let DeclData::Class(class) = &mut d.data {
                class.super_types = super_types;
            }
            for diagnostic in diagnostics {
                d.report(diagnostic);
            }
        });
        Ok(())
    }
}
