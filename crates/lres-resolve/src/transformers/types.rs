use super::{PhaseTransformer, TransformContext, range_of};
use crate::scope::{build_tower, resolve_type_name};
use crate::tower::TowerContext;
use lres_common::{DiagnosticKind, ResolveDiagnostic};
use lres_fir::{
    ConeType, DeclData, DeclId, Declaration, FirFile, FirSession, ResolveError, ResolvePhase,
    TypeParameter, TypeRef,
};
use lres_syntax::navigator;

/// Resolves every explicit type in a declaration header: type parameter
/// bounds, value parameter types, return and property types, accessor types
/// and type alias expansions.
pub struct TypesTransformer;

impl PhaseTransformer for TypesTransformer {
    fn phase(&self) -> ResolvePhase {
        ResolvePhase::Types
    }

    fn transform(&self, cx: &mut TransformContext<'_>, id: DeclId) -> Result<(), ResolveError> {
        let decl = cx.decl(id)?;
        let tower = build_tower(cx.session, cx.file, &cx.containers, &decl);
        let mut resolver = HeaderResolver {
            session: cx.session,
            file: cx.file,
            tower: &tower,
            diagnostics: Vec::new(),
        };

        let mut updated = Declaration::clone(&decl);
        for parameter in &mut updated.type_parameters {
            for bound in &mut parameter.bounds {
                resolver.resolve(bound);
            }
            resolver.check_constraints(parameter);
        }
        match &mut updated.data {
            DeclData::Function(function) => {
                for parameter in &mut function.value_parameters {
                    resolver.resolve(&mut parameter.return_type);
                }
                resolver.resolve(&mut function.return_type);
            }
            DeclData::Property(property) => {
                resolver.resolve(&mut property.return_type);
                for accessor in [&mut property.getter, &mut property.setter]
                    .into_iter()
                    .flatten()
                {
                    if let Some(parameter) = &mut accessor.value_parameter {
                        resolver.resolve(&mut parameter.return_type);
                    }
                    resolver.resolve(&mut accessor.return_type);
                }
            }
            DeclData::TypeAlias(alias) => resolver.resolve(&mut alias.expanded),
            DeclData::Class(_) => {}
        }

        let diagnostics = resolver.diagnostics;
        for diagnostic in diagnostics {
            updated.report(diagnostic);
        }
        cx.file.arena.replace(id, updated);
        Ok(())
    }

    /// A copy keeps its header but may bring fresh unresolved types (a type
    /// alias takes its expansion from the edit).
    fn need_replace_phase(&self, decl: &Declaration) -> bool {
        has_unresolved_types(decl)
    }
}

pub fn has_unresolved_types(decl: &Declaration) -> bool {
    let unresolved = |t: &TypeRef| matches!(t, TypeRef::Unresolved { .. });
    if decl
        .type_parameters
        .iter()
        .flat_map(|p| &p.bounds)
        .any(unresolved)
    {
        return true;
    }
    match &decl.data {
        DeclData::Function(function) => {
            unresolved(&function.return_type)
                || function
                    .value_parameters
                    .iter()
                    .any(|p| unresolved(&p.return_type))
        }
        DeclData::Property(property) => {
            unresolved(&property.return_type)
                || [&property.getter, &property.setter]
                    .into_iter()
                    .flatten()
                    .any(|a| {
                        unresolved(&a.return_type)
                            || a.value_parameter
                                .as_ref()
                                .is_some_and(|p| unresolved(&p.return_type))
                    })
        }
        DeclData::TypeAlias(alias) => unresolved(&alias.expanded),
        DeclData::Class(class) => class.super_types.iter().any(unresolved),
    }
}

struct HeaderResolver<'a> {
    session: &'a FirSession,
    file: &'a FirFile,
    tower: &'a TowerContext,
    diagnostics: Vec<ResolveDiagnostic>,
}

impl HeaderResolver<'_> {
    /// Resolve `ty` in place. A name that cannot be found becomes an error
    /// type, so the declaration still reaches the phase.
    fn resolve(&mut self, ty: &mut TypeRef) {
        let TypeRef::Unresolved { name, source } = ty else {
            return;
        };
        let resolved = resolve_type_name(self.session, self.file, self.tower, name)
            .unwrap_or_else(|| {
                self.diagnostics.push(ResolveDiagnostic::new(
                    DiagnosticKind::UnresolvedType,
                    format!("Unresolved type '{name}'"),
                    range_of(source.as_ref()),
                ));
                ConeType::Error(name.clone())
            });
        *ty = TypeRef::Resolved {
            ty: resolved,
            source: source.take(),
        };
    }

    /// A parameter bounded both inline and in a `where` clause.
    fn check_constraints(&mut self, parameter: &TypeParameter) {
        let in_where = |b: &TypeRef| navigator::is_in_type_constraint(b.source());
        let has_inline = parameter.bounds.iter().any(|b| !in_where(b) && b.source().is_some());
        let has_where = parameter.bounds.iter().any(in_where);
        if has_inline && has_where {
            self.diagnostics.push(ResolveDiagnostic::new(
                DiagnosticKind::MisplacedTypeParameterConstraints,
                format!(
                    "Type parameter '{}' has an inline bound and 'where' constraints",
                    parameter.name
                ),
                range_of(parameter.source.as_ref()),
            ));
        }
    }
}
