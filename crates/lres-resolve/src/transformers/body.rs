//! Body resolution.
//!
//! Resolves every name and call in a body against the tower, types every
//! expression, and infers implicit result types. When a collector is
//! present, the tower at each statement and expression is recorded.
//!
//! A body that uses another declaration of the file whose type is not known
//! yet brings that declaration far enough first: to `Types` when its type is
//! written out, to `BodyResolve` when it has to be inferred. A cycle of
//! inferred types ends in an error type on the use that closes it.

use super::designated::{DesignatedResolver, ResolveMode};
use super::{PhaseTransformer, TransformContext, range_of};
use crate::cancellation::Progress;
use crate::scope::{add_members, build_tower, resolve_type_name};
use crate::tower::{ScopeEntry, TowerContext, TowerContextCollector, TowerLevel, TowerLevelKind};
use lres_common::{DiagnosticKind, ResolveDiagnostic};
use lres_fir::{
    Accessor, Block, BuiltinType, ConeType, DeclData, DeclId, Declaration, Designation, Expr,
    ExprKind, FirFile, FirSession, LocalVariable, ResolveError, ResolvePhase, Statement, SymbolId,
    TypeRef, ValueParameter,
};
use lres_syntax::SourceElement;
use tracing::trace_span;

pub struct BodyResolveTransformer;

impl PhaseTransformer for BodyResolveTransformer {
    fn phase(&self) -> ResolvePhase {
        ResolvePhase::BodyResolve
    }

    fn transform(&self, cx: &mut TransformContext<'_>, id: DeclId) -> Result<(), ResolveError> {
        let decl = cx.decl(id)?;
        resolve_dependencies(cx, id, &decl)?;
        let tower = build_tower(cx.session, cx.file, &cx.containers, &decl);
        let mut resolver = BodyResolver {
            session: cx.session,
            file: cx.file,
            tower,
            collector: cx.collector.as_deref_mut(),
            progress: &mut *cx.progress,
            diagnostics: Vec::new(),
        };

        let mut updated = Declaration::clone(&decl);
        match &mut updated.data {
            DeclData::Class(class) => {
                let mut members = TowerLevel::new(TowerLevelKind::Class {
                    name: decl.name.clone(),
                });
                add_members(resolver.session, resolver.file, &class.members, &mut members, true);
                resolver.tower.push(members);
                resolver.record(decl.source.as_ref());
            }
            DeclData::Function(function) => {
                resolver.record(decl.source.as_ref());
                resolver.push_parameters(&function.value_parameters);
                if let Some(body) = &mut function.body {
                    resolver.resolve_block(body)?;
                }
                if function.return_type == TypeRef::Implicit {
                    let inferred = function
                        .body
                        .as_ref()
                        .and_then(|b| first_return_type(b, decl.symbol))
                        .unwrap_or(ConeType::UNIT);
                    function.return_type = TypeRef::Inferred(inferred);
                }
            }
            DeclData::Property(property) => {
                resolver.record(decl.source.as_ref());
                if let Some(initializer) = &mut property.initializer {
                    resolver.resolve_expr(initializer)?;
                }
                for accessor in [&mut property.getter, &mut property.setter]
                    .into_iter()
                    .flatten()
                {
                    resolver.resolve_accessor(accessor)?;
                }
                if property.return_type == TypeRef::Implicit {
                    let inferred = property
                        .initializer
                        .as_ref()
                        .and_then(|i| i.ty.clone())
                        .or_else(|| {
                            let getter = property.getter.as_ref()?;
                            first_return_type(getter.body.as_ref()?, getter.symbol)
                        });
                    let inferred = inferred.unwrap_or_else(|| {
                        resolver.report(
                            DiagnosticKind::ImplicitTypeNotInferred,
                            format!("Cannot infer the type of property '{}'", decl.name),
                            decl.source.as_ref(),
                        );
                        ConeType::Error(decl.name.clone())
                    });
                    property.return_type = TypeRef::Inferred(inferred.clone());
                    fill_accessor_types(property.getter.as_mut(), property.setter.as_mut(), &inferred);
                }
            }
            DeclData::TypeAlias(_) => {}
        }

        let diagnostics = std::mem::take(&mut resolver.diagnostics);
        for diagnostic in diagnostics {
            updated.report(diagnostic);
        }
        cx.file.arena.replace(id, updated);
        Ok(())
    }

    fn need_replace_phase(&self, _decl: &Declaration) -> bool {
        true
    }
}

// =============================================================================
// Dependencies
// =============================================================================

/// Bring the declarations the body of `decl` uses up to the phase their
/// types are known at.
fn resolve_dependencies(
    cx: &mut TransformContext<'_>,
    id: DeclId,
    decl: &Declaration,
) -> Result<(), ResolveError> {
    let names = used_names(decl);
    if names.is_empty() {
        return Ok(());
    }
    let mut tower = build_tower(cx.session, cx.file, &cx.containers, decl);
    if let Some(function) = decl.as_function() {
        let mut parameters = TowerLevel::new(TowerLevelKind::ValueParameters);
        for parameter in &function.value_parameters {
            parameters.add_value(parameter.name.clone(), ScopeEntry::new(Some(parameter.symbol), None));
        }
        tower.push(parameters);
    }

    let mut pending: Vec<DeclId> = Vec::new();
    for name in &names {
        let Some(entry) = tower.lookup_value(name) else {
            continue;
        };
        if entry.ty.is_some() {
            continue;
        }
        let Some(dependency) = entry.symbol.and_then(|s| cx.file.find_by_symbol(s)) else {
            continue;
        };
        if dependency != id && !cx.resolving.contains(&dependency) && !pending.contains(&dependency) {
            pending.push(dependency);
        }
    }

    cx.resolving.push(id);
    let result = pending
        .into_iter()
        .try_for_each(|dependency| resolve_dependency(cx, dependency));
    cx.resolving.pop();
    result
}

fn resolve_dependency(cx: &mut TransformContext<'_>, id: DeclId) -> Result<(), ResolveError> {
    let Some(decl) = cx.file.decl(id) else {
        return Ok(());
    };
    let phase = match decl.return_type() {
        Some(TypeRef::Implicit) => ResolvePhase::BodyResolve,
        _ => ResolvePhase::Types,
    };
    if decl.phase >= phase {
        return Ok(());
    }
    // Members of local classes have no designation; their uses stay untyped.
    let Ok(designation) =
        Designation::for_declaration(cx.file, id, cx.session.options.max_designation_depth)
    else {
        return Ok(());
    };
    let _span = trace_span!("dependency", name = %decl.name, %phase).entered();

    let mut nested = TransformContext::new(cx.session, &mut *cx.file, &mut *cx.progress);
    nested.resolving = std::mem::take(&mut cx.resolving);
    let result = DesignatedResolver::new(&designation, phase, ResolveMode::Lazy).resolve(&mut nested);
    cx.resolving = std::mem::take(&mut nested.resolving);
    let stats = result?;
    cx.dependency_invocations += stats.invocations + stats.dependency_invocations;
    Ok(())
}

/// Names read or called anywhere in the bodies and initializer of `decl`.
fn used_names(decl: &Declaration) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut visit = |expr: &Expr| {
        let name = match &expr.kind {
            ExprKind::Name { name, .. } => name,
            ExprKind::Call { callee, .. } => callee,
            _ => return,
        };
        if !names.contains(name) {
            names.push(name.clone());
        }
    };
    for body in decl.bodies() {
        body.walk(&mut visit);
    }
    if let Some(initializer) = decl.as_property().and_then(|p| p.initializer.as_ref()) {
        initializer.walk(&mut visit);
    }
    names
}

// =============================================================================
// Inference
// =============================================================================

/// Type of the value of the first return bound to `owner`; `Unit` for a
/// bare `return`.
fn first_return_type(block: &Block, owner: SymbolId) -> Option<ConeType> {
    let mut found = None;
    block.walk(&mut |expr| {
        if found.is_some() {
            return;
        }
        if let ExprKind::Return { target, value } = &expr.kind {
            if target.bound == Some(owner) {
                found = Some(match value {
                    Some(value) => value
                        .ty
                        .clone()
                        .unwrap_or_else(|| ConeType::Error("return".to_string())),
                    None => ConeType::UNIT,
                });
            }
        }
    });
    found
}

fn fill_accessor_types(getter: Option<&mut Accessor>, setter: Option<&mut Accessor>, ty: &ConeType) {
    if let Some(getter) = getter {
        if getter.return_type == TypeRef::Implicit {
            getter.return_type = TypeRef::Inferred(ty.clone());
        }
    }
    if let Some(parameter) = setter.and_then(|s| s.value_parameter.as_mut()) {
        if parameter.return_type == TypeRef::Implicit {
            parameter.return_type = TypeRef::Inferred(ty.clone());
        }
    }
}

struct BodyResolver<'a> {
    session: &'a FirSession,
    file: &'a FirFile,
    tower: TowerContext,
    collector: Option<&'a mut TowerContextCollector>,
    progress: &'a mut Progress,
    diagnostics: Vec<ResolveDiagnostic>,
}

impl BodyResolver<'_> {
    fn record(&mut self, source: Option<&SourceElement>) {
        if let Some(collector) = self.collector.as_deref_mut() {
            collector.record(source, &self.tower);
        }
    }

    fn report(&mut self, kind: DiagnosticKind, message: String, source: Option<&SourceElement>) {
        let diagnostic = ResolveDiagnostic::new(kind, message, range_of(source));
        if !self.diagnostics.contains(&diagnostic) {
            self.diagnostics.push(diagnostic);
        }
    }

    /// Type of a use of `name`; an error type when the declaration it refers
    /// to has no type yet (its type depends on this body).
    fn known_or_error(
        &mut self,
        ty: Option<ConeType>,
        name: &str,
        source: Option<&SourceElement>,
    ) -> ConeType {
        ty.unwrap_or_else(|| {
            self.report(
                DiagnosticKind::ImplicitTypeNotInferred,
                format!("Type of '{name}' cannot be inferred here: it depends on itself"),
                source,
            );
            ConeType::Error(name.to_string())
        })
    }

    fn push_parameters(&mut self, parameters: &[ValueParameter]) {
        let mut level = TowerLevel::new(TowerLevelKind::ValueParameters);
        for parameter in parameters {
            level.add_value(
                parameter.name.clone(),
                ScopeEntry::new(Some(parameter.symbol), parameter.return_type.cone_type().cloned()),
            );
        }
        self.tower.push(level);
    }

    fn resolve_accessor(&mut self, accessor: &mut Accessor) -> Result<(), ResolveError> {
        let parameters: Vec<ValueParameter> = accessor.value_parameter.iter().cloned().collect();
        self.push_parameters(&parameters);
        self.record(accessor.source.as_ref());
        if let Some(body) = &mut accessor.body {
            self.resolve_block(body)?;
        }
        self.tower.pop();
        Ok(())
    }

    fn resolve_block(&mut self, block: &mut Block) -> Result<(), ResolveError> {
        let file = self.file;
        self.tower.push(TowerLevel::new(TowerLevelKind::Locals));
        for statement in &mut block.statements {
            self.progress.tick()?;
            match statement {
                Statement::Expr(expr) => self.resolve_expr(expr)?,
                Statement::Local(local) => self.resolve_local(local)?,
                Statement::LocalClass(id) => {
                    if let Some(class) = file.decl(*id) {
                        let entry = ScopeEntry::new(
                            Some(class.symbol),
                            class.as_class().map(|c| c.self_type.clone()),
                        );
                        self.record(class.source.as_ref());
                        self.add_local_type(class.name.clone(), entry);
                    }
                }
            }
        }
        self.tower.pop();
        Ok(())
    }

    fn add_local_type(&mut self, name: String, entry: ScopeEntry) {
        if let Some(locals) = self.tower.innermost_mut(&TowerLevelKind::Locals) {
            locals.add_type(name, entry);
        }
    }

    fn resolve_local(&mut self, local: &mut LocalVariable) -> Result<(), ResolveError> {
        self.record(local.source.as_ref());
        if let Some(initializer) = &mut local.initializer {
            self.resolve_expr(initializer)?;
        }
        local.return_type = match std::mem::replace(&mut local.return_type, TypeRef::Implicit) {
            TypeRef::Unresolved { name, source } => {
                let ty = resolve_type_name(self.session, self.file, &self.tower, &name)
                    .unwrap_or_else(|| {
                        self.report(
                            DiagnosticKind::UnresolvedType,
                            format!("Unresolved type '{name}'"),
                            source.as_ref(),
                        );
                        ConeType::Error(name.clone())
                    });
                TypeRef::Resolved { ty, source }
            }
            TypeRef::Implicit => {
                let inferred = local.initializer.as_ref().and_then(|i| i.ty.clone());
                TypeRef::Inferred(inferred.unwrap_or_else(|| {
                    self.report(
                        DiagnosticKind::ImplicitTypeNotInferred,
                        format!("Cannot infer the type of '{}'", local.name),
                        local.source.as_ref(),
                    );
                    ConeType::Error(local.name.clone())
                }))
            }
            resolved => resolved,
        };
        let entry = ScopeEntry::new(Some(local.symbol), local.return_type.cone_type().cloned());
        if let Some(locals) = self.tower.innermost_mut(&TowerLevelKind::Locals) {
            locals.add_value(local.name.clone(), entry);
        }
        Ok(())
    }

    fn resolve_expr(&mut self, expr: &mut Expr) -> Result<(), ResolveError> {
        self.progress.tick()?;
        self.record(expr.source.as_ref());
        let source = expr.source.clone();
        expr.ty = match &mut expr.kind {
            ExprKind::IntLiteral(_) => Some(ConeType::Builtin(BuiltinType::Int)),
            ExprKind::StringLiteral(_) => Some(ConeType::Builtin(BuiltinType::String)),
            ExprKind::BooleanLiteral(_) => Some(ConeType::Builtin(BuiltinType::Boolean)),
            ExprKind::Name { name, resolved } => match self.tower.lookup_value(name) {
                Some(entry) => {
                    *resolved = entry.symbol;
                    let ty = entry.ty.clone();
                    Some(self.known_or_error(ty, name, source.as_ref()))
                }
                None => {
                    let message = format!("Unresolved reference '{name}'");
                    let ty = ConeType::Error(name.clone());
                    self.report(DiagnosticKind::UnresolvedReference, message, source.as_ref());
                    Some(ty)
                }
            },
            ExprKind::Call {
                callee,
                resolved,
                args,
            } => {
                for arg in args.iter_mut() {
                    self.resolve_expr(arg)?;
                }
                if let Some(entry) = self.tower.lookup_value(callee) {
                    *resolved = entry.symbol;
                    let ty = entry.ty.clone();
                    Some(self.known_or_error(ty, callee, source.as_ref()))
                } else if let Some(ty) =
                    resolve_type_name(self.session, self.file, &self.tower, callee)
                {
                    // Constructor call.
                    Some(ty)
                } else {
                    let message = format!("Unresolved reference '{callee}'");
                    let ty = ConeType::Error(callee.clone());
                    self.report(DiagnosticKind::UnresolvedReference, message, source.as_ref());
                    Some(ty)
                }
            }
            ExprKind::Return { target, value } => {
                if let Some(value) = value {
                    self.resolve_expr(value)?;
                }
                if target.bound.is_none() {
                    let message = match &target.label {
                        Some(label) => format!("No enclosing function named '{label}'"),
                        None => "'return' outside of a function".to_string(),
                    };
                    self.report(DiagnosticKind::UnboundReturnTarget, message, source.as_ref());
                }
                Some(ConeType::NOTHING)
            }
        };
        Ok(())
    }
}
