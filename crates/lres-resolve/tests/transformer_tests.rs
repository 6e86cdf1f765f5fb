use super::*;
use lres_common::{DiagnosticKind, ResolveOptions};
use lres_fir::{
    BuiltinType, ConeType, ContractDescription, ContractEffect, DeclData, Designation, Expr,
    ExprKind, FirFile, FirSession, ImportTarget, InMemoryProvider, ResolveError, ResolvePhase,
    Statement, TypeRef, build_file,
};
use lres_syntax::factory::{
    ClassSpec, ExprSpec, FileSpec, FunctionSpec, PropertySpec, SyntaxFactory, TypeAliasSpec,
};
use lres_syntax::{SyntaxKind, TreeBuilder, TreeOrigin};
use std::sync::Arc;

fn session_with(classes: &[&str]) -> FirSession {
    FirSession::new(
        ResolveOptions::default(),
        Arc::new(InMemoryProvider::with_classes(classes.iter().copied())),
    )
}

fn build(session: &FirSession, spec: &FileSpec) -> FirFile {
    let tree = SyntaxFactory::file(spec, "t.kt");
    build_file(session, &tree.root()).expect("file")
}

fn resolve_path(
    session: &FirSession,
    file: &mut FirFile,
    names: &[&str],
    phase: ResolvePhase,
    mode: ResolveMode,
) -> Result<ResolveStats, ResolveError> {
    let path = file.find_path(names).expect("path");
    let designation = Designation::new(file, &path, 64).expect("designation");
    let mut progress = Progress::new(CancellationToken::new(), 16);
    let mut cx = TransformContext::new(session, file, &mut progress);
    DesignatedResolver::new(&designation, phase, mode).resolve(&mut cx)
}

fn resolve(
    session: &FirSession,
    file: &mut FirFile,
    names: &[&str],
    phase: ResolvePhase,
) -> ResolveStats {
    resolve_path(session, file, names, phase, ResolveMode::Lazy).expect("resolved")
}

fn decl<'a>(file: &'a FirFile, names: &[&str]) -> &'a lres_fir::Declaration {
    let path = file.find_path(names).expect("path");
    file.decl(path[path.len() - 1]).expect("declaration")
}

fn has_diagnostic(decl: &lres_fir::Declaration, kind: DiagnosticKind) -> bool {
    decl.diagnostics.iter().any(|d| d.kind == kind)
}

fn int() -> ConeType {
    ConeType::Builtin(BuiltinType::Int)
}

// =============================================================================
// Imports
// =============================================================================

#[test]
fn test_imports_resolve_class_star_and_unresolved() {
    let session = session_with(&["lib.Widget"]);
    let spec = FileSpec::new()
        .package("app")
        .import("lib.Widget")
        .import("lib.*")
        .import("missing.Thing")
        .decl(FunctionSpec::new("f").empty_body());
    let mut file = build(&session, &spec);

    resolve(&session, &mut file, &["f"], ResolvePhase::Imports);

    assert!(file.imports_resolved);
    assert_eq!(
        file.imports[0].resolved,
        Some(ImportTarget::Class {
            fq_name: "lib.Widget".to_string()
        })
    );
    assert_eq!(file.imports[1].resolved, Some(ImportTarget::Package("lib".to_string())));
    assert_eq!(file.imports[2].resolved, None);
    assert_eq!(file.diagnostics.len(), 1);
    assert_eq!(file.diagnostics[0].kind, DiagnosticKind::UnresolvedImport);
    assert_eq!(decl(&file, &["f"]).phase, ResolvePhase::Imports);
}

// =============================================================================
// Supertypes
// =============================================================================

#[test]
fn test_class_without_supertypes_gets_any() {
    let session = session_with(&[]);
    let mut file = build(&session, &FileSpec::new().decl(ClassSpec::new("A")));
    resolve(&session, &mut file, &["A"], ResolvePhase::SuperTypes);

    let class = decl(&file, &["A"]).as_class().expect("class");
    assert_eq!(class.super_types, vec![TypeRef::resolved(ConeType::ANY)]);
}

#[test]
fn test_supertypes_resolved_against_provider() {
    let session = session_with(&["Base", "Iface"]);
    let spec = FileSpec::new().decl(ClassSpec::new("A").extends("Base").implements("Iface"));
    let mut file = build(&session, &spec);
    resolve(&session, &mut file, &["A"], ResolvePhase::SuperTypes);

    let a = decl(&file, &["A"]);
    let types: Vec<_> = a
        .as_class()
        .expect("class")
        .super_types
        .iter()
        .map(|t| t.cone_type().cloned())
        .collect();
    assert_eq!(types, vec![Some(ConeType::class("Base")), Some(ConeType::class("Iface"))]);
    assert!(a.diagnostics.is_empty(), "{:?}", a.diagnostics);
}

#[test]
fn test_two_class_supertypes_are_reported() {
    let mut b = TreeBuilder::new();
    b.start_node(SyntaxKind::File)
        .start_node(SyntaxKind::Class)
        .token(SyntaxKind::Keyword, "class")
        .token(SyntaxKind::Identifier, "C")
        .start_node(SyntaxKind::SuperTypeList);
    for base in ["Base", "Other"] {
        b.start_node(SyntaxKind::SuperTypeCallEntry)
            .start_node(SyntaxKind::ConstructorCallee)
            .start_node(SyntaxKind::TypeReference)
            .token(SyntaxKind::Identifier, base)
            .finish_node()
            .finish_node()
            .start_node(SyntaxKind::ValueArgumentList)
            .finish_node()
            .finish_node();
    }
    b.finish_node().finish_node().finish_node();
    let tree = b.finish("c.kt", TreeOrigin::Physical);

    let session = session_with(&["Base", "Other"]);
    let mut file = build_file(&session, &tree.root()).expect("file");
    resolve(&session, &mut file, &["C"], ResolvePhase::SuperTypes);

    assert!(has_diagnostic(decl(&file, &["C"]), DiagnosticKind::ManyClassSupertypes));
}

// =============================================================================
// Types
// =============================================================================

#[test]
fn test_header_types_resolve_through_scopes() {
    let session = session_with(&["lib.Widget"]);
    let spec = FileSpec::new().import("lib.Widget").decl(
        ClassSpec::new("Outer").type_param("T").member(
            ClassSpec::new("Inner").inner().member(
                FunctionSpec::new("f")
                    .param("a", "T")
                    .param("b", "Int")
                    .param("c", "Outer")
                    .param("d", "Missing")
                    .returns("Widget")
                    .empty_body(),
            ),
        ),
    );
    let mut file = build(&session, &spec);
    resolve(&session, &mut file, &["Outer", "Inner", "f"], ResolvePhase::Types);

    let f = decl(&file, &["Outer", "Inner", "f"]);
    let function = f.as_function().expect("function");
    let types: Vec<_> = function
        .value_parameters
        .iter()
        .map(|p| p.return_type.cone_type().cloned().expect("resolved"))
        .collect();
    assert!(matches!(&types[0], ConeType::TypeParameter { name, .. } if name == "T"));
    assert_eq!(types[1], int());
    assert_eq!(types[2], ConeType::class("Outer"));
    assert!(types[3].is_error());
    assert_eq!(function.return_type.cone_type(), Some(&ConeType::class("lib.Widget")));
    assert!(has_diagnostic(f, DiagnosticKind::UnresolvedType));
}

#[test]
fn test_nested_class_does_not_see_outer_type_parameters() {
    let session = session_with(&[]);
    let spec = FileSpec::new().decl(
        ClassSpec::new("Outer")
            .type_param("T")
            .member(ClassSpec::new("Nested").member(FunctionSpec::new("g").param("x", "T").empty_body())),
    );
    let mut file = build(&session, &spec);
    resolve(&session, &mut file, &["Outer", "Nested", "g"], ResolvePhase::Types);

    let g = decl(&file, &["Outer", "Nested", "g"]);
    let parameter = &g.as_function().expect("function").value_parameters[0];
    assert!(parameter.return_type.cone_type().is_some_and(ConeType::is_error));
    assert!(has_diagnostic(g, DiagnosticKind::UnresolvedType));
}

#[test]
fn test_inline_bound_with_where_clause_is_misplaced() {
    let session = session_with(&[]);
    let spec = FileSpec::new()
        .decl(
            FunctionSpec::new("both")
                .bounded_type_param("T", "Any")
                .constraint("T", "Any")
                .empty_body(),
        )
        .decl(FunctionSpec::new("where_only").type_param("U").constraint("U", "Any").empty_body());
    let mut file = build(&session, &spec);
    resolve(&session, &mut file, &["both"], ResolvePhase::Types);
    resolve(&session, &mut file, &["where_only"], ResolvePhase::Types);

    let both = decl(&file, &["both"]);
    assert!(has_diagnostic(both, DiagnosticKind::MisplacedTypeParameterConstraints));
    assert_eq!(both.type_parameters[0].bounds.len(), 2);
    assert!(both.type_parameters[0].bounds.iter().all(TypeRef::is_resolved));
    assert!(!has_diagnostic(
        decl(&file, &["where_only"]),
        DiagnosticKind::MisplacedTypeParameterConstraints
    ));
}

#[test]
fn test_type_alias_reaches_body_phase_without_body_work() {
    let session = session_with(&[]);
    let mut file = build(&session, &FileSpec::new().decl(TypeAliasSpec::new("Count", "Int")));
    let stats = resolve(&session, &mut file, &["Count"], ResolvePhase::BodyResolve);

    let alias = decl(&file, &["Count"]);
    assert_eq!(alias.phase, ResolvePhase::BodyResolve);
    assert_eq!(alias.as_type_alias().map(|a| a.expanded.cone_type().cloned()), Some(Some(int())));
    // Imports and Types only.
    assert_eq!(stats.invocations, 2);
}

// =============================================================================
// Contracts
// =============================================================================

#[test]
fn test_contract_effects_map_parameters_to_indices() {
    let session = session_with(&[]);
    let spec = FileSpec::new().decl(
        FunctionSpec::new("run")
            .param("first", "Int")
            .param("block", "Int")
            .contract_effect("callsInPlace", Some("block"))
            .contract_effect("returns", None)
            .contract_effect("returnsImplies", Some("nope"))
            .contract_effect("teleports", None)
            .empty_body(),
    );
    let mut file = build(&session, &spec);
    resolve(&session, &mut file, &["run"], ResolvePhase::Contracts);

    let run = decl(&file, &["run"]);
    assert_eq!(
        run.as_function().and_then(|f| f.contract.clone()),
        Some(ContractDescription::Resolved(vec![
            ContractEffect::CallsInPlace { parameter: 1 },
            ContractEffect::Returns,
        ]))
    );
    assert!(has_diagnostic(run, DiagnosticKind::UnresolvedContractParameter));
    assert!(has_diagnostic(run, DiagnosticKind::UnknownContractEffect));
}

// =============================================================================
// Body resolution
// =============================================================================

fn body_of<'a>(file: &'a FirFile, names: &[&str]) -> &'a lres_fir::Block {
    decl(file, names)
        .as_function()
        .and_then(|f| f.body.as_ref())
        .expect("body")
}

#[test]
fn test_body_resolve_binds_names_and_infers_return_type() {
    let session = session_with(&[]);
    let spec = FileSpec::new()
        .decl(FunctionSpec::new("helper").returns("Int").statement(ExprSpec::ret(ExprSpec::int(1))))
        .decl(
            FunctionSpec::new("f")
                .param("x", "Int")
                .statement(PropertySpec::val("y").init(ExprSpec::name("x")))
                .statement(ExprSpec::ret_at("f", ExprSpec::call("helper", vec![ExprSpec::name("y")]))),
        );
    let mut file = build(&session, &spec);
    resolve(&session, &mut file, &["f"], ResolvePhase::BodyResolve);

    let f = decl(&file, &["f"]);
    assert_eq!(f.phase, ResolvePhase::BodyResolve);
    let function = f.as_function().expect("function");
    assert_eq!(function.return_type, TypeRef::Inferred(int()));
    assert!(f.diagnostics.is_empty(), "{:?}", f.diagnostics);

    let body = body_of(&file, &["f"]);
    let Statement::Local(y) = &body.statements[0] else {
        panic!("expected a local");
    };
    assert_eq!(y.return_type, TypeRef::Inferred(int()));
    let x_symbol = function.value_parameters[0].symbol;
    assert!(matches!(
        y.initializer.as_ref().map(|i| &i.kind),
        Some(ExprKind::Name { resolved: Some(s), .. }) if *s == x_symbol
    ));

    let helper = decl(&file, &["helper"]).symbol;
    let mut called = None;
    body.walk(&mut |e: &Expr| {
        if let ExprKind::Call { resolved, .. } = &e.kind {
            called = *resolved;
        }
    });
    assert_eq!(called, Some(helper));
}

#[test]
fn test_function_without_returns_infers_unit() {
    let session = session_with(&[]);
    let spec = FileSpec::new().decl(FunctionSpec::new("log").statement(ExprSpec::int(1)));
    let mut file = build(&session, &spec);
    resolve(&session, &mut file, &["log"], ResolvePhase::BodyResolve);

    assert_eq!(
        decl(&file, &["log"]).return_type(),
        Some(&TypeRef::Inferred(ConeType::UNIT))
    );
}

#[test]
fn test_body_diagnostics() {
    let session = session_with(&[]);
    let spec = FileSpec::new().decl(
        FunctionSpec::new("f")
            .returns("Int")
            .statement(ExprSpec::call("missing", vec![]))
            .statement(ExprSpec::ret_at("elsewhere", ExprSpec::int(1))),
    );
    let mut file = build(&session, &spec);
    resolve(&session, &mut file, &["f"], ResolvePhase::BodyResolve);

    let f = decl(&file, &["f"]);
    assert!(has_diagnostic(f, DiagnosticKind::UnresolvedReference));
    assert!(has_diagnostic(f, DiagnosticKind::UnboundReturnTarget));
    let Statement::Expr(call) = &body_of(&file, &["f"]).statements[0] else {
        panic!("expected an expression");
    };
    assert!(call.ty.as_ref().is_some_and(ConeType::is_error));
}

#[test]
fn test_constructor_call_types_as_class() {
    let session = session_with(&[]);
    let spec = FileSpec::new()
        .decl(ClassSpec::new("Point"))
        .decl(FunctionSpec::new("origin").statement(ExprSpec::ret(ExprSpec::call("Point", vec![]))));
    let mut file = build(&session, &spec);
    resolve(&session, &mut file, &["origin"], ResolvePhase::BodyResolve);

    assert_eq!(
        decl(&file, &["origin"]).return_type(),
        Some(&TypeRef::Inferred(ConeType::class("Point")))
    );
}

#[test]
fn test_property_types_inferred_from_initializer_and_getter() {
    let session = session_with(&[]);
    let spec = FileSpec::new()
        .decl(PropertySpec::val("count").init(ExprSpec::int(1)))
        .decl(PropertySpec::val("label").getter(vec![ExprSpec::ret(ExprSpec::string("x")).into()]))
        .decl(PropertySpec::val("unknown"));
    let mut file = build(&session, &spec);
    for name in ["count", "label", "unknown"] {
        resolve(&session, &mut file, &[name], ResolvePhase::BodyResolve);
    }

    assert_eq!(decl(&file, &["count"]).return_type(), Some(&TypeRef::Inferred(int())));
    let label = decl(&file, &["label"]);
    let string = ConeType::Builtin(BuiltinType::String);
    assert_eq!(label.return_type(), Some(&TypeRef::Inferred(string.clone())));
    let getter = label.as_property().and_then(|p| p.getter.as_ref()).expect("getter");
    assert_eq!(getter.return_type, TypeRef::Inferred(string));

    let unknown = decl(&file, &["unknown"]);
    assert!(has_diagnostic(unknown, DiagnosticKind::ImplicitTypeNotInferred));
    assert!(unknown.return_type().and_then(TypeRef::cone_type).is_some_and(ConeType::is_error));
}

fn caller_and_callee() -> FileSpec {
    FileSpec::new()
        .decl(FunctionSpec::new("first").statement(ExprSpec::ret(ExprSpec::int(1))))
        .decl(FunctionSpec::new("second").statement(ExprSpec::ret(ExprSpec::call("first", vec![]))))
}

#[test]
fn test_inferred_callee_type_does_not_depend_on_resolution_order() {
    let session = session_with(&[]);
    let mut callee_first = build(&session, &caller_and_callee());
    resolve(&session, &mut callee_first, &["first"], ResolvePhase::BodyResolve);
    resolve(&session, &mut callee_first, &["second"], ResolvePhase::BodyResolve);

    let mut caller_only = build(&session, &caller_and_callee());
    let stats = resolve(&session, &mut caller_only, &["second"], ResolvePhase::BodyResolve);

    let expected = Some(&TypeRef::Inferred(int()));
    assert_eq!(decl(&callee_first, &["second"]).return_type(), expected);
    assert_eq!(decl(&caller_only, &["second"]).return_type(), expected);
    assert!(decl(&caller_only, &["second"]).diagnostics.is_empty());

    // The callee was brought up on the way, and counted apart.
    assert_eq!(decl(&caller_only, &["first"]).phase, ResolvePhase::BodyResolve);
    assert_eq!(stats.invocations, 4);
    assert_eq!(stats.dependency_invocations, 4);
}

#[test]
fn test_implicit_property_is_inferred_before_its_use() {
    let session = session_with(&[]);
    let spec = FileSpec::new()
        .decl(PropertySpec::val("count").init(ExprSpec::int(1)))
        .decl(FunctionSpec::new("read").statement(ExprSpec::ret(ExprSpec::name("count"))));
    let mut file = build(&session, &spec);
    resolve(&session, &mut file, &["read"], ResolvePhase::BodyResolve);

    assert_eq!(decl(&file, &["read"]).return_type(), Some(&TypeRef::Inferred(int())));
    assert_eq!(decl(&file, &["count"]).return_type(), Some(&TypeRef::Inferred(int())));
}

#[test]
fn test_written_callee_type_needs_only_the_header() {
    let session = session_with(&["lib.Widget"]);
    let spec = FileSpec::new()
        .import("lib.Widget")
        .decl(FunctionSpec::new("make").returns("Widget").empty_body())
        .decl(FunctionSpec::new("build").statement(ExprSpec::ret(ExprSpec::call("make", vec![]))));
    let mut file = build(&session, &spec);
    let stats = resolve(&session, &mut file, &["build"], ResolvePhase::BodyResolve);

    assert_eq!(
        decl(&file, &["build"]).return_type(),
        Some(&TypeRef::Inferred(ConeType::class("lib.Widget")))
    );
    assert_eq!(decl(&file, &["make"]).phase, ResolvePhase::Types);
    assert_eq!(stats.dependency_invocations, 2);
}

#[test]
fn test_cyclic_inferred_types_end_in_errors() {
    let session = session_with(&[]);
    let spec = FileSpec::new()
        .decl(FunctionSpec::new("ping").statement(ExprSpec::ret(ExprSpec::call("pong", vec![]))))
        .decl(FunctionSpec::new("pong").statement(ExprSpec::ret(ExprSpec::call("ping", vec![]))))
        .decl(FunctionSpec::new("again").statement(ExprSpec::ret(ExprSpec::call("again", vec![]))));
    let mut file = build(&session, &spec);
    resolve(&session, &mut file, &["ping"], ResolvePhase::BodyResolve);
    resolve(&session, &mut file, &["again"], ResolvePhase::BodyResolve);

    for name in ["ping", "pong", "again"] {
        let resolved = decl(&file, &[name]);
        assert_eq!(resolved.phase, ResolvePhase::BodyResolve, "{name}");
        assert!(
            resolved
                .return_type()
                .and_then(TypeRef::cone_type)
                .is_some_and(ConeType::is_error),
            "{name}: {:?}",
            resolved.return_type()
        );
    }
    // The use that closes the cycle is reported; nothing is silently `Unit`.
    assert!(has_diagnostic(decl(&file, &["pong"]), DiagnosticKind::ImplicitTypeNotInferred));
    assert!(has_diagnostic(decl(&file, &["again"]), DiagnosticKind::ImplicitTypeNotInferred));
}

#[test]
fn test_members_of_outer_class_visible_only_through_inner_classes() {
    let session = session_with(&[]);
    let spec = FileSpec::new().decl(
        ClassSpec::new("Outer")
            .member(PropertySpec::val("secret").ty("Int"))
            .member(ClassSpec::new("Inner").inner().member(
                FunctionSpec::new("read").statement(ExprSpec::ret(ExprSpec::name("secret"))),
            ))
            .member(ClassSpec::new("Nested").member(
                FunctionSpec::new("read").statement(ExprSpec::ret(ExprSpec::name("secret"))),
            )),
    );
    let mut file = build(&session, &spec);
    resolve(&session, &mut file, &["Outer", "Inner", "read"], ResolvePhase::BodyResolve);
    resolve(&session, &mut file, &["Outer", "Nested", "read"], ResolvePhase::BodyResolve);

    let inner = decl(&file, &["Outer", "Inner", "read"]);
    assert_eq!(inner.return_type(), Some(&TypeRef::Inferred(int())));
    assert!(inner.diagnostics.is_empty(), "{:?}", inner.diagnostics);
    assert!(has_diagnostic(
        decl(&file, &["Outer", "Nested", "read"]),
        DiagnosticKind::UnresolvedReference
    ));
}

// =============================================================================
// Driver
// =============================================================================

fn wide_file(siblings: usize) -> FileSpec {
    let mut outer = ClassSpec::new("A");
    for i in 0..siblings {
        outer = outer.member(FunctionSpec::new(&format!("sibling{i}")).statement(ExprSpec::int(1)));
    }
    outer = outer.member(
        ClassSpec::new("B")
            .inner()
            .member(FunctionSpec::new("target").statement(ExprSpec::ret(ExprSpec::int(1))))
            .member(FunctionSpec::new("other").empty_body()),
    );
    let mut spec = FileSpec::new().decl(outer);
    for i in 0..siblings {
        spec = spec.decl(FunctionSpec::new(&format!("top{i}")).empty_body());
    }
    spec
}

#[test]
fn test_work_is_bounded_by_designation_depth() {
    let session = session_with(&[]);
    for siblings in [1, 25] {
        let mut file = build(&session, &wide_file(siblings));
        let stats = resolve(&session, &mut file, &["A", "B", "target"], ResolvePhase::BodyResolve);

        // A and B: three header stages each. target: every stage but supertypes.
        assert_eq!(stats.invocations, 10);
        let path = file.find_path(&["A", "B", "target"]).expect("path");
        assert!(stats.trace.iter().all(|(id, _)| path.contains(id)));

        assert_eq!(decl(&file, &["A"]).phase, ResolvePhase::Types);
        assert_eq!(decl(&file, &["A", "B"]).phase, ResolvePhase::Types);
        assert_eq!(decl(&file, &["A", "B", "target"]).phase, ResolvePhase::BodyResolve);
        assert_eq!(decl(&file, &["A", "B", "other"]).phase, ResolvePhase::Raw);
        assert_eq!(decl(&file, &["A", "sibling0"]).phase, ResolvePhase::Raw);
        assert_eq!(decl(&file, &["top0"]).phase, ResolvePhase::Raw);
    }
}

#[test]
fn test_driver_runs_phases_in_order() {
    let session = session_with(&[]);
    let mut file = build(&session, &wide_file(1));
    let stats = resolve(&session, &mut file, &["A", "B", "target"], ResolvePhase::BodyResolve);

    let target = file.find_path(&["A", "B", "target"]).expect("path")[2];
    let phases: Vec<ResolvePhase> = stats
        .trace
        .iter()
        .filter(|(id, _)| *id == target)
        .map(|(_, p)| *p)
        .collect();
    assert_eq!(
        phases,
        vec![
            ResolvePhase::Imports,
            ResolvePhase::Types,
            ResolvePhase::Contracts,
            ResolvePhase::BodyResolve
        ]
    );
}

#[test]
fn test_resolving_twice_does_nothing_the_second_time() {
    let session = session_with(&[]);
    let mut file = build(&session, &wide_file(3));
    resolve(&session, &mut file, &["A", "B", "target"], ResolvePhase::BodyResolve);
    let before = file.clone();

    let stats = resolve(&session, &mut file, &["A", "B", "target"], ResolvePhase::BodyResolve);
    assert_eq!(stats.invocations, 0);
    for id in file.arena.ids() {
        assert!(file.arena.shares_slot(&before.arena, id));
    }
}

#[test]
fn test_lower_phase_request_after_higher_is_a_no_op() {
    let session = session_with(&[]);
    let mut file = build(&session, &wide_file(1));
    resolve(&session, &mut file, &["A", "B", "target"], ResolvePhase::BodyResolve);
    let stats = resolve(&session, &mut file, &["A", "B", "target"], ResolvePhase::Types);
    assert_eq!(stats.invocations, 0);
    assert_eq!(decl(&file, &["A", "B", "target"]).phase, ResolvePhase::BodyResolve);
}

#[test]
fn test_class_target_resolves_its_content() {
    let session = session_with(&[]);
    let mut file = build(&session, &wide_file(2));
    resolve(&session, &mut file, &["A"], ResolvePhase::BodyResolve);

    for names in [
        &["A"][..],
        &["A", "sibling0"],
        &["A", "B"],
        &["A", "B", "target"],
        &["A", "B", "other"],
    ] {
        assert_eq!(decl(&file, names).phase, ResolvePhase::BodyResolve, "{names:?}");
    }
    assert_eq!(decl(&file, &["top0"]).phase, ResolvePhase::Raw);
}

#[test]
fn test_local_classes_resolve_with_their_function() {
    let session = session_with(&[]);
    let spec = FileSpec::new().decl(
        FunctionSpec::new("f")
            .statement(ClassSpec::new("Local").member(FunctionSpec::new("m").param("v", "Int").empty_body()))
            .statement(ExprSpec::ret(ExprSpec::call("Local", vec![]))),
    );
    let mut file = build(&session, &spec);
    resolve(&session, &mut file, &["f"], ResolvePhase::BodyResolve);

    let body = body_of(&file, &["f"]);
    let local = body.local_classes().next().expect("local class");
    let class = file.decl(local).expect("class");
    assert_eq!(class.phase, ResolvePhase::BodyResolve);
    let member = file.decl(class.members()[0]).expect("member");
    assert_eq!(member.phase, ResolvePhase::BodyResolve);
    assert_eq!(
        decl(&file, &["f"]).return_type(),
        Some(&TypeRef::Inferred(ConeType::class("Local")))
    );
}

#[test]
fn test_on_air_mode_redoes_body_resolution_only() {
    let session = session_with(&[]);
    let mut file = build(&session, &wide_file(1));
    resolve(&session, &mut file, &["A", "B", "target"], ResolvePhase::BodyResolve);

    let stats = resolve_path(
        &session,
        &mut file,
        &["A", "B", "target"],
        ResolvePhase::BodyResolve,
        ResolveMode::OnAir,
    )
    .expect("resolved");
    let target = file.find_path(&["A", "B", "target"]).expect("path")[2];
    assert_eq!(stats.trace, vec![(target, ResolvePhase::BodyResolve)]);
}

#[test]
fn test_transformer_refuses_to_skip_a_phase() {
    let session = session_with(&[]);
    let mut file = build(&session, &FileSpec::new().decl(FunctionSpec::new("f").empty_body()));
    let id = file.declarations[0];
    let mut progress = Progress::new(CancellationToken::new(), 16);
    let mut cx = TransformContext::new(&session, &mut file, &mut progress);

    let body = transformer_for(ResolvePhase::BodyResolve).expect("transformer");
    let err = body.apply(&mut cx, id).expect_err("raw declaration");
    assert!(matches!(
        err,
        ResolveError::PhaseOrderViolation {
            current: ResolvePhase::Raw,
            requested: ResolvePhase::BodyResolve,
            ..
        }
    ));
    assert_eq!(cx.file.decl(id).map(|d| d.phase), Some(ResolvePhase::Raw));
    assert!(transformer_for(ResolvePhase::Raw).is_none());
}

#[test]
fn test_diagnostics_are_not_duplicated_by_reruns() {
    let session = session_with(&[]);
    let spec = FileSpec::new().decl(FunctionSpec::new("f").statement(ExprSpec::name("ghost")));
    let mut file = build(&session, &spec);
    resolve(&session, &mut file, &["f"], ResolvePhase::BodyResolve);
    resolve_path(&session, &mut file, &["f"], ResolvePhase::BodyResolve, ResolveMode::OnAir)
        .expect("resolved");

    let count = decl(&file, &["f"])
        .diagnostics
        .iter()
        .filter(|d| d.kind == DiagnosticKind::UnresolvedReference)
        .count();
    assert_eq!(count, 1);
}

// =============================================================================
// Cancellation and towers
// =============================================================================

#[test]
fn test_cancellation_stops_the_driver() {
    let session = session_with(&[]);
    let mut file = build(&session, &wide_file(1));
    let path = file.find_path(&["A", "B", "target"]).expect("path");
    let designation = Designation::new(&file, &path, 64).expect("designation");
    let mut progress = Progress::new(CancellationToken::after_checks(2), 16);
    let mut cx = TransformContext::new(&session, &mut file, &mut progress);

    let err = DesignatedResolver::new(&designation, ResolvePhase::BodyResolve, ResolveMode::Lazy)
        .resolve(&mut cx)
        .expect_err("cancelled");
    assert!(err.is_cancellation());
}

#[test]
fn test_collector_records_towers_in_bodies() {
    let session = session_with(&[]);
    let spec = FileSpec::new().decl(
        FunctionSpec::new("f")
            .param("x", "Int")
            .statement(PropertySpec::val("y").init(ExprSpec::name("x")))
            .statement(ExprSpec::ret(ExprSpec::name("y"))),
    );
    let tree = SyntaxFactory::file(&spec, "t.kt");
    let mut file = build_file(&session, &tree.root()).expect("file");
    let path = file.find_path(&["f"]).expect("path");
    let designation = Designation::new(&file, &path, 64).expect("designation");
    let mut collector = TowerContextCollector::new();
    let mut progress = Progress::new(CancellationToken::new(), 16);
    {
        let mut cx = TransformContext::new(&session, &mut file, &mut progress).with_collector(&mut collector);
        DesignatedResolver::new(&designation, ResolvePhase::BodyResolve, ResolveMode::Lazy)
            .resolve(&mut cx)
            .expect("resolved");
    }

    let references: Vec<_> = tree
        .root()
        .descendants()
        .into_iter()
        .filter(|n| n.kind() == SyntaxKind::ReferenceExpression)
        .collect();
    assert_eq!(references.len(), 2);

    let at_x = collector.get(references[0].key()).expect("context at x");
    assert!(at_x.lookup_value("x").is_some());
    assert!(at_x.lookup_value("y").is_none());

    let at_y = collector.get(references[1].key()).expect("context at y");
    let y = at_y.lookup_value("y").expect("y visible");
    assert_eq!(y.ty, Some(int()));
    assert_eq!(at_y.levels().last().map(|l| &l.kind), Some(&TowerLevelKind::Locals));
    assert_eq!(at_y.visible_values()[0], "y");
    assert!(matches!(
        file.decl(path[0]).map(|d| &d.data),
        Some(DeclData::Function(_))
    ));
}
