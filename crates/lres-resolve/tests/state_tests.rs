use super::*;
use lres_common::ResolveOptions;
use lres_fir::{
    ConeType, Designation, FileId, FirSession, InMemoryProvider, ResolveError, ResolvePhase,
    TypeRef, build_file,
};
use lres_syntax::factory::{ClassSpec, ExprSpec, FileSpec, FunctionSpec, PropertySpec, SyntaxFactory};
use lres_syntax::{SyntaxKind, SyntaxNode, SyntaxTree};
use std::sync::Arc;

fn base_with(spec: &FileSpec) -> (Arc<BaseResolveState>, FileId, Arc<SyntaxTree>) {
    let session = Arc::new(FirSession::new(
        ResolveOptions::default(),
        Arc::new(InMemoryProvider::new()),
    ));
    let tree = SyntaxFactory::file(spec, "s.kt");
    let file = build_file(&session, &tree.root()).expect("file");
    let base = Arc::new(BaseResolveState::new(session));
    let id = base.open(file);
    (base, id, tree)
}

fn designation(base: &BaseResolveState, file: FileId, names: &[&str]) -> Designation {
    let snapshot = base.snapshot(file).expect("snapshot");
    let path = snapshot.find_path(names).expect("path");
    Designation::new(&snapshot, &path, 64).expect("designation")
}

fn node(tree: &Arc<SyntaxTree>, kind: SyntaxKind, name: &str) -> SyntaxNode {
    tree.root()
        .descendants()
        .into_iter()
        .find(|n| n.kind() == kind && n.name().as_deref() == Some(name))
        .expect("node exists")
}

fn int() -> ConeType {
    ConeType::Builtin(lres_fir::BuiltinType::Int)
}

fn two_functions() -> FileSpec {
    FileSpec::new()
        .decl(FunctionSpec::new("first").param("a", "Int").statement(ExprSpec::ret(ExprSpec::name("a"))))
        .decl(FunctionSpec::new("second").statement(ExprSpec::ret(ExprSpec::int(2))))
}

// =============================================================================
// Base state
// =============================================================================

#[test]
fn test_resolution_publishes_a_new_snapshot() {
    let (base, file, _tree) = base_with(&two_functions());
    let before = base.snapshot(file).expect("snapshot");
    assert_eq!(base.version(file), Ok(0));

    let token = CancellationToken::new();
    let resolved = base
        .resolve(&designation(&base, file, &["first"]), ResolvePhase::BodyResolve, &token)
        .expect("resolved");
    assert_eq!(resolved.phase, ResolvePhase::BodyResolve);
    assert_eq!(base.version(file), Ok(1));

    let after = base.snapshot(file).expect("snapshot");
    assert!(!Arc::ptr_eq(&before, &after));
    // The old snapshot is untouched.
    let old = before.decl(before.declarations[0]).expect("first");
    assert_eq!(old.phase, ResolvePhase::Raw);
    // The untouched sibling is still shared between both snapshots.
    assert!(after.arena.shares_slot(&before.arena, after.declarations[1]));
}

#[test]
fn test_repeated_resolution_publishes_nothing() {
    let (base, file, _tree) = base_with(&two_functions());
    let token = CancellationToken::new();
    let target = designation(&base, file, &["first"]);
    base.resolve(&target, ResolvePhase::BodyResolve, &token)
        .expect("resolved");
    let published = base.snapshot(file).expect("snapshot");
    let invocations = base.invocations();

    let (_, stats) = base
        .resolve_with_stats(&target, ResolvePhase::BodyResolve, &token)
        .expect("resolved");
    assert_eq!(stats.invocations, 0);
    assert_eq!(base.version(file), Ok(1));
    assert!(Arc::ptr_eq(&published, &base.snapshot(file).expect("snapshot")));
    assert_eq!(base.invocations(), invocations);
}

#[test]
fn test_cancelled_resolution_leaves_snapshot_alone() {
    let (base, file, _tree) = base_with(&two_functions());
    let before = base.snapshot(file).expect("snapshot");
    let token = CancellationToken::new();
    token.cancel();

    let err = base
        .resolve(&designation(&base, file, &["first"]), ResolvePhase::BodyResolve, &token)
        .expect_err("cancelled");
    assert_eq!(err, ResolveError::Cancelled);
    assert!(Arc::ptr_eq(&before, &base.snapshot(file).expect("snapshot")));
    assert_eq!(base.version(file), Ok(0));
    assert_eq!(base.invocations(), 0);
}

#[test]
fn test_cancellation_midway_publishes_nothing() {
    let (base, file, _tree) = base_with(&two_functions());
    let before = base.snapshot(file).expect("snapshot");

    let err = base
        .resolve(
            &designation(&base, file, &["first"]),
            ResolvePhase::BodyResolve,
            &CancellationToken::after_checks(2),
        )
        .expect_err("cancelled");
    assert!(err.is_cancellation());
    assert!(Arc::ptr_eq(&before, &base.snapshot(file).expect("snapshot")));
}

#[test]
fn test_unknown_file_is_an_error() {
    let (base, file, _tree) = base_with(&two_functions());
    let target = designation(&base, file, &["first"]);
    base.close(file).expect("was open");
    assert_eq!(
        base.resolve(&target, ResolvePhase::Types, &CancellationToken::new())
            .map(|d| d.phase),
        Err(ResolveError::UnknownFile(file))
    );
    assert!(base.files().is_empty());
}

#[test]
fn test_queries_by_syntax_node() {
    let (base, file, tree) = base_with(&two_functions());
    let token = CancellationToken::new();
    base.resolve(&designation(&base, file, &["first"]), ResolvePhase::BodyResolve, &token)
        .expect("resolved");

    let function = node(&tree, SyntaxKind::Function, "first");
    assert_eq!(base.file_of(&function), Some(file));
    let decl = base.find_declaration(&function).expect("declaration");
    assert_eq!(decl.name, "first");
    assert_eq!(decl.return_type(), Some(&TypeRef::Inferred(int())));

    let reference = function
        .descendants()
        .into_iter()
        .find(|n| n.kind() == SyntaxKind::ReferenceExpression)
        .expect("reference");
    assert_eq!(base.expression_type(&reference), Some(int()));
}

#[test]
fn test_concurrent_writers_keep_every_result() {
    let mut spec = FileSpec::new();
    let names: Vec<String> = (0..8).map(|i| format!("f{i}")).collect();
    for name in &names {
        spec = spec.decl(FunctionSpec::new(name).statement(ExprSpec::ret(ExprSpec::int(1))));
    }
    let (base, file, _tree) = base_with(&spec);

    std::thread::scope(|scope| {
        for name in &names {
            let base = Arc::clone(&base);
            scope.spawn(move || {
                let target = designation(&base, file, &[name.as_str()]);
                base.resolve(&target, ResolvePhase::BodyResolve, &CancellationToken::new())
                    .expect("resolved");
            });
        }
    });

    let snapshot = base.snapshot(file).expect("snapshot");
    for &id in &snapshot.declarations {
        let decl = snapshot.decl(id).expect("declaration");
        assert_eq!(decl.phase, ResolvePhase::BodyResolve, "{}", decl.name);
        assert_eq!(decl.return_type(), Some(&TypeRef::Inferred(int())));
    }
    // Imports ran once; every other function saw them resolved.
    assert!(snapshot.imports_resolved);
}

// =============================================================================
// Dependent state
// =============================================================================

fn resolve_on_air_at(
    base: &Arc<BaseResolveState>,
    file: FileId,
    names: &[&str],
    updated: &SyntaxNode,
) -> DependentResolveState {
    let target = designation(base, file, names);
    let token = CancellationToken::new();
    base.resolve(&target, ResolvePhase::BodyResolve, &token)
        .expect("base resolved");
    DependentResolveState::resolve_on_air(
        Arc::clone(base),
        OnAirRequest {
            designation: &target,
            updated,
            replacement: None,
            record_inside: Some(updated.clone()),
        },
        &token,
    )
    .expect("on air")
}

#[test]
fn test_on_air_resolution_never_touches_the_base() {
    let (base, file, tree) = base_with(&two_functions());
    let real = node(&tree, SyntaxKind::Function, "second");
    let edited = SyntaxFactory::file_copy(
        &FileSpec::new()
            .decl(FunctionSpec::new("first").param("a", "Int").statement(ExprSpec::ret(ExprSpec::name("a"))))
            .decl(FunctionSpec::new("second").statement(ExprSpec::ret(ExprSpec::string("two")))),
        "s.kt",
    );
    let updated = node(&edited, SyntaxKind::Function, "second");

    // Resolve the base first so the on-air request has nothing to publish.
    let token = CancellationToken::new();
    base.resolve(&designation(&base, file, &["second"]), ResolvePhase::BodyResolve, &token)
        .expect("resolved");
    let published = base.snapshot(file).expect("snapshot");
    let version = base.version(file);

    let dependent = resolve_on_air_at(&base, file, &["second"], &updated);

    assert!(Arc::ptr_eq(&published, &base.snapshot(file).expect("snapshot")));
    assert_eq!(base.version(file), version);

    let copy = dependent.declaration().expect("copy");
    let string = ConeType::Builtin(lres_fir::BuiltinType::String);
    assert_eq!(copy.return_type(), Some(&TypeRef::Inferred(string)));
    assert_ne!(copy.symbol, dependent.original().symbol);
    assert_eq!(dependent.original().return_type(), Some(&TypeRef::Inferred(int())));
    assert_eq!(
        base.find_declaration(&real).and_then(|d| d.return_type().cloned()),
        Some(TypeRef::Inferred(int()))
    );
    // The copy's own statements were recorded.
    assert!(dependent.recorded_contexts() > 0);
    assert_eq!(dependent.file(), file);
}

#[test]
fn test_on_air_copy_keeps_the_setter_parameter() {
    let spec = FileSpec::new().decl(
        ClassSpec::new("Box").member(
            PropertySpec::var("p")
                .init(ExprSpec::int(1))
                .setter("v", None, vec![ExprSpec::name("v").into()]),
        ),
    );
    let (base, file, tree) = base_with(&spec);
    let property = node(&tree, SyntaxKind::Property, "p");

    let dependent = resolve_on_air_at(&base, file, &["Box", "p"], &property);

    let original = dependent
        .original()
        .as_property()
        .and_then(|p| p.setter.clone())
        .expect("setter");
    assert_eq!(
        original.value_parameter.as_ref().map(|p| &p.return_type),
        Some(&TypeRef::Inferred(int()))
    );

    let copy = dependent
        .declaration()
        .and_then(|d| d.as_property())
        .and_then(|p| p.setter.as_ref())
        .expect("setter copy");
    assert_ne!(copy.symbol, original.symbol);
    assert_eq!(copy.value_parameter, original.value_parameter);

    // `v` in the setter body resolves to the preserved parameter.
    let reference = property
        .descendants()
        .into_iter()
        .find(|n| n.kind() == SyntaxKind::ReferenceExpression)
        .expect("reference");
    assert_eq!(dependent.expression_type(&reference), Some(int()));
    let tower = dependent.tower_context(&reference).expect("tower recorded");
    assert_eq!(
        tower.lookup_value("v").and_then(|e| e.symbol),
        original.value_parameter.as_ref().map(|p| p.symbol)
    );
}

#[test]
fn test_overlay_lookups_fall_back_to_the_base() {
    let (base, file, tree) = base_with(&two_functions());
    let other = SyntaxFactory::file(
        &FileSpec::new().decl(FunctionSpec::new("third").statement(ExprSpec::int(3))),
        "other.kt",
    );
    let other_file = build_file(base.session(), &other.root()).expect("file");
    base.open(other_file);

    let second = node(&tree, SyntaxKind::Function, "second");
    let dependent = resolve_on_air_at(&base, file, &["second"], &second);

    // The copy answers for its own node.
    let copy = dependent.find_declaration(&second).expect("copy");
    assert_eq!(Some(copy.symbol), dependent.declaration().map(|d| d.symbol));

    // Other files are answered by the base.
    let third = node(&other, SyntaxKind::Function, "third");
    let found = dependent.find_declaration(&third).expect("declaration");
    assert_eq!(found.name, "third");
    assert_eq!(found.phase, ResolvePhase::Raw);
}

#[test]
fn test_state_variants_are_checked() {
    let (base, file, tree) = base_with(&two_functions());
    let state = ResolveState::Base(Arc::clone(&base));
    assert!(!state.is_dependent());
    assert_eq!(
        state.as_dependent().map(|_| ()),
        Err(ResolveError::InvalidStateVariant {
            expected: "dependent"
        })
    );
    assert!(state.as_base().is_ok());

    let second = node(&tree, SyntaxKind::Function, "second");
    let dependent = ResolveState::Dependent(Box::new(resolve_on_air_at(&base, file, &["second"], &second)));
    assert!(dependent.is_dependent());
    assert!(Arc::ptr_eq(dependent.base(), &base));
    assert_eq!(
        dependent.as_base().map(|_| ()),
        Err(ResolveError::InvalidStateVariant { expected: "base" })
    );
}
