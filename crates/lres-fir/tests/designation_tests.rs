use super::*;
use lres_common::ResolveOptions;
use lres_syntax::factory::{ClassSpec, FileSpec, FunctionSpec, PropertySpec, SyntaxFactory};
use std::sync::Arc;

fn nested_file() -> FirFile {
    let spec = FileSpec::new()
        .decl(
            ClassSpec::new("A").member(
                ClassSpec::new("B")
                    .inner()
                    .member(FunctionSpec::new("foo").empty_body())
                    .member(PropertySpec::val("p").ty("Int")),
            ),
        )
        .decl(FunctionSpec::new("top").empty_body());
    let session = FirSession::new(ResolveOptions::default(), Arc::new(InMemoryProvider::new()));
    let tree = SyntaxFactory::file(&spec, "d.kt");
    build_file(&session, &tree.root()).expect("file")
}

#[test]
fn test_valid_designation() {
    let file = nested_file();
    let path = file.find_path(&["A", "B", "foo"]).expect("path");
    let designation = Designation::new(&file, &path, 64).expect("valid");

    assert_eq!(designation.depth(), 3);
    assert_eq!(designation.target(), path[2]);
    assert_eq!(designation.containers(), &path[..2]);
    assert_eq!(designation.file(), file.id);
}

#[test]
fn test_designation_for_declaration_matches_path() {
    let file = nested_file();
    let path = file.find_path(&["A", "B", "p"]).expect("path");
    let designation = Designation::for_declaration(&file, path[2], 64).expect("valid");
    assert_eq!(designation.path(), path.as_slice());
}

#[test]
fn test_empty_designation_is_invalid() {
    let file = nested_file();
    let err = Designation::new(&file, &[], 64).expect_err("empty");
    assert!(matches!(err, ResolveError::InvalidDesignation { .. }));
}

#[test]
fn test_non_class_container_is_invalid() {
    let file = nested_file();
    let top = file.find_path(&["top"]).expect("top")[0];
    let foo = file.find_path(&["A", "B", "foo"]).expect("foo")[2];
    let err = Designation::new(&file, &[top, foo], 64).expect_err("function container");
    assert!(err.to_string().contains("not a class"), "{err}");
}

#[test]
fn test_skipping_a_level_is_invalid() {
    let file = nested_file();
    let path = file.find_path(&["A", "B", "foo"]).expect("path");
    let err = Designation::new(&file, &[path[0], path[2]], 64).expect_err("not a member");
    assert!(matches!(err, ResolveError::InvalidDesignation { .. }));

    let err = Designation::new(&file, &path[1..], 64).expect_err("not top level");
    assert!(matches!(err, ResolveError::InvalidDesignation { .. }));
}

#[test]
fn test_designation_depth_limit() {
    let file = nested_file();
    let path = file.find_path(&["A", "B", "foo"]).expect("path");
    assert!(Designation::new(&file, &path, 2).is_err());
    assert!(Designation::new(&file, &path, 3).is_ok());
}

#[test]
fn test_phase_order_and_applicability() {
    assert_eq!(ResolvePhase::Raw.prev(), None);
    assert_eq!(ResolvePhase::Contracts.prev(), Some(ResolvePhase::Types));
    assert_eq!(ResolvePhase::BodyResolve.next(), None);
    assert_eq!(
        ResolvePhase::Types.stages_up_to().collect::<Vec<_>>(),
        vec![ResolvePhase::Imports, ResolvePhase::SuperTypes, ResolvePhase::Types]
    );
    assert_eq!(ResolvePhase::Raw.stages_up_to().count(), 0);

    assert!(ResolvePhase::SuperTypes.applies_to(DeclKind::Class));
    assert!(!ResolvePhase::SuperTypes.applies_to(DeclKind::Function));
    assert!(ResolvePhase::Contracts.applies_to(DeclKind::Property));
    assert!(!ResolvePhase::Contracts.applies_to(DeclKind::Class));
    assert!(!ResolvePhase::BodyResolve.applies_to(DeclKind::TypeAlias));
}

#[test]
fn test_transplant_remaps_members() {
    let mut file = nested_file();
    let path = file.find_path(&["A", "B"]).expect("path");
    let old_foo = file.find_path(&["A", "B", "foo"]).expect("foo")[2];
    let session = FirSession::new(ResolveOptions::default(), Arc::new(InMemoryProvider::new()));
    let replacement = SyntaxFactory::declaration(
        &ClassSpec::new("B")
            .inner()
            .member(FunctionSpec::new("bar").empty_body())
            .into(),
    );
    let fragment = build_fragment(&session, &file, &path[..1], &replacement, None).expect("fragment");
    let before = file.arena.len();
    file.transplant(path[1], fragment);

    assert_eq!(file.arena.len(), before + 1);
    let new_path = file.find_path(&["A", "B", "bar"]).expect("bar reachable");
    assert_eq!(new_path[1], path[1]);
    assert!(file.find_path(&["A", "B", "foo"]).is_none());
    assert!(!file.reachable().contains(&old_foo));
    assert!(file.reachable().contains(&path[1]));
}
