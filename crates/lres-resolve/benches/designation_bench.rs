//! Designated resolution benchmarks.
//!
//! Resolving one nested function should cost the same whether its file has
//! a handful of declarations or hundreds of them.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use lres_common::ResolveOptions;
use lres_fir::{Designation, FirFile, FirSession, InMemoryProvider, ResolvePhase, build_file};
use lres_resolve::{CancellationToken, DesignatedResolver, Progress, ResolveMode, TransformContext};
use lres_syntax::factory::{ClassSpec, ExprSpec, FileSpec, FunctionSpec, PropertySpec, SyntaxFactory};
use std::sync::Arc;

/// `class C0 { inner class C1 { ... fun target() } }` with `siblings`
/// functions next to every class on the path and at the top level.
fn nested_file(depth: usize, siblings: usize) -> FileSpec {
    let target = FunctionSpec::new("target")
        .param("seed", "Int")
        .statement(PropertySpec::val("doubled").init(ExprSpec::call("twice", vec![ExprSpec::name("seed")])))
        .statement(ExprSpec::ret(ExprSpec::name("doubled")));

    let mut class = ClassSpec::new(&format!("C{}", depth - 1)).member(target);
    if depth > 1 {
        class = class.inner();
    }
    for level in (0..depth - 1).rev() {
        let mut outer = ClassSpec::new(&format!("C{level}"));
        if level > 0 {
            outer = outer.inner();
        }
        for i in 0..siblings {
            outer = outer.member(
                FunctionSpec::new(&format!("s{level}_{i}"))
                    .param("a", "Int")
                    .statement(ExprSpec::ret(ExprSpec::name("a"))),
            );
        }
        class = outer.member(class);
    }

    let mut spec = FileSpec::new()
        .package("bench")
        .decl(FunctionSpec::new("twice").param("v", "Int").returns("Int").empty_body())
        .decl(class);
    for i in 0..siblings {
        spec = spec.decl(FunctionSpec::new(&format!("top{i}")).statement(ExprSpec::int(1)));
    }
    spec
}

fn prepare(depth: usize, siblings: usize) -> (FirSession, FirFile, Designation) {
    let session = FirSession::new(ResolveOptions::default(), Arc::new(InMemoryProvider::new()));
    let tree = SyntaxFactory::file(&nested_file(depth, siblings), "bench.kt");
    let file = build_file(&session, &tree.root()).expect("file builds");
    let names: Vec<String> = (0..depth)
        .map(|i| format!("C{i}"))
        .chain(std::iter::once("target".to_string()))
        .collect();
    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    let path = file.find_path(&names).expect("path exists");
    let designation = Designation::new(&file, &path, 64).expect("designation");
    (session, file, designation)
}

fn resolve_once(session: &FirSession, file: &FirFile, designation: &Designation) -> u32 {
    let mut working = file.clone();
    let mut progress = Progress::new(CancellationToken::new(), 16);
    let mut cx = TransformContext::new(session, &mut working, &mut progress);
    DesignatedResolver::new(designation, ResolvePhase::BodyResolve, ResolveMode::Lazy)
        .resolve(&mut cx)
        .expect("resolves")
        .invocations
}

fn bench_siblings(c: &mut Criterion) {
    let mut group = c.benchmark_group("designation_siblings");
    for siblings in [1usize, 50, 500] {
        let (session, file, designation) = prepare(3, siblings);
        group.bench_with_input(BenchmarkId::new("depth3", siblings), &siblings, |b, _| {
            b.iter(|| black_box(resolve_once(&session, &file, &designation)));
        });
    }
    group.finish();
}

fn bench_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("designation_depth");
    for depth in [1usize, 4, 16] {
        let (session, file, designation) = prepare(depth, 4);
        group.bench_with_input(BenchmarkId::new("siblings4", depth), &depth, |b, _| {
            b.iter(|| black_box(resolve_once(&session, &file, &designation)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_siblings, bench_depth);
criterion_main!(benches);
