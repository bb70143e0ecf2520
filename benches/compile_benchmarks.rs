//! Performance benchmarks for the FOOL compilation pipeline.
//!
//! Programs are built directly as syntax trees, so these measure the
//! semantic passes and code generation only:
//! - Size-based: growing numbers of functions
//! - Feature-specific: deep nesting, inheritance chains, long expressions
//!
//! ## Profiling with Puffin
//!
//! ```bash
//! cargo bench --features profile-with-puffin
//! ```

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use fool::prelude::*;
use std::hint::black_box;

#[cfg(feature = "profile-with-puffin")]
static FRAME_VIEW: std::sync::OnceLock<puffin::GlobalFrameView> = std::sync::OnceLock::new();

#[cfg(feature = "profile-with-puffin")]
fn setup_profiler() {
    puffin::set_scopes_on(true);
    FRAME_VIEW.get_or_init(puffin::GlobalFrameView::default);
}

#[cfg(not(feature = "profile-with-puffin"))]
fn setup_profiler() {}

#[cfg(feature = "profile-with-puffin")]
fn end_profiling_frame() {
    puffin::GlobalProfiler::lock().new_frame();
}

#[cfg(not(feature = "profile-with-puffin"))]
fn end_profiling_frame() {}

// ============================================================================
// Program Generators
// ============================================================================

/// `n` independent functions `f_i(x) = x * i + 1`, and a body summing a call
/// to each.
fn many_functions<'ast>(b: &AstBuilder<'ast>, n: usize) -> Program<'ast> {
    let mut decls = Vec::with_capacity(n);
    let mut body = b.int(0);
    for i in 0..n {
        let name = format!("f{i}");
        decls.push(b.fun(
            &name,
            vec![b.param("x", TypeExpr::Int)],
            TypeExpr::Int,
            vec![],
            b.add(b.mul(b.ident("x"), b.int(i as i64)), b.int(1)),
        ));
        body = b.add(body, b.call(&name, vec![b.int(2)]));
    }
    b.program(decls, body)
}

/// A chain of `depth` classes, each overriding `get` and adding one field.
fn inheritance_chain<'ast>(b: &AstBuilder<'ast>, depth: usize) -> Program<'ast> {
    let mut decls = Vec::with_capacity(depth + 1);
    for i in 0..depth {
        let name = format!("C{i}");
        let parent = (i > 0).then(|| format!("C{}", i - 1));
        let field = format!("v{i}");
        decls.push(b.class(
            &name,
            parent.as_deref(),
            vec![b.field(&field, TypeExpr::Int)],
            vec![b.method("get", vec![], TypeExpr::Int, vec![], b.ident(&field))],
        ));
    }

    let last = format!("C{}", depth - 1);
    let args = (0..depth).map(|i| b.int(i as i64)).collect();
    decls.push(b.var("o", b.ref_type("C0"), b.new_object(&last, args)));
    b.program(decls, b.method_call("o", "get", vec![]))
}

/// Functions nested `depth` levels deep, the innermost reading every
/// enclosing parameter.
fn deep_nesting<'ast>(b: &AstBuilder<'ast>, depth: usize) -> Program<'ast> {
    let mut body = b.int(0);
    for i in 0..depth {
        body = b.add(body, b.ident(&format!("p{i}")));
    }

    let mut inner: Option<Decl<'ast>> = None;
    for i in (0..depth).rev() {
        let name = format!("g{i}");
        let param = format!("p{i}");
        let (decls, call_body) = match inner.take() {
            Some(decl) => (
                vec![decl],
                b.call(&format!("g{}", i + 1), vec![b.ident(&param)]),
            ),
            None => (vec![], body),
        };
        inner = Some(b.fun(
            &name,
            vec![b.param(&param, TypeExpr::Int)],
            TypeExpr::Int,
            decls,
            call_body,
        ));
    }

    b.program(inner.into_iter().collect(), b.call("g0", vec![b.int(1)]))
}

/// A long chain of short-circuit boolean operators and comparisons.
fn long_expression<'ast>(b: &AstBuilder<'ast>, terms: usize) -> Program<'ast> {
    let mut expr = b.bool(false);
    for i in 0..terms {
        let cmp = b.le(b.int(i as i64), b.int((terms - i) as i64));
        expr = if i % 2 == 0 {
            b.or(expr, cmp)
        } else {
            b.and(expr, b.not(cmp))
        };
    }
    b.bare_program(b.if_then_else(expr, b.int(1), b.int(0)))
}

// ============================================================================
// Benchmarks
// ============================================================================

fn size_based_benchmarks(c: &mut Criterion) {
    setup_profiler();

    let mut group = c.benchmark_group("compile/functions");
    for n in [10, 100, 1000] {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let program = many_functions(&b, n);

        group.throughput(Throughput::Elements(u64::from(b.node_count())));
        group.bench_with_input(BenchmarkId::from_parameter(n), &program, |bench, program| {
            bench.iter(|| {
                let compiled = compile(black_box(program));
                end_profiling_frame();
                compiled
            });
        });
    }
    group.finish();
}

fn feature_specific_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile/features");

    let arena = Bump::new();
    let b = AstBuilder::new(&arena);

    let chain = inheritance_chain(&b, 50);
    group.bench_function("inheritance_chain_50", |bench| {
        bench.iter(|| compile(black_box(&chain)));
    });

    let nested = deep_nesting(&b, 40);
    group.bench_function("deep_nesting_40", |bench| {
        bench.iter(|| compile(black_box(&nested)));
    });

    let expression = long_expression(&b, 500);
    group.bench_function("long_expression_500", |bench| {
        bench.iter(|| compile(black_box(&expression)));
    });

    let unchecked = Compiler::new(CompilerOptions::new().with_type_check(false));
    group.bench_function("functions_1000_no_type_check", |bench| {
        let program = many_functions(&b, 1000);
        bench.iter(|| unchecked.compile(black_box(&program)));
    });

    group.finish();
}

criterion_group!(benches, size_based_benchmarks, feature_specific_benchmarks);
criterion_main!(benches);
