//! Compile and evaluation benchmarks for the core arithmetic pipeline.
//!
//! Mirrors the teacher's parsing/diff benchmark groups: one group per
//! pipeline stage (compile, then repeated evaluation of the already-compiled
//! tree), over a handful of representative expressions of increasing shape
//! complexity.

use calcexpr::{compile, CompileOptions, Expression, SymbolTable};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

const CONST_FOLD: &str = "(1+2)*(3+4)*(5+6)";
const LINEAR_SCALE: &str = "(2*x)*3*4";
const POLYNOMIAL: &str = "x^3 + 2*x^2 + x + 1";
const TRIG_MIX: &str = "sin(x) * cos(y) + tan(x - y)";
const IPOW: &str = "x^7";
const CONTROL_FLOW: &str = "a := 0; i := 1; while (i <= 10) { a := a + i; i := i + 1 }; a";

fn table_with_xy() -> SymbolTable<f64> {
    let table = SymbolTable::new();
    table.create_variable("x", 1.5).expect("fresh name");
    table.create_variable("y", 0.5).expect("fresh name");
    table.add_constants().expect("fresh constants");
    table
}

fn table_with_ai() -> SymbolTable<f64> {
    let table = SymbolTable::new();
    table.create_variable("a", 0.0).expect("fresh name");
    table.create_variable("i", 0.0).expect("fresh name");
    table
}

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");
    let xy = table_with_xy();
    let ai = table_with_ai();

    group.bench_function("const_fold", |b| {
        let table: SymbolTable<f64> = SymbolTable::new();
        b.iter(|| compile(black_box(CONST_FOLD), &table));
    });
    group.bench_function("linear_scale", |b| {
        b.iter(|| compile(black_box(LINEAR_SCALE), &xy));
    });
    group.bench_function("polynomial", |b| {
        b.iter(|| compile(black_box(POLYNOMIAL), &xy));
    });
    group.bench_function("trig_mix", |b| {
        b.iter(|| compile(black_box(TRIG_MIX), &xy));
    });
    group.bench_function("ipow", |b| {
        b.iter(|| compile(black_box(IPOW), &xy));
    });
    group.bench_function("control_flow", |b| {
        b.iter(|| compile(black_box(CONTROL_FLOW), &ai));
    });

    group.finish();
}

fn bench_strength_reduction_toggle(c: &mut Criterion) {
    let mut group = c.benchmark_group("strength_reduction");
    let xy = table_with_xy();
    let on = CompileOptions::new().strength_reduction(true);
    let off = CompileOptions::new().strength_reduction(false);

    group.bench_function("linear_scale_on", |b| {
        b.iter(|| Expression::compile_with(black_box(LINEAR_SCALE), &xy, on, None));
    });
    group.bench_function("linear_scale_off", |b| {
        b.iter(|| Expression::compile_with(black_box(LINEAR_SCALE), &xy, off, None));
    });

    group.finish();
}

fn bench_value(c: &mut Criterion) {
    let mut group = c.benchmark_group("value");
    let xy = table_with_xy();
    let ai = table_with_ai();

    let polynomial = compile(POLYNOMIAL, &xy).expect("valid source");
    let trig_mix = compile(TRIG_MIX, &xy).expect("valid source");
    let ipow = compile(IPOW, &xy).expect("valid source");
    let control_flow = compile(CONTROL_FLOW, &ai).expect("valid source");

    group.bench_function("polynomial", |b| b.iter(|| black_box(&polynomial).value()));
    group.bench_function("trig_mix", |b| b.iter(|| black_box(&trig_mix).value()));
    group.bench_function("ipow", |b| b.iter(|| black_box(&ipow).value()));
    group.bench_function("control_flow", |b| b.iter(|| black_box(&control_flow).value()));

    group.finish();
}

criterion_group!(benches, bench_compile, bench_strength_reduction_toggle, bench_value);
criterion_main!(benches);
