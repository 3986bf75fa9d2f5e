//! Black-box end-to-end scenarios exercising the compiler/evaluator
//! through its public surface only.

use calcexpr::{compile, SymbolTable};

const EPSILON: f64 = 1e-10;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPSILON
}

#[test]
fn arithmetic_identity_and_folding() {
    let table: SymbolTable<f64> = SymbolTable::new();
    let expr = compile("(1+2)*(3+4)", &table).expect("valid source");
    assert!(close(expr.value(), 21.0));
    assert!(expr.str_value().is_none());
}

#[test]
fn mixed_variables_and_constants_with_strength_reduction() {
    let table: SymbolTable<f64> = SymbolTable::new();
    let x = table.create_variable("x", 5.0).expect("fresh name");
    let expr = compile("(2*x)*3*4", &table).expect("valid source");
    assert!(close(expr.value(), 120.0));
    x.set(2.5);
    assert!(close(expr.value(), 60.0));
}

#[test]
fn conditional_and_loops() {
    let table: SymbolTable<f64> = SymbolTable::new();
    let a = table.create_variable("a", 0.0).expect("fresh name");
    let i = table.create_variable("i", 0.0).expect("fresh name");
    let source = "a := 0; i := 1; while (i <= 10) { a := a + i; i := i + 1 }; a";
    let expr = compile(source, &table).expect("valid source");
    assert!(close(expr.value(), 55.0));
    assert!(close(a.get(), 55.0));
    assert!(close(i.get(), 11.0));
}

#[test]
fn switch_default() {
    let table: SymbolTable<f64> = SymbolTable::new();
    let x = table.create_variable("x", 0.0).expect("fresh name");
    let source = "switch { case x<0: -1; case x==0: 0; default: 1; }";
    let expr = compile(source, &table).expect("valid source");

    x.set(-3.5);
    assert!(close(expr.value(), -1.0));
    x.set(0.0);
    assert!(close(expr.value(), 0.0));
    x.set(7.0);
    assert!(close(expr.value(), 1.0));
}

#[test]
fn string_slicing_and_containment() {
    let table: SymbolTable<f64> = SymbolTable::new();
    let expr = compile("'hello world'[6:10]", &table).expect("valid source");
    assert!(expr.value().is_nan());
    assert_eq!(expr.str_value().as_deref(), Some("world"));

    let contains = compile("'abc' in 'xabcx'", &table).expect("valid source");
    assert!(close(contains.value(), 1.0));
    let missing = compile("'abd' in 'xabcx'", &table).expect("valid source");
    assert!(close(missing.value(), 0.0));
}

#[test]
fn integer_power_optimization() {
    let table: SymbolTable<f64> = SymbolTable::new();
    let x = table.create_variable("x", 2.0).expect("fresh name");
    let positive = compile("x^7", &table).expect("valid source");
    assert!(close(positive.value(), 128.0));

    let y = table.create_variable("y", 2.0).expect("fresh name");
    let negative = compile("y^-3", &table).expect("valid source");
    assert!(close(negative.value(), 0.125));

    drop((x, y));
}

#[test]
fn short_circuit_and_does_not_touch_rhs_side_effects() {
    let table: SymbolTable<f64> = SymbolTable::new();
    table.create_variable("touched", 0.0).expect("fresh name");
    // `x & (touched := 1)` with x false must never run the assignment.
    let x = table.create_variable("x", 0.0).expect("fresh name");
    let expr = compile("x & (touched := 1)", &table).expect("valid source");
    assert!(close(expr.value(), 0.0));
    assert!(close(table.get_variable("touched").expect("registered").get(), 0.0));
    drop(x);
}

#[test]
fn switch_evaluates_only_the_first_truthy_case() {
    let table: SymbolTable<f64> = SymbolTable::new();
    let hits = table.create_variable("hits", 0.0).expect("fresh name");
    let source = "switch { case 1: (hits := hits + 1); case 1: (hits := hits + 100); default: -1; }";
    let expr = compile(source, &table).expect("valid source");
    assert!(close(expr.value(), 1.0));
    assert!(close(hits.get(), 1.0));
}

#[test]
fn multi_switch_evaluates_every_truthy_case_returning_the_last() {
    let table: SymbolTable<f64> = SymbolTable::new();
    let hits = table.create_variable("hits", 0.0).expect("fresh name");
    let source = "[*] { case 1: (hits := hits + 1); case 1: (hits := hits + 10); }";
    let expr = compile(source, &table).expect("valid source");
    assert!(close(expr.value(), 11.0));
    assert!(close(hits.get(), 11.0));
}

#[test]
fn implicit_multiplication_matches_explicit_form() {
    let table: SymbolTable<f64> = SymbolTable::new();
    table.create_variable("x", 0.3).expect("fresh name");
    table.create_variable("y", 0.7).expect("fresh name");
    let implicit = compile("1.2sin(x)cos(2y)7 + 1", &table).expect("valid source");
    let explicit = compile("1.2 * sin(x) * cos(2*y) * 7 + 1", &table).expect("valid source");
    assert!(close(implicit.value(), explicit.value()));
}

#[test]
fn string_wildcard_matching() {
    let table: SymbolTable<f64> = SymbolTable::new();
    assert!(close(compile("'abracadabra' like 'a*a'", &table).expect("valid").value(), 1.0));
    assert!(close(compile("'abc' like 'a?c'", &table).expect("valid").value(), 1.0));
    assert!(close(compile("'abc' like 'A?C'", &table).expect("valid").value(), 0.0));
    assert!(close(compile("'abc' ilike 'A?C'", &table).expect("valid").value(), 1.0));
}

#[test]
fn range_clamps_out_of_bounds_upper_index() {
    let table: SymbolTable<f64> = SymbolTable::new();
    let expr = compile("'hello'[2:999]", &table).expect("valid source");
    assert_eq!(expr.str_value().as_deref(), Some("llo"));
}

#[test]
fn compile_failure_surfaces_every_diagnostic_not_just_the_first() {
    let table: SymbolTable<f64> = SymbolTable::new();
    let err = compile("(1 + ) * (2 +", &table).expect_err("malformed on both sides");
    assert!(err.error_count() >= 2);
}

#[test]
fn unknown_symbol_without_resolver_is_a_compile_error() {
    let table: SymbolTable<f64> = SymbolTable::new();
    let err = compile("q + 1", &table).expect_err("q is undeclared");
    assert!(err.error_count() >= 1);
}

#[test]
fn polynomial_helper_evaluates_via_horner() {
    let table: SymbolTable<f64> = SymbolTable::new();
    calcexpr::register_polynomial(&table, "p").expect("fresh name");
    let x = table.create_variable("x", 5.0).expect("fresh name");
    // p(x, 2, -3, 1) = 2x^2 - 3x + 1
    let expr = compile("p(x, 2, -3, 1)", &table).expect("valid source");
    assert!(close(expr.value(), 36.0));
    x.set(0.0);
    assert!(close(expr.value(), 1.0));
}

#[test]
fn compositor_splices_inner_expression_into_outer() {
    let table: SymbolTable<f64> = SymbolTable::new();
    table.create_variable("t", 3.0).expect("fresh name");
    let compositor = calcexpr::Compositor::new(table);
    let composed = compositor.compose("x^2 + 1", "x", "t + 1", &[]).expect("valid composition");
    assert!(close(composed.value(), 17.0));
}
