//! Property-style tests for the universal invariants: tolerance symmetry,
//! `fast_exp` vs `pow` agreement, strength-reduction equivalence, and
//! short-circuit/switch evaluation-count guarantees.

use calcexpr::{compile, SymbolTable};
use calcexpr_numeric::Numeric;
use quickcheck::{quickcheck, TestResult};

const EPSILON: f64 = 1e-9;

quickcheck! {
    fn equal_is_reflexive(x: f64) -> TestResult {
        if !x.is_finite() {
            return TestResult::discard();
        }
        TestResult::from_bool(x.equal(x))
    }
}

quickcheck! {
    fn equal_is_symmetric(x: f64, y: f64) -> TestResult {
        if !x.is_finite() || !y.is_finite() {
            return TestResult::discard();
        }
        TestResult::from_bool(x.equal(y) == y.equal(x))
    }
}

quickcheck! {
    fn fast_exp_matches_pow_for_small_positive_exponents(v: f64, k: u8) -> TestResult {
        let k = i32::from(k % 60) + 1;
        if !v.is_finite() || v == 0.0 {
            return TestResult::discard();
        }
        let expected = v.powi(k);
        if !expected.is_finite() {
            return TestResult::discard();
        }
        let tolerance = expected.abs().max(1.0) * EPSILON;
        TestResult::from_bool((v.fast_exp(k) - expected).abs() <= tolerance)
    }
}

quickcheck! {
    fn strength_reduced_scale_matches_direct_multiplication(a: f64, b: f64, c: f64, v: f64) -> TestResult {
        if ![a, b, c, v].iter().all(|n| n.is_finite()) {
            return TestResult::discard();
        }
        let direct = a * b * c * v;
        if !direct.is_finite() {
            return TestResult::discard();
        }
        let table: SymbolTable<f64> = SymbolTable::new();
        table.create_variable("v", v).expect("fresh name");
        let source = format!("({a} * v) * {b} * {c}");
        let Ok(expr) = compile(&source, &table) else {
            return TestResult::discard();
        };
        let tolerance = direct.abs().max(1.0) * EPSILON;
        TestResult::from_bool((expr.value() - direct).abs() <= tolerance)
    }
}

#[test]
fn while_with_constant_false_condition_folds_to_constant_at_compile_time() {
    let table: SymbolTable<f64> = SymbolTable::new();
    let expr = compile("while (0) { 99 }", &table).expect("valid source");
    assert_eq!(expr.value(), 0.0);
}

#[test]
fn switch_stops_at_the_first_truthy_case() {
    let table: SymbolTable<f64> = SymbolTable::new();
    let evaluations = table.create_variable("evaluations", 0.0).expect("fresh name");
    let source = "switch { \
        case (evaluations := evaluations + 1) == 1: 'first'; \
        case (evaluations := evaluations + 100) == 101: 'second'; \
        default: 'neither'; \
    }";
    let expr = compile(source, &table).expect("valid source");
    assert_eq!(expr.str_value().as_deref(), Some("first"));
    assert_eq!(evaluations.get(), 1.0);
}

#[test]
fn multi_switch_evaluates_every_arm() {
    let table: SymbolTable<f64> = SymbolTable::new();
    let evaluations = table.create_variable("evaluations", 0.0).expect("fresh name");
    let source = "[*] { \
        case 1: (evaluations := evaluations + 1); \
        case 1: (evaluations := evaluations + 10); \
        case 1: (evaluations := evaluations + 100); \
    }";
    let expr = compile(source, &table).expect("valid source");
    assert_eq!(expr.value(), 111.0);
    assert_eq!(evaluations.get(), 111.0);
}
