//! Polynomial helper: an external collaborator built entirely on the
//! symbol table's public function-registration contract (C2's
//! `add_vararg_function`), not on any crate-internal API.
//!
//! `p(x, c_k, …, c_0)` evaluates `Σ c_i·x^i` by Horner's rule: walk the
//! coefficients highest-degree-first, accumulating `acc = acc*x + c_i`.
//! This is the same accumulation order the synthesizer's own
//! [`crate::synth`] constant folder uses for nested arithmetic, just
//! expressed as a runtime loop instead of a compile-time fold.

use calcexpr_numeric::Numeric;
use crate::symtab::{SymbolTable, SymbolTableError};
use std::rc::Rc;

/// Evaluates `c_k·x^k + … + c_1·x + c_0` given `x` followed by the
/// coefficients from highest degree to the constant term.
///
/// `args` must have at least one element (`x`); an empty coefficient list
/// evaluates to `N::zero()`.
#[must_use]
pub fn horner<N: Numeric>(args: &[N]) -> N {
    let Some((&x, coeffs)) = args.split_first() else {
        return N::zero();
    };
    coeffs.iter().fold(N::zero(), |acc, &c| acc.mul(x).add(c))
}

/// Registers `p(x, c_k, …, c_0)` as a variadic function under `name`.
///
/// # Errors
/// Returns [`SymbolTableError`] under the same conditions as
/// [`SymbolTable::add_vararg_function`] — `name` is reserved or already
/// registered.
pub fn register<N: Numeric>(table: &SymbolTable<N>, name: &str) -> Result<(), SymbolTableError> {
    table.add_vararg_function(name, Rc::new(horner))
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::panic,
    clippy::cast_precision_loss,
    clippy::items_after_statements,
    clippy::let_underscore_must_use,
    clippy::no_effect_underscore_binding
)]
mod tests {
    use super::*;

    #[test]
    fn horner_matches_direct_evaluation() {
        // 2x^2 - 3x + 1 at x = 5 -> 2*25 - 15 + 1 = 36
        let value = horner(&[5.0_f64, 2.0, -3.0, 1.0]);
        assert_eq!(value, 36.0);
    }

    #[test]
    fn single_coefficient_is_a_constant() {
        assert_eq!(horner(&[100.0_f64, 7.0]), 7.0);
    }

    #[test]
    fn no_coefficients_is_zero() {
        assert_eq!(horner(&[100.0_f64]), 0.0);
    }

    #[test]
    fn registered_function_is_callable_through_the_table() {
        let table: SymbolTable<f64> = SymbolTable::new();
        register(&table, "p").expect("fresh name");
        let func = table.get_vararg_function("p").expect("registered");
        assert_eq!(func(&[2.0, 1.0, 0.0, -4.0]), 4.0);
    }
}
