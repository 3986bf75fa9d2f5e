#![forbid(unsafe_code)]
//! Embeddable textual-math-expression compiler and evaluator.
//!
//! A small, dependency-light library for turning a line of math-like
//! source text into a compiled, repeatedly-evaluable expression tree.
//!
//! # Features
//! - Recursive-descent parser with a 14-level precedence ladder: infix
//!   arithmetic, comparisons, short-circuiting logical operators,
//!   assignment, and control constructs (`if`, `while`, `repeat … until`,
//!   `switch`, multi-switch)
//! - Generic over the numeric domain (`f64`, `f32`, `i64`, `i32`, …) via
//!   [`calcexpr_numeric::Numeric`]
//! - Algebraic strength reduction and constant folding at compile time,
//!   toggleable through [`CompileOptions`]
//! - A symbol table shared by reference count across every expression
//!   compiled against it, so mutating a registered variable between
//!   `value()` calls is the normal evaluation loop
//! - Structured diagnostics: a single `compile` call surfaces every
//!   lexical, structural, and symbol-table problem in the source at once
//!   instead of stopping at the first one
//!
//! # Usage
//!
//! ```
//! use calcexpr::{compile, SymbolTable};
//!
//! let table: SymbolTable<f64> = SymbolTable::new();
//! table.add_constants().unwrap();
//! let x = table.create_variable("x", 2.0).unwrap();
//!
//! let expr = compile("2 * x^3 + 1", &table).unwrap();
//! assert_eq!(expr.value(), 17.0);
//!
//! x.set(3.0);
//! assert_eq!(expr.value(), 55.0);
//! ```
//!
//! Compile errors accumulate instead of aborting on the first one:
//!
//! ```
//! use calcexpr::{compile, SymbolTable};
//!
//! let table: SymbolTable<f64> = SymbolTable::new();
//! let err = compile("1 + )", &table).unwrap_err();
//! assert!(err.error_count() > 0);
//! println!("{}", err.get_error(0).unwrap());
//! ```

mod compose;
mod error;
mod expr;
mod handle;
mod lexer;
mod parser;
mod pipeline;
mod polynomial;
mod resolver;
mod symtab;
mod synth;

pub use compose::Compositor;
pub use error::{CompileError, CompileReport, ErrorKind, Span};
pub use expr::{AggOp, BinaryOp, ExprNode, NodeShape, StringOp, TrinaryOp, UnaryOp, VarargOp};
pub use handle::{CompileFailure, Expression};
pub use parser::{parse, ParseOutcome};
pub use polynomial::{horner, register as register_polynomial};
pub use resolver::{Resolution, SymbolKind, UnknownSymbolResolver};
pub use symtab::{
    is_reserved, SymbolTable, SymbolTableError, StringCell, UserFunction, VarCell,
    VariadicFunction, VectorCell,
};
pub use synth::CompileOptions;

use calcexpr_numeric::Numeric;

/// Compile `source` against `table` with default [`CompileOptions`] and no
/// unknown-symbol resolver. The thin top-level entry point most callers
/// want; for strength-reduction control or auto-registration, use
/// [`Expression::compile_with`] directly.
///
/// # Errors
/// Returns the accumulated [`CompileReport`] if lexing, the token
/// pipeline, or parsing raised any diagnostic.
pub fn compile<N: Numeric>(
    source: &str,
    table: &SymbolTable<N>,
) -> Result<Expression<N>, CompileFailure> {
    Expression::compile(source, table)
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
    fn compile_reuses_default_options() {
        let table: SymbolTable<f64> = SymbolTable::new();
        let expr = compile("1 + 2 * 3", &table).expect("valid source");
        assert_eq!(expr.value(), 7.0);
    }

    #[test]
    fn compile_failure_reports_every_error() {
        let table: SymbolTable<f64> = SymbolTable::new();
        let err = compile("1 + ) + (", &table).expect_err("malformed source");
        assert!(err.error_count() >= 1);
    }
}
