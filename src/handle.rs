//! Expression handle (C8): the reference-counted owner of a compiled tree
//! that callers actually hold onto.
//!
//! Mirrors the teacher's `CompiledEvaluator` being `Clone` over immutable
//! compiled state (`evaluator/mod.rs`): `Expression` is an `Rc`-shared
//! handle over the root [`ExprNode`] plus the [`SymbolTable`] it was
//! compiled against, so the tree's borrowed variable leaves stay valid for
//! as long as any clone of the handle is alive.

use crate::error::CompileReport;
use crate::expr::ExprNode;
use crate::resolver::UnknownSymbolResolver;
use crate::symtab::SymbolTable;
use crate::synth::CompileOptions;
use calcexpr_numeric::Numeric;
use std::rc::Rc;

struct Inner<N: Numeric> {
    root: ExprNode<N>,
    table: SymbolTable<N>,
}

/// A compiled expression. Cheap to clone — clones share the same tree and
/// symbol table, not copies of them.
///
/// # Example
/// ```
/// use calcexpr::{Expression, SymbolTable};
///
/// let table: SymbolTable<f64> = SymbolTable::new();
/// table.create_variable("x", 3.0).expect("fresh name");
/// let expr = Expression::compile("2 * x + 1", &table).expect("valid source");
/// assert_eq!(expr.value(), 7.0);
/// ```
#[derive(Clone)]
pub struct Expression<N: Numeric> {
    inner: Rc<Inner<N>>,
}

/// A `compile()` failure: every diagnostic collected along the way. On
/// failure the caller gets no `Expression` at all — a no-op handle whose
/// `value()` always returns `NaN` would just defer the same information
/// loss §7 warns against, so the failure path returns the report directly
/// instead.
pub type CompileFailure = CompileReport;

impl<N: Numeric> Expression<N> {
    /// Compile `source` against `table` with default options and no
    /// unknown-symbol resolver.
    ///
    /// # Errors
    /// Returns the accumulated [`CompileReport`] if any diagnostic was
    /// raised while lexing, running the token pipeline, or parsing.
    pub fn compile(source: &str, table: &SymbolTable<N>) -> Result<Self, CompileFailure> {
        Self::compile_with(source, table, CompileOptions::new(), None)
    }

    /// Compile `source` with explicit [`CompileOptions`] and an optional
    /// [`UnknownSymbolResolver`].
    ///
    /// # Errors
    /// Returns the accumulated [`CompileReport`] if any diagnostic was
    /// raised while lexing, running the token pipeline, or parsing.
    pub fn compile_with(
        source: &str,
        table: &SymbolTable<N>,
        opts: CompileOptions,
        resolver: Option<&dyn UnknownSymbolResolver<N>>,
    ) -> Result<Self, CompileFailure> {
        let outcome = crate::parser::parse(source, table, opts, resolver);
        if outcome.report.is_ok() {
            Ok(Self { inner: Rc::new(Inner { root: outcome.root, table: table.clone() }) })
        } else {
            Err(outcome.report)
        }
    }

    /// Evaluate the compiled tree.
    #[must_use]
    pub fn value(&self) -> N {
        self.inner.root.value()
    }

    /// The text this expression produces, if its root has a string facet
    /// (e.g. a string slice or concatenation). `None` for a purely
    /// numeric tree.
    #[must_use]
    pub fn str_value(&self) -> Option<String> {
        self.inner.root.str_value()
    }

    /// The symbol table this expression was compiled against. Shares the
    /// same underlying storage as the table the caller passed to
    /// `compile` — mutating entries through either handle is visible to
    /// both.
    #[must_use]
    pub fn symbol_table(&self) -> &SymbolTable<N> {
        &self.inner.table
    }
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
    fn compiled_expression_evaluates_and_shares_table() {
        let table: SymbolTable<f64> = SymbolTable::new();
        let cell = table.create_variable("x", 2.0).expect("fresh name");
        let expr = Expression::compile("x * 3", &table).expect("valid source");
        assert_eq!(expr.value(), 6.0);
        cell.set(5.0);
        assert_eq!(expr.value(), 15.0);
    }

    #[test]
    fn clone_shares_the_same_tree() {
        let table: SymbolTable<f64> = SymbolTable::new();
        table.create_variable("x", 1.0).expect("fresh name");
        let expr = Expression::compile("x + 1", &table).expect("valid source");
        let clone = expr.clone();
        assert_eq!(clone.value(), expr.value());
    }

    #[test]
    fn failed_compile_returns_the_report_not_a_handle() {
        let table: SymbolTable<f64> = SymbolTable::new();
        let err = Expression::compile("1 +", &table).expect_err("missing operand");
        assert!(err.error_count() > 0);
    }

    #[test]
    fn string_valued_root_exposes_str_value() {
        let table: SymbolTable<f64> = SymbolTable::new();
        let expr = Expression::compile("'hello'", &table).expect("valid source");
        assert_eq!(expr.str_value().as_deref(), Some("hello"));
    }
}
