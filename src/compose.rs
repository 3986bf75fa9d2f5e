//! Function-compositor: an external collaborator that builds expression
//! trees programmatically by splicing source text and delegating to the
//! parser, rather than touching the AST directly.
//!
//! Composing `outer(var)` with `inner` means: retokenize both, rename
//! every local variable `inner` declares so it cannot collide with a name
//! already live in `outer`'s symbol table, splice the mangled `inner`
//! text in for every occurrence of `var` in `outer`, and hand the
//! resulting source straight back to [`crate::parser::parse`] (via
//! [`Expression::compile`]). The compositor never builds an `ExprNode`
//! itself.

use crate::handle::{CompileFailure, Expression};
use crate::lexer::{lex, TokenKind};
use crate::symtab::SymbolTable;
use calcexpr_numeric::Numeric;
use std::cell::Cell;

/// Splices sub-expressions together under a shared [`SymbolTable`],
/// mangling local names to avoid collisions between the pieces it
/// composes.
pub struct Compositor<N: Numeric> {
    table: SymbolTable<N>,
    next_id: Cell<u64>,
}

impl<N: Numeric> Compositor<N> {
    /// Compose expressions against `table`, registering any mangled
    /// variable aliases it needs into that same table.
    #[must_use]
    pub fn new(table: SymbolTable<N>) -> Self {
        Self { table, next_id: Cell::new(0) }
    }

    /// The symbol table this compositor mangles names into.
    #[must_use]
    pub fn symbol_table(&self) -> &SymbolTable<N> {
        &self.table
    }

    fn mangle(&self, base: &str) -> String {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        format!("__compose_{id}_{base}")
    }

    /// Rewrites every identifier token matching `name` (case-insensitive,
    /// matching the symbol table's own name folding) to `replacement`,
    /// leaving every other token's original text untouched.
    fn rename(source: &str, name: &str, replacement: &str) -> String {
        let tokens = lex(source);
        let mut out = String::with_capacity(source.len() + replacement.len());
        for token in &tokens {
            if token.kind() == TokenKind::Eof {
                break;
            }
            if !out.is_empty() {
                out.push(' ');
            }
            if token.kind() == TokenKind::Symbol && token.lexeme().eq_ignore_ascii_case(name) {
                out.push_str(replacement);
            } else if token.kind() == TokenKind::String {
                out.push('\'');
                out.push_str(token.lexeme());
                out.push('\'');
            } else {
                out.push_str(token.lexeme());
            }
        }
        out
    }

    /// Builds `outer` with every occurrence of `var` replaced by a
    /// parenthesized copy of `inner`, after mangling every name in
    /// `inner_locals` throughout `inner` so it can't shadow or collide
    /// with anything already registered under `table`. Each mangled name
    /// is registered as an alias sharing the original's storage cell, so
    /// mutating either name's cell after composition is visible through
    /// both.
    ///
    /// # Errors
    /// Returns the spliced source's [`CompileFailure`] if the composed
    /// text fails to compile.
    pub fn compose(
        &self,
        outer: &str,
        var: &str,
        inner: &str,
        inner_locals: &[&str],
    ) -> Result<Expression<N>, CompileFailure> {
        let mut spliced_inner = inner.to_owned();
        for &local in inner_locals {
            let mangled = self.mangle(local);
            spliced_inner = Self::rename(&spliced_inner, local, &mangled);
            if let Some(cell) = self.table.get_variable(local) {
                let _ = self.table.add_variable(&mangled, cell, false);
            }
        }
        let rewritten = Self::rename(outer, var, &format!("({spliced_inner})"));
        Expression::compile(&rewritten, &self.table)
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
    fn composes_outer_with_inner_substitution() {
        let table: SymbolTable<f64> = SymbolTable::new();
        table.create_variable("t", 3.0).expect("fresh name");
        let compositor = Compositor::new(table);
        // outer: x^2 + 1, inner: t + 1 -> (t+1)^2 + 1, t=3 -> 17
        let composed = compositor
            .compose("x^2 + 1", "x", "t + 1", &[])
            .expect("valid composition");
        assert_eq!(composed.value(), 17.0);
    }

    #[test]
    fn mangles_colliding_local_names() {
        let table: SymbolTable<f64> = SymbolTable::new();
        table.create_variable("x", 10.0).expect("fresh name");
        let compositor = Compositor::new(table);
        // inner reuses "x" as its own local, distinct from outer's "x".
        let composed = compositor
            .compose("x + 1", "x", "x * 2", &["x"])
            .expect("valid composition");
        assert_eq!(composed.value(), 21.0);
        // the original "x" is untouched.
        assert_eq!(compositor.symbol_table().get_variable("x").expect("present").get(), 10.0);
    }
}
