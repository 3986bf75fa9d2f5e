//! Unknown-symbol-resolver external collaborator (§6 of the design): an
//! adapter a caller installs so the parser can auto-register a variable or
//! constant the first time an undeclared name is referenced, instead of
//! failing with a symbol-table error.
//!
//! This only consumes the public [`crate::symtab::SymbolTable`] API, in
//! keeping with its role as an external collaborator rather than a core
//! subsystem.

use crate::symtab::{SymbolTable, SymbolTableError, VarCell};
use calcexpr_numeric::Numeric;

/// What an unresolved symbol should become.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// Register as a mutable variable.
    Variable,
    /// Register as a read-only constant.
    Constant,
}

/// The outcome of resolving one previously-unseen name: whether (and how)
/// to auto-register it, plus an optional message to surface to the caller
/// even on success (e.g. "assumed to be a variable defaulting to 0").
#[derive(Debug, Clone)]
pub struct Resolution<N: Numeric> {
    /// Whether to register a mutable variable or a read-only constant.
    pub kind: SymbolKind,
    /// The value to seed the new entry with.
    pub default_value: N,
    /// An advisory message the parser attaches to its diagnostics, even on
    /// a successful auto-registration.
    pub error_message: Option<String>,
}

impl<N: Numeric> Resolution<N> {
    /// Resolve `name` to a fresh mutable variable seeded with `default_value`.
    #[must_use]
    pub fn variable(default_value: N) -> Self {
        Self { kind: SymbolKind::Variable, default_value, error_message: None }
    }

    /// Resolve `name` to a fresh read-only constant.
    #[must_use]
    pub fn constant(default_value: N) -> Self {
        Self { kind: SymbolKind::Constant, default_value, error_message: None }
    }

    /// Attach an advisory message surfaced alongside this resolution.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }
}

/// A caller-supplied policy for handling references to undeclared names.
/// Installed on the parser; consulted exactly once per previously-unseen
/// name (subsequent references resolve through the symbol table like any
/// other registered entry).
pub trait UnknownSymbolResolver<N: Numeric> {
    /// Decide how to treat `name`, or return `None` to leave it undefined
    /// (the parser then reports the usual symbol-table error).
    fn resolve(&self, name: &str) -> Option<Resolution<N>>;
}

/// Auto-register `name` against `table` per `resolution`, returning the
/// freshly created cell.
///
/// # Errors
/// Propagates the table's rejection (e.g. if `resolve` mistakenly approved
/// a reserved or already-registered name).
pub(crate) fn auto_register<N: Numeric>(
    table: &SymbolTable<N>,
    name: &str,
    resolution: &Resolution<N>,
) -> Result<VarCell<N>, SymbolTableError> {
    match resolution.kind {
        SymbolKind::Variable => table.create_variable(name, resolution.default_value),
        SymbolKind::Constant => table.create_const(name, resolution.default_value),
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

    struct AlwaysZero;
    impl UnknownSymbolResolver<f64> for AlwaysZero {
        fn resolve(&self, _name: &str) -> Option<Resolution<f64>> {
            Some(Resolution::variable(0.0))
        }
    }

    #[test]
    fn resolver_auto_registers_a_variable() {
        let table: SymbolTable<f64> = SymbolTable::new();
        let resolver = AlwaysZero;
        let resolution = resolver.resolve("q").expect("always resolves");
        let cell = auto_register(&table, "q", &resolution).expect("fresh name");
        assert_eq!(cell.get(), 0.0);
        assert!(table.get_variable("q").is_some());
    }

    #[test]
    fn constant_resolution_is_flagged_constant() {
        let table: SymbolTable<f64> = SymbolTable::new();
        let resolution = Resolution::constant(2.0);
        auto_register(&table, "k", &resolution).expect("fresh name");
        assert!(table.is_constant("k"));
    }
}
