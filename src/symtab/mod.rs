//! Symbol table: named storage for variables, string variables, constants,
//! vectors, and user-registered functions (C2).
//!
//! Storage is always an `Rc`-shared cell, whether the entry started life as
//! "external" (a handle the caller also keeps, e.g. from `add_variable`) or
//! "internal" (allocated by `create_variable`/`create_stringvar`). This is
//! the non-owning-handle design the spec's Design Notes call for: cloning
//! an `Rc<Cell<N>>` gives the tree a read/write view into caller-owned
//! storage without borrow-checker lifetime entanglement, and removing the
//! entry from the table just drops the table's reference — a tree built
//! before the removal keeps working (or keeps seeing stale data), matching
//! the spec's documented "undefined behavior is the caller's problem".
//!
//! Tables are shared by reference count (`Rc<RefCell<Inner<N>>>`); cloning
//! a `SymbolTable` shares storage and lifetime, matching §3's contract.

mod reserved;

pub use reserved::is_reserved;

use calcexpr_numeric::Numeric;
use rustc_hash::FxHashMap;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Shared handle to a single numeric variable's storage.
pub type VarCell<N> = Rc<Cell<N>>;
/// Shared handle to a single string variable's storage.
pub type StringCell = Rc<RefCell<String>>;
/// Shared handle to a contiguous numeric vector's storage.
pub type VectorCell<N> = Rc<RefCell<Vec<N>>>;

/// A fixed-arity user function, `f(args) -> N` for a declared parameter
/// count in `0..=20`.
pub type UserFunction<N> = Rc<dyn Fn(&[N]) -> N>;
/// A variadic user function, accepting an ordered sequence of any length.
pub type VariadicFunction<N> = Rc<dyn Fn(&[N]) -> N>;

/// Errors raised by symbol-table mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolTableError {
    /// The name is a reserved keyword/operator/builtin and cannot be
    /// registered.
    Reserved(String),
    /// An entry with this name already exists.
    AlreadyExists(String),
    /// No entry with this name exists.
    NotFound(String),
    /// Declared parameter count for a function is out of the supported
    /// `0..=20` range.
    ArityOutOfRange(usize),
}

impl std::fmt::Display for SymbolTableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reserved(name) => write!(f, "'{name}' is a reserved name"),
            Self::AlreadyExists(name) => write!(f, "'{name}' is already registered"),
            Self::NotFound(name) => write!(f, "'{name}' is not registered"),
            Self::ArityOutOfRange(n) => write!(f, "function arity {n} is outside 0..=20"),
        }
    }
}

impl std::error::Error for SymbolTableError {}

#[derive(Clone)]
enum Entry<N: Numeric> {
    Variable { cell: VarCell<N>, is_const: bool },
    StringVariable { cell: StringCell, is_const: bool },
    Function { arity: usize, func: UserFunction<N> },
    VariadicFunction { func: VariadicFunction<N> },
    Vector { cell: VectorCell<N> },
}

/// Named storage shared by every expression compiled against it.
///
/// Names are matched case-insensitively: lookups lowercase the key before
/// hashing, matching the spec's "symbol names are matched case-
/// insensitively" rule (ASCII-only, per §9's Unicode open question
/// resolution — non-ASCII bytes in a name are accepted as opaque bytes and
/// are simply never folded, since folding is only defined for ASCII).
#[derive(Clone)]
pub struct SymbolTable<N: Numeric> {
    inner: Rc<RefCell<Inner<N>>>,
}

struct Inner<N: Numeric> {
    /// Multi-character names.
    entries: FxHashMap<String, Entry<N>>,
    insertion_order: Vec<String>,
    /// Fast path: single-character names live here, indexed directly by
    /// lowercase byte, and never enter `entries` at all — `get` skips the
    /// hash map entirely for the common `x`, `y`, `t` case.
    fast_path: Box<[Option<(String, Entry<N>)>; 256]>,
    fast_order: Vec<u8>,
}

fn canonical(name: &str) -> String {
    name.to_ascii_lowercase()
}

impl<N: Numeric> Default for SymbolTable<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Numeric> SymbolTable<N> {
    /// An empty table with no constants registered.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                entries: FxHashMap::default(),
                insertion_order: Vec::new(),
                fast_path: Box::new([const { None }; 256]),
                fast_order: Vec::new(),
            })),
        }
    }

    fn fast_index(name: &str) -> Option<usize> {
        let mut chars = name.chars();
        let first = chars.next()?;
        if chars.next().is_some() || !first.is_ascii() {
            return None;
        }
        Some(first.to_ascii_lowercase() as usize)
    }

    fn insert(&self, name: &str, entry: Entry<N>) -> Result<(), SymbolTableError> {
        if is_reserved(name) {
            return Err(SymbolTableError::Reserved(name.to_owned()));
        }
        let key = canonical(name);
        let mut inner = self.inner.borrow_mut();
        if let Some(idx) = Self::fast_index(&key) {
            if inner.fast_path[idx].is_some() {
                return Err(SymbolTableError::AlreadyExists(name.to_owned()));
            }
            inner.fast_path[idx] = Some((key.clone(), entry));
            inner.fast_order.push(idx as u8);
            return Ok(());
        }
        if inner.entries.contains_key(&key) {
            return Err(SymbolTableError::AlreadyExists(name.to_owned()));
        }
        inner.insertion_order.push(key.clone());
        inner.entries.insert(key, entry);
        Ok(())
    }

    fn get(&self, name: &str) -> Option<Entry<N>> {
        let key = canonical(name);
        if let Some(idx) = Self::fast_index(&key) {
            return self.inner.borrow().fast_path[idx].as_ref().map(|(_, entry)| entry.clone());
        }
        self.inner.borrow().entries.get(&key).cloned()
    }

    /// Register an externally-owned numeric variable. The caller keeps its
    /// own clone of `cell` to mutate between `value()` calls.
    pub fn add_variable(
        &self,
        name: &str,
        cell: VarCell<N>,
        is_const: bool,
    ) -> Result<(), SymbolTableError> {
        self.insert(name, Entry::Variable { cell, is_const })
    }

    /// Register an externally-owned string variable.
    pub fn add_stringvar(
        &self,
        name: &str,
        cell: StringCell,
        is_const: bool,
    ) -> Result<(), SymbolTableError> {
        self.insert(name, Entry::StringVariable { cell, is_const })
    }

    /// Register a fixed-arity user function (`arity` in `0..=20`).
    pub fn add_function(
        &self,
        name: &str,
        arity: usize,
        func: UserFunction<N>,
    ) -> Result<(), SymbolTableError> {
        if arity > 20 {
            return Err(SymbolTableError::ArityOutOfRange(arity));
        }
        self.insert(name, Entry::Function { arity, func })
    }

    /// Register a variadic user function.
    pub fn add_vararg_function(
        &self,
        name: &str,
        func: VariadicFunction<N>,
    ) -> Result<(), SymbolTableError> {
        self.insert(name, Entry::VariadicFunction { func })
    }

    /// Register a view over caller-owned contiguous storage.
    pub fn add_vector(&self, name: &str, cell: VectorCell<N>) -> Result<(), SymbolTableError> {
        self.insert(name, Entry::Vector { cell })
    }

    /// Allocate internal storage for `value` and register it, returning the
    /// shared cell so the caller can still read/write it directly.
    pub fn create_variable(&self, name: &str, value: N) -> Result<VarCell<N>, SymbolTableError> {
        let cell = Rc::new(Cell::new(value));
        self.add_variable(name, Rc::clone(&cell), false)?;
        Ok(cell)
    }

    /// Allocate internal storage for a string variable and register it.
    pub fn create_stringvar(
        &self,
        name: &str,
        value: impl Into<String>,
    ) -> Result<StringCell, SymbolTableError> {
        let cell = Rc::new(RefCell::new(value.into()));
        self.add_stringvar(name, Rc::clone(&cell), false)?;
        Ok(cell)
    }

    /// Register `pi`, `epsilon`, and `inf` as read-only constants.
    ///
    /// # Errors
    /// Returns an error only if one of these names is already registered.
    pub fn add_constants(&self) -> Result<(), SymbolTableError> {
        let pi = N::from_f64(std::f64::consts::PI);
        let epsilon = N::EPSILON;
        let inf = N::infinity();
        self.create_const("pi", pi)?;
        self.create_const("epsilon", epsilon)?;
        self.create_const("inf", inf)?;
        Ok(())
    }

    /// Allocate internal storage for a read-only constant and register it.
    pub fn create_const(&self, name: &str, value: N) -> Result<VarCell<N>, SymbolTableError> {
        let cell = Rc::new(Cell::new(value));
        self.add_variable(name, Rc::clone(&cell), true)?;
        Ok(cell)
    }

    /// Look up a numeric variable's shared cell.
    #[must_use]
    pub fn get_variable(&self, name: &str) -> Option<VarCell<N>> {
        match self.get(name)? {
            Entry::Variable { cell, .. } => Some(cell),
            _ => None,
        }
    }

    /// `true` if `name` is registered as a constant variable.
    #[must_use]
    pub fn is_constant(&self, name: &str) -> bool {
        matches!(self.get(name), Some(Entry::Variable { is_const: true, .. }))
    }

    /// Look up a string variable's shared cell.
    #[must_use]
    pub fn get_stringvar(&self, name: &str) -> Option<StringCell> {
        match self.get(name)? {
            Entry::StringVariable { cell, .. } => Some(cell),
            _ => None,
        }
    }

    /// Look up a fixed-arity function and its declared arity.
    #[must_use]
    pub fn get_function(&self, name: &str) -> Option<(usize, UserFunction<N>)> {
        match self.get(name)? {
            Entry::Function { arity, func } => Some((arity, func)),
            _ => None,
        }
    }

    /// Look up a variadic function.
    #[must_use]
    pub fn get_vararg_function(&self, name: &str) -> Option<VariadicFunction<N>> {
        match self.get(name)? {
            Entry::VariadicFunction { func } => Some(func),
            _ => None,
        }
    }

    /// Look up a registered vector view.
    #[must_use]
    pub fn get_vector(&self, name: &str) -> Option<VectorCell<N>> {
        match self.get(name)? {
            Entry::Vector { cell } => Some(cell),
            _ => None,
        }
    }

    /// `true` if any entry (of any kind) is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        let key = canonical(name);
        if let Some(idx) = Self::fast_index(&key) {
            return self.inner.borrow().fast_path[idx].is_some();
        }
        self.inner.borrow().entries.contains_key(&key)
    }

    /// Remove an entry, freeing the table's reference to its storage (any
    /// tree still holding a clone of the cell keeps working per §7).
    pub fn remove(&self, name: &str) -> bool {
        let key = canonical(name);
        let mut inner = self.inner.borrow_mut();
        if let Some(idx) = Self::fast_index(&key) {
            let removed = inner.fast_path[idx].as_ref().is_some_and(|(k, _)| k == &key);
            if removed {
                inner.fast_path[idx] = None;
                inner.fast_order.retain(|&b| b as usize != idx);
            }
            return removed;
        }
        let removed = inner.entries.remove(&key).is_some();
        if removed {
            inner.insertion_order.retain(|n| n != &key);
        }
        removed
    }

    /// Enumerate every registered name, fast-path (single-character) entries
    /// first in their insertion order, then every other entry in insertion
    /// order.
    #[must_use]
    pub fn variable_list(&self) -> Vec<String> {
        let inner = self.inner.borrow();
        let mut names: Vec<String> = inner
            .fast_order
            .iter()
            .filter_map(|&idx| inner.fast_path[idx as usize].as_ref().map(|(k, _)| k.clone()))
            .collect();
        names.extend(inner.insertion_order.iter().cloned());
        names
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
    fn case_insensitive_lookup() {
        let table: SymbolTable<f64> = SymbolTable::new();
        table.create_variable("X", 1.0).expect("fresh name");
        assert!(table.get_variable("x").is_some());
        assert!(table.get_variable("X").is_some());
    }

    #[test]
    fn reserved_names_rejected() {
        let table: SymbolTable<f64> = SymbolTable::new();
        assert!(matches!(
            table.create_variable("if", 1.0),
            Err(SymbolTableError::Reserved(_))
        ));
    }

    #[test]
    fn duplicate_names_rejected() {
        let table: SymbolTable<f64> = SymbolTable::new();
        table.create_variable("x", 1.0).expect("fresh name");
        assert!(matches!(
            table.create_variable("x", 2.0),
            Err(SymbolTableError::AlreadyExists(_))
        ));
    }

    #[test]
    fn shared_storage_survives_removal() {
        let table: SymbolTable<f64> = SymbolTable::new();
        let cell = table.create_variable("x", 3.0).expect("fresh name");
        table.remove("x");
        assert_eq!(cell.get(), 3.0);
        cell.set(4.0);
        assert_eq!(cell.get(), 4.0);
    }

    #[test]
    fn constants_are_flagged() {
        let table: SymbolTable<f64> = SymbolTable::new();
        table.add_constants().expect("fresh constants");
        assert!(table.is_constant("pi"));
        assert!(!table.is_constant("nonexistent"));
    }
}
