//! The fixed set of keyword/operator-word names a caller cannot register as
//! a variable, string, function, or vector name.
//!
//! Built-in constants (`pi`, `epsilon`, `inf`) are deliberately **not**
//! reserved here: they are ordinary constant variables installed by
//! `SymbolTable::add_constants`, and a caller is free to pre-register its
//! own `pi` before calling it (the later `add_constants` call then simply
//! fails with `AlreadyExists`, which is the caller's problem to handle).

const RESERVED: &[&str] = &[
    // control-structure keywords
    "if", "then", "else", "while", "repeat", "until", "switch", "case", "default",
    "null",
    // boolean literals and logical operators/words
    "true", "false", "and", "or", "xor", "nand", "nor", "xnor", "not",
    // string operators
    "in", "like", "ilike",
    // arithmetic/bitwise operator words
    "mod", "shl", "shr",
    // trinary/aggregate builtins
    "min", "max", "avg", "sum", "mul", "clamp", "iclamp", "inrange",
    // variadic aggregate builtins
    "mand", "mor", "multi",
    // unary math builtins
    "abs", "sin", "cos", "tan", "asin", "acos", "atan", "sinh", "cosh", "tanh",
    "ln", "log10", "log2", "exp", "sqrt", "sgn", "frac", "trunc", "round",
    "ceil", "floor", "erf", "erfc", "notl", "d2r", "r2d",
    // binary math builtins
    "root", "logn", "atan2", "hypot",
];

/// `true` if `name` (matched case-insensitively) is a reserved keyword or
/// operator word and cannot be registered in a [`super::SymbolTable`].
#[must_use]
pub fn is_reserved(name: &str) -> bool {
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
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
    use super::is_reserved;

    #[test]
    fn keywords_are_reserved_case_insensitively() {
        assert!(is_reserved("if"));
        assert!(is_reserved("IF"));
        assert!(is_reserved("While"));
    }

    #[test]
    fn ordinary_names_are_not_reserved() {
        assert!(!is_reserved("x"));
        assert!(!is_reserved("pi"));
        assert!(!is_reserved("my_var"));
    }
}
