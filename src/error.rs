//! Structured diagnostics for lexing, the token pipeline, and parsing.
//!
//! Mirrors the teacher's `DiffError`/`Span` shape: a source-location `Span`
//! plus a small `enum` of error kinds, with a hand-written `Display` impl
//! rather than `thiserror` (kept consistent with the rest of the crate).

use std::fmt;

/// A byte-offset range in the source text, used to point diagnostics at the
/// offending token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    start: usize,
    end: usize,
}

impl Span {
    /// Create a span covering `[start, end)`. Swaps the bounds if given in
    /// the wrong order.
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        if end < start {
            Self { start: end, end: start }
        } else {
            Self { start, end }
        }
    }

    /// A single-byte span at `pos`.
    #[must_use]
    pub fn at(pos: usize) -> Self {
        Self { start: pos, end: pos + 1 }
    }

    /// Start offset (0-indexed, inclusive).
    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    /// End offset (0-indexed, exclusive).
    #[must_use]
    pub fn end(&self) -> usize {
        self.end
    }
}

/// Which phase of compilation raised the error, matching §6/§7's
/// `{unknown, syntax, token, numeric, symtab, lexer, helper}` kind set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Unclassified error (reserved for forward compatibility).
    Unknown,
    /// Parser-level structural error (missing operand, wrong arity, …).
    Syntax,
    /// Token-pipeline stage error (bracket mismatch, forbidden adjacency, …).
    Token,
    /// A numeric literal failed to parse.
    Numeric,
    /// Symbol-table error (undefined name, reserved name, assign-to-const).
    SymbolTable,
    /// Lexer-level error (malformed number, unterminated string, …).
    Lexer,
    /// Error raised by a helper/collaborator (e.g. constant-fold division
    /// by zero at synthesis time).
    Helper,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unknown => "UNKNOWN",
            Self::Syntax => "SYNTAX",
            Self::Token => "TOKEN",
            Self::Numeric => "NUMERIC",
            Self::SymbolTable => "SYMTAB",
            Self::Lexer => "LEXER",
            Self::Helper => "HELPER",
        };
        f.write_str(s)
    }
}

/// A single diagnostic: what went wrong, where, and a human-readable
/// message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    kind: ErrorKind,
    span: Span,
    message: String,
}

impl CompileError {
    /// Build a diagnostic of the given kind, anchored at `span`, with a
    /// human-readable `message`.
    pub fn new(kind: ErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self { kind, span, message: message.into() }
    }

    /// The error's phase.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The source span the error points at.
    #[must_use]
    pub fn span(&self) -> Span {
        self.span
    }

    /// The human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Position: {}  Type: [{}]  Msg: {}",
            self.span.start(),
            self.kind,
            self.message
        )
    }
}

impl std::error::Error for CompileError {}

/// Accumulated diagnostics from a single `compile()` call. Lexing keeps
/// scanning after the first error so callers can see every problem in one
/// pass, matching §7's "accumulate, don't short-circuit on first error"
/// propagation policy.
#[derive(Debug, Clone, Default)]
pub struct CompileReport {
    errors: Vec<CompileError>,
}

impl CompileReport {
    /// A fresh, empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic.
    pub fn push(&mut self, error: CompileError) {
        self.errors.push(error);
    }

    /// Merge another report's diagnostics into this one.
    pub fn extend(&mut self, other: CompileReport) {
        self.errors.extend(other.errors);
    }

    /// `true` if no diagnostics were recorded.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of diagnostics recorded.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Fetch the `i`-th diagnostic, if present.
    #[must_use]
    pub fn get_error(&self, i: usize) -> Option<&CompileError> {
        self.errors.get(i)
    }

    /// All diagnostics in recorded order.
    #[must_use]
    pub fn errors(&self) -> &[CompileError] {
        &self.errors
    }
}
