//! Expression generator / optimizer (C7): the single entry point every
//! synthesized node flows through on its way from the parser into the
//! tree, performing constant folding, shape selection, and (when enabled)
//! algebraic strength reduction.
//!
//! Mirrors the teacher's single dispatch point for building compiled
//! state (`compile` → staged optimizer passes): `build_binary` runs the
//! same staged pipeline — null propagation, assignment/short-circuit
//! special-casing, constant folding, then pattern-keyed shape selection
//! with strength reduction — as one function rather than as several
//! independent rewrite passes over an already-built tree.

pub mod special_fns;

use crate::expr::{BinaryOp, ExprNode, StringOp, TrinaryOp, UnaryOp, VarargOp};
use crate::expr::range::RangePack;
use calcexpr_numeric::Numeric;
use std::fmt;

/// The operator named by a parsed binary-operator token, before synthesis
/// has decided whether it denotes an arithmetic/comparison/logical
/// operation or (when both operands are text) a string operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum RawBinOp {
    /// `+` — numeric add, or string concat if both operands are text.
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
    /// `^`
    Pow,
    /// `<` — numeric or lexicographic.
    Lt,
    /// `<=`
    Lte,
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `==`
    Eq,
    /// `!=` / `<>`
    Ne,
    /// `and`
    And,
    /// `or`
    Or,
    /// `xor`
    Xor,
    /// `nand`
    Nand,
    /// `nor`
    Nor,
    /// `xnor`
    Xnor,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `root(a, b)`
    Root,
    /// `logn(a, b)`
    Logn,
    /// `atan2(a, b)`
    Atan2,
    /// `hypot(a, b)`
    Hypot,
    /// `in(a, b)` — string-only.
    In,
    /// `like(a, b)` — string-only.
    Like,
    /// `ilike(a, b)` — string-only.
    ILike,
}

/// Errors raised while synthesizing a node — structural problems the
/// parser surfaces as a `Syntax`/`SymbolTable`-kinded [`crate::error::CompileError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthError {
    /// Left-hand side of `:=` is not a bare variable.
    AssignToNonVariable,
    /// Left-hand side of `:=` is a constant-flagged variable.
    AssignToConstant,
    /// A constant-folded division/modulus had a zero divisor: per §7 this
    /// is a compile-time error, not a silently-folded `NaN`/`Inf`.
    DivisionByZeroAtFold,
    /// One operand is text and the other is numeric, or the operator
    /// (`in`/`like`/`ilike`) requires text operands that weren't given.
    StringNumericMismatch,
}

impl fmt::Display for SynthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::AssignToNonVariable => "left-hand side of ':=' must be a variable",
            Self::AssignToConstant => "cannot assign to a constant",
            Self::DivisionByZeroAtFold => "division by zero in constant-folded expression",
            Self::StringNumericMismatch => "cannot mix string and numeric operands",
        };
        f.write_str(s)
    }
}

impl std::error::Error for SynthError {}

/// Compile-time options consulted by the synthesizer, matching the
/// teacher's builder-pattern configuration structs.
#[derive(Debug, Clone, Copy)]
pub struct CompileOptions {
    strength_reduction: bool,
    cache_symbols: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self { strength_reduction: true, cache_symbols: false }
    }
}

impl CompileOptions {
    /// A fresh options set with every flag at its documented default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable algebraic strength reduction (default: on).
    #[must_use]
    pub fn strength_reduction(mut self, on: bool) -> Self {
        self.strength_reduction = on;
        self
    }

    /// `true` if strength reduction is enabled.
    #[must_use]
    pub fn strength_reduction_enabled(&self) -> bool {
        self.strength_reduction
    }

    /// Enable or disable symbol-name caching during parsing (default: off).
    /// When on, [`crate::parser::ParseOutcome::symbols`] returns the sorted
    /// unique set of every name the parse referenced.
    #[must_use]
    pub fn cache_symbols(mut self, on: bool) -> Self {
        self.cache_symbols = on;
        self
    }

    /// `true` if symbol-name caching is enabled.
    #[must_use]
    pub fn cache_symbols_enabled(&self) -> bool {
        self.cache_symbols
    }
}

fn raw_to_binary_op(raw: RawBinOp) -> Option<BinaryOp> {
    Some(match raw {
        RawBinOp::Add => BinaryOp::Add,
        RawBinOp::Sub => BinaryOp::Sub,
        RawBinOp::Mul => BinaryOp::Mul,
        RawBinOp::Div => BinaryOp::Div,
        RawBinOp::Mod => BinaryOp::Mod,
        RawBinOp::Pow => BinaryOp::Pow,
        RawBinOp::Lt => BinaryOp::Lt,
        RawBinOp::Lte => BinaryOp::Lte,
        RawBinOp::Gt => BinaryOp::Gt,
        RawBinOp::Gte => BinaryOp::Gte,
        RawBinOp::Eq => BinaryOp::Eq,
        RawBinOp::Ne => BinaryOp::Ne,
        RawBinOp::And => BinaryOp::And,
        RawBinOp::Or => BinaryOp::Or,
        RawBinOp::Xor => BinaryOp::Xor,
        RawBinOp::Nand => BinaryOp::Nand,
        RawBinOp::Nor => BinaryOp::Nor,
        RawBinOp::Xnor => BinaryOp::Xnor,
        RawBinOp::Shl => BinaryOp::Shl,
        RawBinOp::Shr => BinaryOp::Shr,
        RawBinOp::Root => BinaryOp::Root,
        RawBinOp::Logn => BinaryOp::Logn,
        RawBinOp::Atan2 => BinaryOp::Atan2,
        RawBinOp::Hypot => BinaryOp::Hypot,
        RawBinOp::In | RawBinOp::Like | RawBinOp::ILike => return None,
    })
}

fn raw_to_string_op(raw: RawBinOp) -> Option<StringOp> {
    Some(match raw {
        RawBinOp::Add => StringOp::Concat,
        RawBinOp::Lt => StringOp::Lt,
        RawBinOp::Lte => StringOp::Lte,
        RawBinOp::Gt => StringOp::Gt,
        RawBinOp::Gte => StringOp::Gte,
        RawBinOp::Eq => StringOp::Eq,
        RawBinOp::Ne => StringOp::Ne,
        RawBinOp::In => StringOp::In,
        RawBinOp::Like => StringOp::Like,
        RawBinOp::ILike => StringOp::ILike,
        _ => return None,
    })
}

/// Build a binary node (§4.7's single synthesis entry point). Rejects
/// `Null` operands by propagating `Null` (step 1); routes text operands
/// to the string-operator family (invariant 5); constant-folds (step 4);
/// otherwise selects a shape-specialized node, applying strength
/// reduction when `opts` allows it (step 5).
///
/// # Errors
/// See [`SynthError`].
pub fn build_binary<N: Numeric>(
    raw: RawBinOp,
    lhs: ExprNode<N>,
    rhs: ExprNode<N>,
    opts: &CompileOptions,
) -> Result<ExprNode<N>, SynthError> {
    if matches!(lhs, ExprNode::Null) || matches!(rhs, ExprNode::Null) {
        return Ok(ExprNode::Null);
    }

    let lhs_text = lhs.is_string_valued();
    let rhs_text = rhs.is_string_valued();
    if lhs_text || rhs_text {
        let Some(string_op) = raw_to_string_op(raw) else {
            return Err(SynthError::StringNumericMismatch);
        };
        if !lhs_text || !rhs_text {
            return Err(SynthError::StringNumericMismatch);
        }
        return Ok(ExprNode::StringOp(string_op, Box::new(lhs), Box::new(rhs)));
    }

    let Some(op) = raw_to_binary_op(raw) else {
        return Err(SynthError::StringNumericMismatch);
    };

    if let (Some(a), Some(b)) = (lhs.as_constant(), rhs.as_constant()) {
        if matches!(op, BinaryOp::Div | BinaryOp::Mod) && b == N::zero() {
            return Err(SynthError::DivisionByZeroAtFold);
        }
        return Ok(ExprNode::Constant(op.apply(a, b)));
    }

    Ok(select_shape(op, lhs, rhs, opts))
}

/// Build an assignment node. `lhs` must be a bare, non-constant variable.
///
/// # Errors
/// See [`SynthError`].
pub fn build_assignment<N: Numeric>(
    lhs: ExprNode<N>,
    rhs: ExprNode<N>,
) -> Result<ExprNode<N>, SynthError> {
    match lhs {
        ExprNode::Variable { is_const: true, .. } => Err(SynthError::AssignToConstant),
        ExprNode::Variable { cell, is_const: false } => {
            Ok(ExprNode::Assignment { var: cell, value: Box::new(rhs) })
        }
        _ => Err(SynthError::AssignToNonVariable),
    }
}

/// Build a `&` short-circuit-and node, folding `0 && x` to `0` without
/// evaluating `x`.
#[must_use]
pub fn build_short_and<N: Numeric>(lhs: ExprNode<N>, rhs: ExprNode<N>) -> ExprNode<N> {
    match lhs.as_constant() {
        Some(c) if !c.is_true() => ExprNode::Constant(N::zero()),
        _ => ExprNode::ShortCircuitAnd(Box::new(lhs), Box::new(rhs)),
    }
}

/// Build a `|` short-circuit-or node, folding `1 || x` to `1` without
/// evaluating `x`.
#[must_use]
pub fn build_short_or<N: Numeric>(lhs: ExprNode<N>, rhs: ExprNode<N>) -> ExprNode<N> {
    match lhs.as_constant() {
        Some(c) if c.is_true() => ExprNode::Constant(N::one()),
        _ => ExprNode::ShortCircuitOr(Box::new(lhs), Box::new(rhs)),
    }
}

/// Build a unary node: constant-folds, and compacts a variable operand
/// into `UnaryVar` to skip the child-pointer indirection.
#[must_use]
pub fn build_unary<N: Numeric>(op: UnaryOp, operand: ExprNode<N>) -> ExprNode<N> {
    if matches!(operand, ExprNode::Null) {
        return ExprNode::Null;
    }
    if let Some(v) = operand.as_constant() {
        return ExprNode::Constant(op.apply(v));
    }
    if let Some(cell) = operand.as_variable() {
        return ExprNode::Shape(crate::expr::shape::ShapeNode::UnaryVar(op, cell.clone()));
    }
    ExprNode::Unary(op, Box::new(operand))
}

/// Build a trinary node (`clamp`/`iclamp`/`inrange`/3-ary aggregate),
/// constant-folding when every operand is constant.
#[must_use]
pub fn build_trinary<N: Numeric>(
    op: TrinaryOp,
    a: ExprNode<N>,
    b: ExprNode<N>,
    c: ExprNode<N>,
) -> ExprNode<N> {
    if matches!(a, ExprNode::Null) || matches!(b, ExprNode::Null) || matches!(c, ExprNode::Null) {
        return ExprNode::Null;
    }
    if let (Some(av), Some(bv), Some(cv)) = (a.as_constant(), b.as_constant(), c.as_constant()) {
        return ExprNode::Constant(op.apply(av, bv, cv));
    }
    ExprNode::Trinary(op, Box::new(a), Box::new(b), Box::new(c))
}

/// Build a fixed 4/5/6-ary aggregate node (§4.5's `quaternary`/`quinary`/
/// `senary` extension of the 3-ary aggregate operators), constant-folding
/// when every operand is constant.
#[must_use]
pub fn build_aggregate<N: Numeric>(op: crate::expr::AggOp, items: Vec<ExprNode<N>>) -> ExprNode<N> {
    if items.iter().any(|item| matches!(item, ExprNode::Null)) {
        return ExprNode::Null;
    }
    if items.iter().all(ExprNode::is_constant) {
        let values: Vec<N> = items.iter().map(|item| item.as_constant().unwrap_or_else(N::nan)).collect();
        return ExprNode::Constant(op.fold(&values));
    }
    ExprNode::Aggregate(op, items)
}

/// Build a variadic node, constant-folding when every operand is
/// constant.
#[must_use]
pub fn build_vararg<N: Numeric>(op: VarargOp, items: Vec<ExprNode<N>>) -> ExprNode<N> {
    if items.iter().any(|item| matches!(item, ExprNode::Null)) {
        return ExprNode::Null;
    }
    if items.iter().all(ExprNode::is_constant) {
        let node = ExprNode::Vararg(op, items);
        return ExprNode::Constant(node.value());
    }
    ExprNode::Vararg(op, items)
}

/// Build a conditional node, folding away the untaken branch when the
/// test is a compile-time constant (the not-taken branch's side effects
/// never occur, matching §9's resolved open question).
#[must_use]
pub fn build_conditional<N: Numeric>(
    test: ExprNode<N>,
    then: ExprNode<N>,
    els: ExprNode<N>,
) -> ExprNode<N> {
    if matches!(test, ExprNode::Null) || matches!(then, ExprNode::Null) || matches!(els, ExprNode::Null) {
        return ExprNode::Null;
    }
    if let Some(c) = test.as_constant() {
        return if c.is_true() { then } else { els };
    }
    ExprNode::Conditional(Box::new(test), Box::new(then), Box::new(els))
}

/// Build a `while` node, folding to `Null`'s numeric sibling — a `0`
/// constant — when the test is a compile-time-false constant (the body
/// never runs and so never compiles into live code).
#[must_use]
pub fn build_while<N: Numeric>(test: ExprNode<N>, body: ExprNode<N>) -> ExprNode<N> {
    if matches!(test, ExprNode::Null) || matches!(body, ExprNode::Null) {
        return ExprNode::Null;
    }
    if let Some(c) = test.as_constant() {
        if !c.is_true() {
            return ExprNode::Constant(N::zero());
        }
    }
    ExprNode::While(Box::new(test), Box::new(body))
}

/// Build a `repeat ... until` node. Unlike `while`, the body always runs
/// at least once, so there is no fold-to-constant shortcut analogous to
/// `build_while`'s false-test case.
#[must_use]
pub fn build_repeat_until<N: Numeric>(body: ExprNode<N>, test: ExprNode<N>) -> ExprNode<N> {
    if matches!(body, ExprNode::Null) || matches!(test, ExprNode::Null) {
        return ExprNode::Null;
    }
    ExprNode::RepeatUntil(Box::new(body), Box::new(test))
}

/// Build a `[*] { case C: E; ... }` multi-switch node, folding away arms
/// whose condition is a compile-time-false constant (their consequent can
/// never be evaluated) and folding to a constant outright when every
/// surviving arm's condition is constant.
#[must_use]
pub fn build_multi_switch<N: Numeric>(arms: Vec<(ExprNode<N>, ExprNode<N>)>) -> ExprNode<N> {
    if arms.iter().any(|(c, e)| matches!(c, ExprNode::Null) || matches!(e, ExprNode::Null)) {
        return ExprNode::Null;
    }
    if arms.iter().all(|(c, _)| c.is_constant()) {
        let node = ExprNode::MultiSwitch { arms };
        return ExprNode::Constant(node.value());
    }
    ExprNode::MultiSwitch { arms }
}

/// Build a `switch` node, folding to the matching branch's value when
/// every condition is a compile-time constant.
#[must_use]
pub fn build_switch<N: Numeric>(arms: Vec<(ExprNode<N>, ExprNode<N>)>, default: ExprNode<N>) -> ExprNode<N> {
    if matches!(default, ExprNode::Null) || arms.iter().any(|(c, e)| matches!(c, ExprNode::Null) || matches!(e, ExprNode::Null))
    {
        return ExprNode::Null;
    }
    if arms.iter().all(|(c, _)| c.is_constant()) {
        for (c, e) in arms {
            if c.as_constant().is_some_and(Numeric::is_true) {
                return e;
            }
        }
        return default;
    }
    ExprNode::Switch { arms, default: Box::new(default) }
}

/// Select a shape-specialized node for `(lhs op rhs)`, applying the
/// algebraic strength reductions named in §4.7 when `opts` allows it.
fn select_shape<N: Numeric>(op: BinaryOp, lhs: ExprNode<N>, rhs: ExprNode<N>, opts: &CompileOptions) -> ExprNode<N> {
    if opts.strength_reduction_enabled() {
        match try_strength_reduce(op, lhs, rhs) {
            Ok(reduced) => return reduced,
            Err((lhs, rhs)) => return dispatch_shape(op, lhs, rhs),
        }
    }
    dispatch_shape(op, lhs, rhs)
}

/// Try the named strength-reduction rewrites. On a miss, hands `lhs`/`rhs`
/// back unchanged so the caller can fall through to the generic shape
/// dispatch without re-building either operand.
fn try_strength_reduce<N: Numeric>(
    op: BinaryOp,
    lhs: ExprNode<N>,
    rhs: ExprNode<N>,
) -> Result<ExprNode<N>, (ExprNode<N>, ExprNode<N>)> {
    // x^k for integer k in [-60,-1] ∪ [1,60] -> Ipow. Only needs to borrow a
    // clone of the variable cell, so lhs/rhs are simply dropped on the
    // matched path and left untouched otherwise.
    if op == BinaryOp::Pow {
        if let (Some(cell), Some(k)) = (lhs.as_variable().cloned(), rhs.as_constant().and_then(as_small_integer)) {
            if (1..=60).contains(&k.abs()) {
                return Ok(ExprNode::Shape(crate::expr::shape::ShapeNode::Ipow(cell, k)));
            }
        }
    }

    // (a / b) / c -> a / (b * c): only reduces the direct `Binary(Div, ..)`
    // shape (shape-specialized div lhs nodes are not further reduced).
    if op == BinaryOp::Div {
        return match lhs {
            ExprNode::Binary(BinaryOp::Div, a, b) => {
                let combined_divisor = ExprNode::Binary(BinaryOp::Mul, b, Box::new(rhs));
                Ok(ExprNode::Binary(BinaryOp::Div, a, Box::new(combined_divisor)))
            }
            other => Err((other, rhs)),
        };
    }

    // (c0 + v) + c1 -> v + (c0 + c1); (c0 * v) * c1 -> v * (c0 * c1).
    if matches!(op, BinaryOp::Add | BinaryOp::Mul) {
        if rhs.as_constant().is_some() {
            return match lhs {
                ExprNode::Shape(crate::expr::shape::ShapeNode::Cov(c0, inner_op, v)) if inner_op == op => {
                    let c1 = rhs.as_constant().unwrap_or_else(N::nan);
                    let combined = op.apply(c0, c1);
                    Ok(ExprNode::Shape(crate::expr::shape::ShapeNode::Voc(v, op, combined)))
                }
                ExprNode::Shape(crate::expr::shape::ShapeNode::Voc(v, inner_op, c0))
                    if inner_op == op && op.is_commutative() =>
                {
                    let c1 = rhs.as_constant().unwrap_or_else(N::nan);
                    let combined = op.apply(c0, c1);
                    Ok(ExprNode::Shape(crate::expr::shape::ShapeNode::Voc(v, op, combined)))
                }
                other => Err((other, rhs)),
            };
        }
    }

    Err((lhs, rhs))
}

fn as_small_integer<N: Numeric>(v: N) -> Option<i32> {
    if !v.is_integer_valued() {
        return None;
    }
    let f = v.to_f64();
    if f.abs() > f64::from(i32::MAX) {
        return None;
    }
    #[allow(
        clippy::cast_possible_truncation,
        reason = "already checked to fit in i32's range"
    )]
    let k = f as i32;
    if k == 0 { None } else { Some(k) }
}

/// Tries to compact `(s0 op0 s1) op rhs_slot` into a single [`Compact3`](crate::expr::shape::ShapeNode::Compact3)
/// node when `lhs` is itself a two-slot compacted shape (`Vov`/`Cov`/`Voc`),
/// covering the `vovov`/`covov`/`vocov`/`covoc` family named in §4.7 without
/// one struct per permutation. Hands `lhs` back unchanged on a miss so the
/// caller can fall through to `Bov`/`Boc`.
fn try_compact3<N: Numeric>(
    op: BinaryOp,
    lhs: ExprNode<N>,
    rhs_slot: crate::expr::shape::Slot<N>,
) -> Result<crate::expr::shape::ShapeNode<N>, ExprNode<N>> {
    use crate::expr::shape::{ShapeNode, Slot};
    match lhs {
        ExprNode::Shape(ShapeNode::Vov(a, op0, b)) => {
            Ok(ShapeNode::Compact3(Slot::Var(a), op0, Slot::Var(b), op, rhs_slot))
        }
        ExprNode::Shape(ShapeNode::Cov(c, op0, b)) => {
            Ok(ShapeNode::Compact3(Slot::Const(c), op0, Slot::Var(b), op, rhs_slot))
        }
        ExprNode::Shape(ShapeNode::Voc(a, op0, c)) => {
            Ok(ShapeNode::Compact3(Slot::Var(a), op0, Slot::Const(c), op, rhs_slot))
        }
        other => Err(other),
    }
}

fn dispatch_shape<N: Numeric>(op: BinaryOp, lhs: ExprNode<N>, rhs: ExprNode<N>) -> ExprNode<N> {
    use crate::expr::shape::ShapeNode;
    // Matched directly on the owned nodes (rather than re-deriving each
    // operand's shape and then looking it back up) so every arm's
    // extraction is total: there is no "classified as Var but wasn't"
    // case left to panic on.
    match (lhs, rhs) {
        (ExprNode::Variable { cell: a, .. }, ExprNode::Variable { cell: b, .. }) => {
            ExprNode::Shape(ShapeNode::Vov(a, op, b))
        }
        (ExprNode::Constant(c), ExprNode::Variable { cell: v, .. }) => {
            ExprNode::Shape(ShapeNode::Cov(c, op, v))
        }
        (ExprNode::Variable { cell: v, .. }, ExprNode::Constant(c)) => {
            ExprNode::Shape(ShapeNode::Voc(v, op, c))
        }
        (ExprNode::Variable { cell: v, .. }, rhs) => ExprNode::Shape(ShapeNode::Vob(v, op, Box::new(rhs))),
        (lhs, ExprNode::Variable { cell: v, .. }) => {
            match try_compact3(op, lhs, crate::expr::shape::Slot::Var(v.clone())) {
                Ok(node) => ExprNode::Shape(node),
                Err(lhs) => ExprNode::Shape(ShapeNode::Bov(Box::new(lhs), op, v)),
            }
        }
        (ExprNode::Constant(c), rhs) => ExprNode::Shape(ShapeNode::Cob(c, op, Box::new(rhs))),
        (lhs, ExprNode::Constant(c)) => {
            match try_compact3(op, lhs, crate::expr::shape::Slot::Const(c)) {
                Ok(node) => ExprNode::Shape(node),
                Err(lhs) => ExprNode::Shape(ShapeNode::Boc(Box::new(lhs), op, c)),
            }
        }
        (lhs, rhs) => ExprNode::Binary(op, Box::new(lhs), Box::new(rhs)),
    }
}

/// Build a string-slice node (`s[lo:hi]`) over a string variable.
#[must_use]
pub fn build_string_range<N: Numeric>(
    cell: crate::symtab::StringCell,
    range: RangePack<N>,
) -> ExprNode<N> {
    ExprNode::StringRange(cell, range)
}

/// Build a string-slice node over a string literal.
#[must_use]
pub fn build_const_string_range<N: Numeric>(text: String, range: RangePack<N>) -> ExprNode<N> {
    ExprNode::ConstStringRange(text, range)
}

/// Build a vector-index node (`v[idx]`).
#[must_use]
pub fn build_vector_index<N: Numeric>(
    cell: crate::symtab::VectorCell<N>,
    index: ExprNode<N>,
) -> ExprNode<N> {
    if matches!(index, ExprNode::Null) {
        return ExprNode::Null;
    }
    ExprNode::VectorIndex(cell, Box::new(index))
}

/// Build a fixed-arity user-function call, checking nothing further (arity
/// was already validated against the symbol table's declared count by the
/// caller). Not constant-folded: user callables may be impure.
#[must_use]
pub fn build_call<N: Numeric>(func: crate::symtab::UserFunction<N>, args: Vec<ExprNode<N>>) -> ExprNode<N> {
    if args.iter().any(|a| matches!(a, ExprNode::Null)) {
        return ExprNode::Null;
    }
    ExprNode::Call { func, args }
}

/// Build a variadic user-function call.
#[must_use]
pub fn build_vararg_call<N: Numeric>(
    func: crate::symtab::VariadicFunction<N>,
    args: Vec<ExprNode<N>>,
) -> ExprNode<N> {
    if args.iter().any(|a| matches!(a, ExprNode::Null)) {
        return ExprNode::Null;
    }
    ExprNode::VarargCall { func, args }
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
    use std::cell::Cell;
    use std::rc::Rc;

    fn var(v: f64) -> (ExprNode<f64>, Rc<Cell<f64>>) {
        let cell = Rc::new(Cell::new(v));
        (ExprNode::Variable { cell: Rc::clone(&cell), is_const: false }, cell)
    }

    #[test]
    fn constant_folding_collapses_to_one_node() {
        let opts = CompileOptions::new();
        let node = build_binary(
            RawBinOp::Add,
            ExprNode::Constant(1.0_f64),
            build_binary(RawBinOp::Mul, ExprNode::Constant(2.0), ExprNode::Constant(3.0), &opts).expect("fold"),
            &opts,
        )
        .expect("fold");
        assert!(node.is_constant());
        assert_eq!(node.value(), 7.0);
    }

    #[test]
    fn strength_reduces_mixed_constant_scale() {
        let opts = CompileOptions::new();
        let (x, cell) = var(5.0);
        let step1 = build_binary(RawBinOp::Mul, ExprNode::Constant(2.0), x, &opts).expect("cov");
        let step2 = build_binary(RawBinOp::Mul, step1, ExprNode::Constant(3.0), &opts).expect("voc");
        let step3 = build_binary(RawBinOp::Mul, step2, ExprNode::Constant(4.0), &opts).expect("voc folded");
        assert!(matches!(step3, ExprNode::Shape(crate::expr::shape::ShapeNode::Voc(_, BinaryOp::Mul, c)) if c == 24.0));
        assert_eq!(step3.value(), 120.0);
        cell.set(2.5);
        assert_eq!(step3.value(), 60.0);
    }

    #[test]
    fn pow_with_integer_exponent_becomes_ipow() {
        let opts = CompileOptions::new();
        let (x, cell) = var(2.0);
        let node = build_binary(RawBinOp::Pow, x, ExprNode::Constant(7.0), &opts).expect("ipow");
        assert!(matches!(node, ExprNode::Shape(crate::expr::shape::ShapeNode::Ipow(_, 7))));
        assert_eq!(node.value(), 128.0);
        cell.set(2.0);
    }

    #[test]
    fn division_by_zero_constant_fold_is_an_error() {
        let opts = CompileOptions::new();
        let err = build_binary(RawBinOp::Div, ExprNode::Constant(1.0_f64), ExprNode::Constant(0.0), &opts)
            .expect_err("zero divisor");
        assert_eq!(err, SynthError::DivisionByZeroAtFold);
    }

    #[test]
    fn assignment_to_constant_is_rejected() {
        let cell = Rc::new(Cell::new(1.0_f64));
        let lhs = ExprNode::Variable { cell, is_const: true };
        let err = build_assignment(lhs, ExprNode::Constant(2.0)).expect_err("const");
        assert_eq!(err, SynthError::AssignToConstant);
    }

    #[test]
    fn mixed_string_numeric_operands_rejected() {
        let opts = CompileOptions::new();
        let err = build_binary(
            RawBinOp::Add,
            ExprNode::StringConst("a".to_owned()),
            ExprNode::Constant(1.0_f64),
            &opts,
        )
        .expect_err("mismatch");
        assert_eq!(err, SynthError::StringNumericMismatch);
    }

    #[test]
    fn three_operand_chain_compacts_into_compact3() {
        // strength reduction only combines adjacent constants on the same
        // operator, so alternate operators (`x + y - 2`) to see the raw
        // dispatch path instead of the const-folding shortcut.
        let opts = CompileOptions::new();
        let (x, xcell) = var(3.0);
        let (y, ycell) = var(4.0);
        let step1 = build_binary(RawBinOp::Add, x, y, &opts).expect("vov");
        let step2 = build_binary(RawBinOp::Sub, step1, ExprNode::Constant(2.0), &opts).expect("compact3");
        assert!(matches!(step2, ExprNode::Shape(crate::expr::shape::ShapeNode::Compact3(..))));
        assert_eq!(step2.value(), 5.0);
        xcell.set(10.0);
        ycell.set(1.0);
        assert_eq!(step2.value(), 9.0);
    }

    #[test]
    fn while_with_constant_false_test_folds_away() {
        let node: ExprNode<f64> = build_while(ExprNode::Constant(0.0), ExprNode::Constant(99.0));
        assert_eq!(node.value(), 0.0);
        assert!(matches!(node, ExprNode::Constant(_)));
    }
}
