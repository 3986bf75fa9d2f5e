//! Shape-specialized and compacted nodes (§4.5), plus the vararg and
//! string-operator evaluators shared by [`super::ExprNode::value`].
//!
//! Per §9's Design Notes ("a reimplementation is free to collapse
//! [the shape catalog] into a generic n-ary node... or a smaller set of
//! most-common shapes"), the ~45 named variants (`vov`, `cov`, …,
//! `vovovoc`) are compressed into:
//! - seven two-level shapes (`Vov`, `Cov`, `Voc`, `Vob`, `Bov`, `Cob`,
//!   `Boc`), each eliminating one level of child-pointer indirection for
//!   its declared pattern of constants/variables/branches;
//! - one generic three-slot `Compact3` node, parameterized by its two
//!   operators and three slots (each a bare variable or a constant),
//!   covering every `vovov`/`covov`/`vocov`/`covoc`/`vococov` pattern
//!   named in §4.7 without one struct per permutation;
//! - `Ipow`, carrying its exponent as data rather than as a const generic
//!   per instantiation (the repeated-squaring evaluation cost is
//!   unchanged; only the Rust type-level specialization is collapsed);
//! - `UnaryVar`, the compact single-variable unary node called out at the
//!   end of §4.7;
//! - a small declarative table of `$fNN` combinators (see
//!   [`crate::synth::special_fns`]) driving `SpecialFn3`/`SpecialFn4`
//!   instead of 100-plus hand-written struct types per arity.

use super::{BinaryOp, ExprNode, StringOp, VarargOp};
use crate::symtab::VarCell;
use calcexpr_numeric::Numeric;

/// A node's shape, for the synthesizer's pattern-keyed dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeShape {
    /// A bare variable reference.
    Var,
    /// A constant leaf.
    Const,
    /// Any other subtree.
    Branch,
}

/// One slot of a [`Compact3`](ShapeNode::Compact3) node: either a bare
/// variable reference or a constant, never an arbitrary branch (branches
/// don't compact — they stay as `Vob`/`Bov`/`Cob`/`Boc`/generic `Binary`).
pub enum Slot<N: Numeric> {
    /// A shared variable cell.
    Var(VarCell<N>),
    /// An inline constant.
    Const(N),
}

impl<N: Numeric> Slot<N> {
    /// Read this slot's current value.
    #[must_use]
    pub fn get(&self) -> N {
        match self {
            Self::Var(cell) => cell.get(),
            Self::Const(v) => *v,
        }
    }
}

/// Shape-specialized and compacted arithmetic nodes. See the module docs
/// for how this set stands in for the original's larger catalog.
pub enum ShapeNode<N: Numeric> {
    /// `(var op var)`.
    Vov(VarCell<N>, BinaryOp, VarCell<N>),
    /// `(const op var)`.
    Cov(N, BinaryOp, VarCell<N>),
    /// `(var op const)`.
    Voc(VarCell<N>, BinaryOp, N),
    /// `(var op branch)`.
    Vob(VarCell<N>, BinaryOp, Box<ExprNode<N>>),
    /// `(branch op var)`.
    Bov(Box<ExprNode<N>>, BinaryOp, VarCell<N>),
    /// `(const op branch)`.
    Cob(N, BinaryOp, Box<ExprNode<N>>),
    /// `(branch op const)`.
    Boc(Box<ExprNode<N>>, BinaryOp, N),
    /// `(s0 op0 s1) op1 s2`, every slot a variable or constant.
    Compact3(Slot<N>, BinaryOp, Slot<N>, BinaryOp, Slot<N>),
    /// `v ^ k` / `v ^ (1/k)` for integer `k` via repeated squaring.
    Ipow(VarCell<N>, i32),
    /// `op v`, a unary operator applied directly to a variable leaf.
    UnaryVar(super::UnaryOp, VarCell<N>),
    /// A `$f00`..`$f99` three-argument special function.
    SpecialFn3(crate::synth::special_fns::SpecialFn3, Box<[ExprNode<N>; 3]>),
    /// A `$f48`..`$f99`/`$f4extNN` four-argument special function.
    SpecialFn4(crate::synth::special_fns::SpecialFn4, Box<[ExprNode<N>; 4]>),
}

impl<N: Numeric> ShapeNode<N> {
    /// Evaluate this node, left-to-right wherever more than one slot
    /// reads dynamic storage.
    #[must_use]
    pub fn value(&self) -> N {
        match self {
            Self::Vov(a, op, b) => op.apply(a.get(), b.get()),
            Self::Cov(c, op, v) => op.apply(*c, v.get()),
            Self::Voc(v, op, c) => op.apply(v.get(), *c),
            Self::Vob(v, op, branch) => op.apply(v.get(), branch.value()),
            Self::Bov(branch, op, v) => op.apply(branch.value(), v.get()),
            Self::Cob(c, op, branch) => op.apply(*c, branch.value()),
            Self::Boc(branch, op, c) => op.apply(branch.value(), *c),
            Self::Compact3(s0, op0, s1, op1, s2) => op1.apply(op0.apply(s0.get(), s1.get()), s2.get()),
            Self::Ipow(v, k) => v.get().fast_exp(*k),
            Self::UnaryVar(op, v) => op.apply(v.get()),
            Self::SpecialFn3(kind, args) => kind.apply([args[0].value(), args[1].value(), args[2].value()]),
            Self::SpecialFn4(kind, args) => {
                kind.apply([args[0].value(), args[1].value(), args[2].value(), args[3].value()])
            }
        }
    }
}

/// Evaluate a fully-general variadic node: a fast unrolled path for
/// `1..=5` operands (the common case for `sum`/`min`/`max`/… calls written
/// by hand) and a general loop beyond that.
pub(super) fn eval_vararg<N: Numeric>(op: VarargOp, items: &[ExprNode<N>]) -> N {
    match items {
        [] => N::zero(),
        [a] => unary_vararg(op, a.value()),
        [a, b] => fold_vararg(op, [a.value(), b.value()].into_iter()),
        [a, b, c] => fold_vararg(op, [a.value(), b.value(), c.value()].into_iter()),
        [a, b, c, d] => fold_vararg(op, [a.value(), b.value(), c.value(), d.value()].into_iter()),
        [a, b, c, d, e] => fold_vararg(op, [a.value(), b.value(), c.value(), d.value(), e.value()].into_iter()),
        rest => fold_vararg(op, rest.iter().map(ExprNode::value)),
    }
}

fn unary_vararg<N: Numeric>(op: VarargOp, v: N) -> N {
    match op {
        VarargOp::Mand | VarargOp::Mor => N::from_bool(v.is_true()),
        _ => v,
    }
}

fn fold_vararg<N: Numeric>(op: VarargOp, mut values: impl Iterator<Item = N>) -> N {
    match op {
        VarargOp::Sum => values.fold(N::zero(), N::add),
        VarargOp::Mul => values.fold(N::one(), N::mul),
        VarargOp::Avg => {
            let mut count = 0usize;
            let mut total = N::zero();
            for v in values {
                total = total.add(v);
                count += 1;
            }
            if count == 0 { N::zero() } else { total.div(N::from_f64(count as f64)) }
        }
        VarargOp::Min => values.next().map_or(N::zero(), |first| {
            values.fold(first, |acc, v| if v < acc { v } else { acc })
        }),
        VarargOp::Max => values.next().map_or(N::zero(), |first| {
            values.fold(first, |acc, v| if v > acc { v } else { acc })
        }),
        VarargOp::Mand => N::from_bool(values.all(N::is_true)),
        VarargOp::Mor => N::from_bool(values.any(N::is_true)),
        VarargOp::Multi => values.last().unwrap_or_else(N::zero),
    }
}

/// Evaluate a string-valued binary operator. `Concat` is handled by
/// [`ExprNode::str_value`] (it produces text); every other variant
/// compares/searches the two operands' text and returns a boolean `N`.
pub(super) fn eval_string_op<N: Numeric>(op: StringOp, a: &ExprNode<N>, b: &ExprNode<N>) -> N {
    if op == StringOp::Concat {
        return N::nan();
    }
    let lhs = a.str_value().unwrap_or_default();
    let rhs = b.str_value().unwrap_or_default();
    let result = match op {
        StringOp::Concat => false,
        StringOp::Lt => lhs < rhs,
        StringOp::Lte => lhs <= rhs,
        StringOp::Gt => lhs > rhs,
        StringOp::Gte => lhs >= rhs,
        StringOp::Eq => lhs == rhs,
        StringOp::Ne => lhs != rhs,
        StringOp::In => rhs.contains(&lhs),
        StringOp::Like => wildcard_match(&lhs, &rhs, false),
        StringOp::ILike => wildcard_match(&lhs, &rhs, true),
    };
    N::from_bool(result)
}

/// `*`/`?` wildcard matching: `*` matches any run of characters (including
/// none), `?` matches exactly one.
fn wildcard_match(text: &str, pattern: &str, case_insensitive: bool) -> bool {
    let fold = |s: &str| if case_insensitive { s.to_ascii_lowercase() } else { s.to_owned() };
    let text: Vec<char> = fold(text).chars().collect();
    let pattern: Vec<char> = fold(pattern).chars().collect();
    match_from(&text, &pattern)
}

fn match_from(text: &[char], pattern: &[char]) -> bool {
    match pattern.first() {
        None => text.is_empty(),
        Some('*') => {
            match_from(text, &pattern[1..])
                || (!text.is_empty() && match_from(&text[1..], pattern))
        }
        Some('?') => !text.is_empty() && match_from(&text[1..], &pattern[1..]),
        Some(ch) => text.first() == Some(ch) && match_from(&text[1..], &pattern[1..]),
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
    use crate::expr::op::BinaryOp;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn vov_matches_generic_binary() {
        let a = Rc::new(Cell::new(3.0_f64));
        let b = Rc::new(Cell::new(4.0_f64));
        let node = ShapeNode::Vov(Rc::clone(&a), BinaryOp::Add, Rc::clone(&b));
        assert_eq!(node.value(), 7.0);
    }

    #[test]
    fn ipow_matches_fast_exp() {
        let v = Rc::new(Cell::new(2.0_f64));
        let node = ShapeNode::Ipow(Rc::clone(&v), 7);
        assert_eq!(node.value(), 128.0);
    }

    #[test]
    fn ipow_negative_is_reciprocal() {
        let v = Rc::new(Cell::new(2.0_f64));
        let node = ShapeNode::Ipow(Rc::clone(&v), -3);
        assert!((node.value() - 0.125).abs() < 1e-12);
    }

    #[test]
    fn wildcard_star_and_question() {
        assert!(wildcard_match("abracadabra", "a*a", false));
        assert!(wildcard_match("abc", "a?c", false));
        assert!(!wildcard_match("abc", "A?C", false));
        assert!(wildcard_match("abc", "A?C", true));
    }

    #[test]
    fn vararg_min_max_fast_path() {
        let items: Vec<ExprNode<f64>> =
            vec![ExprNode::Constant(3.0), ExprNode::Constant(1.0), ExprNode::Constant(2.0)];
        assert_eq!(eval_vararg(VarargOp::Min, &items), 1.0);
        assert_eq!(eval_vararg(VarargOp::Max, &items), 3.0);
        assert_eq!(eval_vararg(VarargOp::Sum, &items), 6.0);
    }
}
