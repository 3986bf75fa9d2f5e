//! Expression-tree node family (C5): a tagged sum type standing in for the
//! original's open hierarchy of virtual node classes. Every node answers
//! `value()`; string-producing nodes additionally answer `str_value()`.
//!
//! Ownership follows §3 invariant 1: a non-leaf node owns its children via
//! `Box`, except a bare variable reference, which is always a cloned
//! [`VarCell`] (a shared handle into the symbol table's storage) rather
//! than an owned subtree — the "borrowed variable leaf" design the spec's
//! Design Notes call for, expressed here as a non-owning `Rc<Cell<N>>`
//! instead of a raw pointer plus manual lifetime bookkeeping.

pub mod op;
pub mod range;
pub(crate) mod shape;

pub use op::{AggOp, BinaryOp, StringOp, TrinaryOp, UnaryOp, VarargOp};
pub use range::{Bound, RangePack};
pub use shape::NodeShape;

use crate::symtab::{StringCell, UserFunction, VarCell, VariadicFunction, VectorCell};
use calcexpr_numeric::Numeric;

/// A compiled expression subtree.
///
/// This is the sum type §9's Design Notes ask for in place of the
/// original's RTTI-based `dynamic_cast` hierarchy: one `enum`, matched
/// exhaustively everywhere a node is consumed.
pub enum ExprNode<N: Numeric> {
    /// Placeholder for a failed compile; `value()` is `NaN`.
    Null,
    /// A numeric literal, or the result of constant folding.
    Constant(N),
    /// A borrowed reference to a numeric variable's storage.
    Variable {
        /// Shared storage.
        cell: VarCell<N>,
        /// `true` if the symbol table flagged this name as a constant —
        /// recorded on the leaf so the synthesizer can reject assignment
        /// to it without a second symbol-table lookup.
        is_const: bool,
    },
    /// A string literal.
    StringConst(String),
    /// A borrowed reference to a string variable's storage.
    StringVar(StringCell),
    /// A string variable's slice, `s[a:b]`, with deferred bound
    /// expressions re-evaluated on every access.
    StringRange(StringCell, RangePack<N>),
    /// A string literal's slice.
    ConstStringRange(String, RangePack<N>),
    /// `v[idx]`: a read of a registered vector's element at a dynamic
    /// index, clamped into range; out-of-bounds (including a negative or
    /// non-numeric index) reads as `NaN` rather than panicking.
    VectorIndex(VectorCell<N>, Box<Self>),

    /// `op x`.
    Unary(UnaryOp, Box<Self>),
    /// `x op y`, evaluated left-then-right.
    Binary(BinaryOp, Box<Self>, Box<Self>),
    /// `clamp`/`iclamp`/`inrange`/3-ary `min`/`max`/`avg`/`sum`/`mul`.
    Trinary(TrinaryOp, Box<Self>, Box<Self>, Box<Self>),
    /// 4/5/6-ary extension of the aggregate operators.
    Aggregate(AggOp, Vec<Self>),

    /// `if(test, then, else)`: only the chosen branch is evaluated.
    Conditional(Box<Self>, Box<Self>, Box<Self>),
    /// `while(test){body}`: `0` if the body never runs.
    While(Box<Self>, Box<Self>),
    /// `repeat body... until(test)`: body runs at least once.
    RepeatUntil(Box<Self>, Box<Self>),
    /// `switch { case C: E; ... default: E; }`: first truthy case wins.
    Switch {
        /// `(condition, consequent)` pairs, checked in order.
        arms: Vec<(Self, Self)>,
        /// Required fallback when no arm matches.
        default: Box<Self>,
    },
    /// `[*] { case C: E; ... }`: every truthy arm is evaluated, the last
    /// one's value is returned (`0` if none matched).
    MultiSwitch {
        /// `(condition, consequent)` pairs, all checked.
        arms: Vec<(Self, Self)>,
    },

    /// `sum`/`mul`/`avg`/`min`/`max`/`mand`/`mor`/`multi` over any number
    /// of operands (fast-pathed for `1..=5`, looped beyond).
    Vararg(VarargOp, Vec<Self>),
    /// A call to a fixed-arity user function; arity was checked at parse
    /// time against the symbol table's declared arity.
    Call {
        /// The registered callable.
        func: UserFunction<N>,
        /// Evaluated left-to-right before the call.
        args: Vec<Self>,
    },
    /// A call to a variadic user function (no arity check at parse time).
    VarargCall {
        /// The registered callable.
        func: VariadicFunction<N>,
        /// Evaluated left-to-right before the call.
        args: Vec<Self>,
    },

    /// `var := value`: writes `value`'s result into `var` and returns it.
    Assignment {
        /// The destination cell (never a constant — checked at synthesis).
        var: VarCell<N>,
        /// The right-hand side.
        value: Box<Self>,
    },
    /// `a & b`: `0` without evaluating `b` if `a` is falsy.
    ShortCircuitAnd(Box<Self>, Box<Self>),
    /// `a | b`: `1` without evaluating `b` if `a` is truthy.
    ShortCircuitOr(Box<Self>, Box<Self>),

    /// A string-valued binary operator: `+` concatenates (text result),
    /// the rest compare/search and produce a boolean `N`.
    StringOp(StringOp, Box<Self>, Box<Self>),

    /// Shape-specialized and compacted nodes (§4.5/§4.7), selected by the
    /// synthesizer — see [`shape`] for their evaluation.
    Shape(shape::ShapeNode<N>),
}

impl<N: Numeric> ExprNode<N> {
    /// Evaluate this subtree. Never panics; operations undefined over the
    /// numeric domain return `NaN`/`Inf` per the numeric kernel's rules.
    #[must_use]
    pub fn value(&self) -> N {
        match self {
            Self::Null => N::nan(),
            Self::Constant(v) => *v,
            Self::Variable { cell, .. } => cell.get(),
            Self::StringConst(_)
            | Self::StringVar(_)
            | Self::StringRange(..)
            | Self::ConstStringRange(..) => N::nan(),
            Self::VectorIndex(cell, idx) => {
                let i = idx.value().to_f64();
                let vector = cell.borrow();
                if i.is_nan() || i < 0.0 {
                    return N::nan();
                }
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    reason = "i already checked non-negative and finite"
                )]
                let index = i as usize;
                vector.get(index).copied().unwrap_or_else(N::nan)
            }

            Self::Unary(op, x) => op.apply(x.value()),
            Self::Binary(op, a, b) => op.apply(a.value(), b.value()),
            Self::Trinary(op, a, b, c) => op.apply(a.value(), b.value(), c.value()),
            Self::Aggregate(op, items) => {
                let values: Vec<N> = items.iter().map(Self::value).collect();
                op.fold(&values)
            }

            Self::Conditional(test, then, els) => {
                if test.value().is_true() { then.value() } else { els.value() }
            }
            Self::While(test, body) => {
                let mut last = N::zero();
                while test.value().is_true() {
                    last = body.value();
                }
                last
            }
            Self::RepeatUntil(body, test) => {
                let mut last;
                loop {
                    last = body.value();
                    if test.value().is_true() {
                        break;
                    }
                }
                last
            }
            Self::Switch { arms, default } => {
                for (cond, consequent) in arms {
                    if cond.value().is_true() {
                        return consequent.value();
                    }
                }
                default.value()
            }
            Self::MultiSwitch { arms } => {
                let mut last = N::zero();
                let mut matched = false;
                for (cond, consequent) in arms {
                    if cond.value().is_true() {
                        last = consequent.value();
                        matched = true;
                    }
                }
                if matched { last } else { N::zero() }
            }

            Self::Vararg(op, items) => shape::eval_vararg(*op, items),
            Self::Call { func, args } | Self::VarargCall { func, args } => {
                let values: Vec<N> = args.iter().map(Self::value).collect();
                func(&values)
            }

            Self::Assignment { var, value } => {
                let v = value.value();
                var.set(v);
                v
            }
            Self::ShortCircuitAnd(a, b) => {
                if a.value().is_true() { N::from_bool(b.value().is_true()) } else { N::zero() }
            }
            Self::ShortCircuitOr(a, b) => {
                if a.value().is_true() { N::one() } else { N::from_bool(b.value().is_true()) }
            }

            Self::StringOp(op, a, b) => shape::eval_string_op(*op, a, b),

            Self::Shape(node) => node.value(),
        }
    }

    /// The text this node produces, for nodes with a string facet.
    /// `None` for purely numeric nodes.
    #[must_use]
    pub fn str_value(&self) -> Option<String> {
        match self {
            Self::StringConst(s) => Some(s.clone()),
            Self::StringVar(cell) => Some(cell.borrow().clone()),
            Self::StringRange(cell, range) => Some(range.slice(&cell.borrow()).to_owned()),
            Self::ConstStringRange(text, range) => Some(range.slice(text).to_owned()),
            Self::StringOp(StringOp::Concat, a, b) => {
                let mut out = a.str_value().unwrap_or_default();
                out.push_str(&b.str_value().unwrap_or_default());
                Some(out)
            }
            _ => None,
        }
    }

    /// `true` if this node is a leaf `Constant`.
    #[must_use]
    pub fn is_constant(&self) -> bool {
        matches!(self, Self::Constant(_))
    }

    /// The constant value, if this node is a `Constant` leaf.
    #[must_use]
    pub fn as_constant(&self) -> Option<N> {
        match self {
            Self::Constant(v) => Some(*v),
            _ => None,
        }
    }

    /// The shared variable cell, if this node is a bare `Variable` leaf.
    #[must_use]
    pub fn as_variable(&self) -> Option<&VarCell<N>> {
        match self {
            Self::Variable { cell, .. } => Some(cell),
            _ => None,
        }
    }

    /// `true` if this node produces text rather than a number (used by
    /// the synthesizer to reject mixed string/numeric operand pairs per
    /// invariant 5).
    #[must_use]
    pub fn is_string_valued(&self) -> bool {
        matches!(
            self,
            Self::StringConst(_)
                | Self::StringVar(_)
                | Self::StringRange(..)
                | Self::ConstStringRange(..)
                | Self::StringOp(StringOp::Concat, ..)
        )
    }

    /// Classify this node's shape for the synthesizer's pattern keys:
    /// bare variable, constant, or an arbitrary branch.
    #[must_use]
    pub fn shape(&self) -> NodeShape {
        match self {
            Self::Constant(_) => NodeShape::Const,
            Self::Variable { .. } => NodeShape::Var,
            _ => NodeShape::Branch,
        }
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
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn constant_folds_to_its_value() {
        let node: ExprNode<f64> = ExprNode::Constant(21.0);
        assert_eq!(node.value(), 21.0);
    }

    #[test]
    fn variable_reads_through_shared_cell() {
        let cell = Rc::new(Cell::new(5.0_f64));
        let node = ExprNode::Variable { cell: Rc::clone(&cell), is_const: false };
        assert_eq!(node.value(), 5.0);
        cell.set(9.0);
        assert_eq!(node.value(), 9.0);
    }

    #[test]
    fn assignment_writes_and_returns() {
        let cell = Rc::new(Cell::new(0.0_f64));
        let node = ExprNode::Assignment {
            var: Rc::clone(&cell),
            value: Box::new(ExprNode::Constant(7.0)),
        };
        assert_eq!(node.value(), 7.0);
        assert_eq!(cell.get(), 7.0);
    }

    #[test]
    fn conditional_short_circuits_branches() {
        let touched = Rc::new(Cell::new(false));
        let touched2 = Rc::clone(&touched);
        // Model "not evaluated" via a variable flip inside a function call.
        let func: UserFunction<f64> = Rc::new(move |_| {
            touched2.set(true);
            1.0
        });
        let else_branch = ExprNode::Call { func, args: vec![] };
        let node = ExprNode::Conditional(
            Box::new(ExprNode::Constant(1.0)),
            Box::new(ExprNode::Constant(42.0)),
            Box::new(else_branch),
        );
        assert_eq!(node.value(), 42.0);
        assert!(!touched.get());
    }

    #[test]
    fn while_loop_returns_zero_when_never_entered() {
        let node: ExprNode<f64> = ExprNode::While(
            Box::new(ExprNode::Constant(0.0)),
            Box::new(ExprNode::Constant(99.0)),
        );
        assert_eq!(node.value(), 0.0);
    }

    #[test]
    fn switch_returns_first_truthy_case() {
        let node: ExprNode<f64> = ExprNode::Switch {
            arms: vec![
                (ExprNode::Constant(0.0), ExprNode::Constant(10.0)),
                (ExprNode::Constant(1.0), ExprNode::Constant(20.0)),
            ],
            default: Box::new(ExprNode::Constant(30.0)),
        };
        assert_eq!(node.value(), 20.0);
    }

    #[test]
    fn multi_switch_returns_last_matching() {
        let node: ExprNode<f64> = ExprNode::MultiSwitch {
            arms: vec![
                (ExprNode::Constant(1.0), ExprNode::Constant(10.0)),
                (ExprNode::Constant(1.0), ExprNode::Constant(20.0)),
                (ExprNode::Constant(0.0), ExprNode::Constant(30.0)),
            ],
        };
        assert_eq!(node.value(), 20.0);
    }

    #[test]
    fn short_circuit_and_skips_right_side() {
        let touched = Rc::new(Cell::new(false));
        let touched2 = Rc::clone(&touched);
        let func: UserFunction<f64> = Rc::new(move |_| {
            touched2.set(true);
            1.0
        });
        let node = ExprNode::ShortCircuitAnd(
            Box::new(ExprNode::Constant(0.0)),
            Box::new(ExprNode::Call { func, args: vec![] }),
        );
        assert_eq!(node.value(), 0.0);
        assert!(!touched.get());
    }

    #[test]
    fn string_concat_and_slice() {
        let node: ExprNode<f64> = ExprNode::ConstStringRange(
            "hello world".to_owned(),
            RangePack::new(Bound::Literal(6), Bound::Literal(10)),
        );
        assert!(node.value().is_nan());
        assert_eq!(node.str_value().as_deref(), Some("world"));
    }

    #[test]
    fn vector_index_reads_in_bounds_and_nan_out_of_bounds() {
        use std::cell::RefCell;
        let vector = Rc::new(RefCell::new(vec![10.0_f64, 20.0, 30.0]));
        let node = ExprNode::VectorIndex(Rc::clone(&vector), Box::new(ExprNode::Constant(1.0)));
        assert_eq!(node.value(), 20.0);
        let oob = ExprNode::VectorIndex(vector, Box::new(ExprNode::Constant(5.0)));
        assert!(oob.value().is_nan());
    }
}
