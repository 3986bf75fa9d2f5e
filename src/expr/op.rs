//! Operator tags and their evaluation, shared by the generic `Unary`/
//! `Binary`/`Trinary` nodes and every shape-specialized node.

use calcexpr_numeric::Numeric;

/// Unary operator tag (`abs`, trig, log, and the named sign/rounding/
/// angle-conversion helpers).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum UnaryOp {
    /// `-x`
    Neg,
    /// `+x` (identity, kept as a tag so the parser can record it)
    Pos,
    /// `|x|`
    Abs,
    /// `sin(x)`
    Sin,
    /// `cos(x)`
    Cos,
    /// `tan(x)`
    Tan,
    /// `asin(x)`
    Asin,
    /// `acos(x)`
    Acos,
    /// `atan(x)`
    Atan,
    /// `sinh(x)`
    Sinh,
    /// `cosh(x)`
    Cosh,
    /// `tanh(x)`
    Tanh,
    /// `ln(x)`
    Ln,
    /// `log10(x)`
    Log10,
    /// `log2(x)`
    Log2,
    /// `exp(x)`
    Exp,
    /// `sqrt(x)`
    Sqrt,
    /// `sgn(x)`
    Sgn,
    /// `frac(x)`
    Frac,
    /// `trunc(x)`
    Trunc,
    /// `round(x)`
    Round,
    /// `ceil(x)`
    Ceil,
    /// `floor(x)`
    Floor,
    /// `erf(x)`
    Erf,
    /// `erfc(x)`
    Erfc,
    /// Logical not (`notl(x)`): `1` if `x == 0` else `0`.
    NotL,
    /// Degrees to radians.
    D2r,
    /// Radians to degrees.
    R2d,
}

impl UnaryOp {
    /// Apply this operator to `x`.
    pub fn apply<N: Numeric>(self, x: N) -> N {
        match self {
            Self::Neg => x.neg(),
            Self::Pos => x,
            Self::Abs => x.abs(),
            Self::Sin => x.sin(),
            Self::Cos => x.cos(),
            Self::Tan => x.tan(),
            Self::Asin => x.asin(),
            Self::Acos => x.acos(),
            Self::Atan => x.atan(),
            Self::Sinh => x.sinh(),
            Self::Cosh => x.cosh(),
            Self::Tanh => x.tanh(),
            Self::Ln => x.ln(),
            Self::Log10 => x.log10(),
            Self::Log2 => x.log2(),
            Self::Exp => x.exp(),
            Self::Sqrt => x.sqrt(),
            Self::Sgn => x.sgn(),
            Self::Frac => x.frac(),
            Self::Trunc => x.trunc(),
            Self::Round => x.round(),
            Self::Ceil => x.ceil(),
            Self::Floor => x.floor(),
            Self::Erf => x.erf(),
            Self::Erfc => x.erfc(),
            Self::NotL => N::from_bool(!x.is_true()),
            Self::D2r => x.mul(N::from_f64(std::f64::consts::PI / 180.0)),
            Self::R2d => x.mul(N::from_f64(180.0 / std::f64::consts::PI)),
        }
    }
}

/// Binary operator tag: the full algebraic/comparison/logical set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum BinaryOp {
    /// `a + b`
    Add,
    /// `a - b`
    Sub,
    /// `a * b`
    Mul,
    /// `a / b`
    Div,
    /// `a % b`
    Mod,
    /// `a ^ b`
    Pow,
    /// `a < b`
    Lt,
    /// `a <= b`
    Lte,
    /// `a > b`
    Gt,
    /// `a >= b`
    Gte,
    /// `a == b`
    Eq,
    /// `a != b` / `a <> b`
    Ne,
    /// `a and b`
    And,
    /// `a or b`
    Or,
    /// `a xor b`
    Xor,
    /// `a nand b`
    Nand,
    /// `a nor b`
    Nor,
    /// `a xnor b`
    Xnor,
    /// `a << b`
    Shl,
    /// `a >> b`
    Shr,
    /// `root(a, b)`: `b`-th root of `a`.
    Root,
    /// `logn(a, b)`: log base `b` of `a`.
    Logn,
    /// `atan2(a, b)`
    Atan2,
    /// `hypot(a, b)`
    Hypot,
}

impl BinaryOp {
    /// Apply this operator to `(a, b)`.
    pub fn apply<N: Numeric>(self, a: N, b: N) -> N {
        match self {
            Self::Add => a.add(b),
            Self::Sub => a.sub(b),
            Self::Mul => a.mul(b),
            Self::Div => a.div(b),
            Self::Mod => a.modulus(b),
            Self::Pow => a.pow(b),
            Self::Lt => N::from_bool(a < b),
            Self::Lte => N::from_bool(a <= b),
            Self::Gt => N::from_bool(a > b),
            Self::Gte => N::from_bool(a >= b),
            Self::Eq => N::from_bool(a.equal(b)),
            Self::Ne => N::from_bool(a.nequal(b)),
            Self::And => a.logical_and(b),
            Self::Or => a.logical_or(b),
            Self::Xor => a.logical_xor(b),
            Self::Nand => a.logical_nand(b),
            Self::Nor => a.logical_nor(b),
            Self::Xnor => a.logical_xnor(b),
            Self::Shl => a.shl(b),
            Self::Shr => a.shr(b),
            Self::Root => a.root(b),
            Self::Logn => a.logn(b),
            Self::Atan2 => a.atan2(b),
            Self::Hypot => a.hypot(b),
        }
    }

    /// `true` if this operator is commutative, used by the synthesizer to
    /// decide whether a `bov`-shaped node can be rewritten to `vob` (or
    /// vice versa) when only one operand is a bare variable.
    #[must_use]
    pub fn is_commutative(self) -> bool {
        matches!(self, Self::Add | Self::Mul | Self::Eq | Self::Ne)
    }
}

/// Named trinary operators (`clamp`, `iclamp`, `inrange`) plus the 3-ary
/// base case of the five aggregate operators that also extend to 4/5/6-ary
/// and fully variadic forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum TrinaryOp {
    /// `clamp(a, x, b) = min(max(x, a), b)`
    Clamp,
    /// `iclamp(a, x, b)`: `x` if `a <= x <= b`, else the nearer endpoint.
    IClamp,
    /// `inrange(a, x, b)`: `1` iff `a <= x <= b`, else `0`.
    InRange,
    /// 3-ary minimum.
    Min,
    /// 3-ary maximum.
    Max,
    /// 3-ary average.
    Avg,
    /// 3-ary sum.
    Sum,
    /// 3-ary product.
    Mul,
}

impl TrinaryOp {
    /// Apply this operator to `(a, b, c)`.
    pub fn apply<N: Numeric>(self, a: N, b: N, c: N) -> N {
        match self {
            Self::Clamp => {
                if b < a {
                    a
                } else if b > c {
                    c
                } else {
                    b
                }
            }
            Self::IClamp => {
                if b >= a && b <= c {
                    b
                } else if (b.sub(a)).abs() <= (b.sub(c)).abs() {
                    a
                } else {
                    c
                }
            }
            Self::InRange => N::from_bool(b >= a && b <= c),
            Self::Min => min3(a, b, c),
            Self::Max => max3(a, b, c),
            Self::Avg => a.add(b).add(c).div(N::from_f64(3.0)),
            Self::Sum => a.add(b).add(c),
            Self::Mul => a.mul(b).mul(c),
        }
    }
}

fn min3<N: Numeric>(a: N, b: N, c: N) -> N {
    let ab = if a < b { a } else { b };
    if ab < c { ab } else { c }
}

fn max3<N: Numeric>(a: N, b: N, c: N) -> N {
    let ab = if a > b { a } else { b };
    if ab > c { ab } else { c }
}

/// Aggregate-operator tag shared by the fixed-arity 4/5/6-ary nodes and the
/// fully variadic node, so arity doesn't duplicate the operator catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum AggOp {
    /// Minimum of all operands.
    Min,
    /// Maximum of all operands.
    Max,
    /// Arithmetic mean of all operands.
    Avg,
    /// Sum of all operands.
    Sum,
    /// Product of all operands.
    Mul,
}

impl AggOp {
    /// Fold `values` (non-empty) under this operator.
    pub fn fold<N: Numeric>(self, values: &[N]) -> N {
        debug_assert!(!values.is_empty());
        match self {
            Self::Min => values.iter().copied().reduce(|a, b| if a < b { a } else { b }).unwrap_or_else(N::zero),
            Self::Max => values.iter().copied().reduce(|a, b| if a > b { a } else { b }).unwrap_or_else(N::zero),
            Self::Sum => values.iter().copied().fold(N::zero(), N::add),
            Self::Mul => values.iter().copied().fold(N::one(), N::mul),
            Self::Avg => {
                let sum = values.iter().copied().fold(N::zero(), N::add);
                sum.div(N::from_f64(values.len() as f64))
            }
        }
    }
}

/// Variadic operator tag for the fully general `vararg` node (arity not
/// fixed at construction, fast-pathed for `1..=5` operands and a general
/// loop beyond that — see [`super::vararg::eval`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum VarargOp {
    /// Sum of all operands.
    Sum,
    /// Product of all operands.
    Mul,
    /// Arithmetic mean of all operands.
    Avg,
    /// Minimum of all operands.
    Min,
    /// Maximum of all operands.
    Max,
    /// `1` iff every operand is truthy.
    Mand,
    /// `1` iff any operand is truthy.
    Mor,
    /// Evaluate every operand; yield the last.
    Multi,
}

/// String-valued binary operator tag. `Concat` produces text; the rest
/// produce a boolean `N` from lexicographic/substring/wildcard
/// comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum StringOp {
    /// `a + b`: concatenation (produces text).
    Concat,
    /// Lexicographic `<`.
    Lt,
    /// Lexicographic `<=`.
    Lte,
    /// Lexicographic `>`.
    Gt,
    /// Lexicographic `>=`.
    Gte,
    /// Equality.
    Eq,
    /// Inequality.
    Ne,
    /// `in(a, b)`: `a` is a substring of `b`.
    In,
    /// `like(a, pat)`: `*`/`?` wildcard match, case-sensitive.
    Like,
    /// `ilike(a, pat)`: wildcard match, case-insensitive.
    ILike,
}

impl StringOp {
    /// `true` for the operators that produce text rather than a boolean.
    #[must_use]
    pub fn produces_text(self) -> bool {
        matches!(self, Self::Concat)
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
    fn clamp_keeps_value_inside_range() {
        assert_eq!(TrinaryOp::Clamp.apply(0.0_f64, 5.0, 10.0), 5.0);
        assert_eq!(TrinaryOp::Clamp.apply(0.0_f64, -5.0, 10.0), 0.0);
        assert_eq!(TrinaryOp::Clamp.apply(0.0_f64, 15.0, 10.0), 10.0);
    }

    #[test]
    fn inrange_is_boolean() {
        assert_eq!(TrinaryOp::InRange.apply(0.0_f64, 5.0, 10.0), 1.0);
        assert_eq!(TrinaryOp::InRange.apply(0.0_f64, 15.0, 10.0), 0.0);
    }

    #[test]
    fn agg_op_matches_naive_fold() {
        let values = [1.0_f64, 4.0, 2.0, 9.0];
        assert_eq!(AggOp::Sum.fold(&values), 16.0);
        assert_eq!(AggOp::Max.fold(&values), 9.0);
        assert_eq!(AggOp::Avg.fold(&values), 4.0);
    }
}
