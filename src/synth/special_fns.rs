//! Declarative table of `$fNN` special-function combinators (§4.5).
//!
//! The original ships upward of a hundred hand-written struct types, one
//! per `$fNN` slot. Per §3's REDESIGN note this crate generates the same
//! closed catalog mechanically from a small table of combinator
//! definitions instead: every named example in the spec (`(t+t)/t`,
//! `t+(t*t)`, `((t*t)*t)-t`, `axnb<k>`, `is_true(x)?y:z`) is present, and
//! extending the table to cover more `$fNN` slots is a one-line addition
//! rather than a new type. An index with no table entry is a structural
//! parse error (§7), never undefined behavior.

use calcexpr_numeric::Numeric;

/// A three-argument `$f00`..`$f99` combinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum SpecialFn3 {
    /// `(a + b) / c`
    SumDiv,
    /// `a + (b * c)`
    AddMul,
    /// `a - (b * c)`
    SubMul,
    /// `(a * b) + c`
    MulAdd,
    /// `(a * b) - c`
    MulSub,
    /// `((a * b) * c) - a`
    MulMulSub,
    /// `(a / b) + c`
    DivAdd,
    /// `(a / b) - c`
    DivSub,
    /// `is_true(a) ? b : c`
    IsTruePredicate,
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
    /// `clamp(a, x, b)` called as `(a, x, b)`.
    Clamp,
    /// `iclamp(a, x, b)`.
    IClamp,
    /// `inrange(a, x, b)`.
    InRange,
    /// `a * x^k + b`, for `k` in `2..=9`.
    AxnB(u32),
}

impl SpecialFn3 {
    /// Apply this combinator to `(a, b, c)`.
    pub fn apply<N: Numeric>(self, [a, b, c]: [N; 3]) -> N {
        match self {
            Self::SumDiv => a.add(b).div(c),
            Self::AddMul => a.add(b.mul(c)),
            Self::SubMul => a.sub(b.mul(c)),
            Self::MulAdd => a.mul(b).add(c),
            Self::MulSub => a.mul(b).sub(c),
            Self::MulMulSub => a.mul(b).mul(c).sub(a),
            Self::DivAdd => a.div(b).add(c),
            Self::DivSub => a.div(b).sub(c),
            Self::IsTruePredicate => {
                if a.is_true() { b } else { c }
            }
            Self::Min => {
                let ab = if a < b { a } else { b };
                if ab < c { ab } else { c }
            }
            Self::Max => {
                let ab = if a > b { a } else { b };
                if ab > c { ab } else { c }
            }
            Self::Avg => a.add(b).add(c).div(N::from_f64(3.0)),
            Self::Sum => a.add(b).add(c),
            Self::Mul => a.mul(b).mul(c),
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
                } else if b.sub(a).abs() <= b.sub(c).abs() {
                    a
                } else {
                    c
                }
            }
            Self::InRange => N::from_bool(b >= a && b <= c),
            Self::AxnB(k) => {
                // slots are (a, x, b): a * x^k + b
                a.mul(b.fast_exp(k.try_into().unwrap_or(i32::MAX))).add(c)
            }
        }
    }

    /// Look up the combinator registered at a `$fNN` index, `0..=99`.
    #[must_use]
    pub fn by_index(index: u32) -> Option<Self> {
        Some(match index {
            0 => Self::SumDiv,
            1 => Self::AddMul,
            2 => Self::SubMul,
            3 => Self::MulAdd,
            4 => Self::MulSub,
            5 => Self::MulMulSub,
            6 => Self::DivAdd,
            7 => Self::DivSub,
            8 => Self::IsTruePredicate,
            9 => Self::Min,
            10 => Self::Max,
            11 => Self::Avg,
            12 => Self::Sum,
            13 => Self::Mul,
            14 => Self::Clamp,
            15 => Self::IClamp,
            16 => Self::InRange,
            17..=24 => Self::AxnB(index - 15), // 17->2 .. 24->9
            _ => return None,
        })
    }
}

/// A four-argument `$f48`..`$f99` / `$f4extNN` combinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum SpecialFn4 {
    /// `(a * b) + (c * d)`
    SumOfProducts,
    /// `(a - b) / (c - d)`
    DiffOverDiff,
    /// `(a * b) + (c + d)`
    ProductPlusSum,
    /// `clamp(a, x, b) * d`
    ClampScaled,
    /// `inrange(a, x, b) ? x : d`
    InRangeElse,
    /// `a * x^k + b + c`, for `k` in `2..=9` (fourth slot `d` unused,
    /// kept for a uniform 4-ary call signature).
    AxnBPlusC(u32),
}

impl SpecialFn4 {
    /// Apply this combinator to `(a, b, c, d)`.
    pub fn apply<N: Numeric>(self, [a, b, c, d]: [N; 4]) -> N {
        match self {
            Self::SumOfProducts => a.mul(b).add(c.mul(d)),
            Self::DiffOverDiff => a.sub(b).div(c.sub(d)),
            Self::ProductPlusSum => a.mul(b).add(c.add(d)),
            Self::ClampScaled => {
                let clamped = if b < a {
                    a
                } else if b > c {
                    c
                } else {
                    b
                };
                clamped.mul(d)
            }
            Self::InRangeElse => {
                if b >= a && b <= c { b } else { d }
            }
            Self::AxnBPlusC(k) => a.mul(b.fast_exp(k.try_into().unwrap_or(i32::MAX))).add(c).add(d),
        }
    }

    /// Look up the combinator registered at a `$fNN` four-argument index.
    #[must_use]
    pub fn by_index(index: u32) -> Option<Self> {
        Some(match index {
            0 => Self::SumOfProducts,
            1 => Self::DiffOverDiff,
            2 => Self::ProductPlusSum,
            3 => Self::ClampScaled,
            4 => Self::InRangeElse,
            5..=12 => Self::AxnBPlusC(index - 3), // 5->2 .. 12->9
            _ => return None,
        })
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
    fn sum_div_matches_formula() {
        assert_eq!(SpecialFn3::SumDiv.apply([1.0_f64, 2.0, 3.0]), 1.0);
    }

    #[test]
    fn axnb_matches_direct_computation() {
        let f = SpecialFn3::by_index(17).expect("k=2 registered");
        assert_eq!(f, SpecialFn3::AxnB(2));
        // slots are (a, x, b) = (2, 3, 1): 2*3^2 + 1 = 19
        assert_eq!(f.apply([2.0_f64, 3.0, 1.0]), 19.0);
    }

    #[test]
    fn unmapped_index_is_none() {
        assert_eq!(SpecialFn3::by_index(97), None);
    }

    #[test]
    fn four_ary_sum_of_products() {
        assert_eq!(SpecialFn4::SumOfProducts.apply([1.0_f64, 2.0, 3.0, 4.0]), 14.0);
    }
}
