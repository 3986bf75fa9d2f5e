//! Integer-kind `Numeric` implementations (`i64`, `i32`).
//!
//! Integer types have no native NaN/infinity. Per the kernel's contract
//! they reserve `Self::MIN`/`Self::MAX` as sentinels; `is_nan` recognizes
//! the `MIN` sentinel, and every transcendental unary function (trig, log,
//! `erf`, …) returns it, matching the spec's "integer types yield NaN"
//! requirement without requiring a tagged/optional representation.

use crate::Numeric;

macro_rules! impl_int_numeric {
    ($ty:ty) => {
        impl Numeric for $ty {
            const IS_INTEGER: bool = true;
            const EPSILON: Self = 0;

            fn nan() -> Self {
                <$ty>::MIN
            }
            fn infinity() -> Self {
                <$ty>::MAX
            }
            fn neg_infinity() -> Self {
                <$ty>::MIN + 1
            }
            fn is_nan(self) -> bool {
                self == <$ty>::MIN
            }
            fn zero() -> Self {
                0
            }
            fn one() -> Self {
                1
            }
            #[allow(
                clippy::cast_possible_truncation,
                reason = "numeric literals that don't fit saturate rather than panic"
            )]
            fn from_f64(v: f64) -> Self {
                if v.is_nan() {
                    return Self::nan();
                }
                v as $ty
            }
            #[allow(clippy::cast_precision_loss, reason = "debug/format path only")]
            fn to_f64(self) -> f64 {
                self as f64
            }

            fn add(self, rhs: Self) -> Self {
                self.wrapping_add(rhs)
            }
            fn sub(self, rhs: Self) -> Self {
                self.wrapping_sub(rhs)
            }
            fn mul(self, rhs: Self) -> Self {
                self.wrapping_mul(rhs)
            }
            fn div(self, rhs: Self) -> Self {
                if rhs == 0 {
                    return Self::nan();
                }
                self.wrapping_div(rhs)
            }
            fn neg(self) -> Self {
                self.wrapping_neg()
            }
            fn modulus(self, rhs: Self) -> Self {
                if rhs == 0 {
                    return Self::nan();
                }
                self.wrapping_rem(rhs)
            }

            fn pow(self, rhs: Self) -> Self {
                if rhs < 0 {
                    return Self::nan();
                }
                #[allow(
                    clippy::cast_sign_loss,
                    clippy::cast_possible_truncation,
                    reason = "rhs already checked non-negative"
                )]
                self.wrapping_pow(rhs as u32)
            }
            fn fast_exp(self, k: i32) -> Self {
                if k < 0 {
                    return Self::nan();
                }
                #[allow(clippy::cast_sign_loss, reason = "k already checked non-negative")]
                self.wrapping_pow(k as u32)
            }
            fn root(self, _rhs: Self) -> Self {
                Self::nan()
            }
            fn logn(self, _n: Self) -> Self {
                Self::nan()
            }
            fn log1p(self) -> Self {
                Self::nan()
            }
            fn expm1(self) -> Self {
                Self::nan()
            }
            fn atan2(self, _x: Self) -> Self {
                Self::nan()
            }
            fn erf(self) -> Self {
                Self::nan()
            }
            fn erfc(self) -> Self {
                Self::nan()
            }
            fn hypot(self, rhs: Self) -> Self {
                let a = self.unsigned_abs();
                let b = rhs.unsigned_abs();
                #[allow(clippy::cast_possible_wrap, reason = "integer hypot is an approximation")]
                (((a * a + b * b) as f64).sqrt() as $ty)
            }
            fn roundn(self, _n: i32) -> Self {
                self
            }

            fn sin(self) -> Self {
                Self::nan()
            }
            fn cos(self) -> Self {
                Self::nan()
            }
            fn tan(self) -> Self {
                Self::nan()
            }
            fn asin(self) -> Self {
                Self::nan()
            }
            fn acos(self) -> Self {
                Self::nan()
            }
            fn atan(self) -> Self {
                Self::nan()
            }
            fn sinh(self) -> Self {
                Self::nan()
            }
            fn cosh(self) -> Self {
                Self::nan()
            }
            fn tanh(self) -> Self {
                Self::nan()
            }
            fn ln(self) -> Self {
                Self::nan()
            }
            fn log10(self) -> Self {
                Self::nan()
            }
            fn log2(self) -> Self {
                Self::nan()
            }
            fn exp(self) -> Self {
                Self::nan()
            }
            fn sqrt(self) -> Self {
                if self < 0 {
                    return Self::nan();
                }
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss,
                    reason = "integer sqrt truncates toward zero by definition"
                )]
                (((self as f64).sqrt()) as $ty)
            }

            fn sgn(self) -> Self {
                self.signum()
            }
            fn frac(self) -> Self {
                0
            }
            fn trunc(self) -> Self {
                self
            }
            fn round(self) -> Self {
                self
            }
            fn ceil(self) -> Self {
                self
            }
            fn floor(self) -> Self {
                self
            }
            fn abs(self) -> Self {
                self.wrapping_abs()
            }

            #[allow(
                clippy::cast_sign_loss,
                clippy::cast_possible_truncation,
                reason = "shift counts are clamped to a small non-negative range"
            )]
            fn shl(self, k: Self) -> Self {
                let k = k.clamp(0, (Self::BITS - 1) as $ty) as u32;
                self.wrapping_shl(k)
            }
            #[allow(
                clippy::cast_sign_loss,
                clippy::cast_possible_truncation,
                reason = "shift counts are clamped to a small non-negative range"
            )]
            fn shr(self, k: Self) -> Self {
                let k = k.clamp(0, (Self::BITS - 1) as $ty) as u32;
                self.wrapping_shr(k)
            }

            fn is_integer_valued(self) -> bool {
                true
            }
            fn is_true(self) -> bool {
                self != 0
            }
            fn from_bool(b: bool) -> Self {
                if b { 1 } else { 0 }
            }

            fn equal(self, rhs: Self) -> bool {
                self == rhs
            }
        }
    };
}

impl_int_numeric!(i64);
impl_int_numeric!(i32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_matches_bit_ops() {
        assert_eq!(Numeric::shl(1_i64, 4), 16);
        assert_eq!(Numeric::shr(16_i64, 4), 1);
    }

    #[test]
    fn division_by_zero_is_sentinel_not_panic() {
        assert!(Numeric::div(5_i32, 0).is_nan());
    }
}
