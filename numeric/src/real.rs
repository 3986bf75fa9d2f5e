//! Real-kind `Numeric` implementations (`f64`, `f32`).

use crate::{Numeric, fast_exp_f64};
use num_traits::Float;

macro_rules! impl_real_numeric {
    ($ty:ty, $eps:expr) => {
        impl Numeric for $ty {
            const IS_INTEGER: bool = false;
            const EPSILON: Self = $eps;

            fn nan() -> Self {
                <$ty>::NAN
            }
            fn infinity() -> Self {
                <$ty>::INFINITY
            }
            fn neg_infinity() -> Self {
                <$ty>::NEG_INFINITY
            }
            fn is_nan(self) -> bool {
                Float::is_nan(self)
            }
            fn zero() -> Self {
                0.0
            }
            fn one() -> Self {
                1.0
            }
            #[allow(
                clippy::cast_possible_truncation,
                reason = "f32 literal parsing accepts controlled precision loss from f64"
            )]
            fn from_f64(v: f64) -> Self {
                v as $ty
            }
            fn to_f64(self) -> f64 {
                f64::from(self)
            }

            fn add(self, rhs: Self) -> Self {
                self + rhs
            }
            fn sub(self, rhs: Self) -> Self {
                self - rhs
            }
            fn mul(self, rhs: Self) -> Self {
                self * rhs
            }
            fn div(self, rhs: Self) -> Self {
                self / rhs
            }
            fn neg(self) -> Self {
                -self
            }
            fn modulus(self, rhs: Self) -> Self {
                // Rust's `%` on floats is already `fmod` (sign follows the dividend).
                self % rhs
            }

            fn pow(self, rhs: Self) -> Self {
                Float::powf(self, rhs)
            }
            #[allow(
                clippy::cast_precision_loss,
                reason = "fast_exp_f64 operates in f64 and is cast back to the real kind"
            )]
            fn fast_exp(self, k: i32) -> Self {
                <$ty>::from_f64(fast_exp_f64(self.to_f64(), k))
            }
            fn root(self, rhs: Self) -> Self {
                if rhs == 0.0 {
                    return Self::nan();
                }
                Float::powf(self, Self::one() / rhs)
            }
            fn logn(self, n: Self) -> Self {
                Float::ln(self) / Float::ln(n)
            }
            fn log1p(self) -> Self {
                Float::ln_1p(self)
            }
            fn expm1(self) -> Self {
                Float::exp_m1(self)
            }
            fn atan2(self, x: Self) -> Self {
                Float::atan2(self, x)
            }
            fn erf(self) -> Self {
                <$ty>::from_f64(erf_f64(self.to_f64()))
            }
            fn erfc(self) -> Self {
                <$ty>::from_f64(1.0 - erf_f64(self.to_f64()))
            }
            fn hypot(self, rhs: Self) -> Self {
                Float::hypot(self, rhs)
            }
            #[allow(
                clippy::cast_precision_loss,
                clippy::cast_possible_truncation,
                reason = "decimal-place rounding scales by a small integer power of ten"
            )]
            fn roundn(self, n: i32) -> Self {
                let scale: Self = <$ty as Float>::powi(10.0, n);
                Float::round(self * scale) / scale
            }

            fn sin(self) -> Self {
                Float::sin(self)
            }
            fn cos(self) -> Self {
                Float::cos(self)
            }
            fn tan(self) -> Self {
                Float::tan(self)
            }
            fn asin(self) -> Self {
                Float::asin(self)
            }
            fn acos(self) -> Self {
                Float::acos(self)
            }
            fn atan(self) -> Self {
                Float::atan(self)
            }
            fn sinh(self) -> Self {
                Float::sinh(self)
            }
            fn cosh(self) -> Self {
                Float::cosh(self)
            }
            fn tanh(self) -> Self {
                Float::tanh(self)
            }
            fn ln(self) -> Self {
                Float::ln(self)
            }
            fn log10(self) -> Self {
                Float::log10(self)
            }
            fn log2(self) -> Self {
                Float::log2(self)
            }
            fn exp(self) -> Self {
                Float::exp(self)
            }
            fn sqrt(self) -> Self {
                Float::sqrt(self)
            }

            fn sgn(self) -> Self {
                if self > 0.0 {
                    1.0
                } else if self < 0.0 {
                    -1.0
                } else {
                    0.0
                }
            }
            fn frac(self) -> Self {
                Float::fract(self)
            }
            fn trunc(self) -> Self {
                Float::trunc(self)
            }
            fn round(self) -> Self {
                Float::round(self)
            }
            fn ceil(self) -> Self {
                Float::ceil(self)
            }
            fn floor(self) -> Self {
                Float::floor(self)
            }
            fn abs(self) -> Self {
                Float::abs(self)
            }

            fn shl(self, k: Self) -> Self {
                let pow: Self = <$ty as Float>::powi(2.0, Float::floor(k.to_f64()) as i32);
                self * pow
            }
            fn shr(self, k: Self) -> Self {
                let pow: Self = <$ty as Float>::powi(2.0, Float::floor(k.to_f64()) as i32);
                self / pow
            }

            fn is_integer_valued(self) -> bool {
                Float::fract(self) == 0.0
            }
            fn is_true(self) -> bool {
                self != 0.0
            }
            fn from_bool(b: bool) -> Self {
                if b { 1.0 } else { 0.0 }
            }

            fn equal(self, rhs: Self) -> bool {
                if Float::is_nan(self) || Float::is_nan(rhs) {
                    return false;
                }
                if self == rhs {
                    return true;
                }
                let scale = Float::max(1.0, Float::max(Float::abs(self), Float::abs(rhs)));
                Float::abs(self - rhs) <= scale * Self::EPSILON
            }
        }
    };
}

impl_real_numeric!(f64, 1e-10);
impl_real_numeric!(f32, 1e-6);

/// Abramowitz & Stegun 7.1.26 rational approximation (max error ~1.5e-7),
/// used when the standard library has no `erf` (stable Rust has none).
fn erf_f64(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    let a1 = 0.254_829_592;
    let a2 = -0.284_496_736;
    let a3 = 1.421_413_741;
    let a4 = -1.453_152_027;
    let a5 = 1.061_405_429;
    let p = 0.327_591_1;

    let t = 1.0 / (1.0 + p * x);
    let y = 1.0 - (((((a5 * t + a4) * t) + a3) * t + a2) * t + a1) * t * (-x * x).exp();
    sign * y
}
