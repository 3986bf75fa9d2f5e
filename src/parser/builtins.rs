//! Name tables for the built-in functions callable as `name(args...)`,
//! separate from the keyword/infix-operator-word tables in [`super`] so the
//! arity-dispatch logic in `parse_symbol_primary` stays readable.

use crate::expr::{TrinaryOp, UnaryOp};
use crate::synth::RawBinOp;

/// Look up a case-folded name against the unary math catalog.
#[must_use]
pub(super) fn unary(name: &str) -> Option<UnaryOp> {
    Some(match name {
        "abs" => UnaryOp::Abs,
        "sin" => UnaryOp::Sin,
        "cos" => UnaryOp::Cos,
        "tan" => UnaryOp::Tan,
        "asin" => UnaryOp::Asin,
        "acos" => UnaryOp::Acos,
        "atan" => UnaryOp::Atan,
        "sinh" => UnaryOp::Sinh,
        "cosh" => UnaryOp::Cosh,
        "tanh" => UnaryOp::Tanh,
        "ln" => UnaryOp::Ln,
        "log10" => UnaryOp::Log10,
        "log2" => UnaryOp::Log2,
        "exp" => UnaryOp::Exp,
        "sqrt" => UnaryOp::Sqrt,
        "sgn" => UnaryOp::Sgn,
        "frac" => UnaryOp::Frac,
        "trunc" => UnaryOp::Trunc,
        "round" => UnaryOp::Round,
        "ceil" => UnaryOp::Ceil,
        "floor" => UnaryOp::Floor,
        "erf" => UnaryOp::Erf,
        "erfc" => UnaryOp::Erfc,
        "notl" => UnaryOp::NotL,
        "d2r" => UnaryOp::D2r,
        "r2d" => UnaryOp::R2d,
        _ => return None,
    })
}

/// Look up a case-folded name against the binary function catalog (as
/// distinct from the infix operators the precedence ladder already
/// handles — these are only ever spelled `name(a, b)`).
#[must_use]
pub(super) fn binary(name: &str) -> Option<RawBinOp> {
    Some(match name {
        "root" => RawBinOp::Root,
        "logn" => RawBinOp::Logn,
        "atan2" => RawBinOp::Atan2,
        "hypot" => RawBinOp::Hypot,
        "mod" => RawBinOp::Mod,
        "shl" => RawBinOp::Shl,
        "shr" => RawBinOp::Shr,
        _ => return None,
    })
}

/// Look up a case-folded name against the trinary-only catalog (`clamp`,
/// `iclamp`, `inrange` — unlike `min`/`max`/`avg`/`sum`/`mul`, these never
/// extend to other arities).
#[must_use]
pub(super) fn trinary(name: &str) -> Option<TrinaryOp> {
    Some(match name {
        "clamp" => TrinaryOp::Clamp,
        "iclamp" => TrinaryOp::IClamp,
        "inrange" => TrinaryOp::InRange,
        _ => return None,
    })
}
