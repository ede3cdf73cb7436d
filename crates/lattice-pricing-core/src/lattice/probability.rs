use rust_decimal::Decimal;

use crate::error::LatticeError;
use crate::math::checked_pow_u;
use crate::types::{Factor, Probability, Rate};
use crate::LatticeResult;

/// Growth of one unit over `t` periods: `(1 + rate)^t`.
pub fn growth_factor(rate: Rate, t: u32) -> LatticeResult<Decimal> {
    let context = "growth factor (1 + r)^t";
    let base = Decimal::ONE
        .checked_add(rate)
        .ok_or_else(|| overflow(context))?;
    checked_pow_u(base, u64::from(t), context)
}

fn overflow(context: &str) -> LatticeError {
    LatticeError::Overflow {
        context: context.to_string(),
    }
}

/// Up-move probability `((1 + r)^t - d) / (u - d)`.
///
/// No bounds check: a value outside [0, 1] is returned as-is.
pub fn risk_neutral_probability(
    rate: Rate,
    t: u32,
    up_factor: Factor,
    down_factor: Factor,
) -> LatticeResult<Probability> {
    let spread = up_factor
        .checked_sub(down_factor)
        .ok_or_else(|| overflow("factor spread u - d"))?;
    if spread.is_zero() {
        return Err(LatticeError::DivisionByZero {
            context: "risk-neutral probability (up_factor == down_factor)".into(),
        });
    }
    let growth = growth_factor(rate, t)?;
    growth
        .checked_sub(down_factor)
        .and_then(|excess| excess.checked_div(spread))
        .ok_or_else(|| overflow("risk-neutral probability"))
}

/// Whether `p` is a proper probability.
pub fn is_proper(p: Probability) -> bool {
    p >= Decimal::ZERO && p <= Decimal::ONE
}
