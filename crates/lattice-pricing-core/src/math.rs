use rust_decimal::Decimal;

use crate::error::LatticeError;
use crate::types::Money;
use crate::LatticeResult;

/// Decimal places kept on every exercise and continuation value.
pub const VALUE_DP: u32 = 2;

/// Round a node valuation to [`VALUE_DP`] places.
pub fn round_value(value: Money) -> Money {
    value.round_dp(VALUE_DP)
}

/// Integer power by squaring, with overflow reported instead of panicking.
pub fn checked_pow_u(base: Decimal, exp: u64, context: &str) -> LatticeResult<Decimal> {
    let overflow = || LatticeError::Overflow {
        context: context.to_string(),
    };

    let mut result = Decimal::ONE;
    let mut b = base;
    let mut e = exp;
    while e > 0 {
        if e & 1 == 1 {
            result = result.checked_mul(b).ok_or_else(overflow)?;
        }
        e >>= 1;
        if e > 0 {
            b = b.checked_mul(b).ok_or_else(overflow)?;
        }
    }
    Ok(result)
}

/// Signed integer power: `base^-k = 1 / base^k`.
pub fn checked_pow_i(base: Decimal, exp: i64, context: &str) -> LatticeResult<Decimal> {
    let magnitude = checked_pow_u(base, exp.unsigned_abs(), context)?;
    if exp >= 0 {
        return Ok(magnitude);
    }
    if magnitude.is_zero() {
        return Err(LatticeError::DivisionByZero {
            context: context.to_string(),
        });
    }
    Decimal::ONE
        .checked_div(magnitude)
        .ok_or_else(|| LatticeError::Overflow {
            context: context.to_string(),
        })
}
