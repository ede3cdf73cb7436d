use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::LatticeError;
use crate::types::*;
use crate::LatticeResult;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrrFactors {
    pub up: Factor,
    pub down: Factor,
}

/// Cox-Ross-Rubinstein factors: `u = exp(sigma * sqrt(T / n))`, `d = 1 / u`.
pub fn crr_factors(volatility: Rate, horizon: Decimal, periods: u32) -> LatticeResult<CrrFactors> {
    if volatility <= Decimal::ZERO {
        return Err(LatticeError::InvalidInput {
            field: "volatility".into(),
            reason: "must be positive to derive up/down factors".into(),
        });
    }
    if horizon <= Decimal::ZERO {
        return Err(LatticeError::InvalidInput {
            field: "T".into(),
            reason: "must be positive to derive up/down factors".into(),
        });
    }
    if periods == 0 {
        return Err(LatticeError::InvalidInput {
            field: "time_periods".into(),
            reason: "must be at least 1 to derive up/down factors".into(),
        });
    }

    let dt = horizon / Decimal::from(periods);
    let overflow = || LatticeError::Overflow {
        context: "CRR up factor".into(),
    };
    let root_dt = dt.sqrt().ok_or_else(overflow)?;
    let exponent = volatility.checked_mul(root_dt).ok_or_else(overflow)?;
    let up = exponent.checked_exp().ok_or_else(overflow)?;
    let down = Decimal::ONE / up;

    Ok(CrrFactors { up, down })
}

/// [`crr_factors`] wrapped in the standard output envelope.
pub fn derive_crr_factors(
    volatility: Rate,
    horizon: Decimal,
    periods: u32,
) -> LatticeResult<ComputationOutput<CrrFactors>> {
    let start = Instant::now();
    let factors = crr_factors(volatility, horizon, periods)?;
    let assumptions = serde_json::json!({
        "volatility": volatility.to_string(),
        "T": horizon.to_string(),
        "time_periods": periods,
    });
    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Cox-Ross-Rubinstein: u = exp(sigma * sqrt(T / n)), d = 1 / u",
        &assumptions,
        Vec::new(),
        elapsed,
        factors,
    ))
}
