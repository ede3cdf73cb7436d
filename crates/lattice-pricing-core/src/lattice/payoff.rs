use rust_decimal::Decimal;

use super::builder::{Lattice, NodeIndex};
use super::config::OptionKind;
use crate::error::LatticeError;
use crate::math::round_value;
use crate::types::Money;
use crate::LatticeResult;

/// Payoff from exercising immediately at `spot`.
pub fn intrinsic_value(spot: Money, strike: Money, kind: OptionKind) -> LatticeResult<Money> {
    let gain = match kind {
        OptionKind::Call => spot.checked_sub(strike),
        OptionKind::Put => strike.checked_sub(spot),
    };
    gain.map(|g| g.max(Decimal::ZERO))
        .ok_or_else(|| LatticeError::Overflow {
            context: "intrinsic value".into(),
        })
}

/// Set the rounded exercise value (and option value) of every terminal node.
/// Returns the terminal coordinates, row order, to seed backward induction.
pub fn seed_terminal_layer(
    lattice: &mut Lattice,
    strike: Money,
    kind: OptionKind,
) -> LatticeResult<Vec<NodeIndex>> {
    let terminal = lattice.terminal_indices();
    for &index in &terminal {
        if let Some(node) = lattice.get_mut(index) {
            let exercise = round_value(intrinsic_value(node.spot(), strike, kind)?);
            node.settle_exercise(exercise);
        }
    }
    Ok(terminal)
}
