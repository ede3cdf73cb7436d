use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::builder::{Lattice, NodeIndex};
use super::probability::{growth_factor, is_proper, risk_neutral_probability};
use crate::error::LatticeError;
use crate::math::round_value;
use crate::types::{Factor, Money, Probability, Rate};
use crate::LatticeResult;

/// Market parameters shared by every induction step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InductionParams {
    pub rate: Rate,
    pub up_factor: Factor,
    pub down_factor: Factor,
}

/// Probability used at a given local period count `t = min(down, up)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalProbability {
    pub t: u32,
    pub probability_up: Probability,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InductionSummary {
    /// Option value of the root node.
    pub root_value: Money,
    /// Number of frontiers valued (equals the period count).
    pub frontiers: usize,
    /// Every distinct local probability, ascending by `t`.
    pub local_probabilities: Vec<LocalProbability>,
}

impl InductionSummary {
    pub fn improper_probabilities(&self) -> impl Iterator<Item = &LocalProbability> {
        self.local_probabilities
            .iter()
            .filter(|lp| !is_proper(lp.probability_up))
    }
}

/// The frontier one level closer to the root: each `(down, up)` steps to
/// `(down, up - 1)`, coordinates with `up == 0` fall out.
fn step_inward(frontier: impl IntoIterator<Item = NodeIndex>) -> BTreeSet<NodeIndex> {
    frontier
        .into_iter()
        .filter_map(|idx| idx.up.checked_sub(1).map(|up| NodeIndex::new(idx.down, up)))
        .collect()
}

/// `(p * Vu + (1 - p) * Vd) / (1 + r)^t`, undiscounted when `t == 0`.
pub fn binomial_value(
    up_value: Money,
    down_value: Money,
    probability_up: Probability,
    discount: Decimal,
) -> LatticeResult<Money> {
    if discount.is_zero() {
        return Err(LatticeError::DivisionByZero {
            context: "discount factor (1 + r)^t".into(),
        });
    }
    let overflow = || LatticeError::Overflow {
        context: "binomial expectation".into(),
    };
    let up_leg = probability_up.checked_mul(up_value).ok_or_else(overflow)?;
    let down_leg = Decimal::ONE
        .checked_sub(probability_up)
        .and_then(|q| q.checked_mul(down_value))
        .ok_or_else(overflow)?;
    let expectation = up_leg.checked_add(down_leg).ok_or_else(overflow)?;
    expectation.checked_div(discount).ok_or_else(overflow)
}

fn successor_value(lattice: &Lattice, index: NodeIndex) -> LatticeResult<Money> {
    lattice
        .get(index)
        .and_then(|node| node.carried_value())
        .ok_or(LatticeError::UnvaluedNode {
            down: index.down,
            up: index.up,
        })
}

/// Propagate values from the seeded terminal layer back to the root, one
/// frontier per loop iteration.
///
/// Each node `(r, c)` is valued with the probability and discount evaluated
/// at `t = min(r, c)`, rounded to cents, then settled against its exercise
/// value. Re-running on an already valued lattice gives the same result.
pub fn backward_induction(
    lattice: &mut Lattice,
    terminal: &[NodeIndex],
    params: &InductionParams,
) -> LatticeResult<InductionSummary> {
    // t -> (probability, discount)
    let mut per_t: BTreeMap<u32, (Probability, Decimal)> = BTreeMap::new();
    let mut frontier = step_inward(terminal.iter().copied());
    let mut frontiers = 0usize;

    while !frontier.is_empty() {
        frontiers += 1;
        tracing::debug!(
            level = frontier.iter().next().map(NodeIndex::level),
            nodes = frontier.len(),
            "valuing frontier"
        );

        for &index in &frontier {
            let t = index.down.min(index.up) as u32;
            let (probability_up, discount) = match per_t.get(&t) {
                Some(cached) => *cached,
                None => {
                    let p = risk_neutral_probability(
                        params.rate,
                        t,
                        params.up_factor,
                        params.down_factor,
                    )?;
                    let disc = growth_factor(params.rate, t)?;
                    if !is_proper(p) {
                        tracing::warn!(t, probability_up = %p, "probability outside [0, 1]");
                    }
                    per_t.insert(t, (p, disc));
                    (p, disc)
                }
            };

            let up_value = successor_value(lattice, index.up_successor())?;
            let down_value = successor_value(lattice, index.down_successor())?;
            let continuation =
                round_value(binomial_value(up_value, down_value, probability_up, discount)?);

            let node = lattice.get_mut(index).ok_or(LatticeError::UnvaluedNode {
                down: index.down,
                up: index.up,
            })?;
            node.settle_continuation(continuation);
        }

        frontier = step_inward(frontier);
    }

    let root = lattice.root();
    let root_value = root
        .option_value()
        .ok_or(LatticeError::UnvaluedNode { down: 0, up: 0 })?;

    Ok(InductionSummary {
        root_value,
        frontiers,
        local_probabilities: per_t
            .into_iter()
            .map(|(t, (probability_up, _))| LocalProbability { t, probability_up })
            .collect(),
    })
}
