use serde::{Deserialize, Serialize};

use super::node::{LatticeLayer, PriceNode};
use crate::error::LatticeError;
use crate::math::checked_pow_i;
use crate::types::{Factor, Money};
use crate::LatticeResult;

/// Coordinate of a node: number of down moves and up moves taken to reach it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeIndex {
    pub down: usize,
    pub up: usize,
}

impl NodeIndex {
    pub fn new(down: usize, up: usize) -> Self {
        Self { down, up }
    }

    /// Total steps from the root.
    pub fn level(&self) -> usize {
        self.down + self.up
    }

    /// Successor reached by one more up move.
    pub fn up_successor(&self) -> NodeIndex {
        NodeIndex::new(self.down, self.up + 1)
    }

    /// Successor reached by one more down move.
    pub fn down_successor(&self) -> NodeIndex {
        NodeIndex::new(self.down + 1, self.up)
    }
}

/// Triangular grid of price nodes. Row `r` holds the nodes with `r` down
/// moves, ordered by up-move count `0..=periods-r`.
///
/// Recombination is implicit: prices depend only on `up - down`, but each
/// coordinate pair owns its node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lattice {
    periods: usize,
    rows: Vec<Vec<PriceNode>>,
}

impl Lattice {
    /// Build every node with `down + up <= periods`, priced at
    /// `stock_price * up_factor^(up - down)`.
    pub fn generate(stock_price: Money, up_factor: Factor, periods: u32) -> LatticeResult<Self> {
        let periods = periods as usize;
        let mut rows = Vec::with_capacity(periods + 1);
        for down in 0..=periods {
            let mut row = Vec::with_capacity(periods + 1 - down);
            for up in 0..=(periods - down) {
                let exponent = up as i64 - down as i64;
                let context = format!("spot price at (down={down}, up={up})");
                let multiplier = checked_pow_i(up_factor, exponent, &context)?;
                let spot = stock_price
                    .checked_mul(multiplier)
                    .ok_or(LatticeError::Overflow { context })?;
                row.push(PriceNode::new(spot));
            }
            rows.push(row);
        }

        tracing::debug!(
            periods,
            nodes = (periods + 1) * (periods + 2) / 2,
            "lattice generated"
        );
        Ok(Self { periods, rows })
    }

    pub fn periods(&self) -> usize {
        self.periods
    }

    pub fn node_count(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    pub fn rows(&self) -> &[Vec<PriceNode>] {
        &self.rows
    }

    pub fn get(&self, index: NodeIndex) -> Option<&PriceNode> {
        self.rows.get(index.down).and_then(|row| row.get(index.up))
    }

    pub(crate) fn get_mut(&mut self, index: NodeIndex) -> Option<&mut PriceNode> {
        self.rows
            .get_mut(index.down)
            .and_then(|row| row.get_mut(index.up))
    }

    pub fn root(&self) -> &PriceNode {
        &self.rows[0][0]
    }

    pub fn is_terminal(&self, index: NodeIndex) -> bool {
        index.level() == self.periods
    }

    /// The anti-diagonal `down + up == periods`, one node per row.
    pub fn terminal_indices(&self) -> Vec<NodeIndex> {
        (0..=self.periods)
            .map(|down| NodeIndex::new(down, self.periods - down))
            .collect()
    }

    /// All coordinates, row by row.
    pub fn indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(down, row)| (0..row.len()).map(move |up| NodeIndex::new(down, up)))
    }

    /// One layer as rows of optional values, mirroring the node layout.
    pub fn layer(&self, layer: LatticeLayer) -> Vec<Vec<Option<Money>>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|node| layer.select(node)).collect())
            .collect()
    }
}
