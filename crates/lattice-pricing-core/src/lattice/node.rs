use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LatticeError;
use crate::types::Money;

// ---------------------------------------------------------------------------
// Price node
// ---------------------------------------------------------------------------

/// One (down-moves, up-moves) point of the lattice.
///
/// The spot price is fixed at construction. The three valuations start unset
/// and are written once: exercise value on the terminal layer, continuation
/// value during backward induction, option value whenever either is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceNode {
    spot: Money,
    exercise_value: Option<Money>,
    continuation_value: Option<Money>,
    option_value: Option<Money>,
}

impl PriceNode {
    pub fn new(spot: Money) -> Self {
        Self {
            spot,
            exercise_value: None,
            continuation_value: None,
            option_value: None,
        }
    }

    pub fn spot(&self) -> Money {
        self.spot
    }

    pub fn exercise_value(&self) -> Option<Money> {
        self.exercise_value
    }

    pub fn continuation_value(&self) -> Option<Money> {
        self.continuation_value
    }

    pub fn option_value(&self) -> Option<Money> {
        self.option_value
    }

    /// Value a predecessor reads from this node: continuation if computed,
    /// otherwise the exercise value.
    pub fn carried_value(&self) -> Option<Money> {
        self.continuation_value.or(self.exercise_value)
    }

    /// Terminal layer: no continuation beyond the horizon, so OV = XV.
    pub(crate) fn settle_exercise(&mut self, exercise_value: Money) {
        self.exercise_value = Some(exercise_value);
        self.option_value = Some(exercise_value);
    }

    /// Interior layer: OV = max(BV, XV or 0). The early-exercise comparison
    /// is applied whatever exercise style was requested.
    pub(crate) fn settle_continuation(&mut self, continuation_value: Money) {
        self.continuation_value = Some(continuation_value);
        let exercise = self.exercise_value.unwrap_or(Decimal::ZERO);
        self.option_value = Some(continuation_value.max(exercise));
    }
}

// ---------------------------------------------------------------------------
// Lattice layers (for inspection)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LatticeLayer {
    Spot,
    ExerciseValue,
    ContinuationValue,
    OptionValue,
}

impl LatticeLayer {
    pub const ALL: [LatticeLayer; 4] = [
        LatticeLayer::Spot,
        LatticeLayer::ExerciseValue,
        LatticeLayer::ContinuationValue,
        LatticeLayer::OptionValue,
    ];

    pub fn select(self, node: &PriceNode) -> Option<Money> {
        match self {
            LatticeLayer::Spot => Some(node.spot()),
            LatticeLayer::ExerciseValue => node.exercise_value(),
            LatticeLayer::ContinuationValue => node.continuation_value(),
            LatticeLayer::OptionValue => node.option_value(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LatticeLayer::Spot => "spot",
            LatticeLayer::ExerciseValue => "exercise_value",
            LatticeLayer::ContinuationValue => "continuation_value",
            LatticeLayer::OptionValue => "option_value",
        }
    }
}

impl fmt::Display for LatticeLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LatticeLayer {
    type Err = LatticeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "s" | "spot" => Ok(LatticeLayer::Spot),
            "xv" | "exercisevalue" => Ok(LatticeLayer::ExerciseValue),
            "bv" | "continuationvalue" => Ok(LatticeLayer::ContinuationValue),
            "ov" | "optionvalue" => Ok(LatticeLayer::OptionValue),
            _ => Err(LatticeError::UnrecognizedValue {
                field: "layer".into(),
                value: s.to_string(),
            }),
        }
    }
}
