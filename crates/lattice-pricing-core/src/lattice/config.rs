use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::factors::crr_factors;
use crate::error::LatticeError;
use crate::types::{Factor, Money, Rate};
use crate::LatticeResult;

// ---------------------------------------------------------------------------
// Closed vocabularies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OptionKind {
    Call,
    Put,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExerciseStyle {
    American,
    European,
}

impl FromStr for OptionKind {
    type Err = LatticeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CALL" => Ok(OptionKind::Call),
            "PUT" => Ok(OptionKind::Put),
            _ => Err(LatticeError::UnrecognizedValue {
                field: "option_type".into(),
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for ExerciseStyle {
    type Err = LatticeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AMERICAN" => Ok(ExerciseStyle::American),
            "EUROPEAN" => Ok(ExerciseStyle::European),
            _ => Err(LatticeError::UnrecognizedValue {
                field: "option_style".into(),
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OptionKind::Call => "CALL",
            OptionKind::Put => "PUT",
        })
    }
}

impl fmt::Display for ExerciseStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExerciseStyle::American => "AMERICAN",
            ExerciseStyle::European => "EUROPEAN",
        })
    }
}

// ---------------------------------------------------------------------------
// Raw configuration
// ---------------------------------------------------------------------------

/// Model configuration as supplied by the caller. Every field is optional
/// here; [`ModelConfig::validate`] enforces presence and vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option_style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_price: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strike_price: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_free_interest_rate: Option<Rate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub up_factor: Option<Factor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub down_factor: Option<Factor>,
    /// Only consulted when the factors are absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volatility: Option<Rate>,
    /// Total horizon. Metadata unless factors are derived from volatility.
    #[serde(rename = "T", alias = "horizon", skip_serializing_if = "Option::is_none")]
    pub horizon: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_periods: Option<u32>,
}

impl ModelConfig {
    /// Fill every field set in `other` over this one.
    pub fn overlay(&mut self, other: ModelConfig) {
        fill(&mut self.option_type, other.option_type);
        fill(&mut self.option_style, other.option_style);
        fill(&mut self.stock_price, other.stock_price);
        fill(&mut self.strike_price, other.strike_price);
        fill(&mut self.risk_free_interest_rate, other.risk_free_interest_rate);
        fill(&mut self.up_factor, other.up_factor);
        fill(&mut self.down_factor, other.down_factor);
        fill(&mut self.volatility, other.volatility);
        fill(&mut self.horizon, other.horizon);
        fill(&mut self.time_periods, other.time_periods);
    }

    pub fn validate(&self) -> LatticeResult<ModelInputs> {
        let option_kind: OptionKind = required(&self.option_type, "option_type")?.parse()?;
        let exercise_style: ExerciseStyle =
            required(&self.option_style, "option_style")?.parse()?;
        let stock_price = *required(&self.stock_price, "stock_price")?;
        let strike_price = *required(&self.strike_price, "strike_price")?;
        let risk_free_rate = *required(&self.risk_free_interest_rate, "risk_free_interest_rate")?;
        let time_periods = *required(&self.time_periods, "time_periods")?;

        let (up_factor, down_factor, factor_source) = match (self.up_factor, self.down_factor) {
            (Some(u), Some(d)) => (u, d, FactorSource::Explicit),
            (u, d) => match (self.volatility, self.horizon) {
                (Some(sigma), Some(horizon)) if u.is_none() && d.is_none() => {
                    let factors = crr_factors(sigma, horizon, time_periods)?;
                    (factors.up, factors.down, FactorSource::Volatility)
                }
                _ => {
                    let field = if u.is_none() { "up_factor" } else { "down_factor" };
                    return Err(LatticeError::missing(field));
                }
            },
        };

        Ok(ModelInputs {
            option_kind,
            exercise_style,
            stock_price,
            strike_price,
            risk_free_rate,
            up_factor,
            down_factor,
            time_periods,
            horizon: self.horizon,
            volatility: self.volatility,
            factor_source,
        })
    }
}

fn fill<T>(target: &mut Option<T>, source: Option<T>) {
    if source.is_some() {
        *target = source;
    }
}

fn required<'a, T>(value: &'a Option<T>, field: &str) -> LatticeResult<&'a T> {
    value.as_ref().ok_or_else(|| LatticeError::missing(field))
}

// ---------------------------------------------------------------------------
// Validated inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorSource {
    Explicit,
    Volatility,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInputs {
    pub option_kind: OptionKind,
    pub exercise_style: ExerciseStyle,
    pub stock_price: Money,
    pub strike_price: Money,
    pub risk_free_rate: Rate,
    pub up_factor: Factor,
    pub down_factor: Factor,
    pub time_periods: u32,
    pub horizon: Option<Decimal>,
    pub volatility: Option<Rate>,
    pub factor_source: FactorSource,
}
