use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use super::builder::Lattice;
use super::config::{ExerciseStyle, FactorSource, ModelConfig, ModelInputs};
use super::induction::{backward_induction, InductionParams, InductionSummary, LocalProbability};
use super::node::LatticeLayer;
use super::payoff::seed_terminal_layer;
use super::probability::{is_proper, risk_neutral_probability};
use crate::types::*;
use crate::LatticeResult;

const METHODOLOGY: &str =
    "Binomial lattice, backward induction with per-node probability at t = min(down, up)";

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Rows by down-move count, columns by up-move count.
pub type LayerGrid = Vec<Vec<Option<Money>>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinomialOutput {
    pub present_value: Money,
    pub horizon_probability_up: Probability,
    pub time_periods: u32,
    pub node_count: usize,
    pub terminal_node_count: usize,
    pub local_probabilities: Vec<LocalProbability>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lattice: Option<BTreeMap<LatticeLayer, LayerGrid>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerOutput {
    pub layer: LatticeLayer,
    pub rows: LayerGrid,
}

/// A fully valued pricing run: inputs, the lattice, and the induction summary.
#[derive(Debug, Clone)]
pub struct BinomialModel {
    inputs: ModelInputs,
    lattice: Lattice,
    horizon_probability_up: Probability,
    summary: InductionSummary,
}

impl BinomialModel {
    pub fn from_config(config: &ModelConfig) -> LatticeResult<Self> {
        let inputs = config.validate()?;
        Self::new(inputs)
    }

    /// Build, seed and value the lattice for `inputs`.
    pub fn new(inputs: ModelInputs) -> LatticeResult<Self> {
        // Evaluated first so degenerate factors fail before any lattice work.
        let horizon_probability_up = risk_neutral_probability(
            inputs.risk_free_rate,
            inputs.time_periods,
            inputs.up_factor,
            inputs.down_factor,
        )?;

        let mut lattice =
            Lattice::generate(inputs.stock_price, inputs.up_factor, inputs.time_periods)?;
        let terminal =
            seed_terminal_layer(&mut lattice, inputs.strike_price, inputs.option_kind)?;
        let summary = backward_induction(&mut lattice, &terminal, &Self::params(&inputs))?;

        tracing::debug!(
            present_value = %summary.root_value,
            frontiers = summary.frontiers,
            "lattice valued"
        );

        Ok(Self {
            inputs,
            lattice,
            horizon_probability_up,
            summary,
        })
    }

    fn params(inputs: &ModelInputs) -> InductionParams {
        InductionParams {
            rate: inputs.risk_free_rate,
            up_factor: inputs.up_factor,
            down_factor: inputs.down_factor,
        }
    }

    /// Root node option value.
    pub fn present_value(&self) -> Money {
        self.summary.root_value
    }

    pub fn inputs(&self) -> &ModelInputs {
        &self.inputs
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn summary(&self) -> &InductionSummary {
        &self.summary
    }

    pub fn horizon_probability_up(&self) -> Probability {
        self.horizon_probability_up
    }

    pub fn layer(&self, layer: LatticeLayer) -> LayerGrid {
        self.lattice.layer(layer)
    }

    /// Run backward induction again over the existing lattice.
    pub fn revalue(&mut self) -> LatticeResult<Money> {
        let terminal = self.lattice.terminal_indices();
        self.summary = backward_induction(&mut self.lattice, &terminal, &Self::params(&self.inputs))?;
        Ok(self.summary.root_value)
    }

    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if !is_proper(self.horizon_probability_up) {
            warnings.push(format!(
                "Horizon up-probability {} lies outside [0, 1]",
                self.horizon_probability_up
            ));
        }
        for lp in self.summary.improper_probabilities() {
            warnings.push(format!(
                "Up-probability {} at t = {} lies outside [0, 1]; values are not arbitrage-free",
                lp.probability_up, lp.t
            ));
        }
        if self.inputs.exercise_style == ExerciseStyle::European {
            warnings.push(
                "EUROPEAN style requested: early-exercise comparison is still applied at every node"
                    .into(),
            );
        }
        if self.inputs.factor_source == FactorSource::Volatility {
            warnings.push(format!(
                "up/down factors derived from volatility (CRR): u = {}, d = {}",
                self.inputs.up_factor, self.inputs.down_factor
            ));
        }
        warnings
    }

    pub fn to_output(&self, layers: &[LatticeLayer]) -> BinomialOutput {
        let lattice = if layers.is_empty() {
            None
        } else {
            Some(layers.iter().map(|l| (*l, self.layer(*l))).collect())
        };
        BinomialOutput {
            present_value: self.present_value(),
            horizon_probability_up: self.horizon_probability_up,
            time_periods: self.inputs.time_periods,
            node_count: self.lattice.node_count(),
            terminal_node_count: self.lattice.terminal_indices().len(),
            local_probabilities: self.summary.local_probabilities.clone(),
            lattice,
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Price an option on a binomial lattice and wrap the result in the standard
/// envelope. `layers` selects which lattice layers to include.
pub fn price_binomial_option(
    config: &ModelConfig,
    layers: &[LatticeLayer],
) -> LatticeResult<ComputationOutput<BinomialOutput>> {
    let start = Instant::now();
    let model = BinomialModel::from_config(config)?;
    let output = model.to_output(layers);
    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        METHODOLOGY,
        model.inputs(),
        model.warnings(),
        elapsed,
        output,
    ))
}

/// Value the lattice and return a single layer.
pub fn lattice_layer(
    config: &ModelConfig,
    layer: LatticeLayer,
) -> LatticeResult<ComputationOutput<LayerOutput>> {
    let start = Instant::now();
    let model = BinomialModel::from_config(config)?;
    let output = LayerOutput {
        layer,
        rows: model.layer(layer),
    };
    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        METHODOLOGY,
        model.inputs(),
        model.warnings(),
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LatticeError;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn reference_config() -> ModelConfig {
        ModelConfig {
            option_type: Some("CALL".into()),
            option_style: Some("AMERICAN".into()),
            stock_price: Some(dec!(100)),
            strike_price: Some(dec!(120)),
            risk_free_interest_rate: Some(dec!(0.0009)),
            up_factor: Some(dec!(1.25)),
            down_factor: Some(dec!(0.80)),
            volatility: None,
            horizon: Some(dec!(1)),
            time_periods: Some(2),
        }
    }

    #[test]
    fn test_reference_present_value() {
        let model = BinomialModel::from_config(&reference_config()).unwrap();
        assert_eq!(model.present_value(), dec!(7.16));
        assert!(model.warnings().is_empty());
    }

    #[test]
    fn test_horizon_probability_uses_full_period_count() {
        let model = BinomialModel::from_config(&reference_config()).unwrap();
        // ((1.0009)^2 - 0.8) / 0.45
        let expected = (dec!(1.0009) * dec!(1.0009) - dec!(0.8)) / dec!(0.45);
        assert_eq!(model.horizon_probability_up(), expected);
    }

    #[test]
    fn test_degenerate_factors_fail_before_lattice() {
        let config = ModelConfig {
            down_factor: Some(dec!(1.25)),
            ..reference_config()
        };
        let err = BinomialModel::from_config(&config).unwrap_err();
        assert!(matches!(err, LatticeError::DivisionByZero { .. }));
    }

    #[test]
    fn test_european_style_same_value_with_warning() {
        let config = ModelConfig {
            option_style: Some("european".into()),
            ..reference_config()
        };
        let model = BinomialModel::from_config(&config).unwrap();
        assert_eq!(model.present_value(), dec!(7.16));
        assert!(model.warnings().iter().any(|w| w.contains("EUROPEAN")));
    }

    #[test]
    fn test_improper_probability_is_warning_not_error() {
        let config = ModelConfig {
            risk_free_interest_rate: Some(dec!(0.5)),
            up_factor: Some(dec!(1.1)),
            down_factor: Some(dec!(0.9)),
            strike_price: Some(dec!(100)),
            time_periods: Some(4),
            ..reference_config()
        };
        let model = BinomialModel::from_config(&config).unwrap();
        assert!(model.warnings().iter().any(|w| w.contains("outside [0, 1]")));
    }

    #[test]
    fn test_layer_shapes_and_unset_values() {
        let model = BinomialModel::from_config(&reference_config()).unwrap();
        let bv = model.layer(LatticeLayer::ContinuationValue);
        assert_eq!(bv.len(), 3);
        assert_eq!(bv[0], vec![Some(dec!(7.16)), Some(dec!(16.11)), None]);
        assert_eq!(bv[1], vec![Some(dec!(0)), None]);
        assert_eq!(bv[2], vec![None]);

        let xv = model.layer(LatticeLayer::ExerciseValue);
        assert_eq!(xv[0], vec![None, None, Some(dec!(36.25))]);
    }

    #[test]
    fn test_revalue_keeps_root_value() {
        let mut model = BinomialModel::from_config(&reference_config()).unwrap();
        let before = model.present_value();
        assert_eq!(model.revalue().unwrap(), before);
    }

    #[test]
    fn test_price_binomial_option_envelope() {
        let out = price_binomial_option(&reference_config(), &[LatticeLayer::Spot]).unwrap();
        assert_eq!(out.result.present_value, dec!(7.16));
        assert_eq!(out.result.node_count, 6);
        assert_eq!(out.result.terminal_node_count, 3);
        assert_eq!(out.assumptions["option_kind"], "CALL");
        let spot = &out.result.lattice.as_ref().unwrap()[&LatticeLayer::Spot];
        assert_eq!(spot[0][2], Some(dec!(156.25)));
        assert_eq!(out.metadata.precision, "rust_decimal_128bit");
    }

    #[test]
    fn test_lattice_layer_output() {
        let out = lattice_layer(&reference_config(), LatticeLayer::OptionValue).unwrap();
        assert_eq!(out.result.rows[0][0], Some(dec!(7.16)));
        assert_eq!(out.result.rows[2][0], Some(Decimal::ZERO));
    }
}
