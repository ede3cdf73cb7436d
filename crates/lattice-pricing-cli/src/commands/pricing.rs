use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use lattice_pricing_core::lattice::config::ModelConfig;
use lattice_pricing_core::lattice::factors;
use lattice_pricing_core::lattice::model;
use lattice_pricing_core::lattice::node::LatticeLayer;

use crate::input;

/// Model inputs shared by `price` and `lattice`
#[derive(Args, Debug)]
#[command(allow_hyphen_values = true)]
pub struct ModelArgs {
    /// Option type: CALL or PUT (case-insensitive)
    #[arg(long)]
    pub option_type: Option<String>,

    /// Exercise style: AMERICAN or EUROPEAN (case-insensitive)
    #[arg(long)]
    pub option_style: Option<String>,

    /// Starting price of the underlying
    #[arg(long, alias = "spot")]
    pub stock_price: Option<Decimal>,

    /// Strike price
    #[arg(long, alias = "strike")]
    pub strike_price: Option<Decimal>,

    /// Risk-free rate per period (e.g. 0.0009)
    #[arg(long, alias = "rate")]
    pub risk_free_interest_rate: Option<Decimal>,

    /// Up-move factor per period (e.g. 1.25)
    #[arg(long)]
    pub up_factor: Option<Decimal>,

    /// Down-move factor per period (e.g. 0.80)
    #[arg(long)]
    pub down_factor: Option<Decimal>,

    /// Volatility, used to derive CRR factors when up/down factors are absent
    #[arg(long)]
    pub volatility: Option<Decimal>,

    /// Total horizon T
    #[arg(long)]
    pub horizon: Option<Decimal>,

    /// Number of lattice steps
    #[arg(long, alias = "periods")]
    pub time_periods: Option<u32>,

    /// Path to JSON or YAML input file (individual flags override its values)
    #[arg(long)]
    pub input: Option<String>,
}

impl ModelArgs {
    #[cfg(test)]
    fn empty() -> Self {
        ModelArgs {
            option_type: None,
            option_style: None,
            stock_price: None,
            strike_price: None,
            risk_free_interest_rate: None,
            up_factor: None,
            down_factor: None,
            volatility: None,
            horizon: None,
            time_periods: None,
            input: None,
        }
    }

    fn flags(&self) -> ModelConfig {
        ModelConfig {
            option_type: self.option_type.clone(),
            option_style: self.option_style.clone(),
            stock_price: self.stock_price,
            strike_price: self.strike_price,
            risk_free_interest_rate: self.risk_free_interest_rate,
            up_factor: self.up_factor,
            down_factor: self.down_factor,
            volatility: self.volatility,
            horizon: self.horizon,
            time_periods: self.time_periods,
        }
    }

    /// File (or piped stdin when no flags are given), overlaid with flags.
    pub fn resolve(&self) -> Result<ModelConfig, Box<dyn std::error::Error>> {
        let flags = self.flags();
        let mut config: ModelConfig = if let Some(ref path) = self.input {
            input::file::read_config(path)?
        } else if flags == ModelConfig::default() {
            input::stdin::read_stdin()?.ok_or(
                "--input <file>, stdin, or model flags (--stock-price, --strike-price, ...) required",
            )?
        } else {
            ModelConfig::default()
        };
        config.overlay(flags);
        Ok(config)
    }
}

/// Arguments for option pricing
#[derive(Args)]
pub struct PriceArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Include a lattice layer in the result: spot, exercise_value,
    /// continuation_value or option_value (repeatable)
    #[arg(long = "show-lattice", value_name = "LAYER")]
    pub show_lattice: Vec<LatticeLayer>,
}

pub fn run_price(args: PriceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let config = args.model.resolve()?;
    let result = model::price_binomial_option(&config, &args.show_lattice)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for a single lattice layer dump
#[derive(Args)]
pub struct LatticeArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Layer to print: spot, exercise_value, continuation_value or option_value
    #[arg(long, default_value = "option_value")]
    pub layer: LatticeLayer,
}

pub fn run_lattice(args: LatticeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let config = args.model.resolve()?;
    let result = model::lattice_layer(&config, args.layer)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for CRR factor derivation
#[derive(Args)]
pub struct FactorsArgs {
    /// Volatility
    #[arg(long)]
    pub volatility: Decimal,

    /// Total horizon T
    #[arg(long)]
    pub horizon: Decimal,

    /// Number of lattice steps
    #[arg(long, alias = "time-periods")]
    pub periods: u32,
}

pub fn run_factors(args: FactorsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let result = factors::derive_crr_factors(args.volatility, args.horizon, args.periods)?;
    Ok(serde_json::to_value(result)?)
}
