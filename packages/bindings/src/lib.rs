use napi::Result as NapiResult;
use napi_derive::napi;

use lattice_pricing_core::lattice::config::ModelConfig;
use lattice_pricing_core::lattice::node::LatticeLayer;
use lattice_pricing_core::lattice::{factors, model};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse_layers(layers: Option<Vec<String>>) -> NapiResult<Vec<LatticeLayer>> {
    layers
        .unwrap_or_default()
        .iter()
        .map(|l| l.parse::<LatticeLayer>().map_err(to_napi_error))
        .collect()
}

#[napi]
pub fn price_binomial_option(input_json: String, layers: Option<Vec<String>>) -> NapiResult<String> {
    let config: ModelConfig = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let layers = parse_layers(layers)?;
    let output = model::price_binomial_option(&config, &layers).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn binomial_lattice_layer(input_json: String, layer: String) -> NapiResult<String> {
    let config: ModelConfig = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let layer: LatticeLayer = layer.parse().map_err(to_napi_error)?;
    let output = model::lattice_layer(&config, layer).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Decimal arguments are passed as strings to keep full precision.
#[napi]
pub fn crr_up_down_factors(volatility: String, horizon: String, periods: u32) -> NapiResult<String> {
    let volatility: rust_decimal::Decimal = volatility.parse().map_err(to_napi_error)?;
    let horizon: rust_decimal::Decimal = horizon.parse().map_err(to_napi_error)?;
    let output =
        factors::derive_crr_factors(volatility, horizon, periods).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
