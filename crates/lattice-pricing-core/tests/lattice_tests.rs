use lattice_pricing_core::lattice::builder::{Lattice, NodeIndex};
use lattice_pricing_core::lattice::config::{ModelConfig, OptionKind};
use lattice_pricing_core::lattice::model::{self, BinomialModel};
use lattice_pricing_core::lattice::node::LatticeLayer;
use lattice_pricing_core::lattice::payoff::seed_terminal_layer;
use lattice_pricing_core::LatticeError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn reference_config() -> ModelConfig {
    serde_json::from_value(serde_json::json!({
        "option_style": "american",
        "option_type": "call",
        "stock_price": 100,
        "strike_price": 120,
        "volatility": 0.316,
        "risk_free_interest_rate": "0.0009",
        "up_factor": "1.25",
        "down_factor": "0.80",
        "T": 1,
        "time_periods": 2
    }))
    .unwrap()
}

// ===========================================================================
// Lattice structure
// ===========================================================================

#[test]
fn test_node_and_terminal_counts() {
    for n in [0u32, 1, 2, 5, 12] {
        let lattice = Lattice::generate(dec!(100), dec!(1.05), n).unwrap();
        let n = n as usize;
        assert_eq!(lattice.node_count(), (n + 1) * (n + 2) / 2);
        let terminal = lattice.indices().filter(|i| lattice.is_terminal(*i)).count();
        assert_eq!(terminal, n + 1);
    }
}

#[test]
fn test_terminal_prices_reference() {
    let lattice = Lattice::generate(dec!(100), dec!(1.25), 2).unwrap();
    let spots: Vec<Decimal> = lattice
        .terminal_indices()
        .iter()
        .map(|i| lattice.get(*i).unwrap().spot())
        .collect();
    assert_eq!(spots, vec![dec!(156.25), dec!(100), dec!(64)]);
}

#[test]
fn test_price_symmetry_under_factor_swap() {
    // With d = 1/u, pricing with u at (r, c) equals pricing with d at (c, r).
    let with_up = Lattice::generate(dec!(100), dec!(1.25), 3).unwrap();
    let with_down = Lattice::generate(dec!(100), dec!(0.8), 3).unwrap();
    for idx in with_up.indices() {
        let swapped = NodeIndex::new(idx.up, idx.down);
        assert_eq!(
            with_up.get(idx).unwrap().spot(),
            with_down.get(swapped).unwrap().spot(),
            "mismatch at {idx:?}"
        );
    }
}

// ===========================================================================
// Valuation
// ===========================================================================

#[test]
fn test_reference_scenario_end_to_end() {
    let model = BinomialModel::from_config(&reference_config()).unwrap();

    let xv = model.layer(LatticeLayer::ExerciseValue);
    let terminal_xv: Vec<_> = (0..=2).map(|r| xv[r][2 - r]).collect();
    assert_eq!(terminal_xv, vec![Some(dec!(36.25)), Some(dec!(0)), Some(dec!(0))]);

    let bv = model.layer(LatticeLayer::ContinuationValue);
    assert_eq!(bv[0][1], Some(dec!(16.11)));
    assert_eq!(bv[1][0], Some(dec!(0)));
    assert_eq!(model.present_value(), dec!(7.16));
}

#[test]
fn test_zero_periods_present_value_is_exercise_value() {
    let mut config = reference_config();
    config.time_periods = Some(0);
    config.strike_price = Some(dec!(95.5));
    let model = BinomialModel::from_config(&config).unwrap();
    assert_eq!(model.lattice().node_count(), 1);
    assert_eq!(model.present_value(), dec!(4.5));
    assert_eq!(model.lattice().root().exercise_value(), Some(dec!(4.5)));
}

#[test]
fn test_put_reference_lattice() {
    let mut config = reference_config();
    config.option_type = Some("Put".into());
    let model = BinomialModel::from_config(&config).unwrap();
    // XV: (0,2)=0, (1,1)=20, (2,0)=56 ; all interior nodes valued at t = 0
    // (0,1): p*0 + (1-p)*20 = 11.11 ; (1,0): p*20 + (1-p)*56 = 8.89 + 31.11 = 40.00
    // (0,0): p*11.11 + (1-p)*40 = 4.9377.. + 22.2222.. = 27.16
    let bv = model.layer(LatticeLayer::ContinuationValue);
    assert_eq!(bv[0][1], Some(dec!(11.11)));
    assert_eq!(bv[1][0], Some(dec!(40.00)));
    assert_eq!(model.present_value(), dec!(27.16));
}

#[test]
fn test_four_period_put_discounts_at_min_moves() {
    // Interior nodes (1,1), (1,2), (2,1) are probability-weighted and
    // discounted with t = 1; edge nodes with t = 0.
    let mut config = reference_config();
    config.option_type = Some("put".into());
    config.strike_price = Some(dec!(100));
    config.time_periods = Some(4);
    let model = BinomialModel::from_config(&config).unwrap();

    let bv = model.layer(LatticeLayer::ContinuationValue);
    let expected = vec![
        vec![Some(dec!(16.54)), Some(dec!(6.12)), Some(dec!(0)), Some(dec!(0)), None],
        vec![Some(dec!(24.87)), Some(dec!(11.01)), Some(dec!(0)), None],
        vec![Some(dec!(35.96)), Some(dec!(19.91)), None],
        vec![Some(dec!(48.80)), None],
        vec![None],
    ];
    assert_eq!(bv, expected);
    assert_eq!(model.present_value(), dec!(16.54));
}

#[test]
fn test_option_value_dominates_components() {
    let mut config = reference_config();
    config.time_periods = Some(6);
    config.option_type = Some("put".into());
    config.strike_price = Some(dec!(110));
    let model = BinomialModel::from_config(&config).unwrap();
    for node in model.lattice().rows().iter().flatten() {
        let ov = node.option_value().unwrap();
        assert!(ov >= node.continuation_value().unwrap_or(Decimal::ZERO));
        assert!(ov >= node.exercise_value().unwrap_or(Decimal::ZERO));
    }
}

#[test]
fn test_valuation_is_repeatable() {
    let mut config = reference_config();
    config.time_periods = Some(8);
    let first = BinomialModel::from_config(&config).unwrap();
    let second = BinomialModel::from_config(&config).unwrap();
    assert_eq!(first.present_value(), second.present_value());

    let mut lattice = Lattice::generate(dec!(100), dec!(1.25), 8).unwrap();
    let terminal = seed_terminal_layer(&mut lattice, dec!(120), OptionKind::Call).unwrap();
    assert_eq!(terminal.len(), 9);
}

#[test]
fn test_all_values_rounded_to_two_places() {
    let mut config = reference_config();
    config.time_periods = Some(7);
    config.strike_price = Some(dec!(101.37));
    let model = BinomialModel::from_config(&config).unwrap();
    for layer in [
        LatticeLayer::ExerciseValue,
        LatticeLayer::ContinuationValue,
        LatticeLayer::OptionValue,
    ] {
        for value in model.layer(layer).into_iter().flatten().flatten() {
            assert!(value.scale() <= 2, "{layer}: {value}");
        }
    }
}

// ===========================================================================
// Errors
// ===========================================================================

#[test]
fn test_equal_factors_rejected() {
    let mut config = reference_config();
    config.down_factor = config.up_factor;
    let result = model::price_binomial_option(&config, &[]);
    match result.unwrap_err() {
        LatticeError::DivisionByZero { context } => assert!(context.contains("up_factor")),
        other => panic!("Expected DivisionByZero, got {other:?}"),
    }
}

#[test]
fn test_overflowing_rate_reports_overflow() {
    let mut config = reference_config();
    config.risk_free_interest_rate = Some(Decimal::MAX);
    match BinomialModel::from_config(&config).unwrap_err() {
        LatticeError::Overflow { context } => assert!(context.contains("growth factor")),
        other => panic!("Expected Overflow, got {other:?}"),
    }
}

#[test]
fn test_overflowing_factors_report_overflow() {
    let mut config = reference_config();
    config.up_factor = Some(Decimal::MAX);
    config.down_factor = Some(Decimal::MIN);
    assert!(matches!(
        BinomialModel::from_config(&config).unwrap_err(),
        LatticeError::Overflow { .. }
    ));
}

#[test]
fn test_horizon_is_optional_with_explicit_factors() {
    let mut config = reference_config();
    config.horizon = None;
    let model = BinomialModel::from_config(&config).unwrap();
    assert_eq!(model.inputs().horizon, None);
    assert_eq!(model.present_value(), dec!(7.16));
}

#[test]
fn test_missing_time_periods_rejected() {
    let mut config = reference_config();
    config.time_periods = None;
    match model::price_binomial_option(&config, &[]).unwrap_err() {
        LatticeError::MissingField { field } => assert_eq!(field, "time_periods"),
        other => panic!("Expected MissingField, got {other:?}"),
    }
}

#[test]
fn test_unknown_style_rejected() {
    let mut config = reference_config();
    config.option_style = Some("asian".into());
    assert!(matches!(
        model::price_binomial_option(&config, &[]).unwrap_err(),
        LatticeError::UnrecognizedValue { .. }
    ));
}

#[test]
fn test_output_serializes_layers_by_name() {
    let out = model::price_binomial_option(
        &reference_config(),
        &[LatticeLayer::OptionValue, LatticeLayer::Spot],
    )
    .unwrap();
    let json = serde_json::to_value(&out).unwrap();
    assert_eq!(json["result"]["present_value"], "7.16");
    assert_eq!(json["result"]["lattice"]["spot"][0][0], "100");
    assert!(json["result"]["lattice"]["option_value"][0][0].is_string());
    assert!(json["result"]["lattice"].get("exercise_value").is_none());
}
