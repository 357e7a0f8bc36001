use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use vc_tools_core::fund_fees::schedule::{
    compute_fund_fees, CarryBasis, FeeBasis, FeeType, FundFeeInput,
};
use vc_tools_core::fund_fees::sensitivity::{net_tvpi_sensitivity, FeeSensitivityInput, TvpiRange};
use vc_tools_core::fund_fees::waterfall::BarKind;
use vc_tools_core::fund_fees::presets;
use vc_tools_core::VcToolsError;

fn approx_eq(a: Decimal, b: Decimal) -> bool {
    (a - b).abs() < dec!(0.000000001)
}

fn all_presets() -> Vec<FundFeeInput> {
    presets::PRESET_NAMES
        .iter()
        .filter_map(|name| presets::by_name(name))
        .collect()
}

// ===========================================================================
// Fee schedule
// ===========================================================================

#[test]
fn test_standard_preset_scenario() {
    let out = compute_fund_fees(&presets::standard()).unwrap();
    let r = &out.result;

    // 10 years x (100 x 2%)
    assert_eq!(r.total_fees, dec!(20));
    assert_eq!(r.invested_capital, dec!(80));
    // 80 x 2.5
    assert_eq!(r.gross_proceeds, dec!(200));
    assert_eq!(r.years.len(), 10);
    assert!(out.warnings.is_empty());
}

#[test]
fn test_fee_sum_equals_total_for_every_preset() {
    for input in all_presets() {
        let r = compute_fund_fees(&input).unwrap().result;
        let sum: Decimal = r.years.iter().map(|y| y.mgmt_fee).sum();
        assert!(approx_eq(sum, r.total_fees), "fee sum mismatch for {:?}", input);
        assert!(approx_eq(r.net_tvpi, r.net_to_lps / input.fund_size));
        assert!(approx_eq(r.fee_drag, input.gross_tvpi - r.net_tvpi));
    }
}

#[test]
fn test_flat_committed_rate_fee() {
    let input = FundFeeInput {
        fee_rate: dec!(0.025),
        post_fee_rate: dec!(0.01),
        step_down: false,
        ..presets::standard()
    };
    let r = compute_fund_fees(&input).unwrap().result;
    for year in &r.years {
        assert_eq!(year.mgmt_fee, dec!(2.5));
    }
}

#[test]
fn test_step_down_to_committed_post_rate() {
    let input = FundFeeInput {
        step_down: true,
        post_fee_rate: dec!(0.01),
        ..presets::standard()
    };
    let r = compute_fund_fees(&input).unwrap().result;
    assert_eq!(r.years[4].mgmt_fee, dec!(2));
    assert_eq!(r.years[5].mgmt_fee, dec!(1));
    // 5 x 2 + 5 x 1
    assert_eq!(r.total_fees, dec!(15));
}

#[test]
fn test_budget_fee_type() {
    let input = FundFeeInput {
        fee_type: FeeType::Budget,
        total_budget: dec!(3),
        budget_growth_rate: Decimal::ZERO,
        other_funds_aum: Decimal::ZERO,
        ..presets::standard()
    };
    let r = compute_fund_fees(&input).unwrap().result;
    assert_eq!(r.total_fees, dec!(30));
}

#[test]
fn test_cumulative_fields_monotonic() {
    let r = compute_fund_fees(&presets::founder_friendly()).unwrap().result;
    for pair in r.years.windows(2) {
        assert!(pair[1].cumul_fees >= pair[0].cumul_fees);
        assert!(pair[1].cumul_dist >= pair[0].cumul_dist);
        assert!(pair[1].cumul_carry >= pair[0].cumul_carry);
    }
    let last = r.years.last().unwrap();
    assert!(approx_eq(last.cumul_dist, r.gross_proceeds));
    assert!(approx_eq(last.cumul_carry, r.total_carry));
}

#[test]
fn test_invested_basis_fee_declines_after_period() {
    let r = compute_fund_fees(&presets::founder_friendly()).unwrap().result;
    let post: Vec<Decimal> = r.years[4..].iter().map(|y| y.mgmt_fee).collect();
    for pair in post.windows(2) {
        assert!(pair[1] < pair[0]);
    }
}

// ===========================================================================
// Carry
// ===========================================================================

#[test]
fn test_no_hurdle_whole_fund_carry_formula() {
    let input = presets::no_hurdle();
    let r = compute_fund_fees(&input).unwrap().result;
    let expected = (r.gross_proceeds - input.fund_size).max(Decimal::ZERO) * input.carry_rate;
    assert_eq!(r.total_carry, expected);
    assert_eq!(r.hurdle_amount, Decimal::ZERO);
}

#[test]
fn test_hurdle_reduces_carry() {
    let with_hurdle = compute_fund_fees(&presets::standard()).unwrap().result;
    let without = compute_fund_fees(&FundFeeInput {
        hurdle_rate: Decimal::ZERO,
        ..presets::standard()
    })
    .unwrap()
    .result;
    assert!(with_hurdle.total_carry < without.total_carry);
    assert!(with_hurdle.hurdle_amount > Decimal::ZERO);
}

#[test]
fn test_out_of_the_money_fund_pays_no_carry() {
    let input = FundFeeInput {
        gross_tvpi: dec!(1.0),
        ..presets::standard()
    };
    let r = compute_fund_fees(&input).unwrap().result;
    assert_eq!(r.total_carry, Decimal::ZERO);
}

#[test]
fn test_top_tier_clawback_is_reported_not_netted() {
    let out = compute_fund_fees(&presets::top_tier()).unwrap();
    let r = &out.result;
    assert!(r.deal_by_deal_carry > r.whole_fund_carry);
    assert_eq!(r.clawback, r.deal_by_deal_carry - r.whole_fund_carry);
    assert_eq!(r.total_carry, r.whole_fund_carry);
    assert!(out.warnings.iter().any(|w| w.contains("clawback")));
    assert!(r
        .waterfall
        .iter()
        .any(|b| b.label == "Clawback" && b.kind == BarKind::Add));
}

#[test]
fn test_whole_fund_basis_has_no_clawback() {
    let input = FundFeeInput {
        carry_basis: CarryBasis::WholeFund,
        ..presets::top_tier()
    };
    let r = compute_fund_fees(&input).unwrap().result;
    assert_eq!(r.deal_by_deal_carry, Decimal::ZERO);
    assert_eq!(r.clawback, Decimal::ZERO);
}

// ===========================================================================
// Edge cases
// ===========================================================================

#[test]
fn test_short_fund_life_still_distributes() {
    let input = FundFeeInput {
        fund_life: 2,
        investment_period: 5,
        ..presets::standard()
    };
    let out = compute_fund_fees(&input).unwrap();
    assert_eq!(out.result.years.len(), 2);
    assert!(out.result.years[1].distribution > Decimal::ZERO);
    assert!(!out.warnings.is_empty());
}

#[test]
fn test_fees_exceeding_commitments_propagate() {
    let input = FundFeeInput {
        fee_rate: dec!(0.15),
        fee_basis: FeeBasis::Committed,
        ..presets::standard()
    };
    let out = compute_fund_fees(&input).unwrap();
    assert_eq!(out.result.invested_capital, dec!(-50));
    assert!(out.result.gross_proceeds < Decimal::ZERO);
}

#[test]
fn test_zero_fund_size_rejected() {
    let input = FundFeeInput {
        fund_size: Decimal::ZERO,
        ..presets::standard()
    };
    match compute_fund_fees(&input) {
        Err(VcToolsError::InvalidInput { field, .. }) => assert_eq!(field, "fund_size"),
        other => panic!("expected InvalidInput, got {other:?}"),
    }
}

// ===========================================================================
// Sensitivity
// ===========================================================================

#[test]
fn test_sensitivity_matches_point_model() {
    let fund = presets::founder_friendly();
    let points = net_tvpi_sensitivity(&FeeSensitivityInput {
        fund: fund.clone(),
        range: TvpiRange {
            min: dec!(1.0),
            max: dec!(3.0),
            step: dec!(0.5),
        },
    })
    .unwrap()
    .result;
    assert_eq!(points.len(), 5);
    for p in &points {
        let single = compute_fund_fees(&FundFeeInput {
            gross_tvpi: p.gross_tvpi,
            ..fund.clone()
        })
        .unwrap()
        .result;
        assert_eq!(p.net_tvpi, single.net_tvpi);
    }
}

#[test]
fn test_sensitivity_rejects_unbounded_sweep() {
    let input = FeeSensitivityInput {
        fund: presets::standard(),
        range: TvpiRange {
            min: Decimal::ZERO,
            max: dec!(5),
            step: dec!(0.00000000000000000001),
        },
    };
    match net_tvpi_sensitivity(&input) {
        Err(VcToolsError::InvalidInput { field, .. }) => assert_eq!(field, "range.step"),
        other => panic!("expected InvalidInput, got {other:?}"),
    }
}

#[test]
fn test_sensitivity_rejects_inverted_range() {
    let input = FeeSensitivityInput {
        fund: presets::standard(),
        range: TvpiRange {
            min: dec!(3),
            max: dec!(1),
            step: dec!(0.5),
        },
    };
    assert!(matches!(
        net_tvpi_sensitivity(&input),
        Err(VcToolsError::InvalidInput { .. })
    ));
}
