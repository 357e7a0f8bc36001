use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use vc_tools_core::j_curve::allocation::StageAllocation;
use vc_tools_core::j_curve::presets;
use vc_tools_core::j_curve::profiles::{ExitBucket, Stage};
use vc_tools_core::j_curve::simulation::{simulate_fund, BreakEven, FundSimInput, HORIZON_MONTHS};

fn approx_eq(a: Decimal, b: Decimal) -> bool {
    (a - b).abs() < dec!(0.000001)
}

fn all_presets() -> Vec<FundSimInput> {
    presets::PRESET_NAMES
        .iter()
        .filter_map(|name| presets::by_name(name))
        .collect()
}

// ===========================================================================
// Conservation
// ===========================================================================

#[test]
fn test_monthly_sums_match_totals_for_every_preset() {
    for input in all_presets() {
        let r = simulate_fund(&input).unwrap().result;
        let calls: Decimal = r.months.iter().map(|m| m.calls_out).sum();
        let dists: Decimal = r.months.iter().map(|m| m.distributions).sum();
        assert!(approx_eq(calls, r.total_invested));
        assert!(approx_eq(dists, r.total_returned));
        assert_eq!(r.months[0].cumulative, r.months[0].net_flow);
        assert_eq!(r.companies_per_stage.total(), input.num_companies);
    }
}

#[test]
fn test_cumulative_is_prefix_sum() {
    let r = simulate_fund(&presets::multi_stage()).unwrap().result;
    let mut running = Decimal::ZERO;
    for m in &r.months {
        running += m.net_flow;
        assert_eq!(m.cumulative, running);
        assert_eq!(m.net_flow, m.distributions - m.calls_out);
    }
    assert_eq!(r.months.len(), HORIZON_MONTHS);
}

// ===========================================================================
// Portfolio construction
// ===========================================================================

#[test]
fn test_company_counts_absorb_rounding() {
    let input = FundSimInput {
        num_companies: 7,
        stage_allocation: StageAllocation::new(33, 33, 34),
        ..presets::multi_stage()
    };
    let r = simulate_fund(&input).unwrap().result;
    let c = r.companies_per_stage;
    // 7 x 33% = 2.31 -> 2 for seed and A, remainder 3 to B
    assert_eq!((c.seed, c.series_a, c.series_b), (2, 2, 3));
}

#[test]
fn test_seed_only_fund_has_no_later_stage_companies() {
    let r = simulate_fund(&presets::seed_specialist()).unwrap().result;
    assert_eq!(r.companies_per_stage.get(Stage::Seed), 25);
    assert_eq!(r.companies_per_stage.get(Stage::SeriesA), 0);
    assert_eq!(r.companies_per_stage.get(Stage::SeriesB), 0);
}

#[test]
fn test_initial_checks_spread_over_deployment() {
    let r = simulate_fund(&presets::seed_specialist()).unwrap().result;
    // 25 seed checks of 500K all land inside the 48-month deployment window
    let deployment_calls: Decimal = r.months[..48].iter().map(|m| m.calls_out).sum();
    assert!(deployment_calls >= dec!(12500));
    let first_year_calls: Decimal = r.months[..12].iter().map(|m| m.calls_out).sum();
    assert!(first_year_calls > Decimal::ZERO);
}

#[test]
fn test_follow_on_share_reported() {
    let r = simulate_fund(&presets::series_a_focused()).unwrap().result;
    assert!(r.follow_on_invested > Decimal::ZERO);
    assert!(approx_eq(r.follow_on_share, r.follow_on_invested / r.total_invested));
    assert!(r.follow_on_share < Decimal::ONE);
}

#[test]
fn test_rebalanced_allocation_sums_to_hundred() {
    let alloc = StageAllocation::new(30, 45, 25).rebalance(Stage::SeriesB, 40);
    assert!((99..=101).contains(&alloc.total()));
}

// ===========================================================================
// J-curve shape
// ===========================================================================

#[test]
fn test_curve_dips_before_recovering() {
    let r = simulate_fund(&presets::growth_stage()).unwrap().result;
    assert!(r.peak_capital_call > Decimal::ZERO);
    assert!(r.trough_month > 0);
    match r.break_even {
        BreakEven::Month(m) => {
            assert!(m > r.trough_month);
            assert!(r.months[m as usize].cumulative >= Decimal::ZERO);
            assert!(r.months[m as usize - 1].cumulative < Decimal::ZERO);
        }
        BreakEven::BeyondHorizon => panic!("growth-stage fund should break even inside the horizon"),
    }
}

#[test]
fn test_worthless_exits_never_break_even() {
    let mut input = presets::growth_stage();
    for stage in [
        &mut input.profiles.seed,
        &mut input.profiles.series_a,
        &mut input.profiles.series_b,
    ] {
        stage.exit_distribution = vec![ExitBucket {
            probability: Decimal::ONE,
            multiple: Decimal::ZERO,
        }];
    }
    let r = simulate_fund(&input).unwrap().result;
    assert_eq!(r.total_returned, Decimal::ZERO);
    assert_eq!(r.expected_tvpi, Decimal::ZERO);
    assert_eq!(r.break_even, BreakEven::BeyondHorizon);
    assert_eq!(r.peak_capital_call, r.total_invested);
}

#[test]
fn test_point_in_time_dpi() {
    let r = simulate_fund(&presets::multi_stage()).unwrap().result;
    assert_eq!(r.metrics_at_years.len(), 4);
    for m in &r.metrics_at_years {
        if m.total_called > Decimal::ZERO {
            assert!(approx_eq(m.dpi, m.total_distributed / m.total_called));
        }
    }
    let at_year_12 = r.metrics_at_years.last().unwrap();
    assert!(at_year_12.total_called <= r.total_invested);
}

// ===========================================================================
// Warnings and validation
// ===========================================================================

#[test]
fn test_allocation_off_hundred_warns() {
    let input = FundSimInput {
        stage_allocation: StageAllocation::new(30, 30, 30),
        ..presets::multi_stage()
    };
    let out = simulate_fund(&input).unwrap();
    assert!(out.warnings.iter().any(|w| w.contains("allocation")));
    assert_eq!(out.result.companies_per_stage.total(), input.num_companies);
}

#[test]
fn test_probability_mismatch_warns() {
    let mut input = presets::seed_specialist();
    input.profiles.seed.exit_distribution[0].probability = dec!(0.50);
    let out = simulate_fund(&input).unwrap();
    assert!(out.warnings.iter().any(|w| w.contains("probabilities")));
}

#[test]
fn test_over_allocated_stages_rejected() {
    let input = FundSimInput {
        stage_allocation: StageAllocation::new(70, 70, 0),
        ..presets::multi_stage()
    };
    assert!(simulate_fund(&input).is_err());
}

#[test]
fn test_absurd_stage_percentages_rejected() {
    let input = FundSimInput {
        stage_allocation: StageAllocation::new(u32::MAX, u32::MAX, u32::MAX),
        ..presets::multi_stage()
    };
    assert!(simulate_fund(&input).is_err());
}
