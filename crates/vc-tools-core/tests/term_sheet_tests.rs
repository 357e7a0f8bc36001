use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use vc_tools_core::term_sheet::anti_dilution::{
    analyze_anti_dilution, compute_anti_dilution, AntiDilutionInput, AntiDilutionMethod, DownRound,
};
use vc_tools_core::term_sheet::deal::{
    compare_term_sheets, compute_deal_structure, TermSheetComparisonInput, TermSheetInput,
};
use vc_tools_core::term_sheet::liquidation::{
    analyze_liquidation, liquidation_payout, preference_breakdown, DividendPolicy, LiquidationInput,
    LiquidationTerms, Participation,
};

fn sheet_a() -> TermSheetInput {
    TermSheetInput {
        name: "Sheet A".into(),
        share_price: dec!(1.00),
        pre_money: dec!(8_000_000),
        investment: dec!(2_000_000),
        option_pool: 1_500_000,
        founder_shares: 6_500_000,
    }
}

fn sheet_b() -> TermSheetInput {
    TermSheetInput {
        name: "Sheet B".into(),
        share_price: dec!(0.80),
        pre_money: dec!(6_400_000),
        investment: dec!(2_500_000),
        option_pool: 1_500_000,
        founder_shares: 6_500_000,
    }
}

fn participating_terms() -> LiquidationTerms {
    LiquidationTerms {
        participation: Participation::Participating,
        dividends: DividendPolicy::Cumulative {
            annual_dividend_per_share: dec!(0.08),
            dividend_cap_pct: Some(dec!(0.30)),
        },
        guaranteed_return_rate: Some(dec!(0.05)),
        years_to_exit: 5,
    }
}

// ===========================================================================
// Deal structure
// ===========================================================================

#[test]
fn test_shares_issued_at_one_dollar() {
    let deal = compute_deal_structure(&sheet_a()).unwrap();
    assert_eq!(deal.shares_issued, 2_000_000);
    assert_eq!(deal.total_shares, 10_000_000);
}

#[test]
fn test_ownership_always_sums_to_one() {
    for sheet in [sheet_a(), sheet_b()] {
        let d = compute_deal_structure(&sheet).unwrap();
        let sum = d.founder_pct + d.option_pct + d.series_a_pct;
        assert!((sum - Decimal::ONE).abs() < dec!(0.000000001));
    }
}

#[test]
fn test_comparison_prefers_higher_founder_value() {
    let out = compare_term_sheets(&TermSheetComparisonInput {
        term_sheets: vec![sheet_a(), sheet_b()],
    })
    .unwrap();
    // A: 65% of 10M = 6.5M; B: 6.5/11.125 of 8.9M = 5.2M
    assert_eq!(out.result.best_for_founders, "Sheet A");
    assert!(out.warnings.is_empty());
}

// ===========================================================================
// Liquidation waterfall
// ===========================================================================

#[test]
fn test_conservation_for_all_exits_and_terms() {
    let term_variants = [
        LiquidationTerms {
            participation: Participation::NonParticipating,
            dividends: DividendPolicy::NonCumulative,
            guaranteed_return_rate: None,
            years_to_exit: 5,
        },
        participating_terms(),
        LiquidationTerms {
            dividends: DividendPolicy::Cumulative {
                annual_dividend_per_share: dec!(0.10),
                dividend_cap_pct: None,
            },
            ..participating_terms()
        },
    ];
    for terms in term_variants {
        for sheet in [sheet_a(), sheet_b()] {
            let out = analyze_liquidation(&LiquidationInput {
                term_sheet: sheet,
                terms: terms.clone(),
            })
            .unwrap()
            .result;
            for p in out.table.iter().chain(out.curve.iter()) {
                assert_eq!(p.vc_payout + p.common_payout, p.exit_value);
            }
        }
    }
}

#[test]
fn test_exit_below_preference_goes_to_vc() {
    let deal = compute_deal_structure(&sheet_a()).unwrap();
    let terms = participating_terms();
    let pref = preference_breakdown(&deal, &terms);
    for exit in [dec!(500_000), dec!(1_000_000), pref.total] {
        let p = liquidation_payout(&deal, &terms, pref.total, exit);
        assert_eq!(p.vc_payout, exit);
        assert_eq!(p.common_payout, Decimal::ZERO);
    }
}

#[test]
fn test_preference_components() {
    let deal = compute_deal_structure(&sheet_a()).unwrap();
    let pref = preference_breakdown(&deal, &participating_terms());
    // 2M x (1.05^5 - 1)
    assert_eq!(pref.guaranteed_return, dec!(2_000_000) * (dec!(1.2762815625) - Decimal::ONE));
    // cap 0.30 x $1 / $0.08 = 3.75 years
    assert_eq!(pref.effective_dividend_years, dec!(3.75));
    assert_eq!(pref.cumulative_dividends, dec!(600_000));
    assert_eq!(
        pref.total,
        pref.investment + pref.guaranteed_return + pref.cumulative_dividends
    );
}

#[test]
fn test_uncapped_dividends_run_to_exit() {
    let deal = compute_deal_structure(&sheet_a()).unwrap();
    let terms = LiquidationTerms {
        dividends: DividendPolicy::Cumulative {
            annual_dividend_per_share: dec!(0.08),
            dividend_cap_pct: None,
        },
        ..participating_terms()
    };
    let pref = preference_breakdown(&deal, &terms);
    assert_eq!(pref.years_to_cap, None);
    assert_eq!(pref.effective_dividend_years, dec!(5));
    assert_eq!(pref.cumulative_dividends, dec!(800_000));
}

#[test]
fn test_participating_never_below_as_converted() {
    let out = analyze_liquidation(&LiquidationInput {
        term_sheet: sheet_a(),
        terms: participating_terms(),
    })
    .unwrap()
    .result;
    for p in &out.curve {
        assert!(p.vc_payout >= out.deal.series_a_pct * p.exit_value);
    }
    assert_eq!(out.conversion_threshold, None);
}

// ===========================================================================
// Anti-dilution
// ===========================================================================

#[test]
fn test_none_method_changes_nothing() {
    let deal = compute_deal_structure(&sheet_a()).unwrap();
    let down = DownRound {
        price: dec!(0.40),
        investment: dec!(3_000_000),
    };
    let out = compute_anti_dilution(&deal, &down, AntiDilutionMethod::None).unwrap();
    assert_eq!(out.additional_shares, 0);
    assert_eq!(out.with_ad.series_a, out.without_ad.series_a);
}

#[test]
fn test_full_ratchet_increases_series_a_in_down_rounds() {
    let deal = compute_deal_structure(&sheet_b()).unwrap();
    for price in [dec!(0.79), dec!(0.60), dec!(0.25), dec!(0.05)] {
        let down = DownRound {
            price,
            investment: dec!(1_000_000),
        };
        let out = compute_anti_dilution(&deal, &down, AntiDilutionMethod::FullRatchet).unwrap();
        assert!(out.adjusted_series_a_shares > deal.shares_issued);
    }
}

#[test]
fn test_full_ratchet_beats_weighted_average() {
    let deal = compute_deal_structure(&sheet_a()).unwrap();
    let down = DownRound {
        price: dec!(0.70),
        investment: dec!(1_400_000),
    };
    let wa = compute_anti_dilution(&deal, &down, AntiDilutionMethod::WeightedAverage).unwrap();
    let fr = compute_anti_dilution(&deal, &down, AntiDilutionMethod::FullRatchet).unwrap();
    assert!(fr.additional_shares > wa.additional_shares);
    assert!(wa.additional_shares > 0);
}

#[test]
fn test_hybrid_follows_threshold() {
    let deal = compute_deal_structure(&sheet_a()).unwrap();
    let mild = DownRound {
        price: dec!(0.70),
        investment: dec!(1_400_000),
    };
    let severe = DownRound {
        price: dec!(0.30),
        investment: dec!(1_400_000),
    };
    let h_mild = compute_anti_dilution(&deal, &mild, AntiDilutionMethod::Hybrid).unwrap();
    let wa = compute_anti_dilution(&deal, &mild, AntiDilutionMethod::WeightedAverage).unwrap();
    assert_eq!(h_mild.resolved_method, AntiDilutionMethod::WeightedAverage);
    assert_eq!(h_mild.adjusted_series_a_shares, wa.adjusted_series_a_shares);

    let h_severe = compute_anti_dilution(&deal, &severe, AntiDilutionMethod::Hybrid).unwrap();
    assert_eq!(h_severe.resolved_method, AntiDilutionMethod::FullRatchet);
}

#[test]
fn test_total_after_includes_new_and_additional_shares() {
    let out = analyze_anti_dilution(&AntiDilutionInput {
        term_sheet: sheet_a(),
        down_round: DownRound {
            price: dec!(0.50),
            investment: dec!(1_000_000),
        },
        method: AntiDilutionMethod::WeightedAverage,
    })
    .unwrap();
    let r = &out.result;
    assert_eq!(
        r.with_ad.total as i64,
        r.before.total as i64 + r.new_shares as i64 + r.additional_shares
    );
    assert!(out.warnings.is_empty());
}
