//! Liquidation preference waterfall for a single Series A investor.
//!
//! The investor's preference is the invested amount plus any guaranteed
//! return and accrued cumulative dividends. At each exit value the investor
//! takes the better of its preference route and converting to common; the
//! remainder goes to common holders, so `vc_payout + common_payout` always
//! equals the exit value.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::VcToolsError;
use crate::term_sheet::deal::{compute_deal_structure, DealStructure, TermSheetInput};
use crate::time_value::compound_growth;
use crate::types::*;
use crate::VcToolsResult;

/// Exit values ($) reported in the summary table.
pub const TABLE_EXITS: [Money; 5] = [
    dec!(5000000),
    dec!(10000000),
    dec!(20000000),
    dec!(50000000),
    dec!(100000000),
];

const CURVE_START: Money = dec!(1000000);
const CURVE_END: Money = dec!(150000000);

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Participation {
    /// Preference or convert, whichever is larger.
    NonParticipating,
    /// Preference plus a pro-rata share of the remainder.
    Participating,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DividendPolicy {
    /// Dividends only when declared; none accrue to the preference.
    NonCumulative,
    /// Fixed annual dividend per share that accrues until exit.
    Cumulative {
        /// Annual dividend per Series A share ($)
        annual_dividend_per_share: Money,
        /// Accrual stops once dividends reach this fraction of the issue price
        dividend_cap_pct: Option<Rate>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LiquidationTerms {
    pub participation: Participation,
    pub dividends: DividendPolicy,
    /// Compounded annual return guaranteed on top of the investment
    pub guaranteed_return_rate: Option<Rate>,
    pub years_to_exit: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LiquidationInput {
    pub term_sheet: TermSheetInput,
    pub terms: LiquidationTerms,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Components of the Series A liquidation preference ($).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceBreakdown {
    pub investment: Money,
    pub guaranteed_return: Money,
    pub cumulative_dividends: Money,
    /// Years of dividend accrual after applying the cap
    pub effective_dividend_years: Decimal,
    /// Years until the dividend cap is reached, when a cap applies
    pub years_to_cap: Option<Decimal>,
    pub total: Money,
}

/// Split of one exit value between the investor and common.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterfallPoint {
    pub exit_value: Money,
    pub vc_payout: Money,
    pub common_payout: Money,
    /// vc_payout / exit_value
    pub vc_share: Rate,
    /// Investor is better off converting to common at this exit
    pub converts: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquidationAnalysis {
    pub deal: DealStructure,
    pub preference: PreferenceBreakdown,
    pub table: Vec<WaterfallPoint>,
    pub curve: Vec<WaterfallPoint>,
    /// Exit above which a non-participating investor converts
    pub conversion_threshold: Option<Money>,
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Break the preference into investment, guaranteed return and dividends.
pub fn preference_breakdown(deal: &DealStructure, terms: &LiquidationTerms) -> PreferenceBreakdown {
    let years = Decimal::from(terms.years_to_exit);

    let guaranteed_return = match terms.guaranteed_return_rate {
        Some(rate) => compound_growth(deal.investment, rate, terms.years_to_exit),
        None => Decimal::ZERO,
    };

    let (cumulative_dividends, effective_dividend_years, years_to_cap) = match &terms.dividends {
        DividendPolicy::Cumulative {
            annual_dividend_per_share,
            dividend_cap_pct,
        } if *annual_dividend_per_share > Decimal::ZERO => {
            let years_to_cap = dividend_cap_pct
                .map(|cap| cap * deal.share_price / *annual_dividend_per_share);
            let effective = match years_to_cap {
                Some(cap_years) => years.min(cap_years),
                None => years,
            };
            let accrued =
                Decimal::from(deal.shares_issued) * *annual_dividend_per_share * effective;
            (accrued, effective, years_to_cap)
        }
        _ => (Decimal::ZERO, Decimal::ZERO, None),
    };

    PreferenceBreakdown {
        investment: deal.investment,
        guaranteed_return,
        cumulative_dividends,
        effective_dividend_years,
        years_to_cap,
        total: deal.investment + guaranteed_return + cumulative_dividends,
    }
}

/// Split a single exit value given a precomputed preference.
pub fn liquidation_payout(
    deal: &DealStructure,
    terms: &LiquidationTerms,
    preference: Money,
    exit_value: Money,
) -> WaterfallPoint {
    let as_converted = deal.series_a_pct * exit_value;

    let (vc_payout, converts) = match terms.participation {
        Participation::NonParticipating => {
            let payout = exit_value.min(preference.max(as_converted));
            (payout, as_converted > preference)
        }
        Participation::Participating => {
            let participating = if exit_value <= preference {
                exit_value
            } else {
                preference + deal.series_a_pct * (exit_value - preference)
            };
            (participating.max(as_converted), as_converted > participating)
        }
    };

    let vc_share = if exit_value > Decimal::ZERO {
        vc_payout / exit_value
    } else {
        Decimal::ZERO
    };

    WaterfallPoint {
        exit_value,
        vc_payout,
        common_payout: exit_value - vc_payout,
        vc_share,
        converts,
    }
}

/// Exit values for the charting curve: $0.5M steps to $10M, $1M to $50M,
/// then $5M to $150M.
pub fn exit_curve() -> Vec<Money> {
    let mut exits = Vec::new();
    let mut exit = CURVE_START;
    while exit <= CURVE_END {
        exits.push(exit);
        exit += if exit < dec!(10000000) {
            dec!(500000)
        } else if exit < dec!(50000000) {
            dec!(1000000)
        } else {
            dec!(5000000)
        };
    }
    exits
}

/// Liquidation waterfall over the summary exits and the dense curve.
pub fn analyze_liquidation(
    input: &LiquidationInput,
) -> VcToolsResult<ComputationOutput<LiquidationAnalysis>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let deal = compute_deal_structure(&input.term_sheet)?;
    let terms = &input.terms;

    if let Some(rate) = terms.guaranteed_return_rate {
        if rate <= dec!(-1) {
            return Err(VcToolsError::InvalidInput {
                field: "guaranteed_return_rate".into(),
                reason: "Guaranteed return rate must be greater than -100%".into(),
            });
        }
    }
    if let DividendPolicy::Cumulative {
        annual_dividend_per_share,
        dividend_cap_pct,
    } = &terms.dividends
    {
        if *annual_dividend_per_share < Decimal::ZERO {
            return Err(VcToolsError::InvalidInput {
                field: "annual_dividend_per_share".into(),
                reason: "Dividend cannot be negative".into(),
            });
        }
        if dividend_cap_pct.is_some_and(|cap| cap < Decimal::ZERO) {
            return Err(VcToolsError::InvalidInput {
                field: "dividend_cap_pct".into(),
                reason: "Dividend cap cannot be negative".into(),
            });
        }
    }

    if terms.participation == Participation::NonParticipating
        && terms.guaranteed_return_rate.is_some()
    {
        warnings.push(
            "Guaranteed return added to a non-participating preference; it only matters below the conversion threshold"
                .into(),
        );
    }

    let preference = preference_breakdown(&deal, terms);
    let point = |exit: Money| liquidation_payout(&deal, terms, preference.total, exit);

    let table: Vec<WaterfallPoint> = TABLE_EXITS.iter().map(|&e| point(e)).collect();
    let curve: Vec<WaterfallPoint> = exit_curve().into_iter().map(point).collect();

    let conversion_threshold = match terms.participation {
        Participation::NonParticipating if deal.series_a_pct > Decimal::ZERO => {
            Some(deal.investment / deal.series_a_pct)
        }
        _ => None,
    };

    let output = LiquidationAnalysis {
        deal,
        preference,
        table,
        curve,
        conversion_threshold,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Series A Liquidation Waterfall (preference vs. as-converted)",
        &serde_json::json!({
            "participation": terms.participation,
            "dividends": terms.dividends,
            "guaranteed_return_rate": terms.guaranteed_return_rate.map(|r| r.to_string()),
            "years_to_exit": terms.years_to_exit,
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet() -> TermSheetInput {
        TermSheetInput {
            name: "Series A".into(),
            share_price: dec!(1.00),
            pre_money: dec!(8000000),
            investment: dec!(2000000),
            option_pool: 1_500_000,
            founder_shares: 6_500_000,
        }
    }

    fn non_participating() -> LiquidationTerms {
        LiquidationTerms {
            participation: Participation::NonParticipating,
            dividends: DividendPolicy::NonCumulative,
            guaranteed_return_rate: None,
            years_to_exit: 5,
        }
    }

    fn participating_cumulative() -> LiquidationTerms {
        LiquidationTerms {
            participation: Participation::Participating,
            dividends: DividendPolicy::Cumulative {
                annual_dividend_per_share: dec!(0.08),
                dividend_cap_pct: Some(dec!(0.25)),
            },
            guaranteed_return_rate: None,
            years_to_exit: 5,
        }
    }

    #[test]
    fn test_non_participating_takes_preference_then_converts() {
        let deal = compute_deal_structure(&sheet()).unwrap();
        let terms = non_participating();
        let low = liquidation_payout(&deal, &terms, dec!(2000000), dec!(5000000));
        assert_eq!(low.vc_payout, dec!(2000000));
        assert!(!low.converts);
        let high = liquidation_payout(&deal, &terms, dec!(2000000), dec!(50000000));
        assert_eq!(high.vc_payout, dec!(10000000));
        assert!(high.converts);
    }

    #[test]
    fn test_dividend_cap_limits_accrual() {
        let deal = compute_deal_structure(&sheet()).unwrap();
        let pref = preference_breakdown(&deal, &participating_cumulative());
        // cap 0.25 * $1.00 / $0.08 = 3.125 years < 5
        assert_eq!(pref.years_to_cap, Some(dec!(3.125)));
        assert_eq!(pref.effective_dividend_years, dec!(3.125));
        assert_eq!(pref.cumulative_dividends, dec!(500000));
        assert_eq!(pref.total, dec!(2500000));
    }

    #[test]
    fn test_guaranteed_return_compounds() {
        let deal = compute_deal_structure(&sheet()).unwrap();
        let terms = LiquidationTerms {
            guaranteed_return_rate: Some(dec!(0.10)),
            years_to_exit: 2,
            ..non_participating()
        };
        let pref = preference_breakdown(&deal, &terms);
        assert_eq!(pref.guaranteed_return, dec!(420000));
        assert_eq!(pref.total, dec!(2420000));
    }

    #[test]
    fn test_participating_below_preference_takes_everything() {
        let deal = compute_deal_structure(&sheet()).unwrap();
        let p = liquidation_payout(&deal, &participating_cumulative(), dec!(2500000), dec!(2000000));
        assert_eq!(p.vc_payout, dec!(2000000));
        assert_eq!(p.common_payout, Decimal::ZERO);
    }

    #[test]
    fn test_participating_above_preference() {
        let deal = compute_deal_structure(&sheet()).unwrap();
        let p = liquidation_payout(&deal, &participating_cumulative(), dec!(2500000), dec!(20000000));
        // 2.5M + 20% of 17.5M
        assert_eq!(p.vc_payout, dec!(6000000));
        assert_eq!(p.common_payout, dec!(14000000));
    }

    #[test]
    fn test_curve_shape() {
        let curve = exit_curve();
        assert_eq!(curve.first(), Some(&dec!(1000000)));
        assert_eq!(curve.last(), Some(&dec!(150000000)));
        // 18 half-million steps, 40 one-million steps, 21 five-million steps
        assert_eq!(curve.len(), 79);
    }

    #[test]
    fn test_conservation_across_curve() {
        for terms in [non_participating(), participating_cumulative()] {
            let out = analyze_liquidation(&LiquidationInput {
                term_sheet: sheet(),
                terms,
            })
            .unwrap()
            .result;
            for p in out.table.iter().chain(out.curve.iter()) {
                assert_eq!(p.vc_payout + p.common_payout, p.exit_value);
                assert!(p.common_payout >= Decimal::ZERO);
            }
        }
    }

    #[test]
    fn test_conversion_threshold() {
        let out = analyze_liquidation(&LiquidationInput {
            term_sheet: sheet(),
            terms: non_participating(),
        })
        .unwrap()
        .result;
        assert_eq!(out.conversion_threshold, Some(dec!(10000000)));
        assert_eq!(out.table.len(), 5);
    }
}
