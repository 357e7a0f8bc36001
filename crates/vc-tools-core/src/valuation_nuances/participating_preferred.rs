//! Participating vs. non-participating preferred at a negotiated pre-money.
//!
//! Money in $ millions. The non-participating column follows the usual
//! "greater of preference or conversion" rule without capping at the exit,
//! so founders show a negative residual at exits below the preference.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::VcToolsError;
use crate::time_value::{annualized_return, future_value};
use crate::types::*;
use crate::valuation_nuances::vc_method::{future_company_value, validate_vc_input, VcMethodInput};
use crate::VcToolsResult;

/// Exit values ($M) at which the waterfall is tabulated.
pub const EXIT_GRID: [Money; 16] = [
    dec!(3),
    dec!(5),
    dec!(10),
    dec!(15),
    dec!(20),
    dec!(30),
    dec!(40),
    dec!(50),
    dec!(54),
    dec!(75),
    dec!(100),
    dec!(200),
    dec!(500),
    dec!(1000),
    dec!(5000),
    dec!(10000),
];

// ---------------------------------------------------------------------------
// Input / Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticipatingPreferredInput {
    pub deal: VcMethodInput,
    /// Pre-money agreed with the investor ($M)
    pub negotiated_pre_money: Money,
}

/// Cap table at the negotiated pre-money.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferredDeal {
    pub pre_money: Money,
    pub post_money: Money,
    /// $ per share
    pub share_price: Money,
    pub vc_shares: Shares,
    pub total_shares: Shares,
    pub vc_ownership: Rate,
    pub future_company_value: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferredWaterfallRow {
    pub exit_value: Money,
    pub vc_participating: Money,
    pub founder_participating: Money,
    pub vc_non_participating: Money,
    pub founder_non_participating: Money,
    /// vc_participating / exit_value
    pub effective_vc_pct: Rate,
    /// Annualised return on the participating payout
    pub annualized_return: Option<Rate>,
}

/// Ownership the investor must be given so that participating preferred
/// meets its required return at the expected exit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpliedValuation {
    pub target_vc_payout: Money,
    pub implied_ownership: Rate,
    pub implied_post_money: Money,
    pub implied_pre_money: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipatingPreferredOutput {
    pub deal: PreferredDeal,
    pub waterfall: Vec<PreferredWaterfallRow>,
    /// Exit above which non-participating preferred converts
    pub conversion_threshold: Option<Money>,
    pub implied: ImpliedValuation,
}

// ---------------------------------------------------------------------------
// Shared building blocks
// ---------------------------------------------------------------------------

pub(crate) fn preferred_deal(
    deal: &VcMethodInput,
    pre_money: Money,
) -> VcToolsResult<PreferredDeal> {
    validate_vc_input(deal)?;
    if pre_money <= Decimal::ZERO {
        return Err(VcToolsError::InvalidInput {
            field: "negotiated_pre_money".into(),
            reason: "Negotiated pre-money must be positive".into(),
        });
    }

    let share_price = pre_money / (deal.current_shares / MILLION);
    let vc_shares = deal.investment / share_price * MILLION;
    let total_shares = deal.current_shares + vc_shares;

    Ok(PreferredDeal {
        pre_money,
        post_money: pre_money + deal.investment,
        share_price,
        vc_shares,
        total_shares,
        vc_ownership: vc_shares / total_shares,
        future_company_value: future_company_value(deal),
    })
}

/// Preference of `claim` plus pro-rata participation in the rest.
pub(crate) fn participating_payout(exit: Money, claim: Money, ownership: Rate) -> Money {
    if exit <= claim {
        exit
    } else {
        claim + (exit - claim) * ownership
    }
}

/// Greater of the claim and conversion. Not capped at the exit.
pub(crate) fn non_participating_payout(exit: Money, claim: Money, ownership: Rate) -> Money {
    claim.max(exit * ownership)
}

pub(crate) fn effective_pct(vc_payout: Money, exit: Money) -> Rate {
    if exit > Decimal::ZERO {
        vc_payout / exit
    } else {
        Decimal::ZERO
    }
}

/// Solve `claim + (fcv - claim) x own = target` for the ownership, then
/// price the round from it.
pub(crate) fn implied_valuation(deal: &VcMethodInput, claim: Money, fcv: Money) -> ImpliedValuation {
    let target_vc_payout = future_value(deal.investment, deal.required_return, deal.years_to_exit);
    let implied_ownership = if fcv > claim {
        (target_vc_payout - claim) / (fcv - claim)
    } else {
        Decimal::ONE
    };
    let implied_post_money = if implied_ownership > Decimal::ZERO {
        deal.investment / implied_ownership
    } else {
        Decimal::ZERO
    };
    ImpliedValuation {
        target_vc_payout,
        implied_ownership,
        implied_post_money,
        implied_pre_money: implied_post_money - deal.investment,
    }
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Participating vs. non-participating payouts over the exit grid.
pub fn participating_preferred(
    input: &ParticipatingPreferredInput,
) -> VcToolsResult<ComputationOutput<ParticipatingPreferredOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let deal = preferred_deal(&input.deal, input.negotiated_pre_money)?;
    let investment = input.deal.investment;
    let years = input.deal.years_to_exit;

    let waterfall: Vec<PreferredWaterfallRow> = EXIT_GRID
        .iter()
        .map(|&exit| {
            let vc_participating = participating_payout(exit, investment, deal.vc_ownership);
            let vc_non_participating = non_participating_payout(exit, investment, deal.vc_ownership);
            PreferredWaterfallRow {
                exit_value: exit,
                vc_participating,
                founder_participating: exit - vc_participating,
                vc_non_participating,
                founder_non_participating: exit - vc_non_participating,
                effective_vc_pct: effective_pct(vc_participating, exit),
                annualized_return: annualized_return(vc_participating, investment, years),
            }
        })
        .collect();

    if waterfall.iter().any(|r| r.founder_non_participating < Decimal::ZERO) {
        warnings.push(
            "Non-participating preference exceeds some exit values; founder residual shown as negative"
                .into(),
        );
    }

    let implied = implied_valuation(&input.deal, investment, deal.future_company_value);
    if deal.future_company_value <= investment {
        warnings.push("Expected exit does not exceed the investment; implied ownership set to 100%".into());
    }

    let conversion_threshold = (deal.vc_ownership > Decimal::ZERO).then(|| investment / deal.vc_ownership);

    let output = ParticipatingPreferredOutput {
        deal,
        waterfall,
        conversion_threshold,
        implied,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Participating Preferred Waterfall",
        &serde_json::json!({
            "investment": investment.to_string(),
            "negotiated_pre_money": input.negotiated_pre_money.to_string(),
            "required_return": input.deal.required_return.to_string(),
            "years_to_exit": years,
            "exit_grid_points": EXIT_GRID.len(),
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

    fn approx_eq(a: Decimal, b: Decimal) -> bool {
        (a - b).abs() < dec!(0.000001)
    }

    fn sample() -> ParticipatingPreferredInput {
        ParticipatingPreferredInput {
            deal: VcMethodInput {
                investment: dec!(3),
                net_income: dec!(3),
                pe_multiple: dec!(18),
                required_return: dec!(0.40),
                years_to_exit: 5,
                current_shares: dec!(1000000),
                alternative_return: None,
            },
            negotiated_pre_money: dec!(7),
        }
    }

    #[test]
    fn test_deal_at_negotiated_pre_money() {
        let out = participating_preferred(&sample()).unwrap().result;
        assert_eq!(out.deal.post_money, dec!(10));
        assert_eq!(out.deal.share_price, dec!(7));
        assert!(approx_eq(out.deal.vc_ownership, dec!(0.3)));
    }

    #[test]
    fn test_participating_waterfall() {
        let out = participating_preferred(&sample()).unwrap().result;
        assert_eq!(out.waterfall.len(), 16);
        let at_3 = &out.waterfall[0];
        assert_eq!(at_3.vc_participating, dec!(3));
        assert_eq!(at_3.founder_participating, Decimal::ZERO);
        let at_54 = out.waterfall.iter().find(|r| r.exit_value == dec!(54)).unwrap();
        // 3 + 51 * 0.3
        assert!(approx_eq(at_54.vc_participating, dec!(18.3)));
        for r in &out.waterfall {
            assert_eq!(r.vc_participating + r.founder_participating, r.exit_value);
            assert!(r.vc_participating >= r.vc_non_participating || r.exit_value <= dec!(3));
        }
    }

    #[test]
    fn test_conversion_threshold() {
        let out = participating_preferred(&sample()).unwrap().result;
        assert!(approx_eq(out.conversion_threshold.unwrap(), dec!(10)));
    }

    #[test]
    fn test_implied_pre_money() {
        let out = participating_preferred(&sample()).unwrap().result;
        // (16.13472 - 3) / (54 - 3)
        assert!(approx_eq(out.implied.implied_ownership, dec!(13.13472) / dec!(51)));
        assert!(approx_eq(
            out.implied.implied_pre_money,
            out.implied.implied_post_money - dec!(3)
        ));
    }

    #[test]
    fn test_annualized_return_at_expected_exit() {
        let out = participating_preferred(&sample()).unwrap().result;
        let at_5 = &out.waterfall[1];
        // participating payout 3 + 2*0.3 = 3.6 over 5 years
        let r = at_5.annualized_return.unwrap();
        assert!(r > Decimal::ZERO && r < dec!(0.05));
    }

    #[test]
    fn test_non_positive_pre_money_rejected() {
        let mut input = sample();
        input.negotiated_pre_money = Decimal::ZERO;
        assert!(participating_preferred(&input).is_err());
    }
}
