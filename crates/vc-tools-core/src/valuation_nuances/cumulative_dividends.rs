use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::VcToolsError;
use crate::time_value::annualized_return;
use crate::types::*;
use crate::valuation_nuances::participating_preferred::{
    effective_pct, implied_valuation, non_participating_payout, participating_payout,
    preferred_deal, ImpliedValuation, PreferredDeal, EXIT_GRID,
};
use crate::valuation_nuances::vc_method::VcMethodInput;
use crate::VcToolsResult;

/// Participating preferred whose claim accrues a simple annual dividend.
/// Money in $ millions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CumulativeDividendsInput {
    pub deal: VcMethodInput,
    pub negotiated_pre_money: Money,
    /// Annual dividend as a fraction of the investment (0.10 = 10%)
    pub dividend_rate: Rate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DividendWaterfallRow {
    pub exit_value: Money,
    pub vc_with_dividends: Money,
    pub founder_with_dividends: Money,
    pub vc_non_participating: Money,
    pub founder_non_participating: Money,
    /// Participating payout on the bare investment
    pub vc_without_dividends: Money,
    pub effective_vc_pct: Rate,
    pub annualized_return: Option<Rate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CumulativeDividendsOutput {
    pub deal: PreferredDeal,
    pub accrued_dividends: Money,
    /// investment + accrued_dividends
    pub enhanced_claim: Money,
    pub waterfall: Vec<DividendWaterfallRow>,
    pub implied: ImpliedValuation,
}

/// Participating preferred with cumulative dividends over the exit grid.
pub fn cumulative_dividends(
    input: &CumulativeDividendsInput,
) -> VcToolsResult<ComputationOutput<CumulativeDividendsOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.dividend_rate < Decimal::ZERO {
        return Err(VcToolsError::InvalidInput {
            field: "dividend_rate".into(),
            reason: "Dividend rate cannot be negative".into(),
        });
    }

    let deal = preferred_deal(&input.deal, input.negotiated_pre_money)?;
    let investment = input.deal.investment;
    let years = input.deal.years_to_exit;

    // Simple accrual, not compounded
    let accrued_dividends = investment * input.dividend_rate * Decimal::from(years);
    let enhanced_claim = investment + accrued_dividends;
    let own = deal.vc_ownership;

    let waterfall: Vec<DividendWaterfallRow> = EXIT_GRID
        .iter()
        .map(|&exit| {
            let vc_with_dividends = participating_payout(exit, enhanced_claim, own);
            let vc_non_participating = non_participating_payout(exit, enhanced_claim, own);
            DividendWaterfallRow {
                exit_value: exit,
                vc_with_dividends,
                founder_with_dividends: exit - vc_with_dividends,
                vc_non_participating,
                founder_non_participating: exit - vc_non_participating,
                vc_without_dividends: participating_payout(exit, investment, own),
                effective_vc_pct: effective_pct(vc_with_dividends, exit),
                annualized_return: annualized_return(vc_with_dividends, investment, years),
            }
        })
        .collect();

    if waterfall.iter().any(|r| r.founder_non_participating < Decimal::ZERO) {
        warnings.push(format!(
            "Enhanced claim {enhanced_claim} exceeds some exit values; non-participating founder residual shown as negative"
        ));
    }

    let implied = implied_valuation(&input.deal, enhanced_claim, deal.future_company_value);
    if deal.future_company_value <= enhanced_claim {
        warnings.push(
            "Expected exit does not exceed the enhanced claim; implied ownership set to 100%".into(),
        );
    }

    let output = CumulativeDividendsOutput {
        deal,
        accrued_dividends,
        enhanced_claim,
        waterfall,
        implied,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Participating Preferred with Cumulative Dividends (simple accrual)",
        &serde_json::json!({
            "investment": investment.to_string(),
            "negotiated_pre_money": input.negotiated_pre_money.to_string(),
            "dividend_rate": input.dividend_rate.to_string(),
            "years_to_exit": years,
        }),
        warnings,
        elapsed,
        output,
    ))
}
