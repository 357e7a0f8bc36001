use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::VcToolsError;
use crate::term_sheet::deal::{compute_deal_structure, round_shares, DealStructure, TermSheetInput};
use crate::types::*;
use crate::VcToolsResult;

/// Hybrid protection falls back to full ratchet at or below this fraction of
/// the original price.
const HYBRID_THRESHOLD: Rate = dec!(0.5);

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AntiDilutionMethod {
    None,
    /// Broad-based weighted average
    WeightedAverage,
    FullRatchet,
    /// Weighted average for mild down rounds, full ratchet for severe ones
    Hybrid,
}

impl AntiDilutionMethod {
    /// Resolve `Hybrid` against the round prices; other methods are returned
    /// unchanged.
    pub fn resolve(self, original_price: Money, down_price: Money) -> Self {
        match self {
            AntiDilutionMethod::Hybrid => {
                if down_price > HYBRID_THRESHOLD * original_price {
                    AntiDilutionMethod::WeightedAverage
                } else {
                    AntiDilutionMethod::FullRatchet
                }
            }
            other => other,
        }
    }
}

/// Follow-on round priced below the Series A.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DownRound {
    /// Price per share ($)
    pub price: Money,
    /// New money raised ($)
    pub investment: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AntiDilutionInput {
    pub term_sheet: TermSheetInput,
    pub down_round: DownRound,
    pub method: AntiDilutionMethod,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapTableSnapshot {
    pub founders: u64,
    pub options: u64,
    pub series_a: u64,
    pub new_investors: u64,
    pub total: u64,
    pub founder_pct: Rate,
    pub option_pct: Rate,
    pub series_a_pct: Rate,
    pub new_investor_pct: Rate,
}

impl CapTableSnapshot {
    fn new(founders: u64, options: u64, series_a: u64, new_investors: u64) -> Self {
        let total = founders + options + series_a + new_investors;
        let pct = |shares: u64| {
            if total > 0 {
                Decimal::from(shares) / Decimal::from(total)
            } else {
                Decimal::ZERO
            }
        };
        Self {
            founders,
            options,
            series_a,
            new_investors,
            total,
            founder_pct: pct(founders),
            option_pct: pct(options),
            series_a_pct: pct(series_a),
            new_investor_pct: pct(new_investors),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AntiDilutionOutput {
    pub method: AntiDilutionMethod,
    /// Never `Hybrid`
    pub resolved_method: AntiDilutionMethod,
    /// Shares sold in the down round
    pub new_shares: u64,
    /// Series A conversion price after adjustment ($)
    pub adjusted_price: Money,
    pub adjusted_series_a_shares: u64,
    /// Extra shares granted to Series A (negative if the round was not down)
    pub additional_shares: i64,
    pub before: CapTableSnapshot,
    pub without_ad: CapTableSnapshot,
    pub with_ad: CapTableSnapshot,
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Adjust the Series A share count for a down round.
pub fn compute_anti_dilution(
    deal: &DealStructure,
    down_round: &DownRound,
    method: AntiDilutionMethod,
) -> VcToolsResult<AntiDilutionOutput> {
    if down_round.price <= Decimal::ZERO {
        return Err(VcToolsError::InvalidInput {
            field: "down_round.price".into(),
            reason: "Down-round price must be positive".into(),
        });
    }
    if down_round.investment < Decimal::ZERO {
        return Err(VcToolsError::InvalidInput {
            field: "down_round.investment".into(),
            reason: "Down-round investment cannot be negative".into(),
        });
    }

    let new_shares = round_shares(down_round.investment / down_round.price, "down_round.investment")?;
    let resolved_method = method.resolve(deal.share_price, down_round.price);

    let adjusted_price = match resolved_method {
        AntiDilutionMethod::WeightedAverage => {
            let old_total = Decimal::from(deal.total_shares);
            deal.share_price * (old_total + down_round.investment / deal.share_price)
                / (old_total + Decimal::from(new_shares))
        }
        AntiDilutionMethod::FullRatchet => down_round.price,
        AntiDilutionMethod::None | AntiDilutionMethod::Hybrid => deal.share_price,
    };

    let adjusted_series_a_shares = match resolved_method {
        AntiDilutionMethod::None | AntiDilutionMethod::Hybrid => deal.shares_issued,
        _ => round_shares(deal.investment / adjusted_price, "investment")?,
    };
    let additional_shares = adjusted_series_a_shares as i64 - deal.shares_issued as i64;

    Ok(AntiDilutionOutput {
        method,
        resolved_method,
        new_shares,
        adjusted_price,
        adjusted_series_a_shares,
        additional_shares,
        before: CapTableSnapshot::new(deal.founder_shares, deal.option_pool, deal.shares_issued, 0),
        without_ad: CapTableSnapshot::new(
            deal.founder_shares,
            deal.option_pool,
            deal.shares_issued,
            new_shares,
        ),
        with_ad: CapTableSnapshot::new(
            deal.founder_shares,
            deal.option_pool,
            adjusted_series_a_shares,
            new_shares,
        ),
    })
}

/// Cap table before and after a down round, with and without protection.
pub fn analyze_anti_dilution(
    input: &AntiDilutionInput,
) -> VcToolsResult<ComputationOutput<AntiDilutionOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let deal = compute_deal_structure(&input.term_sheet)?;
    let output = compute_anti_dilution(&deal, &input.down_round, input.method)?;

    if input.down_round.price >= deal.share_price {
        warnings.push(format!(
            "Follow-on price {} is not below the Series A price {}; this is not a down round",
            input.down_round.price, deal.share_price
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Series A Anti-Dilution Adjustment",
        &serde_json::json!({
            "method": input.method,
            "resolved_method": output.resolved_method,
            "original_price": deal.share_price.to_string(),
            "down_round_price": input.down_round.price.to_string(),
            "hybrid_threshold": HYBRID_THRESHOLD.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
