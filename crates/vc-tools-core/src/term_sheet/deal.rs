use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::VcToolsError;
use crate::types::*;
use crate::VcToolsResult;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// A single priced Series A term sheet. Amounts in dollars, shares as counts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TermSheetInput {
    pub name: String,
    /// Price per Series A share ($)
    pub share_price: Money,
    /// Pre-money valuation ($)
    pub pre_money: Money,
    /// Series A investment ($)
    pub investment: Money,
    /// Shares reserved for the option pool
    pub option_pool: u64,
    pub founder_shares: u64,
}

/// Several term sheets evaluated side by side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TermSheetComparisonInput {
    pub term_sheets: Vec<TermSheetInput>,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Post-round cap table for one term sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealStructure {
    pub name: String,
    pub share_price: Money,
    pub pre_money: Money,
    pub investment: Money,
    pub shares_issued: u64,
    pub post_money: Money,
    pub option_pool: u64,
    pub founder_shares: u64,
    pub total_shares: u64,
    pub founder_pct: Rate,
    pub option_pct: Rate,
    pub series_a_pct: Rate,
    /// Founders' stake at the post-money valuation ($)
    pub founder_value: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermSheetComparison {
    pub deals: Vec<DealStructure>,
    /// Name of the term sheet that leaves founders with the most value
    pub best_for_founders: String,
    /// Name of the term sheet that leaves founders with the largest stake
    pub highest_founder_ownership: String,
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Round a non-negative share quantity to a whole count, halves away from zero.
pub(crate) fn round_shares(quantity: Decimal, field: &str) -> VcToolsResult<u64> {
    quantity
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
        .ok_or_else(|| VcToolsError::InvalidInput {
            field: field.into(),
            reason: format!("Share count {quantity} is not representable"),
        })
}

/// Build the post-round cap table for one term sheet.
pub fn compute_deal_structure(term_sheet: &TermSheetInput) -> VcToolsResult<DealStructure> {
    if term_sheet.share_price <= Decimal::ZERO {
        return Err(VcToolsError::InvalidInput {
            field: "share_price".into(),
            reason: "Share price must be positive".into(),
        });
    }
    if term_sheet.investment < Decimal::ZERO {
        return Err(VcToolsError::InvalidInput {
            field: "investment".into(),
            reason: "Investment cannot be negative".into(),
        });
    }

    let shares_issued = round_shares(term_sheet.investment / term_sheet.share_price, "investment")?;
    let total_shares = term_sheet.founder_shares + term_sheet.option_pool + shares_issued;
    if total_shares == 0 {
        return Err(VcToolsError::DivisionByZero {
            context: format!("cap table of {}", term_sheet.name),
        });
    }

    let total = Decimal::from(total_shares);
    let founder_pct = Decimal::from(term_sheet.founder_shares) / total;
    let option_pct = Decimal::from(term_sheet.option_pool) / total;
    let series_a_pct = Decimal::from(shares_issued) / total;
    let post_money = term_sheet.pre_money + term_sheet.investment;

    Ok(DealStructure {
        name: term_sheet.name.clone(),
        share_price: term_sheet.share_price,
        pre_money: term_sheet.pre_money,
        investment: term_sheet.investment,
        shares_issued,
        post_money,
        option_pool: term_sheet.option_pool,
        founder_shares: term_sheet.founder_shares,
        total_shares,
        founder_pct,
        option_pct,
        series_a_pct,
        founder_value: founder_pct * post_money,
    })
}

/// Cap tables for every term sheet, and which one founders should prefer.
pub fn compare_term_sheets(
    input: &TermSheetComparisonInput,
) -> VcToolsResult<ComputationOutput<TermSheetComparison>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.term_sheets.is_empty() {
        return Err(VcToolsError::InsufficientData(
            "At least one term sheet is required".into(),
        ));
    }

    let deals = input
        .term_sheets
        .iter()
        .map(compute_deal_structure)
        .collect::<VcToolsResult<Vec<_>>>()?;

    for deal in &deals {
        let implied_pre = deal.share_price * Decimal::from(deal.founder_shares + deal.option_pool);
        if implied_pre != deal.pre_money {
            warnings.push(format!(
                "{}: share price implies a pre-money of {} but {} was quoted",
                deal.name, implied_pre, deal.pre_money
            ));
        }
    }

    // Non-empty, checked above
    let mut best_value = &deals[0];
    let mut best_ownership = &deals[0];
    for deal in &deals[1..] {
        if deal.founder_value > best_value.founder_value {
            best_value = deal;
        }
        if deal.founder_pct > best_ownership.founder_pct {
            best_ownership = deal;
        }
    }

    let output = TermSheetComparison {
        best_for_founders: best_value.name.clone(),
        highest_founder_ownership: best_ownership.name.clone(),
        deals,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Term Sheet Comparison (post-round cap tables)",
        &serde_json::json!({
            "term_sheets": input.term_sheets.len(),
            "share_rounding": "half away from zero",
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
