//! Venture Capital Method: back out today's valuation from a target exit
//! value and the investor's required return.
//!
//! Valuations are in $ millions; share prices in dollars per share
//! (`$M / (shares / 1e6)`).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::VcToolsError;
use crate::time_value::future_value;
use crate::types::*;
use crate::VcToolsResult;

// ---------------------------------------------------------------------------
// Input / Output
// ---------------------------------------------------------------------------

/// Deal inputs shared by the VC Method family of tools.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VcMethodInput {
    /// Investment ($M)
    pub investment: Money,
    /// Net income in the exit year ($M)
    pub net_income: Money,
    pub pe_multiple: Multiple,
    /// Investor's required annual return (0.40 = 40%)
    pub required_return: Rate,
    pub years_to_exit: u32,
    /// Shares outstanding before the round
    pub current_shares: Shares,
    /// Second required return to price side by side
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternative_return: Option<Rate>,
}

/// Valuation implied by one required return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VcValuation {
    pub required_return: Rate,
    /// net_income x P/E ($M)
    pub future_company_value: Money,
    /// Investment grown at the required return ($M)
    pub future_investment_value: Money,
    /// Ownership needed at exit
    pub required_stake: Rate,
    pub post_money: Money,
    pub pre_money: Money,
    /// $ per share
    pub share_price: Money,
    pub new_shares: Shares,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VcMethodOutput {
    pub valuation: VcValuation,
    pub alternative: Option<VcValuation>,
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Exit value of the company: net income x P/E.
pub(crate) fn future_company_value(input: &VcMethodInput) -> Money {
    input.net_income * input.pe_multiple
}

/// Ownership at exit needed to earn `rate` on the investment.
pub(crate) fn required_stake(input: &VcMethodInput, rate: Rate) -> VcToolsResult<Rate> {
    let fcv = future_company_value(input);
    if fcv <= Decimal::ZERO {
        return Err(VcToolsError::InvalidInput {
            field: "net_income".into(),
            reason: "Future company value (net income x P/E) must be positive".into(),
        });
    }
    Ok(future_value(input.investment, rate, input.years_to_exit) / fcv)
}

pub(crate) fn validate_vc_input(input: &VcMethodInput) -> VcToolsResult<()> {
    if input.investment <= Decimal::ZERO {
        return Err(VcToolsError::InvalidInput {
            field: "investment".into(),
            reason: "Investment must be positive".into(),
        });
    }
    if input.current_shares <= Decimal::ZERO {
        return Err(VcToolsError::InvalidInput {
            field: "current_shares".into(),
            reason: "Current shares must be positive".into(),
        });
    }
    if input.required_return <= -Decimal::ONE {
        return Err(VcToolsError::InvalidInput {
            field: "required_return".into(),
            reason: "Required return must be greater than -100%".into(),
        });
    }
    if let Some(rate) = input.alternative_return {
        if rate <= -Decimal::ONE {
            return Err(VcToolsError::InvalidInput {
                field: "alternative_return".into(),
                reason: "Alternative return must be greater than -100%".into(),
            });
        }
    }
    Ok(())
}

fn value_at(input: &VcMethodInput, rate: Rate) -> VcToolsResult<VcValuation> {
    let future_company_value = future_company_value(input);
    let stake = required_stake(input, rate)?;
    let future_investment_value = future_value(input.investment, rate, input.years_to_exit);
    if stake >= Decimal::ONE {
        return Err(VcToolsError::FinancialImpossibility(format!(
            "A {rate} required return needs {stake} of the company at exit; the deal cannot be priced"
        )));
    }
    if stake <= Decimal::ZERO {
        return Err(VcToolsError::FinancialImpossibility(format!(
            "A {rate} required return needs no stake at exit; the deal cannot be priced"
        )));
    }

    let post_money = input.investment / stake;
    let pre_money = post_money - input.investment;
    let share_price = pre_money / (input.current_shares / MILLION);
    let new_shares = input.investment / share_price * MILLION;

    Ok(VcValuation {
        required_return: rate,
        future_company_value,
        future_investment_value,
        required_stake: stake,
        post_money,
        pre_money,
        share_price,
        new_shares,
    })
}

/// Price the round with the VC Method, optionally at a second required return.
pub fn vc_method(input: &VcMethodInput) -> VcToolsResult<ComputationOutput<VcMethodOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_vc_input(input)?;

    let valuation = value_at(input, input.required_return)?;
    let alternative = input
        .alternative_return
        .map(|rate| value_at(input, rate))
        .transpose()?;

    if valuation.required_stake > Decimal::new(5, 1) {
        warnings.push(format!(
            "Investor needs {} of the company; founders lose control",
            valuation.required_stake.round_dp(4)
        ));
    }

    let output = VcMethodOutput {
        valuation,
        alternative,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Venture Capital Method (exit value discounted at required return)",
        &serde_json::json!({
            "investment": input.investment.to_string(),
            "net_income": input.net_income.to_string(),
            "pe_multiple": input.pe_multiple.to_string(),
            "required_return": input.required_return.to_string(),
            "years_to_exit": input.years_to_exit,
            "current_shares": input.current_shares.to_string(),
            "units": "$M, share price in $",
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
