//! Value of warrants attached to an investment, priced on a five-period
//! binomial tree.
//!
//! The tree is a teaching simplification: the up factor is `1 + volatility`
//! and the down factor its reciprocal, with equal up/down odds and no
//! discounting. It is not a risk-neutral Cox-Ross-Rubinstein lattice.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::VcToolsError;
use crate::time_value::pow_int;
use crate::types::*;
use crate::VcToolsResult;

/// Number of periods in the tree.
pub const TREE_PERIODS: u32 = 5;

// ---------------------------------------------------------------------------
// Input / Output
// ---------------------------------------------------------------------------

/// Investment with an option grant on top. Amounts in dollars.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OptionsPricingInput {
    pub current_shares: Shares,
    /// Headline price per share ($)
    pub share_price: Money,
    /// Cash invested ($)
    pub investment: Money,
    /// Notional of the option grant at the strike ($)
    pub option_amount: Money,
    /// Strike above the share price (0.25 = 25% premium)
    pub strike_premium: Rate,
    /// Annual volatility, used directly as the up move (0.40 = 40%)
    pub volatility: Rate,
}

/// One terminal node of the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinomialNode {
    pub ups: u32,
    pub downs: u32,
    /// C(5, ups) / 2^5
    pub frequency: Rate,
    /// u^ups x d^downs
    pub multiplier: Multiple,
    pub share_value: Money,
    pub total_stock_value: Money,
    pub payoff_per_share: Money,
    pub total_payoff: Money,
    /// frequency x total_payoff
    pub weighted_payoff: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsPricingOutput {
    pub up_factor: Multiple,
    pub down_factor: Multiple,
    pub strike_price: Money,
    pub investment_shares: Shares,
    pub option_shares: Shares,
    /// Terminal nodes, all-up first
    pub nodes: Vec<BinomialNode>,
    pub expected_option_value: Money,
    /// Investment net of the option value handed over
    pub implied_investment: Money,
    pub implied_share_price: Money,
    pub implied_pre_money: Money,
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Binomial coefficient C(n, k).
pub fn binomial_coefficient(n: u32, k: u32) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k) as u64;
    let n = n as u64;
    (0..k).fold(1u64, |acc, i| acc * (n - i) / (i + 1))
}

fn validate_options_input(input: &OptionsPricingInput) -> VcToolsResult<()> {
    if input.share_price <= Decimal::ZERO {
        return Err(VcToolsError::InvalidInput {
            field: "share_price".into(),
            reason: "Share price must be positive".into(),
        });
    }
    if input.volatility <= -Decimal::ONE {
        return Err(VcToolsError::InvalidInput {
            field: "volatility".into(),
            reason: "Volatility must be greater than -100%".into(),
        });
    }
    if input.strike_premium <= -Decimal::ONE {
        return Err(VcToolsError::InvalidInput {
            field: "strike_premium".into(),
            reason: "Strike must stay above zero".into(),
        });
    }
    if input.investment <= Decimal::ZERO {
        return Err(VcToolsError::InvalidInput {
            field: "investment".into(),
            reason: "Investment must be positive".into(),
        });
    }
    Ok(())
}

/// Price the option grant and back out the investment's implied valuation.
pub fn options_pricing(
    input: &OptionsPricingInput,
) -> VcToolsResult<ComputationOutput<OptionsPricingOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_options_input(input)?;

    let up_factor = Decimal::ONE + input.volatility;
    let down_factor = Decimal::ONE / up_factor;
    let strike_price = input.share_price * (Decimal::ONE + input.strike_premium);
    let investment_shares = input.investment / input.share_price;
    let option_shares = input.option_amount / strike_price;
    let outcomes = Decimal::from(2u64.pow(TREE_PERIODS));

    let nodes: Vec<BinomialNode> = (0..=TREE_PERIODS)
        .rev()
        .map(|ups| {
            let downs = TREE_PERIODS - ups;
            let frequency = Decimal::from(binomial_coefficient(TREE_PERIODS, ups)) / outcomes;
            let multiplier = pow_int(up_factor, ups) * pow_int(down_factor, downs);
            let share_value = input.share_price * multiplier;
            let payoff_per_share = (share_value - strike_price).max(Decimal::ZERO);
            let total_payoff = payoff_per_share * option_shares;
            BinomialNode {
                ups,
                downs,
                frequency,
                multiplier,
                share_value,
                total_stock_value: share_value * option_shares,
                payoff_per_share,
                total_payoff,
                weighted_payoff: frequency * total_payoff,
            }
        })
        .collect();

    let expected_option_value: Money = nodes.iter().map(|n| n.weighted_payoff).sum();
    let implied_investment = input.investment - expected_option_value;
    let implied_share_price = implied_investment / investment_shares;
    let implied_pre_money = implied_share_price * input.current_shares;

    if implied_investment <= Decimal::ZERO {
        warnings.push(format!(
            "Expected option value {} exceeds the investment; implied valuation is not positive",
            expected_option_value.round_dp(2)
        ));
    }

    let output = OptionsPricingOutput {
        up_factor,
        down_factor,
        strike_price,
        investment_shares,
        option_shares,
        nodes,
        expected_option_value,
        implied_investment,
        implied_share_price,
        implied_pre_money,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Binomial Option Pricing (5-period, u = 1 + volatility, d = 1/u)",
        &serde_json::json!({
            "periods": TREE_PERIODS,
            "volatility": input.volatility.to_string(),
            "strike_premium": input.strike_premium.to_string(),
            "share_price": input.share_price.to_string(),
            "discounting": "none",
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
