//! Named fee/carry term bundles. Static data; the engine accepts any values.

use rust_decimal_macros::dec;

use crate::fund_fees::schedule::{CarryBasis, FeeBasis, FeeType, FundFeeInput};

/// Standard 2/20 with an 8% hurdle.
pub fn standard() -> FundFeeInput {
    FundFeeInput {
        fund_size: dec!(100),
        investment_period: 5,
        fund_life: 10,
        fee_type: FeeType::Rate,
        fee_rate: dec!(0.02),
        step_down: false,
        post_fee_rate: dec!(0.02),
        fee_basis: FeeBasis::Committed,
        total_budget: dec!(2.0),
        budget_growth_rate: dec!(0.05),
        other_funds_aum: dec!(0),
        carry_rate: dec!(0.20),
        hurdle_rate: dec!(0.08),
        carry_basis: CarryBasis::WholeFund,
        success_rate: dec!(0.50),
        gross_tvpi: dec!(2.5),
    }
}

/// Smaller fund with a step-down on invested capital.
pub fn founder_friendly() -> FundFeeInput {
    FundFeeInput {
        fund_size: dec!(75),
        investment_period: 4,
        step_down: true,
        post_fee_rate: dec!(0.015),
        fee_basis: FeeBasis::Invested,
        gross_tvpi: dec!(2.0),
        ..standard()
    }
}

/// Large fund, 25% deal-by-deal carry, no hurdle.
pub fn top_tier() -> FundFeeInput {
    FundFeeInput {
        fund_size: dec!(500),
        fund_life: 12,
        carry_rate: dec!(0.25),
        hurdle_rate: dec!(0),
        carry_basis: CarryBasis::DealByDeal,
        gross_tvpi: dec!(3.5),
        ..standard()
    }
}

/// 2/20 without a preferred return.
pub fn no_hurdle() -> FundFeeInput {
    FundFeeInput {
        fund_size: dec!(200),
        hurdle_rate: dec!(0),
        ..standard()
    }
}

/// Look up a preset by its CLI / UI key.
pub fn by_name(name: &str) -> Option<FundFeeInput> {
    match name {
        "standard" => Some(standard()),
        "founder-friendly" => Some(founder_friendly()),
        "top-tier" => Some(top_tier()),
        "no-hurdle" => Some(no_hurdle()),
        _ => None,
    }
}

pub const PRESET_NAMES: [&str; 4] = ["standard", "founder-friendly", "top-tier", "no-hurdle"];
