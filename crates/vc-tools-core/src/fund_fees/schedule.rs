use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::VcToolsError;
use crate::fund_fees::waterfall::{build_waterfall, WaterfallBar};
use crate::time_value::{compound_factor, compound_growth};
use crate::types::*;
use crate::VcToolsResult;

/// First fund year in which realisations are distributed.
const DISTRIBUTION_START_YEAR: u32 = 4;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// How the annual management fee is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeeType {
    /// Percentage of the fee basis.
    Rate,
    /// Operating budget shared pro rata across the manager's funds.
    Budget,
}

/// Capital base for post-investment-period rate fees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeeBasis {
    /// Committed capital (fund size).
    Committed,
    /// Committed capital less fees charged so far.
    Invested,
}

/// Carried interest accounting basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CarryBasis {
    /// European: carry on whole-fund profit above the hurdle.
    WholeFund,
    /// American: carry per winning deal, subject to clawback.
    DealByDeal,
}

/// Input for the fund management-fee and carry model. Amounts in $ millions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FundFeeInput {
    /// Committed capital ($M)
    pub fund_size: Money,
    /// Investment period in years
    pub investment_period: u32,
    /// Fund life in years (>= 1)
    pub fund_life: u32,
    pub fee_type: FeeType,
    /// Annual fee rate during the investment period (0.02 = 2%)
    pub fee_rate: Rate,
    /// Switch to `post_fee_rate` after the investment period
    pub step_down: bool,
    /// Annual fee rate after the investment period when `step_down` is set
    pub post_fee_rate: Rate,
    pub fee_basis: FeeBasis,
    /// Year-one management company budget ($M), budget fees only
    pub total_budget: Money,
    /// Annual budget growth (0.05 = 5%)
    pub budget_growth_rate: Rate,
    /// AUM of the manager's other funds sharing the budget ($M)
    pub other_funds_aum: Money,
    /// Carried interest (0.20 = 20%)
    pub carry_rate: Rate,
    /// Annual compounding hurdle (0.08 = 8%); zero disables the hurdle
    pub hurdle_rate: Rate,
    pub carry_basis: CarryBasis,
    /// Share of invested capital in winning deals (deal-by-deal only)
    pub success_rate: Rate,
    /// Gross multiple on invested capital
    pub gross_tvpi: Multiple,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// One fund year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeYear {
    pub year: u32,
    pub mgmt_fee: Money,
    pub cumul_fees: Money,
    pub distribution: Money,
    pub carry: Money,
    pub cumul_dist: Money,
    pub cumul_carry: Money,
    /// distribution - carry - mgmt_fee
    pub net_to_lp: Money,
}

/// Full fee, carry and net-return picture for the fund.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundFeeOutput {
    pub years: Vec<FeeYear>,
    pub total_fees: Money,
    /// fund_size - total_fees; negative when fees exceed commitments
    pub invested_capital: Money,
    pub gross_proceeds: Money,
    /// gross_proceeds - fund_size
    pub total_profit: Money,
    pub hurdle_amount: Money,
    pub whole_fund_carry: Money,
    /// Carry the GP keeps (post-clawback). Always the whole-fund figure.
    pub total_carry: Money,
    /// Pre-clawback carry under deal-by-deal accounting (zero for whole-fund)
    pub deal_by_deal_carry: Money,
    pub clawback: Money,
    pub net_to_lps: Money,
    pub net_tvpi: Multiple,
    /// gross_tvpi - net_tvpi
    pub fee_drag: Multiple,
    pub waterfall: Vec<WaterfallBar>,
}

/// Carry figures before they are spread over the distribution years.
#[derive(Debug, Clone, Copy, PartialEq)]
struct CarrySplit {
    hurdle_amount: Money,
    whole_fund: Money,
    deal_by_deal: Money,
    clawback: Money,
    total: Money,
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

/// Compute the year-by-year fee schedule, carry, clawback and net LP returns.
pub fn compute_fund_fees(
    input: &FundFeeInput,
) -> VcToolsResult<ComputationOutput<FundFeeOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_fund_fee_input(input)?;

    if input.fund_life < input.investment_period {
        warnings.push(format!(
            "fund_life ({}) is shorter than investment_period ({}); post-period fees never apply",
            input.fund_life, input.investment_period
        ));
    }

    let output = fund_fee_model(input);

    if output.invested_capital < Decimal::ZERO {
        warnings.push(format!(
            "Management fees ({}) exceed committed capital ({}); invested capital is negative",
            output.total_fees, input.fund_size
        ));
    }
    if output.clawback > Decimal::ZERO {
        warnings.push(format!(
            "Deal-by-deal carry of {} exceeds whole-fund carry; GP owes a clawback of {}",
            output.deal_by_deal_carry, output.clawback
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "VC Fund Management Fees & Carried Interest",
        &serde_json::json!({
            "fund_size": input.fund_size.to_string(),
            "fund_life": input.fund_life,
            "investment_period": input.investment_period,
            "fee_type": format!("{:?}", input.fee_type),
            "fee_basis": format!("{:?}", input.fee_basis),
            "carry_basis": format!("{:?}", input.carry_basis),
            "carry_rate": input.carry_rate.to_string(),
            "hurdle_rate": input.hurdle_rate.to_string(),
            "gross_tvpi": input.gross_tvpi.to_string(),
            "distribution_start_year": DISTRIBUTION_START_YEAR.min(input.fund_life),
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Unvalidated model body, shared with the sensitivity sweep.
pub(crate) fn fund_fee_model(input: &FundFeeInput) -> FundFeeOutput {
    let fees = fee_schedule(input);
    let total_fees: Money = fees.iter().copied().sum();

    let invested_capital = input.fund_size - total_fees;
    let gross_proceeds = invested_capital * input.gross_tvpi;
    let total_profit = gross_proceeds - input.fund_size;

    let carry = compute_carry(input, invested_capital, gross_proceeds, total_profit);

    let (dist_start, total_weight) = distribution_ramp(input.fund_life);

    let mut years: Vec<FeeYear> = Vec::with_capacity(fees.len());
    let mut cumul_fees = Decimal::ZERO;
    let mut cumul_dist = Decimal::ZERO;
    let mut cumul_carry = Decimal::ZERO;

    for (idx, mgmt_fee) in fees.iter().copied().enumerate() {
        let year = idx as u32 + 1;
        cumul_fees += mgmt_fee;

        let (distribution, year_carry) = if year >= dist_start && gross_proceeds > Decimal::ZERO
        {
            let weight = Decimal::from(year - dist_start + 1) / total_weight;
            (gross_proceeds * weight, carry.total * weight)
        } else {
            (Decimal::ZERO, Decimal::ZERO)
        };
        cumul_dist += distribution;
        cumul_carry += year_carry;

        years.push(FeeYear {
            year,
            mgmt_fee,
            cumul_fees,
            distribution,
            carry: year_carry,
            cumul_dist,
            cumul_carry,
            net_to_lp: distribution - year_carry - mgmt_fee,
        });
    }

    let net_to_lps = gross_proceeds - total_fees - carry.total;
    let net_tvpi = net_to_lps / input.fund_size;
    let fee_drag = input.gross_tvpi - net_tvpi;

    let mut output = FundFeeOutput {
        years,
        total_fees,
        invested_capital,
        gross_proceeds,
        total_profit,
        hurdle_amount: carry.hurdle_amount,
        whole_fund_carry: carry.whole_fund,
        total_carry: carry.total,
        deal_by_deal_carry: carry.deal_by_deal,
        clawback: carry.clawback,
        net_to_lps,
        net_tvpi,
        fee_drag,
        waterfall: Vec::new(),
    };
    output.waterfall = build_waterfall(input.fund_size, input.carry_basis, &output);
    output
}

/// Management fee for each year 1..=fund_life.
fn fee_schedule(input: &FundFeeInput) -> Vec<Money> {
    let mut fees: Vec<Money> = Vec::with_capacity(input.fund_life as usize);
    let mut cumul_fees = Decimal::ZERO;

    for year in 1..=input.fund_life {
        let fee = match input.fee_type {
            FeeType::Budget => {
                let total_expense =
                    input.total_budget * compound_factor(input.budget_growth_rate, year - 1);
                let total_aum = input.fund_size + input.other_funds_aum;
                if total_aum > Decimal::ZERO {
                    total_expense * (input.fund_size / total_aum)
                } else {
                    Decimal::ZERO
                }
            }
            FeeType::Rate => {
                if year <= input.investment_period {
                    input.fund_size * input.fee_rate
                } else {
                    let rate = if input.step_down {
                        input.post_fee_rate
                    } else {
                        input.fee_rate
                    };
                    match input.fee_basis {
                        FeeBasis::Invested => (input.fund_size - cumul_fees) * rate,
                        FeeBasis::Committed => input.fund_size * rate,
                    }
                }
            }
        };
        cumul_fees += fee;
        fees.push(fee);
    }

    fees
}

/// First distribution year and the sum of the linear ramp weights 1..=N.
fn distribution_ramp(fund_life: u32) -> (u32, Decimal) {
    let start = DISTRIBUTION_START_YEAR.min(fund_life);
    let dist_years = fund_life.saturating_sub(start).saturating_add(1).max(1);
    let total_weight = Decimal::from(dist_years) * Decimal::from(dist_years + 1) / dec!(2);
    (start, total_weight)
}

fn compute_carry(
    input: &FundFeeInput,
    invested_capital: Money,
    gross_proceeds: Money,
    total_profit: Money,
) -> CarrySplit {
    let hurdle_amount = if input.hurdle_rate > Decimal::ZERO {
        compound_growth(input.fund_size, input.hurdle_rate, input.fund_life)
    } else {
        Decimal::ZERO
    };

    let whole_fund_carryable = (total_profit - hurdle_amount).max(Decimal::ZERO);
    let whole_fund = whole_fund_carryable * input.carry_rate;

    match input.carry_basis {
        CarryBasis::WholeFund => CarrySplit {
            hurdle_amount,
            whole_fund,
            deal_by_deal: Decimal::ZERO,
            clawback: Decimal::ZERO,
            total: whole_fund,
        },
        CarryBasis::DealByDeal => {
            let winner_cost = invested_capital * input.success_rate;
            let deal_by_deal = input.carry_rate * (gross_proceeds - winner_cost).max(Decimal::ZERO);
            let clawback = (deal_by_deal - whole_fund).max(Decimal::ZERO);
            // After clawback the GP keeps only the whole-fund figure.
            CarrySplit {
                hurdle_amount,
                whole_fund,
                deal_by_deal,
                clawback,
                total: whole_fund,
            }
        }
    }
}

pub(crate) fn validate_fund_fee_input(input: &FundFeeInput) -> VcToolsResult<()> {
    if input.fund_size <= Decimal::ZERO {
        return Err(VcToolsError::InvalidInput {
            field: "fund_size".into(),
            reason: "Fund size must be positive".into(),
        });
    }
    if input.fund_life == 0 {
        return Err(VcToolsError::InvalidInput {
            field: "fund_life".into(),
            reason: "Fund life must be at least one year".into(),
        });
    }
    for (field, value) in [
        ("fee_rate", input.fee_rate),
        ("post_fee_rate", input.post_fee_rate),
        ("total_budget", input.total_budget),
        ("budget_growth_rate", input.budget_growth_rate),
        ("other_funds_aum", input.other_funds_aum),
        ("hurdle_rate", input.hurdle_rate),
        ("gross_tvpi", input.gross_tvpi),
    ] {
        if value < Decimal::ZERO {
            return Err(VcToolsError::InvalidInput {
                field: field.into(),
                reason: "Value cannot be negative".into(),
            });
        }
    }
    for (field, value) in [
        ("carry_rate", input.carry_rate),
        ("success_rate", input.success_rate),
    ] {
        if value < Decimal::ZERO || value > Decimal::ONE {
            return Err(VcToolsError::InvalidInput {
                field: field.into(),
                reason: "Must be between 0 and 1".into(),
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
