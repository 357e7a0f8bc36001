//! Monthly J-curve simulation for a staged venture portfolio.
//!
//! Companies are deployed evenly over the deployment period. Follow-ons and
//! exits are weighted by cumulative survival probability, so every flow is
//! an expected value rather than a random draw. The horizon is fixed at 180
//! months; anything scheduled later is dropped.
//!
//! All arithmetic uses `rust_decimal::Decimal`. No `f64`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::VcToolsError;
use crate::j_curve::allocation::StageAllocation;
use crate::j_curve::profiles::{Stage, StageProfile, StageProfiles};
use crate::types::*;
use crate::VcToolsResult;

/// Simulation horizon in months (15 years).
pub const HORIZON_MONTHS: usize = 180;

/// Years at which point-in-time metrics are reported.
pub const METRIC_YEARS: [u32; 4] = [5, 7, 10, 12];

// ---------------------------------------------------------------------------
// Input / Output
// ---------------------------------------------------------------------------

/// Input for the J-curve simulation. Amounts in $ thousands.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FundSimInput {
    /// Committed capital ($K)
    pub fund_size: Money,
    pub num_companies: u32,
    pub stage_allocation: StageAllocation,
    /// Years over which initial checks are spread
    pub deployment_years: u32,
    /// Target share of the fund reserved for follow-ons (0.50 = 50%)
    pub follow_on_reserve: Rate,
    #[serde(default)]
    pub profiles: StageProfiles,
}

/// Cash movement in one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthFlow {
    pub month: u32,
    pub calls_out: Money,
    pub distributions: Money,
    /// distributions - calls_out
    pub net_flow: Money,
    /// Running sum of net_flow through this month
    pub cumulative: Money,
}

/// Cash picture as of the end of a given fund year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointInTimeMetrics {
    pub year: u32,
    pub total_called: Money,
    pub total_distributed: Money,
    pub dpi: Multiple,
}

/// Calls and distributions aggregated per fund year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearFlow {
    pub year: u32,
    pub calls: Money,
    pub distributions: Money,
    pub net: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCounts {
    pub seed: u32,
    pub series_a: u32,
    pub series_b: u32,
}

impl StageCounts {
    pub fn get(&self, stage: Stage) -> u32 {
        match stage {
            Stage::Seed => self.seed,
            Stage::SeriesA => self.series_a,
            Stage::SeriesB => self.series_b,
        }
    }

    pub fn total(&self) -> u32 {
        self.seed
            .saturating_add(self.series_a)
            .saturating_add(self.series_b)
    }
}

/// Month in which cumulative cash first turns non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreakEven {
    Month(u32),
    BeyondHorizon,
}

/// Output of the J-curve simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundSimOutput {
    pub companies_per_stage: StageCounts,
    pub months: Vec<MonthFlow>,
    pub total_invested: Money,
    pub total_returned: Money,
    /// total_returned / total_invested
    pub expected_tvpi: Multiple,
    /// Survival-weighted follow-on capital called inside the horizon
    pub follow_on_invested: Money,
    /// follow_on_invested / total_invested, comparable to `follow_on_reserve`
    pub follow_on_share: Rate,
    pub metrics_at_years: Vec<PointInTimeMetrics>,
    /// Depth of the J-curve: -min(0, lowest cumulative balance)
    pub peak_capital_call: Money,
    pub trough_month: u32,
    pub break_even: BreakEven,
    pub yearly: Vec<YearFlow>,
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Simulate monthly fund cash flows over the 15-year horizon.
pub fn simulate_fund(input: &FundSimInput) -> VcToolsResult<ComputationOutput<FundSimOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_fund_sim_input(input)?;

    if input.stage_allocation.total() != 100 {
        warnings.push(format!(
            "Stage allocation sums to {}%, not 100%; Series B absorbs the difference",
            input.stage_allocation.total()
        ));
    }
    for stage in Stage::ALL {
        let total = input.profiles.get(stage).probability_total();
        if total != Decimal::ONE {
            warnings.push(format!(
                "{} exit probabilities sum to {} rather than 1",
                stage.label(),
                total
            ));
        }
    }

    let companies_per_stage = companies_per_stage(input.num_companies, &input.stage_allocation)?;

    let mut calls = vec![Decimal::ZERO; HORIZON_MONTHS];
    let mut distributions = vec![Decimal::ZERO; HORIZON_MONTHS];
    let mut total_invested = Decimal::ZERO;
    let mut total_returned = Decimal::ZERO;
    let mut follow_on_invested = Decimal::ZERO;

    let deployment_months = input.deployment_years as u64 * 12;
    let mut company_index: u64 = 0;

    for stage in Stage::ALL {
        let profile = input.profiles.get(stage);
        let expected_multiple = profile.expected_multiple();

        for _ in 0..companies_per_stage.get(stage) {
            // floor(i * months / n) in exact integer arithmetic
            let invest_month = (company_index * deployment_months / input.num_companies as u64) as usize;
            company_index += 1;

            let schedule = schedule_company(profile, invest_month, expected_multiple);

            if let Some((month, amount)) = schedule.initial {
                calls[month] += amount;
                total_invested += amount;
            }
            for (month, amount) in schedule.follow_ons {
                calls[month] += amount;
                total_invested += amount;
                follow_on_invested += amount;
            }
            if let Some((month, value)) = schedule.exit {
                distributions[month] += value;
                total_returned += value;
            }
        }
    }

    let months = build_month_flows(&calls, &distributions);

    let expected_tvpi = ratio_or_zero(total_returned, total_invested);
    let follow_on_share = ratio_or_zero(follow_on_invested, total_invested);

    let metrics_at_years = METRIC_YEARS
        .iter()
        .map(|&year| metrics_at_month(&calls, &distributions, year))
        .collect();

    let (trough_month, lowest) = months
        .iter()
        .map(|m| (m.month, m.cumulative))
        .fold((0u32, Decimal::ZERO), |acc, (month, cash)| {
            if cash < acc.1 {
                (month, cash)
            } else {
                acc
            }
        });
    let peak_capital_call = -lowest;

    let break_even = find_break_even(&months);
    let yearly = yearly_flows(&calls, &distributions);

    if total_invested > input.fund_size {
        warnings.push(format!(
            "Modelled capital calls ({}) exceed fund size ({})",
            total_invested, input.fund_size
        ));
    }

    let output = FundSimOutput {
        companies_per_stage,
        months,
        total_invested,
        total_returned,
        expected_tvpi,
        follow_on_invested,
        follow_on_share,
        metrics_at_years,
        peak_capital_call,
        trough_month,
        break_even,
        yearly,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "VC Fund J-Curve Simulation (expected-value, monthly)",
        &serde_json::json!({
            "fund_size": input.fund_size.to_string(),
            "num_companies": input.num_companies,
            "deployment_years": input.deployment_years,
            "stage_allocation": input.stage_allocation,
            "follow_on_reserve": input.follow_on_reserve.to_string(),
            "horizon_months": HORIZON_MONTHS,
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Companies per stage: rounded shares for all but the last stage, which
/// takes the remainder so the total is exact.
pub fn companies_per_stage(
    num_companies: u32,
    allocation: &StageAllocation,
) -> VcToolsResult<StageCounts> {
    let round_share = |pct: u32| -> u128 {
        // round(n * pct / 100), half up
        (2 * num_companies as u128 * pct as u128 + 100) / 200
    };
    let seed = round_share(allocation.seed);
    let series_a = round_share(allocation.series_a);
    let assigned = seed + series_a;
    if assigned > num_companies as u128 {
        return Err(VcToolsError::InvalidInput {
            field: "stage_allocation".into(),
            reason: format!(
                "Seed and Series A allocations place {assigned} companies but the fund only has {num_companies}"
            ),
        });
    }
    Ok(StageCounts {
        seed: seed as u32,
        series_a: series_a as u32,
        series_b: num_companies - assigned as u32,
    })
}

/// Flows for a single company, restricted to the horizon.
struct CompanySchedule {
    initial: Option<(usize, Money)>,
    follow_ons: Vec<(usize, Money)>,
    exit: Option<(usize, Money)>,
}

fn schedule_company(
    profile: &StageProfile,
    invest_month: usize,
    expected_multiple: Multiple,
) -> CompanySchedule {
    let initial = (invest_month < HORIZON_MONTHS).then_some((invest_month, profile.initial_check));

    let mut expected_companies = Decimal::ONE;
    let mut capital_in_company = profile.initial_check;
    let mut follow_ons = Vec::with_capacity(2);

    for (amount, timing, survival) in [
        (profile.follow_on_to_a, profile.time_to_a, profile.survival_to_a),
        (profile.follow_on_to_b, profile.time_to_b, profile.survival_to_b),
    ] {
        if amount > Decimal::ZERO && timing > 0 {
            let month = invest_month + timing as usize;
            expected_companies *= survival;
            let weighted = amount * expected_companies;
            if month < HORIZON_MONTHS && weighted > Decimal::ZERO {
                follow_ons.push((month, weighted));
                capital_in_company += amount;
            }
        }
    }

    let exit_month = invest_month + profile.time_to_exit as usize;
    expected_companies *= profile.survival_to_exit;
    let exit_value = capital_in_company * expected_multiple * expected_companies;
    let exit = (exit_month < HORIZON_MONTHS).then_some((exit_month, exit_value));

    CompanySchedule {
        initial,
        follow_ons,
        exit,
    }
}

fn build_month_flows(calls: &[Money], distributions: &[Money]) -> Vec<MonthFlow> {
    let mut cumulative = Decimal::ZERO;
    calls
        .iter()
        .zip(distributions.iter())
        .enumerate()
        .map(|(m, (&calls_out, &dist))| {
            let net_flow = dist - calls_out;
            cumulative += net_flow;
            MonthFlow {
                month: m as u32,
                calls_out,
                distributions: dist,
                net_flow,
                cumulative,
            }
        })
        .collect()
}

/// Totals through the last month of `year` inclusive (month index 12·year).
fn metrics_at_month(calls: &[Money], distributions: &[Money], year: u32) -> PointInTimeMetrics {
    let end = ((year as usize) * 12 + 1).min(HORIZON_MONTHS);
    let total_called: Money = calls[..end].iter().copied().sum();
    let total_distributed: Money = distributions[..end].iter().copied().sum();
    PointInTimeMetrics {
        year,
        total_called,
        total_distributed,
        dpi: ratio_or_zero(total_distributed, total_called),
    }
}

/// First month after a negative month where cumulative cash is >= 0.
fn find_break_even(months: &[MonthFlow]) -> BreakEven {
    months
        .windows(2)
        .find(|pair| pair[0].cumulative < Decimal::ZERO && pair[1].cumulative >= Decimal::ZERO)
        .map(|pair| BreakEven::Month(pair[1].month))
        .unwrap_or(BreakEven::BeyondHorizon)
}

fn yearly_flows(calls: &[Money], distributions: &[Money]) -> Vec<YearFlow> {
    calls
        .chunks(12)
        .zip(distributions.chunks(12))
        .enumerate()
        .map(|(y, (c, d))| {
            let calls: Money = c.iter().copied().sum();
            let distributions: Money = d.iter().copied().sum();
            YearFlow {
                year: y as u32 + 1,
                calls,
                distributions,
                net: distributions - calls,
            }
        })
        .collect()
}

fn ratio_or_zero(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator > Decimal::ZERO {
        numerator / denominator
    } else {
        Decimal::ZERO
    }
}

fn validate_fund_sim_input(input: &FundSimInput) -> VcToolsResult<()> {
    if input.num_companies == 0 {
        return Err(VcToolsError::InvalidInput {
            field: "num_companies".into(),
            reason: "At least one portfolio company is required".into(),
        });
    }
    if input.fund_size < Decimal::ZERO {
        return Err(VcToolsError::InvalidInput {
            field: "fund_size".into(),
            reason: "Fund size cannot be negative".into(),
        });
    }
    for stage in Stage::ALL {
        let profile = input.profiles.get(stage);
        if profile.exit_distribution.is_empty() {
            return Err(VcToolsError::InsufficientData(format!(
                "{} exit distribution has no outcomes",
                stage.label()
            )));
        }
        for (field, p) in [
            ("survival_to_a", profile.survival_to_a),
            ("survival_to_b", profile.survival_to_b),
            ("survival_to_exit", profile.survival_to_exit),
        ] {
            if p < Decimal::ZERO || p > Decimal::ONE {
                return Err(VcToolsError::InvalidInput {
                    field: format!("profiles.{}.{}", stage.label(), field),
                    reason: "Survival probability must be between 0 and 1".into(),
                });
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
