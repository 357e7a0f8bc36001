use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use vc_tools_core::j_curve::presets;
use vc_tools_core::j_curve::simulation::{self, FundSimInput};

use crate::input;

/// Arguments for the J-curve cash-flow simulation
#[derive(Args)]
pub struct JCurveArgs {
    /// Named strategy: seed-specialist, series-a-focused, growth-stage, multi-stage
    #[arg(long, default_value = "multi-stage")]
    pub preset: String,

    /// Fund size ($K)
    #[arg(long)]
    pub fund_size: Option<Decimal>,

    /// Number of portfolio companies
    #[arg(long)]
    pub num_companies: Option<u32>,

    /// Years over which initial checks are written
    #[arg(long)]
    pub deployment_years: Option<u32>,

    /// Share of each stage's capital held back for follow-ons (e.g. 0.45)
    #[arg(long)]
    pub follow_on_reserve: Option<Decimal>,

    /// Path to JSON input file (overrides preset and flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_j_curve(args: JCurveArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let sim_input: FundSimInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        let base = presets::by_name(&args.preset).ok_or_else(|| {
            format!(
                "unknown preset '{}' (expected one of: {})",
                args.preset,
                presets::PRESET_NAMES.join(", ")
            )
        })?;
        FundSimInput {
            fund_size: args.fund_size.unwrap_or(base.fund_size),
            num_companies: args.num_companies.unwrap_or(base.num_companies),
            deployment_years: args.deployment_years.unwrap_or(base.deployment_years),
            follow_on_reserve: args.follow_on_reserve.unwrap_or(base.follow_on_reserve),
            ..base
        }
    };

    let result = simulation::simulate_fund(&sim_input)?;
    Ok(serde_json::to_value(result)?)
}
