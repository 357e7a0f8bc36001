use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use vc_tools_core::fund_fees::presets;
use vc_tools_core::fund_fees::schedule::{self, FundFeeInput};
use vc_tools_core::fund_fees::sensitivity::{self, FeeSensitivityInput, TvpiRange};

use crate::input;

/// Arguments for the management fee and carry model
#[derive(Args)]
pub struct FundFeesArgs {
    /// Named fee structure: standard, founder-friendly, top-tier, no-hurdle
    #[arg(long, default_value = "standard")]
    pub preset: String,

    /// Committed capital ($M)
    #[arg(long)]
    pub fund_size: Option<Decimal>,

    /// Gross multiple on invested capital
    #[arg(long)]
    pub gross_tvpi: Option<Decimal>,

    /// Annual management fee rate (e.g. 0.02 for 2%)
    #[arg(long)]
    pub fee_rate: Option<Decimal>,

    /// Carried interest (e.g. 0.20 for 20%)
    #[arg(long)]
    pub carry_rate: Option<Decimal>,

    /// Annual hurdle rate (e.g. 0.08 for 8%)
    #[arg(long)]
    pub hurdle_rate: Option<Decimal>,

    /// Path to JSON input file (overrides preset and flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for the gross-to-net TVPI sweep
#[derive(Args)]
pub struct FeeSensitivityArgs {
    /// Named fee structure to sweep
    #[arg(long, default_value = "standard")]
    pub preset: String,

    /// Lowest gross TVPI
    #[arg(long)]
    pub min: Option<Decimal>,

    /// Highest gross TVPI
    #[arg(long)]
    pub max: Option<Decimal>,

    /// Sweep step
    #[arg(long)]
    pub step: Option<Decimal>,

    /// Path to JSON input file (overrides preset and flags)
    #[arg(long)]
    pub input: Option<String>,
}

fn preset_input(name: &str) -> Result<FundFeeInput, Box<dyn std::error::Error>> {
    presets::by_name(name).ok_or_else(|| {
        format!(
            "unknown preset '{}' (expected one of: {})",
            name,
            presets::PRESET_NAMES.join(", ")
        )
        .into()
    })
}

pub fn run_fund_fees(args: FundFeesArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let fee_input: FundFeeInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        let base = preset_input(&args.preset)?;
        FundFeeInput {
            fund_size: args.fund_size.unwrap_or(base.fund_size),
            gross_tvpi: args.gross_tvpi.unwrap_or(base.gross_tvpi),
            fee_rate: args.fee_rate.unwrap_or(base.fee_rate),
            carry_rate: args.carry_rate.unwrap_or(base.carry_rate),
            hurdle_rate: args.hurdle_rate.unwrap_or(base.hurdle_rate),
            ..base
        }
    };

    let result = schedule::compute_fund_fees(&fee_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_fee_sensitivity(
    args: FeeSensitivityArgs,
) -> Result<Value, Box<dyn std::error::Error>> {
    let sens_input: FeeSensitivityInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        let defaults = TvpiRange::default();
        FeeSensitivityInput {
            fund: preset_input(&args.preset)?,
            range: TvpiRange {
                min: args.min.unwrap_or(defaults.min),
                max: args.max.unwrap_or(defaults.max),
                step: args.step.unwrap_or(defaults.step),
            },
        }
    };

    let result = sensitivity::net_tvpi_sensitivity(&sens_input)?;
    Ok(serde_json::to_value(result)?)
}
