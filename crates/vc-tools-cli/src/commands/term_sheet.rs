use clap::Args;
use serde_json::Value;

use vc_tools_core::term_sheet::anti_dilution::{self, AntiDilutionInput};
use vc_tools_core::term_sheet::deal::{self, TermSheetComparisonInput};
use vc_tools_core::term_sheet::liquidation::{self, LiquidationInput};

use crate::input;

/// Arguments for side-by-side term sheet cap tables
#[derive(Args)]
pub struct DealStructureArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for the liquidation preference waterfall
#[derive(Args)]
pub struct LiquidationArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for anti-dilution adjustment in a down round
#[derive(Args)]
pub struct AntiDilutionArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_deal_structure(args: DealStructureArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let cmp_input: TermSheetComparisonInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("--input <file.json> or stdin required for deal structure".into());
    };
    let result = deal::compare_term_sheets(&cmp_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_liquidation(args: LiquidationArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let liq_input: LiquidationInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("--input <file.json> or stdin required for liquidation waterfall".into());
    };
    let result = liquidation::analyze_liquidation(&liq_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_anti_dilution(args: AntiDilutionArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let ad_input: AntiDilutionInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("--input <file.json> or stdin required for anti-dilution".into());
    };
    let result = anti_dilution::analyze_anti_dilution(&ad_input)?;
    Ok(serde_json::to_value(result)?)
}
