use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use vc_tools_core::valuation_nuances::convertible_note::{self, ConvertibleNoteInput};
use vc_tools_core::valuation_nuances::cumulative_dividends::{self, CumulativeDividendsInput};
use vc_tools_core::valuation_nuances::multi_round::{self, MultiRoundInput};
use vc_tools_core::valuation_nuances::option_pool::{self, OptionPoolInput};
use vc_tools_core::valuation_nuances::options_pricing::{self, OptionsPricingInput};
use vc_tools_core::valuation_nuances::participating_preferred::{
    self, ParticipatingPreferredInput,
};
use vc_tools_core::valuation_nuances::vc_method::{self, VcMethodInput};

use crate::input;

/// Arguments for the Venture Capital Method
#[derive(Args)]
pub struct VcMethodArgs {
    /// Investment ($M)
    #[arg(long)]
    pub investment: Option<Decimal>,

    /// Net income in the exit year ($M)
    #[arg(long)]
    pub net_income: Option<Decimal>,

    /// Exit P/E multiple
    #[arg(long)]
    pub pe_multiple: Option<Decimal>,

    /// Required annual return (e.g. 0.40 for 40%)
    #[arg(long)]
    pub required_return: Option<Decimal>,

    /// Years until exit
    #[arg(long)]
    pub years_to_exit: Option<u32>,

    /// Shares outstanding before the round
    #[arg(long)]
    pub current_shares: Option<Decimal>,

    /// Second required return to compare against
    #[arg(long)]
    pub alternative_return: Option<Decimal>,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for option pool timing
#[derive(Args)]
pub struct OptionPoolArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for Series A pricing ahead of a Series B
#[derive(Args)]
pub struct MultiRoundArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for convertible note conversion
#[derive(Args)]
pub struct ConvertibleNoteArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for binomial option pricing
#[derive(Args)]
pub struct OptionsPricingArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for the participating preferred waterfall
#[derive(Args)]
pub struct ParticipatingPreferredArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for the cumulative dividends waterfall
#[derive(Args)]
pub struct CumulativeDividendsArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_vc_method(args: VcMethodArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let vc_input: VcMethodInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        VcMethodInput {
            investment: args
                .investment
                .ok_or("--investment is required (or provide --input)")?,
            net_income: args
                .net_income
                .ok_or("--net-income is required (or provide --input)")?,
            pe_multiple: args
                .pe_multiple
                .ok_or("--pe-multiple is required (or provide --input)")?,
            required_return: args
                .required_return
                .ok_or("--required-return is required (or provide --input)")?,
            years_to_exit: args
                .years_to_exit
                .ok_or("--years-to-exit is required (or provide --input)")?,
            current_shares: args
                .current_shares
                .ok_or("--current-shares is required (or provide --input)")?,
            alternative_return: args.alternative_return,
        }
    };
    let result = vc_method::vc_method(&vc_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_option_pool(args: OptionPoolArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let pool_input: OptionPoolInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("--input <file.json> or stdin required for option pool analysis".into());
    };
    let result = option_pool::option_pool_analysis(&pool_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_multi_round(args: MultiRoundArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mr_input: MultiRoundInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("--input <file.json> or stdin required for multi-round analysis".into());
    };
    let result = multi_round::multi_round(&mr_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_convertible_note(
    args: ConvertibleNoteArgs,
) -> Result<Value, Box<dyn std::error::Error>> {
    let cn_input: ConvertibleNoteInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("--input <file.json> or stdin required for convertible note".into());
    };
    let result = convertible_note::convertible_note(&cn_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_options_pricing(args: OptionsPricingArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let op_input: OptionsPricingInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("--input <file.json> or stdin required for options pricing".into());
    };
    let result = options_pricing::options_pricing(&op_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_participating_preferred(
    args: ParticipatingPreferredArgs,
) -> Result<Value, Box<dyn std::error::Error>> {
    let pp_input: ParticipatingPreferredInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("--input <file.json> or stdin required for participating preferred".into());
    };
    let result = participating_preferred::participating_preferred(&pp_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_cumulative_dividends(
    args: CumulativeDividendsArgs,
) -> Result<Value, Box<dyn std::error::Error>> {
    let cd_input: CumulativeDividendsInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("--input <file.json> or stdin required for cumulative dividends".into());
    };
    let result = cumulative_dividends::cumulative_dividends(&cd_input)?;
    Ok(serde_json::to_value(result)?)
}
