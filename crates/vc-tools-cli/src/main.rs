mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::fund_fees::{FeeSensitivityArgs, FundFeesArgs};
use commands::j_curve::JCurveArgs;
use commands::term_sheet::{AntiDilutionArgs, DealStructureArgs, LiquidationArgs};
use commands::valuation_nuances::{
    ConvertibleNoteArgs, CumulativeDividendsArgs, MultiRoundArgs, OptionPoolArgs,
    OptionsPricingArgs, ParticipatingPreferredArgs, VcMethodArgs,
};

/// Venture capital fund and term-sheet calculators
#[derive(Parser)]
#[command(
    name = "vct",
    version,
    about = "Venture capital fund and term-sheet calculators",
    long_about = "A CLI for venture capital fund economics with decimal precision. \
                  Covers management fees and carry, J-curve cash flows, term sheet \
                  cap tables and waterfalls, and VC Method valuation."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Management fees, carry and LP net returns for a fund
    FundFees(FundFeesArgs),
    /// Net TVPI across a range of gross TVPI
    FeeSensitivity(FeeSensitivityArgs),
    /// Monthly J-curve cash flows for a venture portfolio
    JCurve(JCurveArgs),
    /// Compare post-round cap tables across term sheets
    DealStructure(DealStructureArgs),
    /// Liquidation preference waterfall across exit values
    Liquidation(LiquidationArgs),
    /// Anti-dilution adjustment in a down round
    AntiDilution(AntiDilutionArgs),
    /// Venture Capital Method valuation
    VcMethod(VcMethodArgs),
    /// Option pool timing (before, after naive, after adjusted)
    OptionPool(OptionPoolArgs),
    /// Series A pricing that anticipates a Series B
    MultiRound(MultiRoundArgs),
    /// Convertible note conversion at a Series A
    ConvertibleNote(ConvertibleNoteArgs),
    /// Binomial pricing of options attached to an investment
    OptionsPricing(OptionsPricingArgs),
    /// Participating vs. non-participating preferred
    ParticipatingPreferred(ParticipatingPreferredArgs),
    /// Participating preferred with cumulative dividends
    CumulativeDividends(CumulativeDividendsArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::FundFees(args) => commands::fund_fees::run_fund_fees(args),
        Commands::FeeSensitivity(args) => commands::fund_fees::run_fee_sensitivity(args),
        Commands::JCurve(args) => commands::j_curve::run_j_curve(args),
        Commands::DealStructure(args) => commands::term_sheet::run_deal_structure(args),
        Commands::Liquidation(args) => commands::term_sheet::run_liquidation(args),
        Commands::AntiDilution(args) => commands::term_sheet::run_anti_dilution(args),
        Commands::VcMethod(args) => commands::valuation_nuances::run_vc_method(args),
        Commands::OptionPool(args) => commands::valuation_nuances::run_option_pool(args),
        Commands::MultiRound(args) => commands::valuation_nuances::run_multi_round(args),
        Commands::ConvertibleNote(args) => commands::valuation_nuances::run_convertible_note(args),
        Commands::OptionsPricing(args) => commands::valuation_nuances::run_options_pricing(args),
        Commands::ParticipatingPreferred(args) => {
            commands::valuation_nuances::run_participating_preferred(args)
        }
        Commands::CumulativeDividends(args) => {
            commands::valuation_nuances::run_cumulative_dividends(args)
        }
        Commands::Version => {
            println!("vct {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
