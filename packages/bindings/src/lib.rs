use std::cell::RefCell;
use std::thread::LocalKey;

use napi::Result as NapiResult;
use napi_derive::napi;
use serde::de::DeserializeOwned;
use serde::Serialize;

use vc_tools_core::memo::{canonical_key, Memo};
use vc_tools_core::VcToolsResult;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Serialised output keyed on the canonical JSON of the parsed input.
type JsonMemo = Memo<String, String>;

thread_local! {
    static FUND_FEES: RefCell<JsonMemo> = RefCell::new(Memo::new());
    static FEE_SENSITIVITY: RefCell<JsonMemo> = RefCell::new(Memo::new());
    static J_CURVE: RefCell<JsonMemo> = RefCell::new(Memo::new());
    static LIQUIDATION: RefCell<JsonMemo> = RefCell::new(Memo::new());
}

/// Parse, compute and serialise, reusing the last answer when a slider
/// redraw sends the same parameters again.
fn run_memoized<I, O>(
    cache: &'static LocalKey<RefCell<JsonMemo>>,
    input_json: &str,
    compute: impl FnOnce(&I) -> VcToolsResult<O>,
) -> NapiResult<String>
where
    I: DeserializeOwned + Serialize,
    O: Serialize,
{
    let input: I = serde_json::from_str(input_json).map_err(to_napi_error)?;
    let key = canonical_key(&input).map_err(to_napi_error)?;
    cache.with(|memo| {
        memo.borrow_mut().get_or_compute(&key, |_| {
            let output = compute(&input).map_err(to_napi_error)?;
            serde_json::to_string(&output).map_err(to_napi_error)
        })
    })
}

fn run<I, O>(input_json: &str, compute: impl FnOnce(&I) -> VcToolsResult<O>) -> NapiResult<String>
where
    I: DeserializeOwned,
    O: Serialize,
{
    let input: I = serde_json::from_str(input_json).map_err(to_napi_error)?;
    let output = compute(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Fund fees
// ---------------------------------------------------------------------------

#[napi]
pub fn fund_fees(input_json: String) -> NapiResult<String> {
    run_memoized(
        &FUND_FEES,
        &input_json,
        vc_tools_core::fund_fees::schedule::compute_fund_fees,
    )
}

#[napi]
pub fn fee_sensitivity(input_json: String) -> NapiResult<String> {
    run_memoized(
        &FEE_SENSITIVITY,
        &input_json,
        vc_tools_core::fund_fees::sensitivity::net_tvpi_sensitivity,
    )
}

/// Named fee structure as JSON, ready to edit and feed back to `fundFees`.
#[napi]
pub fn fund_fee_preset(name: String) -> NapiResult<String> {
    let preset = vc_tools_core::fund_fees::presets::by_name(&name)
        .ok_or_else(|| to_napi_error(format!("unknown fee preset '{name}'")))?;
    serde_json::to_string(&preset).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// J-curve
// ---------------------------------------------------------------------------

#[napi]
pub fn j_curve(input_json: String) -> NapiResult<String> {
    run_memoized(
        &J_CURVE,
        &input_json,
        vc_tools_core::j_curve::simulation::simulate_fund,
    )
}

#[napi]
pub fn j_curve_preset(name: String) -> NapiResult<String> {
    let preset = vc_tools_core::j_curve::presets::by_name(&name)
        .ok_or_else(|| to_napi_error(format!("unknown fund strategy '{name}'")))?;
    serde_json::to_string(&preset).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Term sheet
// ---------------------------------------------------------------------------

#[napi]
pub fn deal_structure(input_json: String) -> NapiResult<String> {
    run(&input_json, vc_tools_core::term_sheet::deal::compare_term_sheets)
}

#[napi]
pub fn liquidation_waterfall(input_json: String) -> NapiResult<String> {
    run_memoized(
        &LIQUIDATION,
        &input_json,
        vc_tools_core::term_sheet::liquidation::analyze_liquidation,
    )
}

#[napi]
pub fn anti_dilution(input_json: String) -> NapiResult<String> {
    run(
        &input_json,
        vc_tools_core::term_sheet::anti_dilution::analyze_anti_dilution,
    )
}

// ---------------------------------------------------------------------------
// Valuation nuances
// ---------------------------------------------------------------------------

#[napi]
pub fn vc_method(input_json: String) -> NapiResult<String> {
    run(&input_json, vc_tools_core::valuation_nuances::vc_method::vc_method)
}

#[napi]
pub fn option_pool(input_json: String) -> NapiResult<String> {
    run(
        &input_json,
        vc_tools_core::valuation_nuances::option_pool::option_pool_analysis,
    )
}

#[napi]
pub fn multi_round(input_json: String) -> NapiResult<String> {
    run(
        &input_json,
        vc_tools_core::valuation_nuances::multi_round::multi_round,
    )
}

#[napi]
pub fn convertible_note(input_json: String) -> NapiResult<String> {
    run(
        &input_json,
        vc_tools_core::valuation_nuances::convertible_note::convertible_note,
    )
}

#[napi]
pub fn options_pricing(input_json: String) -> NapiResult<String> {
    run(
        &input_json,
        vc_tools_core::valuation_nuances::options_pricing::options_pricing,
    )
}

#[napi]
pub fn participating_preferred(input_json: String) -> NapiResult<String> {
    run(
        &input_json,
        vc_tools_core::valuation_nuances::participating_preferred::participating_preferred,
    )
}

#[napi]
pub fn cumulative_dividends(input_json: String) -> NapiResult<String> {
    run(
        &input_json,
        vc_tools_core::valuation_nuances::cumulative_dividends::cumulative_dividends,
    )
}
