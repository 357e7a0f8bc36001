use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::VcToolsError;
use crate::fund_fees::schedule::{fund_fee_model, validate_fund_fee_input, FundFeeInput};
use crate::types::*;
use crate::VcToolsResult;

/// Most points a single sweep may produce.
pub const MAX_SENSITIVITY_POINTS: u32 = 1000;

/// Gross TVPI sweep bounds (inclusive).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TvpiRange {
    pub min: Multiple,
    pub max: Multiple,
    pub step: Multiple,
}

impl Default for TvpiRange {
    fn default() -> Self {
        Self {
            min: dec!(0.5),
            max: dec!(5.0),
            step: dec!(0.1),
        }
    }
}

/// Input for the gross-to-net TVPI sweep.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeeSensitivityInput {
    pub fund: FundFeeInput,
    #[serde(default)]
    pub range: TvpiRange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TvpiPoint {
    pub gross_tvpi: Multiple,
    pub net_tvpi: Multiple,
    /// Reference line with no fees or carry (equal to gross)
    pub no_fee_tvpi: Multiple,
}

/// Net TVPI at each gross TVPI in the range, all other terms held fixed.
pub fn net_tvpi_sensitivity(
    input: &FeeSensitivityInput,
) -> VcToolsResult<ComputationOutput<Vec<TvpiPoint>>> {
    let start = Instant::now();

    validate_fund_fee_input(&input.fund)?;
    let range = &input.range;
    if range.step <= Decimal::ZERO {
        return Err(VcToolsError::InvalidInput {
            field: "range.step".into(),
            reason: "Step must be positive".into(),
        });
    }
    if range.min < Decimal::ZERO || range.max < range.min {
        return Err(VcToolsError::InvalidInput {
            field: "range".into(),
            reason: "Range must satisfy 0 <= min <= max".into(),
        });
    }
    let steps = (range.max - range.min)
        .checked_div(range.step)
        .map(|n| n.floor());
    match steps {
        Some(n) if n < Decimal::from(MAX_SENSITIVITY_POINTS) => {}
        _ => {
            return Err(VcToolsError::InvalidInput {
                field: "range.step".into(),
                reason: format!(
                    "Step is too small; the sweep is limited to {MAX_SENSITIVITY_POINTS} points"
                ),
            });
        }
    }

    let mut points: Vec<TvpiPoint> = Vec::new();
    let mut fund = input.fund.clone();
    let mut gross = range.min;
    while gross <= range.max {
        fund.gross_tvpi = gross;
        let out = fund_fee_model(&fund);
        points.push(TvpiPoint {
            gross_tvpi: gross,
            net_tvpi: out.net_tvpi,
            no_fee_tvpi: gross,
        });
        gross += range.step;
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Gross-to-Net TVPI Sensitivity",
        &serde_json::json!({
            "fund_size": input.fund.fund_size.to_string(),
            "min": range.min.to_string(),
            "max": range.max.to_string(),
            "step": range.step.to_string(),
        }),
        Vec::new(),
        elapsed,
        points,
    ))
}
