use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::VcToolsError;
use crate::types::*;
use crate::VcToolsResult;

/// Series A stakes swept by the sensitivity table, in whole percent.
const SENSITIVITY_MIN_PCT: u32 = 10;
const SENSITIVITY_MAX_PCT: u32 = 55;

// ---------------------------------------------------------------------------
// Input / Output
// ---------------------------------------------------------------------------

/// Seed note converting at a priced Series A. Amounts in dollars.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConvertibleNoteInput {
    /// Note principal ($)
    pub note_amount: Money,
    /// Shares outstanding before the Series A
    pub current_shares: Shares,
    /// Series A raise ($)
    pub series_a_raise: Money,
    /// Stake sold in the Series A (0.32 = 32%)
    pub series_a_stake: Rate,
    /// Fraction of the Series A price the note pays (0.80 = 20% discount)
    pub discount_pct: Rate,
    /// Valuation cap ($)
    pub valuation_cap: Money,
}

/// Note conversion at one Series A stake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteConversion {
    pub series_a_stake: Rate,
    pub post_money: Money,
    pub pre_money: Money,
    pub series_a_price: Money,
    pub series_a_shares: Shares,
    pub total_after_a: Shares,
    /// series_a_price x discount_pct
    pub discount_price: Money,
    /// valuation_cap / total_after_a
    pub cap_price: Money,
    pub effective_price: Money,
    /// The cap, not the discount, sets the conversion price
    pub cap_binds: bool,
    pub note_shares: Shares,
    pub grand_total: Shares,
    pub founder_pct: Rate,
    pub series_a_pct: Rate,
    pub note_pct: Rate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertibleNoteOutput {
    pub conversion: NoteConversion,
    /// Conversion recomputed at Series A stakes from 10% to 55%
    pub sensitivity: Vec<NoteConversion>,
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

fn convert_at(input: &ConvertibleNoteInput, stake: Rate) -> NoteConversion {
    let post_money = input.series_a_raise / stake;
    let pre_money = post_money - input.series_a_raise;
    let series_a_price = pre_money / input.current_shares;
    let series_a_shares = input.series_a_raise / series_a_price;
    let total_after_a = input.current_shares + series_a_shares;

    let discount_price = series_a_price * input.discount_pct;
    let cap_price = input.valuation_cap / total_after_a;
    let effective_price = discount_price.min(cap_price);
    let note_shares = input.note_amount / effective_price;
    let grand_total = total_after_a + note_shares;

    NoteConversion {
        series_a_stake: stake,
        post_money,
        pre_money,
        series_a_price,
        series_a_shares,
        total_after_a,
        discount_price,
        cap_price,
        effective_price,
        cap_binds: cap_price < discount_price,
        note_shares,
        grand_total,
        founder_pct: input.current_shares / grand_total,
        series_a_pct: series_a_shares / grand_total,
        note_pct: note_shares / grand_total,
    }
}

fn validate_note_input(input: &ConvertibleNoteInput) -> VcToolsResult<()> {
    if input.current_shares <= Decimal::ZERO {
        return Err(VcToolsError::DivisionByZero {
            context: "current_shares cannot be zero".into(),
        });
    }
    if input.series_a_raise <= Decimal::ZERO {
        return Err(VcToolsError::InvalidInput {
            field: "series_a_raise".into(),
            reason: "Series A raise must be positive".into(),
        });
    }
    if input.series_a_stake <= Decimal::ZERO || input.series_a_stake >= Decimal::ONE {
        return Err(VcToolsError::InvalidInput {
            field: "series_a_stake".into(),
            reason: "Series A stake must be in (0, 1)".into(),
        });
    }
    if input.discount_pct <= Decimal::ZERO {
        return Err(VcToolsError::InvalidInput {
            field: "discount_pct".into(),
            reason: "Note must pay a positive fraction of the Series A price".into(),
        });
    }
    if input.valuation_cap <= Decimal::ZERO {
        return Err(VcToolsError::InvalidInput {
            field: "valuation_cap".into(),
            reason: "Valuation cap must be positive".into(),
        });
    }
    if input.note_amount < Decimal::ZERO {
        return Err(VcToolsError::InvalidInput {
            field: "note_amount".into(),
            reason: "Note amount cannot be negative".into(),
        });
    }
    Ok(())
}

/// Convert the note at the lower of the discounted Series A price and the
/// cap price, with a sensitivity sweep over the Series A stake.
pub fn convertible_note(
    input: &ConvertibleNoteInput,
) -> VcToolsResult<ComputationOutput<ConvertibleNoteOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_note_input(input)?;

    if input.discount_pct > Decimal::ONE {
        warnings.push(format!(
            "discount_pct {} is above 1; the note pays more than Series A investors",
            input.discount_pct
        ));
    }

    let conversion = convert_at(input, input.series_a_stake);
    let sensitivity = (SENSITIVITY_MIN_PCT..=SENSITIVITY_MAX_PCT)
        .map(|pct| convert_at(input, Decimal::from(pct) / dec!(100)))
        .collect();

    let output = ConvertibleNoteOutput {
        conversion,
        sensitivity,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Convertible Note Conversion (discount vs. valuation cap)",
        &serde_json::json!({
            "note_amount": input.note_amount.to_string(),
            "series_a_raise": input.series_a_raise.to_string(),
            "series_a_stake": input.series_a_stake.to_string(),
            "discount_pct": input.discount_pct.to_string(),
            "valuation_cap": input.valuation_cap.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: Decimal, b: Decimal) -> bool {
        (a - b).abs() < dec!(0.000001)
    }

    fn sample() -> ConvertibleNoteInput {
        ConvertibleNoteInput {
            note_amount: dec!(500000),
            current_shares: dec!(2040000),
            series_a_raise: dec!(3000000),
            series_a_stake: dec!(0.32),
            discount_pct: dec!(0.80),
            valuation_cap: dec!(6000000),
        }
    }

    #[test]
    fn test_series_a_pricing() {
        let c = convertible_note(&sample()).unwrap().result.conversion;
        assert_eq!(c.post_money, dec!(9375000));
        assert_eq!(c.pre_money, dec!(6375000));
        assert_eq!(c.series_a_price, dec!(3.125));
        assert_eq!(c.series_a_shares, dec!(960000));
        assert_eq!(c.total_after_a, dec!(3000000));
    }

    #[test]
    fn test_cap_binds_at_default_terms() {
        let c = convertible_note(&sample()).unwrap().result.conversion;
        // discount 3.125 * 0.8 = 2.50; cap 6M / 3M = 2.00
        assert_eq!(c.discount_price, dec!(2.5));
        assert_eq!(c.cap_price, dec!(2));
        assert_eq!(c.effective_price, dec!(2));
        assert!(c.cap_binds);
        assert_eq!(c.note_shares, dec!(250000));
        assert!(approx_eq(c.founder_pct + c.series_a_pct + c.note_pct, Decimal::ONE));
    }

    #[test]
    fn test_discount_binds_with_high_cap() {
        let mut input = sample();
        input.valuation_cap = dec!(60000000);
        let c = convertible_note(&input).unwrap().result.conversion;
        assert!(!c.cap_binds);
        assert_eq!(c.effective_price, c.discount_price);
    }

    #[test]
    fn test_sensitivity_sweep() {
        let out = convertible_note(&sample()).unwrap().result;
        assert_eq!(out.sensitivity.len(), 46);
        assert_eq!(out.sensitivity[0].series_a_stake, dec!(0.10));
        assert_eq!(out.sensitivity[45].series_a_stake, dec!(0.55));
        let at_32 = &out.sensitivity[22];
        assert_eq!(at_32.series_a_stake, dec!(0.32));
        assert_eq!(at_32.note_shares, out.conversion.note_shares);
    }

    #[test]
    fn test_zero_cap_rejected() {
        let mut input = sample();
        input.valuation_cap = Decimal::ZERO;
        assert!(convertible_note(&input).is_err());
    }
}
