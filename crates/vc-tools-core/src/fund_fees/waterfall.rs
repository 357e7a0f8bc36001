use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::fund_fees::schedule::{CarryBasis, FundFeeOutput};
use crate::types::Money;

/// How a bar moves the running total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BarKind {
    Add,
    Subtract,
    /// Intermediate level drawn from zero
    Subtotal,
    /// Final level drawn from zero
    Total,
}

/// One step of the committed-capital → net-to-LP bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterfallBar {
    pub label: String,
    pub amount: Money,
    /// Level the bar starts from
    pub base: Money,
    pub kind: BarKind,
}

impl WaterfallBar {
    fn new(label: &str, amount: Money, base: Money, kind: BarKind) -> Self {
        Self {
            label: label.to_string(),
            amount,
            base,
            kind,
        }
    }
}

/// Bridge from committed capital to net LP proceeds.
///
/// Deal-by-deal funds with a positive clawback show the pre-clawback carry
/// and the clawback returned to LPs as separate steps.
pub fn build_waterfall(
    fund_size: Money,
    carry_basis: CarryBasis,
    out: &FundFeeOutput,
) -> Vec<WaterfallBar> {
    let gross_returns = (out.gross_proceeds - out.invested_capital).max(Decimal::ZERO);
    let show_clawback = carry_basis == CarryBasis::DealByDeal && out.clawback > Decimal::ZERO;

    let mut bars = vec![
        WaterfallBar::new("Committed Capital", fund_size, Decimal::ZERO, BarKind::Add),
        WaterfallBar::new(
            "Management Fees",
            out.total_fees,
            fund_size - out.total_fees,
            BarKind::Subtract,
        ),
        WaterfallBar::new(
            "Invested Capital",
            out.invested_capital,
            Decimal::ZERO,
            BarKind::Subtotal,
        ),
        WaterfallBar::new(
            "Gross Returns",
            gross_returns,
            out.invested_capital,
            BarKind::Add,
        ),
    ];

    if show_clawback {
        let after_dbd_carry = out.gross_proceeds - out.deal_by_deal_carry;
        bars.push(WaterfallBar::new(
            "Deal-by-Deal Carry",
            out.deal_by_deal_carry,
            after_dbd_carry,
            BarKind::Subtract,
        ));
        bars.push(WaterfallBar::new(
            "Clawback",
            out.clawback,
            after_dbd_carry,
            BarKind::Add,
        ));
    } else {
        bars.push(WaterfallBar::new(
            "Carry",
            out.total_carry,
            out.gross_proceeds - out.total_carry,
            BarKind::Subtract,
        ));
    }

    bars.push(WaterfallBar::new(
        "Net to LPs",
        out.net_to_lps,
        Decimal::ZERO,
        BarKind::Total,
    ));

    bars
}
