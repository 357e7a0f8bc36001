use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::VcToolsError;
use crate::time_value::future_value;
use crate::types::*;
use crate::valuation_nuances::option_pool::{pool_scenarios, PoolScenario};
use crate::valuation_nuances::vc_method::{
    future_company_value, required_stake, validate_vc_input, VcMethodInput,
};
use crate::VcToolsResult;

/// Series A priced with a later Series B round anticipated. Money in $M.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MultiRoundInput {
    /// Series A deal
    pub deal: VcMethodInput,
    pub option_pool_pct: Rate,
    pub series_b_investment: Money,
    pub series_b_return: Rate,
    pub years_b_to_exit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiRoundOutput {
    pub series_b_stake: Rate,
    pub series_a_stake_at_exit: Rate,
    /// Stake Series A must hold before Series B dilutes it
    pub series_a_stake_pre_b: Rate,
    pub series_b_pre_money: Money,
    pub series_b_post_money: Money,
    pub scenarios: Vec<PoolScenario>,
}

/// Back out the Series A stake needed today so that it still meets its
/// required return after Series B dilution.
pub fn multi_round(input: &MultiRoundInput) -> VcToolsResult<ComputationOutput<MultiRoundOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_vc_input(&input.deal)?;
    if input.series_b_investment <= Decimal::ZERO {
        return Err(VcToolsError::InvalidInput {
            field: "series_b_investment".into(),
            reason: "Series B investment must be positive".into(),
        });
    }
    if input.series_b_return <= -Decimal::ONE {
        return Err(VcToolsError::InvalidInput {
            field: "series_b_return".into(),
            reason: "Series B required return must be greater than -100%".into(),
        });
    }

    let fcv = future_company_value(&input.deal);
    let series_a_stake_at_exit = required_stake(&input.deal, input.deal.required_return)?;
    let series_b_future =
        future_value(input.series_b_investment, input.series_b_return, input.years_b_to_exit);
    let series_b_stake = series_b_future / fcv;

    if series_b_stake <= Decimal::ZERO {
        return Err(VcToolsError::FinancialImpossibility(format!(
            "Series B needs {series_b_stake} of the company at exit; its round cannot be priced"
        )));
    }
    if series_b_stake >= Decimal::ONE {
        return Err(VcToolsError::FinancialImpossibility(format!(
            "Series B needs {series_b_stake} of the company at exit"
        )));
    }

    let series_a_stake_pre_b = series_a_stake_at_exit / (Decimal::ONE - series_b_stake);
    if series_a_stake_pre_b >= Decimal::ONE {
        return Err(VcToolsError::FinancialImpossibility(format!(
            "Series A needs {series_a_stake_pre_b} before Series B; the round cannot be priced"
        )));
    }
    if series_a_stake_at_exit + series_b_stake > Decimal::new(8, 1) {
        warnings.push(format!(
            "Investors hold {} at exit, leaving founders and the pool under 20%",
            (series_a_stake_at_exit + series_b_stake).round_dp(4)
        ));
    }

    let scenarios = pool_scenarios(
        input.deal.current_shares,
        input.deal.investment,
        series_a_stake_pre_b,
        input.option_pool_pct,
    )?;

    let series_b_post_money = input.series_b_investment / series_b_stake;

    let output = MultiRoundOutput {
        series_b_stake,
        series_a_stake_at_exit,
        series_a_stake_pre_b,
        series_b_pre_money: series_b_post_money - input.series_b_investment,
        series_b_post_money,
        scenarios,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Multi-Round VC Method (Series A grossed up for Series B dilution)",
        &serde_json::json!({
            "future_company_value": fcv.to_string(),
            "series_a_return": input.deal.required_return.to_string(),
            "series_b_investment": input.series_b_investment.to_string(),
            "series_b_return": input.series_b_return.to_string(),
            "years_b_to_exit": input.years_b_to_exit,
            "option_pool_pct": input.option_pool_pct.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample() -> MultiRoundInput {
        MultiRoundInput {
            deal: VcMethodInput {
                investment: dec!(3),
                net_income: dec!(3),
                pe_multiple: dec!(18),
                required_return: dec!(0.40),
                years_to_exit: 5,
                current_shares: dec!(1000000),
                alternative_return: None,
            },
            option_pool_pct: dec!(0.20),
            series_b_investment: dec!(7),
            series_b_return: dec!(0.20),
            years_b_to_exit: 2,
        }
    }

    #[test]
    fn test_series_b_stake() {
        let out = multi_round(&sample()).unwrap().result;
        // 7 * 1.2^2 / 54 = 10.08 / 54
        assert!((out.series_b_stake - dec!(10.08) / dec!(54)).abs() < dec!(0.000000001));
        assert!((out.series_b_post_money - dec!(7) / out.series_b_stake).abs() < dec!(0.000001));
    }

    #[test]
    fn test_pre_b_stake_survives_dilution() {
        let out = multi_round(&sample()).unwrap().result;
        let diluted = out.series_a_stake_pre_b * (Decimal::ONE - out.series_b_stake);
        assert!((diluted - out.series_a_stake_at_exit).abs() < dec!(0.000000001));
        assert!(out.series_a_stake_pre_b > out.series_a_stake_at_exit);
        assert_eq!(out.scenarios.len(), 3);
        assert!((out.scenarios[0].vc_pct - out.series_a_stake_pre_b).abs() < dec!(0.000000001));
    }

    #[test]
    fn test_total_loss_series_b_return_rejected() {
        let mut input = sample();
        input.series_b_return = dec!(-1);
        match multi_round(&input) {
            Err(VcToolsError::InvalidInput { field, .. }) => assert_eq!(field, "series_b_return"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_oversized_series_b_rejected() {
        let mut input = sample();
        input.series_b_investment = dec!(60);
        assert!(matches!(
            multi_round(&input),
            Err(VcToolsError::FinancialImpossibility(_))
        ));
    }
}
