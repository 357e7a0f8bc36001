//! Option pool timing: the same target stake priced three ways.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::VcToolsError;
use crate::types::*;
use crate::valuation_nuances::vc_method::{required_stake, validate_vc_input, VcMethodInput};
use crate::VcToolsResult;

// ---------------------------------------------------------------------------
// Input / Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OptionPoolInput {
    pub deal: VcMethodInput,
    /// Option pool as a fraction of the fully diluted total (0.20 = 20%)
    pub option_pool_pct: Rate,
}

/// When the option pool is created relative to the round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PoolTiming {
    /// Carved out of the founders' shares before the round
    PoolBefore,
    /// Added after the round without adjusting the investor's share count
    PoolAfterNaive,
    /// Added after the round with the investor's stake grossed up for it
    PoolAfterAdjusted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolScenario {
    pub timing: PoolTiming,
    pub founder_shares: Shares,
    pub option_shares: Shares,
    pub vc_shares: Shares,
    pub total_shares: Shares,
    pub founder_pct: Rate,
    pub option_pct: Rate,
    pub vc_pct: Rate,
    /// $ per share
    pub share_price: Money,
    /// $M
    pub pre_money: Money,
    /// $M
    pub post_money: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionPoolOutput {
    /// Stake required by the VC Method
    pub target_stake: Rate,
    pub scenarios: Vec<PoolScenario>,
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Investor shares that make up `stake` of `current_shares + vc_shares`.
fn shares_for_stake(current_shares: Shares, stake: Rate) -> Shares {
    current_shares * stake / (Decimal::ONE - stake)
}

fn scenario(
    timing: PoolTiming,
    founder_shares: Shares,
    option_shares: Shares,
    vc_shares: Shares,
    current_shares: Shares,
    investment: Money,
) -> PoolScenario {
    let total_shares = founder_shares + option_shares + vc_shares;
    let share_price = investment / (vc_shares / MILLION);
    let pre_money = share_price * current_shares / MILLION;
    PoolScenario {
        timing,
        founder_shares,
        option_shares,
        vc_shares,
        total_shares,
        founder_pct: founder_shares / total_shares,
        option_pct: option_shares / total_shares,
        vc_pct: vc_shares / total_shares,
        share_price,
        pre_money,
        post_money: pre_money + investment,
    }
}

/// Cap tables for the three pool timings at a target investor stake.
pub fn pool_scenarios(
    current_shares: Shares,
    investment: Money,
    target_stake: Rate,
    pool_pct: Rate,
) -> VcToolsResult<Vec<PoolScenario>> {
    if pool_pct < Decimal::ZERO || pool_pct >= Decimal::ONE {
        return Err(VcToolsError::InvalidInput {
            field: "option_pool_pct".into(),
            reason: "Option pool must be in [0, 1)".into(),
        });
    }
    if target_stake <= Decimal::ZERO {
        return Err(VcToolsError::InvalidInput {
            field: "target_stake".into(),
            reason: "Target stake must be positive".into(),
        });
    }
    let adjusted_stake = target_stake / (Decimal::ONE - pool_pct);
    if adjusted_stake >= Decimal::ONE {
        return Err(VcToolsError::FinancialImpossibility(format!(
            "A {target_stake} stake plus a {pool_pct} pool leaves nothing for founders"
        )));
    }

    let pool_after = |vc_shares: Shares| (current_shares + vc_shares) * pool_pct / (Decimal::ONE - pool_pct);

    let before_vc = shares_for_stake(current_shares, target_stake);
    let naive_vc = before_vc;
    let adjusted_vc = shares_for_stake(current_shares, adjusted_stake);

    Ok(vec![
        scenario(
            PoolTiming::PoolBefore,
            current_shares * (Decimal::ONE - pool_pct),
            current_shares * pool_pct,
            before_vc,
            current_shares,
            investment,
        ),
        scenario(
            PoolTiming::PoolAfterNaive,
            current_shares,
            pool_after(naive_vc),
            naive_vc,
            current_shares,
            investment,
        ),
        scenario(
            PoolTiming::PoolAfterAdjusted,
            current_shares,
            pool_after(adjusted_vc),
            adjusted_vc,
            current_shares,
            investment,
        ),
    ])
}

/// Option pool timing analysis at the VC Method's required stake.
pub fn option_pool_analysis(
    input: &OptionPoolInput,
) -> VcToolsResult<ComputationOutput<OptionPoolOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_vc_input(&input.deal)?;
    let target_stake = required_stake(&input.deal, input.deal.required_return)?;
    if target_stake >= Decimal::ONE {
        return Err(VcToolsError::FinancialImpossibility(format!(
            "Required stake {target_stake} is not below 100%"
        )));
    }

    let scenarios = pool_scenarios(
        input.deal.current_shares,
        input.deal.investment,
        target_stake,
        input.option_pool_pct,
    )?;

    if let Some(naive) = scenarios
        .iter()
        .find(|s| s.timing == PoolTiming::PoolAfterNaive)
    {
        if input.option_pool_pct > Decimal::ZERO {
            warnings.push(format!(
                "Adding the pool after the round without adjustment leaves the investor at {} instead of {}",
                naive.vc_pct.round_dp(4),
                target_stake.round_dp(4)
            ));
        }
    }

    let output = OptionPoolOutput {
        target_stake,
        scenarios,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Option Pool Timing (pool before, after naive, after adjusted)",
        &serde_json::json!({
            "investment": input.deal.investment.to_string(),
            "current_shares": input.deal.current_shares.to_string(),
            "option_pool_pct": input.option_pool_pct.to_string(),
            "required_return": input.deal.required_return.to_string(),
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
    use rust_decimal_macros::dec;

    fn approx_eq(a: Decimal, b: Decimal) -> bool {
        (a - b).abs() < dec!(0.000000001)
    }

    #[test]
    fn test_three_scenarios_in_order() {
        let s = pool_scenarios(dec!(1000000), dec!(3), dec!(0.25), dec!(0.20)).unwrap();
        let timings: Vec<PoolTiming> = s.iter().map(|x| x.timing).collect();
        assert_eq!(
            timings,
            vec![
                PoolTiming::PoolBefore,
                PoolTiming::PoolAfterNaive,
                PoolTiming::PoolAfterAdjusted
            ]
        );
    }

    #[test]
    fn test_pool_before_hits_target() {
        let s = pool_scenarios(dec!(1000000), dec!(3), dec!(0.25), dec!(0.20)).unwrap();
        let before = &s[0];
        assert!(approx_eq(before.vc_pct, dec!(0.25)));
        assert!(approx_eq(before.founder_pct, dec!(0.60)));
        assert!(approx_eq(before.option_pct, dec!(0.15)));
    }

    #[test]
    fn test_naive_pool_dilutes_investor() {
        let s = pool_scenarios(dec!(1000000), dec!(3), dec!(0.25), dec!(0.20)).unwrap();
        // 0.25 * (1 - 0.20)
        assert!(approx_eq(s[1].vc_pct, dec!(0.20)));
        assert!(approx_eq(s[1].option_pct, dec!(0.20)));
    }

    #[test]
    fn test_adjusted_pool_restores_target() {
        let s = pool_scenarios(dec!(1000000), dec!(3), dec!(0.25), dec!(0.20)).unwrap();
        assert!(approx_eq(s[2].vc_pct, dec!(0.25)));
        assert!(approx_eq(s[2].option_pct, dec!(0.20)));
        assert!(s[2].share_price < s[1].share_price);
    }

    #[test]
    fn test_prices_consistent_with_share_price() {
        let s = pool_scenarios(dec!(1000000), dec!(3), dec!(0.25), dec!(0.20)).unwrap();
        for sc in &s {
            assert!(approx_eq(sc.share_price * sc.vc_shares / MILLION, dec!(3)));
            assert!(approx_eq(sc.post_money - sc.pre_money, dec!(3)));
        }
    }

    #[test]
    fn test_pool_too_large_rejected() {
        assert!(pool_scenarios(dec!(1000000), dec!(3), dec!(0.5), dec!(0.5)).is_err());
        assert!(pool_scenarios(dec!(1000000), dec!(3), dec!(0.25), dec!(1)).is_err());
    }
}
