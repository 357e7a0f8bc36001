//! Named fund strategies for the J-curve simulator. Sizes in $K.

use rust_decimal_macros::dec;

use crate::j_curve::allocation::StageAllocation;
use crate::j_curve::profiles::StageProfiles;
use crate::j_curve::simulation::FundSimInput;

/// $50M fund writing seed checks only.
pub fn seed_specialist() -> FundSimInput {
    FundSimInput {
        fund_size: dec!(50000),
        num_companies: 25,
        stage_allocation: StageAllocation::new(100, 0, 0),
        deployment_years: 4,
        follow_on_reserve: dec!(0.60),
        profiles: StageProfiles::default(),
    }
}

pub fn series_a_focused() -> FundSimInput {
    FundSimInput {
        fund_size: dec!(100000),
        num_companies: 20,
        stage_allocation: StageAllocation::new(20, 80, 0),
        deployment_years: 4,
        follow_on_reserve: dec!(0.50),
        profiles: StageProfiles::default(),
    }
}

pub fn growth_stage() -> FundSimInput {
    FundSimInput {
        fund_size: dec!(200000),
        num_companies: 15,
        stage_allocation: StageAllocation::new(0, 20, 80),
        deployment_years: 3,
        follow_on_reserve: dec!(0.30),
        profiles: StageProfiles::default(),
    }
}

pub fn multi_stage() -> FundSimInput {
    FundSimInput {
        fund_size: dec!(150000),
        num_companies: 22,
        stage_allocation: StageAllocation::new(30, 45, 25),
        deployment_years: 4,
        follow_on_reserve: dec!(0.45),
        profiles: StageProfiles::default(),
    }
}

pub fn by_name(name: &str) -> Option<FundSimInput> {
    match name {
        "seed-specialist" => Some(seed_specialist()),
        "series-a-focused" => Some(series_a_focused()),
        "growth-stage" => Some(growth_stage()),
        "multi-stage" => Some(multi_stage()),
        _ => None,
    }
}

pub const PRESET_NAMES: [&str; 4] = [
    "seed-specialist",
    "series-a-focused",
    "growth-stage",
    "multi-stage",
];
