use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Multiple, Rate};

/// Entry stage of a portfolio company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Seed,
    SeriesA,
    SeriesB,
}

impl Stage {
    /// Deployment order used by the simulator.
    pub const ALL: [Stage; 3] = [Stage::Seed, Stage::SeriesA, Stage::SeriesB];

    pub fn label(self) -> &'static str {
        match self {
            Stage::Seed => "Seed",
            Stage::SeriesA => "Series A",
            Stage::SeriesB => "Series B",
        }
    }
}

/// One outcome of the exit distribution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExitBucket {
    pub probability: Rate,
    pub multiple: Multiple,
}

/// Check sizes ($K), follow-on timing (months), survival and exit outcomes
/// for companies entering at one stage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StageProfile {
    pub initial_check: Money,
    pub follow_on_to_a: Money,
    pub follow_on_to_b: Money,
    pub survival_to_a: Rate,
    pub survival_to_b: Rate,
    pub survival_to_exit: Rate,
    pub time_to_a: u32,
    pub time_to_b: u32,
    pub time_to_exit: u32,
    pub exit_distribution: Vec<ExitBucket>,
}

fn buckets(pairs: &[(Decimal, Decimal)]) -> Vec<ExitBucket> {
    pairs
        .iter()
        .map(|&(probability, multiple)| ExitBucket {
            probability,
            multiple,
        })
        .collect()
}

impl StageProfile {
    pub fn seed() -> Self {
        Self {
            initial_check: dec!(500),
            follow_on_to_a: dec!(1500),
            follow_on_to_b: dec!(4000),
            survival_to_a: dec!(0.40),
            survival_to_b: dec!(0.65),
            survival_to_exit: dec!(0.70),
            time_to_a: 18,
            time_to_b: 36,
            time_to_exit: 84,
            exit_distribution: buckets(&[
                (dec!(0.60), dec!(0)),
                (dec!(0.20), dec!(2)),
                (dec!(0.12), dec!(8)),
                (dec!(0.06), dec!(15)),
                (dec!(0.02), dec!(30)),
            ]),
        }
    }

    pub fn series_a() -> Self {
        Self {
            initial_check: dec!(2000),
            follow_on_to_a: dec!(0),
            follow_on_to_b: dec!(5000),
            survival_to_a: dec!(1.0),
            survival_to_b: dec!(0.55),
            survival_to_exit: dec!(0.75),
            time_to_a: 0,
            time_to_b: 20,
            time_to_exit: 60,
            exit_distribution: buckets(&[
                (dec!(0.50), dec!(0)),
                (dec!(0.25), dec!(1.5)),
                (dec!(0.15), dec!(5)),
                (dec!(0.08), dec!(10)),
                (dec!(0.02), dec!(18)),
            ]),
        }
    }

    pub fn series_b() -> Self {
        Self {
            initial_check: dec!(5000),
            follow_on_to_a: dec!(0),
            follow_on_to_b: dec!(0),
            survival_to_a: dec!(1.0),
            survival_to_b: dec!(1.0),
            survival_to_exit: dec!(0.65),
            time_to_a: 0,
            time_to_b: 0,
            time_to_exit: 42,
            exit_distribution: buckets(&[
                (dec!(0.40), dec!(0)),
                (dec!(0.30), dec!(1.2)),
                (dec!(0.20), dec!(3)),
                (dec!(0.08), dec!(6)),
                (dec!(0.02), dec!(12)),
            ]),
        }
    }

    /// Probability-weighted exit multiple.
    pub fn expected_multiple(&self) -> Multiple {
        self.exit_distribution
            .iter()
            .map(|b| b.probability * b.multiple)
            .sum()
    }

    pub fn probability_total(&self) -> Rate {
        self.exit_distribution.iter().map(|b| b.probability).sum()
    }
}

/// Profiles for all three entry stages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StageProfiles {
    pub seed: StageProfile,
    pub series_a: StageProfile,
    pub series_b: StageProfile,
}

impl Default for StageProfiles {
    fn default() -> Self {
        Self {
            seed: StageProfile::seed(),
            series_a: StageProfile::series_a(),
            series_b: StageProfile::series_b(),
        }
    }
}

impl StageProfiles {
    pub fn get(&self, stage: Stage) -> &StageProfile {
        match stage {
            Stage::Seed => &self.seed,
            Stage::SeriesA => &self.series_a,
            Stage::SeriesB => &self.series_b,
        }
    }
}
