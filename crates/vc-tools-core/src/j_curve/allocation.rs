use serde::{Deserialize, Serialize};

use crate::j_curve::profiles::Stage;

/// Share of companies entering at each stage, in whole percent points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StageAllocation {
    pub seed: u32,
    pub series_a: u32,
    pub series_b: u32,
}

impl StageAllocation {
    pub fn new(seed: u32, series_a: u32, series_b: u32) -> Self {
        Self {
            seed,
            series_a,
            series_b,
        }
    }

    pub fn get(&self, stage: Stage) -> u32 {
        match stage {
            Stage::Seed => self.seed,
            Stage::SeriesA => self.series_a,
            Stage::SeriesB => self.series_b,
        }
    }

    fn set(&mut self, stage: Stage, value: u32) {
        match stage {
            Stage::Seed => self.seed = value,
            Stage::SeriesA => self.series_a = value,
            Stage::SeriesB => self.series_b = value,
        }
    }

    pub fn total(&self) -> u32 {
        self.seed
            .saturating_add(self.series_a)
            .saturating_add(self.series_b)
    }

    /// Set one stage and renormalise every stage to a rounded share of 100.
    ///
    /// Rounding each stage independently means the result can land on 99 or
    /// 101; the simulator absorbs that in its last stage.
    pub fn rebalance(&self, stage: Stage, value: u32) -> Self {
        let mut next = *self;
        next.set(stage, value);
        let total = next.total();
        if total > 0 {
            for s in Stage::ALL {
                let share = next.get(s) as u64 * 100;
                // round half up on non-negative integers
                let pct = (2 * share + total as u64) / (2 * total as u64);
                next.set(s, pct as u32);
            }
        }
        next
    }
}
