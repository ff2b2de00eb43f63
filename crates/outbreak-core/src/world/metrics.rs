use crate::agent::HealthState;
use serde::{Deserialize, Serialize};

/// Aggregate compartment counters, maintained incrementally by every
/// transition. Never recomputed by full scan on the hot path; the only scan
/// is the initial tally (and the defensive recount in `assert_invariants`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HealthCounts {
    pub susceptible: usize,
    pub infected: usize,
    pub recovered: usize,
    pub dead: usize,
}

impl HealthCounts {
    /// Count compartments by scanning a sequence of states once.
    pub fn tally<I: IntoIterator<Item = HealthState>>(states: I) -> Self {
        let mut counts = Self::default();
        for state in states {
            *counts.compartment_mut(state) += 1;
        }
        counts
    }

    /// Move one agent between compartments as a single operation, so the sum
    /// over all compartments is preserved. All count updates in the
    /// simulation go through here.
    pub fn transition(&mut self, from: HealthState, to: HealthState) {
        let source = self.compartment_mut(from);
        assert!(*source > 0, "transition out of empty compartment {from:?}");
        *source -= 1;
        *self.compartment_mut(to) += 1;
    }

    pub fn total(&self) -> usize {
        self.susceptible + self.infected + self.recovered + self.dead
    }

    pub(crate) fn at_step(&self, step: usize) -> StepCounts {
        StepCounts {
            step,
            susceptible: self.susceptible,
            infected: self.infected,
            recovered: self.recovered,
            dead: self.dead,
        }
    }

    fn compartment_mut(&mut self, state: HealthState) -> &mut usize {
        match state {
            HealthState::Susceptible => &mut self.susceptible,
            HealthState::Infected => &mut self.infected,
            HealthState::Recovered => &mut self.recovered,
            HealthState::Dead => &mut self.dead,
        }
    }
}

/// Per-step aggregate snapshot, the sole externally consumed output of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepCounts {
    pub step: usize,
    pub susceptible: usize,
    pub infected: usize,
    pub recovered: usize,
    pub dead: usize,
}

impl StepCounts {
    pub fn total(&self) -> usize {
        self.susceptible + self.infected + self.recovered + self.dead
    }
}

/// Full set of agent positions at one step, partitioned by health state.
/// Consumed by visualization collaborators.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SnapshotFrame {
    pub step: usize,
    pub susceptible: Vec<[f64; 2]>,
    pub infected: Vec<[f64; 2]>,
    pub recovered: Vec<[f64; 2]>,
    pub dead: Vec<[f64; 2]>,
}

fn default_schema_version() -> u32 {
    1
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunSummary {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub steps_requested: usize,
    pub steps_run: usize,
    pub seed: u64,
    /// True when the run stopped before `steps_requested` because the
    /// infected count reached zero.
    pub terminated_early: bool,
    pub series: Vec<StepCounts>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub snapshots: Vec<SnapshotFrame>,
}

/// Per-step mean over a set of replicates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeanStepCounts {
    pub step: usize,
    pub susceptible: f64,
    pub infected: f64,
    pub recovered: f64,
    pub dead: f64,
}
