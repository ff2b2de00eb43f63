pub mod metrics;
mod stepper;
#[cfg(test)]
mod tests;

pub use metrics::*;

use crate::agent::{Agent, HealthState};
use crate::config::{SimConfig, SimConfigError};
use crate::spatial::GridIndex;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use std::{error::Error, fmt};

/// Owns the agent population, the spatial index over its susceptible subset,
/// the aggregate counters, and the seeded random source. Drives the
/// per-step pipeline and exposes the per-step aggregate counts.
pub struct World {
    pub agents: Vec<Agent>,
    pub(crate) config: SimConfig,
    pub(crate) grid: GridIndex,
    pub(crate) counts: HealthCounts,
    pub(crate) rng: ChaCha12Rng,
    pub(crate) step_index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorldInitError {
    Config(SimConfigError),
    PopulationMismatch { expected: usize, actual: usize },
}

impl fmt::Display for WorldInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorldInitError::Config(e) => write!(f, "{}", e),
            WorldInitError::PopulationMismatch { expected, actual } => write!(
                f,
                "agents.len() ({actual}) must match population_size ({expected})"
            ),
        }
    }
}

impl From<SimConfigError> for WorldInitError {
    fn from(err: SimConfigError) -> Self {
        WorldInitError::Config(err)
    }
}

impl Error for WorldInitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            WorldInitError::Config(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    TooManySteps { max: usize, actual: usize },
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::TooManySteps { max, actual } => {
                write!(f, "steps ({actual}) exceed supported maximum ({max})")
            }
        }
    }
}

impl Error for RunError {}

impl World {
    pub const MAX_RUN_STEPS: usize = 1_000_000;

    pub fn new(config: SimConfig) -> Self {
        Self::try_new(config).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Validate the config, seed the random source, sample uniform positions
    /// over the plane, mark the first `initial_infected` agents Infected, and
    /// build the grid from the susceptible subset.
    pub fn try_new(config: SimConfig) -> Result<Self, WorldInitError> {
        config.validate()?;
        let mut rng = ChaCha12Rng::seed_from_u64(config.seed);
        let agents = (0..config.population_size)
            .map(|i| {
                let position = [
                    rng.random::<f64>() * config.plane_width,
                    rng.random::<f64>() * config.plane_height,
                ];
                let health = if i < config.initial_infected {
                    HealthState::Infected
                } else {
                    HealthState::Susceptible
                };
                Agent::new(position, health)
            })
            .collect();
        Self::with_agents_and_rng(agents, config, rng)
    }

    /// Build a world around a caller-supplied population, e.g. with fixed
    /// positions. Compartment counts are tallied from the agents themselves.
    pub fn from_agents(agents: Vec<Agent>, config: SimConfig) -> Result<Self, WorldInitError> {
        config.validate()?;
        let rng = ChaCha12Rng::seed_from_u64(config.seed);
        Self::with_agents_and_rng(agents, config, rng)
    }

    fn with_agents_and_rng(
        agents: Vec<Agent>,
        config: SimConfig,
        rng: ChaCha12Rng,
    ) -> Result<Self, WorldInitError> {
        if agents.len() != config.population_size {
            return Err(WorldInitError::PopulationMismatch {
                expected: config.population_size,
                actual: agents.len(),
            });
        }
        let mut grid = GridIndex::new(config.interaction_distance);
        for (idx, agent) in agents.iter().enumerate() {
            if agent.health == HealthState::Susceptible {
                grid.insert(idx, agent.position);
            }
        }
        let counts = HealthCounts::tally(agents.iter().map(|a| a.health));
        Ok(Self {
            agents,
            config,
            grid,
            counts,
            rng,
            step_index: 0,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn counts(&self) -> HealthCounts {
        self.counts
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn run(&mut self, steps: usize) -> RunSummary {
        self.try_run(steps).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Produce one aggregate snapshot per executed step, stopping early once
    /// no agent is infected (no further transitions are possible).
    pub fn try_run(&mut self, steps: usize) -> Result<RunSummary, RunError> {
        self.try_run_with_snapshots(steps, &[])
    }

    /// Run like `try_run`, but also capture the full position sets
    /// (partitioned by health state) at the requested steps.
    pub fn try_run_with_snapshots(
        &mut self,
        steps: usize,
        snapshot_steps: &[usize],
    ) -> Result<RunSummary, RunError> {
        if steps > Self::MAX_RUN_STEPS {
            return Err(RunError::TooManySteps {
                max: Self::MAX_RUN_STEPS,
                actual: steps,
            });
        }

        let mut series = Vec::with_capacity(steps.min(1024));
        let mut snapshots = Vec::with_capacity(snapshot_steps.len());
        let mut terminated_early = false;
        for step in 1..=steps {
            series.push(self.step());
            if snapshot_steps.contains(&step) {
                snapshots.push(self.snapshot());
            }
            if self.counts.infected == 0 {
                terminated_early = step < steps;
                break;
            }
        }
        Ok(RunSummary {
            schema_version: 1,
            steps_requested: steps,
            steps_run: series.len(),
            seed: self.config.seed,
            terminated_early,
            series,
            snapshots,
        })
    }

    /// Current agent positions partitioned by health state.
    pub fn snapshot(&self) -> SnapshotFrame {
        let mut frame = SnapshotFrame {
            step: self.step_index,
            ..SnapshotFrame::default()
        };
        for agent in &self.agents {
            let bucket = match agent.health {
                HealthState::Susceptible => &mut frame.susceptible,
                HealthState::Infected => &mut frame.infected,
                HealthState::Recovered => &mut frame.recovered,
                HealthState::Dead => &mut frame.dead,
            };
            bucket.push(agent.position);
        }
        frame
    }

    /// Defensive consistency check: the incrementally maintained counters
    /// must match a full recount, sum to the population size, and the grid
    /// must hold exactly the susceptible agents, each in the cell computed
    /// from its current position. A failure here is a logic defect.
    pub fn assert_invariants(&self) {
        let recount = HealthCounts::tally(self.agents.iter().map(|a| a.health));
        assert_eq!(
            recount, self.counts,
            "aggregate counters drifted from the population"
        );
        assert_eq!(
            self.counts.total(),
            self.config.population_size,
            "compartment counts no longer sum to the population size"
        );
        assert_eq!(
            self.grid.len(),
            self.counts.susceptible,
            "grid population does not match the susceptible count"
        );
        for (idx, agent) in self.agents.iter().enumerate() {
            if agent.health == HealthState::Susceptible {
                assert!(
                    self.grid.contains(idx, agent.position),
                    "susceptible agent {idx} is missing from its grid cell"
                );
            }
        }
    }
}
