use crate::config::{SimConfig, SimConfigError};
use crate::world::{MeanStepCounts, RunError, RunSummary, World};
use rayon::prelude::*;
use std::{error::Error, fmt};

#[derive(Debug, Clone, PartialEq)]
pub enum MultiRunError {
    Config(SimConfigError),
    Run(RunError),
}

impl fmt::Display for MultiRunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MultiRunError::Config(e) => write!(f, "{}", e),
            MultiRunError::Run(e) => write!(f, "{}", e),
        }
    }
}

impl From<SimConfigError> for MultiRunError {
    fn from(err: SimConfigError) -> Self {
        MultiRunError::Config(err)
    }
}

impl From<RunError> for MultiRunError {
    fn from(err: RunError) -> Self {
        MultiRunError::Run(err)
    }
}

impl Error for MultiRunError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MultiRunError::Config(e) => Some(e),
            MultiRunError::Run(e) => Some(e),
        }
    }
}

/// Run one independent replicate per seed, in parallel. Each replicate is a
/// fresh world seeded with its own seed; replicates share nothing, so the
/// result is identical to running them sequentially.
pub fn run_replicates(
    config: &SimConfig,
    steps: usize,
    seeds: &[u64],
) -> Result<Vec<RunSummary>, MultiRunError> {
    // Validate once up front so the parallel loop cannot fail.
    config.validate()?;
    if steps > World::MAX_RUN_STEPS {
        return Err(RunError::TooManySteps {
            max: World::MAX_RUN_STEPS,
            actual: steps,
        }
        .into());
    }
    Ok(seeds
        .par_iter()
        .map(|&seed| {
            let replicate_config = SimConfig {
                seed,
                ..config.clone()
            };
            World::new(replicate_config).run(steps)
        })
        .collect())
}

/// Per-step mean counts across replicates. A replicate that terminated early
/// contributes its terminal counts to every later step: the epidemic is over
/// and its compartments are frozen.
pub fn mean_series(summaries: &[RunSummary]) -> Vec<MeanStepCounts> {
    let longest = summaries.iter().map(|s| s.series.len()).max().unwrap_or(0);
    let mut rows = Vec::with_capacity(longest);
    for i in 0..longest {
        let mut sums = [0.0f64; 4];
        let mut contributing = 0usize;
        for summary in summaries {
            let Some(counts) = summary.series.get(i).or_else(|| summary.series.last()) else {
                continue;
            };
            sums[0] += counts.susceptible as f64;
            sums[1] += counts.infected as f64;
            sums[2] += counts.recovered as f64;
            sums[3] += counts.dead as f64;
            contributing += 1;
        }
        let denom = contributing.max(1) as f64;
        rows.push(MeanStepCounts {
            step: i + 1,
            susceptible: sums[0] / denom,
            infected: sums[1] / denom,
            recovered: sums[2] / denom,
            dead: sums[3] / denom,
        });
    }
    rows
}
