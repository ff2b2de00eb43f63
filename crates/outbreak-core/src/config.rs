use serde::{Deserialize, Serialize};
use std::{error::Error, fmt};

/// Uniform global simulation parameters.
///
/// All stochastic checks use the same convention: a uniform draw in `[0, 1)`
/// below the rate means the event occurs.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimConfig {
    pub population_size: usize,
    /// Agents marked Infected at initialization; the rest start Susceptible.
    pub initial_infected: usize,
    pub plane_width: f64,
    pub plane_height: f64,
    /// Probability that an in-range susceptible contact becomes infected.
    pub infection_rate: f64,
    /// Per-step recovery probability for an infected agent.
    pub recovery_rate: f64,
    /// Per-step death probability for an infected agent, checked before recovery.
    pub death_risk: f64,
    /// Maximum transmission distance; doubles as the grid cell size.
    pub interaction_distance: f64,
    /// Maximum per-axis displacement per step.
    pub moving_range: f64,
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            population_size: 1000,
            initial_infected: 50,
            plane_width: 55.0,
            plane_height: 55.0,
            infection_rate: 0.3,
            recovery_rate: 0.8,
            death_risk: 0.01,
            interaction_distance: 2.0,
            moving_range: 5.0,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SimConfigError {
    InitialInfectedExceedsPopulation { population: usize, infected: usize },
    RateOutOfRange { name: &'static str, value: f64 },
    NonPositiveInteractionDistance { value: f64 },
    NonPositivePlane { width: f64, height: f64 },
    NegativeMovingRange { value: f64 },
}

impl fmt::Display for SimConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimConfigError::InitialInfectedExceedsPopulation {
                population,
                infected,
            } => write!(
                f,
                "initial_infected ({infected}) exceeds population_size ({population})"
            ),
            SimConfigError::RateOutOfRange { name, value } => {
                write!(f, "{name} ({value}) must lie in [0, 1]")
            }
            SimConfigError::NonPositiveInteractionDistance { value } => {
                write!(f, "interaction_distance ({value}) must be positive and finite")
            }
            SimConfigError::NonPositivePlane { width, height } => write!(
                f,
                "plane extent ({width} x {height}) must be positive and finite"
            ),
            SimConfigError::NegativeMovingRange { value } => {
                write!(f, "moving_range ({value}) must be non-negative and finite")
            }
        }
    }
}

impl Error for SimConfigError {}

impl SimConfig {
    pub fn validate(&self) -> Result<(), SimConfigError> {
        if self.initial_infected > self.population_size {
            return Err(SimConfigError::InitialInfectedExceedsPopulation {
                population: self.population_size,
                infected: self.initial_infected,
            });
        }
        let rates = [
            ("infection_rate", self.infection_rate),
            ("recovery_rate", self.recovery_rate),
            ("death_risk", self.death_risk),
        ];
        for (name, value) in rates {
            if !(0.0..=1.0).contains(&value) {
                return Err(SimConfigError::RateOutOfRange { name, value });
            }
        }
        if !(self.interaction_distance > 0.0) || !self.interaction_distance.is_finite() {
            return Err(SimConfigError::NonPositiveInteractionDistance {
                value: self.interaction_distance,
            });
        }
        if !(self.plane_width > 0.0 && self.plane_height > 0.0)
            || !self.plane_width.is_finite()
            || !self.plane_height.is_finite()
        {
            return Err(SimConfigError::NonPositivePlane {
                width: self.plane_width,
                height: self.plane_height,
            });
        }
        if !(self.moving_range >= 0.0) || !self.moving_range.is_finite() {
            return Err(SimConfigError::NegativeMovingRange {
                value: self.moving_range,
            });
        }
        Ok(())
    }
}
