//! Discrete-time spatial SIRD epidemic simulation.
//!
//! Agents are independent points on a bounded 2D plane. Each step resolves
//! deaths and recoveries, moves agents, then spreads infection between
//! in-range pairs, using a uniform-grid index over the susceptible subset to
//! keep neighbor queries proportional to local density rather than the whole
//! population. Runs are deterministic for a fixed seed.

pub mod agent;
pub mod config;
pub mod multirun;
pub mod spatial;
pub mod world;

pub use agent::{Agent, HealthState};
pub use config::{SimConfig, SimConfigError};
pub use world::{
    HealthCounts, MeanStepCounts, RunError, RunSummary, SnapshotFrame, StepCounts, World,
    WorldInitError,
};
