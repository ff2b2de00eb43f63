mod sink;

use anyhow::{Context, Result};
use clap::Parser;
use outbreak_core::config::SimConfig;
use outbreak_core::multirun::{mean_series, run_replicates};
use outbreak_core::world::{RunSummary, World};
use sink::CsvSink;
use std::path::PathBuf;
use tracing::info;

/// Spatial SIRD epidemic simulator over a bounded 2D plane.
#[derive(Parser, Debug)]
#[command(name = "outbreak", version)]
struct Cli {
    /// Total number of agents.
    #[arg(long, default_value_t = 1000)]
    population: usize,

    /// Agents that start out infected.
    #[arg(long, default_value_t = 50)]
    infected: usize,

    /// Plane width.
    #[arg(long, default_value_t = 55.0)]
    width: f64,

    /// Plane height.
    #[arg(long, default_value_t = 55.0)]
    height: f64,

    /// Per-contact infection probability.
    #[arg(long, default_value_t = 0.3)]
    infection_rate: f64,

    /// Per-step recovery probability for infected agents.
    #[arg(long, default_value_t = 0.8)]
    recovery_rate: f64,

    /// Per-step death probability, checked before recovery.
    #[arg(long, default_value_t = 0.01)]
    death_risk: f64,

    /// Maximum transmission distance.
    #[arg(long, default_value_t = 2.0)]
    distance: f64,

    /// Maximum per-axis displacement per step.
    #[arg(long, default_value_t = 5.0)]
    moving_range: f64,

    /// Number of simulation steps.
    #[arg(long, default_value_t = 25)]
    steps: usize,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Independent replicates; more than one writes the per-step mean series.
    #[arg(long, default_value_t = 1)]
    runs: usize,

    /// Output CSV path.
    #[arg(long, default_value = "outbreak.csv")]
    out: PathBuf,

    /// Optional JSON dump of the full run summary (or all replicate summaries).
    #[arg(long)]
    summary_json: Option<PathBuf>,

    /// Comma-separated steps at which to capture agent positions into the
    /// JSON summary (single-run only).
    #[arg(long, value_delimiter = ',')]
    snapshot_steps: Vec<usize>,
}

impl Cli {
    fn sim_config(&self) -> SimConfig {
        SimConfig {
            population_size: self.population,
            initial_infected: self.infected,
            plane_width: self.width,
            plane_height: self.height,
            infection_rate: self.infection_rate,
            recovery_rate: self.recovery_rate,
            death_risk: self.death_risk,
            interaction_distance: self.distance,
            moving_range: self.moving_range,
            seed: self.seed,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.sim_config();
    if cli.runs > 1 {
        run_replicate_set(&cli, &config)
    } else {
        run_single(&cli, &config)
    }
}

fn run_single(cli: &Cli, config: &SimConfig) -> Result<()> {
    let mut world =
        World::try_new(config.clone()).context("invalid simulation configuration")?;
    let summary = world
        .try_run_with_snapshots(cli.steps, &cli.snapshot_steps)
        .context("simulation run failed")?;
    info!(
        steps_run = summary.steps_run,
        terminated_early = summary.terminated_early,
        final_infected = summary.series.last().map(|c| c.infected).unwrap_or(0),
        "run complete"
    );

    write_series(&cli.out, &summary)?;
    if let Some(path) = &cli.summary_json {
        write_summary_json(path, &summary)?;
    }
    Ok(())
}

fn run_replicate_set(cli: &Cli, config: &SimConfig) -> Result<()> {
    let seeds: Vec<u64> = (0..cli.runs as u64)
        .map(|i| cli.seed.wrapping_add(i))
        .collect();
    let summaries =
        run_replicates(config, cli.steps, &seeds).context("replicate set failed")?;
    info!(runs = summaries.len(), "replicates complete");

    let mean = mean_series(&summaries);
    let mut csv = CsvSink::create(&cli.out)
        .with_context(|| format!("cannot create {}", cli.out.display()))?;
    for row in &mean {
        if let Err(err) = csv.append_mean(row) {
            let _ = csv.discard();
            return Err(err).context("failed writing mean series; partial file removed");
        }
    }
    let path = csv.finish().context("failed closing CSV output")?;
    info!(path = %path.display(), rows = mean.len(), "mean series written");

    if let Some(path) = &cli.summary_json {
        let file = std::fs::File::create(path)
            .with_context(|| format!("cannot create {}", path.display()))?;
        serde_json::to_writer_pretty(file, &summaries).context("failed encoding summaries")?;
        info!(path = %path.display(), "replicate summaries written");
    }
    Ok(())
}

fn write_series(path: &PathBuf, summary: &RunSummary) -> Result<()> {
    let mut csv =
        CsvSink::create(path).with_context(|| format!("cannot create {}", path.display()))?;
    for counts in &summary.series {
        if let Err(err) = csv.append(counts) {
            let _ = csv.discard();
            return Err(err).context("failed writing series; partial file removed");
        }
    }
    let written = csv.finish().context("failed closing CSV output")?;
    info!(path = %written.display(), rows = summary.series.len(), "series written");
    Ok(())
}

fn write_summary_json(path: &PathBuf, summary: &RunSummary) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("cannot create {}", path.display()))?;
    serde_json::to_writer_pretty(file, summary).context("failed encoding run summary")?;
    info!(path = %path.display(), "summary written");
    Ok(())
}
