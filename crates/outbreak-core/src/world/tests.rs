use super::*;
use crate::agent::{Agent, HealthState};
use crate::config::SimConfig;

fn small_config() -> SimConfig {
    SimConfig {
        population_size: 200,
        initial_infected: 10,
        plane_width: 30.0,
        plane_height: 30.0,
        infection_rate: 0.5,
        recovery_rate: 0.2,
        death_risk: 0.05,
        interaction_distance: 1.5,
        moving_range: 1.0,
        seed: 1234,
    }
}

#[test]
fn init_builds_grid_from_the_susceptible_subset() {
    let world = World::try_new(small_config()).unwrap();
    assert_eq!(world.counts().infected, 10);
    assert_eq!(world.counts().susceptible, 190);
    world.assert_invariants();
}

#[test]
fn init_rejects_invalid_config() {
    let config = SimConfig {
        interaction_distance: 0.0,
        ..small_config()
    };
    assert!(matches!(
        World::try_new(config),
        Err(WorldInitError::Config(_))
    ));
}

#[test]
fn from_agents_rejects_population_mismatch() {
    let config = small_config();
    let agents = vec![Agent::new([1.0, 1.0], HealthState::Susceptible); 3];
    assert!(matches!(
        World::from_agents(agents, config),
        Err(WorldInitError::PopulationMismatch {
            expected: 200,
            actual: 3,
        })
    ));
}

#[test]
fn counts_sum_to_population_at_every_step() {
    let mut world = World::try_new(small_config()).unwrap();
    let summary = world.run(50);
    assert!(!summary.series.is_empty());
    for counts in &summary.series {
        assert_eq!(counts.total(), 200);
    }
}

#[test]
fn grid_matches_susceptible_set_after_every_step() {
    let mut world = World::try_new(small_config()).unwrap();
    for _ in 0..30 {
        world.step();
        world.assert_invariants();
        if world.counts().infected == 0 {
            break;
        }
    }
}

#[test]
fn transitions_follow_the_state_machine() {
    let mut world = World::try_new(small_config()).unwrap();
    for _ in 0..30 {
        let before: Vec<Agent> = world.agents.clone();
        world.step();
        let step = world.step_index();
        for (prev, next) in before.iter().zip(world.agents.iter()) {
            if prev.health == next.health {
                assert_eq!(prev.last_transition_step, next.last_transition_step);
                continue;
            }
            // only the three legal edges, exactly one per agent per step
            match (prev.health, next.health) {
                (HealthState::Susceptible, HealthState::Infected)
                | (HealthState::Infected, HealthState::Recovered)
                | (HealthState::Infected, HealthState::Dead) => {}
                (from, to) => panic!("illegal transition {from:?} -> {to:?}"),
            }
            assert_eq!(next.last_transition_step, step);
            assert!(prev.last_transition_step < step);
        }
        if world.counts().infected == 0 {
            break;
        }
    }
}

#[test]
fn recovered_and_dead_are_terminal() {
    let config = SimConfig {
        recovery_rate: 0.5,
        death_risk: 0.3,
        ..small_config()
    };
    let mut world = World::try_new(config).unwrap();
    let mut settled: Vec<Option<HealthState>> = vec![None; world.agents.len()];
    for _ in 0..40 {
        world.step();
        for (idx, agent) in world.agents.iter().enumerate() {
            match settled[idx] {
                None => {
                    if matches!(agent.health, HealthState::Recovered | HealthState::Dead) {
                        settled[idx] = Some(agent.health);
                    }
                }
                Some(terminal) => assert_eq!(agent.health, terminal),
            }
        }
        if world.counts().infected == 0 {
            break;
        }
    }
}

#[test]
fn certain_resolution_terminates_within_two_steps() {
    let config = SimConfig {
        death_risk: 1.0,
        recovery_rate: 1.0,
        ..small_config()
    };
    let mut world = World::try_new(config).unwrap();
    let summary = world.run(100);
    assert!(summary.steps_run <= 2);
    assert_eq!(summary.series.last().unwrap().infected, 0);
    assert!(summary.terminated_early);
}

#[test]
fn single_agent_run_stops_at_step_one() {
    let config = SimConfig {
        population_size: 1,
        initial_infected: 1,
        recovery_rate: 1.0,
        death_risk: 0.0,
        ..small_config()
    };
    let mut world = World::try_new(config).unwrap();
    let summary = world.run(100);
    assert_eq!(summary.steps_run, 1);
    assert_eq!(summary.series[0].recovered, 1);
    assert!(summary.terminated_early);
}

#[test]
fn run_without_infected_stops_immediately() {
    let config = SimConfig {
        initial_infected: 0,
        ..small_config()
    };
    let mut world = World::try_new(config).unwrap();
    let summary = world.run(10);
    assert_eq!(summary.steps_run, 1);
    assert!(summary.terminated_early);
    assert_eq!(summary.series[0].susceptible, 200);
}

#[test]
fn run_rejects_excessive_step_counts() {
    let mut world = World::try_new(small_config()).unwrap();
    assert!(matches!(
        world.try_run(World::MAX_RUN_STEPS + 1),
        Err(RunError::TooManySteps { .. })
    ));
}

#[test]
fn same_seed_reproduces_the_series() {
    let mut a = World::try_new(small_config()).unwrap();
    let mut b = World::try_new(small_config()).unwrap();
    assert_eq!(a.run(40).series, b.run(40).series);
}

#[test]
fn different_seeds_diverge() {
    let mut a = World::try_new(small_config()).unwrap();
    let mut b = World::try_new(SimConfig {
        seed: 4321,
        ..small_config()
    })
    .unwrap();
    assert_ne!(a.run(40).series, b.run(40).series);
}

// Grid-query correctness against the O(n^2) reference: with certain
// infection, no movement, and no resolution, the agents infected in step one
// are exactly the susceptibles that start within interaction range of an
// initially infected agent.
#[test]
fn first_step_infections_match_brute_force() {
    let config = SimConfig {
        population_size: 100,
        initial_infected: 5,
        plane_width: 50.0,
        plane_height: 50.0,
        infection_rate: 1.0,
        recovery_rate: 0.0,
        death_risk: 0.0,
        interaction_distance: 1.0,
        moving_range: 0.0,
        seed: 7,
    };
    let mut world = World::try_new(config.clone()).unwrap();
    let initial = world.agents.clone();

    let infected_positions: Vec<[f64; 2]> = initial
        .iter()
        .filter(|a| a.health == HealthState::Infected)
        .map(|a| a.position)
        .collect();
    let in_range = |p: [f64; 2]| {
        infected_positions.iter().any(|q| {
            let dx = p[0] - q[0];
            let dy = p[1] - q[1];
            dx * dx + dy * dy <= config.interaction_distance * config.interaction_distance
        })
    };
    let expected_new = initial
        .iter()
        .filter(|a| a.health == HealthState::Susceptible && in_range(a.position))
        .count();

    let counts = world.step();
    assert_eq!(counts.infected, 5 + expected_new);
    assert_eq!(counts.susceptible, 95 - expected_new);
}

// A freshly infected agent must not act as a spreader in the same step:
// with three collinear agents spaced just inside interaction range, the
// infection front advances one hop per step, not two.
#[test]
fn fresh_infections_do_not_spread_in_the_same_step() {
    let config = SimConfig {
        population_size: 3,
        initial_infected: 0,
        plane_width: 10.0,
        plane_height: 10.0,
        infection_rate: 1.0,
        recovery_rate: 0.0,
        death_risk: 0.0,
        interaction_distance: 1.0,
        moving_range: 0.0,
        seed: 1,
    };
    let agents = vec![
        Agent::new([0.0, 5.0], HealthState::Infected),
        Agent::new([0.9, 5.0], HealthState::Susceptible),
        Agent::new([1.8, 5.0], HealthState::Susceptible),
    ];
    let mut world = World::from_agents(agents, config).unwrap();

    let counts = world.step();
    assert_eq!(counts.infected, 2, "only the middle agent is in range");
    assert_eq!(world.agents[1].health, HealthState::Infected);
    assert_eq!(world.agents[2].health, HealthState::Susceptible);

    let counts = world.step();
    assert_eq!(counts.infected, 3, "the front reaches the far agent a step later");
}

#[test]
fn recovered_agents_are_never_reinfected() {
    let config = SimConfig {
        population_size: 2,
        initial_infected: 0,
        plane_width: 5.0,
        plane_height: 5.0,
        infection_rate: 1.0,
        recovery_rate: 0.0,
        death_risk: 0.0,
        interaction_distance: 5.0,
        moving_range: 0.0,
        seed: 1,
    };
    let agents = vec![
        Agent::new([1.0, 1.0], HealthState::Infected),
        Agent::new([1.2, 1.0], HealthState::Recovered),
    ];
    let mut world = World::from_agents(agents, config).unwrap();
    for _ in 0..5 {
        world.step();
        assert_eq!(world.agents[1].health, HealthState::Recovered);
    }
}

#[test]
fn snapshots_partition_the_population() {
    let mut world = World::try_new(small_config()).unwrap();
    let summary = world.try_run_with_snapshots(5, &[1, 3]).unwrap();
    assert!(!summary.snapshots.is_empty());
    for frame in &summary.snapshots {
        let total = frame.susceptible.len()
            + frame.infected.len()
            + frame.recovered.len()
            + frame.dead.len();
        assert_eq!(total, 200);
        assert!(frame.step == 1 || frame.step == 3);
    }
}
