use super::World;
use crate::agent::HealthState;
use crate::world::metrics::StepCounts;
use rand::Rng;

impl World {
    /// Advance the simulation by one step: resolution, movement, spread, in
    /// that fixed order. Later phases depend on the health states produced by
    /// earlier phases within the same step.
    pub fn step(&mut self) -> StepCounts {
        self.step_index += 1;
        self.resolution_phase();
        self.movement_phase();
        self.spread_phase();
        #[cfg(debug_assertions)]
        self.assert_invariants();
        self.counts.at_step(self.step_index)
    }

    /// Each infected agent that did not change state this step draws for
    /// death first, then for recovery. At most one transition per agent per
    /// step; a draw below the rate means the event occurs.
    fn resolution_phase(&mut self) {
        let step = self.step_index;
        for agent in &mut self.agents {
            if agent.health != HealthState::Infected || agent.last_transition_step == step {
                continue;
            }
            if self.rng.random::<f64>() < self.config.death_risk {
                agent.health = HealthState::Dead;
                agent.last_transition_step = step;
                self.counts
                    .transition(HealthState::Infected, HealthState::Dead);
            } else if self.rng.random::<f64>() < self.config.recovery_rate {
                agent.health = HealthState::Recovered;
                agent.last_transition_step = step;
                self.counts
                    .transition(HealthState::Infected, HealthState::Recovered);
            }
        }
    }

    /// Every non-dead agent attempts a move; susceptible agents additionally
    /// relocate in the grid with their pre- and post-move positions.
    fn movement_phase(&mut self) {
        let plane = [self.config.plane_width, self.config.plane_height];
        let moving_range = self.config.moving_range;
        for idx in 0..self.agents.len() {
            let agent = &mut self.agents[idx];
            if agent.health == HealthState::Dead {
                continue;
            }
            let old_position = agent.position;
            agent.attempt_move(&mut self.rng, moving_range, plane);
            if agent.health == HealthState::Susceptible {
                let new_position = agent.position;
                self.grid.relocate(idx, old_position, new_position);
            }
        }
    }

    /// Each eligible infected agent queries the 3x3 cell block around its own
    /// cell and draws once per in-range susceptible candidate. A successful
    /// draw removes the candidate from the grid immediately, so it cannot be
    /// infected again by a later spreader in the same phase, and marks it
    /// with the current step so it neither spreads nor resolves this step.
    fn spread_phase(&mut self) {
        let step = self.step_index;
        let distance_sq = self.config.interaction_distance * self.config.interaction_distance;
        for spreader_idx in 0..self.agents.len() {
            let spreader = &self.agents[spreader_idx];
            if spreader.health != HealthState::Infected || spreader.last_transition_step == step {
                continue;
            }
            let origin = spreader.position;
            // Snapshot the current candidate set; grid removals below must
            // not alias the query we are iterating.
            let candidates: Vec<usize> = self
                .grid
                .neighbors_of_cell(self.grid.cell_of(origin))
                .collect();
            for candidate_idx in candidates {
                let candidate = &self.agents[candidate_idx];
                if candidate.health != HealthState::Susceptible {
                    continue;
                }
                let dx = candidate.position[0] - origin[0];
                let dy = candidate.position[1] - origin[1];
                if dx * dx + dy * dy > distance_sq {
                    continue;
                }
                if self.rng.random::<f64>() < self.config.infection_rate {
                    let position = candidate.position;
                    self.grid.remove(candidate_idx, position);
                    let candidate = &mut self.agents[candidate_idx];
                    candidate.health = HealthState::Infected;
                    candidate.last_transition_step = step;
                    self.counts
                        .transition(HealthState::Susceptible, HealthState::Infected);
                }
            }
        }
    }
}
