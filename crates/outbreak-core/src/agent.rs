use rand::Rng;

/// Health compartment of a single agent. Exactly one holds at any time;
/// `Recovered` and `Dead` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HealthState {
    Susceptible,
    Infected,
    Recovered,
    Dead,
}

/// A simulated individual: a point on the plane plus its health state.
///
/// Agents are created once at population initialization and never destroyed.
/// A dead agent stays in the population as an inert record so the aggregate
/// counts keep summing to the population size.
#[derive(Clone, Debug)]
pub struct Agent {
    pub position: [f64; 2],
    pub health: HealthState,
    /// Step index of the last health transition. An agent that changed state
    /// this step neither resolves nor spreads again within the same step.
    pub last_transition_step: usize,
}

impl Agent {
    pub fn new(position: [f64; 2], health: HealthState) -> Self {
        Self {
            position,
            health,
            last_transition_step: 0,
        }
    }

    /// Displace the agent by a uniform offset in `[-moving_range, +moving_range]`
    /// drawn independently per axis, clamped to the plane rectangle.
    ///
    /// Dead agents do not move (and consume no draws). Recovered agents keep
    /// moving; they just can no longer be infected.
    pub fn attempt_move<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        moving_range: f64,
        plane: [f64; 2],
    ) {
        if self.health == HealthState::Dead {
            return;
        }
        let dx = rng.random_range(-moving_range..=moving_range);
        let dy = rng.random_range(-moving_range..=moving_range);
        self.position[0] = (self.position[0] + dx).clamp(0.0, plane[0]);
        self.position[1] = (self.position[1] + dy).clamp(0.0, plane[1]);
    }
}
