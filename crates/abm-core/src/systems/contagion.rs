//! Contagion Behavior
//!
//! SIR epidemic on the grid. An infected agent exposes every susceptible
//! Moore neighbor once per activation, then moves one tick closer to
//! recovery.
//!
//! Infection is written straight into the neighbor's `Health` during the
//! infecting agent's turn. A neighbor whose own activation comes later in the
//! same tick therefore already acts as infected, so one tick can carry an
//! infection several cells. Outcomes depend on the activation order.

use bevy_ecs::prelude::*;

use crate::components::{AgentBehavior, Health, HealthState};
use crate::error::SimError;
use crate::systems::placement::{neighbors_of, position_of, rng};

/// Epidemic parameters shared by every agent of the model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contagion {
    /// Per-neighbor, per-activation infection probability in `[0, 1]`
    pub infection_rate: f64,
    /// Activations spent infected before recovering (positive)
    pub recovery_time: u32,
}

fn health_of(world: &World, agent: Entity) -> Result<Health, SimError> {
    world
        .get::<Health>(agent)
        .copied()
        .ok_or(SimError::MissingComponent {
            agent,
            component: "Health",
        })
}

impl Contagion {
    /// Exposes the susceptible neighbors of `agent`. One uniform draw per
    /// susceptible neighbor, in neighbor order. Returns how many were infected.
    pub fn infect_neighbors(&self, agent: Entity, world: &mut World) -> Result<usize, SimError> {
        let at = position_of(world, agent)?;
        let susceptible: Vec<Entity> = neighbors_of(world, at, false)?
            .into_iter()
            .filter(|&n| {
                world
                    .get::<Health>(n)
                    .is_some_and(|h| h.is(HealthState::Susceptible))
            })
            .collect();

        let mut infected = 0;
        for neighbor in susceptible {
            if !rng(world)?.chance(self.infection_rate) {
                continue;
            }
            if let Some(mut health) = world.get_mut::<Health>(neighbor) {
                health.state = HealthState::Infected;
                health.infected_for = 0;
                infected += 1;
            }
        }
        if infected > 0 {
            tracing::trace!(?agent, %at, infected, "infection spread");
        }
        Ok(infected)
    }

    /// Advances the infection clock; recovers once it reaches `recovery_time`.
    fn progress(&self, agent: Entity, world: &mut World) -> Result<(), SimError> {
        let mut health = world
            .get_mut::<Health>(agent)
            .ok_or(SimError::MissingComponent {
                agent,
                component: "Health",
            })?;
        health.infected_for += 1;
        if health.infected_for >= self.recovery_time {
            health.state = HealthState::Recovered;
            health.infected_for = 0;
        }
        Ok(())
    }
}

impl AgentBehavior for Contagion {
    fn name(&self) -> &'static str {
        "contagion"
    }

    fn act(&self, agent: Entity, world: &mut World) -> Result<(), SimError> {
        if !health_of(world, agent)?.is(HealthState::Infected) {
            return Ok(());
        }
        self.infect_neighbors(agent, world)?;
        self.progress(agent, world)
    }
}
