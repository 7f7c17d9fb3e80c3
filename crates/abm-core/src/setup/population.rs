//! Population Setup
//!
//! Scatters a model's agents over the grid. Each agent draws its cell as `x`
//! then `y`, in spawn order.

use bevy_ecs::prelude::*;

use crate::components::{Behavior, Health, Wealth};
use crate::config::{EpidemicConfig, ModelConfig, WealthConfig};
use crate::error::SimError;
use crate::simulation::Simulation;
use crate::systems::{Contagion, Exchange};

/// Spawns the model's initial population. Returns the number of agents.
pub fn populate(sim: &mut Simulation, model: &ModelConfig) -> Result<usize, SimError> {
    match model {
        ModelConfig::Epidemic(epidemic) => populate_epidemic(sim, epidemic),
        ModelConfig::Wealth(wealth) => populate_wealth(sim, wealth),
    }
}

/// The first `initial_infected` agents start infected (capped at the
/// population), everyone else susceptible.
pub fn populate_epidemic(sim: &mut Simulation, config: &EpidemicConfig) -> Result<usize, SimError> {
    let (width, height) = {
        let grid = sim.grid()?;
        (grid.width(), grid.height())
    };
    let population = config.population_for(width, height);
    let infected = config.initial_infected.min(population);
    if infected < config.initial_infected {
        tracing::warn!(
            requested = config.initial_infected,
            population,
            "initial infections capped at population size"
        );
    }

    let behavior = Behavior::new(Contagion {
        infection_rate: config.infection_rate,
        recovery_time: config.recovery_time,
    });
    for i in 0..population {
        let at = sim.random_cell()?;
        let health = if i < infected {
            Health::infected()
        } else {
            Health::susceptible()
        };
        sim.spawn_agent(at, behavior.clone(), health)?;
    }
    Ok(population)
}

pub fn populate_wealth(sim: &mut Simulation, config: &WealthConfig) -> Result<usize, SimError> {
    let behavior = Behavior::new(Exchange);
    for _ in 0..config.agents {
        let at = sim.random_cell()?;
        sim.spawn_agent(at, behavior.clone(), Wealth(config.initial_wealth))?;
    }
    Ok(config.agents)
}

/// Health of every agent, in id order.
pub fn health_by_agent(sim: &mut Simulation) -> Vec<Health> {
    let agents = sim.agents();
    let world: &World = sim.world();
    agents
        .into_iter()
        .filter_map(|e| world.get::<Health>(e).copied())
        .collect()
}
