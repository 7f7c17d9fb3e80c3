//! Model Reporting
//!
//! Per-model reporter sets, grid frame encoders and end-of-run summaries.

use bevy_ecs::prelude::*;

use crate::components::{Health, HealthState, Wealth};
use crate::config::ModelConfig;
use crate::error::SimError;
use crate::output::{CellEncoder, EpidemicSummary, Reporter, RunSummary, WealthSummary};
use crate::simulation::Simulation;
use crate::systems::wealth_by_agent;

fn wealth_value(w: &Wealth) -> f64 {
    w.0 as f64
}

/// Epidemic: one count per health state. Wealth: Gini, Mean, Min, Max, Total.
pub fn standard_reporters(model: &ModelConfig) -> Vec<Reporter> {
    match model {
        ModelConfig::Epidemic(_) => HealthState::ALL
            .into_iter()
            .map(|state| Reporter::count::<Health>(state.label(), move |h| h.is(state)))
            .collect(),
        ModelConfig::Wealth(_) => vec![
            Reporter::gini::<Wealth>("Gini", wealth_value),
            Reporter::mean::<Wealth>("Mean", wealth_value),
            Reporter::min::<Wealth>("Min", wealth_value),
            Reporter::max::<Wealth>("Max", wealth_value),
            Reporter::sum::<Wealth>("Total", wealth_value),
        ],
    }
}

/// Epidemic cells show 1 when any occupant is infected, else 2 when any has
/// recovered, else 0. The value is a rank over the whole bucket, so occupant
/// order never changes it. Wealth cells show the occupants' total wealth.
pub fn cell_encoder(model: &ModelConfig) -> CellEncoder {
    match model {
        ModelConfig::Epidemic(_) => Box::new(|world: &World, occupants: &[Entity]| {
            let has = |state| {
                occupants
                    .iter()
                    .any(|&e| world.get::<Health>(e).is_some_and(|h| h.is(state)))
            };
            let cell = if has(HealthState::Infected) {
                HealthState::Infected
            } else if has(HealthState::Recovered) {
                HealthState::Recovered
            } else {
                HealthState::Susceptible
            };
            Some(cell.code())
        }),
        ModelConfig::Wealth(_) => Box::new(|world: &World, occupants: &[Entity]| {
            Some(
                occupants
                    .iter()
                    .filter_map(|&e| world.get::<Wealth>(e))
                    .map(wealth_value)
                    .sum(),
            )
        }),
    }
}

/// End-of-run report for the model that ran.
pub fn summarize(sim: &mut Simulation, model: &ModelConfig) -> Result<RunSummary, SimError> {
    Ok(match model {
        ModelConfig::Epidemic(_) => RunSummary::Epidemic(EpidemicSummary::from_history(sim.history())?),
        ModelConfig::Wealth(_) => {
            let wealths = wealth_by_agent(sim.world_mut());
            RunSummary::Wealth(WealthSummary::from_run(&wealths, sim.history())?)
        }
    })
}
