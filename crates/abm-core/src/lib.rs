//! Grid Agent-Based Simulation Engine
//!
//! Agents live in the cells of a toroidal grid and are activated once per
//! tick in a freshly shuffled order. After every tick a set of named reducers
//! summarizes the population into one row of a time series. Two models ship
//! with the engine: an SIR epidemic and a random wealth exchange.

pub mod components;
pub mod config;
pub mod error;
pub mod output;
pub mod rng;
pub mod setup;
pub mod simulation;
pub mod systems;

pub use components::*;
pub use config::{EpidemicConfig, GridConfig, ModelConfig, RunConfig, SimConfig, WealthConfig};
pub use error::{ConfigError, GridError, SimError};
pub use output::{gini_coefficient, CellEncoder, MetricsCollector, Reporter, RunSummary};
pub use rng::SimRng;
pub use simulation::Simulation;
