//! ECS components and resources that make up the simulated world.

pub mod agent;
pub mod grid;
pub mod state;

pub use agent::{AgentBehavior, AgentId, Behavior, Position};
pub use grid::{Grid, Neighborhood};
pub use state::{Health, HealthState, Wealth};
