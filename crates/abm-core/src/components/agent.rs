//! Agent Components
//!
//! Identity, position and the behavior hook shared by every agent.

use abm_data::Coord;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::error::SimError;

/// Unique identifier for an agent, assigned in spawn order
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub u64);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agent_{:04}", self.0)
    }
}

/// Component: the cell an agent stands in. Mirrors the grid's own index and
/// is only written through the placement helpers.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position(pub Coord);

/// What an agent does when the scheduler activates it.
///
/// `act` gets the whole world: the agent's own components, the [`Grid`] for
/// neighbor lookups, the shared [`SimRng`], and, through entities returned by
/// the grid, the components of neighboring agents.
///
/// [`Grid`]: crate::components::grid::Grid
/// [`SimRng`]: crate::rng::SimRng
pub trait AgentBehavior: Send + Sync + 'static {
    /// Short label for logs.
    fn name(&self) -> &'static str;

    fn act(&self, agent: Entity, world: &mut World) -> Result<(), SimError>;
}

/// Component: shared handle to an agent's behavior
#[derive(Component, Clone)]
pub struct Behavior(Arc<dyn AgentBehavior>);

impl Behavior {
    pub fn new(behavior: impl AgentBehavior) -> Self {
        Self(Arc::new(behavior))
    }

    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    pub fn act(&self, agent: Entity, world: &mut World) -> Result<(), SimError> {
        self.0.act(agent, world)
    }
}

impl fmt::Debug for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Behavior").field(&self.name()).finish()
    }
}
