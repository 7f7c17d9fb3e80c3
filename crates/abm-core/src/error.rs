//! Error Types
//!
//! Configuration errors are user-facing and stop a run before it starts.
//! Grid errors signal broken placement bookkeeping and should not occur under
//! correct use of the engine.

use abm_data::{Coord, HistoryError};
use bevy_ecs::entity::Entity;
use thiserror::Error;

/// Errors loading or validating a simulation configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("invalid configuration: {field} {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Grid placement errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("grid dimensions {width}x{height} are invalid")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("coordinate {0} lies outside a bounded grid")]
    InvalidCoordinate(Coord),
    #[error("agent {0:?} is not on the grid")]
    AgentNotFound(Entity),
    #[error("agent {0:?} is already on the grid")]
    AlreadyPlaced(Entity),
    #[error("agent {agent:?} placement disagrees with its bucket: {detail}")]
    Desynced { agent: Entity, detail: String },
}

/// Top-level engine error.
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error("agent {agent:?} has no {component} component")]
    MissingComponent {
        agent: Entity,
        component: &'static str,
    },
    #[error("world is missing the {0} resource")]
    MissingResource(&'static str),
    #[error("wealth of agent {agent:?} would exceed u64::MAX")]
    WealthOverflow { agent: Entity },
}
