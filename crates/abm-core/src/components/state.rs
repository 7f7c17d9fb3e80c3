//! State Components
//!
//! The per-agent payloads of the two bundled models: a health tag for the
//! epidemic and a wealth scalar for the exchange economy.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Infection status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum HealthState {
    #[default]
    Susceptible,
    Infected,
    Recovered,
}

impl HealthState {
    pub const ALL: [HealthState; 3] = [
        HealthState::Susceptible,
        HealthState::Infected,
        HealthState::Recovered,
    ];

    /// Column name used by the epidemic reporters.
    pub fn label(self) -> &'static str {
        match self {
            HealthState::Susceptible => "Susceptible",
            HealthState::Infected => "Infected",
            HealthState::Recovered => "Recovered",
        }
    }

    /// Numeric code used in grid frames (S=0, I=1, R=2).
    pub fn code(self) -> f64 {
        match self {
            HealthState::Susceptible => 0.0,
            HealthState::Infected => 1.0,
            HealthState::Recovered => 2.0,
        }
    }
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Component: epidemic state plus ticks spent infected
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Health {
    pub state: HealthState,
    pub infected_for: u32,
}

impl Health {
    pub fn susceptible() -> Self {
        Self::default()
    }

    pub fn infected() -> Self {
        Self {
            state: HealthState::Infected,
            infected_for: 0,
        }
    }

    pub fn is(&self, state: HealthState) -> bool {
        self.state == state
    }
}

/// Component: non-negative wealth
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Wealth(pub u64);
