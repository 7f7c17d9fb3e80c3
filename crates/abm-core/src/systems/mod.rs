//! Systems
//!
//! The scheduler, the placement helpers that keep grid and positions in sync,
//! and the agent behaviors of the bundled models.

pub mod contagion;
pub mod exchange;
pub mod placement;
pub mod scheduler;

pub use contagion::Contagion;
pub use exchange::{trade, wealth_by_agent, Exchange};
pub use placement::{
    agents_by_id, move_agent, neighbors_of, occupants_of, place_agent, position_of,
    unplace_agent, verify_placements,
};
pub use scheduler::{Phase, Scheduler};
