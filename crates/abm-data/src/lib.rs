//! Shared data types for the grid simulation engine.
//!
//! This crate contains pure data structures with no simulation logic:
//! coordinates, metric snapshots, the append-only history, and grid frames.
//! Reporting and visualization layers consume these without depending on the
//! engine itself.

pub mod coord;
pub mod frame;
pub mod history;
pub mod snapshot;

#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures;

pub use coord::Coord;
pub use frame::GridFrame;
pub use history::{Extremum, History, HistoryError};
pub use snapshot::{Metric, MetricsSnapshot};

/// Discrete simulation step number. Tick 0 is the initial state.
pub type Tick = u64;
