//! Model Setup
//!
//! Initial population, standard reporters and frame encoders for the bundled
//! models.

pub mod population;
pub mod reporting;

pub use population::*;
pub use reporting::*;
