//! Sample data fixtures for testing.
//!
//! Enable the `test-fixtures` feature to access these helpers from other
//! crates.
//!
//! ```ignore
//! // [dev-dependencies]
//! // abm-data = { path = "../abm-data", features = ["test-fixtures"] }
//!
//! let history = abm_data::fixtures::epidemic_history();
//! ```

use crate::{History, MetricsSnapshot, Tick};

/// Column names of the epidemic model.
pub const SIR_SCHEMA: [&str; 3] = ["Susceptible", "Infected", "Recovered"];

/// Small SIR curve over a population of 20: infection peaks at 9 on tick 3
/// and again on tick 4, then burns out.
pub fn epidemic_history() -> History {
    let rows: [(f64, f64, f64); 7] = [
        (18.0, 2.0, 0.0),
        (15.0, 5.0, 0.0),
        (11.0, 8.0, 1.0),
        (8.0, 9.0, 3.0),
        (6.0, 9.0, 5.0),
        (6.0, 4.0, 10.0),
        (6.0, 0.0, 14.0),
    ];
    let mut history = History::new(SIR_SCHEMA.iter().map(|s| s.to_string()).collect());
    for (tick, (s, i, r)) in rows.into_iter().enumerate() {
        let snapshot = MetricsSnapshot::new(tick as Tick)
            .with(SIR_SCHEMA[0], s)
            .with(SIR_SCHEMA[1], i)
            .with(SIR_SCHEMA[2], r);
        history
            .push(snapshot)
            .expect("fixture rows follow the schema");
    }
    history
}

/// Gini series of a wealth run that starts perfectly equal.
pub fn wealth_history() -> History {
    let gini = [0.0, 0.18, 0.31, 0.42];
    let mut history = History::new(vec!["Gini".to_string(), "Total".to_string()]);
    for (tick, g) in gini.into_iter().enumerate() {
        let snapshot = MetricsSnapshot::new(tick as Tick)
            .with("Gini", g)
            .with("Total", 1000.0);
        history
            .push(snapshot)
            .expect("fixture rows follow the schema");
    }
    history
}
