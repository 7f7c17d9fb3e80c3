//! Metrics History
//!
//! Append-only sequence of snapshots, indexed by tick starting at 0.
//!
//! # Example
//!
//! ```
//! use abm_data::{History, MetricsSnapshot};
//!
//! let mut history = History::new(vec!["Infected".to_string()]);
//! history.push(MetricsSnapshot::new(0).with("Infected", 5.0)).unwrap();
//! history.push(MetricsSnapshot::new(1).with("Infected", 9.0)).unwrap();
//!
//! let peak = history.max_of("Infected").unwrap();
//! assert_eq!((peak.tick, peak.value), (1, 9.0));
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{MetricsSnapshot, Tick};

/// Errors raised when a snapshot does not fit the history.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HistoryError {
    #[error("snapshot for tick {found} appended where tick {expected} was expected")]
    OutOfOrder { expected: Tick, found: Tick },
    #[error("snapshot metrics {found:?} do not match history schema {expected:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },
    #[error("unknown metric '{0}'")]
    UnknownMetric(String),
    #[error("metric schema is locked once the first snapshot is collected")]
    SchemaLocked,
    #[error("history is empty")]
    Empty,
}

/// A metric's extreme value and the first tick it occurred at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extremum {
    pub tick: Tick,
    pub value: f64,
}

/// Ordered, immutable-once-written record of per-tick snapshots
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    schema: Vec<String>,
    snapshots: Vec<MetricsSnapshot>,
}

impl History {
    pub fn new(schema: Vec<String>) -> Self {
        Self {
            schema,
            snapshots: Vec::new(),
        }
    }

    /// Metric names every snapshot carries, in order.
    pub fn schema(&self) -> &[String] {
        &self.schema
    }

    /// Appends the next snapshot. Its tick must equal the current length and
    /// its metric names must match the schema exactly.
    pub fn push(&mut self, snapshot: MetricsSnapshot) -> Result<(), HistoryError> {
        let expected = self.snapshots.len() as Tick;
        if snapshot.tick != expected {
            return Err(HistoryError::OutOfOrder {
                expected,
                found: snapshot.tick,
            });
        }
        if !snapshot.names().eq(self.schema.iter().map(String::as_str)) {
            return Err(HistoryError::SchemaMismatch {
                expected: self.schema.clone(),
                found: snapshot.names().map(str::to_string).collect(),
            });
        }
        self.snapshots.push(snapshot);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Snapshot recorded at `tick`.
    pub fn at(&self, tick: Tick) -> Option<&MetricsSnapshot> {
        usize::try_from(tick).ok().and_then(|i| self.snapshots.get(i))
    }

    pub fn first(&self) -> Option<&MetricsSnapshot> {
        self.snapshots.first()
    }

    pub fn latest(&self) -> Option<&MetricsSnapshot> {
        self.snapshots.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetricsSnapshot> {
        self.snapshots.iter()
    }

    fn column_index(&self, name: &str) -> Result<usize, HistoryError> {
        self.schema
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| HistoryError::UnknownMetric(name.to_string()))
    }

    /// Value at schema position `idx`. A deserialized history may hold
    /// snapshots that never went through `push`, so the name is rechecked.
    fn value_in(&self, snapshot: &MetricsSnapshot, idx: usize) -> Result<f64, HistoryError> {
        snapshot
            .metrics
            .get(idx)
            .filter(|m| m.name == self.schema[idx])
            .map(|m| m.value)
            .ok_or_else(|| HistoryError::SchemaMismatch {
                expected: self.schema.clone(),
                found: snapshot.names().map(str::to_string).collect(),
            })
    }

    /// All values of one metric, in tick order.
    pub fn column(&self, name: &str) -> Result<Vec<f64>, HistoryError> {
        let idx = self.column_index(name)?;
        self.snapshots.iter().map(|s| self.value_in(s, idx)).collect()
    }

    /// Largest value of a metric; ties resolve to the earliest tick.
    pub fn max_of(&self, name: &str) -> Result<Extremum, HistoryError> {
        self.extremum(name, |candidate, best| candidate > best)
    }

    /// Smallest value of a metric; ties resolve to the earliest tick.
    pub fn min_of(&self, name: &str) -> Result<Extremum, HistoryError> {
        self.extremum(name, |candidate, best| candidate < best)
    }

    fn extremum(
        &self,
        name: &str,
        better: impl Fn(f64, f64) -> bool,
    ) -> Result<Extremum, HistoryError> {
        let idx = self.column_index(name)?;
        let mut best: Option<Extremum> = None;
        for snapshot in &self.snapshots {
            let value = self.value_in(snapshot, idx)?;
            match best {
                Some(b) if !better(value, b.value) => {}
                _ => {
                    best = Some(Extremum {
                        tick: snapshot.tick,
                        value,
                    })
                }
            }
        }
        best.ok_or(HistoryError::Empty)
    }

    /// Pretty JSON rendering for external reporting tools.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
