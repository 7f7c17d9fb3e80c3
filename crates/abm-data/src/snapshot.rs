//! Snapshot Types
//!
//! One snapshot holds the aggregate metric values of a single tick, in the
//! fixed order the reporters were registered.

use serde::{Deserialize, Serialize};

use crate::Tick;

/// A single named metric value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub name: String,
    pub value: f64,
}

/// Aggregate metrics collected after one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub tick: Tick,
    pub metrics: Vec<Metric>,
}

impl MetricsSnapshot {
    pub fn new(tick: Tick) -> Self {
        Self {
            tick,
            metrics: Vec::new(),
        }
    }

    /// Appends a metric, keeping insertion order.
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: f64) {
        self.metrics.push(Metric {
            name: name.into(),
            value,
        });
    }

    /// Looks up a metric by name.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.metrics
            .iter()
            .find(|m| m.name == name)
            .map(|m| m.value)
    }

    /// Metric names in schema order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.metrics.iter().map(|m| m.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}
