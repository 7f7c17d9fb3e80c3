//! Metrics Collection
//!
//! Named reducers over the agent population. After every tick the collector
//! evaluates each reducer once, in registration order, and appends the
//! results to the history as one snapshot.

use abm_data::{History, HistoryError, MetricsSnapshot, Tick};
use bevy_ecs::component::Component;
use bevy_ecs::world::World;

type ReduceFn = Box<dyn Fn(&mut World) -> f64 + Send + Sync>;

/// A named population reducer
pub struct Reporter {
    name: String,
    reduce: ReduceFn,
}

impl std::fmt::Debug for Reporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reporter").field("name", &self.name).finish()
    }
}

/// Projects every `C` component in the world to a number.
fn values_of<C, F>(world: &mut World, value: &F) -> Vec<f64>
where
    C: Component,
    F: Fn(&C) -> f64,
{
    let mut query = world.query::<&C>();
    query.iter(world).map(value).collect()
}

impl Reporter {
    /// Reporter backed by an arbitrary reducer.
    pub fn new(
        name: impl Into<String>,
        reduce: impl Fn(&mut World) -> f64 + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            reduce: Box::new(reduce),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn evaluate(&self, world: &mut World) -> f64 {
        (self.reduce)(world)
    }

    /// Number of `C` components matching `pred`.
    pub fn count<C: Component>(
        name: impl Into<String>,
        pred: impl Fn(&C) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self::new(name, move |world: &mut World| {
            let mut query = world.query::<&C>();
            query.iter(world).filter(|c| pred(c)).count() as f64
        })
    }

    pub fn sum<C: Component>(
        name: impl Into<String>,
        value: impl Fn(&C) -> f64 + Send + Sync + 'static,
    ) -> Self {
        Self::new(name, move |world: &mut World| {
            values_of(world, &value).into_iter().sum()
        })
    }

    /// Arithmetic mean; 0 for an empty population.
    pub fn mean<C: Component>(
        name: impl Into<String>,
        value: impl Fn(&C) -> f64 + Send + Sync + 'static,
    ) -> Self {
        Self::new(name, move |world: &mut World| mean(&values_of(world, &value)))
    }

    /// Minimum; 0 for an empty population.
    pub fn min<C: Component>(
        name: impl Into<String>,
        value: impl Fn(&C) -> f64 + Send + Sync + 'static,
    ) -> Self {
        Self::new(name, move |world: &mut World| {
            values_of(world, &value)
                .into_iter()
                .reduce(f64::min)
                .unwrap_or(0.0)
        })
    }

    /// Maximum; 0 for an empty population.
    pub fn max<C: Component>(
        name: impl Into<String>,
        value: impl Fn(&C) -> f64 + Send + Sync + 'static,
    ) -> Self {
        Self::new(name, move |world: &mut World| {
            values_of(world, &value)
                .into_iter()
                .reduce(f64::max)
                .unwrap_or(0.0)
        })
    }

    /// Gini coefficient of the projected values.
    pub fn gini<C: Component>(
        name: impl Into<String>,
        value: impl Fn(&C) -> f64 + Send + Sync + 'static,
    ) -> Self {
        Self::new(name, move |world: &mut World| {
            gini_coefficient(values_of(world, &value))
        })
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Gini coefficient of a non-negative distribution.
///
/// With values sorted ascending and 1-based rank `i`:
/// `G = 2·Σ(i·xᵢ) / (n·W) − (n+1)/n`, where `W` is the total. Returns 0 for
/// an empty input or a zero total. Perfect equality gives 0; all wealth on one
/// of `n` holders gives `(n-1)/n`.
pub fn gini_coefficient(values: impl IntoIterator<Item = f64>) -> f64 {
    let mut sorted: Vec<f64> = values.into_iter().collect();
    let total: f64 = sorted.iter().sum();
    if sorted.is_empty() || total <= 0.0 {
        return 0.0;
    }
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len() as f64;
    let weighted: f64 = sorted
        .iter()
        .enumerate()
        .map(|(i, x)| (i + 1) as f64 * x)
        .sum();
    (2.0 * weighted / (n * total) - (n + 1.0) / n).max(0.0)
}

/// Reducers plus the history they feed
#[derive(Debug, Default)]
pub struct MetricsCollector {
    reporters: Vec<Reporter>,
    history: History,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a reducer. Fails once collection has started, since every
    /// snapshot must share one schema.
    pub fn add_reporter(&mut self, reporter: Reporter) -> Result<(), HistoryError> {
        if !self.history.is_empty() {
            return Err(HistoryError::SchemaLocked);
        }
        self.reporters.push(reporter);
        let schema = self.reporters.iter().map(|r| r.name.clone()).collect();
        self.history = History::new(schema);
        Ok(())
    }

    pub fn reporter_names(&self) -> impl Iterator<Item = &str> {
        self.reporters.iter().map(|r| r.name())
    }

    /// Evaluates every reducer and appends the snapshot for `tick`.
    pub fn collect(&mut self, tick: Tick, world: &mut World) -> Result<&MetricsSnapshot, HistoryError> {
        let mut snapshot = MetricsSnapshot::new(tick);
        for reporter in &self.reporters {
            snapshot.push(reporter.name.clone(), reporter.evaluate(world));
        }
        self.history.push(snapshot)?;
        self.history.latest().ok_or(HistoryError::Empty)
    }

    pub fn history(&self) -> &History {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Health, HealthState, Wealth};

    fn wealth_world(values: &[u64]) -> World {
        let mut world = World::new();
        for &v in values {
            world.spawn(Wealth(v));
        }
        world
    }

    #[test]
    fn test_gini_equal_and_zero() {
        assert_eq!(gini_coefficient(vec![10.0; 100]), 0.0);
        assert_eq!(gini_coefficient(vec![0.0; 5]), 0.0);
        assert_eq!(gini_coefficient(Vec::new()), 0.0);
    }

    #[test]
    fn test_gini_known_values() {
        // one holder of four has everything: (n-1)/n
        let g = gini_coefficient(vec![0.0, 0.0, 0.0, 8.0]);
        assert!((g - 0.75).abs() < 1e-12);

        // 1,2,3,4: 2*(1+4+9+16)/(4*10) - 5/4 = 0.25
        let g = gini_coefficient(vec![4.0, 2.0, 3.0, 1.0]);
        assert!((g - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_reporters_over_components() {
        let mut world = wealth_world(&[1, 2, 3, 4]);
        world.spawn(Health::infected());
        world.spawn(Health::susceptible());
        world.spawn(Health::infected());

        let value = |w: &Wealth| w.0 as f64;
        assert_eq!(Reporter::sum::<Wealth>("Total", value).evaluate(&mut world), 10.0);
        assert_eq!(Reporter::mean::<Wealth>("Mean", value).evaluate(&mut world), 2.5);
        assert_eq!(Reporter::min::<Wealth>("Min", value).evaluate(&mut world), 1.0);
        assert_eq!(Reporter::max::<Wealth>("Max", value).evaluate(&mut world), 4.0);
        let gini = Reporter::gini::<Wealth>("Gini", value).evaluate(&mut world);
        assert!((gini - 0.25).abs() < 1e-12);

        let infected = Reporter::count::<Health>("Infected", |h| h.is(HealthState::Infected));
        assert_eq!(infected.evaluate(&mut world), 2.0);
    }

    #[test]
    fn test_empty_population_fallbacks() {
        let mut world = World::new();
        let value = |w: &Wealth| w.0 as f64;
        assert_eq!(Reporter::mean::<Wealth>("Mean", value).evaluate(&mut world), 0.0);
        assert_eq!(Reporter::min::<Wealth>("Min", value).evaluate(&mut world), 0.0);
        assert_eq!(Reporter::gini::<Wealth>("Gini", value).evaluate(&mut world), 0.0);
    }

    #[test]
    fn test_collector_appends_in_tick_order() {
        let mut world = wealth_world(&[5, 5]);
        let mut collector = MetricsCollector::new();
        collector
            .add_reporter(Reporter::sum::<Wealth>("Total", |w| w.0 as f64))
            .unwrap();
        collector
            .add_reporter(Reporter::new("Agents", |w: &mut World| {
                w.query::<&Wealth>().iter(w).count() as f64
            }))
            .unwrap();

        let snap = collector.collect(0, &mut world).unwrap();
        assert_eq!(snap.get("Total"), Some(10.0));
        assert_eq!(snap.get("Agents"), Some(2.0));

        world.spawn(Wealth(1));
        collector.collect(1, &mut world).unwrap();
        assert_eq!(collector.history().len(), 2);
        assert_eq!(collector.history().column("Total").unwrap(), vec![10.0, 11.0]);

        assert_eq!(
            collector.collect(5, &mut world).unwrap_err(),
            HistoryError::OutOfOrder { expected: 2, found: 5 }
        );
    }

    #[test]
    fn test_schema_locks_after_first_collection() {
        let mut world = World::new();
        let mut collector = MetricsCollector::new();
        collector.add_reporter(Reporter::new("Zero", |_| 0.0)).unwrap();
        collector.collect(0, &mut world).unwrap();
        assert_eq!(
            collector.add_reporter(Reporter::new("Late", |_| 1.0)).unwrap_err(),
            HistoryError::SchemaLocked
        );
        let names: Vec<_> = collector.reporter_names().collect();
        assert_eq!(names, vec!["Zero"]);
    }
}
