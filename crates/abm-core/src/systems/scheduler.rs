//! Random Activation Scheduler
//!
//! Each tick activates every live agent exactly once, in a permutation drawn
//! fresh from the shared rng. Agents run one after another to completion, so
//! later agents see every change earlier agents made during the same tick.

use bevy_ecs::prelude::*;

use crate::components::{AgentId, Behavior};
use crate::error::SimError;
use crate::systems::placement::rng;

/// Scheduler state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Ticking,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    phase: Phase,
    steps: u64,
    last_order: Vec<Entity>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Number of completed ticks.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Activation order used by the most recent tick.
    pub fn last_order(&self) -> &[Entity] {
        &self.last_order
    }

    /// Agents able to act right now, sorted by id so the shuffle starts from
    /// the same sequence on every run.
    fn live_agents(world: &mut World) -> Vec<Entity> {
        let mut query = world.query_filtered::<(Entity, &AgentId), With<Behavior>>();
        let mut agents: Vec<(AgentId, Entity)> = query.iter(world).map(|(e, id)| (*id, e)).collect();
        agents.sort_unstable_by_key(|(id, _)| *id);
        agents.into_iter().map(|(_, e)| e).collect()
    }

    /// Runs one tick. Returns how many agents were activated.
    pub fn step(&mut self, world: &mut World) -> Result<usize, SimError> {
        self.phase = Phase::Ticking;
        let result = self.activate_all(world);
        self.phase = Phase::Idle;
        let activated = result?;
        self.steps += 1;
        Ok(activated)
    }

    fn activate_all(&mut self, world: &mut World) -> Result<usize, SimError> {
        let mut order = Self::live_agents(world);
        rng(world)?.shuffle(&mut order);

        let mut activated = 0;
        for &agent in &order {
            // Skips agents despawned earlier in this tick.
            let Some(behavior) = world.get::<Behavior>(agent).cloned() else {
                continue;
            };
            behavior.act(agent, world)?;
            activated += 1;
        }
        self.last_order = order;
        Ok(activated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::AgentBehavior;
    use crate::rng::SimRng;

    /// Resource: agent ids in the order they were activated
    #[derive(Resource, Default)]
    struct ActivationLog(Vec<u64>);

    struct Record;

    impl AgentBehavior for Record {
        fn name(&self) -> &'static str {
            "record"
        }

        fn act(&self, agent: Entity, world: &mut World) -> Result<(), SimError> {
            let id = world.get::<AgentId>(agent).map(|id| id.0).unwrap_or(u64::MAX);
            world.resource_mut::<ActivationLog>().0.push(id);
            Ok(())
        }
    }

    /// Despawns the agent with id 1 the first time it runs.
    struct Assassin;

    impl AgentBehavior for Assassin {
        fn name(&self) -> &'static str {
            "assassin"
        }

        fn act(&self, _agent: Entity, world: &mut World) -> Result<(), SimError> {
            let mut query = world.query::<(Entity, &AgentId)>();
            let target = query.iter(world).find(|(_, id)| id.0 == 1).map(|(e, _)| e);
            if let Some(target) = target {
                world.despawn(target);
            }
            Ok(())
        }
    }

    fn world_with(n: u64, seed: u64) -> World {
        let mut world = World::new();
        world.insert_resource(SimRng::seeded(seed));
        world.insert_resource(ActivationLog::default());
        for id in 0..n {
            world.spawn((AgentId(id), Behavior::new(Record)));
        }
        world
    }

    #[test]
    fn test_every_agent_acts_once_per_tick() {
        let mut world = world_with(25, 3);
        let mut scheduler = Scheduler::new();

        for tick in 1..=4u64 {
            assert_eq!(scheduler.step(&mut world).unwrap(), 25);
            assert_eq!(scheduler.steps(), tick);
            assert_eq!(scheduler.phase(), Phase::Idle);
        }

        let log = &world.resource::<ActivationLog>().0;
        assert_eq!(log.len(), 100);
        for chunk in log.chunks(25) {
            let mut ids = chunk.to_vec();
            ids.sort_unstable();
            assert_eq!(ids, (0..25).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_order_is_redrawn_each_tick() {
        let mut world = world_with(30, 8);
        let mut scheduler = Scheduler::new();
        scheduler.step(&mut world).unwrap();
        let first = scheduler.last_order().to_vec();
        scheduler.step(&mut world).unwrap();
        assert_ne!(first, scheduler.last_order());
    }

    #[test]
    fn test_same_seed_same_order() {
        let mut a = world_with(40, 21);
        let mut b = world_with(40, 21);
        let (mut sa, mut sb) = (Scheduler::new(), Scheduler::new());
        for _ in 0..3 {
            sa.step(&mut a).unwrap();
            sb.step(&mut b).unwrap();
        }
        assert_eq!(
            a.resource::<ActivationLog>().0,
            b.resource::<ActivationLog>().0
        );
    }

    #[test]
    fn test_population_changes_between_ticks() {
        let mut world = world_with(3, 1);
        let mut scheduler = Scheduler::new();
        assert_eq!(scheduler.step(&mut world).unwrap(), 3);

        world.spawn((AgentId(3), Behavior::new(Record)));
        assert_eq!(scheduler.step(&mut world).unwrap(), 4);

        // entities without a behavior are not scheduled
        world.spawn(AgentId(4));
        assert_eq!(scheduler.step(&mut world).unwrap(), 4);
    }

    #[test]
    fn test_agent_removed_mid_tick_is_skipped() {
        let mut world = World::new();
        world.insert_resource(SimRng::seeded(2));
        world.insert_resource(ActivationLog::default());
        world.spawn((AgentId(0), Behavior::new(Assassin)));
        world.spawn((AgentId(1), Behavior::new(Record)));

        let mut scheduler = Scheduler::new();
        let activated = scheduler.step(&mut world).unwrap();
        let log = &world.resource::<ActivationLog>().0;
        // the victim either acted before the assassin or not at all
        assert_eq!(activated, 1 + log.len());
        assert_eq!(scheduler.step(&mut world).unwrap(), 1);
    }

    #[test]
    fn test_missing_rng_is_an_error() {
        let mut world = World::new();
        let mut scheduler = Scheduler::new();
        assert!(matches!(
            scheduler.step(&mut world),
            Err(SimError::MissingResource("SimRng"))
        ));
        assert_eq!(scheduler.phase(), Phase::Idle);
        assert_eq!(scheduler.steps(), 0);
    }
}
