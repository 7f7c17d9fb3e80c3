//! Simulation Driver
//!
//! Owns the world (grid, rng and agents), the scheduler and the metrics
//! collector. Snapshot 0 records the population before the first step; each
//! step then activates every agent once and records one more snapshot, so
//! `run(n)` leaves `n + 1` snapshots behind.

use abm_data::{Coord, GridFrame, History, MetricsSnapshot, Tick};
use bevy_ecs::prelude::*;
use tracing::{debug, info};

use crate::components::{AgentId, Behavior, Grid, Position};
use crate::config::SimConfig;
use crate::error::SimError;
use crate::output::{capture_frame, CellEncoder, FrameRecorder, MetricsCollector, Reporter};
use crate::rng::SimRng;
use crate::setup;
use crate::systems::placement::{self, agents_by_id, place_agent, unplace_agent};
use crate::systems::Scheduler;

pub struct Simulation {
    world: World,
    scheduler: Scheduler,
    metrics: MetricsCollector,
    frames: Option<FrameRecorder>,
    next_id: u64,
}

impl Simulation {
    /// Empty simulation on a fresh grid.
    pub fn new(width: u32, height: u32, torus: bool, seed: u64) -> Result<Self, SimError> {
        let mut world = World::new();
        world.insert_resource(Grid::new(width, height, torus)?);
        world.insert_resource(SimRng::seeded(seed));
        Ok(Self {
            world,
            scheduler: Scheduler::new(),
            metrics: MetricsCollector::new(),
            frames: None,
            next_id: 0,
        })
    }

    /// Validates `config`, then builds the grid, reporters and population of
    /// its model.
    pub fn from_config(config: &SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        let grid = &config.grid;
        let mut sim = Self::new(grid.width, grid.height, grid.torus, config.simulation.seed)?;
        for reporter in setup::standard_reporters(&config.model) {
            sim.add_reporter(reporter)?;
        }
        if config.simulation.record_frames {
            sim.record_frames(setup::cell_encoder(&config.model));
        }
        let spawned = setup::populate(&mut sim, &config.model)?;
        info!(
            model = config.model.name(),
            width = grid.width,
            height = grid.height,
            agents = spawned,
            seed = config.simulation.seed,
            "simulation built"
        );
        Ok(sim)
    }

    /// Registers a reporter. Only allowed before the first snapshot.
    pub fn add_reporter(&mut self, reporter: Reporter) -> Result<(), SimError> {
        Ok(self.metrics.add_reporter(reporter)?)
    }

    /// Captures a frame with `encoder` alongside every snapshot from now on.
    pub fn record_frames(&mut self, encoder: CellEncoder) {
        self.frames = Some(FrameRecorder::new(encoder));
    }

    /// Spawns an agent with the next id and places it at `at` (wrapped on a
    /// torus).
    ///
    /// `state` must not repeat a component type within itself. An `AgentId`,
    /// `Position` or `Behavior` in it is replaced by the engine's own.
    pub fn spawn_agent<S: Bundle>(
        &mut self,
        at: Coord,
        behavior: Behavior,
        state: S,
    ) -> Result<Entity, SimError> {
        let id = AgentId(self.next_id);
        let agent = self
            .world
            .spawn(state)
            .insert((id, Position(at), behavior))
            .id();
        if let Err(e) = place_agent(&mut self.world, agent, at) {
            self.world.despawn(agent);
            return Err(e);
        }
        self.next_id += 1;
        Ok(agent)
    }

    /// Takes an agent off the grid and despawns it.
    pub fn remove_agent(&mut self, agent: Entity) -> Result<(), SimError> {
        unplace_agent(&mut self.world, agent)?;
        self.world.despawn(agent);
        Ok(())
    }

    /// Uniform random cell: draws `x`, then `y`.
    pub fn random_cell(&mut self) -> Result<Coord, SimError> {
        let (width, height) = {
            let grid = placement::grid(&self.world)?;
            (grid.width(), grid.height())
        };
        let mut rng = placement::rng(&mut self.world)?;
        let x = rng.below(width) as i32;
        let y = rng.below(height) as i32;
        Ok(Coord::new(x, y))
    }

    /// Records snapshot 0 if nothing has been recorded yet.
    fn ensure_initial(&mut self) -> Result<(), SimError> {
        if self.metrics.history().is_empty() {
            self.record(0)?;
        }
        Ok(())
    }

    fn record(&mut self, tick: Tick) -> Result<(), SimError> {
        self.metrics.collect(tick, &mut self.world)?;
        if let Some(frames) = self.frames.as_mut() {
            frames.record(&self.world, tick)?;
        }
        Ok(())
    }

    /// Advances one tick and returns the snapshot it produced.
    pub fn step(&mut self) -> Result<&MetricsSnapshot, SimError> {
        self.ensure_initial()?;
        let activated = self.scheduler.step(&mut self.world)?;
        let tick = self.scheduler.steps();
        self.record(tick)?;
        debug!(tick, activated, "tick complete");
        self.metrics
            .history()
            .latest()
            .ok_or(SimError::History(abm_data::HistoryError::Empty))
    }

    /// Runs `ticks` steps.
    pub fn run(&mut self, ticks: u64) -> Result<&History, SimError> {
        info!(from = self.tick(), ticks, "run started");
        self.ensure_initial()?;
        for _ in 0..ticks {
            self.step()?;
        }
        info!(tick = self.tick(), snapshots = self.history().len(), "run finished");
        Ok(self.history())
    }

    /// Completed ticks.
    pub fn tick(&self) -> Tick {
        self.scheduler.steps()
    }

    pub fn history(&self) -> &History {
        self.metrics.history()
    }

    pub fn snapshot_at(&self, tick: Tick) -> Option<&MetricsSnapshot> {
        self.history().at(tick)
    }

    /// Recorded frame for `tick`, when frame recording is on.
    pub fn frame_at(&self, tick: Tick) -> Option<&GridFrame> {
        self.frames.as_ref().and_then(|f| f.at(tick))
    }

    pub fn frames(&self) -> &[GridFrame] {
        self.frames.as_ref().map(|f| f.frames()).unwrap_or(&[])
    }

    /// Encodes the current grid without recording it.
    pub fn capture_frame(&self, encoder: &CellEncoder) -> Result<GridFrame, SimError> {
        capture_frame(&self.world, self.tick(), encoder.as_ref())
    }

    pub fn grid(&self) -> Result<&Grid, SimError> {
        placement::grid(&self.world)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Live agents ordered by id.
    pub fn agents(&mut self) -> Vec<Entity> {
        agents_by_id(&mut self.world)
    }

    /// Verifies that grid buckets and agent positions agree.
    pub fn check_consistency(&mut self) -> Result<(), SimError> {
        placement::verify_placements(&mut self.world)
    }
}
