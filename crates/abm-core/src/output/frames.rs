//! Grid Frames
//!
//! Captures one value per cell so a run can be replayed by an external
//! renderer. What a cell's value means is up to the model's encoder.

use abm_data::{GridFrame, Tick};
use bevy_ecs::prelude::*;

use crate::error::SimError;
use crate::systems::placement::grid;

/// Maps the occupants of one non-empty cell to a value.
pub type CellEncoder = Box<dyn Fn(&World, &[Entity]) -> Option<f64> + Send + Sync>;

/// Encodes every cell of the grid. Empty cells are `None` without consulting
/// the encoder.
pub fn capture_frame(
    world: &World,
    tick: Tick,
    encode: &(dyn Fn(&World, &[Entity]) -> Option<f64> + Send + Sync),
) -> Result<GridFrame, SimError> {
    let grid = grid(world)?;
    let cells = grid
        .cells()
        .map(|(_, occupants)| {
            if occupants.is_empty() {
                None
            } else {
                encode(world, occupants)
            }
        })
        .collect();
    Ok(GridFrame {
        tick,
        width: grid.width(),
        height: grid.height(),
        cells,
    })
}

/// Encoder plus the frames captured so far, one per tick from tick 0
pub struct FrameRecorder {
    encoder: CellEncoder,
    frames: Vec<GridFrame>,
}

impl std::fmt::Debug for FrameRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameRecorder")
            .field("frames", &self.frames.len())
            .finish()
    }
}

impl FrameRecorder {
    pub fn new(encoder: CellEncoder) -> Self {
        Self {
            encoder,
            frames: Vec::new(),
        }
    }

    pub fn record(&mut self, world: &World, tick: Tick) -> Result<&GridFrame, SimError> {
        let frame = capture_frame(world, tick, self.encoder.as_ref())?;
        self.frames.push(frame);
        Ok(&self.frames[self.frames.len() - 1])
    }

    pub fn at(&self, tick: Tick) -> Option<&GridFrame> {
        self.frames.iter().find(|f| f.tick == tick)
    }

    pub fn frames(&self) -> &[GridFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
