//! Grid Resource
//!
//! A 2D array of cell buckets. Each bucket lists the agents standing in that
//! cell, in arrival order. On a torus every coordinate is valid and wraps;
//! on a bounded grid off-edge coordinates are rejected and neighborhoods are
//! clipped.

use abm_data::Coord;
use bevy_ecs::prelude::*;
use std::collections::HashMap;

use crate::error::GridError;

/// Which cells count as adjacent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Neighborhood {
    /// The 8 surrounding cells
    #[default]
    Moore,
    /// The 4 orthogonal cells
    VonNeumann,
}

impl Neighborhood {
    fn offsets(self) -> &'static [(i32, i32)] {
        match self {
            Neighborhood::Moore => &[
                (-1, -1),
                (0, -1),
                (1, -1),
                (-1, 0),
                (1, 0),
                (-1, 1),
                (0, 1),
                (1, 1),
            ],
            Neighborhood::VonNeumann => &[(0, -1), (-1, 0), (1, 0), (0, 1)],
        }
    }
}

/// Cell buckets plus a reverse index from agent to cell
#[derive(Resource, Debug, Clone)]
pub struct Grid {
    width: u32,
    height: u32,
    torus: bool,
    cells: Vec<Vec<Entity>>,
    placements: HashMap<Entity, Coord>,
}

impl Grid {
    pub fn new(width: u32, height: u32, torus: bool) -> Result<Self, GridError> {
        let max = i32::MAX as u32;
        if width == 0 || height == 0 || width > max || height > max {
            return Err(GridError::InvalidDimensions { width, height });
        }
        let cells = (width as usize)
            .checked_mul(height as usize)
            .ok_or(GridError::InvalidDimensions { width, height })?;
        Ok(Self {
            width,
            height,
            torus,
            cells: vec![Vec::new(); cells],
            placements: HashMap::new(),
        })
    }

    pub fn torus(width: u32, height: u32) -> Result<Self, GridError> {
        Self::new(width, height, true)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_torus(&self) -> bool {
        self.torus
    }

    /// Number of placed agents.
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Maps a coordinate into `[0,width)×[0,height)`.
    pub fn normalize(&self, coord: Coord) -> Result<Coord, GridError> {
        let (w, h) = (self.width as i32, self.height as i32);
        if self.torus {
            return Ok(Coord::new(coord.x.rem_euclid(w), coord.y.rem_euclid(h)));
        }
        if (0..w).contains(&coord.x) && (0..h).contains(&coord.y) {
            Ok(coord)
        } else {
            Err(GridError::InvalidCoordinate(coord))
        }
    }

    // Only called with normalized coordinates.
    fn index(&self, coord: Coord) -> usize {
        coord.y as usize * self.width as usize + coord.x as usize
    }

    /// Puts an agent into the bucket at `coord` (wrapped). Returns the cell used.
    pub fn place(&mut self, agent: Entity, coord: Coord) -> Result<Coord, GridError> {
        if self.placements.contains_key(&agent) {
            return Err(GridError::AlreadyPlaced(agent));
        }
        let coord = self.normalize(coord)?;
        let idx = self.index(coord);
        self.cells[idx].push(agent);
        self.placements.insert(agent, coord);
        Ok(coord)
    }

    /// Takes an agent off the grid. Returns the cell it occupied.
    pub fn remove(&mut self, agent: Entity) -> Result<Coord, GridError> {
        let coord = self
            .placements
            .remove(&agent)
            .ok_or(GridError::AgentNotFound(agent))?;
        let idx = self.index(coord);
        self.cells[idx].retain(|&e| e != agent);
        Ok(coord)
    }

    /// Moves an agent to `coord` (wrapped). The target is validated before the
    /// agent leaves its current cell, so a failed move changes nothing.
    pub fn move_to(&mut self, agent: Entity, coord: Coord) -> Result<Coord, GridError> {
        let target = self.normalize(coord)?;
        if !self.placements.contains_key(&agent) {
            return Err(GridError::AgentNotFound(agent));
        }
        self.remove(agent)?;
        self.place(agent, target)
    }

    /// Cell currently recorded for an agent.
    pub fn placement(&self, agent: Entity) -> Option<Coord> {
        self.placements.get(&agent).copied()
    }

    /// Coordinates adjacent to `center`: wrapped on a torus, clipped on a
    /// bounded grid, without duplicates. The center itself is only listed when
    /// `include_center` is set, even if wrapping on a tiny grid folds an
    /// offset back onto it.
    pub fn neighborhood(
        &self,
        center: Coord,
        kind: Neighborhood,
        include_center: bool,
    ) -> Vec<Coord> {
        let Ok(center) = self.normalize(center) else {
            return Vec::new();
        };
        let mut out = Vec::with_capacity(9);
        if include_center {
            out.push(center);
        }
        for &(dx, dy) in kind.offsets() {
            if let Ok(c) = self.normalize(center.offset(dx, dy)) {
                if c != center && !out.contains(&c) {
                    out.push(c);
                }
            }
        }
        out
    }

    /// Agents in the cells of a neighborhood.
    pub fn neighbors_in(
        &self,
        center: Coord,
        kind: Neighborhood,
        include_center: bool,
    ) -> Vec<Entity> {
        self.neighborhood(center, kind, include_center)
            .into_iter()
            .flat_map(|c| self.occupants_of(c).iter().copied())
            .collect()
    }

    /// Agents in the Moore neighborhood of `center`.
    pub fn neighbors_of(&self, center: Coord, include_center: bool) -> Vec<Entity> {
        self.neighbors_in(center, Neighborhood::Moore, include_center)
    }

    /// Agents in a single cell.
    pub fn occupants_of(&self, coord: Coord) -> &[Entity] {
        match self.normalize(coord) {
            Ok(c) => &self.cells[self.index(c)],
            Err(_) => &[],
        }
    }

    /// Iterates every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (Coord, &[Entity])> + '_ {
        let w = self.width as usize;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, bucket)| (Coord::new((i % w) as i32, (i / w) as i32), bucket.as_slice()))
    }

    /// Checks that `positions` (each agent's own record of where it stands)
    /// agrees with the buckets: one bucket per agent, the right one, nothing
    /// left over.
    pub fn verify(&self, positions: &[(Entity, Coord)]) -> Result<(), GridError> {
        for &(agent, recorded) in positions {
            let placed = self
                .placement(agent)
                .ok_or(GridError::AgentNotFound(agent))?;
            if placed != recorded {
                return Err(GridError::Desynced {
                    agent,
                    detail: format!("indexed at {placed}, agent records {recorded}"),
                });
            }
            let hits = self.occupants_of(placed).iter().filter(|&&e| e == agent).count();
            if hits != 1 {
                return Err(GridError::Desynced {
                    agent,
                    detail: format!("listed {hits} times in bucket {placed}"),
                });
            }
        }
        let bucketed: usize = self.cells.iter().map(Vec::len).sum();
        if bucketed != self.placements.len() || bucketed != positions.len() {
            let agent = positions.first().map(|p| p.0).unwrap_or(Entity::PLACEHOLDER);
            return Err(GridError::Desynced {
                agent,
                detail: format!(
                    "{bucketed} bucket entries, {} indexed, {} agents",
                    self.placements.len(),
                    positions.len()
                ),
            });
        }
        Ok(())
    }
}
