//! Placement helpers
//!
//! The grid's reverse index and each agent's `Position` are two records of the
//! same fact. These helpers are the only code that writes either, so they
//! cannot drift apart.

use abm_data::Coord;
use bevy_ecs::prelude::*;

use crate::components::{AgentId, Grid, Neighborhood, Position};
use crate::error::SimError;
use crate::rng::SimRng;

pub fn grid(world: &World) -> Result<&Grid, SimError> {
    world
        .get_resource::<Grid>()
        .ok_or(SimError::MissingResource("Grid"))
}

pub fn grid_mut(world: &mut World) -> Result<Mut<'_, Grid>, SimError> {
    world
        .get_resource_mut::<Grid>()
        .ok_or(SimError::MissingResource("Grid"))
}

pub fn rng(world: &mut World) -> Result<Mut<'_, SimRng>, SimError> {
    world
        .get_resource_mut::<SimRng>()
        .ok_or(SimError::MissingResource("SimRng"))
}

/// Recorded cell of an agent.
pub fn position_of(world: &World, agent: Entity) -> Result<Coord, SimError> {
    world
        .get::<Position>(agent)
        .map(|p| p.0)
        .ok_or(SimError::MissingComponent {
            agent,
            component: "Position",
        })
}

fn set_position(world: &mut World, agent: Entity, coord: Coord) -> Result<(), SimError> {
    let mut position = world
        .get_mut::<Position>(agent)
        .ok_or(SimError::MissingComponent {
            agent,
            component: "Position",
        })?;
    position.0 = coord;
    Ok(())
}

/// Puts a spawned agent (which must carry a `Position`) onto the grid.
pub fn place_agent(world: &mut World, agent: Entity, coord: Coord) -> Result<Coord, SimError> {
    if world.get::<Position>(agent).is_none() {
        return Err(SimError::MissingComponent {
            agent,
            component: "Position",
        });
    }
    let placed = grid_mut(world)?.place(agent, coord)?;
    set_position(world, agent, placed)?;
    Ok(placed)
}

/// Moves an agent, wrapping `coord` onto the grid.
pub fn move_agent(world: &mut World, agent: Entity, coord: Coord) -> Result<Coord, SimError> {
    let moved = grid_mut(world)?.move_to(agent, coord)?;
    set_position(world, agent, moved)?;
    Ok(moved)
}

/// Takes an agent off the grid. The entity itself is left alive.
pub fn unplace_agent(world: &mut World, agent: Entity) -> Result<Coord, SimError> {
    Ok(grid_mut(world)?.remove(agent)?)
}

/// Agents in the Moore neighborhood of `center`.
pub fn neighbors_of(
    world: &World,
    center: Coord,
    include_center: bool,
) -> Result<Vec<Entity>, SimError> {
    Ok(grid(world)?.neighbors_in(center, Neighborhood::Moore, include_center))
}

/// Agents sharing a cell with `coord`, including any agent standing there.
pub fn occupants_of(world: &World, coord: Coord) -> Result<Vec<Entity>, SimError> {
    Ok(grid(world)?.occupants_of(coord).to_vec())
}

/// Live agents ordered by id.
pub fn agents_by_id(world: &mut World) -> Vec<Entity> {
    let mut query = world.query::<(Entity, &AgentId)>();
    let mut agents: Vec<(AgentId, Entity)> = query.iter(world).map(|(e, id)| (*id, e)).collect();
    agents.sort_unstable_by_key(|(id, _)| *id);
    agents.into_iter().map(|(_, e)| e).collect()
}

/// Checks the placement invariant: every positioned agent is listed exactly
/// once, in the bucket matching its `Position`, and the grid holds nobody
/// else.
pub fn verify_placements(world: &mut World) -> Result<(), SimError> {
    let mut query = world.query::<(Entity, &Position)>();
    let positions: Vec<(Entity, Coord)> = query.iter(world).map(|(e, p)| (e, p.0)).collect();
    grid(world)?.verify(&positions)?;
    Ok(())
}
