//! Exchange Behavior
//!
//! Random-walk trading economy. Each activation the agent steps to a random
//! adjacent cell, then trades with at most one other agent it finds there.
//! Trades move wealth between agents and never create or destroy it.

use bevy_ecs::prelude::*;

use crate::components::{AgentBehavior, Neighborhood, Wealth};
use crate::error::SimError;
use crate::systems::placement::{agents_by_id, grid, move_agent, occupants_of, position_of, rng};

/// Move-then-trade rule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Exchange;

fn wealth_of(world: &World, agent: Entity) -> Result<u64, SimError> {
    world
        .get::<Wealth>(agent)
        .map(|w| w.0)
        .ok_or(SimError::MissingComponent {
            agent,
            component: "Wealth",
        })
}

fn set_wealth(world: &mut World, agent: Entity, value: u64) -> Result<(), SimError> {
    let mut wealth = world
        .get_mut::<Wealth>(agent)
        .ok_or(SimError::MissingComponent {
            agent,
            component: "Wealth",
        })?;
    wealth.0 = value;
    Ok(())
}

/// Transfers a uniform amount in `[0, min(giver, receiver)]` from `giver` to
/// `receiver`. When either side holds nothing the trade is skipped without
/// drawing. Returns the amount moved. Fails without changing either side if
/// the receiver's wealth would overflow.
pub fn trade(world: &mut World, giver: Entity, receiver: Entity) -> Result<u64, SimError> {
    let give = wealth_of(world, giver)?;
    let take = wealth_of(world, receiver)?;
    if give == 0 || take == 0 {
        return Ok(0);
    }
    let amount = rng(world)?.up_to(give.min(take));
    let received = take
        .checked_add(amount)
        .ok_or(SimError::WealthOverflow { agent: receiver })?;
    set_wealth(world, giver, give - amount)?;
    set_wealth(world, receiver, received)?;
    tracing::trace!(?giver, ?receiver, amount, "trade");
    Ok(amount)
}

impl Exchange {
    /// Steps to a uniformly chosen Moore-neighbor cell. Agents on a grid with
    /// no neighbor cells stay put.
    fn wander(&self, agent: Entity, world: &mut World) -> Result<(), SimError> {
        let from = position_of(world, agent)?;
        let cells = grid(world)?.neighborhood(from, Neighborhood::Moore, false);
        let target = rng(world)?.choose(&cells).copied();
        if let Some(target) = target {
            move_agent(world, agent, target)?;
        }
        Ok(())
    }

    /// Picks one other occupant of the agent's cell, if any, and trades.
    fn trade_locally(&self, agent: Entity, world: &mut World) -> Result<(), SimError> {
        let here = position_of(world, agent)?;
        let others: Vec<Entity> = occupants_of(world, here)?
            .into_iter()
            .filter(|&e| e != agent)
            .collect();
        let partner = rng(world)?.choose(&others).copied();
        if let Some(partner) = partner {
            trade(world, agent, partner)?;
        }
        Ok(())
    }
}

impl AgentBehavior for Exchange {
    fn name(&self) -> &'static str {
        "exchange"
    }

    fn act(&self, agent: Entity, world: &mut World) -> Result<(), SimError> {
        self.wander(agent, world)?;
        self.trade_locally(agent, world)
    }
}

/// Wealth of every agent, in agent-id order.
pub fn wealth_by_agent(world: &mut World) -> Vec<u64> {
    agents_by_id(world)
        .into_iter()
        .filter_map(|e| world.get::<Wealth>(e).map(|w| w.0))
        .collect()
}
