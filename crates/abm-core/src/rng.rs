//! Seeded random source shared by the scheduler and every agent.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Seeded random number generator resource
#[derive(Resource, Debug, Clone)]
pub struct SimRng(pub SmallRng);

impl SimRng {
    pub fn seeded(seed: u64) -> Self {
        Self(SmallRng::seed_from_u64(seed))
    }

    /// Uniform real in `[0, 1)`.
    pub fn uniform(&mut self) -> f64 {
        self.0.gen()
    }

    /// Bernoulli trial. Always consumes one draw, even for `p` of 0 or 1.
    pub fn chance(&mut self, p: f64) -> bool {
        self.uniform() < p
    }

    /// Uniform integer in `[0, n)`. `n` must be positive.
    pub fn below(&mut self, n: u32) -> u32 {
        self.0.gen_range(0..n)
    }

    /// Uniform integer in `[0, max]`.
    pub fn up_to(&mut self, max: u64) -> u64 {
        self.0.gen_range(0..=max)
    }

    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.0)
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.0);
    }
}
