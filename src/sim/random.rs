//! Seeded random streams
//!
//! The simulation owns two independent streams: one consumed only by cave
//! generation, one consumed only by gameplay events (explosions, spits,
//! player-hit shards). Generating the same cave never depends on how many
//! gameplay draws happened in between.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// Mix applied to the world seed when no gameplay seed is configured
const GAMEPLAY_SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// A deterministic uniform random source
#[derive(Debug, Clone)]
pub struct RandomStream {
    seed: u64,
    rng: Pcg32,
}

impl RandomStream {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Stream for gameplay events derived from the world seed
    pub fn gameplay_for(world_seed: u64) -> Self {
        Self::new(world_seed ^ GAMEPLAY_SEED_MIX)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform float in [0, 1)
    #[inline]
    pub fn uniform(&mut self) -> f32 {
        self.rng.random::<f32>()
    }

    /// Uniform float in [lo, hi)
    #[inline]
    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + self.uniform() * (hi - lo)
    }

    /// Uniform integer in [lo, hi]
    #[inline]
    pub fn int_inclusive(&mut self, lo: i32, hi: i32) -> i32 {
        self.rng.random_range(lo..=hi)
    }

    /// True with probability `p`
    #[inline]
    pub fn chance(&mut self, p: f32) -> bool {
        self.uniform() < p
    }

    /// Serializable description of the stream origin
    pub fn state(&self) -> RngState {
        RngState { seed: self.seed }
    }
}

/// RNG origin for logs and summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}
