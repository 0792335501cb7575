#![warn(missing_docs)]
//! Core primitives shared across the workspace.

pub mod identifier;
pub mod pos;
pub mod sets;
pub mod world;

use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use identifier::{Identifier, IdentifierError, DEFAULT_NAMESPACE};
pub use pos::BlockPos;
pub use sets::DynamicSets;
pub use world::WorldId;

/// Fixed tick type (20 TPS => 50 ms per tick).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SimTick(pub u64);

impl SimTick {
    /// First tick in any deterministic timeline.
    pub const ZERO: Self = Self(0);

    /// Advance by `delta` ticks.
    pub fn advance(self, delta: u64) -> Self {
        Self(self.0 + delta)
    }
}

/// Helper to derive a reproducible RNG seeded by world + position + tick domains.
pub fn scoped_rng(world_seed: u64, pos: BlockPos, tick: SimTick) -> StdRng {
    let seed = world_seed ^ pos.hash_key() ^ tick.0.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    StdRng::seed_from_u64(seed)
}
