//! World instance identifiers.
//!
//! Crafting state is scoped per simulated world instance; several worlds
//! (dimensions, test arenas) can run side by side without sharing any of it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier for one simulated world instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorldId(pub u32);

impl WorldId {
    /// The primary world.
    pub const OVERWORLD: Self = Self(0);

    /// Convert to the stable numeric representation.
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl Default for WorldId {
    fn default() -> Self {
        Self::OVERWORLD
    }
}

impl fmt::Display for WorldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "world#{}", self.0)
    }
}
