//! Integer block positions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a single block cell in a world.
///
/// Ordering is `(x, y, z)` lexical so position-keyed maps iterate
/// deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockPos {
    /// East/west coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
    /// North/south coordinate.
    pub z: i32,
}

impl BlockPos {
    /// Construct a position.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Position offset by the given deltas.
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// The block directly underneath.
    pub const fn below(self) -> Self {
        self.offset(0, -1, 0)
    }

    /// The block directly above.
    pub const fn above(self) -> Self {
        self.offset(0, 1, 0)
    }

    /// Stable 64-bit mix of the coordinates, used to seed per-position RNGs.
    pub fn hash_key(self) -> u64 {
        let x = self.x as u32 as u64;
        let y = self.y as u32 as u64;
        let z = self.z as u32 as u64;
        x.wrapping_mul(0x8DA6_B343)
            ^ y.wrapping_mul(0xD816_3841).rotate_left(21)
            ^ z.wrapping_mul(0xCB1A_B31F).rotate_left(42)
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.x, self.y, self.z)
    }
}
