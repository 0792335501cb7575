//! Craft attempt inputs and context.
//!
//! [`CraftWorld`] is the seam to the simulation that owns blocks, fluids and
//! item entities. [`CraftContext`] is a read-only snapshot of what one craft
//! attempt sees at its position; it is rebuilt for every attempt.

use interactio_core::{BlockPos, Identifier, SimTick, WorldId};
use serde::{Deserialize, Serialize};

/// A stack of identical items.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemStack {
    /// Item type.
    pub item: Identifier,
    /// Number of items in the stack.
    pub count: u32,
}

impl ItemStack {
    /// Create a stack.
    pub fn new(item: Identifier, count: u32) -> Self {
        Self { item, count }
    }

    /// Whether nothing is left in the stack.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// The candidate input offered to a category's recipes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CraftInput {
    /// Item stacks present at the position.
    Items(Vec<ItemStack>),
    /// The block observed at the position.
    Block(Identifier),
}

impl CraftInput {
    /// Item stacks, if this is an item input.
    pub fn items(&self) -> Option<&[ItemStack]> {
        match self {
            Self::Items(stacks) => Some(stacks),
            Self::Block(_) => None,
        }
    }

    /// Block type, if this is a block input.
    pub fn block(&self) -> Option<&Identifier> {
        match self {
            Self::Block(block) => Some(block),
            Self::Items(_) => None,
        }
    }

    /// Sum of the counts of every stack accepted by `accepts`.
    ///
    /// Widened to `u64` so several full stacks cannot overflow.
    pub fn count_matching(&self, mut accepts: impl FnMut(&Identifier) -> bool) -> u64 {
        self.items()
            .unwrap_or_default()
            .iter()
            .filter(|stack| accepts(&stack.item))
            .map(|stack| u64::from(stack.count))
            .sum()
    }
}

/// Event-specific extras carried by a context.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EventInfo {
    /// No triggering event (tick-driven crafts).
    #[default]
    None,
    /// An explosion centred somewhere, with the given power.
    Explosion {
        /// Blast centre.
        center: BlockPos,
        /// Blast radius.
        power: f32,
    },
    /// A lightning strike.
    Lightning {
        /// Where the bolt hit.
        strike: BlockPos,
    },
    /// A falling anvil landing.
    Anvil {
        /// Height fallen, in blocks.
        fall_distance: u32,
    },
    /// A living entity killed by another entity.
    EntityDeath {
        /// Type of the killed entity.
        entity: Identifier,
        /// Type of the killer, if known.
        killer: Option<Identifier>,
    },
}

impl EventInfo {
    /// Killed entity type, for entity-death events.
    pub fn killed_entity(&self) -> Option<&Identifier> {
        match self {
            Self::EntityDeath { entity, .. } => Some(entity),
            _ => None,
        }
    }
}

/// World access required by the crafting core.
///
/// Implemented by the simulation (or a per-event adapter around it). All
/// mutation a recipe performs goes through this trait.
pub trait CraftWorld {
    /// Block type at `pos`; `None` for air or unloaded cells.
    fn block_at(&self, pos: BlockPos) -> Option<Identifier>;

    /// Fluid type at `pos`, if any.
    fn fluid_at(&self, pos: BlockPos) -> Option<Identifier>;

    /// Replace the block at `pos` (`None` clears it).
    fn set_block(&mut self, pos: BlockPos, block: Option<Identifier>);

    /// Replace the fluid at `pos` (`None` drains it).
    fn set_fluid(&mut self, pos: BlockPos, fluid: Option<Identifier>);

    /// Spawn an item stack at `pos`.
    fn spawn_item(&mut self, pos: BlockPos, stack: ItemStack);

    /// Remove `count` items of type `item` from the item entities at `pos`.
    fn consume_items(&mut self, pos: BlockPos, item: &Identifier, count: u32);

    /// Withdraw `pos` from the current event's pending destruction, if any.
    fn spare_block(&mut self, pos: BlockPos) {
        let _ = pos;
    }
}

/// Read-only snapshot for one craft attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct CraftContext {
    /// World the attempt happens in.
    pub world: WorldId,
    /// World seed used for deterministic rolls.
    pub seed: u64,
    /// Simulation tick of the attempt.
    pub tick: SimTick,
    /// Crafting position.
    pub pos: BlockPos,
    /// Block at the position when the snapshot was taken.
    pub block: Option<Identifier>,
    /// Fluid at the position when the snapshot was taken.
    pub fluid: Option<Identifier>,
    /// Triggering event extras.
    pub event: EventInfo,
}

impl CraftContext {
    /// Capture the state at `pos` from `world`.
    pub fn capture(
        world: &dyn CraftWorld,
        frame: CraftFrame,
        pos: BlockPos,
        event: EventInfo,
    ) -> Self {
        Self {
            world: frame.world,
            seed: frame.seed,
            tick: frame.tick,
            pos,
            block: world.block_at(pos),
            fluid: world.fluid_at(pos),
            event,
        }
    }
}

/// World identity and timing shared by every attempt in one tick or event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CraftFrame {
    /// World being simulated.
    pub world: WorldId,
    /// Its seed.
    pub seed: u64,
    /// Current tick.
    pub tick: SimTick,
}
