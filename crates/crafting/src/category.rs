//! Recipe categories.
//!
//! A category fixes the input shape, the triggering event and the dispatch
//! mode shared by every recipe registered under it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Shape of the input a category's recipes consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    /// A list of item stacks (dropped item entities).
    Items,
    /// The block occupying the crafting position.
    Block,
}

/// The world event that offers inputs to a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// An explosion detonates.
    Explosion,
    /// Lightning strikes.
    Lightning,
    /// A falling anvil lands.
    Anvil,
    /// A living entity is killed.
    EntityDeath,
    /// Every world tick, via the staging buffer.
    Tick,
}

/// How many recipes may fire for one offered input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dispatch {
    /// First matching recipe in registration order only.
    First,
    /// Every matching recipe.
    All,
}

/// Closed set of recipe categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipeCategory {
    /// Items caught in an explosion.
    ItemExplode,
    /// Blocks destroyed by an explosion.
    BlockExplode,
    /// Items struck by lightning.
    ItemLightning,
    /// The block underneath a lightning strike.
    BlockLightning,
    /// Items crushed by a landing anvil.
    ItemAnvil,
    /// The block an anvil lands on.
    BlockAnvil,
    /// Items lying where an entity is killed.
    ItemEntityKill,
    /// The block underneath a killed entity.
    BlockEntityKill,
    /// Items resting inside a fluid, over one or more ticks.
    ItemFluidTransform,
}

impl RecipeCategory {
    /// Every category, in a stable order.
    pub const ALL: [RecipeCategory; 9] = [
        Self::ItemExplode,
        Self::BlockExplode,
        Self::ItemLightning,
        Self::BlockLightning,
        Self::ItemAnvil,
        Self::BlockAnvil,
        Self::ItemEntityKill,
        Self::BlockEntityKill,
        Self::ItemFluidTransform,
    ];

    /// Input shape for this category.
    pub const fn input_kind(self) -> InputKind {
        match self {
            Self::ItemExplode
            | Self::ItemLightning
            | Self::ItemAnvil
            | Self::ItemEntityKill
            | Self::ItemFluidTransform => InputKind::Items,
            Self::BlockExplode | Self::BlockLightning | Self::BlockAnvil | Self::BlockEntityKill => {
                InputKind::Block
            }
        }
    }

    /// Event that feeds this category.
    pub const fn trigger(self) -> Trigger {
        match self {
            Self::ItemExplode | Self::BlockExplode => Trigger::Explosion,
            Self::ItemLightning | Self::BlockLightning => Trigger::Lightning,
            Self::ItemAnvil | Self::BlockAnvil => Trigger::Anvil,
            Self::ItemEntityKill | Self::BlockEntityKill => Trigger::EntityDeath,
            Self::ItemFluidTransform => Trigger::Tick,
        }
    }

    /// Dispatch mode used when the event fires.
    ///
    /// Exploding blocks, anvil-struck blocks and fluid soaks take the first
    /// matching recipe only.
    pub const fn dispatch(self) -> Dispatch {
        match self {
            Self::BlockExplode | Self::BlockAnvil | Self::ItemFluidTransform => Dispatch::First,
            _ => Dispatch::All,
        }
    }

    /// Whether recipes in this category may declare a non-zero duration.
    pub const fn supports_duration(self) -> bool {
        matches!(self.trigger(), Trigger::Tick)
    }

    /// Canonical string key used in configs/logs.
    pub const fn key(self) -> &'static str {
        match self {
            Self::ItemExplode => "item_explode",
            Self::BlockExplode => "block_explode",
            Self::ItemLightning => "item_lightning",
            Self::BlockLightning => "block_lightning",
            Self::ItemAnvil => "item_anvil",
            Self::BlockAnvil => "block_anvil",
            Self::ItemEntityKill => "item_entity_kill",
            Self::BlockEntityKill => "block_entity_kill",
            Self::ItemFluidTransform => "item_fluid_transform",
        }
    }
}

impl fmt::Display for RecipeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
