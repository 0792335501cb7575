//! In-world crafting engine.
//!
//! Recipes fire when a world event (explosion, lightning, anvil landing,
//! entity death) or a per-tick condition brings their ingredients together
//! at a position. Instantaneous categories are dispatched straight from the
//! [`events`] handlers; multi-tick categories are staged per tick and driven
//! by a [`DurationScheduler`] owned by each world's [`WorldCrafting`].

#![warn(missing_docs)]

mod category;
mod context;
mod error;
pub mod events;
mod ingredient;
mod output;
mod recipe;
mod registry;
mod scheduler;
mod staging;
mod state;

pub use category::{Dispatch, InputKind, RecipeCategory, Trigger};
pub use context::{CraftContext, CraftFrame, CraftInput, CraftWorld, EventInfo, ItemStack};
pub use error::{ConfigError, WireError};
pub use events::{AnvilLandingEvent, EntityDeathEvent, ExplosionEvent, LightningEvent};
pub use ingredient::{
    DynamicSetCatalog, IngredientEntry, IngredientKind, IngredientMatcher, IngredientSpec,
    DYNAMIC_SET_KEY, EXPLICIT_KEY,
};
pub use output::{CraftOutput, WeightedOutput};
pub use recipe::{
    CraftOutcome, FluidRequirement, ItemRequirement, PostCraftEffect, RecipeBuilder,
    RecipeDefinition, StartCondition, TickEffect,
};
pub use registry::{LoadReport, RecipeRegistry};
pub use scheduler::{ActiveCraft, DurationScheduler, TickReport};
pub use staging::InputStagingBuffer;
pub use state::{CraftingWorlds, WorldCrafting};
