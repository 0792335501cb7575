//! Instantaneous event-triggered crafting.
//!
//! Detection lives with the simulation: it hands over an already-collected
//! event and these handlers route it to the matching categories, bypassing
//! the staging buffer. Inputs are pre-checked with
//! [`RecipeRegistry::is_valid_input`]; each category's [`Dispatch`] mode
//! decides whether the first or every matching recipe fires.

use crate::category::{Dispatch, RecipeCategory};
use crate::context::{CraftContext, CraftFrame, CraftInput, CraftWorld, EventInfo, ItemStack};
use crate::recipe::{CraftOutcome, RecipeDefinition};
use crate::registry::RecipeRegistry;
use interactio_core::{BlockPos, Identifier};
use std::collections::BTreeSet;
use tracing::debug;

/// An explosion that is about to destroy `affected_blocks`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplosionEvent {
    /// Blast centre; item recipes craft here.
    pub center: BlockPos,
    /// Blast power.
    pub power: f32,
    /// Item stacks caught in the blast.
    pub items: Vec<ItemStack>,
    /// Positions the explosion will destroy. Block recipes that place
    /// something remove their position from this set.
    pub affected_blocks: BTreeSet<BlockPos>,
}

/// A lightning bolt striking `strike`.
#[derive(Debug, Clone, PartialEq)]
pub struct LightningEvent {
    /// Where the bolt hit; item recipes craft here, block recipes one below.
    pub strike: BlockPos,
    /// Item stacks struck.
    pub items: Vec<ItemStack>,
}

/// A falling anvil coming to rest at `pos`.
#[derive(Debug, Clone, PartialEq)]
pub struct AnvilLandingEvent {
    /// Landing position; item recipes craft here, block recipes one below.
    pub pos: BlockPos,
    /// Height fallen, in blocks.
    pub fall_distance: u32,
    /// Item stacks sharing the landing cell.
    pub items: Vec<ItemStack>,
}

/// A living entity killed at `pos`.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityDeathEvent {
    /// Where it died; item recipes craft here, block recipes one below.
    pub pos: BlockPos,
    /// Type of the killed entity.
    pub entity: Identifier,
    /// Type of the entity that dealt the killing blow. Deaths without one
    /// (fall damage, starvation) never craft.
    pub killer: Option<Identifier>,
    /// Item stacks at the death position.
    pub items: Vec<ItemStack>,
}

/// Route an explosion: pooled items first, then every affected block.
pub fn on_explosion(
    registry: &RecipeRegistry,
    world: &mut dyn CraftWorld,
    frame: CraftFrame,
    event: &mut ExplosionEvent,
) -> Vec<CraftOutcome> {
    let info = EventInfo::Explosion {
        center: event.center,
        power: event.power,
    };
    let targets: Vec<BlockPos> = event.affected_blocks.iter().copied().collect();
    let mut world = ExplosionWorld {
        inner: world,
        affected: &mut event.affected_blocks,
    };

    let mut outcomes = craft_items(
        registry,
        RecipeCategory::ItemExplode,
        &mut world,
        frame,
        event.center,
        &info,
        &event.items,
    );
    for pos in targets {
        outcomes.extend(craft_block(
            registry,
            RecipeCategory::BlockExplode,
            &mut world,
            frame,
            pos,
            &info,
        ));
    }

    debug!(center = %event.center, crafts = outcomes.len(), spared_left = event.affected_blocks.len(), "explosion handled");
    outcomes
}

/// Route a lightning strike to the struck items and the block beneath.
pub fn on_lightning(
    registry: &RecipeRegistry,
    world: &mut dyn CraftWorld,
    frame: CraftFrame,
    event: &LightningEvent,
) -> Vec<CraftOutcome> {
    let info = EventInfo::Lightning {
        strike: event.strike,
    };
    let mut outcomes = craft_items(
        registry,
        RecipeCategory::ItemLightning,
        world,
        frame,
        event.strike,
        &info,
        &event.items,
    );
    outcomes.extend(craft_block(
        registry,
        RecipeCategory::BlockLightning,
        world,
        frame,
        event.strike.below(),
        &info,
    ));
    debug!(strike = %event.strike, crafts = outcomes.len(), "lightning handled");
    outcomes
}

/// Route an anvil landing to the items it crushed and the block it hit.
pub fn on_anvil_landing(
    registry: &RecipeRegistry,
    world: &mut dyn CraftWorld,
    frame: CraftFrame,
    event: &AnvilLandingEvent,
) -> Vec<CraftOutcome> {
    let info = EventInfo::Anvil {
        fall_distance: event.fall_distance,
    };
    let mut outcomes = craft_items(
        registry,
        RecipeCategory::ItemAnvil,
        world,
        frame,
        event.pos,
        &info,
        &event.items,
    );
    outcomes.extend(craft_block(
        registry,
        RecipeCategory::BlockAnvil,
        world,
        frame,
        event.pos.below(),
        &info,
    ));
    debug!(pos = %event.pos, crafts = outcomes.len(), "anvil landing handled");
    outcomes
}

/// Route a kill to the items at the death position and the block beneath.
pub fn on_entity_death(
    registry: &RecipeRegistry,
    world: &mut dyn CraftWorld,
    frame: CraftFrame,
    event: &EntityDeathEvent,
) -> Vec<CraftOutcome> {
    if event.killer.is_none() {
        return Vec::new();
    }
    let info = EventInfo::EntityDeath {
        entity: event.entity.clone(),
        killer: event.killer.clone(),
    };
    let mut outcomes = craft_items(
        registry,
        RecipeCategory::ItemEntityKill,
        world,
        frame,
        event.pos,
        &info,
        &event.items,
    );
    outcomes.extend(craft_block(
        registry,
        RecipeCategory::BlockEntityKill,
        world,
        frame,
        event.pos.below(),
        &info,
    ));
    debug!(pos = %event.pos, entity = %event.entity, crafts = outcomes.len(), "entity death handled");
    outcomes
}

fn craft_items(
    registry: &RecipeRegistry,
    category: RecipeCategory,
    world: &mut dyn CraftWorld,
    frame: CraftFrame,
    pos: BlockPos,
    info: &EventInfo,
    items: &[ItemStack],
) -> Vec<CraftOutcome> {
    let stacks: Vec<ItemStack> = items.iter().filter(|stack| !stack.is_empty()).cloned().collect();
    // Secondary ingredients ride along once any stack passes the primary pre-check.
    if !stacks
        .iter()
        .any(|stack| registry.is_valid_input(category, &stack.item))
    {
        return Vec::new();
    }
    dispatch(registry, category, world, frame, pos, info, CraftInput::Items(stacks))
}

fn craft_block(
    registry: &RecipeRegistry,
    category: RecipeCategory,
    world: &mut dyn CraftWorld,
    frame: CraftFrame,
    pos: BlockPos,
    info: &EventInfo,
) -> Vec<CraftOutcome> {
    match world.block_at(pos) {
        Some(block) if registry.is_valid_input(category, &block) => dispatch(
            registry,
            category,
            world,
            frame,
            pos,
            info,
            CraftInput::Block(block),
        ),
        _ => Vec::new(),
    }
}

fn dispatch(
    registry: &RecipeRegistry,
    category: RecipeCategory,
    world: &mut dyn CraftWorld,
    frame: CraftFrame,
    pos: BlockPos,
    info: &EventInfo,
    input: CraftInput,
) -> Vec<CraftOutcome> {
    let ctx = CraftContext::capture(&*world, frame, pos, info.clone());
    let mut attempt = EventAttempt {
        world,
        frame,
        input: Some(input),
        ctx,
        outcomes: Vec::new(),
    };
    match category.dispatch() {
        Dispatch::First => {
            registry.apply(
                category,
                &mut attempt,
                |recipe, attempt| attempt.accepts(recipe),
                |recipe, attempt| attempt.commit(recipe),
            );
        }
        Dispatch::All => {
            registry.apply_all(
                category,
                &mut attempt,
                |recipe, attempt| attempt.accepts(recipe),
                |recipe, attempt| attempt.commit(recipe),
            );
        }
    }
    attempt.outcomes
}

/// State threaded through one event dispatch.
///
/// Item inputs shrink in place as recipes consume them; block inputs and the
/// context are re-read after every commit so later recipes see the new block.
struct EventAttempt<'w> {
    world: &'w mut dyn CraftWorld,
    frame: CraftFrame,
    input: Option<CraftInput>,
    ctx: CraftContext,
    outcomes: Vec<CraftOutcome>,
}

impl EventAttempt<'_> {
    fn accepts(&self, recipe: &RecipeDefinition) -> bool {
        self.input
            .as_ref()
            .is_some_and(|input| recipe.can_craft(input, &self.ctx))
    }

    fn commit(&mut self, recipe: &RecipeDefinition) {
        let Some(input) = self.input.as_mut() else {
            return;
        };
        let outcome = recipe.commit(input, &self.ctx, &mut *self.world);
        self.outcomes.push(outcome);

        let pos = self.ctx.pos;
        let info = self.ctx.event.clone();
        self.ctx = CraftContext::capture(&*self.world, self.frame, pos, info);
        if matches!(self.input, Some(CraftInput::Block(_))) {
            self.input = self.ctx.block.clone().map(CraftInput::Block);
        }
    }
}

/// World view for the duration of one explosion.
struct ExplosionWorld<'a> {
    inner: &'a mut dyn CraftWorld,
    affected: &'a mut BTreeSet<BlockPos>,
}

impl CraftWorld for ExplosionWorld<'_> {
    fn block_at(&self, pos: BlockPos) -> Option<Identifier> {
        self.inner.block_at(pos)
    }

    fn fluid_at(&self, pos: BlockPos) -> Option<Identifier> {
        self.inner.fluid_at(pos)
    }

    fn set_block(&mut self, pos: BlockPos, block: Option<Identifier>) {
        self.inner.set_block(pos, block);
    }

    fn set_fluid(&mut self, pos: BlockPos, fluid: Option<Identifier>) {
        self.inner.set_fluid(pos, fluid);
    }

    fn spawn_item(&mut self, pos: BlockPos, stack: ItemStack) {
        self.inner.spawn_item(pos, stack);
    }

    fn consume_items(&mut self, pos: BlockPos, item: &Identifier, count: u32) {
        self.inner.consume_items(pos, item, count);
    }

    fn spare_block(&mut self, pos: BlockPos) {
        if self.affected.remove(&pos) {
            debug!(%pos, "block spared from explosion");
        }
    }
}
