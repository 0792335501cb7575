//! Recipe definitions.
//!
//! A definition is plain data: resolved ingredient matchers, a weighted
//! output, a duration and two ordered hook lists. `start_conditions` are
//! AND-folded into [`RecipeDefinition::can_craft`]; `post_craft` effects run
//! in order after every successful [`RecipeDefinition::commit`].

use crate::category::{InputKind, RecipeCategory, Trigger};
use crate::context::{CraftContext, CraftInput, CraftWorld, ItemStack};
use crate::error::ConfigError;
use crate::ingredient::IngredientMatcher;
use crate::output::{CraftOutput, WeightedOutput};
use interactio_core::{scoped_rng, BlockPos, Identifier};
use rand::Rng;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Predicate evaluated before any craft attempt.
pub type StartCondition = Arc<dyn Fn(&CraftInput, &CraftContext) -> bool + Send + Sync>;

/// Effect run after a successful craft.
pub type PostCraftEffect = Arc<dyn Fn(&CraftContext, &CraftOutcome, &mut dyn CraftWorld) + Send + Sync>;

/// Effect run on every tick a multi-tick craft advances; receives the new progress.
pub type TickEffect =
    Arc<dyn Fn(&CraftInput, &CraftContext, u32, &mut dyn CraftWorld) + Send + Sync>;

/// An item ingredient with quantity and return chance.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRequirement {
    /// Accepted item types.
    pub matcher: IngredientMatcher,
    /// Items consumed per craft.
    pub count: u32,
    /// Probability that the items are handed back instead of consumed.
    pub return_chance: f32,
}

/// A fluid ingredient tested against the fluid at the crafting position.
#[derive(Debug, Clone, PartialEq)]
pub struct FluidRequirement {
    /// Accepted fluid types.
    pub matcher: IngredientMatcher,
    /// Probability that a craft drains the fluid.
    pub consume_chance: f32,
}

/// What a committed craft did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CraftOutcome {
    /// Recipe that fired.
    pub recipe: Identifier,
    /// Crafting position.
    pub pos: BlockPos,
    /// Items taken from the input.
    pub consumed: Vec<ItemStack>,
    /// Outputs that were rolled and applied.
    pub outputs: Vec<CraftOutput>,
}

/// A registered recipe.
pub struct RecipeDefinition {
    id: Identifier,
    category: RecipeCategory,
    items: Vec<ItemRequirement>,
    block: Option<IngredientMatcher>,
    fluid: Option<FluidRequirement>,
    entity: Option<IngredientMatcher>,
    output: WeightedOutput,
    duration: u32,
    start_conditions: Vec<StartCondition>,
    post_craft: Vec<PostCraftEffect>,
    on_tick: Option<TickEffect>,
}

impl fmt::Debug for RecipeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecipeDefinition")
            .field("id", &self.id)
            .field("category", &self.category)
            .field("items", &self.items)
            .field("block", &self.block)
            .field("fluid", &self.fluid)
            .field("entity", &self.entity)
            .field("output", &self.output)
            .field("duration", &self.duration)
            .field("start_conditions", &self.start_conditions.len())
            .field("post_craft", &self.post_craft.len())
            .field("on_tick", &self.on_tick.is_some())
            .finish()
    }
}

impl RecipeDefinition {
    /// Start building a recipe for `category`.
    pub fn builder(id: Identifier, category: RecipeCategory) -> RecipeBuilder {
        RecipeBuilder::new(id, category)
    }

    /// Recipe id.
    pub fn id(&self) -> &Identifier {
        &self.id
    }

    /// Category the recipe belongs to.
    pub fn category(&self) -> RecipeCategory {
        self.category
    }

    /// Craft duration in ticks; `0` crafts instantly.
    pub fn duration(&self) -> u32 {
        self.duration
    }

    /// Item ingredients.
    pub fn items(&self) -> &[ItemRequirement] {
        &self.items
    }

    /// Block ingredient.
    pub fn block(&self) -> Option<&IngredientMatcher> {
        self.block.as_ref()
    }

    /// Fluid ingredient.
    pub fn fluid(&self) -> Option<&FluidRequirement> {
        self.fluid.as_ref()
    }

    /// Entity ingredient.
    pub fn entity(&self) -> Option<&IngredientMatcher> {
        self.entity.as_ref()
    }

    /// Output distribution.
    pub fn output(&self) -> &WeightedOutput {
        &self.output
    }

    /// Whether `progress` completes this recipe.
    pub fn is_finished(&self, progress: u32) -> bool {
        progress >= self.duration
    }

    /// Cheap pre-check against the primary item or block ingredient only.
    pub fn accepts_primary(&self, key: &Identifier) -> bool {
        match self.category.input_kind() {
            InputKind::Items => self
                .items
                .first()
                .is_some_and(|req| req.matcher.contains(key)),
            InputKind::Block => self.block.as_ref().is_some_and(|m| m.contains(key)),
        }
    }

    /// Ingredients agree and every start condition holds.
    pub fn can_craft(&self, input: &CraftInput, ctx: &CraftContext) -> bool {
        self.ingredients_match(input, ctx)
            && self
                .start_conditions
                .iter()
                .all(|condition| condition(input, ctx))
    }

    fn ingredients_match(&self, input: &CraftInput, ctx: &CraftContext) -> bool {
        let primary = match (self.category.input_kind(), input) {
            (InputKind::Items, CraftInput::Items(_)) => self.items.iter().all(|req| {
                input.count_matching(|item| req.matcher.contains(item)) >= u64::from(req.count)
            }),
            (InputKind::Block, CraftInput::Block(block)) => {
                self.block.as_ref().is_some_and(|m| m.contains(block))
            }
            _ => false,
        };

        primary
            && self
                .fluid
                .as_ref()
                .map_or(true, |req| req.matcher.test(ctx.fluid.as_ref()))
            && self
                .entity
                .as_ref()
                .map_or(true, |m| m.test(ctx.event.killed_entity()))
    }

    /// Per-tick side effect for an advancing multi-tick craft.
    pub fn tick(
        &self,
        input: &CraftInput,
        ctx: &CraftContext,
        progress: u32,
        world: &mut dyn CraftWorld,
    ) {
        trace!(recipe = %self.id, pos = %ctx.pos, progress, duration = self.duration, "craft progressing");
        if let Some(hook) = &self.on_tick {
            hook(input, ctx, progress, world);
        }
    }

    /// Consume the input, apply the rolled outputs and run post-craft effects.
    ///
    /// Item stacks in `input` are decremented in place so later recipes in the
    /// same dispatch see what is left; every removal is also reported to the
    /// world via [`CraftWorld::consume_items`].
    pub fn commit(
        &self,
        input: &mut CraftInput,
        ctx: &CraftContext,
        world: &mut dyn CraftWorld,
    ) -> CraftOutcome {
        // Salted per recipe so crafts sharing a position and tick roll independently.
        let mut rng = scoped_rng(ctx.seed ^ self.id.hash_key(), ctx.pos, ctx.tick);
        let mut consumed = Vec::new();

        if let CraftInput::Items(stacks) = input {
            for req in &self.items {
                if req.return_chance > 0.0 && rng.gen::<f32>() < req.return_chance {
                    continue;
                }
                let mut remaining = req.count;
                for stack in stacks.iter_mut() {
                    if remaining == 0 {
                        break;
                    }
                    if !req.matcher.contains(&stack.item) {
                        continue;
                    }
                    let taken = remaining.min(stack.count);
                    if taken == 0 {
                        continue;
                    }
                    stack.count -= taken;
                    remaining -= taken;
                    world.consume_items(ctx.pos, &stack.item, taken);
                    consumed.push(ItemStack::new(stack.item.clone(), taken));
                }
            }
            stacks.retain(|stack| !stack.is_empty());
        }

        if let Some(fluid) = &self.fluid {
            if fluid.consume_chance > 0.0 && rng.gen::<f32>() < fluid.consume_chance {
                world.set_fluid(ctx.pos, None);
            }
        }

        let outputs = self.output.roll(&mut rng);
        let mut placed = false;
        for output in &outputs {
            match output {
                CraftOutput::Item(stack) => world.spawn_item(ctx.pos, stack.clone()),
                CraftOutput::Block(block) => {
                    world.set_block(ctx.pos, Some(block.clone()));
                    placed = true;
                }
                CraftOutput::Fluid(fluid) => {
                    world.set_block(ctx.pos, None);
                    world.set_fluid(ctx.pos, Some(fluid.clone()));
                    placed = true;
                }
            }
        }
        if self.category.input_kind() == InputKind::Block && !placed {
            world.set_block(ctx.pos, None);
        }

        let outcome = CraftOutcome {
            recipe: self.id.clone(),
            pos: ctx.pos,
            consumed,
            outputs,
        };

        for effect in &self.post_craft {
            effect(ctx, &outcome, world);
        }

        debug!(
            recipe = %self.id,
            category = %self.category,
            pos = %ctx.pos,
            outputs = outcome.outputs.len(),
            "craft committed"
        );
        outcome
    }
}

/// Builder for [`RecipeDefinition`]; validates the shape on [`RecipeBuilder::build`].
pub struct RecipeBuilder {
    id: Identifier,
    category: RecipeCategory,
    items: Vec<ItemRequirement>,
    block: Option<IngredientMatcher>,
    fluid: Option<FluidRequirement>,
    entity: Option<IngredientMatcher>,
    output: Option<WeightedOutput>,
    duration: u32,
    start_conditions: Vec<StartCondition>,
    post_craft: Vec<PostCraftEffect>,
    on_tick: Option<TickEffect>,
}

impl RecipeBuilder {
    fn new(id: Identifier, category: RecipeCategory) -> Self {
        Self {
            id,
            category,
            items: Vec::new(),
            block: None,
            fluid: None,
            entity: None,
            output: None,
            duration: 0,
            start_conditions: Vec::new(),
            post_craft: Vec::new(),
            on_tick: None,
        }
    }

    /// Require `count` items accepted by `matcher`, always consumed.
    pub fn item_input(self, matcher: IngredientMatcher, count: u32) -> Self {
        self.item_input_with_return(matcher, count, 0.0)
    }

    /// Require `count` items; with probability `return_chance` they are kept.
    pub fn item_input_with_return(
        mut self,
        matcher: IngredientMatcher,
        count: u32,
        return_chance: f32,
    ) -> Self {
        self.items.push(ItemRequirement {
            matcher,
            count,
            return_chance,
        });
        self
    }

    /// Require the block at the position to match.
    pub fn block_input(mut self, matcher: IngredientMatcher) -> Self {
        self.block = Some(matcher);
        self
    }

    /// Require the fluid at the position to match; drained with `consume_chance`.
    pub fn fluid_input(mut self, matcher: IngredientMatcher, consume_chance: f32) -> Self {
        self.fluid = Some(FluidRequirement {
            matcher,
            consume_chance,
        });
        self
    }

    /// Require the killed entity to match.
    pub fn entity_input(mut self, matcher: IngredientMatcher) -> Self {
        self.entity = Some(matcher);
        self
    }

    /// Output distribution.
    pub fn output(mut self, output: WeightedOutput) -> Self {
        self.output = Some(output);
        self
    }

    /// Duration in ticks.
    pub fn duration(mut self, ticks: u32) -> Self {
        self.duration = ticks;
        self
    }

    /// Append a start condition.
    pub fn start_condition<F>(mut self, condition: F) -> Self
    where
        F: Fn(&CraftInput, &CraftContext) -> bool + Send + Sync + 'static,
    {
        self.start_conditions.push(Arc::new(condition));
        self
    }

    /// Append a post-craft effect.
    pub fn post_craft<F>(mut self, effect: F) -> Self
    where
        F: Fn(&CraftContext, &CraftOutcome, &mut dyn CraftWorld) + Send + Sync + 'static,
    {
        self.post_craft.push(Arc::new(effect));
        self
    }

    /// Set the per-tick effect.
    pub fn on_tick<F>(mut self, effect: F) -> Self
    where
        F: Fn(&CraftInput, &CraftContext, u32, &mut dyn CraftWorld) + Send + Sync + 'static,
    {
        self.on_tick = Some(Arc::new(effect));
        self
    }

    /// Validate and finish the definition.
    pub fn build(mut self) -> Result<RecipeDefinition, ConfigError> {
        let id = &self.id;
        let category = self.category;
        let output = self
            .output
            .take()
            .ok_or_else(|| ConfigError::invalid_recipe(id, "missing output"))?;
        if output.entries().is_empty() {
            return Err(ConfigError::invalid_recipe(id, "output must have at least one entry"));
        }
        if output.total_weight().is_none() {
            return Err(ConfigError::invalid_recipe(id, "output weights overflow"));
        }
        if output.rolls == 0 {
            return Err(ConfigError::invalid_recipe(id, "output rolls must be at least 1"));
        }

        match category.input_kind() {
            InputKind::Items => {
                if self.items.is_empty() {
                    return Err(ConfigError::invalid_recipe(
                        id,
                        format!("{category} recipes need at least one item input"),
                    ));
                }
                if self.block.is_some() {
                    return Err(ConfigError::invalid_recipe(
                        id,
                        format!("{category} recipes take no block input"),
                    ));
                }
            }
            InputKind::Block => {
                if self.block.is_none() {
                    return Err(ConfigError::invalid_recipe(
                        id,
                        format!("{category} recipes need a block input"),
                    ));
                }
                if !self.items.is_empty() {
                    return Err(ConfigError::invalid_recipe(
                        id,
                        format!("{category} recipes take no item inputs"),
                    ));
                }
            }
        }

        for req in &self.items {
            if req.count == 0 {
                return Err(ConfigError::invalid_recipe(id, "item input count must be at least 1"));
            }
            if !is_probability(req.return_chance) {
                return Err(ConfigError::invalid_recipe(id, "return chance must be within [0, 1]"));
            }
        }
        if let Some(fluid) = &self.fluid {
            if !is_probability(fluid.consume_chance) {
                return Err(ConfigError::invalid_recipe(
                    id,
                    "fluid consume chance must be within [0, 1]",
                ));
            }
        } else if category == RecipeCategory::ItemFluidTransform {
            return Err(ConfigError::invalid_recipe(id, "fluid transform recipes need a fluid input"));
        }
        if self.entity.is_some() && category.trigger() != Trigger::EntityDeath {
            return Err(ConfigError::invalid_recipe(
                id,
                format!("{category} recipes take no entity input"),
            ));
        }
        if self.duration > 0 && !category.supports_duration() {
            return Err(ConfigError::invalid_recipe(
                id,
                format!("{category} recipes are instantaneous"),
            ));
        }

        if category == RecipeCategory::BlockExplode && output.can_place_in_world() {
            let spare: PostCraftEffect = Arc::new(
                |ctx: &CraftContext, outcome: &CraftOutcome, world: &mut dyn CraftWorld| {
                    if outcome.outputs.iter().any(CraftOutput::places_in_world) {
                        world.spare_block(ctx.pos);
                    }
                },
            );
            self.post_craft.insert(0, spare);
        }

        Ok(RecipeDefinition {
            id: self.id,
            category,
            items: self.items,
            block: self.block,
            fluid: self.fluid,
            entity: self.entity,
            output,
            duration: self.duration,
            start_conditions: self.start_conditions,
            post_craft: self.post_craft,
            on_tick: self.on_tick,
        })
    }
}

fn is_probability(value: f32) -> bool {
    (0.0..=1.0).contains(&value)
}
