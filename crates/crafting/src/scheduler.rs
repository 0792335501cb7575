//! Multi-tick craft scheduling.
//!
//! Each tick runs two phases against the staging buffer of one
//! (world, category) pair:
//!
//! 1. **Advance** every tracked craft. No staged input, or a recipe that no
//!    longer matches, aborts the craft. An abort caused by a failed match
//!    leaves the staged input in place. Otherwise the craft progresses (and
//!    commits once progress reaches the recipe duration) and its staged
//!    input is consumed.
//! 2. **Promote** whatever is still staged: the first matching recipe either
//!    commits immediately (duration `0`) or starts a new tracked craft.
//!
//! The buffer is empty afterwards. Because an aborted craft leaves its input
//! staged, a different recipe can claim the same position within the same
//! tick; a progressing craft keeps it.

use crate::category::RecipeCategory;
use crate::context::{CraftContext, CraftFrame, CraftWorld, EventInfo};
use crate::recipe::{CraftOutcome, RecipeDefinition};
use crate::registry::RecipeRegistry;
use crate::staging::InputStagingBuffer;
use interactio_core::BlockPos;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// An in-progress multi-tick craft.
#[derive(Debug, Clone)]
pub struct ActiveCraft {
    /// Crafting position.
    pub pos: BlockPos,
    /// Recipe being crafted.
    pub recipe: Arc<RecipeDefinition>,
    /// Ticks completed so far.
    pub progress: u32,
}

/// What one scheduler tick did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Crafts that progressed without finishing.
    pub advanced: usize,
    /// Crafts that reached their duration and committed.
    pub completed: usize,
    /// Crafts dropped because their input vanished or stopped matching.
    pub aborted: usize,
    /// New multi-tick crafts.
    pub started: usize,
    /// Zero-duration recipes committed on promotion.
    pub instant: usize,
    /// Every commit, in the order it happened.
    pub outcomes: Vec<CraftOutcome>,
}

impl TickReport {
    /// Fold another report into this one.
    pub fn merge(&mut self, other: TickReport) {
        self.advanced += other.advanced;
        self.completed += other.completed;
        self.aborted += other.aborted;
        self.started += other.started;
        self.instant += other.instant;
        self.outcomes.extend(other.outcomes);
    }
}

/// Position → in-progress craft for one (world, category) pair.
#[derive(Debug)]
pub struct DurationScheduler {
    category: RecipeCategory,
    active: BTreeMap<BlockPos, ActiveCraft>,
}

impl DurationScheduler {
    /// Create an idle scheduler.
    pub fn new(category: RecipeCategory) -> Self {
        Self {
            category,
            active: BTreeMap::new(),
        }
    }

    /// Category this scheduler drives.
    pub fn category(&self) -> RecipeCategory {
        self.category
    }

    /// The craft tracked at `pos`.
    pub fn get(&self, pos: BlockPos) -> Option<&ActiveCraft> {
        self.active.get(&pos)
    }

    /// Every tracked craft in position order.
    pub fn active(&self) -> impl Iterator<Item = &ActiveCraft> {
        self.active.values()
    }

    /// Number of tracked crafts.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Whether nothing is in progress.
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Drop every tracked craft without committing.
    pub fn clear(&mut self) {
        self.active.clear();
    }

    /// Run one tick: advance tracked crafts, then promote what is still staged.
    pub fn tick(
        &mut self,
        registry: &RecipeRegistry,
        staging: &mut InputStagingBuffer,
        world: &mut dyn CraftWorld,
        frame: CraftFrame,
    ) -> TickReport {
        let mut report = TickReport::default();
        self.advance(staging, world, frame, &mut report);
        self.promote(registry, staging, world, frame, &mut report);
        report
    }

    fn advance(
        &mut self,
        staging: &mut InputStagingBuffer,
        world: &mut dyn CraftWorld,
        frame: CraftFrame,
        report: &mut TickReport,
    ) {
        self.active.retain(|&pos, craft| {
            let Some(mut input) = staging.clear_at(pos) else {
                debug!(recipe = %craft.recipe.id(), %pos, progress = craft.progress, "craft aborted: input gone");
                report.aborted += 1;
                return false;
            };

            let ctx = CraftContext::capture(&*world, frame, pos, EventInfo::None);
            if !craft.recipe.can_craft(&input, &ctx) {
                debug!(recipe = %craft.recipe.id(), %pos, progress = craft.progress, "craft aborted: no longer matches");
                staging.write(pos, input);
                report.aborted += 1;
                return false;
            }

            craft.progress += 1;
            craft.recipe.tick(&input, &ctx, craft.progress, &mut *world);
            if craft.recipe.is_finished(craft.progress) {
                let outcome = craft.recipe.commit(&mut input, &ctx, &mut *world);
                report.outcomes.push(outcome);
                report.completed += 1;
                false
            } else {
                report.advanced += 1;
                true
            }
        });
    }

    fn promote(
        &mut self,
        registry: &RecipeRegistry,
        staging: &mut InputStagingBuffer,
        world: &mut dyn CraftWorld,
        frame: CraftFrame,
        report: &mut TickReport,
    ) {
        for (pos, mut input) in staging.take_all() {
            let ctx = CraftContext::capture(&*world, frame, pos, EventInfo::None);
            let Some(recipe) = registry.first_matching(self.category, &input, &ctx) else {
                continue;
            };

            if recipe.duration() == 0 {
                let outcome = recipe.commit(&mut input, &ctx, &mut *world);
                report.outcomes.push(outcome);
                report.instant += 1;
                continue;
            }

            debug_assert!(
                !self.active.contains_key(&pos),
                "staged input survived phase 1 at a tracked position"
            );
            debug!(recipe = %recipe.id(), %pos, duration = recipe.duration(), "craft started");
            self.active.insert(
                pos,
                ActiveCraft {
                    pos,
                    recipe,
                    progress: 0,
                },
            );
            report.started += 1;
        }
    }
}
