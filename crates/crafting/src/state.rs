//! Per-world crafting state.
//!
//! Every world owns one staging buffer and one scheduler per category. The
//! state is created explicitly when a world loads and dropped when it
//! unloads; nothing is shared between worlds.

use crate::category::RecipeCategory;
use crate::context::{CraftFrame, CraftInput, CraftWorld};
use crate::registry::RecipeRegistry;
use crate::scheduler::{DurationScheduler, TickReport};
use crate::staging::InputStagingBuffer;
use interactio_core::{BlockPos, SimTick, WorldId};
use std::collections::BTreeMap;
use tracing::{debug, warn};

#[derive(Debug)]
struct CategoryLane {
    staging: InputStagingBuffer,
    scheduler: DurationScheduler,
}

impl CategoryLane {
    fn new(category: RecipeCategory) -> Self {
        Self {
            staging: InputStagingBuffer::new(),
            scheduler: DurationScheduler::new(category),
        }
    }
}

/// Crafting state attached to one world instance.
#[derive(Debug)]
pub struct WorldCrafting {
    id: WorldId,
    seed: u64,
    lanes: BTreeMap<RecipeCategory, CategoryLane>,
}

impl WorldCrafting {
    /// Fresh state for a world.
    pub fn new(id: WorldId, seed: u64) -> Self {
        Self {
            id,
            seed,
            lanes: BTreeMap::new(),
        }
    }

    /// World this state belongs to.
    pub fn id(&self) -> WorldId {
        self.id
    }

    /// World seed used for craft rolls.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Frame for attempts made at `tick`.
    pub fn frame(&self, tick: SimTick) -> CraftFrame {
        CraftFrame {
            world: self.id,
            seed: self.seed,
            tick,
        }
    }

    fn lane_mut(&mut self, category: RecipeCategory) -> &mut CategoryLane {
        self.lanes
            .entry(category)
            .or_insert_with(|| CategoryLane::new(category))
    }

    /// Staging buffer for `category`, if anything was ever staged there.
    pub fn staging(&self, category: RecipeCategory) -> Option<&InputStagingBuffer> {
        self.lanes.get(&category).map(|lane| &lane.staging)
    }

    /// Staging buffer for `category`.
    pub fn staging_mut(&mut self, category: RecipeCategory) -> &mut InputStagingBuffer {
        &mut self.lane_mut(category).staging
    }

    /// Stage an input for the next tick.
    pub fn stage(&mut self, category: RecipeCategory, pos: BlockPos, input: CraftInput) {
        self.staging_mut(category).write(pos, input);
    }

    /// Scheduler for `category`, if anything was ever staged there.
    pub fn scheduler(&self, category: RecipeCategory) -> Option<&DurationScheduler> {
        self.lanes.get(&category).map(|lane| &lane.scheduler)
    }

    /// Progress of the craft tracked at `pos`.
    pub fn progress_at(&self, category: RecipeCategory, pos: BlockPos) -> Option<u32> {
        self.scheduler(category)
            .and_then(|scheduler| scheduler.get(pos))
            .map(|craft| craft.progress)
    }

    /// Number of tracked crafts across all categories.
    pub fn active_crafts(&self) -> usize {
        self.lanes.values().map(|lane| lane.scheduler.len()).sum()
    }

    /// Tick every category lane.
    pub fn tick(
        &mut self,
        registry: &RecipeRegistry,
        world: &mut dyn CraftWorld,
        tick: SimTick,
    ) -> TickReport {
        let frame = self.frame(tick);
        let mut report = TickReport::default();
        for lane in self.lanes.values_mut() {
            let lane_report = lane
                .scheduler
                .tick(registry, &mut lane.staging, &mut *world, frame);
            report.merge(lane_report);
        }
        report
    }
}

/// All loaded worlds' crafting state.
#[derive(Debug, Default)]
pub struct CraftingWorlds {
    worlds: BTreeMap<WorldId, WorldCrafting>,
}

impl CraftingWorlds {
    /// No worlds loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach fresh crafting state to a world that just loaded.
    ///
    /// Loading an already-loaded world discards its previous state.
    pub fn load_world(&mut self, id: WorldId, seed: u64) -> &mut WorldCrafting {
        if let Some(previous) = self.worlds.remove(&id) {
            warn!(world = %id, dropped = previous.active_crafts(), "World loaded twice; resetting crafting state");
        }
        debug!(world = %id, "crafting state attached");
        self.worlds
            .entry(id)
            .or_insert_with(|| WorldCrafting::new(id, seed))
    }

    /// Tear down a world's crafting state. In-progress crafts are discarded.
    pub fn unload_world(&mut self, id: WorldId) -> Option<WorldCrafting> {
        let state = self.worlds.remove(&id)?;
        debug!(world = %id, dropped = state.active_crafts(), "crafting state detached");
        Some(state)
    }

    /// Crafting state of a loaded world.
    pub fn world(&self, id: WorldId) -> Option<&WorldCrafting> {
        self.worlds.get(&id)
    }

    /// Mutable crafting state of a loaded world.
    pub fn world_mut(&mut self, id: WorldId) -> Option<&mut WorldCrafting> {
        self.worlds.get_mut(&id)
    }

    /// Whether `id` is loaded.
    pub fn is_loaded(&self, id: WorldId) -> bool {
        self.worlds.contains_key(&id)
    }

    /// Loaded worlds.
    pub fn worlds(&self) -> impl Iterator<Item = WorldId> + '_ {
        self.worlds.keys().copied()
    }

    /// Tick one loaded world. Returns `None` if it is not loaded.
    pub fn tick_world(
        &mut self,
        id: WorldId,
        registry: &RecipeRegistry,
        world: &mut dyn CraftWorld,
        tick: SimTick,
    ) -> Option<TickReport> {
        self.worlds
            .get_mut(&id)
            .map(|state| state.tick(registry, world, tick))
    }

    /// Tick every loaded world that has a counterpart in `sims`.
    ///
    /// Worlds without a simulation this tick are skipped, not torn down.
    pub fn tick_all<W: CraftWorld>(
        &mut self,
        registry: &RecipeRegistry,
        sims: &mut BTreeMap<WorldId, W>,
        tick: SimTick,
    ) -> BTreeMap<WorldId, TickReport> {
        let mut reports = BTreeMap::new();
        for (id, state) in &mut self.worlds {
            if let Some(sim) = sims.get_mut(id) {
                reports.insert(*id, state.tick(registry, sim, tick));
            }
        }
        reports
    }
}
