//! Scripted headless crafting run.
//!
//! A small world with a water pool, a lava puddle and a few blocks is
//! stepped tick by tick. Items resting in fluid are staged for the tick
//! category every tick; one-off events fire on fixed ticks.

use crate::config::SimConfig;
use anyhow::{Context, Result};
use interactio_core::{BlockPos, Identifier, SimTick, WorldId};
use interactio_crafting::events::{on_anvil_landing, on_entity_death, on_explosion, on_lightning};
use interactio_crafting::{
    AnvilLandingEvent, CraftFrame, CraftInput, CraftOutcome, CraftWorld, CraftingWorlds,
    EntityDeathEvent, ExplosionEvent, ItemStack, LightningEvent, RecipeCategory, RecipeRegistry,
    WorldCrafting,
};
use interactio_testkit::{EventRecord, JsonlSink, MemoryWorld};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

const WORLD: WorldId = WorldId::OVERWORLD;

/// Totals for a finished run.
#[derive(Debug, Default, Serialize)]
pub struct DemoSummary {
    pub ticks: u64,
    /// Committed crafts per trigger kind.
    pub crafts: BTreeMap<&'static str, usize>,
    pub started: usize,
    pub aborted: usize,
    pub active_at_end: usize,
    pub events_logged: usize,
}

#[derive(Debug, Clone)]
enum Scripted {
    Explosion { center: BlockPos, power: f32, radius: i32 },
    Lightning { strike: BlockPos },
    AnvilLanding { pos: BlockPos, fall_distance: u32 },
    Kill { pos: BlockPos, entity: &'static str, killer: Option<&'static str> },
}

impl Scripted {
    fn kind(&self) -> &'static str {
        match self {
            Self::Explosion { .. } => "explosion",
            Self::Lightning { .. } => "lightning",
            Self::AnvilLanding { .. } => "anvil",
            Self::Kill { .. } => "entity_death",
        }
    }
}

fn script() -> Vec<(u64, Scripted)> {
    vec![
        (
            5,
            Scripted::Explosion {
                center: BlockPos::new(10, 61, 0),
                power: 4.0,
                radius: 1,
            },
        ),
        (
            10,
            Scripted::Lightning {
                strike: BlockPos::new(20, 64, 0),
            },
        ),
        (
            15,
            Scripted::AnvilLanding {
                pos: BlockPos::new(30, 64, 0),
                fall_distance: 12,
            },
        ),
        (
            20,
            Scripted::Kill {
                pos: BlockPos::new(40, 64, 0),
                entity: "zombie",
                killer: Some("player"),
            },
        ),
        (
            21,
            Scripted::Kill {
                pos: BlockPos::new(40, 64, 2),
                entity: "skeleton",
                killer: None,
            },
        ),
    ]
}

fn ident(raw: &str) -> Result<Identifier> {
    Identifier::parse(raw).with_context(|| format!("bad demo identifier '{raw}'"))
}

fn stack(raw: &str, count: u32) -> Result<ItemStack> {
    Ok(ItemStack::new(ident(raw)?, count))
}

fn demo_world() -> Result<MemoryWorld> {
    let pool = BlockPos::new(0, 62, 0);
    let lava = BlockPos::new(4, 62, 0);
    Ok(MemoryWorld::new()
        .with_fluid(pool, ident("water")?)
        .with_fluid(pool.offset(1, 0, 0), ident("water")?)
        .with_fluid(lava, ident("lava")?)
        .with_items(pool, stack("gravel", 6)?)
        .with_items(pool.offset(1, 0, 0), stack("coarse_dirt", 2)?)
        .with_items(lava, stack("redstone", 3)?)
        .with_block(BlockPos::new(10, 60, 0), ident("coal_block")?)
        .with_block(BlockPos::new(11, 60, 0), ident("coal_block")?)
        .with_block(BlockPos::new(9, 61, 0), ident("dirt")?)
        .with_items(BlockPos::new(10, 61, 0), stack("sand", 4)?)
        .with_block(BlockPos::new(20, 63, 0), ident("sand")?)
        .with_items(BlockPos::new(20, 64, 0), stack("iron_ingot", 1)?)
        .with_items(BlockPos::new(20, 64, 0), stack("redstone", 1)?)
        .with_block(BlockPos::new(30, 63, 0), ident("gravel")?)
        .with_items(BlockPos::new(30, 64, 0), stack("cobblestone", 2)?)
        .with_block(BlockPos::new(40, 63, 0), ident("red_sand")?)
        .with_items(BlockPos::new(40, 64, 0), stack("bowl", 1)?)
        .with_block(BlockPos::new(40, 63, 2), ident("sand")?))
}

/// Stage every item pile that rests in a fluid.
fn stage_soaking_items(state: &mut WorldCrafting, world: &MemoryWorld) {
    let soaking: Vec<BlockPos> = world
        .item_positions()
        .filter(|pos| world.fluid_at(*pos).is_some())
        .collect();
    for pos in soaking {
        let stacks = world.items_at(pos).to_vec();
        state.stage(RecipeCategory::ItemFluidTransform, pos, CraftInput::Items(stacks));
    }
}

fn fire(
    registry: &RecipeRegistry,
    world: &mut MemoryWorld,
    frame: CraftFrame,
    event: &Scripted,
) -> Result<Vec<CraftOutcome>> {
    let outcomes = match event {
        Scripted::Explosion {
            center,
            power,
            radius,
        } => {
            let mut affected = BTreeSet::new();
            for dx in -radius..=*radius {
                for dy in -radius..=*radius {
                    for dz in -radius..=*radius {
                        let pos = center.offset(dx, dy, dz);
                        if world.block_at(pos).is_some() {
                            affected.insert(pos);
                        }
                    }
                }
            }
            let mut explosion = ExplosionEvent {
                center: *center,
                power: *power,
                items: world.items_at(*center).to_vec(),
                affected_blocks: affected,
            };
            let outcomes = on_explosion(registry, world, frame, &mut explosion);
            for pos in explosion.affected_blocks {
                world.set_block(pos, None);
            }
            outcomes
        }
        Scripted::Lightning { strike } => {
            let event = LightningEvent {
                strike: *strike,
                items: world.items_at(*strike).to_vec(),
            };
            on_lightning(registry, world, frame, &event)
        }
        Scripted::AnvilLanding { pos, fall_distance } => {
            let event = AnvilLandingEvent {
                pos: *pos,
                fall_distance: *fall_distance,
                items: world.items_at(*pos).to_vec(),
            };
            on_anvil_landing(registry, world, frame, &event)
        }
        Scripted::Kill {
            pos,
            entity,
            killer,
        } => {
            let event = EntityDeathEvent {
                pos: *pos,
                entity: ident(entity)?,
                killer: killer.map(ident).transpose()?,
                items: world.items_at(*pos).to_vec(),
            };
            on_entity_death(registry, world, frame, &event)
        }
    };
    Ok(outcomes)
}

struct Recorder {
    sink: Option<JsonlSink>,
    summary: DemoSummary,
}

impl Recorder {
    fn record(&mut self, tick: SimTick, kind: &'static str, outcomes: &[CraftOutcome]) -> Result<()> {
        for outcome in outcomes {
            info!(tick = tick.0, kind, recipe = %outcome.recipe, pos = %outcome.pos, "crafted");
            *self.summary.crafts.entry(kind).or_default() += 1;
            if let Some(sink) = self.sink.as_mut() {
                sink.write(&EventRecord::from_outcome(tick, WORLD, kind, outcome))?;
            }
        }
        Ok(())
    }
}

/// Run the scripted world for `config.ticks` ticks.
pub fn run(registry: &RecipeRegistry, config: &SimConfig) -> Result<DemoSummary> {
    let sink = config
        .event_log
        .as_ref()
        .map(JsonlSink::create)
        .transpose()?;
    let mut recorder = Recorder {
        sink,
        summary: DemoSummary {
            ticks: config.ticks,
            ..DemoSummary::default()
        },
    };

    let mut world = demo_world()?;
    let mut worlds = CraftingWorlds::new();
    let state = worlds.load_world(WORLD, config.world_seed);
    let script = script();

    for t in 1..=config.ticks {
        let tick = SimTick(t);
        stage_soaking_items(state, &world);
        let report = state.tick(registry, &mut world, tick);
        recorder.summary.started += report.started;
        recorder.summary.aborted += report.aborted;
        recorder.record(tick, "tick", &report.outcomes)?;

        for (_, event) in script.iter().filter(|(at, _)| *at == t) {
            let outcomes = fire(registry, &mut world, state.frame(tick), event)?;
            debug!(tick = t, kind = event.kind(), crafts = outcomes.len(), "scripted event");
            recorder.record(tick, event.kind(), &outcomes)?;
        }
    }

    recorder.summary.active_at_end = state.active_crafts();
    recorder.summary.events_logged = recorder.sink.as_ref().map_or(0, JsonlSink::written);
    worlds.unload_world(WORLD);
    Ok(recorder.summary)
}
