//! Event-triggered crafting: first-match vs all-match dispatch and the
//! per-event routing of items and blocks.

use interactio_core::{BlockPos, SimTick, WorldId};
use interactio_crafting::events::{on_anvil_landing, on_entity_death, on_explosion, on_lightning};
use interactio_crafting::{
    AnvilLandingEvent, CraftFrame, CraftOutput, CraftWorld, EntityDeathEvent, ExplosionEvent,
    IngredientMatcher, LightningEvent, RecipeCategory, RecipeDefinition, RecipeRegistry,
    WeightedOutput,
};
use interactio_testkit::{id, stack, MemoryWorld};
use std::collections::BTreeSet;

fn frame() -> CraftFrame {
    CraftFrame {
        world: WorldId::OVERWORLD,
        seed: 42,
        tick: SimTick(100),
    }
}

fn item_recipe(name: &str, category: RecipeCategory, input: &str, count: u32, output: &str) -> RecipeDefinition {
    RecipeDefinition::builder(id(name), category)
        .item_input(IngredientMatcher::of([id(input)]), count)
        .output(WeightedOutput::single(CraftOutput::Item(stack(output, 1))))
        .build()
        .expect("valid item recipe")
}

fn block_recipe(name: &str, category: RecipeCategory, input: &str, output: CraftOutput) -> RecipeDefinition {
    RecipeDefinition::builder(id(name), category)
        .block_input(IngredientMatcher::of([id(input)]))
        .output(WeightedOutput::single(output))
        .build()
        .expect("valid block recipe")
}

#[test]
fn anvil_items_fire_every_matching_recipe() {
    let mut registry = RecipeRegistry::new();
    registry
        .register(item_recipe("crush_a", RecipeCategory::ItemAnvil, "gravel", 1, "flint"))
        .unwrap();
    registry
        .register(item_recipe("crush_b", RecipeCategory::ItemAnvil, "gravel", 1, "sand"))
        .unwrap();

    let pos = BlockPos::new(0, 70, 0);
    let mut world = MemoryWorld::new().with_items(pos, stack("gravel", 4));
    let event = AnvilLandingEvent {
        pos,
        fall_distance: 6,
        items: world.items_at(pos).to_vec(),
    };
    let outcomes = on_anvil_landing(&registry, &mut world, frame(), &event);

    let fired: Vec<_> = outcomes.iter().map(|o| o.recipe.clone()).collect();
    assert_eq!(fired, vec![id("crush_a"), id("crush_b")]);
    assert_eq!(world.count_at(pos, &id("gravel")), 2);
    assert_eq!(world.count_at(pos, &id("flint")), 1);
    assert_eq!(world.count_at(pos, &id("sand")), 1);
}

#[test]
fn consumed_items_starve_later_recipes() {
    let mut registry = RecipeRegistry::new();
    registry
        .register(item_recipe("greedy", RecipeCategory::ItemAnvil, "gravel", 3, "flint"))
        .unwrap();
    registry
        .register(item_recipe("starved", RecipeCategory::ItemAnvil, "gravel", 2, "sand"))
        .unwrap();

    let pos = BlockPos::new(0, 70, 0);
    let mut world = MemoryWorld::new().with_items(pos, stack("gravel", 4));
    let event = AnvilLandingEvent {
        pos,
        fall_distance: 1,
        items: world.items_at(pos).to_vec(),
    };
    let outcomes = on_anvil_landing(&registry, &mut world, frame(), &event);

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].consumed, vec![stack("gravel", 3)]);
    assert_eq!(world.count_at(pos, &id("gravel")), 1);
}

#[test]
fn anvil_block_fires_only_the_first_match() {
    let mut registry = RecipeRegistry::new();
    registry
        .register(block_recipe("smash", RecipeCategory::BlockAnvil, "cobblestone", CraftOutput::Block(id("gravel"))))
        .unwrap();
    registry
        .register(block_recipe("smash_more", RecipeCategory::BlockAnvil, "cobblestone", CraftOutput::Block(id("sand"))))
        .unwrap();

    let landing = BlockPos::new(5, 65, 5);
    let mut world = MemoryWorld::new().with_block(landing.below(), id("cobblestone"));
    let event = AnvilLandingEvent {
        pos: landing,
        fall_distance: 3,
        items: Vec::new(),
    };
    let outcomes = on_anvil_landing(&registry, &mut world, frame(), &event);

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].recipe, id("smash"));
    assert_eq!(world.block_at(landing.below()), Some(id("gravel")));
}

#[test]
fn lightning_block_chain_sees_the_converted_block() {
    let mut registry = RecipeRegistry::new();
    registry
        .register(block_recipe("fuse", RecipeCategory::BlockLightning, "sand", CraftOutput::Block(id("glass"))))
        .unwrap();
    registry
        .register(block_recipe("refuse", RecipeCategory::BlockLightning, "sand", CraftOutput::Block(id("red_sand"))))
        .unwrap();
    registry
        .register(block_recipe("temper", RecipeCategory::BlockLightning, "glass", CraftOutput::Block(id("tinted_glass"))))
        .unwrap();

    let strike = BlockPos::new(0, 64, 0);
    let mut world = MemoryWorld::new().with_block(strike.below(), id("sand"));
    let event = LightningEvent {
        strike,
        items: Vec::new(),
    };
    let outcomes = on_lightning(&registry, &mut world, frame(), &event);

    let fired: Vec<_> = outcomes.iter().map(|o| o.recipe.clone()).collect();
    assert_eq!(fired, vec![id("fuse"), id("temper")]);
    assert_eq!(world.block_at(strike.below()), Some(id("tinted_glass")));
}

#[test]
fn explosion_spares_blocks_that_were_converted() {
    let mut registry = RecipeRegistry::new();
    registry
        .register(block_recipe("compress", RecipeCategory::BlockExplode, "coal_block", CraftOutput::Block(id("diamond_ore"))))
        .unwrap();
    registry
        .register(block_recipe("shatter", RecipeCategory::BlockExplode, "glass", CraftOutput::Item(stack("glass_shard", 2))))
        .unwrap();

    let coal = BlockPos::new(1, 60, 0);
    let glass = BlockPos::new(-1, 60, 0);
    let dirt = BlockPos::new(0, 59, 0);
    let mut world = MemoryWorld::new()
        .with_block(coal, id("coal_block"))
        .with_block(glass, id("glass"))
        .with_block(dirt, id("dirt"));
    let mut event = ExplosionEvent {
        center: BlockPos::new(0, 60, 0),
        power: 4.0,
        items: Vec::new(),
        affected_blocks: BTreeSet::from([coal, glass, dirt]),
    };
    let outcomes = on_explosion(&registry, &mut world, frame(), &mut event);

    assert_eq!(outcomes.len(), 2);
    assert_eq!(event.affected_blocks, BTreeSet::from([glass, dirt]));
    assert_eq!(world.block_at(coal), Some(id("diamond_ore")));
    assert_eq!(world.block_at(glass), None);
    assert_eq!(world.count_at(glass, &id("glass_shard")), 2);
    assert!(world.spared().is_empty(), "sparing stays inside the explosion view");
}

#[test]
fn explosion_items_craft_at_the_center() {
    let mut registry = RecipeRegistry::new();
    registry
        .register(item_recipe("blast_gravel", RecipeCategory::ItemExplode, "gravel", 2, "flint"))
        .unwrap();

    let center = BlockPos::new(8, 64, 8);
    let mut world = MemoryWorld::new()
        .with_items(center, stack("gravel", 2))
        .with_items(center, stack("dirt", 5));
    let mut event = ExplosionEvent {
        center,
        power: 2.0,
        items: world.items_at(center).to_vec(),
        affected_blocks: BTreeSet::new(),
    };
    let outcomes = on_explosion(&registry, &mut world, frame(), &mut event);

    assert_eq!(outcomes.len(), 1);
    assert_eq!(world.count_at(center, &id("flint")), 1);
    assert_eq!(world.count_at(center, &id("gravel")), 0);
    assert_eq!(world.count_at(center, &id("dirt")), 5);
}

#[test]
fn entity_kills_require_a_killer_and_matching_victim() {
    let mut registry = RecipeRegistry::new();
    registry
        .register(
            RecipeDefinition::builder(id("soul_soil"), RecipeCategory::BlockEntityKill)
                .block_input(IngredientMatcher::of([id("sand")]))
                .entity_input(IngredientMatcher::of([id("zombie")]))
                .output(WeightedOutput::single(CraftOutput::Block(id("soul_sand"))))
                .build()
                .unwrap(),
        )
        .unwrap();

    let pos = BlockPos::new(0, 65, 0);
    let mut world = MemoryWorld::new().with_block(pos.below(), id("sand"));
    let mut event = EntityDeathEvent {
        pos,
        entity: id("zombie"),
        killer: None,
        items: Vec::new(),
    };

    assert!(on_entity_death(&registry, &mut world, frame(), &event).is_empty());

    event.entity = id("skeleton");
    event.killer = Some(id("player"));
    assert!(on_entity_death(&registry, &mut world, frame(), &event).is_empty());

    event.entity = id("zombie");
    let outcomes = on_entity_death(&registry, &mut world, frame(), &event);
    assert_eq!(outcomes.len(), 1);
    assert_eq!(world.block_at(pos.below()), Some(id("soul_sand")));
}

#[test]
fn apply_and_apply_all_differ_only_in_how_many_fire() {
    let mut registry = RecipeRegistry::new();
    registry
        .register(item_recipe("one", RecipeCategory::ItemLightning, "iron_ingot", 1, "nether_star"))
        .unwrap();
    registry
        .register(item_recipe("two", RecipeCategory::ItemLightning, "iron_ingot", 1, "nether_star"))
        .unwrap();

    let mut first = 0;
    assert!(registry.apply(
        RecipeCategory::ItemLightning,
        &mut first,
        |recipe, _| recipe.accepts_primary(&id("iron_ingot")),
        |_, count| *count += 1,
    ));
    let mut all = 0;
    let matched = registry.apply_all(
        RecipeCategory::ItemLightning,
        &mut all,
        |recipe, _| recipe.accepts_primary(&id("iron_ingot")),
        |_, count| *count += 1,
    );
    assert_eq!((first, all, matched), (1, 2, 2));
}

#[test]
fn full_item_piles_are_counted_without_overflow() {
    let mut registry = RecipeRegistry::new();
    registry
        .register(item_recipe("crush", RecipeCategory::ItemAnvil, "gravel", 2, "flint"))
        .unwrap();

    let pos = BlockPos::new(5, 70, 5);
    let mut world = MemoryWorld::new()
        .with_items(pos, stack("gravel", u32::MAX))
        .with_items(pos, stack("gravel", 1));
    let event = AnvilLandingEvent {
        pos,
        fall_distance: 3,
        items: world.items_at(pos).to_vec(),
    };
    let outcomes = on_anvil_landing(&registry, &mut world, frame(), &event);

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].consumed, vec![stack("gravel", 2)]);
    assert_eq!(world.count_at(pos, &id("gravel")), u64::from(u32::MAX) - 1);
    assert_eq!(world.count_at(pos, &id("flint")), 1);
}

#[test]
fn recipes_sharing_a_position_roll_independently() {
    let keep = |name: &str| {
        RecipeDefinition::builder(id(name), RecipeCategory::ItemAnvil)
            .item_input_with_return(IngredientMatcher::of([id("gravel")]), 1, 0.5)
            .output(WeightedOutput::single(CraftOutput::Item(stack("flint", 1))))
            .build()
            .expect("valid item recipe")
    };
    let mut registry = RecipeRegistry::new();
    registry.register(keep("keep_a")).unwrap();
    registry.register(keep("keep_b")).unwrap();

    let pos = BlockPos::new(0, 70, 0);
    let returns_at = |tick: u64| {
        let mut world = MemoryWorld::new().with_items(pos, stack("gravel", 4));
        let event = AnvilLandingEvent {
            pos,
            fall_distance: 2,
            items: world.items_at(pos).to_vec(),
        };
        let frame = CraftFrame {
            tick: SimTick(tick),
            ..frame()
        };
        let outcomes = on_anvil_landing(&registry, &mut world, frame, &event);
        assert_eq!(outcomes.len(), 2);
        (outcomes[0].consumed.is_empty(), outcomes[1].consumed.is_empty())
    };

    let rolls: Vec<(bool, bool)> = (1..=64).map(&returns_at).collect();
    assert!(rolls.iter().any(|(a, b)| a != b), "rolls are correlated: {rolls:?}");
    assert_eq!(rolls, (1..=64).map(&returns_at).collect::<Vec<_>>());
}
