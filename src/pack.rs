//! JSON recipe packs.
//!
//! A pack declares the dynamic sets it relies on and a list of recipe
//! documents. Ingredients use the matcher grammar and are resolved against
//! the pack's sets when the pack is turned into definitions.

use anyhow::{Context, Result};
use interactio_core::Identifier;
use interactio_crafting::{
    ConfigError, DynamicSetCatalog, IngredientKind, RecipeCategory, RecipeDefinition,
    WeightedOutput,
};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

const BUILTIN_PACK: &str = include_str!("../config/demo_pack.json");

type SetTable = BTreeMap<Identifier, Vec<Identifier>>;

/// Dynamic sets grouped by the registry they belong to.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SetsDoc {
    pub item: SetTable,
    pub block: SetTable,
    pub fluid: SetTable,
    pub entity: SetTable,
}

#[derive(Debug, Deserialize)]
pub struct ItemDoc {
    pub ingredient: Value,
    #[serde(default = "one")]
    pub count: u32,
    #[serde(default)]
    pub return_chance: f32,
}

#[derive(Debug, Deserialize)]
pub struct FluidDoc {
    pub ingredient: Value,
    #[serde(default)]
    pub consume_chance: f32,
}

/// One recipe as written in a pack.
#[derive(Debug, Deserialize)]
pub struct RecipeDoc {
    pub id: Identifier,
    pub category: RecipeCategory,
    #[serde(default)]
    pub items: Vec<ItemDoc>,
    #[serde(default)]
    pub block: Option<Value>,
    #[serde(default)]
    pub fluid: Option<FluidDoc>,
    #[serde(default)]
    pub entity: Option<Value>,
    pub output: WeightedOutput,
    #[serde(default)]
    pub duration: u32,
}

fn one() -> u32 {
    1
}

/// A parsed recipe pack.
#[derive(Debug, Deserialize)]
pub struct RecipePack {
    #[serde(default)]
    pub dynamic_sets: SetsDoc,
    pub recipes: Vec<RecipeDoc>,
}

impl RecipePack {
    /// Parse a pack from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Failed to parse recipe pack")
    }

    /// Read and parse a pack file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read recipe pack {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Invalid recipe pack {}", path.display()))
    }

    /// The pack shipped with the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_PACK)
    }

    /// Dynamic sets declared by the pack.
    pub fn catalog(&self) -> DynamicSetCatalog {
        let mut catalog = DynamicSetCatalog::new();
        let tables = [
            (IngredientKind::Item, &self.dynamic_sets.item),
            (IngredientKind::Block, &self.dynamic_sets.block),
            (IngredientKind::Fluid, &self.dynamic_sets.fluid),
            (IngredientKind::Entity, &self.dynamic_sets.entity),
        ];
        for (kind, table) in tables {
            let sets = catalog.sets_mut(kind);
            for (name, members) in table {
                sets.define(name.clone(), members.iter().cloned());
            }
        }
        catalog
    }

    /// Build every recipe against `catalog`, one result per document.
    pub fn definitions<'a>(
        &'a self,
        catalog: &'a DynamicSetCatalog,
    ) -> impl Iterator<Item = Result<RecipeDefinition, ConfigError>> + 'a {
        self.recipes.iter().map(move |doc| doc.build(catalog))
    }
}

impl RecipeDoc {
    /// Resolve ingredients and validate the definition.
    pub fn build(&self, catalog: &DynamicSetCatalog) -> Result<RecipeDefinition, ConfigError> {
        let matcher = |kind, json: &Value| {
            catalog
                .matcher(kind, json)
                .map_err(|err| err.in_recipe(&self.id))
        };

        let mut builder = RecipeDefinition::builder(self.id.clone(), self.category)
            .output(self.output.clone())
            .duration(self.duration);
        for item in &self.items {
            builder = builder.item_input_with_return(
                matcher(IngredientKind::Item, &item.ingredient)?,
                item.count,
                item.return_chance,
            );
        }
        if let Some(block) = &self.block {
            builder = builder.block_input(matcher(IngredientKind::Block, block)?);
        }
        if let Some(fluid) = &self.fluid {
            builder = builder.fluid_input(
                matcher(IngredientKind::Fluid, &fluid.ingredient)?,
                fluid.consume_chance,
            );
        }
        if let Some(entity) = &self.entity {
            builder = builder.entity_input(matcher(IngredientKind::Entity, entity)?);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interactio_crafting::RecipeRegistry;

    #[test]
    fn builtin_pack_loads_cleanly() {
        let pack = RecipePack::builtin().expect("builtin pack parses");
        let catalog = pack.catalog();
        let mut registry = RecipeRegistry::new();
        let report = registry.load(pack.definitions(&catalog));

        assert!(report.rejected.is_empty(), "rejected: {:?}", report.rejected);
        assert_eq!(report.loaded, pack.recipes.len());
        for category in RecipeCategory::ALL {
            assert!(
                !registry.recipes(category).is_empty(),
                "demo pack has no {category} recipe"
            );
        }
    }

    #[test]
    fn broken_recipes_are_rejected_individually() {
        let pack = RecipePack::from_json(
            r#"{
                "dynamic_sets": { "item": { "interactio:gravelly": ["gravel"] } },
                "recipes": [
                    {
                        "id": "interactio:ok",
                        "category": "item_anvil",
                        "items": [{ "ingredient": { "dynamic_set": "interactio:gravelly" } }],
                        "output": { "entries": [[{ "item": { "item": "flint", "count": 1 } }, 1]] }
                    },
                    {
                        "id": "interactio:unknown_set",
                        "category": "item_anvil",
                        "items": [{ "ingredient": { "dynamic_set": "interactio:missing" } }],
                        "output": { "entries": [[{ "item": { "item": "flint", "count": 1 } }, 1]] }
                    },
                    {
                        "id": "interactio:empty_alternatives",
                        "category": "block_anvil",
                        "block": [],
                        "output": { "entries": [[{ "block": "sand" }, 1]] }
                    }
                ]
            }"#,
        )
        .expect("pack parses");
        let catalog = pack.catalog();
        let mut registry = RecipeRegistry::new();
        let report = registry.load(pack.definitions(&catalog));

        assert_eq!(report.loaded, 1);
        assert_eq!(report.rejected.len(), 2);
        assert!(report.rejected[0].to_string().contains("unknown dynamic set"));
        assert!(report.rejected[1]
            .to_string()
            .contains("array must not be empty"));
    }
}
