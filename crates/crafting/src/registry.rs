//! Recipe registry with ordered per-category dispatch.
//!
//! Registration order is significant: [`RecipeRegistry::apply`] and
//! [`RecipeRegistry::first_matching`] stop at the first recipe (in the order
//! it was registered) whose predicate holds.

use crate::category::RecipeCategory;
use crate::context::{CraftContext, CraftInput};
use crate::error::ConfigError;
use crate::recipe::RecipeDefinition;
use interactio_core::Identifier;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, warn};

/// Result of a bulk load.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Number of recipes registered.
    pub loaded: usize,
    /// Recipes that were rejected, with the reason.
    pub rejected: Vec<ConfigError>,
}

/// Ordered recipe lists keyed by category.
#[derive(Debug, Default)]
pub struct RecipeRegistry {
    categories: BTreeMap<RecipeCategory, Vec<Arc<RecipeDefinition>>>,
    by_id: HashMap<Identifier, Arc<RecipeDefinition>>,
}

impl RecipeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a recipe to its category. Recipe ids are unique across categories.
    pub fn register(&mut self, recipe: RecipeDefinition) -> Result<(), ConfigError> {
        if self.by_id.contains_key(recipe.id()) {
            return Err(ConfigError::DuplicateRecipe(recipe.id().clone()));
        }
        let recipe = Arc::new(recipe);
        debug!(recipe = %recipe.id(), category = %recipe.category(), "recipe registered");
        self.by_id.insert(recipe.id().clone(), Arc::clone(&recipe));
        self.categories
            .entry(recipe.category())
            .or_default()
            .push(recipe);
        Ok(())
    }

    /// Register every successfully built recipe; failures are logged and
    /// reported without stopping the rest of the load.
    pub fn load<I>(&mut self, recipes: I) -> LoadReport
    where
        I: IntoIterator<Item = Result<RecipeDefinition, ConfigError>>,
    {
        let mut report = LoadReport::default();
        for recipe in recipes {
            match recipe.and_then(|recipe| self.register(recipe)) {
                Ok(()) => report.loaded += 1,
                Err(err) => {
                    warn!("Skipping recipe: {err}");
                    report.rejected.push(err);
                }
            }
        }
        report
    }

    /// Recipes of `category`, in registration order.
    pub fn recipes(&self, category: RecipeCategory) -> &[Arc<RecipeDefinition>] {
        self.categories
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Look up a recipe by id.
    pub fn get(&self, id: &Identifier) -> Option<&Arc<RecipeDefinition>> {
        self.by_id.get(id)
    }

    /// Total number of recipes.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether no recipes are registered.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Run `action` on the first recipe for which `can_craft` holds.
    ///
    /// `state` is threaded through both callbacks so the predicate can read
    /// what the action later mutates. Returns whether a recipe matched.
    pub fn apply<S, P, A>(
        &self,
        category: RecipeCategory,
        state: &mut S,
        mut can_craft: P,
        mut action: A,
    ) -> bool
    where
        S: ?Sized,
        P: FnMut(&RecipeDefinition, &S) -> bool,
        A: FnMut(&Arc<RecipeDefinition>, &mut S),
    {
        for recipe in self.recipes(category) {
            if can_craft(recipe.as_ref(), &*state) {
                action(recipe, &mut *state);
                return true;
            }
        }
        false
    }

    /// Run `action` on every recipe for which `can_craft` holds, in order.
    ///
    /// The predicate is re-evaluated after each action, so a recipe that
    /// consumed shared input can starve later ones. Returns the match count.
    pub fn apply_all<S, P, A>(
        &self,
        category: RecipeCategory,
        state: &mut S,
        mut can_craft: P,
        mut action: A,
    ) -> usize
    where
        S: ?Sized,
        P: FnMut(&RecipeDefinition, &S) -> bool,
        A: FnMut(&Arc<RecipeDefinition>, &mut S),
    {
        let mut matched = 0;
        for recipe in self.recipes(category) {
            if can_craft(recipe.as_ref(), &*state) {
                action(recipe, &mut *state);
                matched += 1;
            }
        }
        matched
    }

    /// Cheap pre-filter: does any recipe's primary ingredient accept `key`?
    pub fn is_valid_input(&self, category: RecipeCategory, key: &Identifier) -> bool {
        self.recipes(category)
            .iter()
            .any(|recipe| recipe.accepts_primary(key))
    }

    /// First recipe of `category` that can craft `input` in `ctx`.
    pub fn first_matching(
        &self,
        category: RecipeCategory,
        input: &CraftInput,
        ctx: &CraftContext,
    ) -> Option<Arc<RecipeDefinition>> {
        self.recipes(category)
            .iter()
            .find(|recipe| recipe.can_craft(input, ctx))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{EventInfo, ItemStack};
    use crate::ingredient::IngredientMatcher;
    use crate::output::{CraftOutput, WeightedOutput};
    use interactio_core::{BlockPos, SimTick, WorldId};

    fn id(s: &str) -> Identifier {
        Identifier::parse(s).unwrap()
    }

    fn anvil_recipe(name: &str, input: &str) -> RecipeDefinition {
        RecipeDefinition::builder(id(name), RecipeCategory::ItemAnvil)
            .item_input(IngredientMatcher::of([id(input)]), 1)
            .output(WeightedOutput::single(CraftOutput::Item(ItemStack::new(id("flint"), 1))))
            .build()
            .unwrap()
    }

    fn ctx() -> CraftContext {
        CraftContext {
            world: WorldId::OVERWORLD,
            seed: 0,
            tick: SimTick::ZERO,
            pos: BlockPos::new(0, 0, 0),
            block: None,
            fluid: None,
            event: EventInfo::None,
        }
    }

    fn registry() -> RecipeRegistry {
        let mut registry = RecipeRegistry::new();
        registry.register(anvil_recipe("first", "gravel")).unwrap();
        registry.register(anvil_recipe("second", "gravel")).unwrap();
        registry.register(anvil_recipe("other", "cobblestone")).unwrap();
        registry
    }

    #[test]
    fn apply_stops_at_first_match() {
        let registry = registry();
        let input = CraftInput::Items(vec![ItemStack::new(id("gravel"), 1)]);
        let ctx = ctx();
        let mut fired = Vec::new();
        let matched = registry.apply(
            RecipeCategory::ItemAnvil,
            &mut fired,
            |recipe, _| recipe.can_craft(&input, &ctx),
            |recipe, fired| fired.push(recipe.id().clone()),
        );
        assert!(matched);
        assert_eq!(fired, vec![id("first")]);
    }

    #[test]
    fn apply_all_visits_every_match() {
        let registry = registry();
        let input = CraftInput::Items(vec![ItemStack::new(id("gravel"), 1)]);
        let ctx = ctx();
        let mut fired = Vec::new();
        let matched = registry.apply_all(
            RecipeCategory::ItemAnvil,
            &mut fired,
            |recipe, _| recipe.can_craft(&input, &ctx),
            |recipe, fired| fired.push(recipe.id().clone()),
        );
        assert_eq!(matched, 2);
        assert_eq!(fired, vec![id("first"), id("second")]);
    }

    #[test]
    fn apply_reports_no_match() {
        let registry = registry();
        let mut fired = 0;
        assert!(!registry.apply(
            RecipeCategory::ItemAnvil,
            &mut fired,
            |_, _| false,
            |_, fired| *fired += 1,
        ));
        assert!(!registry.apply(
            RecipeCategory::BlockAnvil,
            &mut fired,
            |_, _| true,
            |_, fired| *fired += 1,
        ));
        assert_eq!(fired, 0);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut registry = registry();
        let err = registry.register(anvil_recipe("first", "sand")).unwrap_err();
        assert_eq!(err, ConfigError::DuplicateRecipe(id("first")));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn load_isolates_failures() {
        let mut registry = RecipeRegistry::new();
        let broken = RecipeDefinition::builder(id("broken"), RecipeCategory::ItemAnvil).build();
        let report = registry.load([
            Ok(anvil_recipe("a", "gravel")),
            broken,
            Ok(anvil_recipe("a", "sand")),
            Ok(anvil_recipe("b", "sand")),
        ]);
        assert_eq!(report.loaded, 2);
        assert_eq!(report.rejected.len(), 2);
        assert!(registry.get(&id("b")).is_some());
    }

    #[test]
    fn valid_input_precheck_uses_primary_ingredient() {
        let registry = registry();
        assert!(registry.is_valid_input(RecipeCategory::ItemAnvil, &id("cobblestone")));
        assert!(!registry.is_valid_input(RecipeCategory::ItemAnvil, &id("dirt")));
        assert!(!registry.is_valid_input(RecipeCategory::ItemExplode, &id("gravel")));
    }

    #[test]
    fn first_matching_honours_registration_order() {
        let registry = registry();
        let input = CraftInput::Items(vec![ItemStack::new(id("gravel"), 1)]);
        let found = registry
            .first_matching(RecipeCategory::ItemAnvil, &input, &ctx())
            .unwrap();
        assert_eq!(found.id(), &id("first"));
        let none = CraftInput::Items(vec![ItemStack::new(id("dirt"), 1)]);
        assert!(registry
            .first_matching(RecipeCategory::ItemAnvil, &none, &ctx())
            .is_none());
    }
}
