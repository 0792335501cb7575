//! Error taxonomy.
//!
//! Only load-time problems are errors. Tick-time conditions (nothing staged,
//! a recipe that no longer matches) are ordinary state transitions and never
//! surface here.

use interactio_core::{Identifier, IdentifierError};
use thiserror::Error;

/// Load-time configuration errors. Fatal to the offending recipe only.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The ingredient value was JSON `null` or missing.
    #[error("ingredient must not be null")]
    NullIngredient,
    /// The ingredient value was neither an object nor an array.
    #[error("ingredient: expected an object or an array of objects")]
    ExpectedObjectOrArray,
    /// An array of alternatives with no entries.
    #[error("ingredient array must not be empty")]
    EmptyArray,
    /// An entry object carried both the explicit and the dynamic-set key.
    #[error("ingredient entry must have exactly one of explicit/dynamic ('{explicit}' or '{dynamic}'), not both")]
    AmbiguousEntry {
        /// Explicit identifier key.
        explicit: &'static str,
        /// Dynamic set key.
        dynamic: &'static str,
    },
    /// An entry object carried neither key.
    #[error("ingredient entry must have exactly one of explicit/dynamic ('{explicit}' or '{dynamic}'), found neither")]
    MissingEntry {
        /// Explicit identifier key.
        explicit: &'static str,
        /// Dynamic set key.
        dynamic: &'static str,
    },
    /// A key was present but its value was not a string.
    #[error("ingredient key '{0}' must be a string")]
    ExpectedString(&'static str),
    /// A dynamic set reference that does not resolve.
    #[error("unknown dynamic set '{0}'")]
    UnknownDynamicSet(Identifier),
    /// An identifier failed validation.
    #[error(transparent)]
    InvalidIdentifier(#[from] IdentifierError),
    /// A recipe id registered twice.
    #[error("duplicate recipe id '{0}'")]
    DuplicateRecipe(Identifier),
    /// An ingredient of a recipe failed to parse or resolve.
    #[error("recipe '{recipe}': {source}")]
    InRecipe {
        /// Recipe being loaded.
        recipe: Identifier,
        /// What went wrong with the ingredient.
        #[source]
        source: Box<ConfigError>,
    },
    /// A recipe whose shape does not fit its category.
    #[error("recipe '{id}' is invalid: {reason}")]
    InvalidRecipe {
        /// Offending recipe.
        id: Identifier,
        /// What is wrong with it.
        reason: String,
    },
}

impl ConfigError {
    /// Attribute this error to the recipe being loaded.
    pub fn in_recipe(self, recipe: &Identifier) -> Self {
        Self::InRecipe {
            recipe: recipe.clone(),
            source: Box::new(self),
        }
    }

    pub(crate) fn invalid_recipe(id: &Identifier, reason: impl Into<String>) -> Self {
        Self::InvalidRecipe {
            id: id.clone(),
            reason: reason.into(),
        }
    }
}

/// Errors from the matcher wire encoding.
#[derive(Debug, Error)]
pub enum WireError {
    /// postcard failed to encode or decode the payload.
    #[error("ingredient wire codec failed: {0}")]
    Codec(#[from] postcard::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_problem() {
        assert_eq!(
            ConfigError::EmptyArray.to_string(),
            "ingredient array must not be empty"
        );
        let both = ConfigError::AmbiguousEntry {
            explicit: "id",
            dynamic: "dynamic_set",
        };
        assert!(both
            .to_string()
            .contains("must have exactly one of explicit/dynamic"));
    }

    #[test]
    fn recipe_context_wraps_the_cause() {
        let recipe = Identifier::parse("interactio:wash").unwrap();
        let err = ConfigError::EmptyArray.in_recipe(&recipe);
        assert_eq!(
            err.to_string(),
            "recipe 'interactio:wash': ingredient array must not be empty"
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
