//! Ingredient matchers.
//!
//! An ingredient is written as one entry object or a non-empty array of
//! entry objects (alternatives, OR-combined):
//!
//! ```json
//! {"id": "minecraft:gravel"}
//! [{"dynamic_set": "minecraft:planks"}, {"id": "minecraft:stick"}]
//! ```
//!
//! Parsing yields an [`IngredientSpec`]. [`IngredientSpec::build`] resolves
//! every dynamic set reference against the current [`DynamicSets`] and
//! produces an immutable [`IngredientMatcher`] snapshot. Set membership is
//! read exactly once, at build time; later changes to the sets are not seen
//! by matchers that were already built.

use crate::error::{ConfigError, WireError};
use interactio_core::{DynamicSets, Identifier};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Key naming a single explicit identifier.
pub const EXPLICIT_KEY: &str = "id";
/// Key naming a dynamic set.
pub const DYNAMIC_SET_KEY: &str = "dynamic_set";

/// Which registry an ingredient's identifiers live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngredientKind {
    /// Item types.
    Item,
    /// Block types.
    Block,
    /// Fluid types.
    Fluid,
    /// Entity types.
    Entity,
}

/// One [`DynamicSets`] registry per ingredient kind.
#[derive(Debug, Clone, Default)]
pub struct DynamicSetCatalog {
    items: DynamicSets,
    blocks: DynamicSets,
    fluids: DynamicSets,
    entities: DynamicSets,
}

impl DynamicSetCatalog {
    /// Create a catalog with no sets defined.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets for the given kind.
    pub fn sets(&self, kind: IngredientKind) -> &DynamicSets {
        match kind {
            IngredientKind::Item => &self.items,
            IngredientKind::Block => &self.blocks,
            IngredientKind::Fluid => &self.fluids,
            IngredientKind::Entity => &self.entities,
        }
    }

    /// Mutable sets for the given kind.
    pub fn sets_mut(&mut self, kind: IngredientKind) -> &mut DynamicSets {
        match kind {
            IngredientKind::Item => &mut self.items,
            IngredientKind::Block => &mut self.blocks,
            IngredientKind::Fluid => &mut self.fluids,
            IngredientKind::Entity => &mut self.entities,
        }
    }

    /// Parse and build a matcher against the sets of `kind`.
    pub fn matcher(&self, kind: IngredientKind, json: &Value) -> Result<IngredientMatcher, ConfigError> {
        IngredientMatcher::deserialize(json, self.sets(kind))
    }
}

/// A single alternative of an ingredient.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IngredientEntry {
    /// Exactly this identifier.
    Explicit(Identifier),
    /// Every member of the named dynamic set, as of build time.
    DynamicSetRef(Identifier),
}

impl IngredientEntry {
    fn from_json(object: &Map<String, Value>) -> Result<Self, ConfigError> {
        let explicit = object.get(EXPLICIT_KEY);
        let dynamic = object.get(DYNAMIC_SET_KEY);
        match (explicit, dynamic) {
            (Some(_), Some(_)) => Err(ConfigError::AmbiguousEntry {
                explicit: EXPLICIT_KEY,
                dynamic: DYNAMIC_SET_KEY,
            }),
            (Some(value), None) => {
                let raw = value.as_str().ok_or(ConfigError::ExpectedString(EXPLICIT_KEY))?;
                Ok(Self::Explicit(Identifier::parse(raw)?))
            }
            (None, Some(value)) => {
                let raw = value
                    .as_str()
                    .ok_or(ConfigError::ExpectedString(DYNAMIC_SET_KEY))?;
                Ok(Self::DynamicSetRef(Identifier::parse(raw)?))
            }
            (None, None) => Err(ConfigError::MissingEntry {
                explicit: EXPLICIT_KEY,
                dynamic: DYNAMIC_SET_KEY,
            }),
        }
    }

    fn to_json(&self) -> Value {
        let mut object = Map::new();
        match self {
            Self::Explicit(id) => object.insert(EXPLICIT_KEY.into(), Value::String(id.to_string())),
            Self::DynamicSetRef(name) => {
                object.insert(DYNAMIC_SET_KEY.into(), Value::String(name.to_string()))
            }
        };
        Value::Object(object)
    }

    fn resolve_into(
        &self,
        sets: &DynamicSets,
        out: &mut BTreeSet<Identifier>,
    ) -> Result<(), ConfigError> {
        match self {
            Self::Explicit(id) => {
                out.insert(id.clone());
            }
            Self::DynamicSetRef(name) => {
                let members = sets
                    .members(name)
                    .ok_or_else(|| ConfigError::UnknownDynamicSet(name.clone()))?;
                out.extend(members.iter().cloned());
            }
        }
        Ok(())
    }
}

/// Parsed, not yet resolved, ingredient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientSpec {
    entries: Vec<IngredientEntry>,
}

impl IngredientSpec {
    /// Parse the ingredient grammar.
    pub fn from_json(json: &Value) -> Result<Self, ConfigError> {
        let entries = match json {
            Value::Null => return Err(ConfigError::NullIngredient),
            Value::Object(object) => vec![IngredientEntry::from_json(object)?],
            Value::Array(items) => {
                if items.is_empty() {
                    return Err(ConfigError::EmptyArray);
                }
                items
                    .iter()
                    .map(|item| match item {
                        Value::Object(object) => IngredientEntry::from_json(object),
                        _ => Err(ConfigError::ExpectedObjectOrArray),
                    })
                    .collect::<Result<Vec<_>, _>>()?
            }
            _ => return Err(ConfigError::ExpectedObjectOrArray),
        };
        Ok(Self { entries })
    }

    /// A spec made of explicit identifiers only.
    pub fn explicit<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = Identifier>,
    {
        Self {
            entries: ids.into_iter().map(IngredientEntry::Explicit).collect(),
        }
    }

    /// A spec naming a single dynamic set.
    pub fn dynamic_set(name: Identifier) -> Self {
        Self {
            entries: vec![IngredientEntry::DynamicSetRef(name)],
        }
    }

    /// The entry groups, in declaration order.
    pub fn entries(&self) -> &[IngredientEntry] {
        &self.entries
    }

    /// Resolve every entry against `sets` and freeze the result.
    pub fn build(&self, sets: &DynamicSets) -> Result<IngredientMatcher, ConfigError> {
        let mut matching = BTreeSet::new();
        for entry in &self.entries {
            entry.resolve_into(sets, &mut matching)?;
        }
        Ok(IngredientMatcher {
            entries: self.entries.clone(),
            matching,
        })
    }

    /// Write the grammar form back out.
    pub fn to_json(&self) -> Value {
        match self.entries.as_slice() {
            [single] => single.to_json(),
            entries => Value::Array(entries.iter().map(IngredientEntry::to_json).collect()),
        }
    }
}

/// An immutable, resolved ingredient: the union of every entry's members.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IngredientMatcher {
    entries: Vec<IngredientEntry>,
    matching: BTreeSet<Identifier>,
}

impl IngredientMatcher {
    /// A matcher that accepts nothing.
    pub const EMPTY: IngredientMatcher = IngredientMatcher {
        entries: Vec::new(),
        matching: BTreeSet::new(),
    };

    /// Same as [`IngredientMatcher::EMPTY`].
    pub fn empty() -> Self {
        Self::EMPTY
    }

    /// Parse the grammar and resolve it against `sets` in one step.
    pub fn deserialize(json: &Value, sets: &DynamicSets) -> Result<Self, ConfigError> {
        IngredientSpec::from_json(json)?.build(sets)
    }

    /// A matcher accepting exactly the given identifiers.
    pub fn of<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = Identifier>,
    {
        let IngredientSpec { entries } = IngredientSpec::explicit(ids);
        let matching = entries
            .iter()
            .filter_map(|entry| match entry {
                IngredientEntry::Explicit(id) => Some(id.clone()),
                IngredientEntry::DynamicSetRef(_) => None,
            })
            .collect();
        Self { entries, matching }
    }

    /// Membership test. An absent identifier never matches.
    pub fn test(&self, id: Option<&Identifier>) -> bool {
        id.is_some_and(|id| self.matching.contains(id))
    }

    /// Membership test for a present identifier.
    pub fn contains(&self, id: &Identifier) -> bool {
        self.matching.contains(id)
    }

    /// Every identifier this matcher accepts.
    pub fn matching_entries(&self) -> &BTreeSet<Identifier> {
        &self.matching
    }

    /// The entry groups this matcher was built from.
    pub fn entries(&self) -> &[IngredientEntry] {
        &self.entries
    }

    /// Whether the matcher accepts nothing.
    pub fn is_empty(&self) -> bool {
        self.matching.is_empty()
    }

    /// Grammar form of the unresolved entries (dynamic references preserved).
    pub fn to_json(&self) -> Value {
        IngredientSpec {
            entries: self.entries.clone(),
        }
        .to_json()
    }

    /// Wire form: a varint count followed by that many identifiers.
    ///
    /// Always the resolved snapshot; dynamic set references are flattened.
    pub fn encode(&self) -> Result<Vec<u8>, WireError> {
        Ok(postcard::to_allocvec(&self.matching)?)
    }

    /// Decode a matcher previously written by [`IngredientMatcher::encode`].
    pub fn decode(bytes: &[u8]) -> Result<Self, WireError> {
        let ids: Vec<Identifier> = postcard::from_bytes(bytes)?;
        Ok(Self::of(ids))
    }

    /// Decode a matcher from the front of a larger buffer, returning the rest.
    pub fn decode_prefix(bytes: &[u8]) -> Result<(Self, &[u8]), WireError> {
        let (ids, rest): (Vec<Identifier>, &[u8]) = postcard::take_from_bytes(bytes)?;
        Ok((Self::of(ids), rest))
    }
}
