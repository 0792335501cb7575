//! Named, externally-managed identifier sets ("tags").
//!
//! Membership is owned by whoever loads the sets and may change between
//! registration cycles. Consumers that need a stable view copy the members
//! they care about at build time.

use crate::Identifier;
use std::collections::{BTreeMap, BTreeSet};

/// Registry of named dynamic sets.
#[derive(Debug, Clone, Default)]
pub struct DynamicSets {
    sets: BTreeMap<Identifier, BTreeSet<Identifier>>,
}

impl DynamicSets {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Define (or replace) a set with the given members.
    pub fn define<I>(&mut self, name: Identifier, members: I)
    where
        I: IntoIterator<Item = Identifier>,
    {
        self.sets.insert(name, members.into_iter().collect());
    }

    /// Add a member to a set, creating the set if needed.
    pub fn insert(&mut self, name: &Identifier, member: Identifier) -> bool {
        self.sets.entry(name.clone()).or_default().insert(member)
    }

    /// Remove a member from a set. Returns whether it was present.
    pub fn remove(&mut self, name: &Identifier, member: &Identifier) -> bool {
        self.sets
            .get_mut(name)
            .map(|set| set.remove(member))
            .unwrap_or(false)
    }

    /// Current members of a set, or `None` if no such set exists.
    pub fn members(&self, name: &Identifier) -> Option<&BTreeSet<Identifier>> {
        self.sets.get(name)
    }

    /// Whether a set with this name exists.
    pub fn contains(&self, name: &Identifier) -> bool {
        self.sets.contains_key(name)
    }

    /// Number of defined sets.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Whether no sets are defined.
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}
