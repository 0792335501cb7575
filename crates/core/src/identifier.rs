//! Namespaced identifiers.
//!
//! Identifiers name one concrete kind of world entry (a block, item, fluid or
//! entity type) or one named dynamic set, in the form `namespace:path`
//! (e.g. `minecraft:oak_planks`). They are ordered and validated so that
//! resolved ingredient sets iterate deterministically and encode stably.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default namespace used when an identifier omits an explicit namespace.
pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// Error returned when parsing an invalid [`Identifier`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid identifier '{input}': {reason}")]
pub struct IdentifierError {
    input: String,
    reason: &'static str,
}

impl IdentifierError {
    fn new(input: &str, reason: &'static str) -> Self {
        Self {
            input: input.to_string(),
            reason,
        }
    }

    /// The rejected input, verbatim.
    pub fn input(&self) -> &str {
        &self.input
    }
}

/// A namespaced key of the form `namespace:path`.
///
/// Ordering is lexical by `(namespace, path)` and is stable across runs.
/// Serialises as its string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier {
    namespace: String,
    path: String,
}

impl Identifier {
    /// Parse an identifier.
    ///
    /// Accepts either:
    /// - `namespace:path`
    /// - `path` (uses [`DEFAULT_NAMESPACE`])
    pub fn parse(input: &str) -> Result<Self, IdentifierError> {
        Self::parse_with_default_namespace(input, DEFAULT_NAMESPACE)
    }

    /// Parse an identifier using a caller-provided default namespace.
    pub fn parse_with_default_namespace(
        input: &str,
        default_namespace: &str,
    ) -> Result<Self, IdentifierError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(IdentifierError::new(input, "identifier cannot be empty"));
        }

        let (namespace, path) = match trimmed.split_once(':') {
            Some((ns, p)) => (ns.trim(), p.trim()),
            None => (default_namespace, trimmed),
        };

        validate_namespace(namespace).map_err(|reason| IdentifierError::new(input, reason))?;
        validate_path(path).map_err(|reason| IdentifierError::new(input, reason))?;

        Ok(Self {
            namespace: namespace.to_string(),
            path: path.to_string(),
        })
    }

    /// Identifier namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Identifier path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Stable 64-bit FNV-1a hash of `namespace:path`, used to salt RNG seeds.
    pub fn hash_key(&self) -> u64 {
        const OFFSET: u64 = 0xCBF2_9CE4_8422_2325;
        const PRIME: u64 = 0x0000_0100_0000_01B3;
        let parts = [self.namespace.as_bytes(), b":", self.path.as_bytes()];
        parts
            .iter()
            .flat_map(|part| part.iter())
            .fold(OFFSET, |hash, byte| (hash ^ u64::from(*byte)).wrapping_mul(PRIME))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

impl FromStr for Identifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Identifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Identifier::parse(&raw).map_err(de::Error::custom)
    }
}

fn validate_namespace(ns: &str) -> Result<(), &'static str> {
    if ns.is_empty() {
        return Err("namespace cannot be empty");
    }
    if ns.len() > 64 {
        return Err("namespace too long (max 64)");
    }
    if !ns
        .chars()
        .all(|c| matches!(c, 'a'..='z' | '0'..='9' | '_' | '-' | '.'))
    {
        return Err("namespace has invalid characters (allowed: a-z0-9_.-)");
    }
    Ok(())
}

fn validate_path(path: &str) -> Result<(), &'static str> {
    if path.is_empty() {
        return Err("path cannot be empty");
    }
    if path.len() > 128 {
        return Err("path too long (max 128)");
    }
    if !path
        .chars()
        .all(|c| matches!(c, 'a'..='z' | '0'..='9' | '_' | '-' | '.' | '/'))
    {
        return Err("path has invalid characters (allowed: a-z0-9_./-)");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_namespaced_identifier() {
        let id = Identifier::parse("create:crushed_iron").unwrap();
        assert_eq!(id.namespace(), "create");
        assert_eq!(id.path(), "crushed_iron");
        assert_eq!(id.to_string(), "create:crushed_iron");
    }

    #[test]
    fn parses_with_default_namespace() {
        let id = Identifier::parse("stone").unwrap();
        assert_eq!(id.to_string(), "minecraft:stone");
    }

    #[test]
    fn rejects_empty() {
        assert!(Identifier::parse("").is_err());
        assert!(Identifier::parse("   ").is_err());
    }

    #[test]
    fn rejects_invalid_chars() {
        assert!(Identifier::parse("minecraft:Stone").is_err());
        assert!(Identifier::parse("MC:stone").is_err());
        assert!(Identifier::parse("minecraft:stone?").is_err());
        assert!(Identifier::parse("minecraft:").is_err());
        assert!(Identifier::parse(":stone").is_err());
    }

    #[test]
    fn hash_key_is_stable_per_identifier() {
        let a = Identifier::parse("interactio:crush_a").unwrap();
        let b = Identifier::parse("interactio:crush_b").unwrap();
        assert_eq!(a.hash_key(), Identifier::parse("interactio:crush_a").unwrap().hash_key());
        assert_ne!(a.hash_key(), b.hash_key());
        assert_eq!(
            Identifier::parse("stone").unwrap().hash_key(),
            Identifier::parse("minecraft:stone").unwrap().hash_key()
        );
    }

    #[test]
    fn serialises_as_string() {
        let id = Identifier::parse("oak_log").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"minecraft:oak_log\"");
        let back: Identifier = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<Identifier>("\"Bad Key\"").is_err());
    }
}
