// crates/flow-text-core/src/raw.rs
// ============================================================================
// Module: Raw Bundle Documents
// Description: Order-preserving, duplicate-rejecting document tree.
// Purpose: Give the typed loader a faithful view of the source document.
// Dependencies: indexmap, serde
// ============================================================================

//! ## Overview
//! Bundle documents only contain objects and strings. [`RawNode`] deserializes
//! exactly that shape, keeps declaration order, and rejects duplicate keys,
//! which `serde_json::Value` would silently collapse.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use indexmap::IndexMap;
use serde::Deserialize;
use serde::Deserializer;
use serde::de::Error as _;
use serde::de::MapAccess;
use serde::de::Visitor;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Untyped bundle node: a string leaf or an ordered object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RawNode {
    /// String leaf.
    Text(String),
    /// Object with keys in declaration order.
    Map(IndexMap<String, Self>),
}

impl RawNode {
    /// Short label for the node shape used in error messages.
    pub(crate) const fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "string",
            Self::Map(_) => "object",
        }
    }
}

// ============================================================================
// SECTION: Deserialization
// ============================================================================

/// Visitor accepting strings and objects only.
struct RawNodeVisitor;

impl<'de> Visitor<'de> for RawNodeVisitor {
    type Value = RawNode;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a string or an object of strings and objects")
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(RawNode::Text(value.to_string()))
    }

    fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(RawNode::Text(value))
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = IndexMap::with_capacity(access.size_hint().unwrap_or(0).min(256));
        while let Some(key) = access.next_key::<String>()? {
            if entries.contains_key(&key) {
                return Err(A::Error::custom(format!("duplicate key `{key}`")));
            }
            let value = access.next_value::<RawNode>()?;
            entries.insert(key, value);
        }
        Ok(RawNode::Map(entries))
    }
}

impl<'de> Deserialize<'de> for RawNode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(RawNodeVisitor)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
