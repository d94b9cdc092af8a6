//! JSON object helpers for the flatten rewrite.
//!
//! Plain (unprefixed) flatten lowers to `#[serde(flatten)]` in generated
//! structs; a flatten with a prefix has no serde attribute equivalent, so the
//! generator emits hand-rolled `Serialize`/`Deserialize` impls built on these
//! helpers. Keeping the key surgery here means the server and client codecs
//! share one implementation.

use serde_json::{Map, Value};

/// Fold a serialized child object into its parent, prefixing every key.
///
/// Used by generated `Serialize` impls: the child is serialized on its own,
/// then absorbed. Key collisions were rejected at generation time, so an
/// existing key here means the caller serialized the same field twice; the
/// child value wins deterministically.
pub fn merge_flattened(parent: &mut Map<String, Value>, child: Value, prefix: &str) {
    if let Value::Object(child) = child {
        for (key, value) in child {
            parent.insert(format!("{prefix}{key}"), value);
        }
    }
}

/// Extract the keys of a flattened child back out of the parent.
///
/// `keys` are the child's field names; for each, `prefix + key` is removed
/// from the parent and reinserted under the bare name. Missing keys are
/// simply absent in the result, letting the child's own decoder apply its
/// defaults.
#[must_use]
pub fn split_flattened(
    parent: &mut Map<String, Value>,
    prefix: &str,
    keys: &[&str],
) -> Map<String, Value> {
    let mut child = Map::new();
    for &key in keys {
        if let Some(value) = parent.remove(&format!("{prefix}{key}")) {
            child.insert(key.to_string(), value);
        }
    }
    child
}

/// A decode failure for a discriminated oneof whose tag value is not a known
/// variant.
///
/// Generated decoders surface this (via `serde::de::Error::custom`) when the
/// discriminator property carries an unrecognized value, so callers see the
/// property name and the offending value rather than a generic parse error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    /// The discriminator property name.
    pub property: String,
    /// The unrecognized tag value.
    pub value: String,
}

impl UnknownVariant {
    /// Build the failure for discriminator `property` with the offending
    /// `value`.
    #[must_use]
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
        }
    }
}

impl std::fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown discriminator value '{}' for '{}'",
            self.value, self.property,
        )
    }
}

impl std::error::Error for UnknownVariant {}
