//! Field values and the per-entity value map.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::unit::Unit;

/// A number tagged with the unit it is expressed in.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    /// The numeric value.
    pub value: f64,
    /// The unit `value` is expressed in.
    pub unit: Unit,
}

/// A typed value held by one field of a boundary, zone, or region.
///
/// Values stored inside a [`FieldValues`] map are always normalised: scalar
/// and vector quantities are expressed in the SI unit of their class and
/// choices hold a registered option id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// A single quantity.
    Scalar(Quantity),
    /// An ordered `(x, y, z)` triple in one unit.
    Vector {
        /// Components.
        components: [f64; 3],
        /// Unit shared by all components.
        unit: Unit,
    },
    /// A flag.
    Boolean(bool),
    /// The internal id of one option of an enumerated field.
    Choice(String),
    /// Free text (e.g. the name of a partner boundary).
    Text(String),
}

impl FieldValue {
    /// A scalar quantity.
    pub fn scalar(value: f64, unit: Unit) -> Self {
        Self::Scalar(Quantity { value, unit })
    }

    /// A vector quantity.
    pub fn vector(components: [f64; 3], unit: Unit) -> Self {
        Self::Vector { components, unit }
    }

    /// A choice by option id.
    pub fn choice(id: impl Into<String>) -> Self {
        Self::Choice(id.into())
    }

    /// Free text.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Short name of the value kind, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Vector { .. } => "vector",
            Self::Boolean(_) => "boolean",
            Self::Choice(_) => "choice",
            Self::Text(_) => "text",
        }
    }

    /// The option id if this is a choice.
    pub fn as_choice(&self) -> Option<&str> {
        match self {
            Self::Choice(id) => Some(id),
            _ => None,
        }
    }

    /// The flag if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// The text if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(t) => Some(t),
            _ => None,
        }
    }

    /// The numeric value if this is a scalar.
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(q) => Some(q.value),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(q) => write!(f, "{} {}", q.value, q.unit),
            Self::Vector { components: c, unit } => {
                write!(f, "({} {} {}) {unit}", c[0], c[1], c[2])
            }
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Choice(id) => f.write_str(id),
            Self::Text(t) => write!(f, "\"{t}\""),
        }
    }
}

/// The field values of one entity, keyed by field name.
///
/// The key set is exactly the entity's currently active fields; a `None`
/// slot marks an active field that has no default and has not been set
/// yet. Keys keep schema declaration order, so iteration (and therefore
/// serialization) is deterministic.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldValues {
    entries: IndexMap<String, Option<FieldValue>>,
}

impl FieldValues {
    /// An empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// The value of an active, set field.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries.get(name).and_then(Option::as_ref)
    }

    /// Whether `name` is one of the active fields.
    pub fn is_active(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Whether `name` is active and holds a value.
    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Active field names, in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// All `(name, slot)` pairs, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&FieldValue>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    /// Active fields that are still unset.
    pub fn unset(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, v)| v.is_none())
            .map(|(k, _)| k.as_str())
    }

    /// Number of active fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no field is active.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn insert_slot(&mut self, name: &str, value: Option<FieldValue>) {
        self.entries.insert(name.to_string(), value);
    }

    /// Overwrite the slot of an already-active field.
    ///
    /// Returns `false` (and changes nothing) if `name` is not active.
    pub fn replace(&mut self, name: &str, value: FieldValue) -> bool {
        match self.entries.get_mut(name) {
            Some(slot) => {
                *slot = Some(value);
                true
            }
            None => false,
        }
    }

    /// Take the raw slot map, leaving this one empty.
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }
}
