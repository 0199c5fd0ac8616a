//! Schema and validation error types.
//!
//! Every validation error names the entity it concerns, so a write attempt
//! can report all problems of a case at once and the caller can point the
//! user at each offending field.

use std::error::Error;
use std::fmt;

use crate::unit::{Unit, UnitClass};

/// The entity a validation error refers to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EntityRef {
    /// A boundary condition, by name.
    Boundary(String),
    /// A porous or initialisation zone, by name.
    Zone(String),
    /// A mesh refinement region, by name.
    Region(String),
    /// The physics model selector.
    Physics,
    /// The case-wide mesh settings.
    MeshSettings,
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boundary(name) => write!(f, "boundary '{name}'"),
            Self::Zone(name) => write!(f, "zone '{name}'"),
            Self::Region(name) => write!(f, "refinement region '{name}'"),
            Self::Physics => write!(f, "physics model"),
            Self::MeshSettings => write!(f, "mesh settings"),
        }
    }
}

// ── SchemaError ────────────────────────────────────────────────────

/// Errors from resolving a variant against a registry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SchemaError {
    /// The `(category, type, sub_type)` triple is not registered.
    UnknownVariant {
        /// Category name.
        category: &'static str,
        /// Type name.
        ty: &'static str,
        /// Sub-type name, if one was given.
        sub_type: Option<&'static str>,
    },
    /// No schema of the entity's variant declares this field name.
    UnknownField {
        /// The unrecognised field name.
        field: String,
    },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownVariant {
                category,
                ty,
                sub_type: Some(sub),
            } => write!(f, "unknown variant {category}/{ty}/{sub}"),
            Self::UnknownVariant {
                category,
                ty,
                sub_type: None,
            } => write!(f, "unknown variant {category}/{ty}"),
            Self::UnknownField { field } => write!(f, "unknown field '{field}'"),
        }
    }
}

impl Error for SchemaError {}

// ── ValidationError ────────────────────────────────────────────────

/// A single problem with a value, an entity, or the case as a whole.
#[derive(Clone, Debug, PartialEq)]
pub enum ValidationError {
    /// The variant of an entity could not be resolved.
    Schema {
        /// Which entity.
        entity: EntityRef,
        /// The resolution failure.
        source: SchemaError,
    },
    /// Write to a field that does not currently apply to the entity.
    FieldInactive {
        /// Which entity.
        entity: EntityRef,
        /// The field written.
        field: String,
    },
    /// Value kind does not match the schema (e.g. boolean for a scalar).
    WrongKind {
        /// Which entity.
        entity: EntityRef,
        /// The field written.
        field: String,
        /// Kind declared by the schema.
        expected: &'static str,
        /// Kind supplied.
        found: &'static str,
    },
    /// Quantity supplied in a unit of the wrong class.
    WrongUnit {
        /// Which entity.
        entity: EntityRef,
        /// The field written.
        field: String,
        /// Class declared by the schema.
        expected: UnitClass,
        /// Unit supplied.
        found: Unit,
    },
    /// Value outside the declared range, non-finite, zero where a
    /// direction is required, or empty text.
    OutOfRange {
        /// Which entity.
        entity: EntityRef,
        /// The field written.
        field: String,
        /// Description of the violation.
        reason: String,
    },
    /// Choice id not among the registered options.
    InvalidChoice {
        /// Which entity.
        entity: EntityRef,
        /// The field written.
        field: String,
        /// The rejected id.
        value: String,
        /// The registered option ids.
        allowed: Vec<&'static str>,
    },
    /// An active field without a default has not been set.
    MissingValue {
        /// Which entity.
        entity: EntityRef,
        /// The unset field.
        field: String,
    },
    /// Two entities of one collection share a serialization key.
    DuplicateName {
        /// Collection (`"boundary"`, `"zone"`, `"refinement region"`).
        collection: &'static str,
        /// The contested name.
        name: String,
    },
    /// A name that cannot be used as a dictionary key.
    InvalidName {
        /// Collection.
        collection: &'static str,
        /// The rejected name.
        name: String,
    },
    /// A second boundary was marked as the default for unmatched faces.
    DefaultBoundaryConflict {
        /// The boundary already marked default.
        existing: String,
        /// The boundary that was to be marked.
        requested: String,
    },
    /// A coupled boundary names a partner that does not exist.
    UnknownPartner {
        /// Which entity.
        entity: EntityRef,
        /// The missing partner name.
        partner: String,
    },
    /// The physics selection (or a patch to it) is inconsistent.
    IncompatiblePhysics {
        /// Description of the conflict.
        reason: String,
    },
    /// A case-wide or region setting is invalid.
    InvalidSetting {
        /// Which entity.
        entity: EntityRef,
        /// Description of the violation.
        reason: String,
    },
    /// No entity with this ID exists.
    NotFound {
        /// Collection.
        collection: &'static str,
        /// The missing ID.
        id: u32,
    },
    /// Every ID of a collection is taken.
    IdsExhausted {
        /// Collection.
        collection: &'static str,
    },
}

impl ValidationError {
    /// The field this error concerns, if it concerns a single field.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::FieldInactive { field, .. }
            | Self::WrongKind { field, .. }
            | Self::WrongUnit { field, .. }
            | Self::OutOfRange { field, .. }
            | Self::InvalidChoice { field, .. }
            | Self::MissingValue { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schema { entity, source } => write!(f, "{entity}: {source}"),
            Self::FieldInactive { entity, field } => {
                write!(f, "{entity}: field '{field}' is not active")
            }
            Self::WrongKind {
                entity,
                field,
                expected,
                found,
            } => write!(f, "{entity}: field '{field}' expects a {expected}, got a {found}"),
            Self::WrongUnit {
                entity,
                field,
                expected,
                found,
            } => write!(f, "{entity}: field '{field}' expects a {expected} unit, got {found}"),
            Self::OutOfRange {
                entity,
                field,
                reason,
            } => write!(f, "{entity}: field '{field}' out of range: {reason}"),
            Self::InvalidChoice {
                entity,
                field,
                value,
                allowed,
            } => write!(
                f,
                "{entity}: '{value}' is not an option of '{field}' (allowed: {})",
                allowed.join(", ")
            ),
            Self::MissingValue { entity, field } => {
                write!(f, "{entity}: required field '{field}' is not set")
            }
            Self::DuplicateName { collection, name } => {
                write!(f, "duplicate {collection} name '{name}'")
            }
            Self::InvalidName { collection, name } => {
                write!(f, "invalid {collection} name '{name}'")
            }
            Self::DefaultBoundaryConflict {
                existing,
                requested,
            } => write!(
                f,
                "boundary '{existing}' is already the default; cannot also mark '{requested}'"
            ),
            Self::UnknownPartner { entity, partner } => {
                write!(f, "{entity}: partner boundary '{partner}' does not exist")
            }
            Self::IncompatiblePhysics { reason } => write!(f, "incompatible physics: {reason}"),
            Self::InvalidSetting { entity, reason } => write!(f, "{entity}: {reason}"),
            Self::NotFound { collection, id } => write!(f, "no {collection} with id {id}"),
            Self::IdsExhausted { collection } => write!(f, "no {collection} ids left"),
        }
    }
}

impl Error for ValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Schema { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_entity_and_field() {
        let err = ValidationError::MissingValue {
            entity: EntityRef::Boundary("wall-1".to_string()),
            field: "roughness_height".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("boundary 'wall-1'"));
        assert!(msg.contains("roughness_height"));
        assert_eq!(err.field(), Some("roughness_height"));
    }

    #[test]
    fn schema_error_is_source() {
        let err = ValidationError::Schema {
            entity: EntityRef::Boundary("b".to_string()),
            source: SchemaError::UnknownVariant {
                category: "Wall",
                ty: "Velocity",
                sub_type: None,
            },
        };
        assert!(err.source().is_some());
        assert!(err.to_string().contains("Wall/Velocity"));
    }
}
