//! Porous and initialisation zones.

use serde::{Deserialize, Serialize};

use cfdcase_core::{EntityRef, FieldValues, ShapeRef, ZoneId};
use cfdcase_registry::ZoneKind;

/// A named volumetric region with its own field schema set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub(crate) id: ZoneId,
    pub(crate) name: String,
    pub(crate) kind: ZoneKind,
    pub(crate) shape_refs: Vec<ShapeRef>,
    pub(crate) values: FieldValues,
}

impl Zone {
    /// Stable identifier.
    pub fn id(&self) -> ZoneId {
        self.id
    }

    /// Name, also the on-disk key.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Zone kind (and drag correlation for porous zones).
    pub fn kind(&self) -> ZoneKind {
        self.kind
    }

    /// Geometry the zone covers.
    pub fn shape_refs(&self) -> &[ShapeRef] {
        &self.shape_refs
    }

    /// Field values of the active fields.
    pub fn values(&self) -> &FieldValues {
        &self.values
    }

    /// The reference used in validation errors.
    pub fn entity(&self) -> EntityRef {
        EntityRef::Zone(self.name.clone())
    }
}
