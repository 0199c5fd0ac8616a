//! Boundary conditions.

use serde::{Deserialize, Serialize};

use cfdcase_core::{BoundaryId, EntityRef, FaceSet, FieldValues};
use cfdcase_registry::{BoundaryType, Category, ResolvedVariant, SubType};

/// A named boundary condition bound to a set of faces.
///
/// The key set of [`values`](Self::values) is always exactly the active
/// fields of [`variant`](Self::variant) under the owning model's physics;
/// all mutation goes through [`CaseModel`](crate::CaseModel) to keep it so.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundaryCondition {
    pub(crate) id: BoundaryId,
    pub(crate) name: String,
    pub(crate) face_set: FaceSet,
    pub(crate) variant: ResolvedVariant,
    pub(crate) values: FieldValues,
    #[serde(default)]
    pub(crate) default_for_unmatched: bool,
}

impl BoundaryCondition {
    /// Stable identifier.
    pub fn id(&self) -> BoundaryId {
        self.id
    }

    /// Name, also the on-disk key.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Faces this boundary applies to.
    pub fn face_set(&self) -> &FaceSet {
        &self.face_set
    }

    /// The resolved variant.
    pub fn variant(&self) -> ResolvedVariant {
        self.variant
    }

    /// Category of the variant.
    pub fn category(&self) -> Category {
        self.variant.category()
    }

    /// Type of the variant.
    pub fn ty(&self) -> BoundaryType {
        self.variant.ty()
    }

    /// Sub-type of the variant.
    pub fn sub_type(&self) -> Option<SubType> {
        self.variant.sub_type()
    }

    /// Field values of the active fields.
    pub fn values(&self) -> &FieldValues {
        &self.values
    }

    /// Whether faces matched by no other boundary are assigned here.
    pub fn is_default_for_unmatched(&self) -> bool {
        self.default_for_unmatched
    }

    /// The reference used in validation errors.
    pub fn entity(&self) -> EntityRef {
        EntityRef::Boundary(self.name.clone())
    }
}
