//! Core types for the cfdcase configuration model.
//!
//! This is the leaf crate with no internal dependencies. It defines the
//! vocabulary shared by every other cfdcase crate: entity IDs, physical
//! units, field schemas and their activation predicates, field values,
//! the physics model selector, and the schema/validation error types.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod field;
pub mod id;
pub mod physics;
pub mod unit;
pub mod value;

pub use error::{EntityRef, SchemaError, ValidationError};
pub use field::{
    reconcile_fields, Activation, ActivationContext, Bound, Bounds, ChoiceOption, FieldKind,
    FieldSchema, PhysicsGate,
};
pub use id::{BoundaryId, FaceSet, RegionId, ShapeRef, ZoneId};
pub use physics::{
    FlowRegime, PhaseModel, PhysicsModel, PhysicsPatch, RotatingFrame, TimeDependence,
    TurbulenceModel, ViscousModel,
};
pub use unit::{Unit, UnitClass};
pub use value::{FieldValue, FieldValues, Quantity};
