//! Zone variants and their field schemas.
//!
//! Zones follow the boundary pattern with one level instead of three: a
//! porous zone selects a drag correlation, an initialisation zone has
//! none.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use cfdcase_core::{
    reconcile_fields, Activation, Bounds, EntityRef, FieldSchema, FieldValues, PhysicsGate,
    PhysicsModel, UnitClass,
};

use crate::groups::REFERENCE_TEMPERATURE;

/// Drag correlation of a porous zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PorousDrag {
    /// Darcy-Forchheimer coefficients along principal directions.
    PrincipalDirection,
    /// Correlation for flow across a bank of tubes.
    TubeBank,
}

impl PorousDrag {
    /// Solver-facing name.
    pub fn external_name(self) -> &'static str {
        match self {
            Self::PrincipalDirection => "DarcyForchheimer",
            Self::TubeBank => "tubeBank",
        }
    }
}

/// The kind of a zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneKind {
    /// Volumetric flow resistance.
    Porous(PorousDrag),
    /// Region with prescribed initial values.
    Initialisation,
}

impl ZoneKind {
    /// Every zone kind.
    pub const ALL: [ZoneKind; 3] = [
        Self::Porous(PorousDrag::PrincipalDirection),
        Self::Porous(PorousDrag::TubeBank),
        Self::Initialisation,
    ];

    /// Whether this is a porous zone.
    pub fn is_porous(self) -> bool {
        matches!(self, Self::Porous(_))
    }

    /// Solver-facing name of the zone section type.
    pub fn external_name(self) -> &'static str {
        match self {
            Self::Porous(drag) => drag.external_name(),
            Self::Initialisation => "initialisation",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Porous(PorousDrag::PrincipalDirection) => "Porous zone (principal directions)",
            Self::Porous(PorousDrag::TubeBank) => "Porous zone (tube bank)",
            Self::Initialisation => "Initialisation zone",
        }
    }
}

impl fmt::Display for ZoneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Field schemas of every zone kind.
#[derive(Debug)]
pub struct ZoneRegistry {
    kinds: IndexMap<ZoneKind, Vec<FieldSchema>>,
}

impl ZoneRegistry {
    /// Build the zone catalogue.
    pub fn new() -> Self {
        let kinds = ZoneKind::ALL
            .iter()
            .map(|kind| (*kind, kind_schemas(*kind)))
            .collect();
        Self { kinds }
    }

    /// The process-wide zone registry.
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<ZoneRegistry> = OnceLock::new();
        GLOBAL.get_or_init(Self::new)
    }

    /// All schemas of a zone kind, in declaration order.
    pub fn schemas(&self, kind: ZoneKind) -> &[FieldSchema] {
        self.kinds
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The schema of one field.
    pub fn schema(&self, kind: ZoneKind, name: &str) -> Option<&FieldSchema> {
        self.schemas(kind).iter().find(|s| s.name == name)
    }

    /// Rebuild the value map of a zone.
    pub fn reconcile(
        &self,
        kind: ZoneKind,
        entity: &EntityRef,
        previous: &FieldValues,
        physics: &PhysicsModel,
    ) -> FieldValues {
        reconcile_fields(entity, self.schemas(kind), previous, physics)
    }
}

impl Default for ZoneRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn kind_schemas(kind: ZoneKind) -> Vec<FieldSchema> {
    match kind {
        ZoneKind::Porous(PorousDrag::PrincipalDirection) => vec![
            FieldSchema::vector(
                "darcy_coefficients",
                "Darcy coefficients",
                UnitClass::InverseArea,
                false,
                Some([0.0; 3]),
            ),
            FieldSchema::vector(
                "forchheimer_coefficients",
                "Forchheimer coefficients",
                UnitClass::InverseLength,
                false,
                Some([0.0; 3]),
            ),
            FieldSchema::vector(
                "principal_direction_1",
                "First principal direction",
                UnitClass::Dimensionless,
                true,
                Some([1.0, 0.0, 0.0]),
            ),
            FieldSchema::vector(
                "principal_direction_2",
                "Second principal direction",
                UnitClass::Dimensionless,
                true,
                Some([0.0, 1.0, 0.0]),
            ),
        ],
        ZoneKind::Porous(PorousDrag::TubeBank) => vec![
            FieldSchema::scalar(
                "tube_diameter",
                "Tube diameter",
                UnitClass::Length,
                Bounds::POSITIVE,
                Some(0.02),
            ),
            FieldSchema::scalar(
                "tube_spacing",
                "Tube spacing",
                UnitClass::Length,
                Bounds::POSITIVE,
                Some(0.1),
            ),
            FieldSchema::vector(
                "tube_axis",
                "Tube axis",
                UnitClass::Dimensionless,
                true,
                Some([0.0, 0.0, 1.0]),
            ),
            FieldSchema::vector(
                "spacing_direction",
                "Spacing direction",
                UnitClass::Dimensionless,
                true,
                Some([1.0, 0.0, 0.0]),
            ),
            FieldSchema::scalar(
                "aspect_ratio",
                "Spacing aspect ratio",
                UnitClass::Dimensionless,
                Bounds::POSITIVE,
                Some(1.73),
            ),
            FieldSchema::scalar(
                "velocity_estimate",
                "Velocity estimate",
                UnitClass::Velocity,
                Bounds::POSITIVE,
                Some(1.0),
            ),
        ],
        ZoneKind::Initialisation => {
            let set = |field| Activation::Flag { field, value: true };
            vec![
                FieldSchema::flag("set_velocity", "Set velocity", false),
                FieldSchema::vector(
                    "velocity",
                    "Velocity",
                    UnitClass::Velocity,
                    false,
                    Some([0.0; 3]),
                )
                .when(set("set_velocity")),
                FieldSchema::flag("set_pressure", "Set pressure", false),
                FieldSchema::scalar(
                    "pressure",
                    "Pressure",
                    UnitClass::Pressure,
                    Bounds::ANY,
                    Some(0.0),
                )
                .when(set("set_pressure")),
                FieldSchema::flag("set_temperature", "Set temperature", false)
                    .when(Activation::Physics(PhysicsGate::Thermal)),
                FieldSchema::scalar(
                    "temperature",
                    "Temperature",
                    UnitClass::Temperature,
                    Bounds::POSITIVE,
                    Some(REFERENCE_TEMPERATURE),
                )
                .when(set("set_temperature")),
                FieldSchema::flag("set_volume_fraction", "Set volume fraction", false)
                    .when(Activation::Physics(PhysicsGate::Multiphase)),
                FieldSchema::scalar(
                    "volume_fraction",
                    "Volume fraction",
                    UnitClass::Dimensionless,
                    Bounds::UNIT_INTERVAL,
                    Some(0.0),
                )
                .when(set("set_volume_fraction")),
            ]
        }
    }
}
