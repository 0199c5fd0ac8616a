//! The three nesting levels of the boundary taxonomy.
//!
//! [`Category`], [`BoundaryType`] and [`SubType`] are closed enums, but not
//! every combination of them is meaningful. A [`ResolvedVariant`] can only
//! be obtained through [`BoundaryRegistry::resolve`](crate::BoundaryRegistry::resolve),
//! so holding one proves the combination is registered.

use serde::{Deserialize, Serialize};
use std::fmt;

use cfdcase_core::SchemaError;

/// Top level of the boundary taxonomy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    /// Solid walls.
    Wall,
    /// Flow entering the domain.
    Inlet,
    /// Flow leaving the domain.
    Outlet,
    /// Open boundaries where flow may enter or leave.
    Open,
    /// Geometric constraints (symmetry, 2D, periodic).
    Constraint,
    /// Internal baffles.
    Baffle,
}

impl Category {
    /// Every category, in catalogue order.
    pub const ALL: [Category; 6] = [
        Self::Wall,
        Self::Inlet,
        Self::Outlet,
        Self::Open,
        Self::Constraint,
        Self::Baffle,
    ];

    /// Internal identifier.
    pub fn name(self) -> &'static str {
        match self {
            Self::Wall => "Wall",
            Self::Inlet => "Inlet",
            Self::Outlet => "Outlet",
            Self::Open => "Open",
            Self::Constraint => "Constraint",
            Self::Baffle => "Baffle",
        }
    }

    /// Solver-facing name.
    pub fn external_name(self) -> &'static str {
        match self {
            Self::Wall => "wall",
            Self::Inlet => "inlet",
            Self::Outlet => "outlet",
            Self::Open => "open",
            Self::Constraint => "constraint",
            Self::Baffle => "baffle",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Second level of the boundary taxonomy.
///
/// Some types occur under several categories (`Pressure` under inlets,
/// outlets, and openings); the legal set per category is decided by the
/// registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum BoundaryType {
    NoSlip,
    Slip,
    PartialSlip,
    Moving,
    Rough,
    Velocity,
    FlowRate,
    Pressure,
    Outflow,
    FarField,
    Symmetry,
    Empty,
    Cyclic,
    Porous,
    Thin,
}

impl BoundaryType {
    /// Internal identifier.
    pub fn name(self) -> &'static str {
        match self {
            Self::NoSlip => "NoSlip",
            Self::Slip => "Slip",
            Self::PartialSlip => "PartialSlip",
            Self::Moving => "Moving",
            Self::Rough => "Rough",
            Self::Velocity => "Velocity",
            Self::FlowRate => "FlowRate",
            Self::Pressure => "Pressure",
            Self::Outflow => "Outflow",
            Self::FarField => "FarField",
            Self::Symmetry => "Symmetry",
            Self::Empty => "Empty",
            Self::Cyclic => "Cyclic",
            Self::Porous => "Porous",
            Self::Thin => "Thin",
        }
    }

    /// Solver-facing name.
    pub fn external_name(self) -> &'static str {
        match self {
            Self::NoSlip => "noSlip",
            Self::Slip => "slip",
            Self::PartialSlip => "partialSlip",
            Self::Moving => "moving",
            Self::Rough => "rough",
            Self::Velocity => "velocity",
            Self::FlowRate => "flowRate",
            Self::Pressure => "pressure",
            Self::Outflow => "outflow",
            Self::FarField => "farField",
            Self::Symmetry => "symmetry",
            Self::Empty => "empty",
            Self::Cyclic => "cyclic",
            Self::Porous => "porous",
            Self::Thin => "thin",
        }
    }
}

impl fmt::Display for BoundaryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Third level of the boundary taxonomy. Not every type has sub-types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum SubType {
    Translating,
    Rotating,
    Volumetric,
    Mass,
    Total,
    Static,
    Rotational,
    Translational,
}

impl SubType {
    /// Internal identifier.
    pub fn name(self) -> &'static str {
        match self {
            Self::Translating => "Translating",
            Self::Rotating => "Rotating",
            Self::Volumetric => "Volumetric",
            Self::Mass => "Mass",
            Self::Total => "Total",
            Self::Static => "Static",
            Self::Rotational => "Rotational",
            Self::Translational => "Translational",
        }
    }

    /// Solver-facing name.
    pub fn external_name(self) -> &'static str {
        match self {
            Self::Translating => "translating",
            Self::Rotating => "rotating",
            Self::Volumetric => "volumetric",
            Self::Mass => "mass",
            Self::Total => "total",
            Self::Static => "static",
            Self::Rotational => "rotational",
            Self::Translational => "translational",
        }
    }
}

impl fmt::Display for SubType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An unchecked `(category, type, sub_type)` triple.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariantKey {
    /// Category.
    pub category: Category,
    /// Type within the category.
    #[serde(rename = "type")]
    pub ty: BoundaryType,
    /// Sub-type, for types that have them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<SubType>,
}

impl VariantKey {
    /// Build a key.
    pub fn new(category: Category, ty: BoundaryType, sub_type: Option<SubType>) -> Self {
        Self {
            category,
            ty,
            sub_type,
        }
    }

    pub(crate) fn unknown(&self) -> SchemaError {
        SchemaError::UnknownVariant {
            category: self.category.name(),
            ty: self.ty.name(),
            sub_type: self.sub_type.map(SubType::name),
        }
    }
}

impl fmt::Display for VariantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.ty)?;
        if let Some(sub) = self.sub_type {
            write!(f, "/{sub}")?;
        }
        Ok(())
    }
}

/// A registered variant.
///
/// Serializes as its [`VariantKey`]; deserializing re-resolves against the
/// global registry, so an unregistered triple in a stored document is an
/// error rather than a dangling variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "VariantKey", try_from = "VariantKey")]
pub struct ResolvedVariant {
    key: VariantKey,
}

impl ResolvedVariant {
    pub(crate) fn new_unchecked(key: VariantKey) -> Self {
        Self { key }
    }

    /// The category.
    pub fn category(&self) -> Category {
        self.key.category
    }

    /// The type.
    pub fn ty(&self) -> BoundaryType {
        self.key.ty
    }

    /// The sub-type, if the type has sub-types.
    pub fn sub_type(&self) -> Option<SubType> {
        self.key.sub_type
    }

    /// The underlying triple.
    pub fn key(&self) -> VariantKey {
        self.key
    }
}

impl fmt::Display for ResolvedVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.key.fmt(f)
    }
}

impl From<ResolvedVariant> for VariantKey {
    fn from(v: ResolvedVariant) -> Self {
        v.key
    }
}

impl TryFrom<VariantKey> for ResolvedVariant {
    type Error = SchemaError;

    fn try_from(key: VariantKey) -> Result<Self, Self::Error> {
        crate::BoundaryRegistry::global().resolve(key.category, key.ty, key.sub_type)
    }
}
