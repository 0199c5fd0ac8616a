//! Boundary condition variant registry and zone catalogue.
//!
//! Boundary conditions are classified on three levels: a [`Category`], a
//! [`BoundaryType`] legal for that category, and for some types a
//! [`SubType`]. The [`BoundaryRegistry`] maps every registered combination
//! to its field schemas, which combine intrinsic fields with cross-cutting
//! groups (velocity specification, turbulence, thermal, phase, periodicity)
//! gated by sibling values and the physics selection.
//!
//! Zones use the same schema machinery through the [`ZoneRegistry`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod boundary;
mod catalogue;
pub mod groups;
pub mod variant;
pub mod zone;

pub use boundary::{resolve, BoundaryRegistry, SubTypeList, TypeList, VariantInfo};
pub use variant::{BoundaryType, Category, ResolvedVariant, SubType, VariantKey};
pub use zone::{PorousDrag, ZoneKind, ZoneRegistry};
