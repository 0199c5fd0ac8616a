//! Strongly-typed identifiers and opaque geometric references.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a boundary condition within a case model.
///
/// Allocated sequentially by the owning case model and never reused,
/// so an ID held across a removal cannot alias a later boundary.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BoundaryId(pub u32);

impl fmt::Display for BoundaryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for BoundaryId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies a porous or initialisation zone within a case model.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ZoneId(pub u32);

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ZoneId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies a mesh refinement region within a case model.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RegionId(pub u32);

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for RegionId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Opaque reference to a piece of host geometry (e.g. `"Body001:Face3"`).
///
/// The core never interprets the string; it is handed back to the host
/// and written to the mesh case verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShapeRef(pub String);

impl fmt::Display for ShapeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ShapeRef {
    fn from(v: &str) -> Self {
        Self(v.to_string())
    }
}

/// The set of faces a boundary condition applies to.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FaceSet(pub Vec<ShapeRef>);

impl FaceSet {
    /// Build a face set from anything yielding shape references.
    pub fn new<I, S>(refs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ShapeRef>,
    {
        Self(refs.into_iter().map(Into::into).collect())
    }

    /// Whether the face set references no geometry at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the referenced shapes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ShapeRef> {
        self.0.iter()
    }
}
