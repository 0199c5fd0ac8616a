//! Mesh settings and refinement regions.

use serde::{Deserialize, Serialize};

use cfdcase_core::{EntityRef, RegionId, ShapeRef, ValidationError};

/// External meshing tool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeshUtility {
    /// cfMesh (cartesianMesh).
    #[default]
    CfMesh,
    /// snappyHexMesh.
    SnappyHexMesh,
    /// gmsh.
    Gmsh,
}

impl MeshUtility {
    /// Solver-facing name.
    pub fn external_name(self) -> &'static str {
        match self {
            Self::CfMesh => "cfMesh",
            Self::SnappyHexMesh => "snappyHexMesh",
            Self::Gmsh => "gmsh",
        }
    }
}

/// Case-wide mesher settings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshSettings {
    /// Meshing tool.
    pub utility: MeshUtility,
    /// Base cell size in metres. Zero means not yet chosen.
    pub base_cell_size: f64,
    /// A point inside the fluid region, required by snappyHexMesh.
    #[serde(default)]
    pub point_in_mesh: Option<[f64; 3]>,
    /// The geometry to mesh.
    #[serde(default)]
    pub geometry: Option<ShapeRef>,
}

impl MeshSettings {
    /// Problems that make the settings unusable right now.
    ///
    /// Called on every edit: a new value must be a usable value.
    pub fn check_edit(&self) -> Result<(), ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidSetting {
            entity: EntityRef::MeshSettings,
            reason: reason.to_string(),
        };
        if !self.base_cell_size.is_finite() || self.base_cell_size <= 0.0 {
            return Err(invalid("base cell size must be a positive length"));
        }
        if let Some(p) = self.point_in_mesh {
            if p.iter().any(|c| !c.is_finite()) {
                return Err(invalid("point in mesh must be finite"));
            }
        }
        Ok(())
    }

    /// Every problem preventing a mesh case from being written.
    pub fn problems(&self) -> Vec<ValidationError> {
        let mut problems = Vec::new();
        if let Err(e) = self.check_edit() {
            problems.push(e);
        }
        if self.utility == MeshUtility::SnappyHexMesh && self.point_in_mesh.is_none() {
            problems.push(ValidationError::InvalidSetting {
                entity: EntityRef::MeshSettings,
                reason: "snappyHexMesh requires a point in mesh".to_string(),
            });
        }
        problems
    }
}

/// Prismatic boundary layer specification.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundaryLayers {
    /// Number of layers (at least one).
    pub count: u32,
    /// Growth ratio between successive layers (at least one).
    pub expansion_ratio: f64,
    /// Height of the layer touching the surface, in metres.
    pub first_layer_height: f64,
}

impl Default for BoundaryLayers {
    fn default() -> Self {
        Self {
            count: 3,
            expansion_ratio: 1.2,
            first_layer_height: 1e-3,
        }
    }
}

/// How a region is extruded into the third dimension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExtrusionKind {
    /// One cell thick 2D planar mesh.
    TwoDPlanar,
    /// Axisymmetric wedge.
    Wedge,
    /// Extrude along the patch normal.
    PatchNormal,
}

impl ExtrusionKind {
    /// Solver-facing name.
    pub fn external_name(self) -> &'static str {
        match self {
            Self::TwoDPlanar => "2DPlanar",
            Self::Wedge => "wedge",
            Self::PatchNormal => "patchNormal",
        }
    }
}

/// Extrusion of a refinement region's faces.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Extrusion {
    /// Extrusion mode.
    pub kind: ExtrusionKind,
    /// Number of cell layers (at least one).
    pub layers: u32,
    /// Extrusion thickness in metres.
    pub thickness: f64,
}

/// Size parameters of a refinement region.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegionSettings {
    /// Cell size relative to the base size, in `(0, 1]`.
    pub relative_size: f64,
    /// Distance from the shapes over which refinement applies, in metres.
    pub thickness: f64,
    /// Optional boundary layers on the region's surfaces.
    #[serde(default)]
    pub boundary_layers: Option<BoundaryLayers>,
}

impl Default for RegionSettings {
    fn default() -> Self {
        Self {
            relative_size: 1.0,
            thickness: 0.0,
            boundary_layers: None,
        }
    }
}

/// A named local mesh refinement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RefinementRegion {
    pub(crate) id: RegionId,
    pub(crate) name: String,
    pub(crate) shape_refs: Vec<ShapeRef>,
    pub(crate) settings: RegionSettings,
    #[serde(default)]
    pub(crate) extrusion: Option<Extrusion>,
}

impl RefinementRegion {
    /// Stable identifier.
    pub fn id(&self) -> RegionId {
        self.id
    }

    /// Name, also the on-disk key.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Geometry refined by this region.
    pub fn shape_refs(&self) -> &[ShapeRef] {
        &self.shape_refs
    }

    /// Size parameters.
    pub fn settings(&self) -> &RegionSettings {
        &self.settings
    }

    /// Extrusion, if any.
    pub fn extrusion(&self) -> Option<&Extrusion> {
        self.extrusion.as_ref()
    }

    /// The reference used in validation errors.
    pub fn entity(&self) -> EntityRef {
        EntityRef::Region(self.name.clone())
    }
}

pub(crate) fn check_region_settings(
    entity: &EntityRef,
    settings: &RegionSettings,
) -> Vec<ValidationError> {
    let mut problems = Vec::new();
    let mut invalid = |reason: &str| {
        problems.push(ValidationError::InvalidSetting {
            entity: entity.clone(),
            reason: reason.to_string(),
        })
    };
    let s = settings;
    if !(s.relative_size > 0.0 && s.relative_size <= 1.0) {
        invalid("relative cell size must lie in (0, 1]");
    }
    if !s.thickness.is_finite() || s.thickness < 0.0 {
        invalid("refinement thickness must be a non-negative length");
    }
    if let Some(layers) = s.boundary_layers {
        if layers.count == 0 {
            invalid("boundary layer count must be at least 1");
        }
        if !layers.expansion_ratio.is_finite() || layers.expansion_ratio < 1.0 {
            invalid("boundary layer expansion ratio must be at least 1");
        }
        if !layers.first_layer_height.is_finite() || layers.first_layer_height <= 0.0 {
            invalid("first boundary layer height must be positive");
        }
    }
    problems
}

pub(crate) fn check_extrusion(entity: &EntityRef, extrusion: &Extrusion) -> Vec<ValidationError> {
    let mut problems = Vec::new();
    if extrusion.layers == 0 {
        problems.push(ValidationError::InvalidSetting {
            entity: entity.clone(),
            reason: "extrusion needs at least one layer".to_string(),
        });
    }
    if !extrusion.thickness.is_finite() || extrusion.thickness <= 0.0 {
        problems.push(ValidationError::InvalidSetting {
            entity: entity.clone(),
            reason: "extrusion thickness must be positive".to_string(),
        });
    }
    problems
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_mesh_settings_need_a_cell_size() {
        let settings = MeshSettings::default();
        assert_eq!(settings.problems().len(), 1);
        let settings = MeshSettings {
            base_cell_size: 0.05,
            ..MeshSettings::default()
        };
        assert!(settings.problems().is_empty());
    }

    #[test]
    fn snappy_requires_point_in_mesh() {
        let settings = MeshSettings {
            utility: MeshUtility::SnappyHexMesh,
            base_cell_size: 0.05,
            ..MeshSettings::default()
        };
        assert!(settings.check_edit().is_ok());
        match settings.problems().as_slice() {
            [ValidationError::InvalidSetting { reason, .. }] => {
                assert!(reason.contains("point in mesh"))
            }
            other => panic!("expected one InvalidSetting, got {other:?}"),
        }
    }

    #[test]
    fn region_checks_collect_every_problem() {
        let entity = EntityRef::Region("r".to_string());
        let settings = RegionSettings {
            relative_size: 0.0,
            thickness: -1.0,
            boundary_layers: Some(BoundaryLayers {
                count: 0,
                expansion_ratio: 0.5,
                first_layer_height: 0.0,
            }),
        };
        assert_eq!(check_region_settings(&entity, &settings).len(), 5);
        assert!(check_region_settings(&entity, &RegionSettings::default()).is_empty());
    }
}
