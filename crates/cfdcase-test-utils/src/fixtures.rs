//! Reusable case model fixtures.
//!
//! - [`valid_case`] passes both mesh and solver validation.
//! - [`rough_wall_missing_height`] is complete except for one required
//!   field of one boundary.

use cfdcase_core::{BoundaryId, FaceSet, FieldValue, RegionId, ShapeRef, Unit, ZoneId};
use cfdcase_model::{BoundaryLayers, CaseModel, MeshSettings, RegionSettings};
use cfdcase_registry::{BoundaryType, Category, PorousDrag, SubType, ZoneKind};

/// A face set over the named shapes.
pub fn faces(names: &[&str]) -> FaceSet {
    FaceSet::new(names.iter().map(|n| ShapeRef::from(*n)))
}

fn mesh_settings() -> MeshSettings {
    MeshSettings {
        base_cell_size: 0.05,
        geometry: Some(ShapeRef::from("domain")),
        ..MeshSettings::default()
    }
}

/// IDs of the entities in [`valid_case`].
#[derive(Clone, Copy, Debug)]
pub struct ValidCase {
    pub inlet: BoundaryId,
    pub outlet: BoundaryId,
    pub walls: BoundaryId,
    pub filter: ZoneId,
    pub wake: RegionId,
}

/// A small duct: velocity inlet, static-pressure outlet, default walls,
/// one porous zone, and one refinement region with boundary layers.
pub fn valid_case() -> (CaseModel, ValidCase) {
    let mut case = CaseModel::default();
    case.set_mesh_settings(mesh_settings())
        .expect("fixture mesh settings are valid");

    let inlet = case
        .add_boundary_condition("inlet", faces(&["inlet_face"]), Category::Inlet)
        .expect("fixture names are unique")
        .value;
    case.set_field(
        inlet,
        "velocity",
        FieldValue::vector([2.0, 0.0, 0.0], Unit::MetrePerSecond),
    )
    .expect("velocity is active on a velocity inlet");

    let outlet = case
        .add_boundary_condition("outlet", faces(&["outlet_face"]), Category::Outlet)
        .expect("fixture names are unique")
        .value;
    case.set_variant(outlet, BoundaryType::Pressure, Some(SubType::Static))
        .expect("outlet/pressure/static is registered");

    let walls = case
        .add_boundary_condition("walls", faces(&[]), Category::Wall)
        .expect("fixture names are unique")
        .value;
    case.set_default_boundary(walls, true)
        .expect("no other default boundary");

    let filter = case
        .add_zone(
            "filter",
            ZoneKind::Porous(PorousDrag::PrincipalDirection),
            vec![ShapeRef::from("filter_box")],
        )
        .expect("fixture names are unique")
        .value;
    case.set_zone_field(
        filter,
        "darcy_coefficients",
        FieldValue::vector([1e6, 1e6, 1e6], Unit::PerSquareMetre),
    )
    .expect("darcy coefficients are active on principal-direction zones");

    let wake = case
        .add_region("wake", vec![ShapeRef::from("wake_box")])
        .expect("fixture names are unique")
        .value;
    case.set_region_settings(
        wake,
        RegionSettings {
            relative_size: 0.25,
            thickness: 0.01,
            boundary_layers: Some(BoundaryLayers::default()),
        },
    )
    .expect("fixture region settings are valid");

    (
        case,
        ValidCase {
            inlet,
            outlet,
            walls,
            filter,
            wake,
        },
    )
}

/// A case whose single boundary is a rough wall with no roughness height.
pub fn rough_wall_missing_height() -> (CaseModel, BoundaryId) {
    let mut case = CaseModel::default();
    case.set_mesh_settings(mesh_settings())
        .expect("fixture mesh settings are valid");
    let hull = case
        .add_boundary_condition("hull", faces(&["hull"]), Category::Wall)
        .expect("fixture names are unique")
        .value;
    case.set_type(hull, BoundaryType::Rough)
        .expect("rough is a wall type");
    (case, hull)
}
