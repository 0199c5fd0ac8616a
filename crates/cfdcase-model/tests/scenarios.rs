//! Integration tests: boundary editing scenarios and staleness flow at the
//! model level.

use cfdcase_core::{FaceSet, FieldValue, PhysicsPatch, ShapeRef, Unit, ViscousModel};
use cfdcase_model::{
    Artifact, CaseModel, RegionSettings, StaleImplication, StaleKind, StalenessTracker,
};
use cfdcase_registry::{BoundaryRegistry, BoundaryType, Category};

const TURBULENCE: &[&str] = &[
    "turbulence_spec",
    "turbulence_intensity",
    "length_scale",
    "viscosity_ratio",
    "turbulent_kinetic_energy",
    "dissipation_rate",
    "specific_dissipation_rate",
    "transported_viscosity",
];

fn faces(name: &str) -> FaceSet {
    FaceSet::new([ShapeRef::from(name)])
}

fn active_names(model: &CaseModel, name: &str) -> Vec<&'static str> {
    let bc = model.boundary_by_name(name).unwrap();
    BoundaryRegistry::global()
        .active_fields(&bc.variant(), model.physics(), bc.values())
        .into_iter()
        .map(|s| s.name)
        .collect()
}

#[test]
fn no_slip_wall_has_no_fields_until_made_rough() {
    let mut model = CaseModel::default();
    let id = model
        .add_boundary_condition("hull", faces("hull"), Category::Wall)
        .unwrap()
        .value;
    assert_eq!(model.boundary(id).unwrap().ty(), BoundaryType::NoSlip);
    assert!(active_names(&model, "hull").is_empty());
    assert!(model.boundary(id).unwrap().values().is_empty());

    model.set_type(id, BoundaryType::Rough).unwrap();
    assert_eq!(
        active_names(&model, "hull"),
        vec!["roughness_height", "roughness_constant"]
    );
    let names: Vec<_> = model.boundary(id).unwrap().values().names().collect();
    assert_eq!(names, vec!["roughness_height", "roughness_constant"]);
}

#[test]
fn inviscid_flow_prunes_turbulence_fields_everywhere() {
    let mut model = CaseModel::default();
    let inlet = model
        .add_boundary_condition("inlet", faces("in"), Category::Inlet)
        .unwrap()
        .value;
    let far = model
        .add_boundary_condition("farfield", faces("far"), Category::Open)
        .unwrap()
        .value;
    model
        .set_field(
            inlet,
            "turbulence_intensity",
            FieldValue::scalar(5.0, Unit::Percent),
        )
        .unwrap();
    for id in [inlet, far] {
        assert!(model.boundary(id).unwrap().values().is_active("turbulence_spec"));
    }

    let implication = model
        .set_physics(&PhysicsPatch::default().viscous(ViscousModel::Inviscid))
        .unwrap();
    assert_eq!(implication, StaleImplication::CASE);
    assert_eq!(model.physics().turbulence, None);
    for bc in model.boundaries() {
        for name in bc.values().names() {
            assert!(!TURBULENCE.contains(&name), "{name} survived on {}", bc.name());
        }
    }
}

#[test]
fn mesh_write_then_region_edit_marks_mesh_stale() {
    let mut model = CaseModel::default();
    let mut tracker = StalenessTracker::new();
    let region = model.add_region("wake", vec![ShapeRef::from("wake_box")]).unwrap();
    tracker.mark(region.implication);
    assert!(tracker.mesh_stale());

    tracker.record_write(Artifact::MeshCase);
    assert!(!tracker.mesh_stale());
    assert!(tracker.mesher_must_rerun());

    let implication = model
        .set_region_settings(
            region.value,
            RegionSettings {
                relative_size: 0.25,
                ..RegionSettings::default()
            },
        )
        .unwrap();
    tracker.mark(implication);
    assert!(tracker.mesh_stale());
    assert!(!tracker.case_stale());
}

#[test]
fn solver_readiness_lists_every_conflict() {
    let mut tracker = StalenessTracker::new();
    let kinds: Vec<_> = tracker
        .solver_readiness()
        .conflicts()
        .iter()
        .map(|c| c.kind)
        .collect();
    assert_eq!(kinds, vec![StaleKind::MeshNeverWritten, StaleKind::CaseNeverWritten]);

    tracker.record_write(Artifact::MeshCase);
    tracker.record_write(Artifact::SolverCase);
    let kinds: Vec<_> = tracker
        .solver_readiness()
        .conflicts()
        .iter()
        .map(|c| c.kind)
        .collect();
    assert_eq!(kinds, vec![StaleKind::MesherMustRerun]);

    tracker.record_mesher_success();
    assert!(tracker.solver_readiness().is_ready());
}

#[test]
fn missing_required_value_is_the_only_solver_error() {
    let mut model = CaseModel::default();
    let id = model
        .add_boundary_condition("hull", faces("hull"), Category::Wall)
        .unwrap()
        .value;
    model.set_type(id, BoundaryType::Rough).unwrap();
    let errors = model.validate_solver_case().unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field(), Some("roughness_height"));
}
