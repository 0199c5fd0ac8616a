//! Integration tests: saving and restoring an analysis.

use cfdcase_core::{FaceSet, ValidationError};
use cfdcase_engine::{Analysis, AnalysisConfig, DocumentError, FORMAT_VERSION};
use cfdcase_model::{EditKind, StaleImplication};
use cfdcase_registry::Category;
use cfdcase_test_utils::valid_case;
use serde_json::{json, Value};

fn saved_analysis() -> (Analysis, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let (case, _) = valid_case();
    let mut config = AnalysisConfig::new(dir.path());
    config.escalation = config
        .escalation
        .with(EditKind::BoundaryRenamed, StaleImplication::CASE);
    config.run.processes = 4;
    let mut analysis = Analysis::with_case(config, case).unwrap();
    analysis.write_mesh_case().unwrap();
    (analysis, dir)
}

fn tamper(json: &str, edit: impl FnOnce(&mut Value)) -> String {
    let mut doc: Value = serde_json::from_str(json).unwrap();
    edit(&mut doc);
    serde_json::to_string(&doc).unwrap()
}

#[test]
fn round_trip_is_lossless() {
    let (analysis, _dir) = saved_analysis();
    let json = analysis.to_json().unwrap();
    let restored = Analysis::from_json(&json).unwrap();

    assert_eq!(restored.to_json().unwrap(), json);
    assert_eq!(restored.staleness(), analysis.staleness());
    assert_eq!(restored.config(), analysis.config());
    assert_eq!(restored.case(), analysis.case());
    let names: Vec<_> = restored.case().boundaries().map(|b| b.name()).collect();
    assert_eq!(names, ["inlet", "outlet", "walls"]);
    assert!(!restored.is_busy());
}

#[test]
fn restored_escalation_table_applies_to_new_edits() {
    let (analysis, _dir) = saved_analysis();
    let mut restored = Analysis::from_json(&analysis.to_json().unwrap()).unwrap();
    let inlet = restored.case().boundary_by_name("inlet").unwrap().id();
    let implication = restored
        .edit(|case| case.rename_boundary(inlet, "intake"))
        .unwrap();
    assert_eq!(implication, StaleImplication::CASE);
    assert!(!restored.staleness().mesh_stale());
}

#[test]
fn restored_ids_do_not_collide() {
    let (analysis, _dir) = saved_analysis();
    let mut restored = Analysis::from_json(&analysis.to_json().unwrap()).unwrap();
    let existing: Vec<_> = restored.case().boundaries().map(|b| b.id()).collect();
    let added = restored
        .edit(|case| case.add_boundary_condition("side", FaceSet::new(["side"]), Category::Wall))
        .unwrap()
        .value;
    assert!(!existing.contains(&added));
}

#[test]
fn stored_values_are_reconciled() {
    let (analysis, _dir) = saved_analysis();
    let json = tamper(&analysis.to_json().unwrap(), |doc| {
        let values = doc["case"]["boundaries"][0]["values"].as_object_mut().unwrap();
        values.remove("velocity_spec");
        values.insert("bogus".to_string(), json!(null));
    });
    let restored = Analysis::from_json(&json).unwrap();
    let inlet = restored.case().boundary_by_name("inlet").unwrap();
    assert!(inlet.values().is_active("velocity_spec"));
    assert!(!inlet.values().is_active("bogus"));
    assert!(inlet.values().is_set("velocity"));
}

#[test]
fn unregistered_variant_is_rejected() {
    let (analysis, _dir) = saved_analysis();
    let json = tamper(&analysis.to_json().unwrap(), |doc| {
        doc["case"]["boundaries"][0]["variant"]["type"] = json!("Symmetry");
    });
    match Analysis::from_json(&json) {
        Err(DocumentError::Json(_)) => {}
        other => panic!("expected Json, got {other:?}"),
    }
}

#[test]
fn inconsistent_physics_is_rejected() {
    let (analysis, _dir) = saved_analysis();
    let json = tamper(&analysis.to_json().unwrap(), |doc| {
        doc["case"]["physics"]["viscous"] = json!("Les");
    });
    match Analysis::from_json(&json) {
        Err(DocumentError::Invalid(_)) => {}
        other => panic!("expected Invalid, got {other:?}"),
    }
}

#[test]
fn largest_stored_id_is_rejected() {
    let (analysis, _dir) = saved_analysis();
    let json = tamper(&analysis.to_json().unwrap(), |doc| {
        doc["case"]["boundaries"][0]["id"] = json!(u32::MAX);
    });
    match Analysis::from_json(&json) {
        Err(DocumentError::Invalid(ValidationError::IdsExhausted { collection })) => {
            assert_eq!(collection, "boundary")
        }
        other => panic!("expected Invalid, got {other:?}"),
    }
}

#[test]
fn invalid_config_is_rejected() {
    let (analysis, _dir) = saved_analysis();
    let json = tamper(&analysis.to_json().unwrap(), |doc| {
        doc["config"]["run"]["processes"] = json!(0);
    });
    match Analysis::from_json(&json) {
        Err(DocumentError::Config(_)) => {}
        other => panic!("expected Config, got {other:?}"),
    }
}

#[test]
fn other_versions_are_rejected() {
    let (analysis, _dir) = saved_analysis();
    let json = tamper(&analysis.to_json().unwrap(), |doc| {
        doc["format_version"] = json!(FORMAT_VERSION + 1);
    });
    match Analysis::from_json(&json) {
        Err(DocumentError::UnsupportedVersion { found }) => assert_eq!(found, FORMAT_VERSION + 1),
        other => panic!("expected UnsupportedVersion, got {other:?}"),
    }
}

#[test]
fn garbage_is_a_json_error() {
    match Analysis::from_json("not json") {
        Err(DocumentError::Json(_)) => {}
        other => panic!("expected Json, got {other:?}"),
    }
}
