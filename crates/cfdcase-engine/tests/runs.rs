//! Integration tests: editing through the analysis, write/run gating, and
//! run outcomes reaching the staleness tracker.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

use cfdcase_core::{FaceSet, PhysicsPatch, ShapeRef, ViscousModel};
use cfdcase_engine::{
    Analysis, AnalysisConfig, Confirmation, LaunchRequest, ProcessLauncher, RunError, RunHandle,
    RunKind, RunOutcome,
};
use cfdcase_model::{RegionSettings, StaleKind};
use cfdcase_registry::{BoundaryRegistry, BoundaryType, Category};
use cfdcase_test_utils::valid_case;
use cfdcase_writer::WriteError;
use proptest::prelude::*;

// ── Scripted launcher ──────────────────────────────────────────────

/// Launcher that plays back scripted outcomes instead of starting
/// programs. A scripted `Cancelled` keeps the run alive until cancelled.
#[derive(Default)]
struct ScriptedLauncher {
    outcomes: RefCell<VecDeque<RunOutcome>>,
    requests: RefCell<Vec<LaunchRequest>>,
}

impl ScriptedLauncher {
    fn new(outcomes: impl IntoIterator<Item = RunOutcome>) -> Self {
        Self {
            outcomes: RefCell::new(outcomes.into_iter().collect()),
            requests: RefCell::default(),
        }
    }

    fn launched(&self) -> Vec<(RunKind, PathBuf)> {
        self.requests
            .borrow()
            .iter()
            .map(|r| (r.kind, r.case_dir.clone()))
            .collect()
    }
}

impl ProcessLauncher for ScriptedLauncher {
    fn launch(&self, request: &LaunchRequest) -> io::Result<RunHandle> {
        self.requests.borrow_mut().push(request.clone());
        let outcome = self
            .outcomes
            .borrow_mut()
            .pop_front()
            .unwrap_or(RunOutcome::Succeeded);
        RunHandle::spawn("scripted", move |cancel| {
            if outcome == RunOutcome::Cancelled {
                while !cancel.load(Ordering::Acquire) {
                    thread::sleep(Duration::from_millis(1));
                }
            }
            outcome
        })
    }
}

fn analysis_in(dir: &tempfile::TempDir) -> (Analysis, cfdcase_test_utils::ValidCase) {
    let (case, ids) = valid_case();
    let analysis = Analysis::with_case(AnalysisConfig::new(dir.path()), case).unwrap();
    (analysis, ids)
}

// ── Scenarios ──────────────────────────────────────────────────────

#[test]
fn rough_wall_gains_roughness_fields() {
    let mut analysis = Analysis::new(AnalysisConfig::new("unused")).unwrap();
    let hull = analysis
        .edit(|case| case.add_boundary_condition("hull", FaceSet::new(["hull"]), Category::Wall))
        .unwrap()
        .value;
    let active = |analysis: &Analysis| -> Vec<&'static str> {
        let bc = analysis.case().boundary(hull).unwrap();
        BoundaryRegistry::global()
            .active_fields(&bc.variant(), analysis.case().physics(), bc.values())
            .into_iter()
            .map(|s| s.name)
            .collect()
    };
    assert!(active(&analysis).is_empty());

    analysis
        .edit(|case| case.set_type(hull, BoundaryType::Rough))
        .unwrap();
    let fields = active(&analysis);
    assert!(fields.contains(&"roughness_height"));
    assert!(fields.contains(&"roughness_constant"));
    assert!(analysis.staleness().case_stale());
}

#[test]
fn inviscid_physics_prunes_turbulence_through_the_analysis() {
    let dir = tempfile::tempdir().unwrap();
    let (mut analysis, ids) = analysis_in(&dir);
    assert!(analysis
        .case()
        .boundary(ids.inlet)
        .unwrap()
        .values()
        .is_active("turbulence_spec"));

    analysis
        .edit(|case| case.set_physics(&PhysicsPatch::default().viscous(ViscousModel::Inviscid)))
        .unwrap();
    for bc in analysis.case().boundaries() {
        let names: Vec<_> = bc.values().names().collect();
        assert!(
            names.iter().all(|n| !n.starts_with("turbulen")),
            "{} still has {names:?}",
            bc.name()
        );
    }
    assert_eq!(analysis.staleness().flags(), (false, true, false));
}

#[test]
fn mesh_write_then_region_edit_marks_mesh_stale() {
    let dir = tempfile::tempdir().unwrap();
    let (mut analysis, ids) = analysis_in(&dir);
    analysis.write_mesh_case().unwrap();
    assert!(!analysis.staleness().mesh_stale());
    assert!(analysis.staleness().mesher_must_rerun());
    assert!(dir.path().join("meshCase/system/meshDict").is_file());

    let settings = RegionSettings {
        relative_size: 0.5,
        ..*analysis.case().region(ids.wake).unwrap().settings()
    };
    analysis
        .edit(|case| case.set_region_settings(ids.wake, settings))
        .unwrap();
    assert!(analysis.staleness().mesh_stale());
}

#[test]
fn removed_geometry_prunes_boundaries() {
    let dir = tempfile::tempdir().unwrap();
    let (mut analysis, ids) = analysis_in(&dir);
    let removed = analysis.geometry_changed(|shape| *shape != ShapeRef::from("outlet_face"));
    assert_eq!(removed, vec![ids.outlet]);
    assert!(analysis.case().boundary(ids.outlet).is_none());
    assert_eq!(analysis.staleness().flags(), (true, true, false));
}

// ── Run gating ─────────────────────────────────────────────────────

#[test]
fn full_pipeline_with_gating() {
    let dir = tempfile::tempdir().unwrap();
    let (mut analysis, _) = analysis_in(&dir);
    let launcher = ScriptedLauncher::default();

    match analysis.start_solver(&launcher, Confirmation::Ask) {
        Err(RunError::ConfirmationRequired(conflicts)) => {
            let kinds: Vec<_> = conflicts.iter().map(|c| c.kind).collect();
            assert_eq!(kinds, [StaleKind::MeshNeverWritten, StaleKind::CaseNeverWritten]);
        }
        other => panic!("expected ConfirmationRequired, got {other:?}"),
    }
    assert!(launcher.launched().is_empty());

    analysis.write_mesh_case().unwrap();
    assert!(analysis.check_run_mesher().is_ready());
    let mesher = analysis.start_mesher(&launcher, Confirmation::Ask).unwrap();
    assert_eq!(analysis.running(), Some(RunKind::Mesher));

    match analysis.start_solver(&launcher, Confirmation::Proceed) {
        Err(RunError::Busy { running }) => assert_eq!(running, RunKind::Mesher),
        other => panic!("expected Busy, got {other:?}"),
    }
    match analysis.write_solver_case() {
        Err(WriteError::Busy) => {}
        other => panic!("expected Busy, got {other:?}"),
    }

    assert_eq!(analysis.wait_for_run(mesher).unwrap(), RunOutcome::Succeeded);
    assert!(!analysis.is_busy());
    assert!(!analysis.staleness().mesher_must_rerun());

    analysis.write_solver_case().unwrap();
    assert!(analysis.check_run_solver().is_ready());
    let solver = analysis.start_solver(&launcher, Confirmation::Ask).unwrap();
    assert_eq!(analysis.wait_for_run(solver).unwrap(), RunOutcome::Succeeded);
    assert_eq!(analysis.staleness().flags(), (false, false, false));

    assert_eq!(
        launcher.launched(),
        vec![
            (RunKind::Mesher, dir.path().join("meshCase")),
            (RunKind::Solver, dir.path().join("case")),
        ]
    );
}

#[test]
fn failed_mesher_leaves_rerun_flag_set() {
    let dir = tempfile::tempdir().unwrap();
    let (mut analysis, _) = analysis_in(&dir);
    analysis.write_mesh_case().unwrap();
    let before = analysis.staleness().clone();

    let launcher = ScriptedLauncher::new([RunOutcome::Failed { code: Some(2) }]);
    let ticket = analysis.start_mesher(&launcher, Confirmation::Ask).unwrap();
    assert_eq!(
        analysis.wait_for_run(ticket).unwrap(),
        RunOutcome::Failed { code: Some(2) }
    );
    assert_eq!(analysis.staleness(), &before);
    assert!(analysis.staleness().mesher_must_rerun());
    assert!(!analysis.is_busy());
}

#[test]
fn cancelled_run_changes_nothing_and_frees_the_analysis() {
    let dir = tempfile::tempdir().unwrap();
    let (mut analysis, ids) = analysis_in(&dir);
    analysis.write_mesh_case().unwrap();

    let launcher = ScriptedLauncher::new([RunOutcome::Cancelled]);
    let mut ticket = analysis.start_mesher(&launcher, Confirmation::Ask).unwrap();
    assert_eq!(ticket.try_outcome(), None);

    // Edits stay possible while a run is active.
    analysis
        .edit(|case| case.set_extrusion(ids.wake, None))
        .unwrap();
    assert!(analysis.staleness().mesh_stale());
    let before = analysis.staleness().clone();

    ticket.cancel();
    assert_eq!(analysis.wait_for_run(ticket).unwrap(), RunOutcome::Cancelled);
    assert_eq!(analysis.staleness(), &before);
    assert!(analysis.staleness().mesher_must_rerun());
    assert!(analysis.write_mesh_case().is_ok());
}

#[test]
fn unfinished_run_cannot_be_completed() {
    let dir = tempfile::tempdir().unwrap();
    let (mut analysis, _) = analysis_in(&dir);
    analysis.write_mesh_case().unwrap();

    let launcher = ScriptedLauncher::new([RunOutcome::Cancelled]);
    let ticket = analysis.start_mesher(&launcher, Confirmation::Ask).unwrap();
    let ticket = match analysis.complete_run(ticket) {
        Err(ticket) => ticket,
        other => panic!("expected the ticket back, got {other:?}"),
    };
    assert!(analysis.is_busy());
    assert!(analysis.staleness().mesher_must_rerun());
    match analysis.start_mesher(&launcher, Confirmation::Proceed) {
        Err(RunError::Busy { running }) => assert_eq!(running, RunKind::Mesher),
        other => panic!("expected Busy, got {other:?}"),
    }

    assert_eq!(analysis.cancel_run(ticket).unwrap(), RunOutcome::Cancelled);
    assert!(analysis.staleness().mesher_must_rerun());
    assert!(!analysis.is_busy());
}

#[test]
fn dropped_ticket_releases_the_analysis() {
    let dir = tempfile::tempdir().unwrap();
    let (mut analysis, _) = analysis_in(&dir);
    analysis.write_mesh_case().unwrap();
    let before = analysis.staleness().clone();

    let launcher = ScriptedLauncher::new([RunOutcome::Cancelled, RunOutcome::Succeeded]);
    let ticket = analysis.start_mesher(&launcher, Confirmation::Ask).unwrap();
    assert!(analysis.is_busy());
    drop(ticket);

    assert_eq!(analysis.running(), None);
    assert_eq!(analysis.staleness(), &before);
    analysis.write_mesh_case().unwrap();
    let ticket = analysis.start_mesher(&launcher, Confirmation::Ask).unwrap();
    assert_eq!(analysis.wait_for_run(ticket).unwrap(), RunOutcome::Succeeded);
    assert!(!analysis.staleness().mesher_must_rerun());
}

#[test]
fn proceed_overrides_stale_state() {
    let dir = tempfile::tempdir().unwrap();
    let (mut analysis, _) = analysis_in(&dir);
    analysis.write_mesh_case().unwrap();
    analysis.write_solver_case().unwrap();
    assert!(!analysis.check_run_solver().is_ready());

    let launcher = ScriptedLauncher::default();
    let ticket = analysis
        .start_solver(&launcher, Confirmation::Proceed)
        .unwrap();
    assert_eq!(ticket.kind(), RunKind::Solver);
    analysis.wait_for_run(ticket).unwrap();
    assert!(analysis.staleness().mesher_must_rerun());
}

proptest! {
    #[test]
    fn unsuccessful_runs_never_touch_the_tracker(
        code in proptest::option::of(1i32..255),
        cancelled in any::<bool>(),
        mesher in any::<bool>(),
    ) {
        let dir = tempfile::tempdir().unwrap();
        let (mut analysis, _) = analysis_in(&dir);
        analysis.write_mesh_case().unwrap();
        let before = analysis.staleness().clone();

        let outcome = if cancelled { RunOutcome::Cancelled } else { RunOutcome::Failed { code } };
        let launcher = ScriptedLauncher::new([outcome]);
        let ticket = if mesher {
            analysis.start_mesher(&launcher, Confirmation::Proceed)
        } else {
            analysis.start_solver(&launcher, Confirmation::Proceed)
        }
        .unwrap();
        ticket.cancel();
        prop_assert_eq!(analysis.wait_for_run(ticket).unwrap(), outcome);
        prop_assert_eq!(analysis.staleness(), &before);
        prop_assert!(!analysis.is_busy());
    }
}
