//! The analysis container.
//!
//! An [`Analysis`] owns one [`CaseModel`], its [`StalenessTracker`], and
//! its [`AnalysisConfig`]. Every edit goes through [`Analysis::edit`] so
//! the tracker is marked in the same step as the model changes. At most
//! one external run is active at a time; while it is, writes and further
//! runs are refused.

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use cfdcase_core::{BoundaryId, ShapeRef};
use cfdcase_model::{
    Applied, CaseModel, RunReadiness, StaleImplication, StaleStateConflict, StalenessTracker,
};
use cfdcase_writer::{
    plan_write, would_change, write_mesh_case, write_solver_case, CaseKind, PlannedChange,
    WriteError, WrittenArtifacts,
};

use crate::config::{AnalysisConfig, ConfigError};
use crate::launcher::{LaunchRequest, ProcessLauncher, RunHandle, RunKind, RunOutcome};

/// Run tickets are unique across every analysis in the process.
static NEXT_RUN_ID: AtomicU64 = AtomicU64::new(1);

// ── Edits ──────────────────────────────────────────────────────────

/// The result of a case model mutation, carrying what it made stale.
pub trait Implies {
    /// Which artifacts the edit made stale.
    fn implication(&self) -> StaleImplication;
}

impl Implies for StaleImplication {
    fn implication(&self) -> StaleImplication {
        *self
    }
}

impl<T> Implies for Applied<T> {
    fn implication(&self) -> StaleImplication {
        self.implication
    }
}

// ── RunError ───────────────────────────────────────────────────────

/// Whether a run may start over stale-state conflicts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Confirmation {
    /// Refuse and report the conflicts so the caller can ask the user.
    Ask,
    /// The user has already agreed to run anyway.
    Proceed,
}

/// Errors from starting an external run.
#[derive(Debug)]
pub enum RunError {
    /// Another run is still active on this analysis.
    Busy {
        /// The run in progress.
        running: RunKind,
    },
    /// Generated artifacts are stale or missing; retry with
    /// [`Confirmation::Proceed`] or fix them first.
    ConfirmationRequired(Vec<StaleStateConflict>),
    /// The external program could not be started.
    Launch(io::Error),
    /// The configured run parameters are invalid.
    InvalidParameters(ConfigError),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy { running } => write!(f, "the {running} is still running"),
            Self::ConfirmationRequired(conflicts) => {
                write!(f, "confirmation required:")?;
                for conflict in conflicts {
                    write!(f, "\n  {conflict}")?;
                }
                Ok(())
            }
            Self::Launch(e) => write!(f, "launch failed: {e}"),
            Self::InvalidParameters(e) => write!(f, "invalid run parameters: {e}"),
        }
    }
}

impl Error for RunError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Launch(e) => Some(e),
            Self::InvalidParameters(e) => Some(e),
            _ => None,
        }
    }
}

// ── RunTicket ──────────────────────────────────────────────────────

#[derive(Clone, Debug)]
struct ActiveRun {
    id: u64,
    kind: RunKind,
    /// Dead once the ticket is dropped.
    ticket: Weak<()>,
}

impl ActiveRun {
    fn abandoned(&self) -> bool {
        self.ticket.strong_count() == 0
    }
}

/// Proof of a started run.
///
/// Handing the ticket back to [`Analysis::complete_run`] consumes it, so
/// each run's outcome reaches the tracker at most once. Dropping an
/// unfinished ticket cancels the run and waits for it to stop; the
/// analysis then treats it as cancelled.
#[derive(Debug)]
pub struct RunTicket {
    id: u64,
    kind: RunKind,
    handle: RunHandle,
    _live: Arc<()>,
}

impl RunTicket {
    /// Which program is running.
    pub fn kind(&self) -> RunKind {
        self.kind
    }

    /// Ask the program to stop.
    pub fn cancel(&self) {
        self.handle.cancel();
    }

    /// The outcome, if the run has finished.
    pub fn try_outcome(&mut self) -> Option<RunOutcome> {
        self.handle.try_outcome()
    }

    /// Block until the run finishes.
    pub fn wait(&mut self) -> RunOutcome {
        self.handle.wait()
    }
}

// ── Analysis ───────────────────────────────────────────────────────

/// One analysis: a case model, its staleness, and where it is written.
#[derive(Debug)]
pub struct Analysis {
    pub(crate) case: CaseModel,
    pub(crate) staleness: StalenessTracker,
    pub(crate) config: AnalysisConfig,
    active: Option<ActiveRun>,
}

impl Analysis {
    /// An empty analysis.
    pub fn new(config: AnalysisConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let case = CaseModel::new(config.escalation.clone());
        Ok(Self::from_parts(case, StalenessTracker::new(), config))
    }

    /// Adopt an existing model. Nothing is considered written.
    pub fn with_case(config: AnalysisConfig, mut case: CaseModel) -> Result<Self, ConfigError> {
        config.validate()?;
        case.set_escalation(config.escalation.clone());
        Ok(Self::from_parts(case, StalenessTracker::new(), config))
    }

    pub(crate) fn from_parts(
        case: CaseModel,
        staleness: StalenessTracker,
        config: AnalysisConfig,
    ) -> Self {
        Self {
            case,
            staleness,
            config,
            active: None,
        }
    }

    /// The case model.
    pub fn case(&self) -> &CaseModel {
        &self.case
    }

    /// The staleness of generated artifacts.
    pub fn staleness(&self) -> &StalenessTracker {
        &self.staleness
    }

    /// The configuration.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Replace the configuration. The escalation table applies to
    /// subsequent edits only.
    pub fn set_config(&mut self, config: AnalysisConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.case.set_escalation(config.escalation.clone());
        self.config = config;
        Ok(())
    }

    /// The run in progress, if any.
    pub fn running(&self) -> Option<RunKind> {
        self.live_run().map(|run| run.kind)
    }

    /// Whether an external run is in progress.
    pub fn is_busy(&self) -> bool {
        self.live_run().is_some()
    }

    fn live_run(&self) -> Option<&ActiveRun> {
        self.active.as_ref().filter(|run| !run.abandoned())
    }

    /// Release a run whose ticket was dropped without being completed.
    fn release_abandoned(&mut self) {
        if let Some(run) = self.active.take_if(|run| run.abandoned()) {
            log::warn!(
                "{} run {} was dropped before completion; treating it as cancelled",
                run.kind,
                run.id
            );
        }
    }

    /// Where the artifact of `kind` is written.
    pub fn case_dir(&self, kind: CaseKind) -> PathBuf {
        match kind {
            CaseKind::Mesh => self.config.mesh_case_dir(),
            CaseKind::Solver => self.config.solver_case_dir(),
        }
    }

    // ── Editing ────────────────────────────────────────────────────

    /// Apply one case model operation and mark the tracker with what it
    /// made stale. A rejected operation changes neither.
    ///
    /// ```ignore
    /// analysis.edit(|case| case.set_type(id, BoundaryType::Rough))?;
    /// ```
    pub fn edit<R, E>(&mut self, op: impl FnOnce(&mut CaseModel) -> Result<R, E>) -> Result<R, E>
    where
        R: Implies,
    {
        let out = op(&mut self.case)?;
        self.staleness.mark(out.implication());
        Ok(out)
    }

    /// The referenced geometry changed. Drops references to shapes for
    /// which `exists` is false and returns the boundaries removed because
    /// none of their faces remain.
    pub fn geometry_changed(&mut self, exists: impl Fn(&ShapeRef) -> bool) -> Vec<BoundaryId> {
        let pruned = self.case.prune_shapes(exists);
        let implication = pruned.implication.union(self.case.geometry_changed());
        self.staleness.mark(implication);
        if !pruned.value.is_empty() {
            log::info!(
                "removed {} boundary condition(s) left without faces",
                pruned.value.len()
            );
        }
        pruned.value
    }

    // ── Writing ────────────────────────────────────────────────────

    fn ensure_idle(&mut self, what: &str) -> Result<(), WriteError> {
        self.release_abandoned();
        match &self.active {
            Some(run) => {
                log::warn!("refusing to write {what} while the {} is running", run.kind);
                Err(WriteError::Busy)
            }
            None => Ok(()),
        }
    }

    /// Validate and write the mesh case.
    pub fn write_mesh_case(&mut self) -> Result<WrittenArtifacts, WriteError> {
        self.ensure_idle("mesh case")?;
        write_mesh_case(&self.case, &self.config.mesh_case_dir(), &mut self.staleness)
    }

    /// Validate and write the solver case.
    pub fn write_solver_case(&mut self) -> Result<WrittenArtifacts, WriteError> {
        self.ensure_idle("solver case")?;
        write_solver_case(&self.case, &self.config.solver_case_dir(), &mut self.staleness)
    }

    /// What writing `kind` now would change, without writing.
    pub fn plan_write(&self, kind: CaseKind) -> Result<Vec<PlannedChange>, WriteError> {
        plan_write(kind, &self.case, &self.case_dir(kind))
    }

    /// Whether writing `kind` now would change anything on disk.
    pub fn would_change(&self, kind: CaseKind) -> Result<bool, WriteError> {
        would_change(kind, &self.case, &self.case_dir(kind))
    }

    // ── Running ────────────────────────────────────────────────────

    /// Whether the mesher may run without confirmation.
    pub fn check_run_mesher(&self) -> RunReadiness {
        self.staleness.mesher_readiness()
    }

    /// Whether the solver may run without confirmation.
    pub fn check_run_solver(&self) -> RunReadiness {
        self.staleness.solver_readiness()
    }

    /// Start the mesher on the written mesh case.
    pub fn start_mesher(
        &mut self,
        launcher: &dyn ProcessLauncher,
        confirmation: Confirmation,
    ) -> Result<RunTicket, RunError> {
        self.start_run(RunKind::Mesher, launcher, confirmation)
    }

    /// Start the solver on the written solver case.
    pub fn start_solver(
        &mut self,
        launcher: &dyn ProcessLauncher,
        confirmation: Confirmation,
    ) -> Result<RunTicket, RunError> {
        self.start_run(RunKind::Solver, launcher, confirmation)
    }

    fn start_run(
        &mut self,
        kind: RunKind,
        launcher: &dyn ProcessLauncher,
        confirmation: Confirmation,
    ) -> Result<RunTicket, RunError> {
        self.release_abandoned();
        if let Some(run) = &self.active {
            log::warn!("refusing to start the {kind} while the {} is running", run.kind);
            return Err(RunError::Busy { running: run.kind });
        }
        self.config
            .run
            .validate()
            .map_err(RunError::InvalidParameters)?;

        let (readiness, case_kind) = match kind {
            RunKind::Mesher => (self.check_run_mesher(), CaseKind::Mesh),
            RunKind::Solver => (self.check_run_solver(), CaseKind::Solver),
        };
        if let RunReadiness::ConfirmationRequired(conflicts) = readiness {
            match confirmation {
                Confirmation::Ask => return Err(RunError::ConfirmationRequired(conflicts)),
                Confirmation::Proceed => log::warn!(
                    "starting the {kind} despite {} stale-state conflict(s)",
                    conflicts.len()
                ),
            }
        }

        let request = LaunchRequest {
            kind,
            case_dir: self.case_dir(case_kind),
            run: self.config.run.clone(),
        };
        let handle = launcher.launch(&request).map_err(|e| {
            log::warn!("could not start the {kind}: {e}");
            RunError::Launch(e)
        })?;
        let id = NEXT_RUN_ID.fetch_add(1, Ordering::Relaxed);
        let live = Arc::new(());
        self.active = Some(ActiveRun {
            id,
            kind,
            ticket: Arc::downgrade(&live),
        });
        log::info!("{kind} run {id} started in {}", request.case_dir.display());
        Ok(RunTicket {
            id,
            kind,
            handle,
            _live: live,
        })
    }

    /// Record how a finished run ended and release the busy flag.
    ///
    /// The outcome is read from the run itself. A successful mesher run
    /// clears `mesher_must_rerun`; a failed or cancelled run leaves the
    /// tracker as it was. A run that has not finished yet, or a ticket
    /// that does not belong to this analysis's active run, is handed back
    /// unrecorded and the analysis stays as it was.
    pub fn complete_run(&mut self, mut ticket: RunTicket) -> Result<RunOutcome, RunTicket> {
        let kind = ticket.kind;
        if !matches!(&self.active, Some(run) if run.id == ticket.id) {
            log::warn!("{kind} run {} is not active on this analysis", ticket.id);
            return Err(ticket);
        }
        let Some(outcome) = ticket.try_outcome() else {
            return Err(ticket);
        };
        self.active = None;
        match outcome {
            RunOutcome::Succeeded => {
                log::info!("{kind} run {} succeeded", ticket.id);
                if kind == RunKind::Mesher {
                    self.staleness.record_mesher_success();
                }
            }
            RunOutcome::Failed { .. } | RunOutcome::Cancelled => {
                log::warn!("{kind} run {} {outcome}", ticket.id);
            }
        }
        Ok(outcome)
    }

    /// Block until the run behind `ticket` finishes, then record it.
    ///
    /// A ticket from another analysis is handed back once its run has
    /// finished, still unrecorded.
    pub fn wait_for_run(&mut self, mut ticket: RunTicket) -> Result<RunOutcome, RunTicket> {
        ticket.wait();
        self.complete_run(ticket)
    }

    /// Cancel the run behind `ticket`, wait for it to stop, and record it.
    ///
    /// The outcome is `Cancelled` unless the run had already finished.
    pub fn cancel_run(&mut self, ticket: RunTicket) -> Result<RunOutcome, RunTicket> {
        ticket.cancel();
        self.wait_for_run(ticket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfdcase_core::FaceSet;
    use cfdcase_registry::Category;

    struct Immediate(RunOutcome);

    impl ProcessLauncher for Immediate {
        fn launch(&self, _: &LaunchRequest) -> io::Result<RunHandle> {
            let outcome = self.0;
            RunHandle::spawn("immediate", move |_| outcome)
        }
    }

    struct Broken;

    impl ProcessLauncher for Broken {
        fn launch(&self, _: &LaunchRequest) -> io::Result<RunHandle> {
            Err(io::Error::new(io::ErrorKind::NotFound, "no such program"))
        }
    }

    fn analysis() -> Analysis {
        Analysis::new(AnalysisConfig::new("unused")).unwrap()
    }

    #[test]
    fn edit_marks_tracker_only_on_success() {
        let mut a = analysis();
        let added = a
            .edit(|case| case.add_boundary_condition("inlet", FaceSet::default(), Category::Inlet))
            .unwrap();
        assert_eq!(a.staleness().flags(), (true, true, false));

        let mut fresh = analysis();
        let rejected = fresh.edit(|case| {
            case.add_boundary_condition("bad name", FaceSet::default(), Category::Inlet)
        });
        assert!(rejected.is_err());
        assert_eq!(fresh.staleness().flags(), (false, false, false));
        assert!(a.case().boundary(added.value).is_some());
    }

    #[test]
    fn ticket_from_another_analysis_is_ignored() {
        let mut a = analysis();
        let mut b = analysis();
        let launcher = Immediate(RunOutcome::Succeeded);
        let ticket_a = a.start_mesher(&launcher, Confirmation::Proceed).unwrap();
        let ticket_b = b.start_mesher(&launcher, Confirmation::Proceed).unwrap();

        let ticket_a = match b.wait_for_run(ticket_a) {
            Err(ticket) => ticket,
            other => panic!("expected the ticket back, got {other:?}"),
        };
        assert!(b.is_busy());
        assert_eq!(b.wait_for_run(ticket_b).unwrap(), RunOutcome::Succeeded);
        assert!(!b.is_busy());
        assert!(a.is_busy());
        assert_eq!(a.complete_run(ticket_a).unwrap(), RunOutcome::Succeeded);
        assert!(!a.is_busy());
    }

    #[test]
    fn launch_failure_leaves_analysis_idle() {
        let mut a = analysis();
        match a.start_solver(&Broken, Confirmation::Proceed) {
            Err(RunError::Launch(e)) => assert_eq!(e.kind(), io::ErrorKind::NotFound),
            other => panic!("expected Launch, got {other:?}"),
        }
        assert!(!a.is_busy());
    }

    #[test]
    fn invalid_run_parameters_block_the_run() {
        let mut a = analysis();
        a.config.run.processes = 0;
        match a.start_mesher(&Immediate(RunOutcome::Succeeded), Confirmation::Proceed) {
            Err(RunError::InvalidParameters(ConfigError::NoProcesses)) => {}
            other => panic!("expected InvalidParameters, got {other:?}"),
        }
    }
}
