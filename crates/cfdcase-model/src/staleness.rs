//! Staleness of generated artifacts relative to the case model.
//!
//! Three independent flags record whether the written mesh case and
//! solver case still match the model, and whether the mesher has to be
//! run again before the solver may use the mesh. Edits only ever set
//! flags; a successful write or mesher run only ever clears the flag(s)
//! it is defined to clear.
//!
//! Which edit marks which artifact stale is data, not code: see
//! [`EscalationTable`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

// ── Edits and their implications ───────────────────────────────────

/// Classification of a case model mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum EditKind {
    Geometry,
    MeshSettings,
    RefinementRegionAdded,
    RefinementRegionRemoved,
    RefinementRegionEdited,
    ExtrusionEdited,
    BoundaryAdded,
    BoundaryRemoved,
    BoundaryFaceSetChanged,
    BoundaryVariantChanged,
    BoundaryFieldEdited,
    BoundaryRenamed,
    ZoneAdded,
    ZoneRemoved,
    ZoneShapeChanged,
    ZoneRenamed,
    ZoneFieldEdited,
    PhysicsChanged,
}

impl EditKind {
    /// Every edit kind.
    pub const ALL: [EditKind; 18] = [
        Self::Geometry,
        Self::MeshSettings,
        Self::RefinementRegionAdded,
        Self::RefinementRegionRemoved,
        Self::RefinementRegionEdited,
        Self::ExtrusionEdited,
        Self::BoundaryAdded,
        Self::BoundaryRemoved,
        Self::BoundaryFaceSetChanged,
        Self::BoundaryVariantChanged,
        Self::BoundaryFieldEdited,
        Self::BoundaryRenamed,
        Self::ZoneAdded,
        Self::ZoneRemoved,
        Self::ZoneShapeChanged,
        Self::ZoneRenamed,
        Self::ZoneFieldEdited,
        Self::PhysicsChanged,
    ];

    /// The built-in implication of this edit.
    pub fn default_implication(self) -> StaleImplication {
        match self {
            Self::Geometry | Self::MeshSettings | Self::RefinementRegionEdited => {
                StaleImplication::MESH
            }
            Self::RefinementRegionAdded
            | Self::RefinementRegionRemoved
            | Self::ExtrusionEdited
            | Self::BoundaryAdded
            | Self::BoundaryRemoved
            | Self::BoundaryFaceSetChanged
            | Self::BoundaryRenamed
            | Self::ZoneAdded
            | Self::ZoneRemoved
            | Self::ZoneShapeChanged
            | Self::ZoneRenamed => StaleImplication::BOTH,
            Self::BoundaryVariantChanged
            | Self::BoundaryFieldEdited
            | Self::ZoneFieldEdited
            | Self::PhysicsChanged => StaleImplication::CASE,
        }
    }
}

/// Which artifacts an edit makes stale.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StaleImplication {
    /// The mesh case no longer matches the model.
    pub mesh: bool,
    /// The solver case no longer matches the model.
    pub case: bool,
}

impl StaleImplication {
    /// Nothing becomes stale.
    pub const NONE: Self = Self {
        mesh: false,
        case: false,
    };
    /// Only the mesh case becomes stale.
    pub const MESH: Self = Self {
        mesh: true,
        case: false,
    };
    /// Only the solver case becomes stale.
    pub const CASE: Self = Self {
        mesh: false,
        case: true,
    };
    /// Both artifacts become stale.
    pub const BOTH: Self = Self {
        mesh: true,
        case: true,
    };

    /// Combine two implications.
    pub fn union(self, other: Self) -> Self {
        Self {
            mesh: self.mesh || other.mesh,
            case: self.case || other.case,
        }
    }

    /// Whether nothing becomes stale.
    pub fn is_none(self) -> bool {
        !self.mesh && !self.case
    }
}

/// Configurable mapping from [`EditKind`] to [`StaleImplication`].
///
/// Only overrides are stored; every other kind uses
/// [`EditKind::default_implication`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EscalationTable {
    overrides: IndexMap<EditKind, StaleImplication>,
}

impl EscalationTable {
    /// The built-in table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the implication of one edit kind.
    pub fn with(mut self, kind: EditKind, implication: StaleImplication) -> Self {
        self.set(kind, implication);
        self
    }

    /// Override the implication of one edit kind in place.
    pub fn set(&mut self, kind: EditKind, implication: StaleImplication) {
        if implication == kind.default_implication() {
            self.overrides.shift_remove(&kind);
        } else {
            self.overrides.insert(kind, implication);
        }
    }

    /// What an edit of this kind makes stale.
    pub fn implication(&self, kind: EditKind) -> StaleImplication {
        self.overrides
            .get(&kind)
            .copied()
            .unwrap_or_else(|| kind.default_implication())
    }

    /// Whether the table differs from the built-in one.
    pub fn is_default(&self) -> bool {
        self.overrides.is_empty()
    }
}

// ── Tracker ────────────────────────────────────────────────────────

/// The artifacts the tracker follows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Artifact {
    /// The mesher input case.
    MeshCase,
    /// The solver input case.
    SolverCase,
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MeshCase => f.write_str("mesh case"),
            Self::SolverCase => f.write_str("solver case"),
        }
    }
}

/// Consistency of generated artifacts with the model.
///
/// All flags start false. The separate `*_written` markers distinguish
/// "never generated" from "generated and still current", so a freshly
/// created analysis is not stale but is not ready to run either.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StalenessTracker {
    mesh_stale: bool,
    case_stale: bool,
    mesher_must_rerun: bool,
    mesh_written: bool,
    case_written: bool,
}

impl StalenessTracker {
    /// A tracker for a model with nothing generated yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// The written mesh case no longer matches the model.
    pub fn mesh_stale(&self) -> bool {
        self.mesh_stale
    }

    /// The written solver case no longer matches the model.
    pub fn case_stale(&self) -> bool {
        self.case_stale
    }

    /// The mesh case was rewritten since the mesher last succeeded.
    pub fn mesher_must_rerun(&self) -> bool {
        self.mesher_must_rerun
    }

    /// A mesh case has been written at least once.
    pub fn mesh_written(&self) -> bool {
        self.mesh_written
    }

    /// A solver case has been written at least once.
    pub fn case_written(&self) -> bool {
        self.case_written
    }

    /// The three flags as `(mesh_stale, case_stale, mesher_must_rerun)`.
    pub fn flags(&self) -> (bool, bool, bool) {
        (self.mesh_stale, self.case_stale, self.mesher_must_rerun)
    }

    /// Record an edit. Only ever sets flags.
    pub fn mark(&mut self, implication: StaleImplication) {
        if implication.mesh && !self.mesh_stale {
            log::debug!("mesh case marked stale");
            self.mesh_stale = true;
        }
        if implication.case && !self.case_stale {
            log::debug!("solver case marked stale");
            self.case_stale = true;
        }
    }

    /// Record a successful write of `artifact`.
    ///
    /// A mesh write clears `mesh_stale` and obsoletes the previously run
    /// mesh, so it sets `mesher_must_rerun`. A solver case write clears
    /// `case_stale`.
    pub fn record_write(&mut self, artifact: Artifact) {
        match artifact {
            Artifact::MeshCase => {
                self.mesh_stale = false;
                self.mesh_written = true;
                self.mesher_must_rerun = true;
            }
            Artifact::SolverCase => {
                self.case_stale = false;
                self.case_written = true;
            }
        }
        log::debug!("{artifact} written; flags now {:?}", self.flags());
    }

    /// Record a successful mesher run.
    pub fn record_mesher_success(&mut self) {
        self.mesher_must_rerun = false;
        log::debug!("mesher succeeded; flags now {:?}", self.flags());
    }

    /// Whether the mesher may run without confirmation.
    pub fn mesher_readiness(&self) -> RunReadiness {
        let mut conflicts = Vec::new();
        self.push_mesh_conflicts(&mut conflicts);
        RunReadiness::from_conflicts(conflicts)
    }

    /// Whether the solver may run without confirmation.
    pub fn solver_readiness(&self) -> RunReadiness {
        let mut conflicts = Vec::new();
        self.push_mesh_conflicts(&mut conflicts);
        if self.mesher_must_rerun {
            conflicts.push(StaleStateConflict::new(
                StaleKind::MesherMustRerun,
                CorrectiveAction::RunMesher,
            ));
        }
        if !self.case_written {
            conflicts.push(StaleStateConflict::new(
                StaleKind::CaseNeverWritten,
                CorrectiveAction::WriteSolverCase,
            ));
        } else if self.case_stale {
            conflicts.push(StaleStateConflict::new(
                StaleKind::CaseStale,
                CorrectiveAction::WriteSolverCase,
            ));
        }
        RunReadiness::from_conflicts(conflicts)
    }

    fn push_mesh_conflicts(&self, conflicts: &mut Vec<StaleStateConflict>) {
        if !self.mesh_written {
            conflicts.push(StaleStateConflict::new(
                StaleKind::MeshNeverWritten,
                CorrectiveAction::WriteMeshCase,
            ));
        } else if self.mesh_stale {
            conflicts.push(StaleStateConflict::new(
                StaleKind::MeshStale,
                CorrectiveAction::WriteMeshCase,
            ));
        }
    }
}

// ── Confirmation requests ──────────────────────────────────────────

/// Why a run needs confirmation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StaleKind {
    /// No mesh case has been written yet.
    MeshNeverWritten,
    /// The mesh case is out of date.
    MeshStale,
    /// The mesh case was rewritten but the mesher has not run since.
    MesherMustRerun,
    /// No solver case has been written yet.
    CaseNeverWritten,
    /// The solver case is out of date.
    CaseStale,
}

impl fmt::Display for StaleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::MeshNeverWritten => "the mesh case has not been written",
            Self::MeshStale => "the mesh case is out of date",
            Self::MesherMustRerun => "the mesh needs to be regenerated",
            Self::CaseNeverWritten => "the solver case has not been written",
            Self::CaseStale => "the solver case is out of date",
        };
        f.write_str(msg)
    }
}

/// What the user should do first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CorrectiveAction {
    /// Write the mesh case.
    WriteMeshCase,
    /// Run the mesher.
    RunMesher,
    /// Write the solver case.
    WriteSolverCase,
}

impl fmt::Display for CorrectiveAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WriteMeshCase => f.write_str("write the mesh case"),
            Self::RunMesher => f.write_str("run the mesher"),
            Self::WriteSolverCase => f.write_str("write the solver case"),
        }
    }
}

/// One reason a run request needs the user's confirmation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StaleStateConflict {
    /// The stale condition.
    pub kind: StaleKind,
    /// The recommended fix.
    pub action: CorrectiveAction,
}

impl StaleStateConflict {
    /// Build a conflict.
    pub fn new(kind: StaleKind, action: CorrectiveAction) -> Self {
        Self { kind, action }
    }
}

impl fmt::Display for StaleStateConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}; {} first", self.kind, self.action)
    }
}

/// Result of asking whether a run may start.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunReadiness {
    /// Nothing is stale.
    Ready,
    /// The caller should ask the user before proceeding.
    ConfirmationRequired(Vec<StaleStateConflict>),
}

impl RunReadiness {
    fn from_conflicts(conflicts: Vec<StaleStateConflict>) -> Self {
        if conflicts.is_empty() {
            Self::Ready
        } else {
            Self::ConfirmationRequired(conflicts)
        }
    }

    /// Whether the run may start without confirmation.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// The conflicts, empty when ready.
    pub fn conflicts(&self) -> &[StaleStateConflict] {
        match self {
            Self::Ready => &[],
            Self::ConfirmationRequired(c) => c,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_tracker_is_clean_but_not_ready() {
        let t = StalenessTracker::new();
        assert_eq!(t.flags(), (false, false, false));
        let kinds: Vec<_> = t.solver_readiness().conflicts().iter().map(|c| c.kind).collect();
        assert_eq!(kinds, [StaleKind::MeshNeverWritten, StaleKind::CaseNeverWritten]);
    }

    #[test]
    fn mesh_write_requires_mesher_rerun() {
        let mut t = StalenessTracker::new();
        t.mark(StaleImplication::BOTH);
        t.record_write(Artifact::MeshCase);
        assert_eq!(t.flags(), (false, true, true));
        assert!(t.mesher_readiness().is_ready());

        t.record_mesher_success();
        t.record_write(Artifact::SolverCase);
        assert_eq!(t.flags(), (false, false, false));
        assert!(t.solver_readiness().is_ready());
    }

    #[test]
    fn solver_readiness_lists_every_conflict_with_its_fix() {
        let mut t = StalenessTracker::new();
        t.record_write(Artifact::MeshCase);
        t.record_write(Artifact::SolverCase);
        t.mark(StaleImplication::CASE);
        match t.solver_readiness() {
            RunReadiness::ConfirmationRequired(conflicts) => assert_eq!(
                conflicts,
                [
                    StaleStateConflict::new(StaleKind::MesherMustRerun, CorrectiveAction::RunMesher),
                    StaleStateConflict::new(StaleKind::CaseStale, CorrectiveAction::WriteSolverCase),
                ]
            ),
            other => panic!("expected ConfirmationRequired, got {other:?}"),
        }
    }

    #[test]
    fn escalation_overrides_and_resets() {
        let table = EscalationTable::new()
            .with(EditKind::BoundaryFaceSetChanged, StaleImplication::CASE);
        assert_eq!(
            table.implication(EditKind::BoundaryFaceSetChanged),
            StaleImplication::CASE
        );
        assert_eq!(table.implication(EditKind::Geometry), StaleImplication::MESH);
        let table = table.with(
            EditKind::BoundaryFaceSetChanged,
            EditKind::BoundaryFaceSetChanged.default_implication(),
        );
        assert!(table.is_default());
    }

    #[test]
    fn default_table_marks_something_for_every_edit() {
        for kind in EditKind::ALL {
            assert!(!kind.default_implication().is_none(), "{kind:?}");
        }
    }
}
