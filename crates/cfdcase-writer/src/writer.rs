//! Validated, atomic case writes.
//!
//! [`write_mesh_case`] and [`write_solver_case`] validate the model,
//! render it, swap the rendered tree into place, and only then record the
//! write on the [`StalenessTracker`]. A failed write leaves both the
//! directory and the tracker untouched.

use std::path::{Path, PathBuf};

use cfdcase_model::{Artifact, CaseModel, StalenessTracker};

use crate::atomic::replace_dir;
use crate::compare::{diff_tree, PlannedChange};
use crate::error::WriteError;
use crate::hash::fingerprint;
use crate::render::{render_mesh_case, render_solver_case, RenderedFile};

/// Which of the two generated cases.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CaseKind {
    /// The mesher input.
    Mesh,
    /// The solver input.
    Solver,
}

impl CaseKind {
    /// The tracker artifact this case corresponds to.
    pub fn artifact(self) -> Artifact {
        match self {
            Self::Mesh => Artifact::MeshCase,
            Self::Solver => Artifact::SolverCase,
        }
    }

    /// Validate `case` for this kind and render it.
    pub fn render(self, case: &CaseModel) -> Result<Vec<RenderedFile>, WriteError> {
        match self {
            Self::Mesh => {
                case.validate_mesh_case().map_err(WriteError::Validation)?;
                Ok(render_mesh_case(case))
            }
            Self::Solver => {
                case.validate_solver_case().map_err(WriteError::Validation)?;
                Ok(render_solver_case(case))
            }
        }
    }
}

/// What a successful write produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WrittenArtifacts {
    /// The case directory.
    pub root: PathBuf,
    /// Every file written, as absolute paths, in rendering order.
    pub files: Vec<PathBuf>,
    /// FNV-1a fingerprint of the rendered files.
    pub fingerprint: u64,
}

fn write_case(
    kind: CaseKind,
    case: &CaseModel,
    root: &Path,
    staleness: &mut StalenessTracker,
) -> Result<WrittenArtifacts, WriteError> {
    let files = kind.render(case).inspect_err(|e| {
        log::warn!("refusing to write {} case: {e}", kind.artifact());
    })?;
    replace_dir(root, &files)?;
    staleness.record_write(kind.artifact());
    let written = WrittenArtifacts {
        root: root.to_path_buf(),
        files: files.iter().map(|f| root.join(&f.path)).collect(),
        fingerprint: fingerprint(&files),
    };
    log::info!(
        "wrote {} ({} files, fingerprint {:#018x}) to {}",
        kind.artifact(),
        written.files.len(),
        written.fingerprint,
        root.display()
    );
    Ok(written)
}

/// Validate and write the mesh case into `root`, replacing its contents.
///
/// On success clears `mesh_stale` and sets `mesher_must_rerun`.
pub fn write_mesh_case(
    case: &CaseModel,
    root: &Path,
    staleness: &mut StalenessTracker,
) -> Result<WrittenArtifacts, WriteError> {
    write_case(CaseKind::Mesh, case, root, staleness)
}

/// Validate and write the solver case into `root`, replacing its contents.
///
/// On success clears `case_stale`. Validation problems are returned all
/// at once and nothing is written.
pub fn write_solver_case(
    case: &CaseModel,
    root: &Path,
    staleness: &mut StalenessTracker,
) -> Result<WrittenArtifacts, WriteError> {
    write_case(CaseKind::Solver, case, root, staleness)
}

/// The files a write of `kind` into `root` would create, modify, or delete.
pub fn plan_write(
    kind: CaseKind,
    case: &CaseModel,
    root: &Path,
) -> Result<Vec<PlannedChange>, WriteError> {
    let files = kind.render(case)?;
    diff_tree(&files, root)
}

/// Whether writing `kind` into `root` would change anything on disk.
pub fn would_change(kind: CaseKind, case: &CaseModel, root: &Path) -> Result<bool, WriteError> {
    Ok(!plan_write(kind, case, root)?.is_empty())
}
