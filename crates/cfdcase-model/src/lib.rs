//! Case model for cfdcase.
//!
//! The [`CaseModel`] aggregates the physics selection, boundary conditions,
//! zones, refinement regions and mesh settings of one simulation case.
//! Every mutation returns a [`StaleImplication`] naming the generated
//! artifacts it invalidated; the [`StalenessTracker`] folds those into the
//! flags that gate writing and running.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod boundary;
pub mod case;
pub mod mesh;
pub mod staleness;
pub mod zone;

pub use boundary::BoundaryCondition;
pub use case::{Applied, CaseModel, PARTNER_FIELD};
pub use mesh::{
    BoundaryLayers, Extrusion, ExtrusionKind, MeshSettings, MeshUtility, RefinementRegion,
    RegionSettings,
};
pub use staleness::{
    Artifact, CorrectiveAction, EditKind, EscalationTable, RunReadiness, StaleImplication,
    StaleKind, StaleStateConflict, StalenessTracker,
};
pub use zone::Zone;
