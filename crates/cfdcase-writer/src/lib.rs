//! Case serialization for cfdcase.
//!
//! Turns a validated [`CaseModel`](cfdcase_model::CaseModel) into the
//! solver's dictionary files and writes them atomically.
//!
//! # Architecture
//!
//! - [`dict`] emits the dictionary syntax
//! - [`render`] maps the model onto files, in memory
//! - [`atomic`] swaps a rendered tree into place
//! - [`compare`] diffs a rendering against what is on disk
//! - [`writer`] ties validation, rendering, writing, and staleness together
//!
//! # Layout
//!
//! ```text
//! <mesh case>/system/meshDict
//! <solver case>/constant/physicsProperties
//! <solver case>/system/boundaryConditions
//! <solver case>/system/zones
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod atomic;
pub mod compare;
pub mod dict;
pub mod error;
pub mod hash;
pub mod render;
pub mod writer;

pub use compare::{ChangeKind, PlannedChange};
pub use error::WriteError;
pub use hash::fingerprint;
pub use render::{render_mesh_case, render_solver_case, RenderedFile};
pub use writer::{
    plan_write, would_change, write_mesh_case, write_solver_case, CaseKind, WrittenArtifacts,
};
