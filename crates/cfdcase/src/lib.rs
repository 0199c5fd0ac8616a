//! cfdcase: typed configuration, validation, and case generation for CFD
//! analyses.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all cfdcase sub-crates. For most users, adding `cfdcase` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use cfdcase::prelude::*;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let mut analysis = Analysis::new(AnalysisConfig::new(dir.path())).unwrap();
//!
//! // A velocity inlet and a pressure outlet.
//! let inlet = analysis
//!     .edit(|case| case.add_boundary_condition("inlet", FaceSet::new(["in"]), Category::Inlet))
//!     .unwrap()
//!     .value;
//! analysis
//!     .edit(|case| {
//!         let velocity = FieldValue::vector([2.0, 0.0, 0.0], Unit::MetrePerSecond);
//!         case.set_field(inlet, "velocity", velocity)
//!     })
//!     .unwrap();
//! analysis
//!     .edit(|case| case.add_boundary_condition("outlet", FaceSet::new(["out"]), Category::Outlet))
//!     .unwrap();
//! assert!(analysis.staleness().case_stale());
//!
//! // Writing clears the flag; the solver still needs a mesh first.
//! analysis.write_solver_case().unwrap();
//! assert!(!analysis.staleness().case_stale());
//! assert!(!analysis.check_run_solver().is_ready());
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `cfdcase-core` | IDs, units, field schemas and values, physics selection, errors |
//! | [`registry`] | `cfdcase-registry` | Boundary and zone catalogues, variant resolution |
//! | [`model`] | `cfdcase-model` | Case model, zones, refinement regions, staleness tracking |
//! | [`writer`] | `cfdcase-writer` | Dictionary rendering, atomic writes, dry runs |
//! | [`engine`] | `cfdcase-engine` | Analysis container, process boundary, persistence |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types (`cfdcase-core`).
///
/// Units and quantities, [`types::FieldSchema`] and [`types::FieldValues`],
/// the [`types::PhysicsModel`] selector, and the validation error types.
pub use cfdcase_core as types;

/// Boundary and zone catalogues (`cfdcase-registry`).
///
/// [`registry::BoundaryRegistry`] resolves `(category, type, sub-type)`
/// triples and lists their field schemas; [`registry::ZoneRegistry`] does
/// the same for zones.
pub use cfdcase_registry as registry;

/// Case model and staleness tracking (`cfdcase-model`).
pub use cfdcase_model as model;

/// Case serialization (`cfdcase-writer`).
///
/// Render with [`writer::render_solver_case`], write atomically with
/// [`writer::write_solver_case`], or preview with [`writer::plan_write`].
pub use cfdcase_writer as writer;

/// Analysis orchestration (`cfdcase-engine`).
pub use cfdcase_engine as engine;

/// Common imports for typical cfdcase usage.
///
/// ```rust
/// use cfdcase::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use cfdcase_core::{
        BoundaryId, FaceSet, FieldValue, FlowRegime, PhaseModel, PhysicsPatch, RegionId,
        RotatingFrame, ShapeRef, TimeDependence, TurbulenceModel, Unit, ViscousModel, ZoneId,
    };

    // Errors
    pub use cfdcase_core::{SchemaError, ValidationError};

    // Catalogues
    pub use cfdcase_registry::{BoundaryType, Category, PorousDrag, SubType, ZoneKind};

    // Model
    pub use cfdcase_model::{
        CaseModel, EditKind, EscalationTable, Extrusion, ExtrusionKind, MeshSettings,
        RegionSettings, RunReadiness, StaleImplication, StalenessTracker,
    };

    // Writer
    pub use cfdcase_writer::{CaseKind, WriteError};

    // Engine
    pub use cfdcase_engine::{
        Analysis, AnalysisConfig, CommandLauncher, Confirmation, DocumentError, ProcessLauncher,
        RunError, RunKind, RunOutcome, RunParameters,
    };
}
