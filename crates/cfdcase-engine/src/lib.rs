//! Analysis orchestration for cfdcase.
//!
//! An [`Analysis`] ties a case model to its staleness tracker, its
//! on-disk locations, and the external mesher and solver.
//!
//! # Architecture
//!
//! - [`config`] holds [`AnalysisConfig`] and its validation
//! - [`analysis`] is the container: edits, writes, run gating
//! - [`launcher`] is the process boundary: [`ProcessLauncher`],
//!   [`RunHandle`], and the `std::process` based [`CommandLauncher`]
//! - [`document`] saves and restores an analysis as JSON
//!
//! # Runs
//!
//! ```text
//! check_run_* ──► start_* ──► RunTicket ──► wait / try_outcome
//!                                  │
//!                                  ▼
//!                       complete_run / cancel_run ──► StalenessTracker
//! ```
//!
//! Only one run may be active per analysis. Writes are refused while it
//! is, so an external program never sees a case directory change under it.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod analysis;
pub mod config;
pub mod document;
pub mod launcher;

pub use analysis::{Analysis, Confirmation, Implies, RunError, RunTicket};
pub use config::{AnalysisConfig, ConfigError, RunParameters};
pub use document::{DocumentError, FORMAT_VERSION};
pub use launcher::{
    CommandLauncher, LaunchRequest, ProcessLauncher, RunHandle, RunKind, RunOutcome,
};
