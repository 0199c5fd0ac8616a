//! Analysis configuration, validation, and error types.
//!
//! [`AnalysisConfig`] is the host-supplied input for constructing an
//! [`Analysis`](crate::Analysis). [`validate()`](AnalysisConfig::validate)
//! checks every structural invariant up front; nothing downstream
//! re-checks them.

use std::error::Error;
use std::fmt;
use std::path::{Component, Path, PathBuf};

use cfdcase_model::EscalationTable;
use serde::{Deserialize, Serialize};

// ── RunParameters ──────────────────────────────────────────────────

/// Parallel execution settings passed to the mesher and solver.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunParameters {
    /// Number of parallel processes. Default: 1. Minimum: 1.
    pub processes: u32,
    /// Threads per process. Default: 1. Minimum: 1.
    pub threads: u32,
    /// Hostfile for cluster runs. Only meaningful with more than one
    /// process.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostfile: Option<PathBuf>,
}

impl Default for RunParameters {
    fn default() -> Self {
        Self {
            processes: 1,
            threads: 1,
            hostfile: None,
        }
    }
}

impl RunParameters {
    /// Whether the run is distributed over several processes.
    pub fn is_parallel(&self) -> bool {
        self.processes > 1
    }

    /// Check the run parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.processes == 0 {
            return Err(ConfigError::NoProcesses);
        }
        if self.threads == 0 {
            return Err(ConfigError::NoThreads);
        }
        if let Some(hostfile) = &self.hostfile {
            if !self.is_parallel() {
                return Err(ConfigError::HostfileWithoutParallel {
                    hostfile: hostfile.clone(),
                });
            }
        }
        Ok(())
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`AnalysisConfig::validate()`].
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// A case directory name is empty or not a single path component.
    InvalidDirName {
        /// The rejected name.
        name: String,
    },
    /// The mesh case and solver case would share a directory.
    SharedCaseDir {
        /// The name used for both.
        name: String,
    },
    /// The output directory path is empty.
    EmptyOutputDir,
    /// Process count is zero.
    NoProcesses,
    /// Thread count is zero.
    NoThreads,
    /// A hostfile was given for a single-process run.
    HostfileWithoutParallel {
        /// The configured hostfile.
        hostfile: PathBuf,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDirName { name } => {
                write!(f, "case directory name {name:?} must be a single path component")
            }
            Self::SharedCaseDir { name } => {
                write!(f, "mesh case and solver case both use directory {name:?}")
            }
            Self::EmptyOutputDir => write!(f, "output directory must not be empty"),
            Self::NoProcesses => write!(f, "process count must be at least 1"),
            Self::NoThreads => write!(f, "thread count must be at least 1"),
            Self::HostfileWithoutParallel { hostfile } => write!(
                f,
                "hostfile {} requires more than one process",
                hostfile.display()
            ),
        }
    }
}

impl Error for ConfigError {}

// ── AnalysisConfig ─────────────────────────────────────────────────

/// Configuration of one analysis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Parent directory of both generated cases.
    pub output_dir: PathBuf,
    /// Mesh case directory under `output_dir`. Default: `meshCase`.
    pub mesh_case_dir_name: String,
    /// Solver case directory under `output_dir`. Default: `case`.
    pub solver_case_dir_name: String,
    /// Which edits mark which artifact stale.
    #[serde(default)]
    pub escalation: EscalationTable,
    /// Parallel execution settings.
    #[serde(default)]
    pub run: RunParameters,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self::new(".")
    }
}

impl AnalysisConfig {
    /// Default configuration writing under `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            mesh_case_dir_name: "meshCase".to_string(),
            solver_case_dir_name: "case".to_string(),
            escalation: EscalationTable::default(),
            run: RunParameters::default(),
        }
    }

    /// Where the mesh case is written.
    pub fn mesh_case_dir(&self) -> PathBuf {
        self.output_dir.join(&self.mesh_case_dir_name)
    }

    /// Where the solver case is written.
    pub fn solver_case_dir(&self) -> PathBuf {
        self.output_dir.join(&self.solver_case_dir_name)
    }

    /// Validate all structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. Output directory must name something.
        if self.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::EmptyOutputDir);
        }
        // 2. Each case directory is exactly one normal path component,
        //    so neither can escape `output_dir`.
        for name in [&self.mesh_case_dir_name, &self.solver_case_dir_name] {
            if !is_single_component(name) {
                return Err(ConfigError::InvalidDirName { name: name.clone() });
            }
        }
        // 3. The two cases are replaced wholesale on write, so they must
        //    not overlap.
        if self.mesh_case_dir_name == self.solver_case_dir_name {
            return Err(ConfigError::SharedCaseDir {
                name: self.mesh_case_dir_name.clone(),
            });
        }
        // 4. Run parameters.
        self.run.validate()
    }
}

fn is_single_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
