//! External process boundary for the mesher and solver.
//!
//! A [`ProcessLauncher`] turns a [`LaunchRequest`] into a running
//! [`RunHandle`]. Each handle owns a monitor thread that reports exactly
//! one [`RunOutcome`] over a crossbeam channel. Cancellation is
//! cooperative: [`RunHandle::cancel`] raises a flag the monitor polls.

use std::fmt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, TryRecvError};
use serde::{Deserialize, Serialize};

use crate::config::RunParameters;

/// How often a monitor checks its child and the cancel flag.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

// ── Requests and outcomes ──────────────────────────────────────────

/// Which external program a run invokes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunKind {
    /// The mesh generator, run in the mesh case directory.
    Mesher,
    /// The flow solver, run in the solver case directory.
    Solver,
}

impl fmt::Display for RunKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mesher => f.write_str("mesher"),
            Self::Solver => f.write_str("solver"),
        }
    }
}

/// Everything an external program is given.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaunchRequest {
    /// Which program.
    pub kind: RunKind,
    /// The written case directory it runs against.
    pub case_dir: PathBuf,
    /// Parallel execution settings.
    pub run: RunParameters,
}

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// Exited with status zero.
    Succeeded,
    /// Exited unsuccessfully. `code` is `None` when the process was
    /// killed by a signal or its monitor was lost.
    Failed {
        /// Exit code, if any.
        code: Option<i32>,
    },
    /// Stopped at the user's request.
    Cancelled,
}

impl RunOutcome {
    /// Whether the run succeeded.
    pub fn is_success(self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded => f.write_str("succeeded"),
            Self::Failed { code: Some(code) } => write!(f, "failed with exit code {code}"),
            Self::Failed { code: None } => f.write_str("failed"),
            Self::Cancelled => f.write_str("cancelled"),
        }
    }
}

// ── RunHandle ──────────────────────────────────────────────────────

/// A running external program.
///
/// Dropping an unfinished handle cancels the run and waits for its
/// monitor to stop, so the program is gone once the handle is.
pub struct RunHandle {
    outcome_rx: Receiver<RunOutcome>,
    cancel: Arc<AtomicBool>,
    monitor: Option<JoinHandle<()>>,
    outcome: Option<RunOutcome>,
}

impl RunHandle {
    /// Run `monitor` on its own thread and deliver its result.
    ///
    /// The closure receives the cancel flag and must return promptly once
    /// it is raised. A monitor that panics is reported as
    /// `Failed { code: None }`.
    pub fn spawn<F>(name: &str, monitor: F) -> io::Result<Self>
    where
        F: FnOnce(&AtomicBool) -> RunOutcome + Send + 'static,
    {
        let (tx, outcome_rx) = crossbeam_channel::bounded(1);
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);
        let monitor = thread::Builder::new()
            .name(format!("cfdcase-{name}"))
            .spawn(move || {
                let outcome = monitor(&flag);
                // Receiver may already be gone if the handle was dropped.
                let _ = tx.send(outcome);
            })?;
        Ok(Self {
            outcome_rx,
            cancel,
            monitor: Some(monitor),
            outcome: None,
        })
    }

    /// Ask the program to stop. The outcome will be `Cancelled` unless it
    /// had already finished.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Release);
    }

    /// The outcome, if the run has finished.
    pub fn try_outcome(&mut self) -> Option<RunOutcome> {
        if self.outcome.is_none() {
            match self.outcome_rx.try_recv() {
                Ok(outcome) => self.finish(outcome),
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => self.finish(RunOutcome::Failed { code: None }),
            }
        }
        self.outcome
    }

    /// Block until the run finishes.
    pub fn wait(&mut self) -> RunOutcome {
        if let Some(outcome) = self.outcome {
            return outcome;
        }
        let outcome = self
            .outcome_rx
            .recv()
            .unwrap_or(RunOutcome::Failed { code: None });
        self.finish(outcome);
        outcome
    }

    fn finish(&mut self, outcome: RunOutcome) {
        self.outcome = Some(outcome);
        if let Some(monitor) = self.monitor.take() {
            if monitor.join().is_err() {
                log::warn!("run monitor thread panicked");
            }
        }
    }
}

impl Drop for RunHandle {
    fn drop(&mut self) {
        if self.outcome.is_none() {
            self.cancel();
            if let Some(monitor) = self.monitor.take() {
                if monitor.join().is_err() {
                    log::warn!("run monitor thread panicked");
                }
            }
        }
    }
}

impl fmt::Debug for RunHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunHandle")
            .field("cancel_requested", &self.cancel.load(Ordering::Acquire))
            .field("outcome", &self.outcome)
            .finish()
    }
}

// ── Launchers ──────────────────────────────────────────────────────

/// Starts external programs.
pub trait ProcessLauncher {
    /// Start the program described by `request`.
    ///
    /// Returns once the program is running; its completion is reported
    /// through the handle.
    fn launch(&self, request: &LaunchRequest) -> io::Result<RunHandle>;
}

/// Launches real executables with `std::process`.
///
/// Serial runs execute the program directly in the case directory.
/// Parallel runs go through the MPI launcher as
/// `mpirun -np N [--hostfile H] <program> -parallel`. The thread count is
/// passed as `OMP_NUM_THREADS`. Output goes to `log.<program>` in the case
/// directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandLauncher {
    /// Mesher executable.
    pub mesher: PathBuf,
    /// Solver executable.
    pub solver: PathBuf,
    /// MPI launcher used for parallel runs. Default: `mpirun`.
    pub mpi_launcher: PathBuf,
}

impl CommandLauncher {
    /// A launcher for the given executables.
    pub fn new(mesher: impl Into<PathBuf>, solver: impl Into<PathBuf>) -> Self {
        Self {
            mesher: mesher.into(),
            solver: solver.into(),
            mpi_launcher: PathBuf::from("mpirun"),
        }
    }

    fn program(&self, kind: RunKind) -> &Path {
        match kind {
            RunKind::Mesher => &self.mesher,
            RunKind::Solver => &self.solver,
        }
    }

    /// The command line for `request`, without output redirection.
    pub fn command(&self, request: &LaunchRequest) -> Command {
        let program = self.program(request.kind);
        let mut cmd = if request.run.is_parallel() {
            let mut cmd = Command::new(&self.mpi_launcher);
            cmd.arg("-np").arg(request.run.processes.to_string());
            if let Some(hostfile) = &request.run.hostfile {
                cmd.arg("--hostfile").arg(hostfile);
            }
            cmd.arg(program).arg("-parallel");
            cmd
        } else {
            Command::new(program)
        };
        cmd.current_dir(&request.case_dir)
            .env("OMP_NUM_THREADS", request.run.threads.to_string())
            .stdin(Stdio::null());
        cmd
    }

    fn log_path(&self, request: &LaunchRequest) -> PathBuf {
        let stem = self
            .program(request.kind)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| request.kind.to_string());
        request.case_dir.join(format!("log.{stem}"))
    }
}

impl ProcessLauncher for CommandLauncher {
    fn launch(&self, request: &LaunchRequest) -> io::Result<RunHandle> {
        let log_file = File::create(self.log_path(request))?;
        let mut cmd = self.command(request);
        cmd.stdout(log_file.try_clone()?).stderr(log_file);
        let child = cmd.spawn()?;
        log::info!(
            "started {} (pid {}) in {}",
            request.kind,
            child.id(),
            request.case_dir.display()
        );
        RunHandle::spawn(&request.kind.to_string(), move |cancel| monitor_child(child, cancel))
    }
}

fn monitor_child(mut child: Child, cancel: &AtomicBool) -> RunOutcome {
    loop {
        match child.try_wait() {
            Ok(Some(status)) if status.success() => return RunOutcome::Succeeded,
            Ok(Some(status)) => return RunOutcome::Failed { code: status.code() },
            Ok(None) => {}
            Err(e) => {
                log::warn!("lost track of child process {}: {e}", child.id());
                return RunOutcome::Failed { code: None };
            }
        }
        if cancel.load(Ordering::Acquire) {
            if let Err(e) = child.kill() {
                log::warn!("could not stop child process {}: {e}", child.id());
            }
            // Reap the child so it does not linger as a zombie.
            let _ = child.wait();
            return RunOutcome::Cancelled;
        }
        thread::sleep(POLL_INTERVAL);
    }
}
