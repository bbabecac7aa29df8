//! # Per-batch Worker
//!
//! What one batch job does once Slurm starts it: set up the project's
//! run-card and generator directories, run the simulation executable, then run
//! any post-processing macros. The orchestrator reaches this code only through
//! the command line it writes into each batch descriptor
//! (`sim-batch run-batch ... --batch-index <i>`).

pub mod executable;
pub mod macros;
pub mod runcard;
pub mod runner;

use std::path::PathBuf;
use thiserror::Error;

pub use executable::{Executable, ExecutableInputs};
pub use runner::{BatchRunner, CommandRunner, ShellCommandRunner, WorkerReport};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorkerError {
    #[error("Executable '{0}' is not recognized")]
    UnknownExecutable(String),

    #[error("Missing parameters for {executable}: {}", .missing.join(", "))]
    MissingParameters {
        executable: String,
        missing: Vec<String>,
    },

    #[error("Run card {path} could not be read: {reason}")]
    RunCard { path: PathBuf, reason: String },

    #[error("Filesystem error at {path}: {reason}")]
    Io { path: PathBuf, reason: String },

    #[error("Command failed ({status}): {command}")]
    CommandFailed { command: String, status: String },

    #[error("Could not start command {command}: {reason}")]
    Spawn { command: String, reason: String },
}

impl WorkerError {
    pub fn io<P: Into<PathBuf>, E: std::fmt::Display>(path: P, error: E) -> Self {
        Self::Io {
            path: path.into(),
            reason: error.to_string(),
        }
    }
}

/// Arguments of one `run-batch` invocation
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerRequest {
    pub project_name: String,
    pub executable_name: String,
    pub run_card: Option<String>,
    pub events: Option<u64>,
    pub output_dir: PathBuf,
    /// Prepended as `<prefix>_` to the copied run card
    pub prefix: Option<String>,
    pub process_macros: Vec<String>,
    pub batch_index: Option<usize>,
    pub seed: Option<u64>,
    /// Directory holding `bin/`, `deps/`, `runcards/` and `macros/`
    pub base_dir: PathBuf,
}
