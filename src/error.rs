//! Error types for batch orchestration.
//!
//! Submission failures are split by severity: a scheduler response that does
//! not match the acceptance pattern only shrinks the dependency set, while a
//! descriptor that cannot be written or a scheduler that cannot be invoked
//! aborts the run. Nothing already accepted by the scheduler is rolled back.

use crate::config::ConfigurationError;
use crate::models::JobIdentifier;
use crate::scheduler::SchedulerError;
use crate::state_machine::OrchestratorState;
use crate::worker::WorkerError;
use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single descriptor submission
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmissionError {
    /// Scheduler answered, but not with an acceptance line
    #[error("Scheduler output for {descriptor} did not match the acceptance pattern: {output:?}")]
    SubmissionParseError { descriptor: PathBuf, output: String },

    /// Descriptor could not be persisted before submission
    #[error("Failed to write job descriptor {path}: {reason}")]
    DescriptorWriteError { path: PathBuf, reason: String },

    /// The submission primitive itself could not be invoked
    #[error("Scheduler unavailable ({command}): {reason}")]
    SchedulerUnavailableError { command: String, reason: String },
}

impl SubmissionError {
    /// Whether this error must abort the remaining pipeline
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::SubmissionParseError { .. })
    }

    pub fn descriptor_write<P: Into<PathBuf>, E: std::fmt::Display>(path: P, error: E) -> Self {
        Self::DescriptorWriteError {
            path: path.into(),
            reason: error.to_string(),
        }
    }
}

impl From<SchedulerError> for SubmissionError {
    fn from(error: SchedulerError) -> Self {
        match error {
            SchedulerError::Unavailable { command, reason } => {
                Self::SchedulerUnavailableError { command, reason }
            }
        }
    }
}

/// Top-level error for an orchestration run
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// A fatal submission error stopped the run part-way; `accepted` jobs
    /// stay queued on the cluster
    #[error(
        "Aborted with {submitted} of {requested} batch jobs accepted (still queued: {}): {source}",
        join_ids(.accepted)
    )]
    Aborted {
        submitted: usize,
        requested: usize,
        accepted: Vec<JobIdentifier>,
        source: SubmissionError,
    },

    #[error("Invalid state transition from {from} to {to}")]
    StateTransitionError {
        from: OrchestratorState,
        to: OrchestratorState,
    },

    #[error("Project directory error for {path}: {reason}")]
    ProjectDirectory { path: PathBuf, reason: String },

    #[error("Project directory {path} already exists")]
    ProjectExists { path: PathBuf },

    #[error("Batch {index} was already tagged with job id {existing}")]
    AlreadySubmitted { index: usize, existing: String },

    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),
}

impl OrchestratorError {
    /// User-facing count of what was queued before a fatal abort
    pub fn partial_summary(&self, project: &str) -> Option<String> {
        match self {
            Self::Aborted {
                submitted,
                requested,
                accepted,
                ..
            } => Some(format!(
                "Submitted {submitted} of {requested} batch jobs for project {project} before aborting.\nStill queued: {}",
                join_ids(accepted)
            )),
            _ => None,
        }
    }

    pub fn project_directory<P: Into<PathBuf>, E: std::fmt::Display>(path: P, error: E) -> Self {
        Self::ProjectDirectory {
            path: path.into(),
            reason: error.to_string(),
        }
    }
}

fn join_ids(ids: &[JobIdentifier]) -> String {
    if ids.is_empty() {
        return "none".to_string();
    }
    ids.iter()
        .map(JobIdentifier::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_errors_are_not_fatal() {
        let err = SubmissionError::SubmissionParseError {
            descriptor: PathBuf::from("slurm/batch_0_demo.slurm"),
            output: "sbatch: error: invalid partition".to_string(),
        };
        assert!(!err.is_fatal());
    }

    #[test]
    fn write_and_scheduler_errors_are_fatal() {
        let write = SubmissionError::descriptor_write("slurm/x.slurm", "permission denied");
        assert!(write.is_fatal());

        let unavailable: SubmissionError = SchedulerError::Unavailable {
            command: "sbatch".to_string(),
            reason: "No such file or directory".to_string(),
        }
        .into();
        assert!(unavailable.is_fatal());
        assert!(unavailable.to_string().contains("sbatch"));
    }

    #[test]
    fn aborted_run_reports_queued_jobs() {
        let err = OrchestratorError::Aborted {
            submitted: 2,
            requested: 4,
            accepted: vec![JobIdentifier::new("11"), JobIdentifier::new("12")],
            source: SubmissionError::descriptor_write("slurm/batch_2_demo.slurm", "disk full"),
        };
        let message = err.to_string();
        assert!(message.starts_with("Aborted with 2 of 4 batch jobs accepted (still queued: 11, 12)"));
        assert!(message.contains("disk full"));
        assert!(std::error::Error::source(&err).is_some());

        let nothing_queued = OrchestratorError::Aborted {
            submitted: 0,
            requested: 3,
            accepted: Vec::new(),
            source: SubmissionError::descriptor_write("x", "denied"),
        };
        assert!(nothing_queued.to_string().contains("(still queued: none)"));

        assert_eq!(
            err.partial_summary("demo").unwrap(),
            "Submitted 2 of 4 batch jobs for project demo before aborting.\nStill queued: 11, 12"
        );
        let other = OrchestratorError::ProjectExists {
            path: PathBuf::from("out/demo"),
        };
        assert!(other.partial_summary("demo").is_none());
    }
}
