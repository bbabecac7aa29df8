//! Result types reported by an orchestration run.

use super::dependency::DependencyExpression;
use crate::models::JobIdentifier;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// What happened to one batch submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub index: usize,
    pub descriptor_path: PathBuf,
    pub job_id: Option<JobIdentifier>,
    /// Scheduler output when the submission was not accepted
    pub rejection: Option<String>,
}

impl BatchOutcome {
    pub fn is_accepted(&self) -> bool {
        self.job_id.is_some()
    }
}

/// Result of the single merge submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum MergeOutcome {
    Accepted { job_id: JobIdentifier },
    /// Scheduler answered without an acceptance line
    Unconfirmed { output: String },
}

/// Summary of one run, printed by the CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationSummary {
    pub project: String,
    pub requested: usize,
    pub batches: Vec<BatchOutcome>,
    pub dependency: DependencyExpression,
    pub merge_descriptor: PathBuf,
    pub merge: MergeOutcome,
}

impl OrchestrationSummary {
    pub fn submitted(&self) -> usize {
        self.batches.iter().filter(|b| b.is_accepted()).count()
    }

    pub fn failed_indices(&self) -> Vec<usize> {
        self.batches
            .iter()
            .filter(|b| !b.is_accepted())
            .map(|b| b.index)
            .collect()
    }

    pub fn descriptor_paths(&self) -> Vec<PathBuf> {
        self.batches
            .iter()
            .map(|b| b.descriptor_path.clone())
            .chain(std::iter::once(self.merge_descriptor.clone()))
            .collect()
    }
}

impl fmt::Display for OrchestrationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Submitted {} of {} batch jobs for project {}.",
            self.submitted(),
            self.requested,
            self.project
        )?;
        let failed = self.failed_indices();
        if !failed.is_empty() {
            let list = failed
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(f, "Batches not accepted by the scheduler: {list}")?;
        }
        if self.dependency.is_degenerate() {
            writeln!(f, "Warning: merge job has no upstream dependency.")?;
        }
        match &self.merge {
            MergeOutcome::Accepted { job_id } => write!(
                f,
                "Submitted final merge job {job_id} for project {} ({}).",
                self.project, self.dependency
            ),
            MergeOutcome::Unconfirmed { output } => write!(
                f,
                "Merge job for project {} was not confirmed by the scheduler: {}",
                self.project,
                output.trim()
            ),
        }
    }
}
