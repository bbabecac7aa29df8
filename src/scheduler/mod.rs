//! # Scheduler Clients
//!
//! The narrow seam between the orchestrator and the cluster batch system.
//! A client receives the path of an already persisted descriptor and returns
//! the raw text the scheduler printed; interpreting that text is the job of
//! [`crate::orchestration::submitter::JobSubmitter`].
//!
//! Implementations:
//! - [`SbatchClient`] spawns `sbatch` (or a configured replacement)
//! - [`DryRunScheduler`] fabricates acceptance lines without a cluster

pub mod dry_run;
pub mod sbatch;

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

pub use dry_run::DryRunScheduler;
pub use sbatch::SbatchClient;

/// The submission primitive could not be invoked at all
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchedulerError {
    #[error("Failed to invoke {command}: {reason}")]
    Unavailable { command: String, reason: String },
}

#[async_trait]
pub trait SchedulerClient: Send + Sync {
    /// Submit the descriptor at `descriptor_path`, returning combined
    /// stdout and stderr of the submission call
    ///
    /// A rejected submission is still `Ok`: the rejection text is returned
    /// and fails the acceptance pattern downstream.
    async fn submit(&self, descriptor_path: &Path) -> Result<String, SchedulerError>;

    /// Human-readable client name for logs
    fn name(&self) -> &str;
}
