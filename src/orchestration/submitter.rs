//! # Job Submitter
//!
//! Persists a descriptor at its deterministic path, hands the path to the
//! scheduler client and extracts the job id from whatever the scheduler
//! printed. Descriptor files stay on disk whatever the outcome, which leaves
//! an audit trail of everything that was attempted.

use crate::config::{default_acceptance_regex, ConfigResult, SchedulerConfig};
use crate::error::SubmissionError;
use crate::models::{JobDescriptor, JobIdentifier};
use crate::scheduler::SchedulerClient;
use regex::Regex;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct JobSubmitter {
    scheduler: Arc<dyn SchedulerClient>,
    acceptance: Regex,
}

impl std::fmt::Debug for JobSubmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobSubmitter")
            .field("scheduler", &self.scheduler.name())
            .field("acceptance", &self.acceptance.as_str())
            .finish()
    }
}

impl JobSubmitter {
    /// Submitter using the built-in acceptance pattern
    pub fn new(scheduler: Arc<dyn SchedulerClient>) -> Self {
        Self {
            scheduler,
            acceptance: default_acceptance_regex().clone(),
        }
    }

    /// Submitter using the configured acceptance pattern
    pub fn from_config(
        scheduler: Arc<dyn SchedulerClient>,
        config: &SchedulerConfig,
    ) -> ConfigResult<Self> {
        Ok(Self {
            scheduler,
            acceptance: config.acceptance_regex()?,
        })
    }

    pub fn scheduler_name(&self) -> &str {
        self.scheduler.name()
    }

    /// Write `descriptor` to `path`, submit it, and return the scheduler id
    ///
    /// `SubmissionParseError` means the scheduler answered without accepting;
    /// the other variants are fatal to a run.
    pub async fn submit(
        &self,
        descriptor: &JobDescriptor,
        path: &Path,
    ) -> Result<JobIdentifier, SubmissionError> {
        Self::persist(descriptor, path).await?;

        let output = self.scheduler.submit(path).await?;
        debug!(
            descriptor = %path.display(),
            scheduler = %self.scheduler.name(),
            output = %output.trim(),
            "Scheduler responded"
        );

        match self.parse_output(&output) {
            Some(id) => Ok(id),
            None => {
                warn!(
                    descriptor = %path.display(),
                    output = %output.trim(),
                    "Scheduler output did not contain an acceptance line"
                );
                Err(SubmissionError::SubmissionParseError {
                    descriptor: path.to_path_buf(),
                    output,
                })
            }
        }
    }

    /// Extract the identifier from raw scheduler output
    pub fn parse_output(&self, output: &str) -> Option<JobIdentifier> {
        self.acceptance
            .captures(output)
            .and_then(|captures| captures.get(1))
            .map(|id| JobIdentifier::new(id.as_str()))
    }

    async fn persist(descriptor: &JobDescriptor, path: &Path) -> Result<(), SubmissionError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SubmissionError::descriptor_write(path, e))?;
        }
        tokio::fs::write(path, descriptor.render())
            .await
            .map_err(|e| SubmissionError::descriptor_write(path, e))
    }
}
