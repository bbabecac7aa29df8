//! # Orchestrator
//!
//! Sequences one fan-out/fan-in run:
//!
//! 1. generate and submit batch `i` for `i in 0..N`, collecting the ids of
//!    accepted jobs
//! 2. build the `afterok` dependency from whatever was collected
//! 3. generate and submit the merge job once
//!
//! Every submission is awaited before the next descriptor is generated.
//! Rejected batches shrink the dependency set; a descriptor write failure or an
//! unavailable scheduler aborts immediately with
//! [`OrchestratorError::Aborted`], which lists the jobs already accepted and
//! left on the cluster.
//!
//! ```rust,no_run
//! use sim_batch::config::OrchestrationConfig;
//! use sim_batch::orchestration::Orchestrator;
//! use sim_batch::scheduler::SbatchClient;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = OrchestrationConfig {
//!     project_name: "rho_plus".to_string(),
//!     executable_name: "clasdis".to_string(),
//!     run_card: Some("clasdis.txt".to_string()),
//!     events: Some(5_000),
//!     num_batches: 10,
//!     ..Default::default()
//! };
//! let scheduler = Arc::new(SbatchClient::from_config(&config.scheduler));
//! let mut orchestrator = Orchestrator::new(config, scheduler)?;
//! let summary = orchestrator.run().await?;
//! println!("{summary}");
//! # Ok(())
//! # }
//! ```

use super::batch_descriptor::BatchDescriptorGenerator;
use super::dependency::{DependencyExpression, DependencyGraphBuilder};
use super::merge_descriptor::MergeJobGenerator;
use super::submitter::JobSubmitter;
use super::types::{BatchOutcome, MergeOutcome, OrchestrationSummary};
use crate::config::OrchestrationConfig;
use crate::error::{OrchestratorError, Result, SubmissionError};
use crate::layout::ProjectLayout;
use crate::logging::{log_error, log_submission_operation};
use crate::models::{BatchJob, CollectedIdentifiers, JobIdentifier};
use crate::scheduler::SchedulerClient;
use crate::state_machine::{OrchestratorState, OrchestratorStateMachine};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub struct Orchestrator {
    config: Arc<OrchestrationConfig>,
    batch_generator: BatchDescriptorGenerator,
    merge_generator: MergeJobGenerator,
    submitter: JobSubmitter,
    state: OrchestratorStateMachine,
}

impl Orchestrator {
    /// Validates the configuration; nothing is written or submitted yet
    pub fn new(config: OrchestrationConfig, scheduler: Arc<dyn SchedulerClient>) -> Result<Self> {
        let config = Arc::new(config);
        let batch_generator = BatchDescriptorGenerator::new(Arc::clone(&config))?;
        let merge_generator =
            MergeJobGenerator::new(Arc::clone(&config), batch_generator.layout().clone());
        let submitter = JobSubmitter::from_config(scheduler, &config.scheduler)?;

        Ok(Self {
            config,
            batch_generator,
            merge_generator,
            submitter,
            state: OrchestratorStateMachine::new(),
        })
    }

    pub fn state(&self) -> OrchestratorState {
        self.state.current()
    }

    pub fn state_machine(&self) -> &OrchestratorStateMachine {
        &self.state
    }

    pub fn layout(&self) -> &ProjectLayout {
        self.batch_generator.layout()
    }

    /// Run the whole pipeline once
    #[instrument(skip(self), fields(project = %self.config.project_name, batches = self.config.num_batches))]
    pub async fn run(&mut self) -> Result<OrchestrationSummary> {
        if self.state.current() != OrchestratorState::Init {
            return Err(OrchestratorError::StateTransitionError {
                from: self.state.current(),
                to: OrchestratorState::SubmittingBatches(0),
            });
        }
        self.layout().ensure_directories()?;

        info!(
            scheduler = %self.submitter.scheduler_name(),
            "Submitting {} batch jobs",
            self.config.num_batches
        );

        let (batches, collected) = self.submit_batches().await?;
        self.state.transition_to(OrchestratorState::AllBatchesAttempted)?;

        info!(
            accepted = collected.len(),
            requested = self.config.num_batches,
            "Batch submission finished"
        );

        let dependency = DependencyGraphBuilder::build(&collected);
        if dependency.is_degenerate() {
            warn!(
                dependency = %dependency,
                "No batch job was accepted; merge job has no real dependency"
            );
        }

        let (merge_descriptor, merge) = self.submit_merge(dependency.clone()).await?;
        self.state.transition_to(OrchestratorState::Done)?;

        Ok(OrchestrationSummary {
            project: self.config.project_name.clone(),
            requested: self.config.num_batches,
            batches,
            dependency,
            merge_descriptor,
            merge,
        })
    }

    /// Generate and submit every batch in index order
    ///
    /// Returns per-batch outcomes and the ids of accepted jobs, in order.
    async fn submit_batches(&mut self) -> Result<(Vec<BatchOutcome>, CollectedIdentifiers)> {
        let mut collected = CollectedIdentifiers::new();
        let mut outcomes = Vec::with_capacity(self.config.num_batches);

        for index in 0..self.config.num_batches {
            self.state
                .transition_to(OrchestratorState::SubmittingBatches(index))?;

            let mut job = self.batch_generator.generate(index);
            let rejection = self.submit_batch(&mut job, &mut collected).await?;

            outcomes.push(BatchOutcome {
                index,
                descriptor_path: job.descriptor_path.clone(),
                job_id: job.submitted_id().cloned(),
                rejection,
            });
        }

        Ok((outcomes, collected))
    }

    /// Submit one batch; `Ok(Some(output))` carries a non-fatal rejection
    async fn submit_batch(
        &self,
        job: &mut BatchJob,
        collected: &mut CollectedIdentifiers,
    ) -> Result<Option<String>> {
        let project = &self.config.project_name;

        match self
            .submitter
            .submit(&job.descriptor(), &job.descriptor_path)
            .await
        {
            Ok(id) => {
                log_submission_operation(
                    "submit_batch",
                    project,
                    Some(job.index),
                    &job.descriptor_path,
                    "accepted",
                    Some(id.as_str()),
                );
                job.mark_submitted(id.clone())?;
                collected.push(id);
                Ok(None)
            }
            Err(SubmissionError::SubmissionParseError { output, .. }) => {
                log_submission_operation(
                    "submit_batch",
                    project,
                    Some(job.index),
                    &job.descriptor_path,
                    "rejected",
                    None,
                );
                Ok(Some(output))
            }
            Err(fatal) => {
                log_error(
                    "orchestrator",
                    "submit_batch",
                    &fatal.to_string(),
                    Some(format!("batch {} of {}", job.index, self.config.num_batches).as_str()),
                );
                Err(self.aborted(collected.as_slice(), fatal))
            }
        }
    }

    async fn submit_merge(
        &mut self,
        dependency: DependencyExpression,
    ) -> Result<(PathBuf, MergeOutcome)> {
        self.state.transition_to(OrchestratorState::SubmittingMerge)?;

        let merge_job = self.merge_generator.generate(dependency);
        let path = merge_job.descriptor_path.clone();
        let project = &self.config.project_name;

        match self.submitter.submit(&merge_job.descriptor(), &path).await {
            Ok(id) => {
                log_submission_operation(
                    "submit_merge",
                    project,
                    None,
                    &path,
                    "accepted",
                    Some(id.as_str()),
                );
                Ok((path, MergeOutcome::Accepted { job_id: id }))
            }
            Err(SubmissionError::SubmissionParseError { output, .. }) => {
                log_submission_operation("submit_merge", project, None, &path, "rejected", None);
                Ok((path, MergeOutcome::Unconfirmed { output }))
            }
            Err(fatal) => {
                log_error("orchestrator", "submit_merge", &fatal.to_string(), None);
                Err(self.aborted(merge_job.dependency_expression.identifiers(), fatal))
            }
        }
    }

    /// Fatal error carrying what was already queued on the cluster
    fn aborted(&self, accepted: &[JobIdentifier], source: SubmissionError) -> OrchestratorError {
        warn!(
            accepted = accepted.len(),
            requested = self.config.num_batches,
            "Run aborted; accepted jobs remain queued"
        );
        OrchestratorError::Aborted {
            submitted: accepted.len(),
            requested: self.config.num_batches,
            accepted: accepted.to_vec(),
            source,
        }
    }
}
