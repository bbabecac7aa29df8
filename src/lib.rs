#![allow(clippy::doc_markdown)] // Allow technical terms like Slurm, sbatch in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Sim Batch Orchestrator
//!
//! Fan-out/fan-in submission of simulation batches to a Slurm cluster.
//!
//! ## Overview
//!
//! One run submits `N` independent batch jobs, each running a simulation
//! executable and its post-processing macros, followed by a single merge job
//! gated on `afterok` of every batch the scheduler accepted. The merge job
//! aggregates per-batch outputs into one `analysis.root`.
//!
//! ## Module Organization
//!
//! - [`config`] - Layered configuration (defaults, YAML, environment, CLI)
//! - [`models`] - Job descriptors, batch and merge jobs, job identifiers
//! - [`orchestration`] - Descriptor generation, submission, dependency graph
//! - [`scheduler`] - The `sbatch` client seam and a dry-run scheduler
//! - [`state_machine`] - Forward-only run states
//! - [`layout`] - Project directory conventions
//! - [`worker`] - What a single batch job executes on the cluster
//! - [`logging`] - Structured tracing setup
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sim_batch::config::OrchestrationConfig;
//! use sim_batch::orchestration::Orchestrator;
//! use sim_batch::scheduler::DryRunScheduler;
//! use std::sync::Arc;
//!
//! # async fn example() -> sim_batch::Result<()> {
//! let config = OrchestrationConfig {
//!     project_name: "pi_plus".to_string(),
//!     executable_name: "dis".to_string(),
//!     num_batches: 3,
//!     ..Default::default()
//! };
//! let mut orchestrator = Orchestrator::new(config, Arc::new(DryRunScheduler::default()))?;
//! let summary = orchestrator.run().await?;
//! assert_eq!(summary.dependency.to_string(), "afterok:1:2:3");
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # Unit and integration tests (no cluster needed)
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod layout;
pub mod logging;
pub mod models;
pub mod orchestration;
pub mod scheduler;
pub mod state_machine;
pub mod utils;
pub mod worker;

pub use config::{
    ConfigManager, ConfigOverrides, ConfigurationError, MergeConfig, OrchestrationConfig,
    ResourceSpec, SchedulerConfig,
};
pub use error::{OrchestratorError, Result, SubmissionError};
pub use layout::{ExistingProjectPolicy, ProjectLayout};
pub use models::{BatchJob, CollectedIdentifiers, JobDescriptor, JobIdentifier, MergeJob};
pub use orchestration::{
    DependencyExpression, DependencyGraphBuilder, OrchestrationSummary, Orchestrator,
};
pub use scheduler::{DryRunScheduler, SbatchClient, SchedulerClient, SchedulerError};
pub use state_machine::OrchestratorState;
pub use worker::{BatchRunner, WorkerError, WorkerRequest};
