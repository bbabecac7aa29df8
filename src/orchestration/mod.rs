//! # Orchestration Core
//!
//! Job-graph construction and submission for one fan-out/fan-in run.
//!
//! ## Core Components
//!
//! - **BatchDescriptorGenerator**: builds the job for one batch index
//! - **JobSubmitter**: persists a descriptor, submits it, extracts the job id
//! - **DependencyGraphBuilder**: joins accepted ids into an `afterok` expression
//! - **MergeJobGenerator**: builds the terminal aggregation job
//! - **Orchestrator**: runs the batch loop, then the merge submission
//!
//! Control flow: `Orchestrator → BatchDescriptorGenerator → JobSubmitter (×N)
//! → DependencyGraphBuilder → MergeJobGenerator → JobSubmitter (×1)`.

pub mod batch_descriptor;
pub mod dependency;
pub mod merge_descriptor;
pub mod orchestrator;
pub mod submitter;
pub mod types;

// Re-export core types and components for easy access
pub use batch_descriptor::BatchDescriptorGenerator;
pub use dependency::{DependencyExpression, DependencyGraphBuilder};
pub use merge_descriptor::MergeJobGenerator;
pub use orchestrator::Orchestrator;
pub use submitter::JobSubmitter;
pub use types::{BatchOutcome, MergeOutcome, OrchestrationSummary};
