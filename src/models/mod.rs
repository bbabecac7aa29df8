pub mod batch_job;
pub mod descriptor;
pub mod job_identifier;
pub mod merge_job;

// Re-export core models for easy access
pub use batch_job::BatchJob;
pub use descriptor::{Directive, JobDescriptor};
pub use job_identifier::{CollectedIdentifiers, JobIdentifier};
pub use merge_job::MergeJob;
