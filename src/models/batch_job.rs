use super::descriptor::JobDescriptor;
use super::job_identifier::JobIdentifier;
use crate::config::ResourceSpec;
use crate::error::{OrchestratorError, Result};
use std::path::PathBuf;

/// One independently submitted unit of simulation work
#[derive(Debug, Clone, PartialEq)]
pub struct BatchJob {
    pub index: usize,
    pub name: String,
    pub resource_spec: ResourceSpec,
    pub out_log_path: PathBuf,
    pub err_log_path: PathBuf,
    pub command_line: String,
    /// Descriptor file this job is persisted to
    pub descriptor_path: PathBuf,
    submitted_id: Option<JobIdentifier>,
}

impl BatchJob {
    pub fn new(
        index: usize,
        name: String,
        resource_spec: ResourceSpec,
        out_log_path: PathBuf,
        err_log_path: PathBuf,
        command_line: String,
        descriptor_path: PathBuf,
    ) -> Self {
        Self {
            index,
            name,
            resource_spec,
            out_log_path,
            err_log_path,
            command_line,
            descriptor_path,
            submitted_id: None,
        }
    }

    pub fn submitted_id(&self) -> Option<&JobIdentifier> {
        self.submitted_id.as_ref()
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted_id.is_some()
    }

    /// Tag the job with its scheduler id; a job is tagged at most once
    pub fn mark_submitted(&mut self, id: JobIdentifier) -> Result<()> {
        if let Some(existing) = &self.submitted_id {
            return Err(OrchestratorError::AlreadySubmitted {
                index: self.index,
                existing: existing.to_string(),
            });
        }
        self.submitted_id = Some(id);
        Ok(())
    }

    pub fn descriptor(&self) -> JobDescriptor {
        JobDescriptor::with_resources(
            &self.name,
            &self.resource_spec,
            &self.out_log_path,
            &self.err_log_path,
        )
        .command(self.command_line.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> BatchJob {
        BatchJob::new(
            2,
            "demo_2".to_string(),
            ResourceSpec::batch_defaults(),
            PathBuf::from("log/demo_2.out"),
            PathBuf::from("log/demo_2.err"),
            "sim-batch run-batch -n demo".to_string(),
            PathBuf::from("slurm/batch_2_demo.slurm"),
        )
    }

    #[test]
    fn identifier_is_assigned_once() {
        let mut job = job();
        assert!(!job.is_submitted());

        job.mark_submitted(JobIdentifier::new("41")).unwrap();
        assert_eq!(job.submitted_id().map(JobIdentifier::as_str), Some("41"));

        let err = job.mark_submitted(JobIdentifier::new("42")).unwrap_err();
        assert!(matches!(err, OrchestratorError::AlreadySubmitted { index: 2, .. }));
        assert_eq!(job.submitted_id().map(JobIdentifier::as_str), Some("41"));
    }

    #[test]
    fn descriptor_carries_command_line() {
        let descriptor = job().descriptor();
        assert_eq!(descriptor.job_name(), Some("demo_2"));
        assert_eq!(descriptor.commands, vec!["sim-batch run-batch -n demo"]);
        assert!(descriptor.dependency().is_none());
    }
}
