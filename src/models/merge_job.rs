use super::descriptor::JobDescriptor;
use crate::config::ResourceSpec;
use crate::orchestration::dependency::DependencyExpression;
use std::path::PathBuf;

/// Terminal aggregation job gated on the batch jobs
///
/// Created once per run after every batch index was attempted. It has no
/// identifier slot of its own since nothing depends on it.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeJob {
    pub dependency_expression: DependencyExpression,
    pub name: String,
    pub resource_spec: ResourceSpec,
    pub out_log_path: PathBuf,
    pub err_log_path: PathBuf,
    /// Aggregation command followed by the optional cleanup command
    pub command_lines: Vec<String>,
    pub descriptor_path: PathBuf,
}

impl MergeJob {
    /// First command line, the aggregation itself
    pub fn command_line(&self) -> &str {
        self.command_lines.first().map(String::as_str).unwrap_or_default()
    }

    pub fn descriptor(&self) -> JobDescriptor {
        let base = JobDescriptor::with_resources(
            &self.name,
            &self.resource_spec,
            &self.out_log_path,
            &self.err_log_path,
        )
        .gated_by(self.dependency_expression.to_string());

        self.command_lines
            .iter()
            .fold(base, |descriptor, line| descriptor.command(line.clone()))
    }
}
