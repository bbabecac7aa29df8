use super::{SchedulerClient, SchedulerError};
use crate::config::SchedulerConfig;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

/// Submits descriptors by spawning `sbatch <args> <descriptor>`
#[derive(Debug, Clone)]
pub struct SbatchClient {
    program: String,
    args: Vec<String>,
}

impl SbatchClient {
    pub fn new<S: Into<String>>(program: S) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn from_config(config: &SchedulerConfig) -> Self {
        Self {
            program: config.submit_program.clone(),
            args: config.submit_args.clone(),
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    fn command_line(&self, descriptor_path: &Path) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args.iter().cloned());
        parts.push(descriptor_path.display().to_string());
        parts.join(" ")
    }
}

#[async_trait]
impl SchedulerClient for SbatchClient {
    async fn submit(&self, descriptor_path: &Path) -> Result<String, SchedulerError> {
        let command_line = self.command_line(descriptor_path);
        debug!(command = %command_line, "Invoking scheduler");

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(descriptor_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| SchedulerError::Unavailable {
                command: command_line.clone(),
                reason: e.to_string(),
            })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            warn!(
                command = %command_line,
                status = %output.status,
                output = %combined.trim(),
                "Scheduler exited with failure status"
            );
        }

        Ok(combined)
    }

    fn name(&self) -> &str {
        &self.program
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_program_is_unavailable() {
        let client = SbatchClient::new("sim-batch-definitely-not-installed");
        let err = client
            .submit(Path::new("/tmp/batch_0_demo.slurm"))
            .await
            .unwrap_err();
        assert!(matches!(err, SchedulerError::Unavailable { ref command, .. }
            if command.starts_with("sim-batch-definitely-not-installed")));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn captures_stdout_and_stderr() {
        // `sh -c <script> <descriptor>`: the descriptor lands in $0
        let client = SbatchClient::new("sh").with_args(vec![
            "-c".to_string(),
            "echo \"Submitted batch job 77\"; echo \"note: $0\" >&2".to_string(),
        ]);
        let output = client.submit(Path::new("demo.slurm")).await.unwrap();
        assert!(output.contains("Submitted batch job 77"));
        assert!(output.contains("note: demo.slurm"));
    }

    #[test]
    fn builds_from_config() {
        let config = SchedulerConfig {
            submit_args: vec!["--test-only".to_string()],
            ..Default::default()
        };
        let client = SbatchClient::from_config(&config);
        assert_eq!(client.name(), "sbatch");
        assert_eq!(
            client.command_line(Path::new("x.slurm")),
            "sbatch --test-only x.slurm"
        );
    }
}
