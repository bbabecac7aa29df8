//! Shared helpers for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use sim_batch::config::OrchestrationConfig;
use sim_batch::scheduler::{SchedulerClient, SchedulerError};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// One call received by [`MockScheduler`]
#[derive(Debug, Clone)]
pub struct RecordedSubmission {
    pub descriptor_path: PathBuf,
    /// Descriptor contents as they were on disk at submission time
    pub contents: String,
}

/// Scheduler that replays scripted responses in order and records every call
///
/// Once the script is exhausted every further submission is rejected with
/// unparseable output.
#[derive(Default)]
pub struct MockScheduler {
    responses: Mutex<VecDeque<Result<String, SchedulerError>>>,
    calls: Mutex<Vec<RecordedSubmission>>,
}

impl MockScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accept(self, id: u64) -> Self {
        self.respond(Ok(format!("submission accepted, id={id}\n")))
    }

    pub fn accept_sbatch(self, id: u64) -> Self {
        self.respond(Ok(format!("Submitted batch job {id}\n")))
    }

    pub fn reject(self, output: &str) -> Self {
        self.respond(Ok(output.to_string()))
    }

    pub fn unavailable(self) -> Self {
        self.respond(Err(SchedulerError::Unavailable {
            command: "sbatch".to_string(),
            reason: "No such file or directory (os error 2)".to_string(),
        }))
    }

    pub fn respond(self, response: Result<String, SchedulerError>) -> Self {
        self.responses.lock().push_back(response);
        self
    }

    pub fn calls(&self) -> Vec<RecordedSubmission> {
        self.calls.lock().clone()
    }

    pub fn submitted_paths(&self) -> Vec<PathBuf> {
        self.calls
            .lock()
            .iter()
            .map(|c| c.descriptor_path.clone())
            .collect()
    }
}

#[async_trait]
impl SchedulerClient for MockScheduler {
    async fn submit(&self, descriptor_path: &Path) -> Result<String, SchedulerError> {
        let contents = std::fs::read_to_string(descriptor_path).unwrap_or_default();
        self.calls.lock().push(RecordedSubmission {
            descriptor_path: descriptor_path.to_path_buf(),
            contents,
        });
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok("sbatch: error: no response scripted\n".to_string()))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

pub fn test_config(output_root: &Path, project: &str, num_batches: usize) -> OrchestrationConfig {
    OrchestrationConfig {
        project_name: project.to_string(),
        executable_name: "pythia8_to_gemc_lund".to_string(),
        run_card: Some("dis.cmnd".to_string()),
        events: Some(1000),
        output_dir: output_root.to_path_buf(),
        num_batches,
        ..Default::default()
    }
}
