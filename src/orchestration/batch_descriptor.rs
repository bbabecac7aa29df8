//! # Batch Descriptor Generator
//!
//! Turns the orchestration configuration plus a batch index into a
//! [`BatchJob`]. The index is embedded in the job name and both log paths, so
//! no two batches of a project collide. Generation is pure; persisting the
//! descriptor is left to the submitter.

use crate::config::{ConfigResult, OrchestrationConfig};
use crate::layout::ProjectLayout;
use crate::models::BatchJob;
use crate::utils::shell;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct BatchDescriptorGenerator {
    config: Arc<OrchestrationConfig>,
    layout: ProjectLayout,
}

impl BatchDescriptorGenerator {
    /// Validates the configuration up front so that a missing field is
    /// reported before anything is submitted
    pub fn new(config: Arc<OrchestrationConfig>) -> ConfigResult<Self> {
        config.validate()?;
        let layout = ProjectLayout::new(&config.output_dir, &config.project_name);
        Ok(Self { config, layout })
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    pub fn generate(&self, index: usize) -> BatchJob {
        let (out_log, err_log) = self.layout.batch_log_paths(index);
        BatchJob::new(
            index,
            format!("{}_{index}", self.config.project_name),
            self.config.batch_resources.clone(),
            out_log,
            err_log,
            self.command_line(index),
            self.layout.batch_descriptor_path(index),
        )
    }

    /// Generate every batch of the run, indices `0..num_batches`
    pub fn generate_all(&self) -> Vec<BatchJob> {
        (0..self.config.num_batches)
            .map(|index| self.generate(index))
            .collect()
    }

    /// Per-batch seed, derived only when a base seed is configured
    pub fn seed_for(&self, index: usize) -> Option<u64> {
        self.config
            .base_seed
            .map(|base| base.wrapping_add(index as u64))
    }

    fn command_line(&self, index: usize) -> String {
        let config = &self.config;
        let mut args: Vec<String> = vec![
            "-n".into(),
            config.project_name.clone(),
            "-e".into(),
            config.executable_name.clone(),
        ];
        if let Some(run_card) = &config.run_card {
            args.extend(["-r".into(), run_card.clone()]);
        }
        if let Some(events) = config.events {
            args.extend(["-c".into(), events.to_string()]);
        }
        args.extend([
            "-o".into(),
            config.output_dir.display().to_string(),
            "-f".into(),
            "--batch-index".into(),
            index.to_string(),
        ]);
        if let Some(seed) = self.seed_for(index) {
            args.extend(["--seed".into(), seed.to_string()]);
        }
        if !config.process_macros.is_empty() {
            args.extend(["-p".into(), config.process_macros.join(",")]);
        }

        // worker_command may carry its own arguments and is used verbatim
        format!("{} {}", config.worker_command.trim(), shell::join(&args))
    }
}
