//! Executes one batch: project setup, executable, macros.

use super::executable::{Executable, ExecutableInputs, PYTHIA_SUBRUNS};
use super::macros::MacroInvocation;
use super::{runcard, WorkerError, WorkerRequest};
use crate::layout::ProjectLayout;
use async_trait::async_trait;
use rand::Rng;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{info, warn};

/// Runs one shell command line to completion
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &str, working_dir: &Path) -> Result<(), WorkerError>;
}

/// `sh -c <command>`, echoing stdout line by line as it arrives
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellCommandRunner;

#[async_trait]
impl CommandRunner for ShellCommandRunner {
    async fn run(&self, command: &str, working_dir: &Path) -> Result<(), WorkerError> {
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| WorkerError::Spawn {
                command: command.to_string(),
                reason: e.to_string(),
            })?;

        if let Some(stdout) = child.stdout.take() {
            let mut lines = BufReader::new(stdout).lines();
            while let Some(line) = lines
                .next_line()
                .await
                .map_err(|e| WorkerError::io(working_dir, e))?
            {
                println!("{line}");
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|e| WorkerError::io(working_dir, e))?;
        if !status.success() {
            return Err(WorkerError::CommandFailed {
                command: command.to_string(),
                status: status.to_string(),
            });
        }
        Ok(())
    }
}

/// What a batch run did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkerReport {
    pub commands: Vec<String>,
    pub macros_run: Vec<String>,
    pub macros_skipped: Vec<String>,
}

pub struct BatchRunner<R: CommandRunner = ShellCommandRunner> {
    request: WorkerRequest,
    executable: Executable,
    layout: ProjectLayout,
    runner: R,
}

impl<R: CommandRunner> BatchRunner<R> {
    /// Rejects unknown executables before touching the filesystem
    pub fn new(request: WorkerRequest, runner: R) -> Result<Self, WorkerError> {
        let executable = request.executable_name.parse()?;
        let layout = ProjectLayout::new(&request.output_dir, &request.project_name);
        Ok(Self {
            request,
            executable,
            layout,
            runner,
        })
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    /// Generator output directory; batches get their own sub-directory
    pub fn generator_dir(&self) -> PathBuf {
        let mut dir = self.layout.gen_dir();
        if let Some(index) = self.request.batch_index {
            dir = dir.join(format!("batch_{index}"));
        }
        match self.executable.output_subdir() {
            Some(subdir) => dir.join(subdir),
            None => dir,
        }
    }

    /// Explicit seeds derive from `--seed`; otherwise they are random
    pub fn seeds(&self) -> Vec<u64> {
        let count = self.executable.seed_count() as u64;
        match self.request.seed {
            Some(seed) => (0..count)
                .map(|run| seed.wrapping_mul(PYTHIA_SUBRUNS).wrapping_add(run))
                .collect(),
            None => {
                let mut rng = rand::thread_rng();
                (0..count).map(|_| rng.gen_range(0..1_000_000)).collect()
            }
        }
    }

    pub async fn run(&self) -> Result<WorkerReport, WorkerError> {
        let generator_dir = self.generator_dir();
        for dir in [self.layout.runcard_dir(), generator_dir.clone()] {
            std::fs::create_dir_all(&dir).map_err(|e| WorkerError::io(&dir, e))?;
        }

        let inputs = self.prepare_inputs()?;
        let commands = self.executable.command_lines(&generator_dir, &inputs)?;

        info!(
            executable = %self.executable,
            batch_index = self.request.batch_index,
            commands = commands.len(),
            "Running executable"
        );
        for command in &commands {
            self.runner.run(command, &self.request.base_dir).await?;
        }
        info!(executable = %self.executable, "Executable finished");

        let mut report = WorkerReport {
            commands,
            ..Default::default()
        };
        self.run_macros(&generator_dir, &mut report).await?;
        Ok(report)
    }

    fn prepare_inputs(&self) -> Result<ExecutableInputs, WorkerError> {
        let mut inputs = ExecutableInputs {
            project_name: Some(self.request.project_name.clone()),
            events: self.request.events,
            seeds: self.seeds(),
            ..Default::default()
        };

        if let Some(card) = &self.request.run_card {
            let destination = runcard::destination(
                &self.layout.runcard_dir(),
                card,
                self.request.prefix.as_deref(),
            );
            runcard::install(&self.request.base_dir.join("runcards"), &destination, card)?;

            if self.executable == Executable::Clasdis {
                let contents =
                    std::fs::read_to_string(&destination).map_err(|e| WorkerError::RunCard {
                        path: destination.clone(),
                        reason: e.to_string(),
                    })?;
                inputs.run_card_contents = Some(contents);
            }
            inputs.run_card_path = Some(destination);
        }
        Ok(inputs)
    }

    async fn run_macros(
        &self,
        generator_dir: &Path,
        report: &mut WorkerReport,
    ) -> Result<(), WorkerError> {
        let output_dir = match self.request.batch_index {
            Some(_) => self.layout.project_dir().to_path_buf(),
            None => generator_dir.to_path_buf(),
        };

        for name in &self.request.process_macros {
            let invocation = MacroInvocation::resolve(
                &self.request.base_dir,
                name,
                &output_dir,
                self.request.batch_index,
            );
            if !invocation.exists() {
                warn!(
                    macro_name = %name,
                    path = %invocation.macro_path.display(),
                    "Macro not found, skipping"
                );
                report.macros_skipped.push(name.clone());
                continue;
            }

            info!(macro_name = %name, output = %invocation.output_path.display(), "Running ROOT macro");
            self.runner
                .run(&invocation.command_line(generator_dir), &self.request.base_dir)
                .await?;
            report.macros_run.push(name.clone());
        }
        Ok(())
    }
}
