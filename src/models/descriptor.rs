//! Structured job descriptors and their Slurm script rendering.
//!
//! A [`JobDescriptor`] records *what* to run as typed directives plus shell
//! commands. [`JobDescriptor::render`] turns it into the batch script handed to
//! `sbatch`; nothing else in the crate formats `#SBATCH` lines.

use crate::config::ResourceSpec;
use crate::constants;
use std::fmt;
use std::path::{Path, PathBuf};

/// One scheduler header directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Dependency(String),
    JobName(String),
    Account(String),
    Partition(String),
    MemPerCpu(u32),
    CpusPerTask(u32),
    Output(PathBuf),
    Error(PathBuf),
    Time(String),
}

impl Directive {
    /// The long option name as understood by `sbatch`
    pub fn option_name(&self) -> &'static str {
        match self {
            Self::Dependency(_) => "dependency",
            Self::JobName(_) => "job-name",
            Self::Account(_) => "account",
            Self::Partition(_) => "partition",
            Self::MemPerCpu(_) => "mem-per-cpu",
            Self::CpusPerTask(_) => "cpus-per-task",
            Self::Output(_) => "output",
            Self::Error(_) => "error",
            Self::Time(_) => "time",
        }
    }

    fn value(&self) -> String {
        match self {
            Self::Dependency(v)
            | Self::JobName(v)
            | Self::Account(v)
            | Self::Partition(v)
            | Self::Time(v) => v.clone(),
            Self::MemPerCpu(n) | Self::CpusPerTask(n) => n.to_string(),
            Self::Output(p) | Self::Error(p) => p.display().to_string(),
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} --{}={}",
            constants::DIRECTIVE_PREFIX,
            self.option_name(),
            self.value()
        )
    }
}

/// Header directives plus the shell commands of one job script
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobDescriptor {
    pub directives: Vec<Directive>,
    pub commands: Vec<String>,
}

impl JobDescriptor {
    /// Standard header for a job: name, resources and both log files
    pub fn with_resources(
        name: &str,
        resources: &ResourceSpec,
        out_log: &Path,
        err_log: &Path,
    ) -> Self {
        Self {
            directives: vec![
                Directive::JobName(name.to_string()),
                Directive::Account(resources.account.clone()),
                Directive::Partition(resources.partition.clone()),
                Directive::MemPerCpu(resources.mem_per_cpu_mb),
                Directive::CpusPerTask(resources.cpus_per_task),
                Directive::Output(out_log.to_path_buf()),
                Directive::Error(err_log.to_path_buf()),
                Directive::Time(resources.time_limit.clone()),
            ],
            commands: Vec::new(),
        }
    }

    /// Dependency directives go first so they read as the job's gate
    pub fn gated_by(mut self, dependency: String) -> Self {
        self.directives.insert(0, Directive::Dependency(dependency));
        self
    }

    pub fn command<S: Into<String>>(mut self, command: S) -> Self {
        self.commands.push(command.into());
        self
    }

    pub fn job_name(&self) -> Option<&str> {
        self.directives.iter().find_map(|d| match d {
            Directive::JobName(name) => Some(name.as_str()),
            _ => None,
        })
    }

    pub fn dependency(&self) -> Option<&str> {
        self.directives.iter().find_map(|d| match d {
            Directive::Dependency(dep) => Some(dep.as_str()),
            _ => None,
        })
    }

    pub fn output_log(&self) -> Option<&Path> {
        self.directives.iter().find_map(|d| match d {
            Directive::Output(p) => Some(p.as_path()),
            _ => None,
        })
    }

    pub fn error_log(&self) -> Option<&Path> {
        self.directives.iter().find_map(|d| match d {
            Directive::Error(p) => Some(p.as_path()),
            _ => None,
        })
    }

    /// Serialize as a Slurm batch script
    pub fn render(&self) -> String {
        let mut script = String::from(constants::SCRIPT_SHEBANG);
        script.push('\n');
        for directive in &self.directives {
            script.push_str(&directive.to_string());
            script.push('\n');
        }
        script.push('\n');
        for command in &self.commands {
            script.push_str(command);
            script.push('\n');
        }
        script
    }
}
