//! # Orchestration Configuration
//!
//! Everything the orchestrator needs to know about one submission run: which
//! project and worker to drive, how many batches, the Slurm resources for the
//! batch and merge jobs, how results are aggregated, and how the scheduler is
//! invoked.
//!
//! Values are layered by [`ConfigManager`]: built-in defaults, an optional YAML
//! file, `SIM_BATCH__*` environment variables, then command-line overrides
//! through [`ConfigOverrides`].
//!
//! ```rust
//! use sim_batch::config::OrchestrationConfig;
//!
//! let mut config = OrchestrationConfig::default();
//! config.project_name = "rho_plus".to_string();
//! config.executable_name = "pythia8_to_gemc_lund".to_string();
//! config.run_card = Some("dis.cmnd".to_string());
//! config.events = Some(10_000);
//! config.num_batches = 4;
//! assert!(config.validate().is_ok());
//! ```

pub mod error;
pub mod loader;

use crate::constants;
use crate::worker::executable::{Executable, Parameter};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::OnceLock;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Root configuration for one orchestration run
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OrchestrationConfig {
    /// Project name; names the directory under `output_dir`
    pub project_name: String,

    /// Simulation executable the worker runs (`dis`, `clasdis`, ...)
    pub executable_name: String,

    /// Run card file name, resolved by the worker under `./runcards`
    pub run_card: Option<String>,

    /// Events generated per batch
    pub events: Option<u64>,

    /// Output root; the project lives at `{output_dir}/{project_name}`
    pub output_dir: PathBuf,

    /// Number of independent batch jobs
    pub num_batches: usize,

    /// Post-processing macros run by each batch after the executable
    pub process_macros: Vec<String>,

    /// When set, batch `i` receives seed `base_seed + i`
    pub base_seed: Option<u64>,

    /// Command placed at the start of every batch command line
    pub worker_command: String,

    pub batch_resources: ResourceSpec,

    pub merge_resources: ResourceSpec,

    pub merge: MergeConfig,

    pub scheduler: SchedulerConfig,
}

impl Default for OrchestrationConfig {
    fn default() -> Self {
        Self {
            project_name: String::new(),
            executable_name: String::new(),
            run_card: None,
            events: None,
            output_dir: PathBuf::from(constants::layout::DEFAULT_OUTPUT_DIR),
            num_batches: 1,
            process_macros: Vec::new(),
            base_seed: None,
            worker_command: constants::WORKER_COMMAND.to_string(),
            batch_resources: ResourceSpec::batch_defaults(),
            merge_resources: ResourceSpec::merge_defaults(),
            merge: MergeConfig::default(),
            scheduler: SchedulerConfig::default(),
        }
    }
}

impl OrchestrationConfig {
    /// Fail fast on anything that would produce an unusable descriptor
    pub fn validate(&self) -> ConfigResult<()> {
        if self.project_name.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "project_name",
                "orchestration",
            ));
        }
        if self.project_name.contains('/') || self.project_name.contains(char::is_whitespace) {
            return Err(ConfigurationError::invalid_value(
                "project_name",
                &self.project_name,
                "must not contain path separators or whitespace",
            ));
        }
        if self.executable_name.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "executable_name",
                "orchestration",
            ));
        }
        self.validate_executable()?;
        if self.worker_command.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "worker_command",
                "orchestration",
            ));
        }
        if self.process_macros.iter().any(|m| m.trim().is_empty()) {
            return Err(ConfigurationError::invalid_value(
                "process_macros",
                self.process_macros.join(","),
                "macro names must not be empty",
            ));
        }

        self.batch_resources.validate("batch_resources")?;
        self.merge_resources.validate("merge_resources")?;
        self.merge.validate()?;
        self.scheduler.validate()?;
        Ok(())
    }

    /// The executable must be in the worker's catalog and have every
    /// parameter it needs, otherwise every batch would fail on the cluster
    fn validate_executable(&self) -> ConfigResult<()> {
        let executable: Executable = self.executable_name.parse().map_err(|_| {
            let known = Executable::ALL.map(|e| e.name()).join(", ");
            ConfigurationError::invalid_value(
                "executable_name",
                &self.executable_name,
                format!("expected one of {known}"),
            )
        })?;

        let context = format!("executable {executable}");
        for parameter in executable.required_parameters() {
            let present = match parameter {
                Parameter::Events => self.events.is_some(),
                Parameter::RunCard => self
                    .run_card
                    .as_deref()
                    .is_some_and(|card| !card.trim().is_empty()),
                Parameter::ProjectName => !self.project_name.trim().is_empty(),
            };
            if !present {
                return Err(ConfigurationError::missing_required_field(
                    parameter.to_string(),
                    context.as_str(),
                ));
            }
        }
        Ok(())
    }

    /// `{output_dir}/{project_name}`
    pub fn project_dir(&self) -> PathBuf {
        self.output_dir.join(&self.project_name)
    }
}

/// Slurm resource request shared by batch and merge jobs
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResourceSpec {
    pub account: String,
    pub partition: String,
    pub mem_per_cpu_mb: u32,
    pub cpus_per_task: u32,
    /// Wall-clock limit in Slurm notation (`HH:MM:SS`, `D-HH:MM:SS`, ...)
    pub time_limit: String,
}

impl ResourceSpec {
    pub fn batch_defaults() -> Self {
        Self {
            account: constants::DEFAULT_ACCOUNT.to_string(),
            partition: constants::DEFAULT_PARTITION.to_string(),
            mem_per_cpu_mb: constants::batch::MEM_PER_CPU_MB,
            cpus_per_task: constants::batch::CPUS_PER_TASK,
            time_limit: constants::batch::TIME_LIMIT.to_string(),
        }
    }

    pub fn merge_defaults() -> Self {
        Self {
            account: constants::DEFAULT_ACCOUNT.to_string(),
            partition: constants::DEFAULT_PARTITION.to_string(),
            mem_per_cpu_mb: constants::merge::MEM_PER_CPU_MB,
            cpus_per_task: constants::merge::CPUS_PER_TASK,
            time_limit: constants::merge::TIME_LIMIT.to_string(),
        }
    }

    fn validate(&self, context: &str) -> ConfigResult<()> {
        if self.account.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "account", context,
            ));
        }
        if self.partition.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "partition",
                context,
            ));
        }
        if self.mem_per_cpu_mb == 0 {
            return Err(ConfigurationError::invalid_value(
                format!("{context}.mem_per_cpu_mb"),
                "0",
                "memory per CPU must be positive",
            ));
        }
        if self.cpus_per_task == 0 {
            return Err(ConfigurationError::invalid_value(
                format!("{context}.cpus_per_task"),
                "0",
                "CPUs per task must be positive",
            ));
        }
        if !time_limit_regex().is_match(&self.time_limit) {
            return Err(ConfigurationError::invalid_value(
                format!("{context}.time_limit"),
                &self.time_limit,
                "expected Slurm time notation such as 24:00:00 or 1-12:00:00",
            ));
        }
        Ok(())
    }
}

fn time_limit_regex() -> &'static Regex {
    static TIME_LIMIT: OnceLock<Regex> = OnceLock::new();
    TIME_LIMIT.get_or_init(|| {
        Regex::new(r"^(?:\d+-)?\d+(?::\d{2}){0,2}$").expect("time limit regex is valid")
    })
}

/// The built-in acceptance pattern, compiled once
pub(crate) fn default_acceptance_regex() -> &'static Regex {
    static ACCEPTANCE: OnceLock<Regex> = OnceLock::new();
    ACCEPTANCE.get_or_init(|| {
        Regex::new(constants::ACCEPTANCE_PATTERN).expect("acceptance regex is valid")
    })
}

/// Aggregation performed by the merge job
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct MergeConfig {
    pub tool: String,
    /// File name of the combined artifact inside the project directory
    pub output_file: String,
    /// Glob over the project directory selecting per-batch artifacts
    pub input_glob: String,
    /// Delete all but one per-batch artifact once aggregation succeeded
    pub retain_representative: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            tool: constants::merge::TOOL.to_string(),
            output_file: constants::merge::OUTPUT_FILE.to_string(),
            input_glob: constants::merge::INPUT_GLOB.to_string(),
            retain_representative: false,
        }
    }
}

impl MergeConfig {
    fn validate(&self) -> ConfigResult<()> {
        for (field, value) in [
            ("merge.tool", &self.tool),
            ("merge.output_file", &self.output_file),
            ("merge.input_glob", &self.input_glob),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigurationError::missing_required_field(field, "merge"));
            }
        }
        Ok(())
    }
}

/// How descriptors reach the scheduler
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Submission program, `sbatch` unless overridden
    pub submit_program: String,
    /// Extra arguments placed before the descriptor path
    pub submit_args: Vec<String>,
    /// Regex with one capture group extracting the job id
    pub acceptance_pattern: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            submit_program: constants::SUBMIT_PROGRAM.to_string(),
            submit_args: Vec::new(),
            acceptance_pattern: constants::ACCEPTANCE_PATTERN.to_string(),
        }
    }
}

impl SchedulerConfig {
    /// Compile the acceptance pattern, checking it captures an identifier
    pub fn acceptance_regex(&self) -> ConfigResult<Regex> {
        let regex = Regex::new(&self.acceptance_pattern).map_err(|e| {
            ConfigurationError::invalid_value(
                "scheduler.acceptance_pattern",
                &self.acceptance_pattern,
                e.to_string(),
            )
        })?;
        if regex.captures_len() < 2 {
            return Err(ConfigurationError::invalid_value(
                "scheduler.acceptance_pattern",
                &self.acceptance_pattern,
                "pattern needs a capture group for the job id",
            ));
        }
        Ok(regex)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.submit_program.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "scheduler.submit_program",
                "scheduler",
            ));
        }
        self.acceptance_regex().map(|_| ())
    }
}

/// Command-line values layered on top of the loaded configuration
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub project_name: Option<String>,
    pub executable_name: Option<String>,
    pub run_card: Option<String>,
    pub events: Option<u64>,
    pub output_dir: Option<PathBuf>,
    pub num_batches: Option<usize>,
    /// Comma-separated macro list, as accepted on the command line
    pub process_macros: Option<String>,
    pub base_seed: Option<u64>,
    pub worker_command: Option<String>,
    pub retain_representative: Option<bool>,
}

impl ConfigOverrides {
    pub fn apply(self, config: &mut OrchestrationConfig) {
        if let Some(name) = self.project_name {
            config.project_name = name;
        }
        if let Some(exe) = self.executable_name {
            config.executable_name = exe;
        }
        if self.run_card.is_some() {
            config.run_card = self.run_card;
        }
        if self.events.is_some() {
            config.events = self.events;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if let Some(n) = self.num_batches {
            config.num_batches = n;
        }
        if let Some(macros) = self.process_macros {
            config.process_macros = split_macro_list(&macros);
        }
        if self.base_seed.is_some() {
            config.base_seed = self.base_seed;
        }
        if let Some(cmd) = self.worker_command {
            config.worker_command = cmd;
        }
        if let Some(retain) = self.retain_representative {
            config.merge.retain_representative = retain;
        }
    }
}

/// Split `a.C,b.C` into macro names, dropping empty entries
pub fn split_macro_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> OrchestrationConfig {
        OrchestrationConfig {
            project_name: "demo".to_string(),
            executable_name: "dis".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_match_production_resources() {
        let config = OrchestrationConfig::default();
        assert_eq!(config.num_batches, 1);
        assert_eq!(config.batch_resources.mem_per_cpu_mb, 1000);
        assert_eq!(config.batch_resources.time_limit, "24:00:00");
        assert_eq!(config.merge_resources.mem_per_cpu_mb, 8000);
        assert_eq!(config.merge_resources.time_limit, "01:00:00");
        assert_eq!(config.merge.tool, "hadd");
        assert_eq!(config.scheduler.submit_program, "sbatch");
    }

    #[test]
    fn missing_project_name_is_rejected() {
        let mut config = valid_config();
        config.project_name = "  ".to_string();
        assert_eq!(
            config.validate(),
            Err(ConfigurationError::missing_required_field(
                "project_name",
                "orchestration"
            ))
        );
    }

    #[test]
    fn missing_executable_is_rejected() {
        let mut config = valid_config();
        config.executable_name.clear();
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::MissingRequiredField { ref field, .. }) if field == "executable_name"
        ));
    }

    #[test]
    fn unknown_executable_is_rejected() {
        let mut config = valid_config();
        config.executable_name = "no_such_generator".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::InvalidValue { ref field, ref context, .. })
                if field == "executable_name" && context.contains("pythia8_to_gemc_lund")
        ));
    }

    #[test]
    fn generator_without_events_is_rejected() {
        let mut config = valid_config();
        config.executable_name = "clasdis".to_string();
        config.run_card = Some("clasdis.txt".to_string());
        assert_eq!(
            config.validate(),
            Err(ConfigurationError::missing_required_field(
                "events",
                "executable clasdis"
            ))
        );

        config.events = Some(500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn generator_without_run_card_is_rejected() {
        let mut config = valid_config();
        config.executable_name = "pythia8_to_gemc_lund".to_string();
        config.events = Some(1000);
        assert_eq!(
            config.validate(),
            Err(ConfigurationError::missing_required_field(
                "run_card",
                "executable pythia8_to_gemc_lund"
            ))
        );

        config.run_card = Some(" ".to_string());
        assert!(config.validate().is_err());

        config.run_card = Some("dis.cmnd".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn built_in_acceptance_regex_matches_default_pattern() {
        assert_eq!(
            default_acceptance_regex().as_str(),
            SchedulerConfig::default().acceptance_pattern
        );
    }

    #[test]
    fn malformed_time_limit_is_rejected() {
        let mut config = valid_config();
        config.merge_resources.time_limit = "one hour".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::InvalidValue { ref field, .. }) if field == "merge_resources.time_limit"
        ));

        config.merge_resources.time_limit = "2-00:00:00".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn acceptance_pattern_needs_capture_group() {
        let mut config = valid_config();
        config.scheduler.acceptance_pattern = r"Submitted batch job \d+".to_string();
        assert!(config.validate().is_err());

        config.scheduler.acceptance_pattern = "(unclosed".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn overrides_replace_only_given_fields() {
        let mut config = valid_config();
        config.events = Some(500);

        ConfigOverrides {
            num_batches: Some(8),
            process_macros: Some("a.C, b.C,,".to_string()),
            retain_representative: Some(true),
            ..Default::default()
        }
        .apply(&mut config);

        assert_eq!(config.num_batches, 8);
        assert_eq!(config.events, Some(500));
        assert_eq!(config.process_macros, vec!["a.C", "b.C"]);
        assert!(config.merge.retain_representative);
        assert_eq!(config.project_dir(), PathBuf::from("out/demo"));
    }
}
