//! Shared constants for descriptor generation and scheduler interaction.

/// Default Slurm account used for both batch and merge jobs
pub const DEFAULT_ACCOUNT: &str = "clas12";

/// Default Slurm partition used for both batch and merge jobs
pub const DEFAULT_PARTITION: &str = "production";

pub mod batch {
    pub const MEM_PER_CPU_MB: u32 = 1000;
    pub const CPUS_PER_TASK: u32 = 1;
    pub const TIME_LIMIT: &str = "24:00:00";
}

pub mod merge {
    pub const MEM_PER_CPU_MB: u32 = 8000;
    pub const CPUS_PER_TASK: u32 = 1;
    pub const TIME_LIMIT: &str = "01:00:00";

    /// Aggregation tool; invoked as `<tool> -f <output> <inputs>`
    pub const TOOL: &str = "hadd";
    pub const OUTPUT_FILE: &str = "analysis.root";
    pub const INPUT_GLOB: &str = "batch*.root";
}

/// Qualifier for "start after all listed jobs completed successfully"
pub const DEPENDENCY_QUALIFIER: &str = "afterok";

/// Acceptance lines understood by the submitter: the generic
/// `submission accepted, id=<digits>` form and Slurm's native
/// `Submitted batch job <digits>`.
pub const ACCEPTANCE_PATTERN: &str =
    r"(?m)^\s*(?:submission accepted, id=|Submitted batch job )(\d+)\s*$";

pub const SCRIPT_SHEBANG: &str = "#!/bin/bash";
pub const DIRECTIVE_PREFIX: &str = "#SBATCH";

/// Default program used to hand descriptors to the scheduler
pub const SUBMIT_PROGRAM: &str = "sbatch";

/// Default worker invocation placed into each batch descriptor
pub const WORKER_COMMAND: &str = "sim-batch run-batch";

pub mod layout {
    pub const DEFAULT_OUTPUT_DIR: &str = "out";
    pub const LOG_DIR: &str = "log";
    pub const SLURM_DIR: &str = "slurm";
    pub const RUNCARD_DIR: &str = "runcards";
    pub const GEN_DIR: &str = "gen";
    pub const DESCRIPTOR_EXTENSION: &str = "slurm";
}

/// Environment variables recognised by the crate
pub mod env {
    pub const ENVIRONMENT: &str = "SIM_BATCH_ENV";
    pub const LOG_FORMAT: &str = "SIM_BATCH_LOG_FORMAT";
    pub const CONFIG_PREFIX: &str = "SIM_BATCH";
    pub const CONFIG_SEPARATOR: &str = "__";
}
