//! # sim-batch
//!
//! Command-line entry point.
//!
//! - `sim-batch submit` generates and submits `N` batch jobs plus the merge job
//! - `sim-batch run-batch` is what each batch job executes on the cluster

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use sim_batch::config::{ConfigManager, ConfigOverrides};
use sim_batch::layout::{ExistingProjectPolicy, ProjectLayout};
use sim_batch::logging::init_structured_logging;
use sim_batch::orchestration::{MergeOutcome, Orchestrator};
use sim_batch::scheduler::{DryRunScheduler, SbatchClient, SchedulerClient};
use sim_batch::worker::{BatchRunner, ShellCommandRunner, WorkerRequest};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "sim-batch")]
#[command(about = "Submit simulation batches and their merge job to Slurm")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Submit N batch jobs and one merge job gated on their success
    Submit(SubmitArgs),

    /// Run a single batch (invoked from inside a batch job)
    RunBatch(RunBatchArgs),
}

#[derive(Args)]
pub struct SubmitArgs {
    /// Project name
    #[arg(short = 'n', long)]
    project_name: Option<String>,

    /// Simulation executable (dis, pythia8_to_gemc_lund, clasdis)
    #[arg(short = 'e', long)]
    executable: Option<String>,

    /// Run card file name under ./runcards
    #[arg(short = 'r', long)]
    run_card: Option<String>,

    /// Events per batch
    #[arg(short = 'c', long)]
    events: Option<u64>,

    /// Output root directory
    #[arg(short = 'o', long)]
    output_dir: Option<PathBuf>,

    /// Comma-separated post-processing macros
    #[arg(short = 'p', long)]
    process_macros: Option<String>,

    /// Number of batch jobs
    #[arg(short = 'b', long)]
    num_batches: Option<usize>,

    /// YAML configuration file
    #[arg(long, env = "SIM_BATCH_CONFIG")]
    config: Option<PathBuf>,

    /// Remove an existing project directory without asking
    #[arg(long)]
    force: bool,

    /// Write descriptors but fabricate scheduler responses
    #[arg(long)]
    dry_run: bool,

    /// Base seed; batch i gets seed + i
    #[arg(long)]
    seed: Option<u64>,

    /// Keep one per-batch output next to the merged file
    #[arg(long)]
    retain_one: bool,

    /// Command each batch job runs
    #[arg(long)]
    worker_command: Option<String>,

    /// Print the effective configuration as YAML and exit
    #[arg(long)]
    print_config: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
pub struct RunBatchArgs {
    /// Project name
    #[arg(short = 'n', long)]
    project_name: Option<String>,

    /// Simulation executable
    #[arg(short = 'e', long)]
    executable: String,

    /// Run card file name under ./runcards
    #[arg(short = 'r', long)]
    run_card: Option<String>,

    /// Number of events
    #[arg(short = 'c', long)]
    events: Option<u64>,

    /// Output root directory
    #[arg(short = 'o', long, default_value = "out")]
    output_dir: PathBuf,

    /// Prefix for the copied run card
    #[arg(long)]
    prefix: Option<String>,

    /// Reuse an existing project directory without asking
    #[arg(short = 'f', long)]
    force: bool,

    /// Batch index, used to name post-processing outputs
    #[arg(long)]
    batch_index: Option<usize>,

    /// Seed for the generator
    #[arg(long)]
    seed: Option<u64>,

    /// Comma-separated post-processing macros
    #[arg(short = 'p', long)]
    process_macros: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    init_structured_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Submit(args) => submit(args).await,
        Commands::RunBatch(args) => run_batch(args).await,
    }
}

async fn submit(args: SubmitArgs) -> Result<ExitCode> {
    let output_dir = args.output_dir.map(absolute).transpose()?;
    let overrides = ConfigOverrides {
        project_name: args.project_name,
        executable_name: args.executable,
        run_card: args.run_card,
        events: args.events,
        output_dir,
        num_batches: args.num_batches,
        process_macros: args.process_macros,
        base_seed: args.seed,
        worker_command: args.worker_command,
        retain_representative: args.retain_one.then_some(true),
    };

    let mut config = ConfigManager::load(args.config.as_deref())
        .context("loading configuration")?
        .finalize(overrides)
        .context("validating configuration")?;
    if config.output_dir.is_relative() {
        config.output_dir = absolute(config.output_dir)?;
    }

    if args.print_config {
        print!("{}", ConfigManager::to_yaml(&config)?);
        return Ok(ExitCode::SUCCESS);
    }

    let layout = ProjectLayout::new(&config.output_dir, &config.project_name);
    let policy = if args.force {
        ExistingProjectPolicy::Overwrite
    } else if layout.project_dir().exists() {
        let question = format!(
            "Project directory {} already exists. Overwrite? [Y/n] ",
            layout.project_dir().display()
        );
        if !confirm(&question)? {
            println!("Cancelled.");
            return Ok(ExitCode::SUCCESS);
        }
        ExistingProjectPolicy::Overwrite
    } else {
        ExistingProjectPolicy::Abort
    };
    layout.prepare(policy)?;

    let scheduler: Arc<dyn SchedulerClient> = if args.dry_run {
        info!("Dry run: descriptors are written, nothing is sent to the cluster");
        Arc::new(DryRunScheduler::default())
    } else {
        Arc::new(SbatchClient::from_config(&config.scheduler))
    };

    let project = config.project_name.clone();
    let mut orchestrator = Orchestrator::new(config, scheduler)?;
    let summary = match orchestrator.run().await {
        Ok(summary) => summary,
        Err(err) => {
            if let Some(partial) = err.partial_summary(&project) {
                println!("{partial}");
            }
            return Err(err.into());
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{summary}");
    }

    let complete = summary.failed_indices().is_empty()
        && matches!(summary.merge, MergeOutcome::Accepted { .. });
    Ok(if complete {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}

async fn run_batch(args: RunBatchArgs) -> Result<ExitCode> {
    let project_name = args.project_name.unwrap_or_else(|| {
        warn!("No project name given, using 'tmp'");
        "tmp".to_string()
    });
    let base_dir = std::env::current_dir().context("resolving working directory")?;
    let output_dir = absolute(args.output_dir)?;

    let layout = ProjectLayout::new(&output_dir, &project_name);
    if layout.project_dir().exists() && !args.force {
        let question = format!(
            "Project directory {} already exists. Continue in it? [Y/n] ",
            layout.project_dir().display()
        );
        if !confirm(&question)? {
            println!("Cancelled.");
            return Ok(ExitCode::SUCCESS);
        }
    }
    layout.prepare(ExistingProjectPolicy::Reuse)?;

    let request = WorkerRequest {
        project_name,
        executable_name: args.executable,
        run_card: args.run_card,
        events: args.events,
        output_dir,
        prefix: args.prefix,
        process_macros: args
            .process_macros
            .as_deref()
            .map(sim_batch::config::split_macro_list)
            .unwrap_or_default(),
        batch_index: args.batch_index,
        seed: args.seed,
        base_dir,
    };

    let report = BatchRunner::new(request, ShellCommandRunner)?.run().await?;
    info!(
        commands = report.commands.len(),
        macros_run = report.macros_run.len(),
        macros_skipped = report.macros_skipped.len(),
        "Batch finished"
    );
    Ok(ExitCode::SUCCESS)
}

fn absolute(path: PathBuf) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path);
    }
    let cwd = std::env::current_dir().context("resolving working directory")?;
    Ok(cwd.join(path))
}

/// Only an explicit `y` proceeds
fn confirm(question: &str) -> Result<bool> {
    let mut stdout = std::io::stdout();
    stdout.write_all(question.as_bytes())?;
    stdout.flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}
