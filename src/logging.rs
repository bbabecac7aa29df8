//! # Structured Logging Module
//!
//! Environment-aware structured logging for submission runs. Console output is
//! human-readable by default; `SIM_BATCH_LOG_FORMAT=json` switches to JSON lines
//! for log collection on cluster login nodes.

use crate::constants;
use chrono::Utc;
use std::path::Path;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging once per process
///
/// `RUST_LOG` takes precedence over the environment-derived default level.
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = crate::config::loader::detect_environment();
        let log_level = get_log_level(&environment);
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

        let json = std::env::var(constants::env::LOG_FORMAT)
            .map(|format| format.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let layer = if json {
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .json()
                .with_filter(filter)
                .boxed()
        } else {
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(filter)
                .boxed()
        };

        // A subscriber may already be installed by an embedding process
        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized");
        }

        tracing::debug!(
            pid = std::process::id(),
            environment = %environment,
            json_output = json,
            "Structured logging initialized"
        );
    });
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> &'static str {
    match environment {
        "production" => "info",
        _ => "debug",
    }
}

/// Log structured data for one submission attempt
pub fn log_submission_operation(
    operation: &str,
    project: &str,
    batch_index: Option<usize>,
    descriptor: &Path,
    status: &str,
    job_id: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        project = %project,
        batch_index = batch_index,
        descriptor = %descriptor.display(),
        status = %status,
        job_id = job_id,
        timestamp = %Utc::now().to_rfc3339(),
        "SUBMISSION"
    );
}

pub(crate) fn log_config_loaded(
    environment: &str,
    config_file: Option<&Path>,
    project: &str,
    num_batches: usize,
) {
    tracing::info!(
        environment = %environment,
        config_file = config_file.map(|p| p.display().to_string()),
        project = %project,
        num_batches = num_batches,
        "Configuration loaded"
    );
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "ERROR"
    );
}
