//! Configuration Loader
//!
//! Layers built-in defaults, an optional YAML file and `SIM_BATCH__*`
//! environment variables into an [`OrchestrationConfig`].

use super::error::{ConfigResult, ConfigurationError};
use super::{ConfigOverrides, OrchestrationConfig};
use crate::constants;
use config::{Config, Environment, File, FileFormat};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loaded configuration plus where it came from
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: OrchestrationConfig,
    environment: String,
    config_file: Option<PathBuf>,
}

impl ConfigManager {
    /// Load from defaults, `config_file` and the process environment
    pub fn load(config_file: Option<&Path>) -> ConfigResult<Self> {
        Self::load_with_env(config_file, None)
    }

    /// Load with an explicit environment map instead of the process
    /// environment, so tests do not have to mutate global state
    pub fn load_with_env(
        config_file: Option<&Path>,
        env_vars: Option<HashMap<String, String>>,
    ) -> ConfigResult<Self> {
        let environment = detect_environment();

        let defaults = Config::try_from(&OrchestrationConfig::default())
            .map_err(|e| ConfigurationError::load_error("defaults", e))?;
        let mut builder = Config::builder().add_source(defaults);

        if let Some(path) = config_file {
            if !path.is_file() {
                return Err(ConfigurationError::config_file_not_found(path));
            }
            debug!(config_file = %path.display(), "Adding configuration file layer");
            builder = builder.add_source(File::from(path).format(FileFormat::Yaml));
        }

        let env_source = Environment::with_prefix(constants::env::CONFIG_PREFIX)
            .prefix_separator(constants::env::CONFIG_SEPARATOR)
            .separator(constants::env::CONFIG_SEPARATOR)
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("process_macros")
            .with_list_parse_key("scheduler.submit_args")
            .source(env_vars);
        builder = builder.add_source(env_source);

        let config: OrchestrationConfig = builder
            .build()
            .and_then(|built| built.try_deserialize())
            .map_err(|e| {
                let source_name = config_file
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "environment".to_string());
                ConfigurationError::load_error(source_name, e)
            })?;

        debug!(
            environment = %environment,
            config = %serde_json::to_string(&config).unwrap_or_else(|_| "[serialization error]".to_string()),
            "Configuration layers merged"
        );

        Ok(Self {
            config,
            environment,
            config_file: config_file.map(Path::to_path_buf),
        })
    }

    /// Apply command-line values and validate the final result
    pub fn finalize(mut self, overrides: ConfigOverrides) -> ConfigResult<OrchestrationConfig> {
        overrides.apply(&mut self.config);
        self.config.validate()?;

        crate::logging::log_config_loaded(
            &self.environment,
            self.config_file.as_deref(),
            &self.config.project_name,
            self.config.num_batches,
        );
        Ok(self.config)
    }

    pub fn config(&self) -> &OrchestrationConfig {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Effective configuration as YAML, for `--print-config`
    pub fn to_yaml(config: &OrchestrationConfig) -> ConfigResult<String> {
        serde_yaml::to_string(config).map_err(ConfigurationError::serialization_error)
    }
}

/// Deployment environment, `development` unless `SIM_BATCH_ENV` says otherwise
pub fn detect_environment() -> String {
    std::env::var(constants::env::ENVIRONMENT).unwrap_or_else(|_| "development".to_string())
}
