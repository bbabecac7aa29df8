//! Catalog of simulation executables a batch can run.

use super::WorkerError;
use crate::utils::shell;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Number of sub-runs the Pythia8 LUND generator is split into
pub const PYTHIA_SUBRUNS: u64 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Executable {
    Dis,
    Pythia8ToGemcLund,
    Clasdis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parameter {
    Events,
    ProjectName,
    RunCard,
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Events => write!(f, "events"),
            Self::ProjectName => write!(f, "project_name"),
            Self::RunCard => write!(f, "run_card"),
        }
    }
}

/// Everything needed to spell out the executable's command lines
#[derive(Debug, Clone, Default)]
pub struct ExecutableInputs {
    pub project_name: Option<String>,
    pub events: Option<u64>,
    /// Run card as installed in the project
    pub run_card_path: Option<PathBuf>,
    /// Run card contents, needed by executables that read options from it
    pub run_card_contents: Option<String>,
    /// One seed per sub-run
    pub seeds: Vec<u64>,
}

impl Executable {
    pub const ALL: [Executable; 3] = [Self::Dis, Self::Pythia8ToGemcLund, Self::Clasdis];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Dis => "dis",
            Self::Pythia8ToGemcLund => "pythia8_to_gemc_lund",
            Self::Clasdis => "clasdis",
        }
    }

    pub fn required_parameters(&self) -> &'static [Parameter] {
        match self {
            Self::Dis => &[],
            Self::Pythia8ToGemcLund => &[Parameter::Events, Parameter::ProjectName, Parameter::RunCard],
            Self::Clasdis => &[Parameter::Events, Parameter::RunCard],
        }
    }

    /// Sub-directory of the generator output directory, if any
    pub fn output_subdir(&self) -> Option<&'static str> {
        match self {
            Self::Dis => None,
            Self::Pythia8ToGemcLund => Some("pythia8"),
            Self::Clasdis => Some("clasdis"),
        }
    }

    /// How many seeds [`Self::command_lines`] consumes
    pub fn seed_count(&self) -> usize {
        match self {
            Self::Pythia8ToGemcLund => PYTHIA_SUBRUNS as usize,
            _ => 0,
        }
    }

    /// Report every missing required parameter at once
    pub fn check_parameters(&self, inputs: &ExecutableInputs) -> Result<(), WorkerError> {
        let missing: Vec<String> = self
            .required_parameters()
            .iter()
            .filter(|param| match param {
                Parameter::Events => inputs.events.is_none(),
                Parameter::ProjectName => inputs
                    .project_name
                    .as_deref()
                    .map_or(true, |name| name.is_empty()),
                Parameter::RunCard => inputs.run_card_path.is_none(),
            })
            .map(ToString::to_string)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(WorkerError::MissingParameters {
                executable: self.name().to_string(),
                missing,
            })
        }
    }

    /// Shell command lines, relative to the base directory
    pub fn command_lines(
        &self,
        output_dir: &Path,
        inputs: &ExecutableInputs,
    ) -> Result<Vec<String>, WorkerError> {
        self.check_parameters(inputs)?;
        let output = output_dir.display().to_string();

        match self {
            Self::Dis => Ok(vec!["./bin/dis".to_string()]),
            Self::Pythia8ToGemcLund => {
                let run_card = Self::run_card(inputs)?;
                let events_per_run = inputs.events.unwrap_or_default() / PYTHIA_SUBRUNS;
                if inputs.seeds.len() < self.seed_count() {
                    return Err(WorkerError::MissingParameters {
                        executable: self.name().to_string(),
                        missing: vec!["seeds".to_string()],
                    });
                }
                Ok((0..PYTHIA_SUBRUNS)
                    .zip(&inputs.seeds)
                    .map(|(run, seed)| {
                        shell::join([
                            "./bin/pythia8_to_gemc_lund".to_string(),
                            output.clone(),
                            run_card.clone(),
                            events_per_run.to_string(),
                            run.to_string(),
                            seed.to_string(),
                        ])
                    })
                    .collect())
            }
            Self::Clasdis => {
                let options = inputs.run_card_contents.as_deref().ok_or_else(|| {
                    WorkerError::MissingParameters {
                        executable: self.name().to_string(),
                        missing: vec!["run_card contents".to_string()],
                    }
                })?;
                let options = super::runcard::command_options(options);
                let mut line = String::from("./deps/clasdis/clasdis");
                if !options.is_empty() {
                    line.push(' ');
                    line.push_str(&options);
                }
                line.push_str(&format!(
                    " --trig {} --path {}",
                    inputs.events.unwrap_or_default(),
                    shell::quote(&output)
                ));
                Ok(vec![line])
            }
        }
    }

    fn run_card(inputs: &ExecutableInputs) -> Result<String, WorkerError> {
        inputs
            .run_card_path
            .as_ref()
            .map(|p| p.display().to_string())
            .ok_or_else(|| WorkerError::MissingParameters {
                executable: "run card".to_string(),
                missing: vec![Parameter::RunCard.to_string()],
            })
    }
}

impl FromStr for Executable {
    type Err = WorkerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dis" => Ok(Self::Dis),
            "pythia8_to_gemc_lund" => Ok(Self::Pythia8ToGemcLund),
            "clasdis" => Ok(Self::Clasdis),
            other => Err(WorkerError::UnknownExecutable(other.to_string())),
        }
    }
}

impl fmt::Display for Executable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
