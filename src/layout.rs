//! On-disk layout of a project.
//!
//! ```text
//! {output_root}/{project}/
//!     slurm/batch_{index}_{project}.slurm
//!     slurm/{project}_merge.slurm
//!     log/{project}_{index}.out|.err
//!     log/{project}_merge.out|.err
//! ```

use crate::constants::layout;
use crate::error::{OrchestratorError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// What to do when the project directory already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExistingProjectPolicy {
    /// Refuse to touch an existing project
    Abort,
    /// Delete the existing project directory and start clean
    Overwrite,
    /// Keep the directory and write into it
    Reuse,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    project: String,
    project_dir: PathBuf,
}

impl ProjectLayout {
    pub fn new<P: AsRef<Path>>(output_root: P, project: &str) -> Self {
        Self {
            project: project.to_string(),
            project_dir: output_root.as_ref().join(project),
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn log_dir(&self) -> PathBuf {
        self.project_dir.join(layout::LOG_DIR)
    }

    pub fn slurm_dir(&self) -> PathBuf {
        self.project_dir.join(layout::SLURM_DIR)
    }

    pub fn runcard_dir(&self) -> PathBuf {
        self.project_dir.join(layout::RUNCARD_DIR)
    }

    pub fn gen_dir(&self) -> PathBuf {
        self.project_dir.join(layout::GEN_DIR)
    }

    pub fn batch_descriptor_path(&self, index: usize) -> PathBuf {
        self.slurm_dir().join(format!(
            "batch_{index}_{}.{}",
            self.project,
            layout::DESCRIPTOR_EXTENSION
        ))
    }

    pub fn merge_descriptor_path(&self) -> PathBuf {
        self.slurm_dir().join(format!(
            "{}_merge.{}",
            self.project,
            layout::DESCRIPTOR_EXTENSION
        ))
    }

    /// `(stdout, stderr)` log paths for batch `index`
    pub fn batch_log_paths(&self, index: usize) -> (PathBuf, PathBuf) {
        self.log_paths(&index.to_string())
    }

    pub fn merge_log_paths(&self) -> (PathBuf, PathBuf) {
        self.log_paths("merge")
    }

    fn log_paths(&self, suffix: &str) -> (PathBuf, PathBuf) {
        let log_dir = self.log_dir();
        (
            log_dir.join(format!("{}_{suffix}.out", self.project)),
            log_dir.join(format!("{}_{suffix}.err", self.project)),
        )
    }

    /// Apply `policy` to an existing project directory, then create the
    /// directory tree
    pub fn prepare(&self, policy: ExistingProjectPolicy) -> Result<()> {
        if self.project_dir.exists() {
            match policy {
                ExistingProjectPolicy::Abort => {
                    return Err(OrchestratorError::ProjectExists {
                        path: self.project_dir.clone(),
                    });
                }
                ExistingProjectPolicy::Overwrite => {
                    info!(project_dir = %self.project_dir.display(), "Removing existing project directory");
                    fs::remove_dir_all(&self.project_dir)
                        .map_err(|e| OrchestratorError::project_directory(&self.project_dir, e))?;
                }
                ExistingProjectPolicy::Reuse => {
                    debug!(project_dir = %self.project_dir.display(), "Reusing existing project directory");
                }
            }
        }
        self.ensure_directories()
    }

    /// `mkdir -p` for the log and descriptor directories
    pub fn ensure_directories(&self) -> Result<()> {
        for dir in [self.log_dir(), self.slurm_dir()] {
            fs::create_dir_all(&dir).map_err(|e| OrchestratorError::project_directory(&dir, e))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_follow_project_convention() {
        let layout = ProjectLayout::new("/data/out", "rho");
        assert_eq!(layout.project_dir(), Path::new("/data/out/rho"));
        assert_eq!(
            layout.batch_descriptor_path(3),
            PathBuf::from("/data/out/rho/slurm/batch_3_rho.slurm")
        );
        assert_eq!(
            layout.merge_descriptor_path(),
            PathBuf::from("/data/out/rho/slurm/rho_merge.slurm")
        );
        assert_eq!(
            layout.batch_log_paths(3),
            (
                PathBuf::from("/data/out/rho/log/rho_3.out"),
                PathBuf::from("/data/out/rho/log/rho_3.err")
            )
        );
        assert_eq!(
            layout.merge_log_paths().0,
            PathBuf::from("/data/out/rho/log/rho_merge.out")
        );
    }

    #[test]
    fn prepare_respects_policy() {
        let root = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(root.path(), "demo");

        layout.prepare(ExistingProjectPolicy::Abort).unwrap();
        assert!(layout.slurm_dir().is_dir());
        assert!(layout.log_dir().is_dir());

        let marker = layout.project_dir().join("marker");
        fs::write(&marker, "x").unwrap();

        assert!(matches!(
            layout.prepare(ExistingProjectPolicy::Abort),
            Err(OrchestratorError::ProjectExists { .. })
        ));

        layout.prepare(ExistingProjectPolicy::Reuse).unwrap();
        assert!(marker.exists());

        layout.prepare(ExistingProjectPolicy::Overwrite).unwrap();
        assert!(!marker.exists());
        assert!(layout.slurm_dir().is_dir());
    }
}
