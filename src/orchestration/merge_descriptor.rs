//! # Merge Job Generator
//!
//! Builds the terminal aggregation job. Its dependency directive is the
//! [`DependencyExpression`] verbatim; the body runs the aggregation tool over
//! every per-batch artifact and, when retention is enabled, prunes all but
//! one of those artifacts afterwards.

use super::dependency::DependencyExpression;
use crate::config::OrchestrationConfig;
use crate::layout::ProjectLayout;
use crate::models::MergeJob;
use crate::utils::shell;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct MergeJobGenerator {
    config: Arc<OrchestrationConfig>,
    layout: ProjectLayout,
}

impl MergeJobGenerator {
    pub fn new(config: Arc<OrchestrationConfig>, layout: ProjectLayout) -> Self {
        Self { config, layout }
    }

    pub fn generate(&self, dependency: DependencyExpression) -> MergeJob {
        let (out_log, err_log) = self.layout.merge_log_paths();

        let mut command_lines = vec![self.aggregation_command()];
        if self.config.merge.retain_representative {
            command_lines.push(self.cleanup_command());
        }

        MergeJob {
            dependency_expression: dependency,
            name: format!("{}_merge", self.config.project_name),
            resource_spec: self.config.merge_resources.clone(),
            out_log_path: out_log,
            err_log_path: err_log,
            command_lines,
            descriptor_path: self.layout.merge_descriptor_path(),
        }
    }

    /// `hadd -f {project}/analysis.root {project}/batch*.root`
    fn aggregation_command(&self) -> String {
        let merge = &self.config.merge;
        let output = self.layout.project_dir().join(&merge.output_file);
        format!(
            "{} -f {} {}",
            merge.tool,
            shell::quote(&output.display().to_string()),
            self.input_glob()
        )
    }

    /// Keep the first artifact in sort order, only once the combined output
    /// exists and is non-empty
    ///
    /// Names travel NUL-separated so paths containing whitespace survive.
    fn cleanup_command(&self) -> String {
        let output = self
            .layout
            .project_dir()
            .join(&self.config.merge.output_file);
        format!(
            "[ -s {} ] && printf '%s\\0' {} | sort -z | tail -z -n +2 | xargs -0 -r rm -f",
            shell::quote(&output.display().to_string()),
            self.input_glob()
        )
    }

    // directory quoted, glob left bare so the shell expands it
    fn input_glob(&self) -> String {
        format!(
            "{}/{}",
            shell::quote(&self.layout.project_dir().display().to_string()),
            self.config.merge.input_glob
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CollectedIdentifiers, JobIdentifier};
    use crate::orchestration::dependency::DependencyGraphBuilder;
    use std::path::PathBuf;

    fn config(retain: bool) -> Arc<OrchestrationConfig> {
        let mut config = OrchestrationConfig {
            project_name: "demo".to_string(),
            executable_name: "dis".to_string(),
            output_dir: PathBuf::from("/work/out"),
            ..Default::default()
        };
        config.merge.retain_representative = retain;
        Arc::new(config)
    }

    fn generator(retain: bool) -> MergeJobGenerator {
        MergeJobGenerator::new(config(retain), ProjectLayout::new("/work/out", "demo"))
    }

    fn dependency(ids: &[&str]) -> DependencyExpression {
        let collected: CollectedIdentifiers = ids.iter().map(|id| JobIdentifier::from(*id)).collect();
        DependencyGraphBuilder::build(&collected)
    }

    #[test]
    fn dependency_directive_is_verbatim() {
        let job = generator(false).generate(dependency(&["1", "2", "3"]));
        let descriptor = job.descriptor();
        assert_eq!(descriptor.dependency(), Some("afterok:1:2:3"));
        assert_eq!(descriptor.job_name(), Some("demo_merge"));
        assert!(descriptor
            .render()
            .contains("#SBATCH --dependency=afterok:1:2:3\n"));
    }

    #[test]
    fn aggregation_uses_merge_resources_and_paths() {
        let job = generator(false).generate(dependency(&["9"]));
        assert_eq!(
            job.command_line(),
            "hadd -f /work/out/demo/analysis.root /work/out/demo/batch*.root"
        );
        assert_eq!(job.command_lines.len(), 1);
        assert_eq!(job.resource_spec.mem_per_cpu_mb, 8000);
        assert_eq!(job.out_log_path, PathBuf::from("/work/out/demo/log/demo_merge.out"));
        assert_eq!(
            job.descriptor_path,
            PathBuf::from("/work/out/demo/slurm/demo_merge.slurm")
        );
    }

    #[test]
    fn retention_adds_cleanup_after_aggregation() {
        let job = generator(true).generate(dependency(&["9"]));
        assert_eq!(job.command_lines.len(), 2);
        assert_eq!(
            job.command_lines[1],
            "[ -s /work/out/demo/analysis.root ] && printf '%s\\0' /work/out/demo/batch*.root | sort -z | tail -z -n +2 | xargs -0 -r rm -f"
        );
        let rendered = job.descriptor().render();
        let aggregate = rendered.find("hadd").unwrap();
        let cleanup = rendered.find("xargs").unwrap();
        assert!(aggregate < cleanup);
    }

    #[cfg(unix)]
    #[test]
    fn cleanup_keeps_one_artifact_in_directory_with_spaces() {
        let root = tempfile::tempdir().unwrap();
        let output_root = root.path().join("my runs");
        let layout = ProjectLayout::new(&output_root, "demo");
        std::fs::create_dir_all(layout.project_dir()).unwrap();
        for name in ["batch0_analysis_a.root", "batch1_analysis_a.root", "batch2_analysis_a.root"] {
            std::fs::write(layout.project_dir().join(name), "x").unwrap();
        }
        std::fs::write(layout.project_dir().join("analysis.root"), "merged").unwrap();
        std::fs::write(root.path().join("batch9.root"), "outside").unwrap();

        let mut config = OrchestrationConfig {
            project_name: "demo".to_string(),
            executable_name: "dis".to_string(),
            output_dir: output_root.clone(),
            ..Default::default()
        };
        config.merge.retain_representative = true;
        let job = MergeJobGenerator::new(Arc::new(config), layout.clone()).generate(dependency(&["1"]));
        assert!(job.command_lines[1].contains("'"));

        let status = std::process::Command::new("sh")
            .arg("-c")
            .arg(&job.command_lines[1])
            .current_dir(root.path())
            .status()
            .unwrap();
        assert!(status.success());

        let mut remaining: Vec<String> = std::fs::read_dir(layout.project_dir())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        remaining.sort();
        assert_eq!(remaining, vec!["analysis.root", "batch0_analysis_a.root"]);
        assert!(root.path().join("batch9.root").exists());
    }

    #[test]
    fn degenerate_dependency_still_generates() {
        let job = generator(false).generate(dependency(&[]));
        assert!(job.dependency_expression.is_degenerate());
        assert_eq!(job.descriptor().dependency(), Some("afterok:"));
    }
}
