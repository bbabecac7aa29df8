//! ROOT post-processing macros run after the executable.

use std::path::{Path, PathBuf};

/// One macro invocation, resolved against the base directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroInvocation {
    pub name: String,
    pub macro_path: PathBuf,
    pub output_path: PathBuf,
}

impl MacroInvocation {
    /// Resolve `macros/<name>`; the output lands in `output_dir`
    ///
    /// Batch runs name their output `batch<i>_analysis_<stem>.root` so the
    /// merge job's `batch*.root` glob picks it up.
    pub fn resolve(
        base_dir: &Path,
        name: &str,
        output_dir: &Path,
        batch_index: Option<usize>,
    ) -> Self {
        let stem = Path::new(name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.to_string());
        let file_name = match batch_index {
            Some(index) => format!("batch{index}_analysis_{stem}.root"),
            None => format!("analysis_{stem}.root"),
        };

        Self {
            name: name.to_string(),
            macro_path: base_dir.join("macros").join(name),
            output_path: output_dir.join(file_name),
        }
    }

    pub fn exists(&self) -> bool {
        self.macro_path.is_file()
    }

    /// `root -l -b -q '<macro>("<input_dir>","<output>")'`
    pub fn command_line(&self, input_dir: &Path) -> String {
        format!(
            "root -l -b -q '{}(\"{}\",\"{}\")'",
            self.macro_path.display(),
            input_dir.display(),
            self.output_path.display()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_output_matches_merge_glob() {
        let invocation = MacroInvocation::resolve(
            Path::new("/opt/sim"),
            "example_A_single_pion.C",
            Path::new("/out/demo"),
            Some(7),
        );
        assert_eq!(
            invocation.macro_path,
            PathBuf::from("/opt/sim/macros/example_A_single_pion.C")
        );
        assert_eq!(
            invocation.output_path,
            PathBuf::from("/out/demo/batch7_analysis_example_A_single_pion.root")
        );
    }

    #[test]
    fn standalone_output_has_no_batch_prefix() {
        let invocation =
            MacroInvocation::resolve(Path::new("."), "rho.C", Path::new("/out/demo/gen"), None);
        assert_eq!(
            invocation.output_path,
            PathBuf::from("/out/demo/gen/analysis_rho.root")
        );
    }

    #[test]
    fn command_passes_input_and_output() {
        let invocation =
            MacroInvocation::resolve(Path::new("/opt"), "m.C", Path::new("/o"), Some(0));
        assert_eq!(
            invocation.command_line(Path::new("/o/gen")),
            "root -l -b -q '/opt/macros/m.C(\"/o/gen\",\"/o/batch0_analysis_m.root\")'"
        );
        assert!(!invocation.exists());
    }
}
