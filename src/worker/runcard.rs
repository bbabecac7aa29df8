//! Run-card handling for the worker.

use super::WorkerError;
use std::path::{Path, PathBuf};

/// Destination of a run card inside the project, honouring the prefix
pub fn destination(runcard_dir: &Path, run_card: &str, prefix: Option<&str>) -> PathBuf {
    match prefix.filter(|p| !p.is_empty()) {
        Some(prefix) => runcard_dir.join(format!("{prefix}_{run_card}")),
        None => runcard_dir.join(run_card),
    }
}

/// Copy `./runcards/<run_card>` into the project
pub fn install(source_dir: &Path, destination: &Path, run_card: &str) -> Result<(), WorkerError> {
    let source = source_dir.join(run_card);
    std::fs::copy(&source, destination).map_err(|e| WorkerError::RunCard {
        path: source,
        reason: e.to_string(),
    })?;
    Ok(())
}

/// Command-line options stored in a clasdis run card
///
/// Everything after `#` on a line is a comment; blank lines are skipped and
/// the remaining options are joined by single spaces.
pub fn command_options(contents: &str) -> String {
    contents
        .lines()
        .filter_map(|line| {
            let option = line.split('#').next().unwrap_or_default().trim();
            (!option.is_empty()).then_some(option)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_comments_and_blank_lines() {
        let card = "# clasdis settings\n--beam 10.6   # GeV\n\n--t 15 35\n   \n--ycut 0.01\n";
        assert_eq!(command_options(card), "--beam 10.6 --t 15 35 --ycut 0.01");
    }

    #[test]
    fn empty_card_yields_no_options() {
        assert_eq!(command_options("# only comments\n\n"), "");
    }

    #[test]
    fn prefix_is_prepended() {
        let dir = Path::new("/p/runcards");
        assert_eq!(
            destination(dir, "dis.cmnd", Some("v2")),
            PathBuf::from("/p/runcards/v2_dis.cmnd")
        );
        assert_eq!(
            destination(dir, "dis.cmnd", Some("")),
            PathBuf::from("/p/runcards/dis.cmnd")
        );
        assert_eq!(destination(dir, "dis.cmnd", None), PathBuf::from("/p/runcards/dis.cmnd"));
    }

    #[test]
    fn install_copies_card() {
        let source = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        std::fs::write(source.path().join("dis.cmnd"), "Beams:eCM = 100\n").unwrap();

        let dest = target.path().join("dis.cmnd");
        install(source.path(), &dest, "dis.cmnd").unwrap();
        assert_eq!(std::fs::read_to_string(dest).unwrap(), "Beams:eCM = 100\n");

        let err = install(source.path(), &target.path().join("x"), "missing.cmnd").unwrap_err();
        assert!(matches!(err, WorkerError::RunCard { .. }));
    }
}
