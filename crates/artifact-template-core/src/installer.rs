//! Installation of a finished scratch tree into its final location.
//!
//! Installation is all-or-nothing with respect to conflicts: when overwriting
//! is not allowed and any projected path is already taken in the target (an
//! existing file, or a non-directory where the projection needs a directory),
//! nothing is written and the conflicting paths are reported instead.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::Result;
use crate::fs;

/// Paths the projection would have replaced, relative to the installation path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationConflict {
    pub installation_path: PathBuf,
    pub paths: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub installation_path: PathBuf,
    /// Files written, relative to the installation path, in copy order.
    pub files: Vec<PathBuf>,
}

/// Result of a projection run that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectionOutcome {
    Installed(InstallReport),
    AlreadyExists(InstallationConflict),
}

impl ProjectionOutcome {
    pub fn is_installed(&self) -> bool {
        matches!(self, Self::Installed(_))
    }
}

/// Move the contents of `scratch` into `target`, consuming the scratch tree.
pub fn install(scratch: TempDir, target: &Path, overwrite: bool) -> Result<ProjectionOutcome> {
    fs::ensure_dir(target)?;
    if !overwrite {
        let paths = fs::overlapping_paths(scratch.path(), target)?;
        if !paths.is_empty() {
            tracing::info!(
                "{} path(s) already exist in {}, nothing installed",
                paths.len(),
                target.display()
            );
            fs::close_temp_dir(scratch, "scratch directory");
            return Ok(ProjectionOutcome::AlreadyExists(InstallationConflict {
                installation_path: target.to_path_buf(),
                paths,
            }));
        }
    }

    let files = fs::copy_dir_merge(scratch.path(), target)?;
    fs::close_temp_dir(scratch, "scratch directory");
    tracing::info!("installed {} file(s) into {}", files.len(), target.display());

    Ok(ProjectionOutcome::Installed(InstallReport {
        installation_path: target.to_path_buf(),
        files,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_with(files: &[(&str, &str)]) -> TempDir {
        let dir = fs::create_temp_dir("scratch-").unwrap();
        for (rel, contents) in files {
            fs::write_file(&dir.path().join(rel), contents).unwrap();
        }
        dir
    }

    #[test]
    fn test_install_into_missing_target() {
        let root = tempfile::tempdir().unwrap();
        let target = root.path().join("out");
        let scratch = scratch_with(&[("a.txt", "a"), ("sub/b.txt", "b")]);
        let scratch_path = scratch.path().to_path_buf();

        let outcome = install(scratch, &target, false).unwrap();
        match outcome {
            ProjectionOutcome::Installed(report) => {
                assert_eq!(
                    report.files,
                    vec![PathBuf::from("a.txt"), PathBuf::from("sub/b.txt")]
                );
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(std::fs::read_to_string(target.join("sub/b.txt")).unwrap(), "b");
        assert!(!scratch_path.exists());
    }

    #[test]
    fn test_conflict_leaves_target_untouched() {
        let target = tempfile::tempdir().unwrap();
        fs::write_file(&target.path().join("README.md"), "mine").unwrap();
        let scratch = scratch_with(&[("README.md", "theirs"), ("new.txt", "new")]);

        let outcome = install(scratch, target.path(), false).unwrap();
        assert_eq!(
            outcome,
            ProjectionOutcome::AlreadyExists(InstallationConflict {
                installation_path: target.path().to_path_buf(),
                paths: vec![PathBuf::from("README.md")],
            })
        );
        assert_eq!(std::fs::read_to_string(target.path().join("README.md")).unwrap(), "mine");
        assert!(!target.path().join("new.txt").exists());
    }

    #[test]
    fn test_overwrite_replaces_and_keeps_unrelated() {
        let target = tempfile::tempdir().unwrap();
        fs::write_file(&target.path().join("README.md"), "mine").unwrap();
        fs::write_file(&target.path().join("notes.txt"), "keep").unwrap();
        let scratch = scratch_with(&[("README.md", "theirs")]);

        let outcome = install(scratch, target.path(), true).unwrap();
        assert!(outcome.is_installed());
        assert_eq!(std::fs::read_to_string(target.path().join("README.md")).unwrap(), "theirs");
        assert_eq!(std::fs::read_to_string(target.path().join("notes.txt")).unwrap(), "keep");
    }

    #[test]
    fn test_file_in_place_of_directory_is_a_conflict() {
        let target = tempfile::tempdir().unwrap();
        fs::write_file(&target.path().join("a"), "plain file").unwrap();
        let scratch = scratch_with(&[("0.txt", "zero"), ("a/b.txt", "b")]);

        let outcome = install(scratch, target.path(), false).unwrap();
        assert_eq!(
            outcome,
            ProjectionOutcome::AlreadyExists(InstallationConflict {
                installation_path: target.path().to_path_buf(),
                paths: vec![PathBuf::from("a")],
            })
        );
        assert!(!target.path().join("0.txt").exists());
        assert_eq!(std::fs::read_to_string(target.path().join("a")).unwrap(), "plain file");
    }

    #[test]
    fn test_overwrite_replaces_file_in_place_of_directory() {
        let target = tempfile::tempdir().unwrap();
        fs::write_file(&target.path().join("a"), "plain file").unwrap();
        let scratch = scratch_with(&[("0.txt", "zero"), ("a/b.txt", "b")]);

        let outcome = install(scratch, target.path(), true).unwrap();
        assert!(outcome.is_installed());
        assert_eq!(std::fs::read_to_string(target.path().join("0.txt")).unwrap(), "zero");
        assert_eq!(std::fs::read_to_string(target.path().join("a/b.txt")).unwrap(), "b");
    }
}
