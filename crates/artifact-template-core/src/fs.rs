//! Filesystem primitives for projection: scratch directories, unzip,
//! tree copy/merge and overlap detection.
//!
//! Tree walks are sorted by file name so a projection writes files in the
//! same order on every run.

use std::collections::BTreeSet;
use std::io::{Read, Seek};
use std::path::{Component, Path, PathBuf};

use tempfile::TempDir;
use walkdir::WalkDir;

/// Create a uniquely named directory in the system temp location.
///
/// The directory is removed when the returned guard is dropped or closed.
pub fn create_temp_dir(prefix: &str) -> std::io::Result<TempDir> {
    tempfile::Builder::new()
        .prefix(&format!("{prefix}{}-", uuid::Uuid::new_v4()))
        .tempdir()
}

/// Close a temp dir, logging (not failing) when removal does not succeed.
pub fn close_temp_dir(dir: TempDir, what: &str) {
    let path = dir.path().to_path_buf();
    if let Err(e) = dir.close() {
        tracing::warn!("failed to delete {what} {}: {e}", path.display());
    }
}

pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(path)
}

/// Extract a zip archive into `dest`.
pub fn unzip<R: Read + Seek>(reader: R, dest: &Path) -> zip::result::ZipResult<()> {
    let mut archive = zip::ZipArchive::new(reader)?;
    archive.extract(dest)
}

/// Copy a file, creating parent directories as needed.
pub fn copy_file(src: &Path, dst: &Path) -> std::io::Result<()> {
    if let Some(parent) = dst.parent() {
        ensure_dir(parent)?;
    }
    std::fs::copy(src, dst)?;
    Ok(())
}

/// Write a file, creating parent directories as needed.
pub fn write_file(dst: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = dst.parent() {
        ensure_dir(parent)?;
    }
    std::fs::write(dst, contents)
}

/// Copy a file or a whole directory tree to `dst`.
pub fn copy_path(src: &Path, dst: &Path) -> std::io::Result<()> {
    if src.is_dir() {
        copy_dir_merge(src, dst).map(|_| ())
    } else {
        copy_file(src, dst)
    }
}

/// Merge the tree under `src` into `dst`.
///
/// Files present in both are overwritten; files only in `dst` are left alone.
/// An entry of `dst` whose type differs from the one in `src` (a file where a
/// directory goes, or the reverse) is replaced. Empty directories are
/// reproduced. Returns the relative paths of the files copied.
pub fn copy_dir_merge(src: &Path, dst: &Path) -> std::io::Result<Vec<PathBuf>> {
    ensure_dir(dst)?;

    let mut copied = Vec::new();
    for entry in WalkDir::new(src).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        let rel = relative_to(entry.path(), src);
        let target = dst.join(&rel);
        let is_dir = entry.file_type().is_dir();

        if let Ok(existing) = target.symlink_metadata() {
            if is_dir && !existing.is_dir() {
                std::fs::remove_file(&target)?;
            } else if !is_dir && existing.is_dir() {
                std::fs::remove_dir_all(&target)?;
            }
        }

        if is_dir {
            ensure_dir(&target)?;
        } else {
            copy_file(entry.path(), &target)?;
            copied.push(rel);
        }
    }
    Ok(copied)
}

/// Relative paths of every file (not directory) under `root`.
#[cfg(test)]
pub(crate) fn relative_files(root: &Path) -> std::io::Result<BTreeSet<PathBuf>> {
    let mut files = BTreeSet::new();
    if !root.exists() {
        return Ok(files);
    }
    for entry in WalkDir::new(root).min_depth(1) {
        let entry = entry?;
        if !entry.file_type().is_dir() {
            files.insert(relative_to(entry.path(), root));
        }
    }
    Ok(files)
}

/// Paths under `source` that cannot be merged into `target` without replacing
/// something there: files whose path already exists under `target`, and
/// directories whose path is taken by a non-directory. Sorted.
pub fn overlapping_paths(source: &Path, target: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut overlap = BTreeSet::new();
    if !source.exists() {
        return Ok(Vec::new());
    }

    let mut walker = WalkDir::new(source).min_depth(1).sort_by_file_name().into_iter();
    while let Some(entry) = walker.next() {
        let entry = entry?;
        let rel = relative_to(entry.path(), source);
        let Ok(existing) = target.join(&rel).symlink_metadata() else {
            continue;
        };

        if !entry.file_type().is_dir() {
            overlap.insert(rel);
        } else if !existing.is_dir() {
            // Nothing below it can be written either.
            overlap.insert(rel);
            walker.skip_current_dir();
        }
    }
    Ok(overlap.into_iter().collect())
}

/// Normalize a template-supplied relative path: drop `.` components, reject
/// absolute paths and any `..`. Returns `None` when the path would escape.
pub fn clean_relative(path: &str) -> Option<PathBuf> {
    let mut cleaned = PathBuf::new();
    for component in Path::new(path).components() {
        match component {
            Component::Normal(part) => cleaned.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(cleaned)
}

fn relative_to(path: &Path, root: &Path) -> PathBuf {
    path.strip_prefix(root).unwrap_or(path).to_path_buf()
}
