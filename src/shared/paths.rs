//! Path utilities
//!
//! Input enumeration for the Emitter and output naming for the store step.

use crate::error::MarkError;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Prefix inserted before the file name of every stored image
pub const DEFAULT_OUTPUT_PREFIX: &str = "out_";

/// Something the Emitter can enumerate input paths from
pub trait InputSource: Sync {
    /// Enumerate the input paths, in no guaranteed order
    fn list(&self) -> Result<Vec<PathBuf>, MarkError>;

    /// Number of inputs when known without enumerating
    fn len_hint(&self) -> Option<usize> {
        None
    }
}

/// Flat listing of a single directory
#[derive(Debug, Clone)]
pub struct DirectoryInput {
    root: PathBuf,
}

impl DirectoryInput {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl InputSource for DirectoryInput {
    fn list(&self) -> Result<Vec<PathBuf>, MarkError> {
        list_entries(&self.root)
    }
}

impl InputSource for Vec<PathBuf> {
    fn list(&self) -> Result<Vec<PathBuf>, MarkError> {
        Ok(self.clone())
    }

    fn len_hint(&self) -> Option<usize> {
        Some(self.len())
    }
}

/// List every entry directly inside `dir`.
///
/// Subdirectories are listed too; they simply fail to decode later. The
/// order is whatever the filesystem yields.
pub fn list_entries(dir: &Path) -> Result<Vec<PathBuf>, MarkError> {
    let mut entries = Vec::new();

    // min_depth(1) skips the root itself; `.` and `..` are never yielded
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| MarkError::Directory {
            path: dir.to_path_buf(),
            source: e.into(),
        })?;
        entries.push(entry.into_path());
    }

    Ok(entries)
}

/// Derive the output path by inserting `prefix` right after the last path
/// separator of `source`. The directory part is kept unchanged.
///
/// Already prefixed paths get prefixed again (`out_out_a.png`).
pub fn output_path(source: &Path, prefix: &str) -> PathBuf {
    match source.file_name() {
        Some(name) => {
            let mut prefixed = OsString::from(prefix);
            prefixed.push(name);
            source.with_file_name(prefixed)
        }
        None => source.join(prefix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_output_path_keeps_directory() {
        let out = output_path(Path::new("images/set1/cat.jpg"), DEFAULT_OUTPUT_PREFIX);
        assert_eq!(out, PathBuf::from("images/set1/out_cat.jpg"));
    }

    #[test]
    fn test_output_path_without_directory() {
        let out = output_path(Path::new("cat.jpg"), DEFAULT_OUTPUT_PREFIX);
        assert_eq!(out, PathBuf::from("out_cat.jpg"));
    }

    #[test]
    fn test_output_path_double_prefix() {
        let once = output_path(Path::new("imgs/a.png"), "out_");
        let twice = output_path(&once, "out_");
        assert_eq!(twice, PathBuf::from("imgs/out_out_a.png"));
    }

    #[test]
    fn test_list_entries() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        fs::write(temp_dir.path().join("a.png"), b"x")?;
        fs::write(temp_dir.path().join("b.png"), b"y")?;
        fs::create_dir(temp_dir.path().join("nested"))?;
        fs::write(temp_dir.path().join("nested").join("c.png"), b"z")?;

        let mut entries = list_entries(temp_dir.path())?;
        entries.sort();

        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(|p| p.parent() == Some(temp_dir.path())));
        assert!(entries.iter().any(|p| p.ends_with("nested")));
        Ok(())
    }

    #[test]
    fn test_list_entries_missing_directory() {
        let err = list_entries(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, MarkError::Directory { .. }));
    }
}
