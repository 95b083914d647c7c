//! Evaluation file discovery in result directories.
//!
//! A result directory holds one JSON file per track under its `test/`
//! subtree, e.g. `<root>/test/Al James - Schoolboy Facination.json`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Subtree of a result directory that holds the test set evaluations.
pub const TEST_SUBSET: &str = "test";

/// An evaluation file and the track it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalFile {
    /// Path to the JSON file.
    pub path: PathBuf,
    /// Track identifier, the file stem.
    pub track: String,
}

/// Find all evaluation files under `<root>/test/`, recursively.
///
/// Fails with [`Error::DirectoryNotFound`] if `root` does not exist. A root
/// without a `test/` subtree yields no files. Symlinked directories below
/// `test/` are not followed. Results are sorted by path.
pub fn discover_eval_files(root: &Path) -> Result<Vec<EvalFile>> {
    if !root.is_dir() {
        return Err(Error::DirectoryNotFound(root.to_path_buf()));
    }

    let subset = root.join(TEST_SUBSET);
    let mut files = Vec::new();

    if subset.is_dir() {
        discover_recursive(&subset, &mut files)?;
    } else {
        tracing::warn!(root = %root.display(), "no {TEST_SUBSET}/ subtree, nothing to scan");
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

/// Name of a result directory, used as the method name.
#[must_use]
pub fn method_name(root: &Path) -> String {
    root.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("method")
        .to_string()
}

fn discover_recursive(current: &Path, files: &mut Vec<EvalFile>) -> Result<()> {
    for entry in fs::read_dir(current)? {
        let entry = entry?;
        let path = entry.path();

        // Symlinked directories are not followed
        if entry.file_type()?.is_dir() {
            // Skip hidden directories
            if path
                .file_name()
                .and_then(|s| s.to_str())
                .map_or(false, |s| s.starts_with('.'))
            {
                continue;
            }
            discover_recursive(&path, files)?;
        } else if path.is_file() {
            if let Some(file) = eval_file(&path) {
                files.push(file);
            }
        }
    }

    Ok(())
}

fn eval_file(path: &Path) -> Option<EvalFile> {
    let extension = path.extension()?.to_str()?;
    if extension != "json" {
        return None;
    }
    let track = path.file_stem()?.to_str()?.to_string();
    Some(EvalFile {
        path: path.to_path_buf(),
        track,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_root_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = discover_eval_files(&missing).unwrap_err();
        assert!(matches!(err, Error::DirectoryNotFound(ref p) if *p == missing));
    }

    #[test]
    fn test_discovers_nested_json_under_test() {
        let dir = tempfile::tempdir().unwrap();
        let test = dir.path().join("test");
        fs::create_dir_all(test.join("sub")).unwrap();
        fs::create_dir_all(test.join(".hidden")).unwrap();
        fs::create_dir_all(dir.path().join("train")).unwrap();
        fs::write(test.join("b.json"), "{}").unwrap();
        fs::write(test.join("sub").join("a.json"), "{}").unwrap();
        fs::write(test.join("notes.txt"), "").unwrap();
        fs::write(test.join(".hidden").join("c.json"), "{}").unwrap();
        fs::write(dir.path().join("train").join("d.json"), "{}").unwrap();

        let files = discover_eval_files(dir.path()).unwrap();
        let tracks: Vec<&str> = files.iter().map(|f| f.track.as_str()).collect();
        assert_eq!(tracks, vec!["b", "a"]);
    }

    #[test]
    fn test_root_without_test_subset_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_eval_files(dir.path()).unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_directory_symlink_loop_is_not_followed() {
        use std::os::unix::fs::symlink;

        let dir = tempfile::tempdir().unwrap();
        let test = dir.path().join("test");
        fs::create_dir_all(test.join("sub")).unwrap();
        fs::write(test.join("sub").join("a.json"), "{}").unwrap();
        fs::write(dir.path().join("linked.json"), "{}").unwrap();
        symlink(&test, test.join("sub").join("loop")).unwrap();
        symlink(dir.path().join("linked.json"), test.join("linked.json")).unwrap();

        let files = discover_eval_files(dir.path()).unwrap();
        let tracks: Vec<&str> = files.iter().map(|f| f.track.as_str()).collect();
        assert_eq!(tracks, vec!["linked", "a"]);
    }

    #[test]
    fn test_method_name_is_base_name() {
        assert_eq!(method_name(Path::new("/results/UMX")), "UMX");
        assert_eq!(method_name(Path::new("results/open-unmix/")), "open-unmix");
    }
}
