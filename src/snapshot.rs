//! Private scratch copies of possibly locked database files.
//!
//! Browser history databases are usually held open (and journal-locked) by
//! the owning browser. Collectors never query the live file; they query a
//! private copy made here. The copy is read-only scratch input for one
//! collector invocation, never written back, and the scratch directory is
//! removed when the [`Snapshot`] is dropped, on every exit path.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A private copy of one source database file.
pub struct Snapshot {
    _dir: TempDir,
    path: PathBuf,
}

impl Snapshot {
    /// Path of the copied file inside the scratch directory.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Copy `src` into a fresh scratch directory.
///
/// Failure (file absent, permissions, transient I/O) is an ordinary error
/// the caller converts into a profile skip; it must never abort the run.
pub fn acquire(src: &Path) -> Result<Snapshot> {
    let dir = TempDir::new().context("cannot create scratch directory")?;
    let file_name = src
        .file_name()
        .with_context(|| format!("not a file path: {}", src.display()))?;
    let path = dir.path().join(file_name);
    fs::copy(src, &path).with_context(|| format!("cannot copy {}", src.display()))?;
    Ok(Snapshot { _dir: dir, path })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_file_into_scratch_dir() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("places.sqlite");
        fs::write(&src, b"not really sqlite").unwrap();

        let snap = acquire(&src).unwrap();
        assert_ne!(snap.path(), src);
        assert_eq!(fs::read(snap.path()).unwrap(), b"not really sqlite");
    }

    #[test]
    fn missing_file_is_an_error_not_a_panic() {
        let tmp = TempDir::new().unwrap();
        assert!(acquire(&tmp.path().join("absent.db")).is_err());
    }

    #[test]
    fn scratch_dir_is_removed_on_drop() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("History");
        fs::write(&src, b"x").unwrap();

        let copied_path;
        {
            let snap = acquire(&src).unwrap();
            copied_path = snap.path().to_path_buf();
            assert!(copied_path.exists());
        }
        assert!(!copied_path.exists());
    }
}
