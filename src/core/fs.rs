//! core::fs
//!
//! File-system environment shared by backends, editors and the evaluator.
//!
//! # Lifetimes
//!
//! Every scratch directory is allocated with a [`Lifetime`] that decides
//! when it becomes eligible for removal:
//!
//! - [`Lifetime::CurrentTask`] - removed by [`FileSystem::end_task`]
//! - [`Lifetime::Run`] - removed by [`FileSystem::end_run`]
//! - [`Lifetime::Persistent`] - never removed
//!
//! The `FileSystem` is an explicit object passed to whoever needs it; there
//! is no process-wide instance.
//!
//! # Example
//!
//! ```no_run
//! use moe::core::fs::{FileSystem, Lifetime};
//!
//! let fs = FileSystem::new();
//! let scratch = fs.temporary_directory("export_", Lifetime::CurrentTask)?;
//! // ... populate scratch ...
//! fs.end_task();
//! assert!(!scratch.exists());
//! # Ok::<(), std::io::Error>(())
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use walkdir::WalkDir;

/// When a temporary directory becomes eligible for cleanup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifetime {
    /// Cleaned up when the current logical task completes.
    CurrentTask,
    /// Cleaned up when the whole run terminates.
    Run,
    /// Never cleaned up.
    Persistent,
}

impl Lifetime {
    fn ends_with_task(self) -> bool {
        self == Lifetime::CurrentTask
    }

    fn ends_with_run(self) -> bool {
        self != Lifetime::Persistent
    }
}

/// Allocates and tracks scratch directories.
#[derive(Debug)]
pub struct FileSystem {
    root: PathBuf,
    allocated: Mutex<Vec<(PathBuf, Lifetime)>>,
}

impl Default for FileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem {
    /// Create a file system allocating under the platform temp directory.
    pub fn new() -> Self {
        Self::with_root(std::env::temp_dir())
    }

    /// Create a file system allocating under `root`.
    ///
    /// This is primarily useful for testing.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            allocated: Mutex::new(Vec::new()),
        }
    }

    /// Directory under which scratch directories are created.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Allocate a fresh, empty directory whose name starts with `prefix`.
    pub fn temporary_directory(&self, prefix: &str, lifetime: Lifetime) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.root)?;
        let path = tempfile::Builder::new()
            .prefix(prefix)
            .tempdir_in(&self.root)?
            .keep();
        tracing::debug!(path = %path.display(), ?lifetime, "allocated temporary directory");
        self.track(&path, lifetime);
        Ok(path)
    }

    /// Record an externally created path so it is cleaned up with `lifetime`.
    pub fn track(&self, path: &Path, lifetime: Lifetime) {
        if let Ok(mut allocated) = self.allocated.lock() {
            allocated.push((path.to_path_buf(), lifetime));
        }
    }

    /// Remove every directory whose lifetime ends with the current task.
    pub fn end_task(&self) {
        self.clean_up(Lifetime::ends_with_task);
    }

    /// Remove every directory whose lifetime ends with the run.
    pub fn end_run(&self) {
        self.clean_up(Lifetime::ends_with_run);
    }

    fn clean_up(&self, expired: fn(Lifetime) -> bool) {
        let Ok(mut allocated) = self.allocated.lock() else {
            return;
        };
        allocated.retain(|(path, lifetime)| {
            if !expired(*lifetime) {
                return true;
            }
            if let Err(e) = remove_path(path) {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove temporary directory");
            }
            false
        });
    }

    /// Number of directories still tracked.
    pub fn tracked_count(&self) -> usize {
        self.allocated.lock().map(|a| a.len()).unwrap_or(0)
    }
}

fn remove_path(path: &Path) -> io::Result<()> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Copy a file or a directory tree from `src` to `dest`.
///
/// When `src` is a file it is copied to `dest` itself; when it is a
/// directory its contents are copied beneath `dest`, which is created if
/// needed.
pub fn copy_dir(src: &Path, dest: &Path) -> io::Result<()> {
    if src.is_file() {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(src, dest)?;
        return Ok(());
    }

    fs::create_dir_all(dest)?;
    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry.map_err(io::Error::other)?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(io::Error::other)?;
        let target = dest.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// List every regular file beneath `root` as a `/`-separated relative path.
///
/// Directories named in `skip_dirs` (e.g. `.git`) are not descended into.
/// The result is sorted.
pub fn find_files(root: &Path, skip_dirs: &[&str]) -> io::Result<Vec<String>> {
    let mut files = Vec::new();
    let walker = WalkDir::new(root).min_depth(1).into_iter().filter_entry(|e| {
        !(e.file_type().is_dir()
            && e.file_name()
                .to_str()
                .is_some_and(|name| skip_dirs.contains(&name)))
    });
    for entry in walker {
        let entry = entry.map_err(io::Error::other)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(io::Error::other)?;
        let parts: Vec<_> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        files.push(parts.join("/"));
    }
    files.sort();
    Ok(files)
}

/// Remove every directory beneath `root` that holds no files, innermost
/// first. Directories named in `skip_dirs` are left untouched.
pub fn prune_empty_dirs(root: &Path, skip_dirs: &[&str]) -> io::Result<()> {
    let walker = WalkDir::new(root)
        .min_depth(1)
        .contents_first(true)
        .into_iter()
        .filter_entry(|e| {
            !e.file_name()
                .to_str()
                .is_some_and(|name| skip_dirs.contains(&name))
        });
    for entry in walker {
        let entry = entry.map_err(io::Error::other)?;
        if !entry.file_type().is_dir() {
            continue;
        }
        if fs::read_dir(entry.path())?.next().is_none() {
            fs::remove_dir(entry.path())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn prune_empty_dirs_keeps_populated_and_skipped() {
        let root = TempDir::new().unwrap();
        std::fs::create_dir_all(root.path().join("empty/nested/deeper")).unwrap();
        std::fs::create_dir_all(root.path().join("full/hollow")).unwrap();
        std::fs::write(root.path().join("full/f.txt"), "f").unwrap();
        std::fs::create_dir_all(root.path().join(".git/refs")).unwrap();

        prune_empty_dirs(root.path(), &[".git"]).unwrap();

        assert!(!root.path().join("empty").exists());
        assert!(!root.path().join("full/hollow").exists());
        assert!(root.path().join("full/f.txt").exists());
        assert!(root.path().join(".git/refs").exists());
        assert!(root.path().exists());
    }

    #[test]
    fn task_directories_removed_at_end_of_task() {
        let root = TempDir::new().unwrap();
        let fs = FileSystem::with_root(root.path());

        let task = fs.temporary_directory("task_", Lifetime::CurrentTask).unwrap();
        let run = fs.temporary_directory("run_", Lifetime::Run).unwrap();
        let keep = fs.temporary_directory("keep_", Lifetime::Persistent).unwrap();

        fs.end_task();
        assert!(!task.exists());
        assert!(run.exists());
        assert!(keep.exists());

        fs.end_run();
        assert!(!run.exists());
        assert!(keep.exists());
        assert_eq!(fs.tracked_count(), 1);
    }

    #[test]
    fn temporary_directory_uses_prefix() {
        let root = TempDir::new().unwrap();
        let fs = FileSystem::with_root(root.path());
        let dir = fs.temporary_directory("file_codebase_copy_", Lifetime::Run).unwrap();
        let name = dir.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("file_codebase_copy_"));
        assert!(dir.starts_with(root.path()));
    }

    #[test]
    fn copy_dir_copies_nested_tree() {
        let src = TempDir::new().unwrap();
        std::fs::create_dir_all(src.path().join("a/b")).unwrap();
        std::fs::write(src.path().join("a/b/c.txt"), "c").unwrap();
        std::fs::write(src.path().join("top.txt"), "top").unwrap();

        let dest = TempDir::new().unwrap();
        copy_dir(src.path(), &dest.path().join("out")).unwrap();

        let files = find_files(&dest.path().join("out"), &[]).unwrap();
        assert_eq!(files, vec!["a/b/c.txt", "top.txt"]);
    }

    #[test]
    fn copy_dir_copies_single_file() {
        let src = TempDir::new().unwrap();
        let file = src.path().join("one.txt");
        std::fs::write(&file, "1").unwrap();

        let dest = TempDir::new().unwrap();
        let target = dest.path().join("copy/one.txt");
        copy_dir(&file, &target).unwrap();
        assert_eq!(std::fs::read_to_string(target).unwrap(), "1");
    }

    #[test]
    fn find_files_skips_named_dirs() {
        let root = TempDir::new().unwrap();
        std::fs::create_dir_all(root.path().join(".git/objects")).unwrap();
        std::fs::write(root.path().join(".git/objects/x"), "x").unwrap();
        std::fs::write(root.path().join("kept.rs"), "").unwrap();

        let files = find_files(root.path(), &[".git"]).unwrap();
        assert_eq!(files, vec!["kept.rs"]);
    }
}
