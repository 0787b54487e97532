//! git::interface
//!
//! Git interface implementation using git2.
//!
//! This module provides the **single doorway** to all Git operations in moe.
//! The git backend clones, reads history, exports trees and commits through
//! this interface, which normalizes git2 errors into typed categories.
//!
//! # Architecture
//!
//! The `Git` struct is the only way to interact with a Git repository.
//! No other module should import `git2` directly. This ensures:
//!
//! - Consistent error handling across all Git operations
//! - Commit ids cross the boundary as full hex strings
//!
//! # Error Handling
//!
//! Git errors are categorized into typed variants:
//! - [`GitError::NotARepo`]: Not a Git working copy
//! - [`GitError::CloneFailed`]: The source could not be cloned
//! - [`GitError::RevisionNotFound`]: A rev-spec did not name a commit
//! - [`GitError::Io`]: Writing exported files failed
//!
//! # Example
//!
//! ```ignore
//! use moe::git::Git;
//! use std::path::Path;
//!
//! let git = Git::clone_from("https://example.com/repo.git", None, Path::new("/tmp/x"))?;
//! let head = git.resolve("HEAD")?;
//! let info = git.commit_info(&head)?;
//! println!("{} by {}", info.message.trim(), info.author_name);
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors from Git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not a Git working copy.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was opened
        path: PathBuf,
    },

    /// Repository is bare (no working directory).
    #[error("bare repository not supported")]
    BareRepo,

    /// Cloning failed.
    #[error("failed to clone {url}: {message}")]
    CloneFailed {
        /// The clone source
        url: String,
        /// What git2 reported
        message: String,
    },

    /// A rev-spec did not resolve to a commit.
    #[error("revision not found: {spec}")]
    RevisionNotFound {
        /// The rev-spec that was looked up
        spec: String,
    },

    /// Object not found in repository.
    #[error("object not found: {oid}")]
    ObjectNotFound {
        /// The OID that was not found
        oid: String,
    },

    /// Invalid object id format.
    #[error("invalid object id: {oid}")]
    InvalidOid {
        /// The invalid OID string
        oid: String,
    },

    /// Permission or filesystem error inside the repository.
    #[error("repository access error: {message}")]
    AccessError {
        /// Description of the error
        message: String,
    },

    /// Writing files outside the repository failed.
    #[error("failed to write '{path}': {source}")]
    Io {
        /// The file being written
        path: PathBuf,
        /// The underlying error
        source: std::io::Error,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl GitError {
    /// Create a GitError from a git2::Error with richer context.
    fn from_git2(err: git2::Error, context: &str) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound => GitError::ObjectNotFound {
                oid: context.to_string(),
            },
            git2::ErrorCode::InvalidSpec => GitError::InvalidOid {
                oid: context.to_string(),
            },
            git2::ErrorCode::Locked => GitError::AccessError {
                message: format!("repository is locked: {}", err.message()),
            },
            _ => GitError::Internal {
                message: format!("{}: {}", context, err.message()),
            },
        }
    }

    fn io(path: &Path, source: std::io::Error) -> Self {
        GitError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl From<git2::Error> for GitError {
    fn from(err: git2::Error) -> Self {
        GitError::Internal {
            message: err.message().to_string(),
        }
    }
}

/// Information about a commit.
#[derive(Debug, Clone)]
pub struct CommitInfo {
    /// Full commit id
    pub id: String,
    /// Full commit message
    pub message: String,
    /// Author name
    pub author_name: String,
    /// Author email
    pub author_email: String,
    /// Author timestamp
    pub author_time: chrono::DateTime<chrono::Utc>,
    /// Parent commit ids, first parent first
    pub parents: Vec<String>,
}

/// Author identity and time for a new commit.
#[derive(Debug, Clone)]
pub struct CommitAuthor {
    pub name: String,
    pub email: String,
    pub time: chrono::DateTime<chrono::Utc>,
}

/// The Git interface.
///
/// This is the **single point of interaction** with Git. A `Git` owns one
/// working copy. It is not `Sync`; callers that share a working copy keep
/// its path and open a `Git` per operation.
pub struct Git {
    /// The underlying git2 repository
    repo: git2::Repository,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl Git {
    // =========================================================================
    // Repository Opening
    // =========================================================================

    /// Open the working copy rooted at `path`.
    ///
    /// Unlike discovery, this does not search parent directories: a clone
    /// that was never completed must not silently resolve to an enclosing
    /// repository.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if `path` is not a working copy
    /// - [`GitError::BareRepo`] if the repository has no working directory
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::open(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;

        if repo.is_bare() {
            return Err(GitError::BareRepo);
        }

        Ok(Self { repo })
    }

    /// Clone `url` into `dest`, checking out `branch` if given.
    ///
    /// `url` may be anything git2 can fetch from, including a local path.
    pub fn clone_from(url: &str, branch: Option<&str>, dest: &Path) -> Result<Self, GitError> {
        let mut builder = git2::build::RepoBuilder::new();
        if let Some(branch) = branch {
            builder.branch(branch);
        }

        let repo = builder
            .clone(url, dest)
            .map_err(|e| GitError::CloneFailed {
                url: url.to_string(),
                message: e.message().to_string(),
            })?;

        tracing::debug!(url, dest = %dest.display(), "cloned repository");
        Ok(Self { repo })
    }

    // =========================================================================
    // Commit Queries
    // =========================================================================

    /// Resolve a rev-spec (`HEAD`, a branch, a short or full id) to the
    /// full id of the commit it names.
    ///
    /// # Errors
    ///
    /// - [`GitError::RevisionNotFound`] if nothing matches, or the object
    ///   is not a commit
    pub fn resolve(&self, spec: &str) -> Result<String, GitError> {
        let not_found = || GitError::RevisionNotFound {
            spec: spec.to_string(),
        };
        let object = self.repo.revparse_single(spec).map_err(|_| not_found())?;
        let commit = object.peel_to_commit().map_err(|_| not_found())?;
        Ok(commit.id().to_string())
    }

    fn find_commit(&self, id: &str) -> Result<git2::Commit<'_>, GitError> {
        let oid = git2::Oid::from_str(id).map_err(|e| GitError::from_git2(e, id))?;
        self.repo
            .find_commit(oid)
            .map_err(|e| GitError::from_git2(e, id))
    }

    /// Get information about a commit.
    ///
    /// # Errors
    ///
    /// - [`GitError::ObjectNotFound`] if the commit doesn't exist
    pub fn commit_info(&self, id: &str) -> Result<CommitInfo, GitError> {
        let commit = self.find_commit(id)?;

        let author = commit.author();
        let author_time = chrono::DateTime::from_timestamp(author.when().seconds(), 0)
            .unwrap_or(chrono::DateTime::UNIX_EPOCH);

        Ok(CommitInfo {
            id: commit.id().to_string(),
            message: commit.message().unwrap_or("").to_string(),
            author_name: author.name().unwrap_or("").to_string(),
            author_email: author.email().unwrap_or("").to_string(),
            author_time,
            parents: commit.parent_ids().map(|p| p.to_string()).collect(),
        })
    }

    // =========================================================================
    // Trees
    // =========================================================================

    /// Write the files of commit `id` into `dest`.
    ///
    /// Gitlinks (submodules) are skipped. The working copy and index are
    /// not touched.
    pub fn export_tree(&self, id: &str, dest: &Path) -> Result<(), GitError> {
        let commit = self.find_commit(id)?;
        let tree = commit.tree().map_err(|e| GitError::from_git2(e, id))?;
        self.write_tree_into(&tree, dest)
    }

    fn write_tree_into(&self, tree: &git2::Tree<'_>, dir: &Path) -> Result<(), GitError> {
        std::fs::create_dir_all(dir).map_err(|e| GitError::io(dir, e))?;

        for entry in tree.iter() {
            let Some(name) = entry.name() else {
                continue;
            };
            let path = dir.join(name);

            match entry.kind() {
                Some(git2::ObjectType::Tree) => {
                    let subtree = self
                        .repo
                        .find_tree(entry.id())
                        .map_err(|e| GitError::from_git2(e, &entry.id().to_string()))?;
                    self.write_tree_into(&subtree, &path)?;
                }
                Some(git2::ObjectType::Blob) => {
                    let blob = self
                        .repo
                        .find_blob(entry.id())
                        .map_err(|e| GitError::from_git2(e, &entry.id().to_string()))?;
                    std::fs::write(&path, blob.content()).map_err(|e| GitError::io(&path, e))?;
                    set_executable(&path, entry.filemode() == 0o100755)?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    // =========================================================================
    // Writing
    // =========================================================================

    /// Stage every change in the working tree, deletions included.
    pub fn stage_all(&self) -> Result<(), GitError> {
        let mut index = self.repo.index()?;
        index.add_all(["*"], git2::IndexAddOption::DEFAULT, None)?;
        index.update_all(["*"], None)?;
        index.write()?;
        Ok(())
    }

    /// Commit the index on top of `HEAD` and return the new commit id.
    ///
    /// Works on an unborn branch, in which case the commit has no parents.
    pub fn commit(&self, message: &str, author: &CommitAuthor) -> Result<String, GitError> {
        let mut index = self.repo.index()?;
        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;

        let time = git2::Time::new(author.time.timestamp(), 0);
        let signature = git2::Signature::new(&author.name, &author.email, &time)?;

        let parent = match self.repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(_) => None,
        };
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

        let oid = self
            .repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)?;

        tracing::debug!(commit = %oid, "created commit");
        Ok(oid.to_string())
    }
}

#[cfg(unix)]
fn set_executable(path: &Path, executable: bool) -> Result<(), GitError> {
    use std::os::unix::fs::PermissionsExt;

    if !executable {
        return Ok(());
    }
    let mut perms = std::fs::metadata(path)
        .map_err(|e| GitError::io(path, e))?
        .permissions();
    perms.set_mode(perms.mode() | 0o111);
    std::fs::set_permissions(path, perms).map_err(|e| GitError::io(path, e))
}

#[cfg(not(unix))]
fn set_executable(_path: &Path, _executable: bool) -> Result<(), GitError> {
    Ok(())
}
