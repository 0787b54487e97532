//! git
//!
//! Single interface for all Git operations.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to Git. The git repository backend
//! reaches clones, history and commits through it. No other module should
//! import `git2`.
//!
//! # Responsibilities
//!
//! - Cloning and opening working copies
//! - Resolving rev-specs to commit ids
//! - Commit metadata and ancestry
//! - Exporting a commit's tree to a plain directory
//! - Staging and committing a working tree
//!
//! # Example
//!
//! ```ignore
//! use moe::git::Git;
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("/tmp/clone"))?;
//! let head = git.resolve("HEAD")?;
//! git.export_tree(&head, Path::new("/tmp/export"))?;
//! ```

mod interface;

pub use interface::{CommitAuthor, CommitInfo, Git, GitError};
