//! repositories
//!
//! The repository abstraction and the registry of backends.
//!
//! # Architecture
//!
//! A configured repository is wired into a [`RepositoryType`]: a revision
//! history, a codebase creator and a writer creator that share one backend
//! resource. A [`RepositoryFactory`] per backend type builds them, and
//! [`Repositories`] dispatches a repository's declared `type` to the right
//! factory.
//!
//! Read-only consumers (history, creator) may share a memoized working copy.
//! Every writer gets its own working copy, and a writer is never shared.
//!
//! # Backends
//!
//! - `file` - the virtual repository reading a local path, always present
//! - `noop` - does nothing, useful for dry runs and tests
//! - `git` - git repositories through [`crate::git`]

mod file;
mod git;
mod noop;
mod registry;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::codebase::{Codebase, CodebaseCreator, CodebaseError};
use crate::core::config::{ConfigError, RepositoryConfig};
use crate::core::types::{Revision, RevisionMetadata};
use crate::expr::{Expression, Options, ParseError, Term};
use crate::git::GitError;
use crate::project::ProjectContext;

pub use file::{file_repository, FILE_REPOSITORY};
pub use git::GitRepositoryFactory;
pub use noop::NoopRepositoryFactory;
pub use registry::Repositories;

/// Errors raised by repository backends.
#[derive(Debug, Error)]
pub enum BackendError {
    /// A git operation failed.
    #[error(transparent)]
    Git(#[from] GitError),

    /// A file-system operation failed.
    #[error("failed to access '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The repository has no such revision.
    #[error("unknown revision '{revision}' in repository '{repository}'")]
    UnknownRevision { repository: String, revision: String },

    /// Options passed to a creator or writer were not understood.
    #[error("{0}")]
    InvalidOptions(String),

    /// A codebase was handed to a writer for a different project space.
    #[error("Expected project space \"{expected}\", but Codebase \"{codebase}\" is in project space \"{actual}\"")]
    ProjectSpaceMismatch {
        expected: String,
        codebase: String,
        actual: String,
    },

    /// The backend does not implement this operation.
    #[error("repository '{repository}' does not support {operation}")]
    Unsupported {
        repository: String,
        operation: &'static str,
    },
}

impl BackendError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        BackendError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Read-only access to a repository's revisions.
pub trait RevisionHistory: Send + Sync {
    /// The newest revision at or below `rev_id`, or the head revision when
    /// `rev_id` is `None`.
    fn find_highest_revision(&self, rev_id: Option<&str>) -> Result<Revision, BackendError>;

    /// Author, date, description and parents of `revision`.
    fn metadata(&self, revision: &Revision) -> Result<RevisionMetadata, BackendError>;
}

/// Creates writers for one repository.
pub trait WriterCreator: Send + Sync {
    /// Create a writer with its own, fresh working copy.
    fn create(&self, options: &Options) -> Result<Box<dyn Writer>, BackendError>;
}

/// Puts codebases into a repository's working copy.
pub trait Writer {
    /// Where this writer's working copy lives.
    fn root(&self) -> &Path;

    /// Make the working copy match `codebase`, committing with `metadata`
    /// when given.
    fn put_codebase(
        &mut self,
        codebase: &Codebase,
        metadata: Option<&RevisionMetadata>,
    ) -> Result<DraftRevision, BackendError>;
}

/// A change written to a working copy, ready to be pushed or reviewed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftRevision {
    location: PathBuf,
}

impl DraftRevision {
    pub fn new(location: impl Into<PathBuf>) -> Self {
        Self {
            location: location.into(),
        }
    }

    /// Where the draft can be examined.
    pub fn location(&self) -> &Path {
        &self.location
    }
}

/// One fully wired repository definition.
#[derive(Clone)]
pub struct RepositoryType {
    pub name: String,
    pub revision_history: Arc<dyn RevisionHistory>,
    pub codebase_creator: Arc<dyn CodebaseCreator>,
    pub writer_creator: Arc<dyn WriterCreator>,
}

impl std::fmt::Debug for RepositoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryType")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Builds repositories of one backend type.
pub trait RepositoryFactory: Send + Sync {
    /// The `type` value in repository config this factory answers to.
    fn kind(&self) -> &'static str;

    /// Wire up the repository `name` described by `config`.
    fn create(&self, name: &str, config: &RepositoryConfig) -> Result<RepositoryType, ConfigError>;
}

/// The expression `name(k=v,...)` describing a creator invocation.
pub(crate) fn creation_expression(
    name: &str,
    options: &Options,
) -> Result<Expression, CodebaseError> {
    let invalid = |e: ParseError| CodebaseError::Creation(e.to_string());
    let mut term = Term::new(name).map_err(invalid)?;
    for (key, value) in options {
        term = term.with_option(key.as_str(), value.as_str()).map_err(invalid)?;
    }
    Ok(Expression::repository(term))
}

/// Resolve the revisions named by a term such as `internal(revision="3,4,5")`.
///
/// The term's identifier names the repository; each comma-separated id is
/// resolved through that repository's revision history.
///
/// # Errors
///
/// - [`BackendError::InvalidOptions`] if the `revision` option is missing
/// - a [`ConfigError`] (wrapped) for an unknown repository
/// - whatever the revision history reports
pub fn revisions_from_term(
    term: &Term,
    context: &ProjectContext,
) -> Result<Vec<Revision>, CodebaseError> {
    let revisions = term.option("revision").ok_or_else(|| {
        BackendError::InvalidOptions(format!(
            "Repository expression must have a 'revision' option, e.g. {}(revision=1)",
            term.identifier()
        ))
    })?;

    let repository = context.repository(term.identifier())?;
    let mut result = Vec::new();
    for rev_id in revisions.split(',').map(str::trim).filter(|r| !r.is_empty()) {
        result.push(repository.revision_history.find_highest_revision(Some(rev_id))?);
    }
    Ok(result)
}
