//! codebase
//!
//! Materialized file trees and the errors raised while creating them.
//!
//! # Architecture
//!
//! A [`Codebase`] is a directory on disk plus the project space it is in
//! and the [`Expression`] that produced it. Codebases are produced by a
//! [`CodebaseCreator`] (one per repository) or by an editor or translator
//! step, and their directories are owned by the [`crate::core::fs::FileSystem`]
//! lifetime that allocated them.
//!
//! # Equality
//!
//! Two codebases are equal when they live at the same path. The project
//! space and expression are ignored. This makes codebases easy to match in
//! tests, and is not used for any other decision.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::config::ConfigError;
use crate::core::fs;
use crate::expr::{Expression, Options};
use crate::repositories::BackendError;

/// Errors from evaluating an expression into a codebase.
#[derive(Debug, Error)]
pub enum CodebaseError {
    /// A pipeline step could not produce a codebase.
    #[error("{0}")]
    Creation(String),

    /// The project setup is broken (unknown repository, ...).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A backend operation failed.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// A file-system operation failed.
    #[error("failed to access '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl CodebaseError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        CodebaseError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Creates codebases from one repository.
pub trait CodebaseCreator: Send + Sync {
    /// Materialize a codebase, e.g. at the revision named by the
    /// `revision` option.
    fn create(&self, options: &Options) -> Result<Codebase, CodebaseError>;
}

/// A file tree plus the project space it is in and how to make it again.
#[derive(Debug, Clone)]
pub struct Codebase {
    path: PathBuf,
    project_space: String,
    expression: Expression,
}

impl Codebase {
    pub fn new(path: impl Into<PathBuf>, project_space: impl Into<String>, expression: Expression) -> Self {
        Self {
            path: path.into(),
            project_space: project_space.into(),
            expression,
        }
    }

    /// Where the files can be examined.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The project space this codebase is in.
    pub fn project_space(&self) -> &str {
        &self.project_space
    }

    /// An expression that creates this codebase.
    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    /// The same files imprinted with a new expression.
    ///
    /// Only the value is copied, not the directory.
    pub fn copy_with_expression(&self, expression: Expression) -> Self {
        Self {
            expression,
            ..self.clone()
        }
    }

    /// The same files imprinted with a new project space.
    pub fn copy_with_project_space(&self, project_space: impl Into<String>) -> Self {
        Self {
            project_space: project_space.into(),
            ..self.clone()
        }
    }

    /// Check that this codebase is in `project_space`.
    pub fn check_project_space(&self, project_space: &str) -> Result<(), BackendError> {
        if self.project_space != project_space {
            return Err(BackendError::ProjectSpaceMismatch {
                expected: project_space.to_string(),
                codebase: self.to_string(),
                actual: self.project_space.clone(),
            });
        }
        Ok(())
    }

    /// Every file in the codebase as a `/`-separated relative path.
    pub fn relative_filenames(&self) -> Result<Vec<String>, CodebaseError> {
        fs::find_files(&self.path, &[]).map_err(|e| CodebaseError::io(&self.path, e))
    }

    /// Path of a file in this codebase.
    pub fn file(&self, relative: &str) -> PathBuf {
        self.path.join(relative)
    }
}

impl PartialEq for Codebase {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for Codebase {}

impl std::hash::Hash for Codebase {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}

impl std::fmt::Display for Codebase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.expression)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Term;

    fn expr(name: &str) -> Expression {
        Expression::repository(Term::new(name).unwrap())
    }

    #[test]
    fn equality_uses_path_only() {
        let a = Codebase::new("/first", "internal", expr("a"));
        let b = Codebase::new("/first", "public", expr("b"));
        let c = Codebase::new("/second", "internal", expr("a"));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn copies_do_not_mutate_original() {
        let original = Codebase::new("/first", "internal", expr("foo"));
        let retagged = original.copy_with_expression(expr("bar"));
        let respaced = original.copy_with_project_space("public");

        assert_eq!(original.expression().to_string(), "foo");
        assert_eq!(original.project_space(), "internal");
        assert_eq!(retagged.expression().to_string(), "bar");
        assert_eq!(retagged.path(), Path::new("/first"));
        assert_eq!(respaced.project_space(), "public");
        assert_eq!(respaced.expression().to_string(), "foo");
    }

    #[test]
    fn check_project_space() {
        let cb = Codebase::new("/first", "internal", expr("foo"));
        assert!(cb.check_project_space("internal").is_ok());
        let err = cb.check_project_space("public").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected project space \"public\", but Codebase \"foo\" is in project space \"internal\""
        );
    }

    #[test]
    fn displays_expression() {
        let cb = Codebase::new("/x", "public", expr("foo"));
        assert_eq!(cb.to_string(), "foo");
    }
}
