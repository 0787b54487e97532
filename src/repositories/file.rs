//! repositories::file
//!
//! The virtual `file` repository.
//!
//! `file(path=/some/dir)` copies a local file or directory into a fresh
//! working copy. The repository is registered in every project context,
//! cannot be declared in config, and has neither history nor writers.

use std::path::Path;
use std::sync::Arc;

use crate::codebase::{Codebase, CodebaseCreator, CodebaseError};
use crate::core::config::DEFAULT_PROJECT_SPACE;
use crate::core::fs::{self, FileSystem, Lifetime};
use crate::core::types::{Revision, RevisionMetadata};
use crate::expr::Options;

use super::{
    creation_expression, BackendError, RepositoryType, RevisionHistory, Writer, WriterCreator,
};

/// The reserved name of the virtual repository.
pub const FILE_REPOSITORY: &str = "file";

/// Wire up the virtual `file` repository.
pub fn file_repository(fs: Arc<FileSystem>) -> RepositoryType {
    RepositoryType {
        name: FILE_REPOSITORY.to_string(),
        revision_history: Arc::new(FileRevisionHistory),
        codebase_creator: Arc::new(FileCodebaseCreator { fs }),
        writer_creator: Arc::new(FileWriterCreator),
    }
}

struct FileCodebaseCreator {
    fs: Arc<FileSystem>,
}

impl CodebaseCreator for FileCodebaseCreator {
    fn create(&self, options: &Options) -> Result<Codebase, CodebaseError> {
        let source = options.get("path").ok_or_else(|| {
            CodebaseError::Creation(
                "Please specify a path for the file repository, e.g. file(path=/tmp/src)".into(),
            )
        })?;
        let source = Path::new(source);
        if !source.exists() {
            return Err(CodebaseError::Creation(format!(
                "'{}' does not exist",
                source.display()
            )));
        }

        let copy = self
            .fs
            .temporary_directory("file_codebase_copy_", Lifetime::CurrentTask)
            .map_err(|e| CodebaseError::io(self.fs.root(), e))?;
        let target = match source.file_name() {
            Some(name) if source.is_file() => copy.join(name),
            _ => copy.clone(),
        };
        fs::copy_dir(source, &target).map_err(|e| CodebaseError::io(source, e))?;

        let project_space = options
            .get("projectspace")
            .map(String::as_str)
            .unwrap_or(DEFAULT_PROJECT_SPACE);

        tracing::debug!(source = %source.display(), copy = %copy.display(), "copied file codebase");
        Ok(Codebase::new(
            copy,
            project_space,
            creation_expression(FILE_REPOSITORY, options)?,
        ))
    }
}

struct FileRevisionHistory;

impl RevisionHistory for FileRevisionHistory {
    fn find_highest_revision(&self, _rev_id: Option<&str>) -> Result<Revision, BackendError> {
        Err(unsupported("revision history"))
    }

    fn metadata(&self, _revision: &Revision) -> Result<RevisionMetadata, BackendError> {
        Err(unsupported("revision history"))
    }
}

struct FileWriterCreator;

impl WriterCreator for FileWriterCreator {
    fn create(&self, _options: &Options) -> Result<Box<dyn Writer>, BackendError> {
        Err(unsupported("writing"))
    }
}

fn unsupported(operation: &'static str) -> BackendError {
    BackendError::Unsupported {
        repository: FILE_REPOSITORY.to_string(),
        operation,
    }
}
