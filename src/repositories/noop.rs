//! repositories::noop
//!
//! A backend that stores nothing. History answers with whatever id it is
//! asked about, creators hand out empty directories and writers accept any
//! codebase in their project space.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::DateTime;

use crate::codebase::{Codebase, CodebaseCreator, CodebaseError};
use crate::core::config::{ConfigError, RepositoryConfig};
use crate::core::fs::{FileSystem, Lifetime};
use crate::core::types::{Revision, RevisionMetadata};
use crate::expr::Options;

use super::{
    creation_expression, BackendError, DraftRevision, RepositoryFactory, RepositoryType,
    RevisionHistory, Writer, WriterCreator,
};

/// Builds `noop` repositories.
pub struct NoopRepositoryFactory {
    fs: Arc<FileSystem>,
}

impl NoopRepositoryFactory {
    pub fn new(fs: Arc<FileSystem>) -> Self {
        Self { fs }
    }
}

impl RepositoryFactory for NoopRepositoryFactory {
    fn kind(&self) -> &'static str {
        "noop"
    }

    fn create(&self, name: &str, config: &RepositoryConfig) -> Result<RepositoryType, ConfigError> {
        let project_space = config.project_space().to_string();
        Ok(RepositoryType {
            name: name.to_string(),
            revision_history: Arc::new(NoopRevisionHistory {
                name: name.to_string(),
            }),
            codebase_creator: Arc::new(NoopCodebaseCreator {
                name: name.to_string(),
                project_space: project_space.clone(),
                fs: self.fs.clone(),
            }),
            writer_creator: Arc::new(NoopWriterCreator {
                project_space,
                fs: self.fs.clone(),
            }),
        })
    }
}

struct NoopRevisionHistory {
    name: String,
}

impl RevisionHistory for NoopRevisionHistory {
    fn find_highest_revision(&self, rev_id: Option<&str>) -> Result<Revision, BackendError> {
        Ok(Revision::new(rev_id.unwrap_or("1"), &self.name))
    }

    fn metadata(&self, revision: &Revision) -> Result<RevisionMetadata, BackendError> {
        Ok(RevisionMetadata {
            id: revision.rev_id().to_string(),
            author: String::new(),
            date: DateTime::UNIX_EPOCH,
            description: String::new(),
            parents: Vec::new(),
        })
    }
}

struct NoopCodebaseCreator {
    name: String,
    project_space: String,
    fs: Arc<FileSystem>,
}

impl CodebaseCreator for NoopCodebaseCreator {
    fn create(&self, options: &Options) -> Result<Codebase, CodebaseError> {
        let path = self
            .fs
            .temporary_directory("noop_codebase_", Lifetime::CurrentTask)
            .map_err(|e| CodebaseError::io(self.fs.root(), e))?;

        let expression = creation_expression(&self.name, options)?;
        Ok(Codebase::new(path, &self.project_space, expression))
    }
}

struct NoopWriterCreator {
    project_space: String,
    fs: Arc<FileSystem>,
}

impl WriterCreator for NoopWriterCreator {
    fn create(&self, _options: &Options) -> Result<Box<dyn Writer>, BackendError> {
        let root = self
            .fs
            .temporary_directory("noop_writer_", Lifetime::CurrentTask)
            .map_err(|e| BackendError::io(self.fs.root(), e))?;
        Ok(Box::new(NoopWriter {
            root,
            project_space: self.project_space.clone(),
        }))
    }
}

struct NoopWriter {
    root: PathBuf,
    project_space: String,
}

impl Writer for NoopWriter {
    fn root(&self) -> &Path {
        &self.root
    }

    fn put_codebase(
        &mut self,
        codebase: &Codebase,
        _metadata: Option<&RevisionMetadata>,
    ) -> Result<DraftRevision, BackendError> {
        codebase.check_project_space(&self.project_space)?;
        Ok(DraftRevision::new(&self.root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{Expression, Term};
    use tempfile::TempDir;

    fn noop(dir: &TempDir, space: &str) -> RepositoryType {
        let fs = Arc::new(FileSystem::with_root(dir.path()));
        NoopRepositoryFactory::new(fs)
            .create("internal", &RepositoryConfig::new("noop").with_project_space(space))
            .unwrap()
    }

    #[test]
    fn history_echoes_requested_revision() {
        let dir = TempDir::new().unwrap();
        let repo = noop(&dir, "internal");
        let history = &repo.revision_history;
        assert_eq!(
            history.find_highest_revision(Some("45")).unwrap(),
            Revision::new("45", "internal")
        );
        assert_eq!(history.find_highest_revision(None).unwrap().rev_id(), "1");
        assert!(history
            .metadata(&Revision::new("45", "internal"))
            .unwrap()
            .parents
            .is_empty());
    }

    #[test]
    fn creator_yields_empty_codebase_in_configured_space() {
        let dir = TempDir::new().unwrap();
        let repo = noop(&dir, "internal");
        let mut options = Options::new();
        options.insert("revision".into(), "3".into());

        let codebase = repo.codebase_creator.create(&options).unwrap();
        assert_eq!(codebase.project_space(), "internal");
        assert!(codebase.relative_filenames().unwrap().is_empty());
        assert_eq!(codebase.to_string(), "internal(revision=3)");
    }

    #[test]
    fn writer_checks_project_space() {
        let dir = TempDir::new().unwrap();
        let repo = noop(&dir, "public");
        let mut writer = repo.writer_creator.create(&Options::new()).unwrap();

        let ok = Codebase::new(dir.path(), "public", Expression::repository(Term::new("x").unwrap()));
        let draft = writer.put_codebase(&ok, None).unwrap();
        assert_eq!(draft.location(), writer.root());

        let wrong = ok.copy_with_project_space("internal");
        let err = writer.put_codebase(&wrong, None).unwrap_err();
        assert!(matches!(err, BackendError::ProjectSpaceMismatch { .. }));
    }
}
