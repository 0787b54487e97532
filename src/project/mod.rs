//! project
//!
//! The assembled, read-only view of one project during a run.
//!
//! # Architecture
//!
//! A [`ProjectContext`] holds the wired repositories, editors and
//! translators plus the [`FileSystem`] they allocate scratch space from. It
//! is built once, either from a validated [`ProjectConfig`] with
//! [`ProjectContext::from_config`] or piece by piece with
//! [`ProjectContext::builder`], and then passed by reference to
//! everything that evaluates expressions.
//!
//! The virtual `file` repository is always registered. It is not reported
//! among the configured repositories.
//!
//! # Example
//!
//! ```
//! use moe::project::ProjectContext;
//!
//! let context = ProjectContext::builder().build();
//! let err = context.repository("foo").unwrap_err();
//! assert_eq!(err.to_string(), "No such repository 'foo' in the config. Found: []");
//! assert!(context.repository("file").is_ok());
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::core::config::{ConfigError, ProjectConfig};
use crate::core::fs::FileSystem;
use crate::editors::{create_editor, Editor, Translator, TranslatorPath};
use crate::repositories::{file_repository, Repositories, RepositoryType, FILE_REPOSITORY};

/// Repositories, editors and translators available during a run.
pub struct ProjectContext {
    fs: Arc<FileSystem>,
    file: RepositoryType,
    repositories: BTreeMap<String, RepositoryType>,
    editors: BTreeMap<String, Arc<dyn Editor>>,
    translators: BTreeMap<TranslatorPath, Translator>,
}

impl std::fmt::Debug for ProjectContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectContext")
            .field("repositories", &self.repositories.keys().collect::<Vec<_>>())
            .field("editors", &self.editors.keys().collect::<Vec<_>>())
            .field("translators", &self.translators.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ProjectContext {
    /// Start building a context by hand.
    pub fn builder() -> ProjectContextBuilder {
        ProjectContextBuilder::default()
    }

    /// Wire up every repository, editor and translator in `config`.
    ///
    /// # Errors
    ///
    /// The first [`ConfigError`] raised while creating a repository,
    /// editor or translator.
    pub fn from_config(
        config: &ProjectConfig,
        repositories: &Repositories,
        fs: Arc<FileSystem>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Self::builder().file_system(fs);

        for (name, repository) in config.repositories() {
            builder = builder.repository(repositories.create(name, repository)?);
        }
        for (name, editor) in config.editors() {
            builder = builder.editor(name.as_str(), create_editor(editor)?);
        }
        for translator in config.translators() {
            let (path, translator) = Translator::from_config(translator)?;
            builder = builder.translator(path, translator);
        }

        let context = builder.build();
        tracing::debug!(project = config.name(), ?context, "built project context");
        Ok(context)
    }

    /// Look up a repository by name, including the virtual `file`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NoSuchRepository`] listing the configured names.
    pub fn repository(&self, name: &str) -> Result<&RepositoryType, ConfigError> {
        if name == FILE_REPOSITORY {
            return Ok(&self.file);
        }
        self.repositories
            .get(name)
            .ok_or_else(|| ConfigError::NoSuchRepository {
                name: name.to_string(),
                known: self.repositories.keys().cloned().collect(),
            })
    }

    /// The configured repositories, by name.
    pub fn repositories(&self) -> &BTreeMap<String, RepositoryType> {
        &self.repositories
    }

    pub fn editor(&self, name: &str) -> Option<&Arc<dyn Editor>> {
        self.editors.get(name)
    }

    pub fn editors(&self) -> &BTreeMap<String, Arc<dyn Editor>> {
        &self.editors
    }

    pub fn translator(&self, path: &TranslatorPath) -> Option<&Translator> {
        self.translators.get(path)
    }

    pub fn translators(&self) -> &BTreeMap<TranslatorPath, Translator> {
        &self.translators
    }

    /// The file system scratch directories are allocated from.
    pub fn fs(&self) -> &Arc<FileSystem> {
        &self.fs
    }
}

/// Builder for [`ProjectContext`].
#[derive(Default)]
pub struct ProjectContextBuilder {
    fs: Option<Arc<FileSystem>>,
    repositories: BTreeMap<String, RepositoryType>,
    editors: BTreeMap<String, Arc<dyn Editor>>,
    translators: BTreeMap<TranslatorPath, Translator>,
}

impl ProjectContextBuilder {
    /// Use `fs` for scratch space. Defaults to the platform temp directory.
    pub fn file_system(mut self, fs: impl Into<Arc<FileSystem>>) -> Self {
        self.fs = Some(fs.into());
        self
    }

    /// Register a repository under its own name.
    pub fn repository(mut self, repository: RepositoryType) -> Self {
        self.repositories.insert(repository.name.clone(), repository);
        self
    }

    pub fn editor(mut self, name: impl Into<String>, editor: Arc<dyn Editor>) -> Self {
        self.editors.insert(name.into(), editor);
        self
    }

    pub fn translator(mut self, path: TranslatorPath, translator: Translator) -> Self {
        self.translators.insert(path, translator);
        self
    }

    pub fn build(self) -> ProjectContext {
        let fs = self.fs.unwrap_or_else(|| Arc::new(FileSystem::new()));
        ProjectContext {
            file: file_repository(fs.clone()),
            fs,
            repositories: self.repositories,
            editors: self.editors,
            translators: self.translators,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config(json: &str) -> ProjectConfig {
        ProjectConfig::parse(json).unwrap()
    }

    #[test]
    fn from_config_wires_everything() {
        let dir = TempDir::new().unwrap();
        let fs = Arc::new(FileSystem::with_root(dir.path()));
        let config = config(
            r#"{
                "name": "demo",
                "repositories": {
                    "internal": {"type": "noop", "project_space": "internal"},
                    "public": {"type": "noop"}
                },
                "editors": {"copy": {"type": "identity"}},
                "translators": [{
                    "from_project_space": "internal",
                    "to_project_space": "public",
                    "steps": [{"name": "copy", "editor": {"type": "identity"}}]
                }]
            }"#,
        );

        let context =
            ProjectContext::from_config(&config, &Repositories::defaults(fs.clone()), fs).unwrap();
        assert_eq!(
            context.repositories().keys().collect::<Vec<_>>(),
            vec!["internal", "public"]
        );
        assert!(context.editor("copy").is_some());
        assert!(context
            .translator(&TranslatorPath::new("internal", "public"))
            .is_some());
    }

    #[test]
    fn unknown_repository_lists_configured_names() {
        let dir = TempDir::new().unwrap();
        let fs = Arc::new(FileSystem::with_root(dir.path()));
        let config = config(
            r#"{"name": "demo", "repositories": {"b": {"type": "noop"}, "a": {"type": "noop"}}}"#,
        );
        let context =
            ProjectContext::from_config(&config, &Repositories::defaults(fs.clone()), fs).unwrap();

        let err = context.repository("c").unwrap_err();
        assert_eq!(
            err.to_string(),
            "No such repository 'c' in the config. Found: [a, b]"
        );
    }

    #[test]
    fn unknown_type_fails_construction() {
        let dir = TempDir::new().unwrap();
        let fs = Arc::new(FileSystem::with_root(dir.path()));
        let config = config(r#"{"name": "demo", "repositories": {"a": {"type": "svn"}}}"#);
        let err = ProjectContext::from_config(&config, &Repositories::defaults(fs.clone()), fs)
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownRepositoryType(_)));
    }

    #[test]
    fn file_repository_is_always_present() {
        let context = ProjectContext::builder().build();
        assert_eq!(context.repository("file").unwrap().name, "file");
        assert!(context.repositories().is_empty());
    }
}
