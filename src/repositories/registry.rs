//! repositories::registry
//!
//! Dispatches repository definitions to the factory for their type.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::core::config::{ConfigError, RepositoryConfig};
use crate::core::fs::FileSystem;

use super::file::FILE_REPOSITORY;
use super::{GitRepositoryFactory, NoopRepositoryFactory, RepositoryFactory, RepositoryType};

/// The set of available backend factories, keyed by repository type.
pub struct Repositories {
    factories: BTreeMap<&'static str, Box<dyn RepositoryFactory>>,
}

impl std::fmt::Debug for Repositories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repositories")
            .field("kinds", &self.kinds())
            .finish()
    }
}

impl Repositories {
    /// Build a registry from a set of factories.
    ///
    /// # Errors
    ///
    /// [`ConfigError::DuplicateRepositoryType`] if two factories claim the
    /// same type.
    pub fn new(
        factories: impl IntoIterator<Item = Box<dyn RepositoryFactory>>,
    ) -> Result<Self, ConfigError> {
        let mut map = BTreeMap::new();
        for factory in factories {
            let kind = factory.kind();
            if map.insert(kind, factory).is_some() {
                return Err(ConfigError::DuplicateRepositoryType(kind.to_string()));
            }
        }
        Ok(Self { factories: map })
    }

    /// The built-in backends: `git` and `noop`.
    pub fn defaults(fs: Arc<FileSystem>) -> Self {
        let mut factories: BTreeMap<&'static str, Box<dyn RepositoryFactory>> = BTreeMap::new();
        let git = GitRepositoryFactory::new(fs.clone());
        let noop = NoopRepositoryFactory::new(fs);
        factories.insert(git.kind(), Box::new(git));
        factories.insert(noop.kind(), Box::new(noop));
        Self { factories }
    }

    /// The repository types this registry can build.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }

    /// Wire up the repository `name` described by `config`.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::ReservedName`] if `name` is `file`
    /// - [`ConfigError::UnknownRepositoryType`] if no factory handles the
    ///   config's type
    /// - whatever the factory reports
    pub fn create(&self, name: &str, config: &RepositoryConfig) -> Result<RepositoryType, ConfigError> {
        if name == FILE_REPOSITORY {
            return Err(ConfigError::ReservedName(name.to_string()));
        }

        let factory = self
            .factories
            .get(config.kind())
            .ok_or_else(|| ConfigError::UnknownRepositoryType(config.kind().to_string()))?;

        tracing::debug!(repository = name, kind = config.kind(), "creating repository");
        factory.create(name, config)
    }
}
