//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Project Config
//!
//! ```json
//! {
//!   "name": "myproject",
//!   "database_uri": "/path/to/moe_db.json",
//!   "repositories": {
//!     "internal": {"type": "git", "url": "/src/internal", "project_space": "internal"},
//!     "public": {"type": "git", "url": "https://example.com/public.git"}
//!   },
//!   "editors": {
//!     "relocate": {"type": "renamer", "mappings": {"java/com/": "src/main/java/com/"}}
//!   },
//!   "translators": [{
//!     "from_project_space": "internal",
//!     "to_project_space": "public",
//!     "steps": [{"name": "relocate", "editor": {"type": "renamer", "mappings": {"java/": "src/"}}}]
//!   }],
//!   "migrations": [{
//!     "name": "publish",
//!     "from_repository": "internal",
//!     "to_repository": "public",
//!     "separate_revisions": true
//!   }]
//! }
//! ```
//!
//! # Validation
//!
//! Value types validate when they are deserialized (`try_from` a raw
//! form), so an invalid repository or migration config cannot be built.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Project space assumed when a repository does not declare one.
pub const DEFAULT_PROJECT_SPACE: &str = "public";

/// Raw, unvalidated project config as it appears on disk.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct RawProjectConfig {
    name: Option<String>,
    database_uri: Option<String>,
    repositories: BTreeMap<String, RepositoryConfig>,
    editors: BTreeMap<String, EditorConfig>,
    translators: Vec<TranslatorConfig>,
    migrations: Vec<MigrationConfig>,
    internal_repository: Option<RepositoryConfig>,
    public_repository: Option<RepositoryConfig>,
}

/// A validated project configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectConfig {
    name: String,
    database_uri: Option<String>,
    repositories: BTreeMap<String, RepositoryConfig>,
    editors: BTreeMap<String, EditorConfig>,
    translators: Vec<TranslatorConfig>,
    migrations: Vec<MigrationConfig>,
}

impl ProjectConfig {
    /// Validate a raw config, normalizing legacy repository keys.
    pub(crate) fn from_raw(raw: RawProjectConfig) -> Result<Self, ConfigError> {
        let mut repositories = raw.repositories;

        // Older configs name the two repositories with dedicated keys.
        for (key, legacy) in [
            ("internal", raw.internal_repository),
            ("public", raw.public_repository),
        ] {
            if let Some(config) = legacy {
                if repositories.insert(key.to_string(), config).is_some() {
                    return Err(ConfigError::InvalidValue(format!(
                        "{} repository specified twice",
                        capitalize(key)
                    )));
                }
            }
        }

        let name = raw.name.unwrap_or_default();
        if name.is_empty() {
            return Err(ConfigError::InvalidValue("Must specify a name".into()));
        }
        if repositories.is_empty() {
            return Err(ConfigError::InvalidValue("Must specify repositories".into()));
        }
        if repositories.contains_key("file") {
            return Err(ConfigError::ReservedName("file".into()));
        }
        for editor in raw.editors.values() {
            editor.validate()?;
        }
        let mut paths = BTreeSet::new();
        for translator in &raw.translators {
            translator.validate()?;
            if !paths.insert((&translator.from_project_space, &translator.to_project_space)) {
                return Err(ConfigError::InvalidValue(format!(
                    "translator from {} to {} specified twice",
                    translator.from_project_space, translator.to_project_space
                )));
            }
        }

        Ok(Self {
            name,
            database_uri: raw.database_uri,
            repositories,
            editors: raw.editors,
            translators: raw.translators,
            migrations: raw.migrations,
        })
    }

    /// The project name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Location of the equivalence ledger, if configured.
    pub fn database_uri(&self) -> Option<&str> {
        self.database_uri.as_deref()
    }

    /// Every configured repository, by name.
    pub fn repositories(&self) -> &BTreeMap<String, RepositoryConfig> {
        &self.repositories
    }

    /// The repository config with the given name.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NoSuchRepository`] listing the configured names.
    pub fn repository_config(&self, name: &str) -> Result<&RepositoryConfig, ConfigError> {
        self.repositories
            .get(name)
            .ok_or_else(|| ConfigError::NoSuchRepository {
                name: name.to_string(),
                known: self.repositories.keys().cloned().collect(),
            })
    }

    /// Named editors available to `|name` operations.
    pub fn editors(&self) -> &BTreeMap<String, EditorConfig> {
        &self.editors
    }

    /// Declared translators.
    pub fn translators(&self) -> &[TranslatorConfig] {
        &self.translators
    }

    /// Declared migrations.
    pub fn migrations(&self) -> &[MigrationConfig] {
        &self.migrations
    }

    /// The migration config with the given name, if any.
    pub fn migration(&self, name: &str) -> Option<&MigrationConfig> {
        self.migrations.iter().find(|m| m.name() == name)
    }

    /// The translator between two repositories' project spaces, if any.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NoSuchRepository`] if either repository is unknown.
    pub fn find_translator_from(
        &self,
        from_repository: &str,
        to_repository: &str,
    ) -> Result<Option<&TranslatorConfig>, ConfigError> {
        let from = self.repository_config(from_repository)?.project_space();
        let to = self.repository_config(to_repository)?.project_space();
        Ok(self
            .translators
            .iter()
            .find(|t| t.from_project_space == from && t.to_project_space == to))
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRepositoryConfig {
    #[serde(rename = "type")]
    kind: Option<String>,
    url: Option<String>,
    project_space: Option<String>,
    branch: Option<String>,
    #[serde(default)]
    ignore_file_patterns: Vec<String>,
}

/// Configuration for one repository.
///
/// The `type` selects the backend factory (`git`, `noop`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRepositoryConfig")]
pub struct RepositoryConfig {
    #[serde(rename = "type")]
    kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    project_space: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    ignore_file_patterns: Vec<String>,
}

impl TryFrom<RawRepositoryConfig> for RepositoryConfig {
    type Error = ConfigError;

    fn try_from(raw: RawRepositoryConfig) -> Result<Self, Self::Error> {
        let kind = raw
            .kind
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ConfigError::InvalidValue("Must set repository type".into()))?;
        let mut config = Self::new(kind);
        config.url = raw.url;
        config.branch = raw.branch;
        config.ignore_file_patterns = raw.ignore_file_patterns;
        if let Some(space) = raw.project_space.filter(|s| !s.is_empty()) {
            config.project_space = space;
        }
        Ok(config)
    }
}

impl RepositoryConfig {
    /// A config of the given backend type in the default project space.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            url: None,
            project_space: DEFAULT_PROJECT_SPACE.to_string(),
            branch: None,
            ignore_file_patterns: Vec::new(),
        }
    }

    /// Set the repository URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the project space.
    pub fn with_project_space(mut self, space: impl Into<String>) -> Self {
        self.project_space = space.into();
        self
    }

    /// Set the branch to track.
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    /// Add a regex of files to drop from created codebases.
    pub fn with_ignore_file_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.ignore_file_patterns.push(pattern.into());
        self
    }

    /// Backend type name.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Repository URL, if any.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Project space of codebases created from this repository.
    pub fn project_space(&self) -> &str {
        &self.project_space
    }

    /// Branch to track, if any.
    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }

    /// Regexes (matched against `/`-separated relative paths) of files to
    /// leave out of created codebases.
    pub fn ignore_file_patterns(&self) -> &[String] {
        &self.ignore_file_patterns
    }
}

/// Configuration of an editor, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum EditorConfig {
    /// Copies the codebase unchanged.
    Identity,
    /// Moves files from one path prefix to another.
    Renamer {
        /// Old prefix to new prefix.
        mappings: BTreeMap<String, String>,
    },
}

impl EditorConfig {
    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            EditorConfig::Identity => Ok(()),
            EditorConfig::Renamer { mappings } => {
                if mappings.is_empty() {
                    return Err(ConfigError::InvalidValue(
                        "renamer editor requires at least one mapping".into(),
                    ));
                }
                if mappings.keys().any(|k| k.is_empty()) {
                    return Err(ConfigError::InvalidValue(
                        "renamer mapping keys cannot be empty".into(),
                    ));
                }
                Ok(())
            }
        }
    }
}

/// One named step of a translator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepConfig {
    pub name: String,
    pub editor: EditorConfig,
}

/// A translator from one project space to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TranslatorConfig {
    pub from_project_space: String,
    pub to_project_space: String,
    #[serde(default)]
    pub steps: Vec<StepConfig>,
}

impl TranslatorConfig {
    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.from_project_space.is_empty() || self.to_project_space.is_empty() {
            return Err(ConfigError::InvalidValue(
                "translator requires from_project_space and to_project_space".into(),
            ));
        }
        for step in &self.steps {
            if step.name.is_empty() {
                return Err(ConfigError::InvalidValue(
                    "translator step requires a name".into(),
                ));
            }
            step.editor.validate()?;
        }
        Ok(())
    }
}

/// Metadata scrubbing options applied when a migration is written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataScrubberConfig {
    pub usernames_to_scrub: Vec<String>,
    pub scrub_confidential_words: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawMigrationConfig {
    name: Option<String>,
    #[serde(default)]
    separate_revisions: bool,
    from_repository: Option<String>,
    to_repository: Option<String>,
    metadata_scrubber_config: Option<MetadataScrubberConfig>,
}

/// Configuration for one migration between two repositories.
///
/// Consumed, never mutated, by the core. Alternates are derived with
/// [`MigrationConfig::with_from_repository`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawMigrationConfig")]
pub struct MigrationConfig {
    name: String,
    separate_revisions: bool,
    from_repository: String,
    to_repository: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata_scrubber_config: Option<MetadataScrubberConfig>,
}

impl TryFrom<RawMigrationConfig> for MigrationConfig {
    type Error = ConfigError;

    fn try_from(raw: RawMigrationConfig) -> Result<Self, Self::Error> {
        let mut config = Self::new(
            raw.name.unwrap_or_default(),
            raw.from_repository.unwrap_or_default(),
            raw.to_repository.unwrap_or_default(),
        )?;
        config.separate_revisions = raw.separate_revisions;
        config.metadata_scrubber_config = raw.metadata_scrubber_config;
        Ok(config)
    }
}

impl MigrationConfig {
    /// Create a migration config.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidValue`] if any field is empty.
    pub fn new(
        name: impl Into<String>,
        from_repository: impl Into<String>,
        to_repository: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let name = name.into();
        let from_repository = from_repository.into();
        let to_repository = to_repository.into();
        if name.is_empty() {
            return Err(ConfigError::InvalidValue("Missing name in migration".into()));
        }
        if from_repository.is_empty() {
            return Err(ConfigError::InvalidValue(
                "Missing from_repository in migration".into(),
            ));
        }
        if to_repository.is_empty() {
            return Err(ConfigError::InvalidValue(
                "Missing to_repository in migration".into(),
            ));
        }
        Ok(Self {
            name,
            separate_revisions: false,
            from_repository,
            to_repository,
            metadata_scrubber_config: None,
        })
    }

    /// Set whether each source revision is migrated separately.
    pub fn with_separate_revisions(mut self, separate: bool) -> Self {
        self.separate_revisions = separate;
        self
    }

    /// A copy of this config migrating from `alternate` instead.
    pub fn with_from_repository(&self, alternate: impl Into<String>) -> Self {
        Self {
            from_repository: alternate.into(),
            ..self.clone()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn separate_revisions(&self) -> bool {
        self.separate_revisions
    }

    pub fn from_repository(&self) -> &str {
        &self.from_repository
    }

    pub fn to_repository(&self) -> &str {
        &self.to_repository
    }

    pub fn metadata_scrubber_config(&self) -> Option<&MetadataScrubberConfig> {
        self.metadata_scrubber_config.as_ref()
    }
}
