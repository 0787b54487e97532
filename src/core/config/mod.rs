//! core::config
//!
//! Project configuration schema and loading.
//!
//! # Overview
//!
//! A project configuration declares the repositories holding the project,
//! the editors and translators available to expressions, and the
//! migrations between repositories. It is written as JSON, or as TOML when
//! the file name ends in `.toml`.
//!
//! # Validation
//!
//! Configuration is validated as part of construction: [`ProjectConfig::parse`]
//! and [`ProjectConfig::load`] either return a fully valid config or a
//! [`ConfigError`]. A partially valid config is never handed out.
//!
//! # Example
//!
//! ```
//! use moe::core::config::ProjectConfig;
//!
//! let config = ProjectConfig::parse(r#"{
//!     "name": "foo",
//!     "repositories": {
//!         "internal": {"type": "noop", "project_space": "internal"},
//!         "public": {"type": "noop"}
//!     },
//!     "translators": [{
//!         "from_project_space": "internal",
//!         "to_project_space": "public",
//!         "steps": [{"name": "id", "editor": {"type": "identity"}}]
//!     }]
//! }"#).unwrap();
//!
//! assert_eq!(config.name(), "foo");
//! assert!(config.find_translator_from("internal", "public").unwrap().is_some());
//! ```

pub mod schema;

pub use schema::{
    EditorConfig, MetadataScrubberConfig, MigrationConfig, ProjectConfig, RepositoryConfig,
    StepConfig, TranslatorConfig, DEFAULT_PROJECT_SPACE,
};

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors.
///
/// These indicate a broken project setup: an unknown repository, an
/// unknown backend type, a reserved name, or an invalid config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid project config: {0}")]
    InvalidValue(String),

    #[error("No such repository '{name}' in the config. Found: [{}]", .known.join(", "))]
    NoSuchRepository {
        /// The name that was looked up.
        name: String,
        /// Every configured repository name, sorted.
        known: Vec<String>,
    },

    #[error("Invalid repository name (reserved keyword): \"{0}\"")]
    ReservedName(String),

    #[error("Invalid repository type: \"{0}\"")]
    UnknownRepositoryType(String),

    #[error("repository type \"{0}\" is provided by more than one factory")]
    DuplicateRepositoryType(String),
}

impl ProjectConfig {
    /// Read and validate a project config file.
    ///
    /// Files ending in `.toml` are parsed as TOML; everything else as JSON.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::ReadError`] if the file cannot be read
    /// - [`ConfigError::ParseError`] if the contents are malformed
    /// - [`ConfigError::InvalidValue`] if validation fails
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let raw = if path.extension().is_some_and(|ext| ext == "toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
        } else {
            serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
        };

        tracing::debug!(path = %path.display(), "loaded project config");
        Self::from_raw(raw)
    }

    /// Parse and validate a JSON project config.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let raw = serde_json::from_str(text).map_err(|e| ConfigError::ParseError {
            path: PathBuf::from("<text>"),
            message: e.to_string(),
        })?;
        Self::from_raw(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn no_such_repository_message() {
        let err = ConfigError::NoSuchRepository {
            name: "foo".into(),
            known: vec![],
        };
        assert_eq!(
            err.to_string(),
            "No such repository 'foo' in the config. Found: []"
        );

        let err = ConfigError::NoSuchRepository {
            name: "foo".into(),
            known: vec!["internal".into(), "public".into()],
        };
        assert_eq!(
            err.to_string(),
            "No such repository 'foo' in the config. Found: [internal, public]"
        );
    }

    #[test]
    fn load_json_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("moe_config.json");
        std::fs::write(
            &path,
            r#"{"name": "p", "repositories": {"internal": {"type": "noop"}}}"#,
        )
        .unwrap();

        let config = ProjectConfig::load(&path).unwrap();
        assert_eq!(config.name(), "p");
        assert!(config.repositories().contains_key("internal"));
    }

    #[test]
    fn load_toml_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("moe.toml");
        std::fs::write(
            &path,
            r#"
name = "p"

[repositories.internal]
type = "noop"
project_space = "internal"

[[migrations]]
name = "export"
from_repository = "internal"
to_repository = "internal"
"#,
        )
        .unwrap();

        let config = ProjectConfig::load(&path).unwrap();
        assert_eq!(config.repositories()["internal"].project_space(), "internal");
        assert_eq!(config.migrations().len(), 1);
    }

    #[test]
    fn load_missing_file() {
        let err = ProjectConfig::load(Path::new("/nonexistent/moe.json")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn parse_malformed_json() {
        let err = ProjectConfig::parse("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }
}
