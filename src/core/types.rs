//! core::types
//!
//! Value types shared by the expression evaluator, the repository
//! backends and the equivalence ledger.
//!
//! # Types
//!
//! - [`Revision`] - A revision id qualified by the repository it lives in
//! - [`RevisionMetadata`] - Author, date, description and parents of a revision
//!
//! # Examples
//!
//! ```
//! use moe::core::types::Revision;
//!
//! let rev = Revision::new("45", "internal");
//! assert_eq!(rev.to_string(), "internal{45}");
//! assert_eq!(rev, Revision::new("45", "internal"));
//! assert_ne!(rev, Revision::new("45", "public"));
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from parsing the printed form of a revision.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid revision '{0}', expected <repository>{{<revision id>}}")]
    InvalidRevision(String),
}

/// A revision in some configured repository.
///
/// Equality is exact match on both the revision id and the repository
/// name. The serialized form is the one persisted in ledger files:
/// `{"revId": "...", "repositoryName": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Revision {
    rev_id: String,
    repository_name: String,
}

impl Revision {
    /// Create a revision from an id and the name of its repository.
    pub fn new(rev_id: impl Into<String>, repository_name: impl Into<String>) -> Self {
        Self {
            rev_id: rev_id.into(),
            repository_name: repository_name.into(),
        }
    }

    /// The id assigned by the underlying version control system.
    pub fn rev_id(&self) -> &str {
        &self.rev_id
    }

    /// The configured name of the repository this revision comes from.
    pub fn repository_name(&self) -> &str {
        &self.repository_name
    }

    /// Parse the printed form `repository{revId}`.
    ///
    /// # Example
    ///
    /// ```
    /// use moe::core::types::Revision;
    ///
    /// let rev = Revision::parse("public{abc123}").unwrap();
    /// assert_eq!(rev.repository_name(), "public");
    /// assert_eq!(rev.rev_id(), "abc123");
    ///
    /// assert!(Revision::parse("public").is_err());
    /// assert!(Revision::parse("{abc}").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let invalid = || TypeError::InvalidRevision(s.to_string());
        let (repository, rest) = s.split_once('{').ok_or_else(invalid)?;
        let rev_id = rest.strip_suffix('}').ok_or_else(invalid)?;
        if repository.is_empty() || rev_id.is_empty() || rev_id.contains(['{', '}']) {
            return Err(invalid());
        }
        Ok(Self::new(rev_id, repository))
    }
}

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{{{}}}", self.repository_name, self.rev_id)
    }
}

impl std::str::FromStr for Revision {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Descriptive information about a revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionMetadata {
    /// The revision id.
    pub id: String,
    /// Author, as recorded by the backend (e.g. `Name <email>`).
    pub author: String,
    /// When the revision was authored.
    pub date: DateTime<Utc>,
    /// Full revision description / commit message.
    pub description: String,
    /// Parent revisions, first parent first.
    pub parents: Vec<Revision>,
}

impl RevisionMetadata {
    /// First line of the description.
    pub fn summary(&self) -> &str {
        self.description.lines().next().unwrap_or("")
    }
}
