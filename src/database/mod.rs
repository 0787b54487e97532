//! database
//!
//! The equivalence ledger.
//!
//! # Architecture
//!
//! The ledger records two things:
//!
//! - [`RepositoryEquivalence`]: two revisions in different repositories
//!   hold the same logical content. The pair is unordered.
//! - [`SubmittedMigration`]: content from one revision was migrated to
//!   another. The pair is directed, and not every migration yields an
//!   equivalence (edits may have been applied).
//!
//! [`DbStorage`] keeps both as ordered, append-only lists deduplicated on
//! insertion, so the persisted document stays stable and diff-friendly.
//! [`FileDb`] is a ledger loaded from and written back to a JSON file.
//!
//! # Persisted form
//!
//! ```json
//! {
//!   "equivalences": [
//!     {"rev1": {"revId": "45", "repositoryName": "internal"},
//!      "rev2": {"revId": "12", "repositoryName": "public"}}
//!   ],
//!   "migrations": [
//!     {"fromRevision": {"revId": "46", "repositoryName": "internal"},
//!      "toRevision": {"revId": "13", "repositoryName": "public"}}
//!   ]
//! }
//! ```
//!
//! The ledger assumes a single writer per location.

mod file_db;
mod history;
mod storage;

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::Revision;

pub use file_db::{FileDb, FileDbWriter};
pub use history::{find_last_equivalence, EquivalenceSearch, SearchType};
pub use storage::DbStorage;

/// Errors from loading or writing a ledger.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("failed to read database '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse database '{location}': {message}")]
    Parse { location: String, message: String },

    #[error("failed to write database '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize database: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A ledger of equivalences and migrations.
pub trait Db {
    /// Where this ledger was loaded from; the default write target.
    fn location(&self) -> &str;

    /// Record an equivalence. Recording one already present does nothing.
    fn note_equivalence(&mut self, equivalence: RepositoryEquivalence);

    /// Record a migration. Returns `true` if it was not already recorded.
    fn note_migration(&mut self, migration: SubmittedMigration) -> bool;

    /// Every revision in `other_repository` recorded as equivalent to
    /// `revision`, whichever side of the pair it was recorded on.
    fn find_equivalences(&self, revision: &Revision, other_repository: &str) -> BTreeSet<Revision>;

    /// Write the whole ledger back to [`Db::location`].
    fn write(&self) -> Result<(), DbError>;
}

/// Two revisions holding the same logical content.
///
/// Equality and hashing ignore the order of the pair.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct RepositoryEquivalence {
    rev1: Revision,
    rev2: Revision,
}

impl RepositoryEquivalence {
    pub fn new(rev1: Revision, rev2: Revision) -> Self {
        Self { rev1, rev2 }
    }

    pub fn revisions(&self) -> (&Revision, &Revision) {
        (&self.rev1, &self.rev2)
    }

    /// Whether `revision` is one side of this equivalence.
    pub fn has_revision(&self, revision: &Revision) -> bool {
        self.rev1 == *revision || self.rev2 == *revision
    }

    /// The side that is not `revision`, if `revision` is one side.
    pub fn other_revision(&self, revision: &Revision) -> Option<&Revision> {
        if self.rev1 == *revision {
            Some(&self.rev2)
        } else if self.rev2 == *revision {
            Some(&self.rev1)
        } else {
            None
        }
    }

    fn ordered(&self) -> (&Revision, &Revision) {
        if self.rev1 <= self.rev2 {
            (&self.rev1, &self.rev2)
        } else {
            (&self.rev2, &self.rev1)
        }
    }
}

impl PartialEq for RepositoryEquivalence {
    fn eq(&self, other: &Self) -> bool {
        self.ordered() == other.ordered()
    }
}

impl std::hash::Hash for RepositoryEquivalence {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.ordered().hash(state);
    }
}

impl std::fmt::Display for RepositoryEquivalence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} == {}", self.rev1, self.rev2)
    }
}

/// A completed migration from one revision to another.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedMigration {
    from_revision: Revision,
    to_revision: Revision,
}

impl SubmittedMigration {
    pub fn new(from_revision: Revision, to_revision: Revision) -> Self {
        Self {
            from_revision,
            to_revision,
        }
    }

    pub fn from_revision(&self) -> &Revision {
        &self.from_revision
    }

    pub fn to_revision(&self) -> &Revision {
        &self.to_revision
    }
}

impl std::fmt::Display for SubmittedMigration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ==> {}", self.from_revision, self.to_revision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn rev(repo: &str, id: &str) -> Revision {
        Revision::new(id, repo)
    }

    #[test]
    fn equivalence_is_unordered() {
        let a = RepositoryEquivalence::new(rev("internal", "1"), rev("public", "2"));
        let b = RepositoryEquivalence::new(rev("public", "2"), rev("internal", "1"));
        assert_eq!(a, b);

        let set: HashSet<_> = [a.clone(), b].into_iter().collect();
        assert_eq!(set.len(), 1);
        assert_eq!(a.to_string(), "internal{1} == public{2}");
    }

    #[test]
    fn other_revision() {
        let e = RepositoryEquivalence::new(rev("internal", "1"), rev("public", "2"));
        assert!(e.has_revision(&rev("public", "2")));
        assert!(!e.has_revision(&rev("public", "3")));
        assert_eq!(e.other_revision(&rev("internal", "1")), Some(&rev("public", "2")));
        assert_eq!(e.other_revision(&rev("public", "2")), Some(&rev("internal", "1")));
        assert_eq!(e.other_revision(&rev("public", "3")), None);
    }

    #[test]
    fn migration_is_directed() {
        let m = SubmittedMigration::new(rev("internal", "1"), rev("public", "2"));
        let reversed = SubmittedMigration::new(rev("public", "2"), rev("internal", "1"));
        assert_ne!(m, reversed);
        assert_eq!(m.to_string(), "internal{1} ==> public{2}");
    }
}
