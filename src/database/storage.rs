//! database::storage

use serde::{Deserialize, Serialize};

use super::{RepositoryEquivalence, SubmittedMigration};

/// The ledger's two append-only lists.
///
/// Entries are never modified or removed. Adding an entry structurally
/// equal to one already present does nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbStorage {
    equivalences: Vec<RepositoryEquivalence>,
    migrations: Vec<SubmittedMigration>,
}

impl DbStorage {
    pub fn equivalences(&self) -> &[RepositoryEquivalence] {
        &self.equivalences
    }

    pub fn migrations(&self) -> &[SubmittedMigration] {
        &self.migrations
    }

    /// Append `equivalence` unless an equal one is already stored.
    pub fn add_equivalence(&mut self, equivalence: RepositoryEquivalence) {
        if !self.equivalences.contains(&equivalence) {
            self.equivalences.push(equivalence);
        }
    }

    /// Append `migration` unless an equal one is already stored.
    ///
    /// Returns `true` if it was added.
    pub fn add_migration(&mut self, migration: SubmittedMigration) -> bool {
        if self.migrations.contains(&migration) {
            return false;
        }
        self.migrations.push(migration);
        true
    }

    /// Drop duplicates from lists read off disk, keeping first occurrences.
    pub(crate) fn dedup(self) -> Self {
        let mut storage = Self::default();
        for e in self.equivalences {
            storage.add_equivalence(e);
        }
        for m in self.migrations {
            storage.add_migration(m);
        }
        storage
    }
}
