//! database::file_db
//!
//! A ledger persisted as a JSON file.
//!
//! # Example
//!
//! ```no_run
//! use moe::core::types::Revision;
//! use moe::database::{Db, FileDb, RepositoryEquivalence};
//! use std::path::Path;
//!
//! let mut db = FileDb::load(Path::new("moe_db.json"))?;
//! db.note_equivalence(RepositoryEquivalence::new(
//!     Revision::new("45", "internal"),
//!     Revision::new("12", "public"),
//! ));
//! db.write()?;
//! # Ok::<(), moe::database::DbError>(())
//! ```

use std::collections::BTreeSet;
use std::fs::{self, OpenOptions};
use std::io::Write as _;
use std::path::Path;

use crate::core::types::Revision;

use super::{Db, DbError, DbStorage, RepositoryEquivalence, SubmittedMigration};

/// A ledger loaded from a file, written back to the same file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDb {
    location: String,
    storage: DbStorage,
}

impl FileDb {
    pub fn new(location: impl Into<String>, storage: DbStorage) -> Self {
        Self {
            location: location.into(),
            storage,
        }
    }

    /// Load the ledger at `path`.
    ///
    /// A missing file is an empty ledger that will be created on write.
    pub fn load(path: &Path) -> Result<Self, DbError> {
        let location = path.to_string_lossy().into_owned();
        if !path.exists() {
            tracing::debug!(%location, "no database file, starting empty");
            return Ok(Self::new(location, DbStorage::default()));
        }

        let text = fs::read_to_string(path).map_err(|e| DbError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse_json(location, &text)
    }

    /// Parse a ledger document. Missing lists are empty.
    pub fn parse_json(location: impl Into<String>, text: &str) -> Result<Self, DbError> {
        let location = location.into();
        let storage: DbStorage = serde_json::from_str(text).map_err(|e| DbError::Parse {
            location: location.clone(),
            message: e.to_string(),
        })?;
        Ok(Self::new(location, storage.dedup()))
    }

    pub fn storage(&self) -> &DbStorage {
        &self.storage
    }

    /// The ledger as a pretty-printed JSON document.
    pub fn to_json(&self) -> Result<String, DbError> {
        Ok(serde_json::to_string_pretty(&self.storage)?)
    }
}

impl Db for FileDb {
    fn location(&self) -> &str {
        &self.location
    }

    fn note_equivalence(&mut self, equivalence: RepositoryEquivalence) {
        self.storage.add_equivalence(equivalence);
    }

    fn note_migration(&mut self, migration: SubmittedMigration) -> bool {
        self.storage.add_migration(migration)
    }

    fn find_equivalences(&self, revision: &Revision, other_repository: &str) -> BTreeSet<Revision> {
        self.storage
            .equivalences()
            .iter()
            .filter_map(|e| e.other_revision(revision))
            .filter(|other| other.repository_name() == other_repository)
            .cloned()
            .collect()
    }

    fn write(&self) -> Result<(), DbError> {
        FileDbWriter.write(self)
    }
}

/// Writes ledgers to disk, replacing the whole document atomically.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileDbWriter;

impl FileDbWriter {
    /// Write `db` to its own location.
    pub fn write(&self, db: &FileDb) -> Result<(), DbError> {
        self.write_to_location(Path::new(db.location()), db)
    }

    /// Write `db` to `path`.
    pub fn write_to_location(&self, path: &Path, db: &FileDb) -> Result<(), DbError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_error(parent))?;
        }

        let content = db.to_json()?;

        // Write to a temp file first for atomicity
        let temp_path = path.with_extension("tmp");
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .map_err(write_error(&temp_path))?;
            file.write_all(content.as_bytes())
                .map_err(write_error(&temp_path))?;
            file.write_all(b"\n").map_err(write_error(&temp_path))?;
            file.sync_all().map_err(write_error(&temp_path))?;
        }

        fs::rename(&temp_path, path).map_err(write_error(path))?;

        tracing::info!(
            path = %path.display(),
            equivalences = db.storage().equivalences().len(),
            migrations = db.storage().migrations().len(),
            "wrote database"
        );
        Ok(())
    }
}

fn write_error(path: &Path) -> impl FnOnce(std::io::Error) -> DbError {
    let path = path.to_path_buf();
    move |source| DbError::Write { path, source }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn rev(repo: &str, id: &str) -> Revision {
        Revision::new(id, repo)
    }

    const DOC: &str = r#"{
        "equivalences": [
            {"rev1": {"revId": "1", "repositoryName": "internal"},
             "rev2": {"revId": "1", "repositoryName": "public"}}
        ],
        "migrations": [
            {"fromRevision": {"revId": "2", "repositoryName": "internal"},
             "toRevision": {"revId": "2", "repositoryName": "public"}}
        ]
    }"#;

    #[test]
    fn parses_document() {
        let db = FileDb::parse_json("/db.json", DOC).unwrap();
        assert_eq!(db.location(), "/db.json");
        assert_eq!(db.storage().equivalences().len(), 1);
        assert_eq!(
            db.storage().migrations()[0].to_string(),
            "internal{2} ==> public{2}"
        );
    }

    #[test]
    fn missing_lists_default_to_empty() {
        let db = FileDb::parse_json("x", "{}").unwrap();
        assert!(db.storage().equivalences().is_empty());
        assert!(db.storage().migrations().is_empty());
    }

    #[test]
    fn malformed_document_names_location() {
        let err = FileDb::parse_json("/db.json", "{nope").unwrap_err();
        assert!(err.to_string().starts_with("failed to parse database '/db.json'"));
    }

    #[test]
    fn find_equivalences_is_symmetric() {
        let db = FileDb::parse_json("x", DOC).unwrap();
        assert_eq!(
            db.find_equivalences(&rev("internal", "1"), "public"),
            BTreeSet::from([rev("public", "1")])
        );
        assert_eq!(
            db.find_equivalences(&rev("public", "1"), "internal"),
            BTreeSet::from([rev("internal", "1")])
        );
        assert!(db.find_equivalences(&rev("internal", "1"), "other").is_empty());
        assert!(db.find_equivalences(&rev("internal", "9"), "public").is_empty());
    }

    #[test]
    fn noting_twice_changes_nothing() {
        let mut db = FileDb::parse_json("x", DOC).unwrap();
        let before = db.find_equivalences(&rev("internal", "1"), "public");
        db.note_equivalence(RepositoryEquivalence::new(rev("public", "1"), rev("internal", "1")));
        assert_eq!(db.find_equivalences(&rev("internal", "1"), "public"), before);
        assert_eq!(db.storage().equivalences().len(), 1);

        let m = SubmittedMigration::new(rev("internal", "3"), rev("public", "3"));
        assert!(db.note_migration(m.clone()));
        assert!(!db.note_migration(m));
        assert_eq!(db.storage().migrations().len(), 2);
    }

    #[test]
    fn load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let db = FileDb::load(&dir.path().join("db.json")).unwrap();
        assert_eq!(db.storage(), &DbStorage::default());
    }

    #[test]
    fn write_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/db.json");
        let mut db = FileDb::load(&path).unwrap();
        db.note_equivalence(RepositoryEquivalence::new(rev("internal", "1"), rev("public", "1")));
        db.note_migration(SubmittedMigration::new(rev("internal", "2"), rev("public", "2")));
        db.write().unwrap();

        assert!(!path.with_extension("tmp").exists());
        let reloaded = FileDb::load(&path).unwrap();
        assert_eq!(reloaded, db);
    }

    #[test]
    fn write_to_other_location_leaves_origin_alone() {
        let dir = TempDir::new().unwrap();
        let origin = dir.path().join("db.json");
        let copy = dir.path().join("copy.json");
        let db = FileDb::parse_json(origin.to_string_lossy(), DOC).unwrap();

        FileDbWriter.write_to_location(&copy, &db).unwrap();
        assert!(!origin.exists());
        assert_eq!(FileDb::load(&copy).unwrap().storage(), db.storage());
    }
}
