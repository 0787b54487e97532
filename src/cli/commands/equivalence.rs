//! note-equivalence / find-equivalences commands

use std::path::Path;

use anyhow::{bail, Context as _, Result};

use super::Context;
use crate::core::types::Revision;
use crate::database::{Db, FileDb, RepositoryEquivalence};
use crate::ui::output;

fn parse_revision(text: &str) -> Result<Revision> {
    Revision::parse(text).with_context(|| format!("Invalid revision '{}'", text))
}

fn load_db(path: &Path) -> Result<FileDb> {
    FileDb::load(path).with_context(|| format!("Failed to load database {}", path.display()))
}

/// Record that `first` and `second` hold the same content.
pub fn note_equivalence(ctx: &Context, db_path: &Path, first: &str, second: &str) -> Result<()> {
    let first = parse_revision(first)?;
    let second = parse_revision(second)?;
    if first.repository_name() == second.repository_name() {
        bail!(
            "Equivalences relate two different repositories, got {} twice",
            first.repository_name()
        );
    }

    let mut db = load_db(db_path)?;
    let equivalence = RepositoryEquivalence::new(first, second);
    db.note_equivalence(equivalence.clone());
    db.write()
        .with_context(|| format!("Failed to write database {}", db_path.display()))?;

    output::success(format!("Noted equivalence {}", equivalence), ctx.verbosity);
    Ok(())
}

/// Print every revision in `other_repository` equivalent to `revision`.
pub fn find_equivalences(
    ctx: &Context,
    db_path: &Path,
    revision: &str,
    other_repository: &str,
) -> Result<()> {
    let revision = parse_revision(revision)?;
    let db = load_db(db_path)?;

    let found = db.find_equivalences(&revision, other_repository);
    if found.is_empty() {
        output::warn(
            format!("No equivalences for {} in {}", revision, other_repository),
            ctx.verbosity,
        );
        return Ok(());
    }
    for other in found {
        output::print(other, ctx.verbosity);
    }
    Ok(())
}
