//! last-equivalence command - What still needs migrating

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context as _, Result};

use super::{load_project, Context};
use crate::core::fs::FileSystem;
use crate::database::{find_last_equivalence, FileDb, SearchType};
use crate::ui::output;

/// Walk back through `from` until reaching equivalences with `to`.
///
/// Prints the equivalences found, then each revision since them.
pub fn last_equivalence(
    ctx: &Context,
    config: &Path,
    db_path: &Path,
    from: &str,
    to: &str,
    revision: Option<&str>,
    branched: bool,
) -> Result<()> {
    let scratch = Arc::new(FileSystem::new());
    let result = (|| -> Result<()> {
        let project = load_project(config, scratch.clone())?;
        // Validate the target name against the config too.
        project.repository(to)?;
        let repository = project.repository(from)?;

        let start = repository
            .revision_history
            .find_highest_revision(revision)
            .with_context(|| format!("Could not find revision in {}", from))?;
        let db = FileDb::load(db_path)
            .with_context(|| format!("Failed to load database {}", db_path.display()))?;

        let search = if branched {
            SearchType::Branched
        } else {
            SearchType::Linear
        };
        let found =
            find_last_equivalence(repository.revision_history.as_ref(), &start, &db, to, search)
                .with_context(|| format!("Failed to walk history of {}", from))?;

        if found.equivalences.is_empty() {
            output::warn(
                format!("No equivalence found between {} and {}", from, to),
                ctx.verbosity,
            );
        }
        for equivalence in &found.equivalences {
            output::print(format!("Last equivalence: {}", equivalence), ctx.verbosity);
        }
        if found.revisions_since.is_empty() {
            output::print("Up to date", ctx.verbosity);
        } else {
            output::print(
                format!("{} revision(s) since:", found.revisions_since.len()),
                ctx.verbosity,
            );
            output::print(output::format_list(&found.revisions_since, "  "), ctx.verbosity);
        }
        Ok(())
    })();

    scratch.end_run();
    result
}
