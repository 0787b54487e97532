//! database::history
//!
//! Finding the revisions that still need migrating.
//!
//! Starting from a revision, walk back through its ancestors until reaching
//! revisions with a recorded equivalence in the other repository. Those
//! equivalences are the last points where both repositories agreed; every
//! revision visited before reaching them is newer and still needs to move.

use std::collections::{BTreeSet, HashSet, VecDeque};

use crate::core::types::Revision;
use crate::repositories::{BackendError, RevisionHistory};

use super::{Db, RepositoryEquivalence};

/// Which parents to follow while searching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchType {
    /// First parents only.
    #[default]
    Linear,
    /// Every parent of merge commits.
    Branched,
}

/// The outcome of [`find_last_equivalence`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EquivalenceSearch {
    /// The equivalences where the walk stopped.
    pub equivalences: Vec<RepositoryEquivalence>,
    /// Revisions newer than those equivalences, newest first.
    pub revisions_since: Vec<Revision>,
}

/// Walk back from `start` to the last equivalences with `other_repository`.
///
/// Each branch of the walk stops at the first revision with an equivalence.
/// A history with no equivalence at all yields no equivalences and every
/// reachable revision.
///
/// # Errors
///
/// Whatever the revision history reports while reading metadata.
pub fn find_last_equivalence(
    history: &dyn RevisionHistory,
    start: &Revision,
    db: &dyn Db,
    other_repository: &str,
    search: SearchType,
) -> Result<EquivalenceSearch, BackendError> {
    let mut result = EquivalenceSearch::default();
    let mut dated = Vec::new();
    let mut seen = HashSet::new();
    let mut queue = VecDeque::from([start.clone()]);

    while let Some(revision) = queue.pop_front() {
        if !seen.insert(revision.clone()) {
            continue;
        }

        let matches: BTreeSet<Revision> = db.find_equivalences(&revision, other_repository);
        if !matches.is_empty() {
            for other in matches {
                let equivalence = RepositoryEquivalence::new(revision.clone(), other);
                if !result.equivalences.contains(&equivalence) {
                    result.equivalences.push(equivalence);
                }
            }
            continue;
        }

        let metadata = history.metadata(&revision)?;
        let parents = match search {
            SearchType::Linear => metadata.parents.into_iter().take(1).collect::<Vec<_>>(),
            SearchType::Branched => metadata.parents,
        };
        queue.extend(parents);
        dated.push((metadata.date, revision));
    }

    // Breadth-first order interleaves branches; present newest first.
    if search == SearchType::Branched {
        dated.sort_by(|a, b| b.0.cmp(&a.0));
    }
    result.revisions_since = dated.into_iter().map(|(_, rev)| rev).collect();

    tracing::debug!(
        start = %start,
        other = other_repository,
        equivalences = result.equivalences.len(),
        pending = result.revisions_since.len(),
        "searched for last equivalence"
    );
    Ok(result)
}
