//! Removal of reverted commits from a commit sequence

use crate::domain::{Commit, Revert};
use std::collections::HashSet;

fn field_matches(expected: Option<&str>, actual: Option<&str>) -> bool {
    match expected {
        None => true,
        Some(expected) => actual.map(str::trim) == Some(expected.trim()),
    }
}

/// A commit is the target of a revert when every field the revert carries matches it
fn is_reverted_by(commit: &Commit, revert: &Revert) -> bool {
    !revert.is_empty()
        && field_matches(revert.header.as_deref(), commit.header.as_deref())
        && field_matches(revert.hash.as_deref(), commit.hash.as_deref())
}

/// Drop every commit undone by a later revert commit, together with the revert itself.
///
/// Commits that do not take part in a revert pair keep their relative order.
/// A revert whose target is not in the sequence is kept.
pub fn filter_reverted(commits: Vec<Commit>) -> Vec<Commit> {
    let reverts: Vec<(usize, &Revert)> = commits
        .iter()
        .enumerate()
        .filter_map(|(index, commit)| commit.revert.as_ref().map(|revert| (index, revert)))
        .collect();

    if reverts.is_empty() {
        return commits;
    }

    let mut removed: HashSet<usize> = HashSet::new();
    for (index, commit) in commits.iter().enumerate() {
        let matched = reverts
            .iter()
            .find(|(revert_index, revert)| *revert_index != index && is_reverted_by(commit, revert));
        if let Some((revert_index, _)) = matched {
            removed.insert(index);
            removed.insert(*revert_index);
        }
    }

    tracing::debug!(removed = removed.len(), "filtered reverted commits");

    commits
        .into_iter()
        .enumerate()
        .filter(|(index, _)| !removed.contains(index))
        .map(|(_, commit)| commit)
        .collect()
}
