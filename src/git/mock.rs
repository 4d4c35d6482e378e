use crate::domain::Tag;
use crate::error::{BumpError, Result};
use crate::git::{format_raw_commit, RawCommits, RawCommitsOptions, Repository, TagOptions};
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct MockCommit {
    hash: String,
    message: String,
    paths: Vec<String>,
}

/// Mock repository for testing without actual git operations
///
/// History is linear: commits are kept in the order they were added, oldest first.
#[derive(Debug, Default)]
pub struct MockRepository {
    commits: Vec<MockCommit>,
    tags: HashMap<String, String>,
    tag_failure: Option<String>,
    commit_failure: Option<String>,
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a commit on top of the history
    pub fn add_commit(&mut self, hash: impl Into<String>, message: impl Into<String>) {
        self.add_commit_touching(hash, message, &[]);
    }

    /// Append a commit that changes the given paths
    pub fn add_commit_touching(
        &mut self,
        hash: impl Into<String>,
        message: impl Into<String>,
        paths: &[&str],
    ) {
        self.commits.push(MockCommit {
            hash: hash.into(),
            message: message.into(),
            paths: paths.iter().map(|p| p.to_string()).collect(),
        });
    }

    /// Add a tag pointing to a commit hash
    pub fn add_tag(&mut self, name: impl Into<String>, hash: impl Into<String>) {
        self.tags.insert(name.into(), hash.into());
    }

    /// Make tag discovery fail with a git error carrying this message
    pub fn fail_tags_with(&mut self, message: impl Into<String>) {
        self.tag_failure = Some(message.into());
    }

    /// Make commit retrieval fail with a git error carrying this message
    pub fn fail_commits_with(&mut self, message: impl Into<String>) {
        self.commit_failure = Some(message.into());
    }

    fn check_failure(failure: &Option<String>) -> Result<()> {
        match failure {
            Some(message) => Err(git2::Error::from_str(message).into()),
            None => Ok(()),
        }
    }

    fn position(&self, hash: &str) -> Option<usize> {
        self.commits.iter().position(|c| c.hash == hash)
    }
}

impl Repository for MockRepository {
    fn semver_tags(&self, options: &TagOptions) -> Result<Vec<String>> {
        Self::check_failure(&self.tag_failure)?;

        let mut tagged: Vec<(usize, &String)> = self
            .tags
            .iter()
            .filter(|(name, _)| Tag::new(name.as_str()).is_release(options.package.as_deref()))
            .filter_map(|(name, hash)| self.position(hash).map(|index| (index, name)))
            .collect();

        // newest commit first, ties broken by name
        tagged.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));

        Ok(tagged.into_iter().map(|(_, name)| name.clone()).collect())
    }

    fn raw_commits(&self, options: &RawCommitsOptions) -> Result<RawCommits<'_>> {
        Self::check_failure(&self.commit_failure)?;

        let start = match options.from.as_deref().filter(|f| !f.is_empty()) {
            Some(from) => {
                let hash = self.tags.get(from).map(String::as_str).unwrap_or(from);
                let index = self.position(hash).ok_or_else(|| {
                    BumpError::from(git2::Error::from_str(&format!(
                        "revspec '{}' not found",
                        from
                    )))
                })?;
                index + 1
            }
            None => 0,
        };

        let path = options.path.clone();
        let commits = self.commits[start..]
            .iter()
            .filter(move |commit| match path.as_deref() {
                Some(path) => commit.paths.iter().any(|p| p.starts_with(path)),
                None => true,
            })
            .map(|commit| -> Result<String> { Ok(format_raw_commit(&commit.message, &commit.hash)) });

        Ok(Box::new(commits))
    }
}
