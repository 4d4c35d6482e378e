use crate::domain::Tag;
use crate::error::Result;
use crate::git::{format_raw_commit, RawCommits, RawCommitsOptions, TagOptions};
use git2::{DiffOptions, Oid, Repository as Git2Repo, Sort};
use std::collections::HashMap;
use std::path::Path;

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository { repo })
    }

    /// Map each tagged commit to the names of its tags, peeling annotated tags
    fn tags_by_commit(&self) -> Result<HashMap<Oid, Vec<String>>> {
        let mut tags: HashMap<Oid, Vec<String>> = HashMap::new();
        let names = self.repo.tag_names(None)?;

        for name in names.iter().flatten() {
            let reference = match self.repo.find_reference(&format!("refs/tags/{}", name)) {
                Ok(reference) => reference,
                Err(_) => continue,
            };
            if let Ok(commit) = reference.peel_to_commit() {
                tags.entry(commit.id()).or_default().push(name.to_string());
            }
        }

        for names in tags.values_mut() {
            names.sort();
        }

        Ok(tags)
    }

    /// Whether the commit changes anything under `path` relative to its first parent
    fn touches_path(&self, oid: Oid, path: &str) -> Result<bool> {
        let commit = self.repo.find_commit(oid)?;
        let tree = commit.tree()?;
        let parent_tree = match commit.parent_count() {
            0 => None,
            _ => Some(commit.parent(0)?.tree()?),
        };

        let mut options = DiffOptions::new();
        options.pathspec(path);
        let diff = self
            .repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut options))?;

        Ok(diff.deltas().len() > 0)
    }

    fn raw_commit(&self, oid: Oid) -> Result<String> {
        let commit = self.repo.find_commit(oid)?;
        let message = String::from_utf8_lossy(commit.message_bytes()).into_owned();
        Ok(format_raw_commit(&message, &oid.to_string()))
    }
}

impl super::Repository for Git2Repository {
    fn semver_tags(&self, options: &TagOptions) -> Result<Vec<String>> {
        let tags_by_commit = self.tags_by_commit()?;

        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        revwalk.push_head()?;

        let mut release_tags = Vec::new();
        for oid_result in revwalk {
            let oid = oid_result?;
            if let Some(names) = tags_by_commit.get(&oid) {
                release_tags.extend(
                    names
                        .iter()
                        .filter(|name| Tag::new(name.as_str()).is_release(options.package.as_deref()))
                        .cloned(),
                );
            }
        }

        tracing::debug!(count = release_tags.len(), "discovered release tags");
        Ok(release_tags)
    }

    fn raw_commits(&self, options: &RawCommitsOptions) -> Result<RawCommits<'_>> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME | Sort::REVERSE)?;
        revwalk.push_head()?;

        if let Some(from) = options.from.as_deref().filter(|f| !f.is_empty()) {
            let start = self.repo.revparse_single(from)?.peel_to_commit()?;
            revwalk.hide(start.id())?;
        }

        let path = options.path.clone().filter(|p| !p.is_empty());

        let commits = revwalk.filter_map(move |oid_result| -> Option<Result<String>> {
            let oid = match oid_result {
                Ok(oid) => oid,
                Err(e) => return Some(Err(e.into())),
            };
            if let Some(path) = path.as_deref() {
                match self.touches_path(oid, path) {
                    Ok(true) => {}
                    Ok(false) => return None,
                    Err(e) => return Some(Err(e)),
                }
            }
            Some(self.raw_commit(oid))
        });

        Ok(Box::new(commits))
    }
}
