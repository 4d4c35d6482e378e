//! Git operations abstraction layer
//!
//! This module provides a trait-based abstraction over the two git queries
//! the bump recommendation needs: discovering release tags and listing the
//! commits made since one of them.
//!
//! - [repository::Git2Repository]: A real implementation using the `git2` crate
//! - [mock::MockRepository]: An in-memory implementation for testing
//!
//! ```no_run
//! # use recommended_bump::git::{Git2Repository, RawCommitsOptions, Repository, TagOptions};
//! # fn example() -> recommended_bump::Result<()> {
//! let repo = Git2Repository::open(".")?;
//! let tags = repo.semver_tags(&TagOptions::default())?;
//! let options = RawCommitsOptions {
//!     from: tags.first().cloned(),
//!     path: None,
//! };
//! for raw in repo.raw_commits(&options)? {
//!     println!("{}", raw?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::error::Result;

/// Separator between the message and the commit id in a raw commit block
pub const HASH_SENTINEL: &str = "-hash-";

/// Render a raw commit block: the full message, the sentinel line, then the id
pub fn format_raw_commit(message: &str, hash: &str) -> String {
    format!("{}\n{}\n{}", message, HASH_SENTINEL, hash)
}

/// Options for release tag discovery
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagOptions {
    /// Only consider `<package>@<version>` tags of this package
    pub package: Option<String>,
}

/// Options for raw commit retrieval
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCommitsOptions {
    /// Tag or revision to start after; `None` means the repository root
    pub from: Option<String>,
    /// Only commits touching this path
    pub path: Option<String>,
}

/// Lazily produced raw commit blocks
pub type RawCommits<'a> = Box<dyn Iterator<Item = Result<String>> + 'a>;

/// Git queries used to build a bump recommendation
///
/// ## Error Handling
///
/// Implementations return underlying git errors unchanged as
/// [crate::error::BumpError::Git] so callers see the original failure.
pub trait Repository {
    /// Release tags reachable from HEAD, newest first
    ///
    /// An empty list means no release has been tagged yet.
    fn semver_tags(&self, options: &TagOptions) -> Result<Vec<String>>;

    /// Raw commit blocks after `options.from` up to HEAD, oldest first
    ///
    /// Each block is formatted with [format_raw_commit].
    fn raw_commits(&self, options: &RawCommitsOptions) -> Result<RawCommits<'_>>;
}
