//! Domain types - commits, tags and bump recommendations, independent of git operations

pub mod bump;
pub mod commit;
pub mod tag;

pub use bump::{BumpLevel, BumpResult, Decision, ReleaseType};
pub use commit::{Commit, Note, Revert};
pub use tag::Tag;
