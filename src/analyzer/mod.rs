//! Bump recommendation over a repository's history since the last release

pub mod recommender;

pub use recommender::{recommended_bump, Recommender};
