pub mod analyzer;
pub mod boundary;
pub mod config;
pub mod domain;
pub mod error;
pub mod filter;
pub mod git;
pub mod parser;
pub mod preset;
pub mod ui;

pub use analyzer::{recommended_bump, Recommender};
pub use config::Options;
pub use domain::{BumpLevel, BumpResult, Commit, Decision, ReleaseType};
pub use error::{BumpError, Result};
pub use parser::ParserOptions;
pub use preset::{PresetConfig, PresetRegistry, PresetSource, WhatBump};
