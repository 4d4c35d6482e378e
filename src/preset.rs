//! Presets: named bundles of parser options and a bump policy
//!
//! A preset is looked up by its lower-cased name in a [`PresetRegistry`].
//! Registered entries are either ready values or asynchronous factories that
//! produce one.

use crate::domain::{BumpLevel, BumpResult, Commit, Decision};
use crate::error::{BumpError, Result};
use crate::parser::ParserOptions;
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Policy deciding the bump level for a set of commits
pub trait WhatBump: Send + Sync {
    /// Returns `None` when no recommendation can be made
    fn what_bump(&self, commits: &[Commit]) -> Option<Decision>;
}

impl<F> WhatBump for F
where
    F: Fn(&[Commit]) -> Option<Decision> + Send + Sync,
{
    fn what_bump(&self, commits: &[Commit]) -> Option<Decision> {
        self(commits)
    }
}

/// Options a preset provides specifically for bump recommendation
#[derive(Clone, Default)]
pub struct RecommendedBumpOpts {
    pub parser_opts: Option<ParserOptions>,
    pub what_bump: Option<Arc<dyn WhatBump>>,
}

impl fmt::Debug for RecommendedBumpOpts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecommendedBumpOpts")
            .field("parser_opts", &self.parser_opts)
            .field("what_bump", &self.what_bump.as_ref().map(|_| ".."))
            .finish()
    }
}

/// A resolved preset bundle
#[derive(Debug, Clone, Default)]
pub struct PresetConfig {
    pub parser_opts: Option<ParserOptions>,
    pub recommended_bump_opts: Option<RecommendedBumpOpts>,
}

impl PresetConfig {
    /// Bump policy supplied by the preset, if any
    pub fn what_bump(&self) -> Option<Arc<dyn WhatBump>> {
        self.recommended_bump_opts
            .as_ref()
            .and_then(|opts| opts.what_bump.clone())
    }

    /// Parser options of the preset.
    ///
    /// The nested recommended-bump parser options replace the top-level ones
    /// entirely when present.
    pub fn parser_opts(&self) -> ParserOptions {
        self.recommended_bump_opts
            .as_ref()
            .and_then(|opts| opts.parser_opts.clone())
            .or_else(|| self.parser_opts.clone())
            .unwrap_or_default()
    }
}

type PresetFactory = Arc<dyn Fn() -> BoxFuture<'static, Result<PresetConfig>> + Send + Sync>;

/// A preset bundle, either ready or produced on demand
#[derive(Clone)]
pub enum PresetSource {
    Value(PresetConfig),
    Factory(PresetFactory),
}

impl PresetSource {
    /// Wrap an asynchronous factory
    pub fn factory<F, Fut>(factory: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<PresetConfig>> + Send + 'static,
    {
        PresetSource::Factory(Arc::new(move || Box::pin(factory())))
    }

    /// Produce the bundle, running the factory if there is one
    pub async fn resolve(&self) -> Result<PresetConfig> {
        match self {
            PresetSource::Value(config) => Ok(config.clone()),
            PresetSource::Factory(factory) => factory().await,
        }
    }
}

impl From<PresetConfig> for PresetSource {
    fn from(config: PresetConfig) -> Self {
        PresetSource::Value(config)
    }
}

impl fmt::Debug for PresetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresetSource::Value(config) => f.debug_tuple("Value").field(config).finish(),
            PresetSource::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}

/// Name-to-preset lookup
#[derive(Debug, Clone)]
pub struct PresetRegistry {
    presets: HashMap<String, PresetSource>,
}

impl PresetRegistry {
    /// Registry with no presets at all
    pub fn empty() -> Self {
        PresetRegistry {
            presets: HashMap::new(),
        }
    }

    /// Registry holding the built-in `angular` and `conventionalcommits` presets
    pub fn builtin() -> Self {
        let mut registry = PresetRegistry::empty();
        registry.register("angular", angular());
        registry.register("conventionalcommits", conventional_commits());
        registry
    }

    /// Register a preset; the name is stored lower-cased
    pub fn register(&mut self, name: &str, source: impl Into<PresetSource>) {
        self.presets.insert(name.to_lowercase(), source.into());
    }

    /// Look a preset up by name, case-insensitively
    pub fn load(&self, name: &str) -> Result<PresetSource> {
        self.presets
            .get(&name.to_lowercase())
            .cloned()
            .ok_or_else(|| BumpError::preset_not_found(name))
    }
}

impl Default for PresetRegistry {
    fn default() -> Self {
        PresetRegistry::builtin()
    }
}

/// Breaking notes give a major bump, features a minor one, anything else a patch
fn breaking_and_features(commits: &[Commit]) -> Option<Decision> {
    let mut level = BumpLevel::Patch;
    let mut breakings = 0;
    let mut features = 0;

    for commit in commits {
        if !commit.notes.is_empty() {
            breakings += commit.notes.len();
            level = BumpLevel::Major;
        } else if commit.has_type("feat") {
            features += 1;
            if level == BumpLevel::Patch {
                level = BumpLevel::Minor;
            }
        }
    }

    let reason = if breakings == 1 {
        format!(
            "There is {} BREAKING CHANGE and {} features",
            breakings, features
        )
    } else {
        format!(
            "There are {} BREAKING CHANGES and {} features",
            breakings, features
        )
    };

    Some(BumpResult::with_level(level).with_field("reason", reason).into())
}

fn angular_parser_opts() -> ParserOptions {
    ParserOptions {
        header_pattern: Some(r"^(\w*)(?:\((.*)\))?: (.*)$".to_string()),
        header_correspondence: Some(vec!["type".into(), "scope".into(), "subject".into()]),
        note_keywords: Some(vec!["BREAKING CHANGE".into()]),
        revert_pattern: Some(
            r#"(?i)^(?:Revert|revert:)\s"?([\s\S]+?)"?\s*This reverts commit (\w*)\."#.to_string(),
        ),
        revert_correspondence: Some(vec!["header".into(), "hash".into()]),
        ..Default::default()
    }
}

fn conventional_commits_parser_opts() -> ParserOptions {
    ParserOptions {
        header_pattern: Some(r"^(\w*)(?:\((.*)\))?!?: (.*)$".to_string()),
        breaking_header_pattern: Some(r"^(\w*)(?:\((.*)\))?!: (.*)$".to_string()),
        note_keywords: Some(vec!["BREAKING CHANGE".into(), "BREAKING-CHANGE".into()]),
        ..angular_parser_opts()
    }
}

/// The `angular` preset
pub fn angular() -> PresetConfig {
    PresetConfig {
        parser_opts: Some(angular_parser_opts()),
        recommended_bump_opts: Some(RecommendedBumpOpts {
            parser_opts: None,
            what_bump: Some(Arc::new(breaking_and_features)),
        }),
    }
}

/// The `conventionalcommits` preset, which also understands `type!:` headers
pub fn conventional_commits() -> PresetConfig {
    PresetConfig {
        parser_opts: Some(conventional_commits_parser_opts()),
        recommended_bump_opts: Some(RecommendedBumpOpts {
            parser_opts: None,
            what_bump: Some(Arc::new(breaking_and_features)),
        }),
    }
}
