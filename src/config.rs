use crate::boundary::Warn;
use crate::domain::{Commit, Decision};
use crate::error::{BumpError, Result};
use crate::parser::ParserOptions;
use crate::preset::{PresetSource, WhatBump};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Name of the per-project configuration file
pub const CONFIG_FILE_NAME: &str = ".recommended-bump.toml";

/// Options for a single bump recommendation.
///
/// Built fresh for each call. `ignore_reverted` defaults to `true` and
/// `warn` to a no-op; everything else is unset by default.
#[derive(Clone)]
pub struct Options {
    /// Name of a registered preset, looked up case-insensitively
    pub preset: Option<String>,

    /// Inline preset bundle, used when no `preset` name is given
    pub config: Option<PresetSource>,

    /// Bump policy; overrides whatever the preset supplies
    pub what_bump: Option<Arc<dyn WhatBump>>,

    pub ignore_reverted: bool,

    pub warn: Warn,

    /// Only consider commits touching this path
    pub path: Option<String>,

    /// Only consider `<package>@<version>` tags of this package
    pub lerna_package: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            preset: None,
            config: None,
            what_bump: None,
            ignore_reverted: true,
            warn: Warn::noop(),
            path: None,
            lerna_package: None,
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("preset", &self.preset)
            .field("config", &self.config)
            .field("what_bump", &self.what_bump.as_ref().map(|_| ".."))
            .field("ignore_reverted", &self.ignore_reverted)
            .field("path", &self.path)
            .field("lerna_package", &self.lerna_package)
            .finish()
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build options from an untyped table.
    ///
    /// Fails with `InvalidArgument` when the value is missing or is not a
    /// table. Unknown keys are ignored.
    pub fn from_value(value: Option<toml::Value>) -> Result<Self> {
        FileConfig::from_value(value).map(|config| config.into_parts().0)
    }

    pub fn with_preset(mut self, preset: impl Into<String>) -> Self {
        self.preset = Some(preset.into());
        self
    }

    pub fn with_config(mut self, config: impl Into<PresetSource>) -> Self {
        self.config = Some(config.into());
        self
    }

    pub fn with_what_bump<F>(mut self, what_bump: F) -> Self
    where
        F: Fn(&[Commit]) -> Option<Decision> + Send + Sync + 'static,
    {
        self.what_bump = Some(Arc::new(what_bump));
        self
    }

    pub fn with_ignore_reverted(mut self, ignore_reverted: bool) -> Self {
        self.ignore_reverted = ignore_reverted;
        self
    }

    pub fn with_warn<F>(mut self, warn: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.warn = Warn::new(warn);
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_lerna_package(mut self, package: impl Into<String>) -> Self {
        self.lerna_package = Some(package.into());
        self
    }
}

/// Serializable form of [`Options`], as read from a TOML file.
///
/// Policies and callbacks cannot be expressed in a file, so only the plain
/// settings and the parser option overrides are carried.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct FileConfig {
    pub preset: Option<String>,
    pub ignore_reverted: Option<bool>,
    pub path: Option<String>,
    pub lerna_package: Option<String>,
    pub parser_opts: Option<ParserOptions>,
}

impl FileConfig {
    /// Validate that `value` is a table and read the recognized keys from it
    pub fn from_value(value: Option<toml::Value>) -> Result<Self> {
        match value {
            Some(value @ toml::Value::Table(_)) => value
                .try_into::<FileConfig>()
                .map_err(|e| BumpError::invalid_argument(e.to_string())),
            Some(other) => Err(BumpError::invalid_argument(format!(
                "options must be a table, got {}",
                other.type_str()
            ))),
            None => Err(BumpError::invalid_argument("options must be a table")),
        }
    }

    /// Split into recommendation options and caller parser option overrides
    pub fn into_parts(self) -> (Options, ParserOptions) {
        let options = Options {
            preset: self.preset,
            ignore_reverted: self.ignore_reverted.unwrap_or(true),
            path: self.path,
            lerna_package: self.lerna_package,
            ..Options::default()
        };
        let parser_opts = self.parser_opts.unwrap_or_default();
        (options, parser_opts)
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `.recommended-bump.toml` in current directory
/// 3. `recommended-bump.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(FileConfig)` - Loaded or default configuration
/// * `Err` - If a file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<FileConfig> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if Path::new(CONFIG_FILE_NAME).exists() {
        fs::read_to_string(CONFIG_FILE_NAME)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join("recommended-bump.toml");
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(FileConfig::default());
        }
    } else {
        return Ok(FileConfig::default());
    };

    let value: toml::Value = toml::from_str(&config_str)?;
    tracing::debug!("loaded configuration file");
    FileConfig::from_value(Some(value))
}
