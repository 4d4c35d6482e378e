use thiserror::Error;

/// Unified error type for recommended-bump operations
#[derive(Error, Debug)]
pub enum BumpError {
    /// Malformed options, raised before any asynchronous work starts
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Preset: \"{0}\" does not exist")]
    PresetNotFound(String),

    /// Tag discovery or commit retrieval failed; the git error is kept as-is
    #[error(transparent)]
    Git(#[from] git2::Error),

    #[error("Parser options error: {0}")]
    Parser(String),

    #[error("Preset error: {0}")]
    Preset(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Convenience type alias for Results in recommended-bump
pub type Result<T> = std::result::Result<T, BumpError>;

impl BumpError {
    /// Create an invalid argument error with context
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        BumpError::InvalidArgument(msg.into())
    }

    /// Create a preset-not-found error for the name as the caller spelled it
    pub fn preset_not_found(name: impl Into<String>) -> Self {
        BumpError::PresetNotFound(name.into())
    }

    /// Create a parser options error with context
    pub fn parser(msg: impl Into<String>) -> Self {
        BumpError::Parser(msg.into())
    }

    /// Create a preset error with context
    pub fn preset(msg: impl Into<String>) -> Self {
        BumpError::Preset(msg.into())
    }
}
