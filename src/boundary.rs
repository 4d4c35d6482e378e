use std::fmt;
use std::sync::Arc;

/// Advisory conditions met while computing a recommendation.
/// These are non-fatal and are reported through the caller's warn callback.
#[derive(Debug, Clone, PartialEq)]
pub enum Advisory {
    /// Nothing was committed since the most recent release tag
    NoCommitsSinceLastRelease,
    /// A commit header did not match the configured header pattern
    UnparsableHeader { header: String },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::NoCommitsSinceLastRelease => write!(f, "No commits since last release"),
            Advisory::UnparsableHeader { header } => {
                write!(f, "Cannot parse commit header: \"{}\"", header)
            }
        }
    }
}

/// Side channel for advisory messages.
///
/// Cloning shares the same callback. The default does nothing.
#[derive(Clone)]
pub struct Warn(Arc<dyn Fn(&str) + Send + Sync>);

impl Warn {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        Warn(Arc::new(f))
    }

    pub fn noop() -> Self {
        Warn::new(|_| {})
    }

    /// Emit a raw message
    pub fn call(&self, message: &str) {
        (self.0)(message)
    }

    /// Emit an advisory using its display form
    pub fn advise(&self, advisory: &Advisory) {
        self.call(&advisory.to_string())
    }
}

impl Default for Warn {
    fn default() -> Self {
        Warn::noop()
    }
}

impl fmt::Debug for Warn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Warn(..)")
    }
}
