use semver::Version;

/// Represents a git tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
}

impl Tag {
    /// Create a new tag from a string
    pub fn new(name: impl Into<String>) -> Self {
        Tag { name: name.into() }
    }

    /// Semantic version carried by a plain release tag
    ///
    /// A single leading `v` or `=` is tolerated, so `v1.2.3`, `=1.2.3` and
    /// `1.2.3` are all recognized.
    pub fn semver(&self) -> Option<Version> {
        let trimmed = self.name.trim();
        let clean = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('='))
            .unwrap_or(trimmed);
        Version::parse(clean).ok()
    }

    /// Semantic version of a package tag of the form `<package>@<version>`
    pub fn package_semver(&self, package: &str) -> Option<Version> {
        let (name, version) = self.name.rsplit_once('@')?;
        if name != package {
            return None;
        }
        Tag::new(version).semver()
    }

    /// Whether this tag counts as a release tag for the given scope
    pub fn is_release(&self, package: Option<&str>) -> bool {
        match package {
            Some(package) => self.package_semver(package).is_some(),
            None => self.semver().is_some(),
        }
    }
}
