use serde::{Deserialize, Serialize};

/// A note attached to a commit footer, e.g. `BREAKING CHANGE: ...`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub title: String,
    pub text: String,
}

/// Descriptor of the commit that a revert commit undoes
///
/// Every field is optional; only the fields that are present take part in
/// matching against earlier commits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revert {
    pub header: Option<String>,
    pub hash: Option<String>,
}

impl Revert {
    /// True when this descriptor carries no field to match on
    pub fn is_empty(&self) -> bool {
        self.header.is_none() && self.hash.is_none()
    }
}

/// Structured representation of a single commit message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub header: Option<String>,
    pub r#type: Option<String>,
    pub scope: Option<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
    pub footer: Option<String>,
    pub notes: Vec<Note>,
    pub references: Vec<String>,
    pub revert: Option<Revert>,
    pub merge: Option<String>,
    pub hash: Option<String>,
}

impl Commit {
    /// True when any footer note marks a breaking change
    pub fn is_breaking_change(&self) -> bool {
        self.notes
            .iter()
            .any(|note| note.title.starts_with("BREAKING"))
    }

    /// Check whether the commit has the given type
    pub fn has_type(&self, commit_type: &str) -> bool {
        self.r#type.as_deref() == Some(commit_type)
    }
}
