use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Semantic version bump level, encoded as 0 (major), 1 (minor), 2 (patch)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BumpLevel {
    Major = 0,
    Minor = 1,
    Patch = 2,
}

impl BumpLevel {
    /// Convert the integer encoding back into a level
    pub fn from_index(level: u8) -> Option<Self> {
        match level {
            0 => Some(BumpLevel::Major),
            1 => Some(BumpLevel::Minor),
            2 => Some(BumpLevel::Patch),
            _ => None,
        }
    }

    pub fn index(self) -> u8 {
        self as u8
    }

    /// Release type name matching this level
    pub fn release_type(self) -> ReleaseType {
        match self {
            BumpLevel::Major => ReleaseType::Major,
            BumpLevel::Minor => ReleaseType::Minor,
            BumpLevel::Patch => ReleaseType::Patch,
        }
    }
}

impl Serialize for BumpLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.index())
    }
}

impl<'de> Deserialize<'de> for BumpLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let level = u8::deserialize(deserializer)?;
        BumpLevel::from_index(level).ok_or_else(|| {
            serde::de::Error::custom(format!("bump level must be 0, 1 or 2, got {}", level))
        })
    }
}

/// Name of a release type, as reported next to a bump level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseType {
    Major,
    Minor,
    Patch,
}

impl ReleaseType {
    pub fn as_str(self) -> &'static str {
        match self {
            ReleaseType::Major => "major",
            ReleaseType::Minor => "minor",
            ReleaseType::Patch => "patch",
        }
    }
}

impl fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const LEVEL_KEY: &str = "level";
const RELEASE_TYPE_KEY: &str = "releaseType";

/// Recommendation returned to the caller
///
/// An empty result (no level, no release type, no extra fields) means the
/// policy made no recommendation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BumpResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<BumpLevel>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_type: Option<ReleaseType>,

    /// Arbitrary fields supplied by the policy, e.g. `reason`
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BumpResult {
    /// Result carrying only a level; the release type is filled in by `normalize`
    pub fn with_level(level: BumpLevel) -> Self {
        BumpResult {
            level: Some(level),
            ..Default::default()
        }
    }

    /// Attach an arbitrary field.
    ///
    /// `level` and `releaseType` go to the typed fields; a value that does not
    /// parse as one leaves the typed field unchanged.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self.lift_typed_fields();
        self
    }

    /// Move `level` and `releaseType` entries out of `extra`
    fn lift_typed_fields(&mut self) {
        if let Some(value) = self.extra.remove(LEVEL_KEY) {
            if let Ok(level) = serde_json::from_value::<Option<BumpLevel>>(value) {
                self.level = level;
            }
        }
        if let Some(value) = self.extra.remove(RELEASE_TYPE_KEY) {
            if let Ok(release_type) = serde_json::from_value::<Option<ReleaseType>>(value) {
                self.release_type = release_type;
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.level.is_none() && self.release_type.is_none() && self.extra.is_empty()
    }

    /// The `reason` field, when the policy supplied a string one
    pub fn reason(&self) -> Option<&str> {
        self.extra.get("reason").and_then(Value::as_str)
    }

    /// Enforce that a present level is paired with its release type name
    pub fn normalize(mut self) -> Self {
        self.lift_typed_fields();
        if let Some(level) = self.level {
            self.release_type = Some(level.release_type());
        }
        self
    }
}

/// Value produced by a bump policy
///
/// `Level` is the plain-integer form; `Result` is the mapping form.
/// A policy returning `None` is the "no recommendation" case.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Level(BumpLevel),
    Result(BumpResult),
}

impl Decision {
    /// Normalize the policy output into the value handed back to callers
    pub fn normalize(decision: Option<Decision>) -> BumpResult {
        match decision {
            Some(Decision::Level(level)) => BumpResult::with_level(level).normalize(),
            Some(Decision::Result(result)) => result.normalize(),
            None => BumpResult::default(),
        }
    }
}

impl From<BumpLevel> for Decision {
    fn from(level: BumpLevel) -> Self {
        Decision::Level(level)
    }
}

impl From<BumpResult> for Decision {
    fn from(result: BumpResult) -> Self {
        Decision::Result(result)
    }
}
