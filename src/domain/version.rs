use crate::error::{Result, TagshipError};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Grammar of a production version identifier, without anchors so it can be
/// embedded into the changelog release-line patterns.
pub const RELEASE_VERSION_PATTERN: &str = r"[0-9]+\.[0-9]+\.[0-9]+(?:-[0-9]+)?";

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]+)\.([0-9]+)\.([0-9]+)(?:-([0-9]+))?$").expect("valid version regex")
});

/// Release version in the form `MAJOR.FEATURE.PATCH[-REVISION]`.
///
/// Ordering is lexicographic over the four components. Field order matters
/// for the derived `Ord`: an absent revision (`None`) sorts before any
/// present revision, so `0.3.0 < 0.3.0-0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SemanticVersion {
    pub major: u32,
    pub feature: u32,
    pub patch: u32,
    pub revision: Option<u32>,
}

impl SemanticVersion {
    /// Create a new version without revision
    pub fn new(major: u32, feature: u32, patch: u32) -> Self {
        SemanticVersion {
            major,
            feature,
            patch,
            revision: None,
        }
    }

    /// Create a new version with a revision suffix
    pub fn with_revision(major: u32, feature: u32, patch: u32, revision: u32) -> Self {
        SemanticVersion {
            major,
            feature,
            patch,
            revision: Some(revision),
        }
    }

    /// Parse a version from an identifier; the whole string must match.
    pub fn parse(ident: &str) -> Result<Self> {
        let invalid = || TagshipError::InvalidVersionFormat(ident.to_string());
        let caps = VERSION_RE.captures(ident).ok_or_else(invalid)?;

        let number = |idx: usize| -> Result<u32> { caps[idx].parse().map_err(|_| invalid()) };
        let revision = match caps.get(4) {
            Some(m) => Some(m.as_str().parse().map_err(|_| invalid())?),
            None => None,
        };

        Ok(SemanticVersion {
            major: number(1)?,
            feature: number(2)?,
            patch: number(3)?,
            revision,
        })
    }

    /// Whether both versions belong to the same `MAJOR.FEATURE` release line
    pub fn same_line(&self, other: &SemanticVersion) -> bool {
        self.major == other.major && self.feature == other.feature
    }
}

impl FromStr for SemanticVersion {
    type Err = TagshipError;

    fn from_str(s: &str) -> Result<Self> {
        SemanticVersion::parse(s)
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.feature, self.patch)?;
        if let Some(revision) = self.revision {
            write!(f, "-{}", revision)?;
        }
        Ok(())
    }
}

/// Returns true if `ident` is a production version identifier.
///
/// Describe output such as `0.0.1-3-gdeadbee` or `0.0.1.dirty` is not.
pub fn is_production_identifier(ident: &str) -> bool {
    SemanticVersion::parse(ident).is_ok()
}
