use crate::domain::SemanticVersion;

/// An annotated release tag: the version is the tag name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseTag {
    pub version: SemanticVersion,
    pub message: String,
}

impl ReleaseTag {
    /// Create a tag with an explicit annotation message
    pub fn new(version: SemanticVersion, message: impl Into<String>) -> Self {
        ReleaseTag {
            version,
            message: message.into(),
        }
    }

    /// Tag for a changelog release entry, annotated with its release date
    pub fn for_release(version: SemanticVersion, date: &str) -> Self {
        ReleaseTag::new(version, format!("Release {} from {}", version, date))
    }

    pub fn name(&self) -> String {
        self.version.to_string()
    }
}
