use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for tagship operations
#[derive(Error, Debug)]
pub enum TagshipError {
    #[error("Not a valid release version: {0}")]
    InvalidVersionFormat(String),

    #[error("Malformed changelog {}: {reason}", path.display())]
    MalformedChangelog { path: PathBuf, reason: String },

    #[error("No changelog found in {}, allowed names are {candidates:?}", dir.display())]
    ChangelogNotFound {
        dir: PathBuf,
        candidates: Vec<String>,
    },

    #[error("Unknown file extension for changelog '{}'", path.display())]
    UnsupportedChangelogFormat { path: PathBuf },

    #[error("'{}' is not a directory", .0.display())]
    InvalidWorkingTree(PathBuf),

    #[error("Work directory is not clean")]
    DirtyWorkingTree,

    #[error("Changelog entry for release cannot be found in {}, latest entry is unreleased", path.display())]
    NoReleaseEntry { path: PathBuf },

    #[error("The current HEAD is not in sync with any valid remote branch, it points to {branches:?}")]
    HeadNotOnAllowedBranch { branches: Vec<String> },

    #[error("Current HEAD does not point to any remote branches")]
    DetachedOrUnpublishedHead,

    #[error("Current head is already tagged with production tag {tag}")]
    AlreadyTagged { tag: String },

    #[error("Version number superseded: {existing} >= {requested}")]
    VersionSuperseded { existing: String, requested: String },

    #[error("Tag already exists {tag}")]
    TagAlreadyExists { tag: String },

    #[error("Local tag {tag} not found")]
    LocalTagNotFound { tag: String },

    #[error("Local tag {tag} does not exist on {remote} upstream")]
    RemoteTagMissing { tag: String, remote: String },

    #[error("The hash of the tag {tag} differs: local={local} {remote}={remote_hash}")]
    TagHashMismatch {
        tag: String,
        remote: String,
        local: String,
        remote_hash: String,
    },

    #[error("{command} failed (exit code {code})\n{stderr}")]
    ToolFailed {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("{command} did not finish within {seconds} seconds")]
    CommandTimeout { command: String, seconds: u64 },

    #[error("Invalid build configuration: {0}")]
    InvalidBuildConfig(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in tagship
pub type Result<T> = std::result::Result<T, TagshipError>;

impl TagshipError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        TagshipError::Config(msg.into())
    }

    /// Create a build configuration error with context
    pub fn build_config(msg: impl Into<String>) -> Self {
        TagshipError::InvalidBuildConfig(msg.into())
    }

    pub fn malformed_changelog(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        TagshipError::MalformedChangelog {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
