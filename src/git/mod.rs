//! Git operations abstraction layer
//!
//! This module provides a trait-based abstraction over the git plumbing that
//! release versioning needs, allowing for multiple implementations including
//! the system `git` client and an in-memory mock for testing.
//!
//! # Overview
//!
//! - [Repository]: low-level operations, one git invocation each
//! - [repository::SystemGit]: shells out to the `git` command line client
//! - [mock::MockRepository]: a mock implementation for testing
//! - [gateway::GitGateway]: release rules (describe, tag validation, branch
//!   policy, latest tag lookup) built on any [Repository]
//!
//! # Usage
//!
//! ```rust,no_run
//! # use tagship::git::GitGateway;
//! # fn example() -> tagship::Result<()> {
//! let gateway = GitGateway::open(std::path::Path::new("."))?;
//! println!("{}", gateway.describe()?);
//! # Ok(())
//! # }
//! ```

pub mod gateway;
pub mod mock;
pub mod repository;

pub use gateway::{GitGateway, UNVERSIONED};
pub use mock::MockRepository;
pub use repository::SystemGit;

use crate::domain::RemoteBranch;
use crate::error::Result;
use std::path::Path;

/// Common git operation trait for abstraction
///
/// ## Error Handling
///
/// Lookups return `Ok(None)` when the thing looked up does not exist; only
/// unexpected client failures are errors. Implementations map client
/// failures to [crate::error::TagshipError::ToolFailed].
pub trait Repository: Send + Sync {
    /// Root of the working tree
    fn work_tree(&self) -> &Path;

    /// Nearest-tag description of HEAD with `.dirty` suffix
    ///
    /// # Returns
    /// * `Ok(Some(desc))` - e.g. `0.0.1`, `0.0.1-2-gdeadbee`, `0.0.1.dirty`
    /// * `Ok(None)` - If there is no tag, no commit or no repository at all
    fn describe(&self) -> Result<Option<String>>;

    /// Short status listing; empty when there are no uncommitted or
    /// untracked changes
    fn status(&self) -> Result<String>;

    /// Refresh tags (and remote-tracking branches) from a remote
    fn fetch_tags(&self, remote: &str) -> Result<()>;

    /// Remote-tracking branches containing the HEAD commit
    fn remote_branches_containing_head(&self) -> Result<Vec<RemoteBranch>>;

    /// Object id the local tag ref points to
    ///
    /// # Returns
    /// * `Ok(Some(hash))` - The tag exists locally
    /// * `Ok(None)` - If the tag doesn't exist
    fn local_tag_hash(&self, name: &str) -> Result<Option<String>>;

    /// Object id the tag ref points to on a remote
    fn remote_tag_hash(&self, remote: &str, name: &str) -> Result<Option<String>>;

    /// All local tag names
    fn list_tags(&self) -> Result<Vec<String>>;

    /// Create an annotated tag on HEAD
    fn create_annotated_tag(&self, name: &str, message: &str) -> Result<()>;

    /// Push all tags, and only tags, to a remote
    fn push_tags(&self, remote: &str) -> Result<()>;
}
