use crate::domain::{is_production_identifier, BranchPolicy, ReleaseTag, SemanticVersion};
use crate::error::{Result, TagshipError};
use crate::git::{Repository, SystemGit};
use std::path::Path;

/// Version reported for trees without any tag
pub const UNVERSIONED: &str = "unversioned";

/// Release-level git operations on one working tree.
///
/// Wraps a [Repository] and applies the release rules: describe fallback,
/// tag integrity checks against the remote, clean tree and branch
/// preconditions, and latest production tag lookup.
pub struct GitGateway<R: Repository = SystemGit> {
    repo: R,
    policy: BranchPolicy,
}

impl GitGateway<SystemGit> {
    /// Open a working tree using the system git client and `origin`.
    ///
    /// # Returns
    /// * `Ok(GitGateway)` - The path is a directory
    /// * `Err(InvalidWorkingTree)` - If the path does not exist or is a file
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_remote(path, "origin")
    }

    /// Open a working tree that releases to the given remote
    pub fn open_with_remote(path: &Path, remote: &str) -> Result<Self> {
        Ok(GitGateway::new(SystemGit::open(path)?, BranchPolicy::new(remote)))
    }
}

impl<R: Repository> GitGateway<R> {
    pub fn new(repo: R, policy: BranchPolicy) -> Self {
        GitGateway { repo, policy }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Name of the remote releases are published to
    pub fn remote(&self) -> &str {
        self.policy.remote()
    }

    /// Describe HEAD relative to the nearest tag.
    ///
    /// Returns `{tag}[-{N}-g{hash}][.dirty]`, or [UNVERSIONED] when there is
    /// no tag yet (this includes directories that are not repositories).
    pub fn describe(&self) -> Result<String> {
        Ok(self
            .repo
            .describe()?
            .unwrap_or_else(|| UNVERSIONED.to_string()))
    }

    /// Refresh tags and remote-tracking branches from the release remote
    pub fn fetch_tags(&self) -> Result<()> {
        self.repo.fetch_tags(self.remote())
    }

    /// Verify that a production tag exists locally and points to the same
    /// object on the release remote.
    ///
    /// The remote side is read with `ls-remote` instead of fetching tags
    /// first, so a diverging local tag is reported rather than clobbered.
    ///
    /// # Panics
    /// If `name` is not a production version identifier; callers check with
    /// [is_production_identifier] first.
    pub fn validate_production_tag(&self, name: &str) -> Result<()> {
        assert!(
            is_production_identifier(name),
            "{} is not a production version tag",
            name
        );

        let local = self
            .repo
            .local_tag_hash(name)?
            .ok_or_else(|| TagshipError::LocalTagNotFound {
                tag: name.to_string(),
            })?;

        let remote = self
            .repo
            .remote_tag_hash(self.remote(), name)?
            .ok_or_else(|| TagshipError::RemoteTagMissing {
                tag: name.to_string(),
                remote: self.remote().to_string(),
            })?;

        if local != remote {
            return Err(TagshipError::TagHashMismatch {
                tag: name.to_string(),
                remote: self.remote().to_string(),
                local,
                remote_hash: remote,
            });
        }

        log::debug!("Tag {} matches {} ({})", name, self.remote(), local);
        Ok(())
    }

    /// Fail unless there are no uncommitted or untracked changes
    pub fn validate_clean_working_tree(&self) -> Result<()> {
        let status = self.repo.status()?;
        if !status.trim().is_empty() {
            log::debug!(
                "Working tree {} has changes:\n{}",
                self.repo.work_tree().display(),
                status
            );
            return Err(TagshipError::DirtyWorkingTree);
        }
        Ok(())
    }

    /// Fail unless HEAD is published on a branch releases may be cut from
    pub fn validate_head_on_valid_remote_branch(&self) -> Result<()> {
        let branches = self.repo.remote_branches_containing_head()?;

        if branches.is_empty() {
            return Err(TagshipError::DetachedOrUnpublishedHead);
        }

        if !branches.iter().any(|b| self.policy.allows(b)) {
            return Err(TagshipError::HeadNotOnAllowedBranch {
                branches: branches.into_iter().map(|b| b.name).collect(),
            });
        }
        Ok(())
    }

    /// Highest local production tag, optionally restricted to the release
    /// line (`MAJOR.FEATURE`) of `scope`.
    pub fn latest_local_production_tag(
        &self,
        scope: Option<&SemanticVersion>,
    ) -> Result<Option<SemanticVersion>> {
        Ok(self
            .repo
            .list_tags()?
            .iter()
            .filter_map(|tag| SemanticVersion::parse(tag).ok())
            .filter(|v| scope.map_or(true, |s| s.same_line(v)))
            .max())
    }

    /// Create the annotated tag on HEAD and push tags to the release remote
    pub fn create_and_push_tag(&self, tag: &ReleaseTag) -> Result<()> {
        let name = tag.name();
        self.repo.create_annotated_tag(&name, &tag.message)?;
        log::info!("Created tag {}", name);
        self.repo.push_tags(self.remote())?;
        log::info!("Pushed tags to {}", self.remote());
        Ok(())
    }
}
