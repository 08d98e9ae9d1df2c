//! Release tag workflow
//!
//! Cuts a release from the latest changelog entry. Stages run strictly in
//! order and the first failing stage aborts the run:
//!
//! 1. the working tree must be clean
//! 2. the changelog's latest entry must be released
//! 3. tags are fetched from the remote
//! 4. HEAD must be published on the primary or a `release/*` branch
//! 5. HEAD must not carry a production tag already
//! 6. no tag on the same `MAJOR.FEATURE` line may be >= the new version
//! 7. the annotated tag is created and tags are pushed
//!
//! Only the last stage mutates anything, so a failed run leaves nothing to
//! roll back and can simply be started again.

use std::fmt;
use std::path::PathBuf;

use crate::changelog::{Changelog, ReleaseEntry};
use crate::domain::{is_production_identifier, ReleaseTag};
use crate::error::{Result, TagshipError};
use crate::git::{GitGateway, Repository};

/// Stages of a release run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseStage {
    CleanCheck,
    ChangelogRead,
    Fetch,
    BranchCheck,
    DuplicateCheck,
    SupersessionCheck,
    TagAndPush,
    Done,
}

impl fmt::Display for ReleaseStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReleaseStage::CleanCheck => "clean working tree check",
            ReleaseStage::ChangelogRead => "changelog read",
            ReleaseStage::Fetch => "fetch",
            ReleaseStage::BranchCheck => "remote branch check",
            ReleaseStage::DuplicateCheck => "duplicate tag check",
            ReleaseStage::SupersessionCheck => "supersession check",
            ReleaseStage::TagAndPush => "tag and push",
            ReleaseStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Creates and pushes the release tag for the latest changelog entry
pub struct ReleaseWorkflow<'a, R: Repository> {
    gateway: &'a GitGateway<R>,
    changelog: PathBuf,
}

impl<'a, R: Repository> ReleaseWorkflow<'a, R> {
    /// `changelog` may be a changelog file or a directory to search
    pub fn new(gateway: &'a GitGateway<R>, changelog: impl Into<PathBuf>) -> Self {
        ReleaseWorkflow {
            gateway,
            changelog: changelog.into(),
        }
    }

    /// Run all stages and return the released entry
    pub fn run(&self) -> Result<ReleaseEntry> {
        self.enter(ReleaseStage::CleanCheck);
        self.gateway.validate_clean_working_tree()?;

        self.enter(ReleaseStage::ChangelogRead);
        let changelog = Changelog::locate(&self.changelog)?;
        let release = changelog
            .latest_version()?
            .ok_or_else(|| TagshipError::NoReleaseEntry {
                path: changelog.path().to_path_buf(),
            })?;
        log::info!(
            "Changelog {} releases {} from {}",
            changelog.path().display(),
            release.version,
            release.date
        );

        self.enter(ReleaseStage::Fetch);
        self.gateway.fetch_tags()?;

        self.enter(ReleaseStage::BranchCheck);
        self.gateway.validate_head_on_valid_remote_branch()?;

        self.enter(ReleaseStage::DuplicateCheck);
        let current = self.gateway.describe()?;
        if is_production_identifier(&current) {
            return Err(TagshipError::AlreadyTagged { tag: current });
        }

        self.enter(ReleaseStage::SupersessionCheck);
        if let Some(latest) = self
            .gateway
            .latest_local_production_tag(Some(&release.version))?
        {
            if latest >= release.version {
                return Err(TagshipError::VersionSuperseded {
                    existing: latest.to_string(),
                    requested: release.version.to_string(),
                });
            }
        }

        self.enter(ReleaseStage::TagAndPush);
        let tag = ReleaseTag::for_release(release.version, &release.date);
        self.gateway.create_and_push_tag(&tag)?;

        self.enter(ReleaseStage::Done);
        Ok(release)
    }

    fn enter(&self, stage: ReleaseStage) {
        log::info!("Release stage: {}", stage);
    }
}
