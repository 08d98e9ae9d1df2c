//! Multi-stage, multi-platform image builds with `docker buildx`
//!
//! Each declared stage yields two tags, `{repository}:{version}[-{stage}]`
//! and the floating `{repository}:dev[-{stage}]`. Stages are built and
//! pushed in declaration order. Builder failures are returned as-is, there
//! are no retries.

pub mod context;
pub mod copy;
pub mod tag;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::is_production_identifier;
use crate::error::{Result, TagshipError};
use crate::git::{GitGateway, Repository};
use crate::process::{CommandRunner, CommandSpec};

pub use tag::{image_tag, Channel};

/// The `[docker]` configuration table
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Image repository, e.g. `hub.example.com/team/project`
    pub repository: String,
    /// Build stages in order, `""` is the Dockerfile's final stage
    pub stages: Vec<String>,
    /// Platforms images are pushed for
    pub platforms: Vec<String>,
    /// Platforms for local builds, the host platform when empty
    pub build_platforms: Vec<String>,
    pub builder: String,
    pub driver: String,
    pub dockerfile: PathBuf,
    /// Glob patterns of files copied into the build context
    pub files: Vec<String>,
    pub context_dir: PathBuf,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            repository: String::new(),
            stages: vec![String::new()],
            platforms: Vec::new(),
            build_platforms: Vec::new(),
            builder: "tagship".to_string(),
            driver: "docker-container".to_string(),
            dockerfile: PathBuf::from("Dockerfile"),
            files: Vec::new(),
            context_dir: PathBuf::from("build/docker"),
        }
    }
}

impl BuildConfig {
    /// Check the settings every docker operation relies on
    pub fn validate(&self) -> Result<()> {
        if self.repository.trim().is_empty() {
            return Err(TagshipError::build_config("docker repository is not set"));
        }
        if self.stages.is_empty() {
            return Err(TagshipError::build_config("no docker stages declared"));
        }
        let mut seen = HashSet::new();
        for stage in &self.stages {
            if !seen.insert(stage.as_str()) {
                return Err(TagshipError::build_config(format!(
                    "duplicate docker stage '{}'",
                    stage
                )));
            }
        }
        Ok(())
    }

    /// Additionally require target platforms, pushing needs at least one
    pub fn validate_for_push(&self) -> Result<()> {
        self.validate()?;
        if self.platforms.is_empty() {
            return Err(TagshipError::build_config(
                "no docker platforms declared for push",
            ));
        }
        Ok(())
    }
}

/// Docker platform string of the machine running the build
pub fn host_platform() -> String {
    match std::env::consts::ARCH {
        "x86_64" => "linux/amd64".to_string(),
        "aarch64" => "linux/arm64".to_string(),
        "arm" => "linux/arm/v7".to_string(),
        arch => format!("linux/{}", arch),
    }
}

/// Builds and pushes the images of one project version
pub struct ImageBuilder<R: CommandRunner> {
    config: BuildConfig,
    version: String,
    context_dir: PathBuf,
    runner: R,
}

impl<R: CommandRunner> ImageBuilder<R> {
    /// `context_dir` is the prepared build context, docker runs in it
    pub fn new(
        config: BuildConfig,
        version: impl Into<String>,
        context_dir: impl AsRef<Path>,
        runner: R,
    ) -> Self {
        ImageBuilder {
            config,
            version: version.into(),
            context_dir: context_dir.as_ref().to_path_buf(),
            runner,
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Tag of `stage` in the given channel
    pub fn tag(&self, stage: &str, channel: Channel<'_>) -> String {
        image_tag(&self.config.repository, channel, stage)
    }

    /// Version tags of all stages in declaration order
    pub fn version_tags(&self) -> Vec<String> {
        self.config
            .stages
            .iter()
            .map(|stage| self.tag(stage, Channel::Version(&self.version)))
            .collect()
    }

    /// Make sure the configured buildx builder instance exists
    pub fn ensure_builder(&self) -> Result<()> {
        let inspect = self.docker(["buildx", "inspect", self.config.builder.as_str()]);
        if self.runner.run(&inspect)?.success() {
            log::debug!("Using existing builder {}", self.config.builder);
            return Ok(());
        }

        log::info!(
            "Creating builder {} ({})",
            self.config.builder,
            self.config.driver
        );
        let create = self.docker([
            "buildx",
            "create",
            "--name",
            self.config.builder.as_str(),
            "--driver",
            self.config.driver.as_str(),
        ]);
        self.runner.run_checked(&create)?;
        Ok(())
    }

    /// Build every stage for the local platforms and load it into docker
    pub fn build(&self) -> Result<()> {
        self.config.validate()?;
        self.ensure_builder()?;

        let platforms = if self.config.build_platforms.is_empty() {
            host_platform()
        } else {
            self.config.build_platforms.join(",")
        };

        for stage in &self.config.stages {
            let version_tag = self.tag(stage, Channel::Version(&self.version));
            let dev_tag = self.tag(stage, Channel::Dev);
            log::info!("Building {} for {}", version_tag, platforms);

            let spec = self
                .buildx_build(&platforms, "--load", stage)
                .args(["-t", version_tag.as_str(), "-t", dev_tag.as_str(), "."]);
            self.runner.run_checked(&spec)?;
        }
        Ok(())
    }

    /// Whether `tag` can be pulled from the registry
    pub fn tag_exists(&self, tag: &str) -> Result<bool> {
        let platform = self
            .config
            .platforms
            .first()
            .cloned()
            .unwrap_or_else(host_platform);
        let pull = self.docker(["pull", "--platform", platform.as_str(), tag]);
        Ok(self.runner.run(&pull)?.success())
    }

    /// Push the version tag of every stage for all target platforms.
    ///
    /// Production versions must be tagged identically here and on the
    /// release remote. Unless `with_dev` is set, every stage is checked
    /// against the registry before the first push and an existing version
    /// tag fails the whole push. With `with_dev` the check is skipped and
    /// the dev tags are refreshed by [ImageBuilder::push_dev] right after.
    pub fn push<G: Repository>(&self, gateway: &GitGateway<G>, with_dev: bool) -> Result<()> {
        self.config.validate_for_push()?;

        if is_production_identifier(&self.version) {
            gateway.validate_production_tag(&self.version)?;
        }

        self.ensure_builder()?;
        let platforms = self.config.platforms.join(",");
        let tags: Vec<(&str, String)> = self
            .config
            .stages
            .iter()
            .map(|stage| (stage.as_str(), self.tag(stage, Channel::Version(&self.version))))
            .collect();

        if !with_dev {
            for (_, tag) in &tags {
                if self.tag_exists(tag)? {
                    return Err(TagshipError::TagAlreadyExists { tag: tag.clone() });
                }
            }
        }

        for (stage, tag) in &tags {
            log::info!("Pushing {} for {}", tag, platforms);
            let spec = self
                .buildx_build(&platforms, "--push", stage)
                .args(["-t", tag.as_str(), "."]);
            self.runner.run_checked(&spec)?;
        }
        Ok(())
    }

    /// Push the floating dev tag of every stage, overwriting it
    pub fn push_dev(&self) -> Result<()> {
        self.config.validate_for_push()?;
        self.ensure_builder()?;
        let platforms = self.config.platforms.join(",");

        for stage in &self.config.stages {
            let tag = self.tag(stage, Channel::Dev);
            log::info!("Pushing {} for {}", tag, platforms);
            let spec = self
                .buildx_build(&platforms, "--push", stage)
                .args(["-t", tag.as_str(), "."]);
            self.runner.run_checked(&spec)?;
        }
        Ok(())
    }

    fn buildx_build(&self, platforms: &str, output: &str, stage: &str) -> CommandSpec {
        let mut spec = self.docker([
            "buildx",
            "build",
            "--builder",
            self.config.builder.as_str(),
            "--platform",
            platforms,
            output,
        ]);
        if !stage.is_empty() {
            spec = spec.args(["--target", stage]);
        }
        spec
    }

    fn docker<'s>(&self, args: impl IntoIterator<Item = &'s str>) -> CommandSpec {
        CommandSpec::new("docker", &self.context_dir).args(args)
    }
}
