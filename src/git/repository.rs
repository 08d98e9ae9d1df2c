use crate::domain::RemoteBranch;
use crate::error::{Result, TagshipError};
use crate::git::Repository;
use crate::process::{CommandRunner, CommandSpec, SystemRunner};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Ceiling for local git queries (status, describe, tag listing)
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Ceiling for git operations that talk to a remote
pub const NETWORK_TIMEOUT: Duration = Duration::from_secs(120);

/// Repository backed by the system `git` client
pub struct SystemGit {
    work_tree: PathBuf,
    runner: SystemRunner,
}

impl SystemGit {
    /// Wrap a working tree. The path must be an existing directory; it does
    /// not have to be a git repository yet.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_dir() {
            return Err(TagshipError::InvalidWorkingTree(path.to_path_buf()));
        }

        Ok(SystemGit {
            work_tree: path.to_path_buf(),
            runner: SystemRunner,
        })
    }

    /// Build a git command for this working tree
    ///
    /// Repository location variables inherited from a calling git hook would
    /// point git at another repository, so they are cleared.
    pub fn git<I, S>(&self, args: I) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandSpec::new("git", &self.work_tree)
            .args(args)
            .timeout(QUERY_TIMEOUT)
            .env_remove("GIT_DIR")
            .env_remove("GIT_WORK_TREE")
            .env_remove("GIT_INDEX_FILE")
    }

    /// Run a git command and return its trimmed stdout
    pub fn git_cmd(&self, args: &[&str]) -> Result<String> {
        self.runner.run_checked(&self.git(args.iter().copied()))
    }
}

impl Repository for SystemGit {
    fn work_tree(&self) -> &Path {
        &self.work_tree
    }

    fn describe(&self) -> Result<Option<String>> {
        let spec = self.git(["describe", "--tags", "--dirty=.dirty"]);
        let output = self.runner.run(&spec)?;
        if output.success() {
            Ok(Some(output.stdout.trim().to_string()))
        } else {
            log::debug!("`{}` found no version: {}", spec, output.stderr.trim());
            Ok(None)
        }
    }

    fn status(&self) -> Result<String> {
        self.git_cmd(&["status", "--porcelain"])
    }

    fn fetch_tags(&self, remote: &str) -> Result<()> {
        let spec = self
            .git(["fetch", "--tags", "-q", remote])
            .timeout(NETWORK_TIMEOUT);
        self.runner.run_checked(&spec)?;
        Ok(())
    }

    fn remote_branches_containing_head(&self) -> Result<Vec<RemoteBranch>> {
        let out = self.git_cmd(&["branch", "-r", "--contains", "HEAD"])?;
        Ok(out
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(RemoteBranch::new)
            .collect())
    }

    fn local_tag_hash(&self, name: &str) -> Result<Option<String>> {
        let refname = format!("refs/tags/{}", name);
        let spec = self.git(["show-ref", "--tags", "-s", refname.as_str()]);
        let output = self.runner.run(&spec)?;

        // show-ref exits 1 without a message when nothing matches
        if output.code == Some(1) && output.stderr.trim().is_empty() {
            return Ok(None);
        }
        let out = output.into_checked(&spec)?;
        Ok(out.lines().next().map(|l| l.trim().to_string()))
    }

    fn remote_tag_hash(&self, remote: &str, name: &str) -> Result<Option<String>> {
        let refname = format!("refs/tags/{}", name);
        let spec = self
            .git(["ls-remote", "--refs", "--tags", "-q", remote, refname.as_str()])
            .timeout(NETWORK_TIMEOUT);
        let out = self.runner.run_checked(&spec)?;

        Ok(out
            .lines()
            .filter_map(|l| l.split_whitespace().next())
            .next()
            .map(str::to_string))
    }

    fn list_tags(&self) -> Result<Vec<String>> {
        let out = self.git_cmd(&["tag", "-l"])?;
        Ok(out
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn create_annotated_tag(&self, name: &str, message: &str) -> Result<()> {
        self.git_cmd(&["tag", "-a", "-m", message, name])?;
        Ok(())
    }

    fn push_tags(&self, remote: &str) -> Result<()> {
        let spec = self
            .git(["push", "--tags", "-q", remote])
            .timeout(NETWORK_TIMEOUT);
        self.runner.run_checked(&spec)?;
        Ok(())
    }
}
