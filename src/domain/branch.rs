/// A remote-tracking branch as listed by `git branch -r`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteBranch {
    /// The listed name, e.g. `origin/master` or `origin/HEAD -> origin/develop`
    pub name: String,
}

impl RemoteBranch {
    /// Create from one line of `git branch -r` output
    pub fn new(name: impl Into<String>) -> Self {
        RemoteBranch {
            name: name.into().trim().to_string(),
        }
    }
}

/// Which remote branches a release may be cut from.
///
/// The primary branch (`master`/`main`), the remote's default branch
/// (listed as `<remote>/HEAD -> ...`) and any `release/*` branch qualify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchPolicy {
    remote: String,
}

const PRIMARY_BRANCHES: [&str; 2] = ["master", "main"];
const RELEASE_BRANCH_PREFIX: &str = "release/";

impl BranchPolicy {
    pub fn new(remote: impl Into<String>) -> Self {
        BranchPolicy {
            remote: remote.into(),
        }
    }

    pub fn remote(&self) -> &str {
        &self.remote
    }

    /// Check if a remote branch qualifies for releasing
    pub fn allows(&self, branch: &RemoteBranch) -> bool {
        let Some(local) = branch
            .name
            .strip_prefix(&self.remote)
            .and_then(|rest| rest.strip_prefix('/'))
        else {
            return false;
        };

        PRIMARY_BRANCHES.contains(&local)
            || local.starts_with("HEAD -> ")
            || local.starts_with(RELEASE_BRANCH_PREFIX)
    }
}

impl Default for BranchPolicy {
    fn default() -> Self {
        BranchPolicy::new("origin")
    }
}
