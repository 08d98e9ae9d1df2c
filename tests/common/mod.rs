// tests/common/mod.rs
#![allow(dead_code)]

use git2::{Oid, Repository};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const RELEASED_RST: &str = "\
=============================
Changes for some cool project
=============================

2018/01/15 0.0.2
================

 - the change in 0.0.2

2017/01/15 0.0.1
================

 - initial version
";

pub const UNRELEASED_RST: &str = "\
=============================
Changes for some cool project
=============================

unreleased
==========

 - work in progress

2017/01/15 0.0.1
================

 - initial version
";

/// A working clone with a bare `origin` next to it
pub struct Project {
    pub repo: Repository,
    pub work: PathBuf,
    pub upstream: PathBuf,
    _tmp: TempDir,
}

impl Project {
    /// Working repository with a configured user and an `origin` remote,
    /// no commits yet
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("Could not create temp dir");
        let work = tmp.path().join("work");
        let upstream = tmp.path().join("upstream.git");

        Repository::init_bare(&upstream).expect("Could not init upstream");
        let repo = Repository::init(&work).expect("Could not init git repo");
        {
            let mut config = repo.config().expect("Could not get config");
            config
                .set_str("user.name", "Test User")
                .expect("Could not set user.name");
            config
                .set_str("user.email", "test@example.com")
                .expect("Could not set user.email");
        }
        repo.remote("origin", upstream.to_str().expect("utf-8 temp path"))
            .expect("Could not add origin");

        Project {
            repo,
            work,
            upstream,
            _tmp: tmp,
        }
    }

    /// Write a file and commit it on the current branch
    pub fn commit_file(&self, name: &str, content: &str, message: &str) -> Oid {
        fs::write(self.work.join(name), content).expect("Could not write file");

        let mut index = self.repo.index().expect("Could not get index");
        index
            .add_path(Path::new(name))
            .expect("Could not add file to index");
        index.write().expect("Could not write index");

        let tree_id = index.write_tree().expect("Could not write tree");
        let tree = self.repo.find_tree(tree_id).expect("Could not find tree");
        let sig = self.repo.signature().expect("Could not get sig");

        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Could not create commit")
    }

    /// Write a file and add it to the index without committing
    pub fn stage_file(&self, name: &str, content: &str) {
        fs::write(self.work.join(name), content).expect("Could not write file");
        let mut index = self.repo.index().expect("Could not get index");
        index
            .add_path(Path::new(name))
            .expect("Could not add file to index");
        index.write().expect("Could not write index");
    }

    /// Point `origin/HEAD` at a remote-tracking branch, as a clone does
    pub fn set_remote_default_branch(&self, branch: &str) {
        self.repo
            .reference_symbolic(
                "refs/remotes/origin/HEAD",
                &format!("refs/remotes/origin/{}", branch),
                true,
                "set origin default branch",
            )
            .expect("Could not set origin/HEAD");
    }

    /// Annotated tag on HEAD
    pub fn tag_head(&self, name: &str) {
        let head = self
            .repo
            .head()
            .and_then(|h| h.peel(git2::ObjectType::Commit))
            .expect("Could not resolve HEAD");
        let sig = self.repo.signature().expect("Could not get sig");
        self.repo
            .tag(name, &head, &sig, &format!("Release {}", name), true)
            .expect("Could not create tag");
    }

    /// Name of the checked out branch, e.g. `master`
    pub fn branch(&self) -> String {
        self.repo
            .head()
            .expect("Could not get HEAD")
            .shorthand()
            .expect("utf-8 branch name")
            .to_string()
    }

    /// Create a local branch at HEAD and check it out
    pub fn checkout_new_branch(&self, name: &str) {
        let head = self
            .repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .expect("Could not resolve HEAD");
        self.repo
            .branch(name, &head, false)
            .expect("Could not create branch");
        self.repo
            .set_head(&format!("refs/heads/{}", name))
            .expect("Could not switch branch");
    }

    /// Push the current branch (and all tags) to origin, then fetch so the
    /// remote-tracking refs are up to date
    pub fn push(&self) {
        let branch = self.branch();
        let mut refspecs = vec![format!("refs/heads/{0}:refs/heads/{0}", branch)];
        self.repo
            .tag_names(None)
            .expect("Could not list tags")
            .iter()
            .flatten()
            .for_each(|t| refspecs.push(format!("refs/tags/{0}:refs/tags/{0}", t)));

        let mut remote = self.repo.find_remote("origin").expect("Could not find origin");
        remote.push(&refspecs, None).expect("Could not push");
        self.fetch();
    }

    pub fn fetch(&self) {
        let mut remote = self.repo.find_remote("origin").expect("Could not find origin");
        remote
            .fetch::<&str>(&[], None, None)
            .expect("Could not fetch");
    }

    /// Move the local tag to HEAD, leaving the remote one where it was
    pub fn retag_head_locally(&self, name: &str) {
        self.repo.tag_delete(name).expect("Could not delete tag");
        self.tag_head(name);
    }

    /// Object id of a tag ref in the bare upstream
    pub fn upstream_tag(&self, name: &str) -> Option<Oid> {
        let upstream = Repository::open_bare(&self.upstream).expect("Could not open upstream");
        let id = upstream
            .refname_to_id(&format!("refs/tags/{}", name))
            .ok();
        id
    }
}

/// Clean project whose HEAD is one published commit past the published
/// `0.0.1` tag, with the given changelog committed
pub fn released_project(changelog: &str) -> Project {
    let project = Project::new();
    project.commit_file("README.md", "Initial content\n", "Initial commit");
    project.tag_head("0.0.1");
    project.commit_file("CHANGES.rst", changelog, "Prepare release");
    project.push();
    project
}
