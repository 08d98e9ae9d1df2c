use crate::domain::RemoteBranch;
use crate::error::{Result, TagshipError};
use crate::git::Repository;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Mock repository for testing without actual git operations
///
/// Mutating operations (tag creation, push, fetch) are recorded in
/// [MockRepository::events] so tests can assert on ordering.
pub struct MockRepository {
    work_tree: PathBuf,
    describe: Option<String>,
    status: String,
    remote_branches: Vec<String>,
    local_tags: Mutex<HashMap<String, String>>,
    remote_tags: Mutex<HashMap<String, String>>,
    fetch_error: Option<String>,
    events: Mutex<Vec<String>>,
}

impl MockRepository {
    /// Create a clean, untagged mock repository
    pub fn new(work_tree: impl Into<PathBuf>) -> Self {
        MockRepository {
            work_tree: work_tree.into(),
            describe: None,
            status: String::new(),
            remote_branches: Vec::new(),
            local_tags: Mutex::new(HashMap::new()),
            remote_tags: Mutex::new(HashMap::new()),
            fetch_error: None,
            events: Mutex::new(Vec::new()),
        }
    }

    /// Set the describe output of HEAD
    pub fn set_describe(&mut self, describe: impl Into<String>) {
        self.describe = Some(describe.into());
    }

    /// Set the short status listing (non-empty means dirty)
    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    /// Add a remote-tracking branch containing HEAD
    pub fn add_remote_branch(&mut self, name: impl Into<String>) {
        self.remote_branches.push(name.into());
    }

    /// Add a local tag pointing to a hash
    pub fn add_tag(&mut self, name: impl Into<String>, hash: impl Into<String>) {
        if let Ok(tags) = self.local_tags.get_mut() {
            tags.insert(name.into(), hash.into());
        }
    }

    /// Add a tag on the remote pointing to a hash
    pub fn add_remote_tag(&mut self, name: impl Into<String>, hash: impl Into<String>) {
        if let Ok(tags) = self.remote_tags.get_mut() {
            tags.insert(name.into(), hash.into());
        }
    }

    /// Make fetching fail with the given stderr
    pub fn fail_fetch(&mut self, stderr: impl Into<String>) {
        self.fetch_error = Some(stderr.into());
    }

    /// Recorded mutating operations, oldest first
    pub fn events(&self) -> Vec<String> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    fn record(&self, event: String) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new(".")
    }
}

impl Repository for MockRepository {
    fn work_tree(&self) -> &Path {
        &self.work_tree
    }

    fn describe(&self) -> Result<Option<String>> {
        Ok(self.describe.clone())
    }

    fn status(&self) -> Result<String> {
        Ok(self.status.clone())
    }

    fn fetch_tags(&self, remote: &str) -> Result<()> {
        self.record(format!("fetch {}", remote));
        match &self.fetch_error {
            Some(stderr) => Err(TagshipError::ToolFailed {
                command: format!("git fetch --tags -q {}", remote),
                code: 128,
                stderr: stderr.clone(),
            }),
            None => Ok(()),
        }
    }

    fn remote_branches_containing_head(&self) -> Result<Vec<RemoteBranch>> {
        Ok(self
            .remote_branches
            .iter()
            .map(|b| RemoteBranch::new(b.as_str()))
            .collect())
    }

    fn local_tag_hash(&self, name: &str) -> Result<Option<String>> {
        Ok(self
            .local_tags
            .lock()
            .ok()
            .and_then(|tags| tags.get(name).cloned()))
    }

    fn remote_tag_hash(&self, _remote: &str, name: &str) -> Result<Option<String>> {
        Ok(self
            .remote_tags
            .lock()
            .ok()
            .and_then(|tags| tags.get(name).cloned()))
    }

    fn list_tags(&self) -> Result<Vec<String>> {
        let mut tags: Vec<String> = self
            .local_tags
            .lock()
            .map(|tags| tags.keys().cloned().collect())
            .unwrap_or_default();
        tags.sort();
        Ok(tags)
    }

    fn create_annotated_tag(&self, name: &str, message: &str) -> Result<()> {
        if let Ok(mut tags) = self.local_tags.lock() {
            tags.insert(name.to_string(), format!("mock-{}", name));
        }
        self.record(format!("tag {} '{}'", name, message));
        Ok(())
    }

    fn push_tags(&self, remote: &str) -> Result<()> {
        let local = self
            .local_tags
            .lock()
            .map(|tags| tags.clone())
            .unwrap_or_default();
        if let Ok(mut remote_tags) = self.remote_tags.lock() {
            remote_tags.extend(local);
        }
        self.record(format!("push --tags {}", remote));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_repository_tags() {
        let mut repo = MockRepository::default();
        repo.add_tag("0.0.1", "aaa");

        assert_eq!(repo.local_tag_hash("0.0.1").unwrap(), Some("aaa".to_string()));
        assert_eq!(repo.local_tag_hash("0.0.2").unwrap(), None);
        assert_eq!(repo.list_tags().unwrap(), vec!["0.0.1"]);
    }

    #[test]
    fn test_mock_repository_push_publishes_tags() {
        let repo = MockRepository::default();
        repo.create_annotated_tag("0.0.2", "Release 0.0.2 from 2018/01/15")
            .unwrap();
        assert_eq!(repo.remote_tag_hash("origin", "0.0.2").unwrap(), None);

        repo.push_tags("origin").unwrap();
        assert_eq!(
            repo.remote_tag_hash("origin", "0.0.2").unwrap(),
            repo.local_tag_hash("0.0.2").unwrap()
        );
        assert_eq!(
            repo.events(),
            vec![
                "tag 0.0.2 'Release 0.0.2 from 2018/01/15'".to_string(),
                "push --tags origin".to_string()
            ]
        );
    }

    #[test]
    fn test_mock_repository_default() {
        let repo = MockRepository::default();
        assert!(repo.list_tags().unwrap().is_empty());
        assert_eq!(repo.describe().unwrap(), None);
        assert!(repo.status().unwrap().is_empty());
    }
}
