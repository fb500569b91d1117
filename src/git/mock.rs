use crate::error::{Result, VertagError};
use crate::git::{CommitInfo, FileChange, Repository, TaggerIdentity, DEFAULT_REMOTE};
use git2::Oid;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

/// A tag created through [Repository::create_annotated_tag]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedTag {
    pub name: String,
    pub target: Oid,
    pub tagger: TaggerIdentity,
    pub message: String,
}

/// A recorded call to [Repository::push]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushCall {
    pub remote: String,
    pub refspecs: Vec<String>,
}

/// Mock repository for testing without actual git operations
///
/// Commits, tags, HEAD and diffs are set up explicitly; writes are recorded
/// so tests can assert on side effects.
pub struct MockRepository {
    commits: HashMap<Oid, CommitInfo>,
    tags: BTreeMap<String, Oid>,
    head_branch: Option<String>,
    head: Option<Oid>,
    diffs: HashMap<(Oid, Oid), Vec<FileChange>>,
    fail_tag: Option<String>,
    fail_push: bool,
    created: RefCell<Vec<CreatedTag>>,
    remotes: RefCell<BTreeMap<String, String>>,
    pushes: RefCell<Vec<PushCall>>,
}

/// Deterministic object id for test fixtures
pub fn oid(n: u8) -> Oid {
    Oid::from_bytes(&[n; 20]).unwrap_or_else(|_| Oid::zero())
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        MockRepository {
            commits: HashMap::new(),
            tags: BTreeMap::new(),
            head_branch: None,
            head: None,
            diffs: HashMap::new(),
            fail_tag: None,
            fail_push: false,
            created: RefCell::new(Vec::new()),
            remotes: RefCell::new(BTreeMap::new()),
            pushes: RefCell::new(Vec::new()),
        }
    }

    /// Add a commit with its parents and committer time
    pub fn add_commit(&mut self, id: Oid, parents: &[Oid], committer_time: i64) {
        self.commits.insert(
            id,
            CommitInfo {
                id,
                parents: parents.to_vec(),
                committer_time,
            },
        );
    }

    /// Add a tag pointing to a commit; short names get the `refs/tags/` prefix
    pub fn add_tag(&mut self, name: impl Into<String>, target: Oid) {
        let name = name.into();
        let name = if name.starts_with("refs/tags/") {
            name
        } else {
            format!("refs/tags/{}", name)
        };
        self.tags.insert(name, target);
    }

    /// Point HEAD at a branch ref and commit
    pub fn set_head(&mut self, branch_ref: impl Into<String>, commit: Oid) {
        self.head_branch = Some(branch_ref.into());
        self.head = Some(commit);
    }

    /// Point HEAD at a commit without a branch
    pub fn detach_head(&mut self, commit: Oid) {
        self.head_branch = None;
        self.head = Some(commit);
    }

    /// Set the diff returned for `from..to`
    pub fn set_diff(&mut self, from: Oid, to: Oid, changes: Vec<FileChange>) {
        self.diffs.insert((from, to), changes);
    }

    /// Make tag creation fail for the named tag
    pub fn fail_tag_creation(&mut self, name: impl Into<String>) {
        self.fail_tag = Some(name.into());
    }

    /// Make every push fail
    pub fn fail_pushes(&mut self) {
        self.fail_push = true;
    }

    pub fn created_tags(&self) -> Vec<CreatedTag> {
        self.created.borrow().clone()
    }

    pub fn remotes(&self) -> BTreeMap<String, String> {
        self.remotes.borrow().clone()
    }

    pub fn pushes(&self) -> Vec<PushCall> {
        self.pushes.borrow().clone()
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MockRepository {
    fn tag_refs(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.tags.keys().cloned().collect();
        names.extend(
            self.created
                .borrow()
                .iter()
                .map(|t| format!("refs/tags/{}", t.name)),
        );
        names.sort();
        Ok(names)
    }

    fn resolve_commit(&self, revision: &str) -> Result<Oid> {
        if let Some(target) = self.tags.get(revision) {
            return Ok(*target);
        }
        let short = revision.strip_prefix("refs/tags/").unwrap_or(revision);
        if let Some(tag) = self.created.borrow().iter().find(|t| t.name == short) {
            return Ok(tag.target);
        }
        if revision == "HEAD" {
            return self.head_commit();
        }
        Oid::from_str(revision)
            .ok()
            .filter(|id| self.commits.contains_key(id))
            .ok_or_else(|| VertagError::revision(revision, "revision not found"))
    }

    fn commit_info(&self, oid: Oid) -> Result<CommitInfo> {
        self.commits
            .get(&oid)
            .cloned()
            .ok_or_else(|| VertagError::revision(oid.to_string(), "commit not found"))
    }

    fn head_branch(&self) -> Result<String> {
        self.head_branch
            .clone()
            .ok_or_else(|| VertagError::revision("HEAD", "HEAD is not on a branch"))
    }

    fn head_commit(&self) -> Result<Oid> {
        self.head
            .ok_or_else(|| VertagError::revision("HEAD", "HEAD is unborn"))
    }

    fn diff_files(&self, from: Oid, to: Oid) -> Result<Vec<FileChange>> {
        Ok(self.diffs.get(&(from, to)).cloned().unwrap_or_default())
    }

    fn create_annotated_tag(
        &self,
        name: &str,
        target: Oid,
        tagger: &TaggerIdentity,
        message: &str,
    ) -> Result<Oid> {
        if self.fail_tag.as_deref() == Some(name) {
            return Err(VertagError::tag_creation(name, "injected failure"));
        }

        let exists = self.tags.contains_key(&format!("refs/tags/{}", name))
            || self.created.borrow().iter().any(|t| t.name == name);
        if exists {
            return Err(VertagError::tag_creation(name, "tag already exists"));
        }

        self.created.borrow_mut().push(CreatedTag {
            name: name.to_string(),
            target,
            tagger: tagger.clone(),
            message: message.to_string(),
        });
        Ok(target)
    }

    fn add_remote(&self, name: &str, url: &str) -> Result<()> {
        self.remotes
            .borrow_mut()
            .insert(name.to_string(), url.to_string());
        Ok(())
    }

    fn push(&self, remote: Option<&str>, refspecs: &[&str]) -> Result<()> {
        if self.fail_push {
            return Err(VertagError::remote("injected push failure"));
        }

        let remote = remote.unwrap_or(DEFAULT_REMOTE);
        if remote != DEFAULT_REMOTE && !self.remotes.borrow().contains_key(remote) {
            return Err(VertagError::remote(format!(
                "No remote named '{}' found",
                remote
            )));
        }

        self.pushes.borrow_mut().push(PushCall {
            remote: remote.to_string(),
            refspecs: refspecs.iter().map(|s| s.to_string()).collect(),
        });
        Ok(())
    }
}
