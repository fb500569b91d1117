//! Git operations abstraction layer
//!
//! This module provides a trait-based abstraction over the git primitives the
//! tagging pipeline consumes, allowing for a real repository backed by `git2`
//! and an in-memory implementation for tests.
//!
//! # Overview
//!
//! The primary abstraction is the [Repository] trait. The concrete
//! implementations include:
//!
//! - [repository::Git2Repository]: A real implementation using the `git2` crate
//! - [mock::MockRepository]: A mock implementation for testing
//!
//! Every call is blocking and the pipeline issues them strictly in sequence.
//! A repository handle is owned by exactly one run, so the trait carries no
//! `Send + Sync` bound.
//!
//! ```rust
//! # use vertag::git::Repository;
//! # fn example<R: Repository>(repo: &R) -> vertag::Result<()> {
//! let head = repo.head_commit()?;
//! let info = repo.commit_info(head)?;
//! println!("HEAD {} committed at {}", info.id, info.committer_time);
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::error::Result;
use git2::Oid;

/// Remote pushed to when no named remote has been registered
pub const DEFAULT_REMOTE: &str = "origin";

/// Commit metadata the pipeline needs for ordering and ancestry walks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub id: Oid,
    /// Parent ids, first parent first
    pub parents: Vec<Oid>,
    /// Committer timestamp in seconds since the epoch
    pub committer_time: i64,
}

impl CommitInfo {
    pub fn first_parent(&self) -> Option<Oid> {
        self.parents.first().copied()
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }
}

/// Kind of change a diff entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
    Renamed,
    Other,
}

/// One file-level entry of a commit-to-commit diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    /// Repository-relative path; the old path for deletions, otherwise the new one
    pub path: String,
    pub kind: ChangeKind,
}

impl FileChange {
    pub fn new(path: impl Into<String>, kind: ChangeKind) -> Self {
        FileChange {
            path: path.into(),
            kind,
        }
    }

    /// True when the file no longer exists after the change
    pub fn is_deletion(&self) -> bool {
        self.kind == ChangeKind::Deleted
    }
}

/// Name and email recorded on annotated tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggerIdentity {
    pub name: String,
    pub email: String,
}

impl TaggerIdentity {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        TaggerIdentity {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Git backend consumed by the tagging pipeline
///
/// ## Error Handling
///
/// All methods return [crate::error::Result<T>]. Implementations map
/// underlying errors (like `git2::Error`) to the appropriate
/// [crate::error::VertagError] variants.
pub trait Repository {
    /// List every tag as a full reference name (`refs/tags/...`), sorted ascending
    fn tag_refs(&self) -> Result<Vec<String>>;

    /// Resolve a revision expression (ref name or hash) to a commit id
    ///
    /// Annotated tags are peeled to the commit they point at.
    fn resolve_commit(&self, revision: &str) -> Result<Oid>;

    /// Fetch a commit's id, parent ids and committer timestamp
    fn commit_info(&self, oid: Oid) -> Result<CommitInfo>;

    /// Full reference name of the branch HEAD points to (e.g. `refs/heads/main`)
    ///
    /// Fails when HEAD is detached.
    fn head_branch(&self) -> Result<String>;

    /// Commit id HEAD resolves to
    fn head_commit(&self) -> Result<Oid>;

    /// File-level diff from commit `from` to commit `to`
    fn diff_files(&self, from: Oid, to: Oid) -> Result<Vec<FileChange>>;

    /// Create an annotated tag named `name` at `target`
    ///
    /// Fails if a tag with that name already exists.
    fn create_annotated_tag(
        &self,
        name: &str,
        target: Oid,
        tagger: &TaggerIdentity,
        message: &str,
    ) -> Result<Oid>;

    /// Register a named remote, re-pointing it if it already exists
    fn add_remote(&self, name: &str, url: &str) -> Result<()>;

    /// Push refspecs to the named remote, or [DEFAULT_REMOTE] when `None`
    fn push(&self, remote: Option<&str>, refspecs: &[&str]) -> Result<()>;
}
