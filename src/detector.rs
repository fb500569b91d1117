//! Changed module detection
//!
//! Maps the file-level diff between the comparison point and HEAD to the set
//! of module directories that changed and still exist on disk.

use crate::error::Result;
use crate::git::{FileChange, Repository};
use git2::Oid;
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, instrument};

/// Sorted, de-duplicated names of changed modules
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    modules: Vec<String>,
}

impl ChangeSet {
    pub fn new<I, S>(modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = modules.into_iter().map(Into::into).collect();
        ChangeSet {
            modules: set.into_iter().collect(),
        }
    }

    pub fn modules(&self) -> &[String] {
        &self.modules
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn contains(&self, module: &str) -> bool {
        self.modules.iter().any(|m| m == module)
    }
}

/// Paths that still exist after the change; pure deletions are dropped
pub fn changed_files(changes: &[FileChange]) -> Vec<String> {
    changes
        .iter()
        .filter(|c| !c.is_deletion())
        .map(|c| c.path.clone())
        .collect()
}

/// Module name for a changed path, if it lies inside a module directory.
///
/// `modules/alpha/main.tf` yields `alpha`; `modules/README.md` yields nothing
/// because a root-level file belongs to no module.
pub fn module_for_path(path: &str, modules_dir: &Path) -> Option<String> {
    let relative = Path::new(path).strip_prefix(modules_dir).ok()?;

    let mut segments = relative.components().filter_map(|c| match c {
        Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
        _ => None,
    });

    let module = segments.next()?;
    segments.next()?;
    Some(module)
}

/// Normalize a configured modules directory to a repository-relative path
pub fn normalize_modules_dir(modules_dir: &str) -> PathBuf {
    Path::new(modules_dir)
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .collect()
}

/// Computes the ChangeSet between a comparison commit and HEAD
pub struct ChangeDetector<'a, R: Repository> {
    repo: &'a R,
    modules_dir: PathBuf,
    modules_full_path: PathBuf,
}

impl<'a, R: Repository> ChangeDetector<'a, R> {
    /// # Arguments
    /// * `modules_dir` - Modules root relative to the repository root
    /// * `modules_full_path` - Absolute filesystem path of the modules root
    pub fn new(repo: &'a R, modules_dir: &str, modules_full_path: impl Into<PathBuf>) -> Self {
        ChangeDetector {
            repo,
            modules_dir: normalize_modules_dir(modules_dir),
            modules_full_path: modules_full_path.into(),
        }
    }

    /// Changed modules between `comparison` and `head`
    #[instrument(skip(self))]
    pub fn detect(&self, comparison: Oid, head: Oid) -> Result<ChangeSet> {
        let diff = self.repo.diff_files(comparison, head)?;
        let files = changed_files(&diff);
        debug!(
            total = diff.len(),
            kept = files.len(),
            "filtered deleted paths from diff"
        );

        let candidates: BTreeSet<String> = files
            .iter()
            .filter_map(|f| module_for_path(f, &self.modules_dir))
            .collect();

        let present: Vec<String> = candidates
            .into_iter()
            .filter(|module| {
                let exists = self.modules_full_path.join(module).is_dir();
                if !exists {
                    debug!(module = %module, "module directory no longer exists, skipping");
                }
                exists
            })
            .collect();

        Ok(ChangeSet::new(present))
    }
}
