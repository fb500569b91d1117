//! Comparison point resolution
//!
//! Finds the commit the working branch is diffed against: the latest stable
//! tag, the nearest first-parent ancestor carrying an unstable tag (branch
//! diff mode), or the root commit when no stable tag exists.

use crate::domain::tag::is_unstable_name;
use crate::domain::version::compare_versions;
use crate::error::{Result, VertagError};
use crate::git::Repository;
use git2::Oid;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info, instrument};

/// A tag ref together with the commit it points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedCommit {
    /// Full reference name
    pub name: String,
    pub commit: Oid,
    pub committer_time: i64,
}

/// Keep the most recent of two tagged commits.
///
/// Later committer time wins. On an exact tie the candidate replaces the
/// current choice only if the current one is the lesser version, so a stable
/// tag beats an unstable one and a higher triple beats a lower one. Ties the
/// comparator cannot break keep the current choice.
pub fn select_latest(current: Option<TaggedCommit>, candidate: TaggedCommit) -> TaggedCommit {
    match current {
        None => candidate,
        Some(best) => {
            let newer = candidate.committer_time > best.committer_time;
            let tie_won = candidate.committer_time == best.committer_time
                && compare_versions(&best.name, &candidate.name);
            if newer || tie_won {
                candidate
            } else {
                best
            }
        }
    }
}

/// The commit used as the diff baseline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComparisonPoint {
    /// Commit of the latest stable tag
    StableTag { tag: String, commit: Oid },
    /// Nearest first-parent ancestor of HEAD carrying an unstable tag
    BranchUnstableTag { tag: String, commit: Oid },
    /// Root commit of HEAD's history; used when no stable tag exists
    RootCommit { commit: Oid },
}

impl ComparisonPoint {
    pub fn commit(&self) -> Oid {
        match self {
            ComparisonPoint::StableTag { commit, .. }
            | ComparisonPoint::BranchUnstableTag { commit, .. }
            | ComparisonPoint::RootCommit { commit } => *commit,
        }
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            ComparisonPoint::StableTag { tag, .. }
            | ComparisonPoint::BranchUnstableTag { tag, .. } => Some(tag),
            ComparisonPoint::RootCommit { .. } => None,
        }
    }
}

impl fmt::Display for ComparisonPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonPoint::StableTag { tag, commit } => {
                write!(f, "{} (latest stable tag {})", commit, tag)
            }
            ComparisonPoint::BranchUnstableTag { tag, commit } => {
                write!(f, "{} (branch unstable tag {})", commit, tag)
            }
            ComparisonPoint::RootCommit { commit } => write!(f, "{} (root commit)", commit),
        }
    }
}

/// Resolves the comparison point for a run
pub struct RefResolver<'a, R: Repository> {
    repo: &'a R,
}

impl<'a, R: Repository> RefResolver<'a, R> {
    pub fn new(repo: &'a R) -> Self {
        RefResolver { repo }
    }

    fn tagged_commit(&self, name: &str) -> Result<TaggedCommit> {
        let commit = self.repo.resolve_commit(name)?;
        let info = self.repo.commit_info(commit)?;
        Ok(TaggedCommit {
            name: name.to_string(),
            commit,
            committer_time: info.committer_time,
        })
    }

    /// Latest tag without the unstable marker, by committer time
    #[instrument(skip(self))]
    pub fn latest_stable_tag(&self) -> Result<Option<TaggedCommit>> {
        let mut latest = None;

        for name in self.repo.tag_refs()? {
            if is_unstable_name(&name) {
                continue;
            }
            let candidate = self.tagged_commit(&name)?;
            latest = Some(select_latest(latest, candidate));
        }

        debug!(latest = ?latest.as_ref().map(|t| &t.name), "resolved latest stable tag");
        Ok(latest)
    }

    /// Root commit reached by following first parents from HEAD
    pub fn root_commit(&self) -> Result<Oid> {
        let mut current = self.repo.commit_info(self.repo.head_commit()?)?;
        while let Some(parent) = current.first_parent() {
            current = self.repo.commit_info(parent)?;
        }
        Ok(current.id)
    }

    /// Nearest first-parent ancestor of HEAD (HEAD included) carrying an unstable tag.
    ///
    /// Unstable tags reachable only through a merge's second parent are not
    /// found. Reaching a parentless commit without a match is an error.
    #[instrument(skip(self))]
    pub fn latest_branch_unstable_tag(&self) -> Result<TaggedCommit> {
        let mut unstable: BTreeMap<Oid, Vec<String>> = BTreeMap::new();
        for name in self.repo.tag_refs()? {
            if is_unstable_name(&name) {
                let commit = self.repo.resolve_commit(&name)?;
                unstable.entry(commit).or_default().push(name);
            }
        }

        let mut current = self.repo.head_commit()?;
        loop {
            let info = self.repo.commit_info(current)?;

            if let Some(names) = unstable.get(&current) {
                let name = names
                    .iter()
                    .fold(None::<&String>, |best, name| match best {
                        Some(b) if !compare_versions(b, name) => Some(b),
                        _ => Some(name),
                    })
                    .cloned()
                    .unwrap_or_default();

                debug!(tag = %name, commit = %current, "found branch unstable tag");
                return Ok(TaggedCommit {
                    name,
                    commit: current,
                    committer_time: info.committer_time,
                });
            }

            match info.first_parent() {
                Some(parent) => current = parent,
                None => {
                    return Err(VertagError::revision(
                        "HEAD",
                        "no unstable tag found on the first-parent history of HEAD",
                    ))
                }
            }
        }
    }

    /// Resolve the comparison point for this run
    pub fn comparison_point(&self, branch_diff: bool) -> Result<ComparisonPoint> {
        let point = if branch_diff {
            let tag = self.latest_branch_unstable_tag()?;
            ComparisonPoint::BranchUnstableTag {
                tag: tag.name,
                commit: tag.commit,
            }
        } else {
            match self.latest_stable_tag()? {
                Some(tag) => ComparisonPoint::StableTag {
                    tag: tag.name,
                    commit: tag.commit,
                },
                None => ComparisonPoint::RootCommit {
                    commit: self.root_commit()?,
                },
            }
        };

        info!(comparison = %point, "resolved comparison point");
        Ok(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::mock::{oid, MockRepository};

    /// Linear history 1 <- 2 <- 3 <- 4 with HEAD on main at 4
    fn linear_repo() -> MockRepository {
        let mut repo = MockRepository::new();
        repo.add_commit(oid(1), &[], 100);
        repo.add_commit(oid(2), &[oid(1)], 200);
        repo.add_commit(oid(3), &[oid(2)], 300);
        repo.add_commit(oid(4), &[oid(3)], 400);
        repo.set_head("refs/heads/main", oid(4));
        repo
    }

    #[test]
    fn test_no_tags_uses_root_commit() {
        let repo = linear_repo();
        let point = RefResolver::new(&repo).comparison_point(false).unwrap();
        assert_eq!(point, ComparisonPoint::RootCommit { commit: oid(1) });
    }

    #[test]
    fn test_only_unstable_tags_uses_root_commit() {
        let mut repo = linear_repo();
        repo.add_tag("alpha/1.0.0-unstable", oid(3));
        let point = RefResolver::new(&repo).comparison_point(false).unwrap();
        assert_eq!(point.commit(), oid(1));
    }

    #[test]
    fn test_latest_stable_tag_by_time() {
        let mut repo = linear_repo();
        repo.add_tag("alpha/1.0.0", oid(2));
        repo.add_tag("beta/0.1.0", oid(3));
        repo.add_tag("beta/0.1.1-unstable", oid(4));

        let point = RefResolver::new(&repo).comparison_point(false).unwrap();
        assert_eq!(
            point,
            ComparisonPoint::StableTag {
                tag: "refs/tags/beta/0.1.0".to_string(),
                commit: oid(3),
            }
        );
    }

    #[test]
    fn test_stable_tag_timestamp_tie_prefers_greater_version() {
        let mut repo = linear_repo();
        repo.add_tag("alpha/1.2.0", oid(3));
        repo.add_tag("alpha/1.10.0", oid(3));
        repo.add_tag("alpha/1.9.0", oid(3));

        let latest = RefResolver::new(&repo).latest_stable_tag().unwrap().unwrap();
        assert_eq!(latest.name, "refs/tags/alpha/1.10.0");
    }

    #[test]
    fn test_select_latest_prefers_stable_on_exact_tie() {
        let unstable = TaggedCommit {
            name: "refs/tags/alpha/1.1.9-unstable".to_string(),
            commit: oid(1),
            committer_time: 10,
        };
        let stable = TaggedCommit {
            name: "refs/tags/alpha/1.1.9".to_string(),
            commit: oid(1),
            committer_time: 10,
        };

        assert_eq!(select_latest(Some(unstable.clone()), stable.clone()), stable);
        assert_eq!(select_latest(Some(stable.clone()), unstable), stable);
    }

    #[test]
    fn test_branch_diff_finds_nearest_unstable_ancestor() {
        let mut repo = linear_repo();
        repo.add_tag("alpha/1.0.0-unstable", oid(2));
        repo.add_tag("alpha/1.0.1-unstable", oid(3));
        repo.add_tag("alpha/1.0.0", oid(1));

        let point = RefResolver::new(&repo).comparison_point(true).unwrap();
        assert_eq!(
            point,
            ComparisonPoint::BranchUnstableTag {
                tag: "refs/tags/alpha/1.0.1-unstable".to_string(),
                commit: oid(3),
            }
        );
    }

    #[test]
    fn test_branch_diff_includes_head() {
        let mut repo = linear_repo();
        repo.add_tag("alpha/1.0.2-unstable", oid(4));
        let point = RefResolver::new(&repo).comparison_point(true).unwrap();
        assert_eq!(point.commit(), oid(4));
    }

    #[test]
    fn test_branch_diff_without_unstable_tag_fails() {
        let mut repo = linear_repo();
        repo.add_tag("alpha/1.0.0", oid(2));
        let err = RefResolver::new(&repo).comparison_point(true).unwrap_err();
        assert!(matches!(err, VertagError::RevisionResolution { .. }));
    }

    #[test]
    fn test_branch_diff_ignores_second_parent() {
        // 1 <- 2 <- 4 (merge of 2 and 3), 1 <- 3; only 3 carries an unstable tag
        let mut repo = MockRepository::new();
        repo.add_commit(oid(1), &[], 100);
        repo.add_commit(oid(2), &[oid(1)], 200);
        repo.add_commit(oid(3), &[oid(1)], 250);
        repo.add_commit(oid(4), &[oid(2), oid(3)], 300);
        repo.set_head("refs/heads/feature", oid(4));
        repo.add_tag("alpha/1.0.0-unstable", oid(3));

        assert!(RefResolver::new(&repo).comparison_point(true).is_err());
    }

    #[test]
    fn test_several_roots_uses_first_parent_root() {
        // 1 <- 2 <- 4 (merge of 2 and 3); 3 is a second, unrelated root
        let mut repo = MockRepository::new();
        repo.add_commit(oid(1), &[], 100);
        repo.add_commit(oid(2), &[oid(1)], 200);
        repo.add_commit(oid(3), &[], 50);
        repo.add_commit(oid(4), &[oid(2), oid(3)], 300);
        repo.set_head("refs/heads/main", oid(4));

        let resolver = RefResolver::new(&repo);
        assert_eq!(resolver.root_commit().unwrap(), oid(1));
        assert_eq!(
            resolver.comparison_point(false).unwrap(),
            ComparisonPoint::RootCommit { commit: oid(1) }
        );

        // Swapping the parent order switches the root
        repo.add_commit(oid(5), &[oid(3), oid(2)], 400);
        repo.set_head("refs/heads/main", oid(5));
        assert_eq!(RefResolver::new(&repo).root_commit().unwrap(), oid(3));
    }

    #[test]
    fn test_unresolvable_stable_tag_is_fatal() {
        let mut repo = linear_repo();
        repo.add_tag("alpha/1.0.0", oid(9));
        assert!(RefResolver::new(&repo).comparison_point(false).is_err());
    }
}
