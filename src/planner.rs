//! Next tag planning
//!
//! For every changed module: find its most recent tag, read its declared
//! `MAJOR.MINOR`, and derive the next patch number and stability suffix.

use crate::boundary::BoundaryWarning;
use crate::detector::ChangeSet;
use crate::domain::{BranchContext, DeclaredVersion, ParsedTagName};
use crate::error::Result;
use crate::git::Repository;
use crate::resolver::{select_latest, TaggedCommit};
use crate::version_file::read_declared_version;
use std::path::PathBuf;
use tracing::{debug, instrument, warn};

/// The tag planned for one module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedTag {
    pub module: String,
    pub tag: ParsedTagName,
    /// Most recent existing tag of the module, if any was used
    pub previous: Option<ParsedTagName>,
    /// Declared version, or `None` when the version file could not be used
    pub declared: Option<DeclaredVersion>,
}

/// Tags to create, in ChangeSet order, plus the warnings met while planning
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NextTagPlan {
    entries: Vec<PlannedTag>,
    warnings: Vec<BoundaryWarning>,
}

impl NextTagPlan {
    pub fn entries(&self) -> &[PlannedTag] {
        &self.entries
    }

    pub fn warnings(&self) -> &[BoundaryWarning] {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Planned entry for a module
    pub fn get(&self, module: &str) -> Option<&PlannedTag> {
        self.entries.iter().find(|e| e.module == module)
    }

    /// Short tag names, e.g. `alpha/2.0.0`, in plan order
    pub fn tag_names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.tag.to_string()).collect()
    }

    pub fn push(&mut self, entry: PlannedTag) {
        self.entries.push(entry);
    }

    pub fn warn(&mut self, warning: BoundaryWarning) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }
}

/// Patch number following `previous` for the declared version.
///
/// Same `MAJOR.MINOR` continues the patch sequence; anything else restarts it at 0.
/// Returns `None` when the previous patch number cannot be incremented.
pub fn next_patch(previous: Option<&ParsedTagName>, declared: &DeclaredVersion) -> Option<u64> {
    match previous {
        Some(tag) if declared.matches(tag) => tag.patch.checked_add(1),
        _ => Some(0),
    }
}

/// Computes the next tag of every changed module
pub struct VersionPlanner<'a, R: Repository> {
    repo: &'a R,
    modules_full_path: PathBuf,
    version_file: String,
    stable_branches: Vec<String>,
}

impl<'a, R: Repository> VersionPlanner<'a, R> {
    pub fn new(
        repo: &'a R,
        modules_full_path: impl Into<PathBuf>,
        version_file: impl Into<String>,
        stable_branches: Vec<String>,
    ) -> Self {
        VersionPlanner {
            repo,
            modules_full_path: modules_full_path.into(),
            version_file: version_file.into(),
            stable_branches,
        }
    }

    /// Most recent tag whose namespace is exactly `module`
    pub fn latest_module_tag(&self, module: &str) -> Result<Option<ParsedTagName>> {
        let mut latest: Option<(TaggedCommit, ParsedTagName)> = None;

        for name in self.repo.tag_refs()? {
            let parsed = match ParsedTagName::parse(&name) {
                Ok(parsed) => parsed,
                Err(e) => {
                    debug!(error = %e, "skipping tag");
                    continue;
                }
            };
            if parsed.namespace != module {
                continue;
            }

            let commit = self.repo.resolve_commit(&name)?;
            let candidate = TaggedCommit {
                name,
                commit,
                committer_time: self.repo.commit_info(commit)?.committer_time,
            };

            latest = match latest {
                Some((best, best_parsed))
                    if select_latest(Some(best.clone()), candidate.clone()) == best =>
                {
                    Some((best, best_parsed))
                }
                _ => Some((candidate, parsed)),
            };
        }

        Ok(latest.map(|(_, parsed)| parsed))
    }

    /// Branch HEAD is on; a detached HEAD yields an unstable context and a warning
    pub fn branch_context(&self) -> (BranchContext, Option<BoundaryWarning>) {
        match self.repo.head_branch() {
            Ok(name) => (BranchContext::new(name, &self.stable_branches), None),
            Err(e) => (
                BranchContext::detached(),
                Some(BoundaryWarning::DetachedHead {
                    reason: e.to_string(),
                }),
            ),
        }
    }

    /// Plan the next tag for one module on the given branch
    pub fn plan_module(&self, module: &str, branch: &BranchContext, plan: &mut NextTagPlan) {
        let previous = match self.latest_module_tag(module) {
            Ok(previous) => previous,
            Err(e) => {
                plan.warn(BoundaryWarning::TagLookupFailed {
                    module: module.to_string(),
                    reason: e.to_string(),
                });
                None
            }
        };

        let module_dir = self.modules_full_path.join(module);
        let declared = match read_declared_version(&module_dir, &self.version_file) {
            Ok(version) => Some(version),
            Err(e) => {
                plan.warn(BoundaryWarning::VersionFileUnreadable {
                    module: module.to_string(),
                    reason: e.to_string(),
                });
                None
            }
        };

        // Without a usable declared version the prior tag is ignored
        let (version, previous, patch) = match declared {
            Some(version) => match next_patch(previous.as_ref(), &version) {
                Some(patch) => (version, previous, patch),
                None => {
                    plan.warn(BoundaryWarning::TagLookupFailed {
                        module: module.to_string(),
                        reason: format!(
                            "patch number of '{}' cannot be incremented",
                            previous.as_ref().map(|p| p.to_string()).unwrap_or_default()
                        ),
                    });
                    (version, None, 0)
                }
            },
            None => (DeclaredVersion::default(), None, 0),
        };

        let tag = ParsedTagName::new(
            module,
            version.major,
            version.minor,
            patch,
            !branch.is_stable,
        );
        debug!(module, tag = %tag, previous = ?previous.as_ref().map(|p| p.to_string()), "planned tag");

        plan.push(PlannedTag {
            module: module.to_string(),
            tag,
            previous,
            declared,
        });
    }

    /// Plan tags for every module of the ChangeSet, in order
    #[instrument(skip(self, changes), fields(modules = changes.len()))]
    pub fn plan(&self, changes: &ChangeSet) -> NextTagPlan {
        let mut plan = NextTagPlan::default();
        let (branch, warning) = self.branch_context();
        if let Some(warning) = warning {
            plan.warn(warning);
        }

        for module in changes.modules() {
            self.plan_module(module, &branch, &mut plan);
        }

        plan
    }
}
