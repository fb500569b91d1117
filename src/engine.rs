//! Tagging pipeline orchestration
//!
//! Runs RefResolver → ChangeDetector → VersionPlanner → TagWriter against one
//! repository with one explicit set of options. Stage failures abort the run;
//! per-module problems surface as warnings on the plan.

use crate::boundary::BoundaryWarning;
use crate::config::VertagOptions;
use crate::detector::{ChangeDetector, ChangeSet};
use crate::error::Result;
use crate::git::{Git2Repository, Repository, TaggerIdentity};
use crate::planner::{NextTagPlan, VersionPlanner};
use crate::resolver::{ComparisonPoint, RefResolver};
use crate::ui;
use crate::writer::{TagWriter, WriteReport};
use git2::Oid;
use tracing::info;

/// Everything computed before any tag is written
#[derive(Debug, Clone, PartialEq)]
pub struct RunPlan {
    /// Full ref name of the branch HEAD is on, or `HEAD` when detached
    pub branch: String,
    pub head: Oid,
    pub comparison: ComparisonPoint,
    pub changes: ChangeSet,
    pub plan: NextTagPlan,
}

/// Result of a complete run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub plan: RunPlan,
    pub report: WriteReport,
}

/// The tagging engine for one repository
pub struct Vertag<R: Repository> {
    repo: R,
    options: VertagOptions,
}

impl Vertag<Git2Repository> {
    /// Validate the options and open the repository at `options.repo_root`
    pub fn open(options: VertagOptions) -> Result<Self> {
        options.validate()?;
        let repo = Git2Repository::open(&options.repo_root)?;
        Ok(Vertag::new(repo, options))
    }
}

impl<R: Repository> Vertag<R> {
    pub fn new(repo: R, options: VertagOptions) -> Self {
        Vertag { repo, options }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn options(&self) -> &VertagOptions {
        &self.options
    }

    /// Resolve the comparison point, detect changed modules and plan their tags
    pub fn plan(&self) -> Result<RunPlan> {
        let comparison =
            RefResolver::new(&self.repo).comparison_point(self.options.branch_diff)?;
        let head = self.repo.head_commit()?;
        let branch = self
            .repo
            .head_branch()
            .unwrap_or_else(|_| "HEAD".to_string());
        ui::display_comparison(&branch, &comparison);

        let changes = ChangeDetector::new(
            &self.repo,
            &self.options.modules_dir,
            self.options.modules_full_path(),
        )
        .detect(comparison.commit(), head)?;
        ui::display_changed_modules(changes.modules());
        info!(modules = ?changes.modules(), "detected changed modules");

        if changes.is_empty() {
            ui::display_boundary_warning(&BoundaryWarning::NoModulesChanged {
                comparison: comparison.commit().to_string(),
            });
        }

        let plan = VersionPlanner::new(
            &self.repo,
            self.options.modules_full_path(),
            self.options.version_file.clone(),
            self.options.stable_branches.clone(),
        )
        .plan(&changes);

        for warning in plan.warnings() {
            ui::display_boundary_warning(warning);
        }
        ui::display_planned_tags(&plan);

        Ok(RunPlan {
            branch,
            head,
            comparison,
            changes,
            plan,
        })
    }

    /// Plan and write tags; a dry run reports them without creating anything
    pub fn run(&self) -> Result<RunSummary> {
        self.options.validate()?;
        let plan = self.plan()?;

        // validate() guarantees a tagger for real runs; dry runs never use it
        let tagger = self
            .options
            .tagger
            .clone()
            .unwrap_or_else(|| TaggerIdentity::new("", ""));

        let report = TagWriter::new(&self.repo, tagger, self.options.dry_run)
            .with_remote(
                self.options.remote_name.clone(),
                self.options.remote_url.clone(),
            )
            .write(&plan.plan)?;

        Ok(RunSummary { plan, report })
    }
}
