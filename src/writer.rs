//! Tag creation and publishing

use crate::domain::tag::ALL_TAGS_REFSPEC;
use crate::error::{Result, VertagError};
use crate::git::{Repository, TaggerIdentity};
use crate::planner::NextTagPlan;
use crate::ui;
use tracing::{info, instrument};

/// Name of the remote registered from `--remote-url`
pub const DEFAULT_REMOTE_NAME: &str = "ci";

/// Outcome of writing a plan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
    /// Tags created and pushed, in order (or that would have been, for a dry run)
    pub created: Vec<String>,
    pub dry_run: bool,
}

/// Creates annotated tags at HEAD and pushes them
pub struct TagWriter<'a, R: Repository> {
    repo: &'a R,
    tagger: TaggerIdentity,
    remote_name: String,
    remote_url: Option<String>,
    dry_run: bool,
}

impl<'a, R: Repository> TagWriter<'a, R> {
    pub fn new(repo: &'a R, tagger: TaggerIdentity, dry_run: bool) -> Self {
        TagWriter {
            repo,
            tagger,
            remote_name: DEFAULT_REMOTE_NAME.to_string(),
            remote_url: None,
            dry_run,
        }
    }

    /// Push to a named remote registered from `url` instead of the default remote
    pub fn with_remote(mut self, name: impl Into<String>, url: Option<String>) -> Self {
        self.remote_name = name.into();
        self.remote_url = url.filter(|u| !u.trim().is_empty());
        self
    }

    /// Write every planned tag in order.
    ///
    /// The first creation or push failure stops the loop; tags created before
    /// it are kept.
    #[instrument(skip(self, plan), fields(tags = plan.len(), dry_run = self.dry_run))]
    pub fn write(&self, plan: &NextTagPlan) -> Result<WriteReport> {
        let mut report = WriteReport {
            created: Vec::new(),
            dry_run: self.dry_run,
        };

        if plan.is_empty() {
            ui::display_status("No tags to create");
            return Ok(report);
        }

        if self.dry_run {
            for name in plan.tag_names() {
                ui::display_dry_run_tag(&name);
                report.created.push(name);
            }
            return Ok(report);
        }

        let remote = match &self.remote_url {
            Some(url) => {
                self.repo.add_remote(&self.remote_name, url)?;
                Some(self.remote_name.as_str())
            }
            None => None,
        };

        let head = self.repo.head_commit()?;

        for name in plan.tag_names() {
            self.repo
                .create_annotated_tag(&name, head, &self.tagger, &name)
                .map_err(|e| match e {
                    VertagError::TagCreation { .. } => e,
                    other => VertagError::tag_creation(&name, other),
                })?;

            self.repo
                .push(remote, &[ALL_TAGS_REFSPEC])
                .map_err(|e| VertagError::push(&name, e))?;

            info!(tag = %name, "created and pushed tag");
            ui::display_created_tag(&name);
            report.created.push(name);
        }

        Ok(report)
    }
}
