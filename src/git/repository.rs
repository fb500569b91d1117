use crate::error::{Result, VertagError};
use crate::git::{ChangeKind, CommitInfo, FileChange, TaggerIdentity, DEFAULT_REMOTE};
use git2::{Delta, Oid, Repository as Git2Repo};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open the repository rooted exactly at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let repo = Git2Repo::open(path).map_err(|e| VertagError::RepositoryOpen {
            path: path.display().to_string(),
            reason: e.message().to_string(),
        })?;

        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }

    /// Expand glob refspecs (`refs/tags/*:refs/tags/*`) over local references.
    ///
    /// libgit2 only pushes concrete refspecs, so each glob becomes one
    /// refspec per matching local ref.
    fn expand_refspecs(&self, refspecs: &[&str]) -> Result<Vec<String>> {
        let mut expanded = Vec::new();

        for spec in refspecs {
            let (force, body) = match spec.strip_prefix('+') {
                Some(rest) => ("+", rest),
                None => ("", *spec),
            };
            let (src, dst) = body.split_once(':').unwrap_or((body, body));

            let (Some(src_prefix), Some(dst_prefix)) =
                (src.strip_suffix('*'), dst.strip_suffix('*'))
            else {
                expanded.push(spec.to_string());
                continue;
            };

            let mut names = Vec::new();
            for reference in self.repo.references_glob(src)? {
                if let Some(name) = reference?.name() {
                    names.push(name.to_string());
                }
            }
            names.sort();

            for name in names {
                let tail = &name[src_prefix.len()..];
                expanded.push(format!("{}{}:{}{}", force, name, dst_prefix, tail));
            }
        }

        Ok(expanded)
    }
}

/// Credentials callback shared by network operations.
///
/// Tries SSH keys from ~/.ssh/, then the SSH agent, then git2 defaults.
fn remote_callbacks<'a>() -> git2::RemoteCallbacks<'a> {
    let mut callbacks = git2::RemoteCallbacks::new();
    callbacks.credentials(|_url, username_from_url, allowed_types| {
        let username = username_from_url.unwrap_or("git");

        if allowed_types.contains(git2::CredentialType::SSH_KEY) {
            if let Some(home) = dirs::home_dir() {
                for key in ["id_ed25519", "id_rsa", "id_ecdsa"] {
                    let path = home.join(".ssh").join(key);
                    if path.exists() {
                        if let Ok(cred) = git2::Cred::ssh_key(username, None, &path, None) {
                            return Ok(cred);
                        }
                    }
                }
            }

            if let Ok(cred) = git2::Cred::ssh_key_from_agent(username) {
                return Ok(cred);
            }
        }

        git2::Cred::default()
    });

    // A rejected ref is a failed push, not a warning
    callbacks.push_update_reference(|refname, status| match status {
        Some(status) => Err(git2::Error::from_str(&format!(
            "remote rejected {}: {}",
            refname, status
        ))),
        None => Ok(()),
    });

    callbacks
}

fn change_kind(status: Delta) -> ChangeKind {
    match status {
        Delta::Added | Delta::Copied => ChangeKind::Added,
        Delta::Modified | Delta::Typechange => ChangeKind::Modified,
        Delta::Deleted => ChangeKind::Deleted,
        Delta::Renamed => ChangeKind::Renamed,
        _ => ChangeKind::Other,
    }
}

impl super::Repository for Git2Repository {
    fn tag_refs(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for reference in self.repo.references_glob("refs/tags/*")? {
            if let Some(name) = reference?.name() {
                names.push(name.to_string());
            }
        }
        names.sort();

        debug!(count = names.len(), "listed tag refs");
        Ok(names)
    }

    fn resolve_commit(&self, revision: &str) -> Result<Oid> {
        let object = self
            .repo
            .revparse_single(revision)
            .map_err(|e| VertagError::revision(revision, e.message()))?;

        let commit = object
            .peel_to_commit()
            .map_err(|e| VertagError::revision(revision, e.message()))?;

        Ok(commit.id())
    }

    fn commit_info(&self, oid: Oid) -> Result<CommitInfo> {
        let commit = self
            .repo
            .find_commit(oid)
            .map_err(|e| VertagError::revision(oid.to_string(), e.message()))?;

        let committer_time = commit.committer().when().seconds();

        Ok(CommitInfo {
            id: commit.id(),
            parents: commit.parent_ids().collect(),
            committer_time,
        })
    }

    fn head_branch(&self) -> Result<String> {
        let head = self
            .repo
            .head()
            .map_err(|e| VertagError::revision("HEAD", e.message()))?;

        if !head.is_branch() {
            return Err(VertagError::revision("HEAD", "HEAD is not on a branch"));
        }

        head.name()
            .map(|s| s.to_string())
            .ok_or_else(|| VertagError::revision("HEAD", "branch name is not valid UTF-8"))
    }

    fn head_commit(&self) -> Result<Oid> {
        let head = self
            .repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .map_err(|e| VertagError::revision("HEAD", e.message()))?;

        Ok(head.id())
    }

    #[instrument(skip(self))]
    fn diff_files(&self, from: Oid, to: Oid) -> Result<Vec<FileChange>> {
        let old_tree = self.repo.find_commit(from)?.tree()?;
        let new_tree = self.repo.find_commit(to)?.tree()?;

        let diff = self
            .repo
            .diff_tree_to_tree(Some(&old_tree), Some(&new_tree), None)?;

        let changes: Vec<FileChange> = diff
            .deltas()
            .filter_map(|delta| {
                let kind = change_kind(delta.status());
                let file = if kind == ChangeKind::Deleted {
                    delta.old_file()
                } else {
                    delta.new_file()
                };

                file.path()
                    .map(|p| FileChange::new(p.to_string_lossy().replace('\\', "/"), kind))
            })
            .collect();

        debug!(count = changes.len(), "computed file diff");
        Ok(changes)
    }

    #[instrument(skip(self, tagger, message))]
    fn create_annotated_tag(
        &self,
        name: &str,
        target: Oid,
        tagger: &TaggerIdentity,
        message: &str,
    ) -> Result<Oid> {
        let object = self
            .repo
            .find_object(target, None)
            .map_err(|e| VertagError::tag_creation(name, e.message()))?;

        let signature = git2::Signature::now(&tagger.name, &tagger.email)
            .map_err(|e| VertagError::tag_creation(name, e.message()))?;

        let oid = self
            .repo
            .tag(name, &object, &signature, message, false)
            .map_err(|e| VertagError::tag_creation(name, e.message()))?;

        info!(tag = name, target = %target, "created annotated tag");
        Ok(oid)
    }

    fn add_remote(&self, name: &str, url: &str) -> Result<()> {
        match self.repo.find_remote(name) {
            Ok(_) => {
                self.repo.remote_set_url(name, url)?;
                debug!(remote = name, "re-pointed existing remote");
            }
            Err(e) if e.code() == git2::ErrorCode::NotFound => {
                self.repo.remote(name, url)?;
                debug!(remote = name, "registered remote");
            }
            Err(e) => return Err(VertagError::remote(format!("Cannot find remote: {}", e))),
        }

        Ok(())
    }

    #[instrument(skip(self, refspecs))]
    fn push(&self, remote: Option<&str>, refspecs: &[&str]) -> Result<()> {
        let remote_name = remote.unwrap_or(DEFAULT_REMOTE);
        let mut remote = self
            .repo
            .find_remote(remote_name)
            .map_err(|_| VertagError::remote(format!("No remote named '{}' found", remote_name)))?;

        let refspecs = self.expand_refspecs(refspecs)?;
        if refspecs.is_empty() {
            debug!(remote = remote_name, "nothing to push");
            return Ok(());
        }
        let refspec_strs: Vec<&str> = refspecs.iter().map(|s| s.as_str()).collect();

        let mut push_options = git2::PushOptions::new();
        push_options.remote_callbacks(remote_callbacks());

        let start = std::time::Instant::now();
        remote
            .push(&refspec_strs, Some(&mut push_options))
            .map_err(|e| match e.class() {
                git2::ErrorClass::Net => {
                    VertagError::remote(format!("Network error during push: {}", e.message()))
                }
                git2::ErrorClass::Reference => {
                    VertagError::remote(format!("Reference error during push: {}", e.message()))
                }
                _ => VertagError::remote(format!("Push failed: {}", e.message())),
            })?;

        info!(
            remote = remote_name,
            refs = refspec_strs.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "pushed refs"
        );
        Ok(())
    }
}
