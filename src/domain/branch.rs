use crate::domain::tag::UNSTABLE_SUFFIX;

/// Prefix of local branch references
pub const BRANCH_REF_PREFIX: &str = "refs/heads/";

/// Branches whose tags are published without the unstable suffix
pub const DEFAULT_STABLE_BRANCHES: [&str; 2] = ["main", "master"];

/// Represents the branch HEAD is on, with its tagging stability
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchContext {
    /// Full reference name, e.g. `refs/heads/main`
    pub ref_name: String,
    pub is_stable: bool,
}

impl BranchContext {
    /// Classify a full branch ref against the configured stable branch names.
    ///
    /// The match is exact on the full ref: `refs/heads/main` is stable,
    /// `refs/heads/main-fix` and `refs/remotes/origin/main` are not.
    pub fn new<S: AsRef<str>>(ref_name: impl Into<String>, stable_branches: &[S]) -> Self {
        let ref_name = ref_name.into();
        let is_stable = stable_branches
            .iter()
            .any(|b| ref_name == format!("{}{}", BRANCH_REF_PREFIX, b.as_ref()));

        BranchContext { ref_name, is_stable }
    }

    /// Context used when HEAD is not on a branch
    pub fn detached() -> Self {
        BranchContext {
            ref_name: "HEAD".to_string(),
            is_stable: false,
        }
    }

    /// Suffix appended to tags created from this branch
    pub fn tag_suffix(&self) -> &'static str {
        if self.is_stable {
            ""
        } else {
            UNSTABLE_SUFFIX
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_branch() {
        let branch = BranchContext::new("refs/heads/main", &DEFAULT_STABLE_BRANCHES);
        assert!(branch.is_stable);
        assert_eq!(branch.tag_suffix(), "");
    }

    #[test]
    fn test_master_branch() {
        let branch = BranchContext::new("refs/heads/master", &DEFAULT_STABLE_BRANCHES);
        assert!(branch.is_stable);
    }

    #[test]
    fn test_feature_branch() {
        let branch = BranchContext::new("refs/heads/feature/vnet", &DEFAULT_STABLE_BRANCHES);
        assert!(!branch.is_stable);
        assert_eq!(branch.tag_suffix(), "-unstable");
    }

    #[test]
    fn test_short_name_is_not_a_full_ref() {
        let branch = BranchContext::new("main", &DEFAULT_STABLE_BRANCHES);
        assert!(!branch.is_stable);
    }

    #[test]
    fn test_custom_stable_branches() {
        let stable = vec!["release".to_string()];
        assert!(BranchContext::new("refs/heads/release", &stable).is_stable);
        assert!(!BranchContext::new("refs/heads/main", &stable).is_stable);
    }

    #[test]
    fn test_detached_is_unstable() {
        assert_eq!(BranchContext::detached().tag_suffix(), "-unstable");
    }
}
