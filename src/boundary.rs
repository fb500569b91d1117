use std::fmt;

/// Non-fatal issues met while planning tags.
/// These are reported to the user and the run carries on.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// The module's version file is missing, unreadable or not `MAJOR.MINOR`
    VersionFileUnreadable { module: String, reason: String },
    /// Looking up the module's most recent tag failed
    TagLookupFailed { module: String, reason: String },
    /// HEAD is not on a branch, so tags are planned as unstable
    DetachedHead { reason: String },
    /// No module changed since the comparison point
    NoModulesChanged { comparison: String },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::VersionFileUnreadable { module, reason } => {
                write!(
                    f,
                    "Cannot read version of module '{}': {} (planning as 0.0 with no prior tag; \
                     the same tag is planned again until the file is fixed, and creating it twice fails)",
                    module, reason
                )
            }
            BoundaryWarning::TagLookupFailed { module, reason } => {
                write!(
                    f,
                    "Cannot look up latest tag of module '{}': {} (assuming no prior tag)",
                    module, reason
                )
            }
            BoundaryWarning::DetachedHead { reason } => {
                write!(f, "Cannot determine current branch: {} (tags will be unstable)", reason)
            }
            BoundaryWarning::NoModulesChanged { comparison } => {
                let short = if comparison.len() > 7 {
                    &comparison[..7]
                } else {
                    comparison.as_str()
                };
                write!(f, "No modules changed since {}", short)
            }
        }
    }
}
