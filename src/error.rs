use thiserror::Error;

/// Unified error type for vertag operations
#[derive(Error, Debug)]
pub enum VertagError {
    #[error("Cannot open repository at '{path}': {reason}")]
    RepositoryOpen { path: String, reason: String },

    #[error("Cannot resolve revision '{revision}': {reason}")]
    RevisionResolution { revision: String, reason: String },

    #[error("Malformed tag name '{name}': {reason}")]
    MalformedTagName { name: String, reason: String },

    #[error("Cannot read version file for module '{module}': {reason}")]
    VersionFile { module: String, reason: String },

    #[error("Failed to create tag '{tag}': {reason}")]
    TagCreation { tag: String, reason: String },

    #[error("Failed to push tag '{tag}': {reason}")]
    Push { tag: String, reason: String },

    #[error("Remote operation failed: {0}")]
    Remote(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in vertag
pub type Result<T> = std::result::Result<T, VertagError>;

impl VertagError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        VertagError::Config(msg.into())
    }

    /// Create a remote error with context
    pub fn remote(msg: impl Into<String>) -> Self {
        VertagError::Remote(msg.into())
    }

    pub fn revision(revision: impl Into<String>, reason: impl ToString) -> Self {
        VertagError::RevisionResolution {
            revision: revision.into(),
            reason: reason.to_string(),
        }
    }

    pub fn malformed_tag(name: impl Into<String>, reason: impl Into<String>) -> Self {
        VertagError::MalformedTagName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn version_file(module: impl Into<String>, reason: impl ToString) -> Self {
        VertagError::VersionFile {
            module: module.into(),
            reason: reason.to_string(),
        }
    }

    pub fn tag_creation(tag: impl Into<String>, reason: impl ToString) -> Self {
        VertagError::TagCreation {
            tag: tag.into(),
            reason: reason.to_string(),
        }
    }

    pub fn push(tag: impl Into<String>, reason: impl ToString) -> Self {
        VertagError::Push {
            tag: tag.into(),
            reason: reason.to_string(),
        }
    }
}
