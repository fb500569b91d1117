//! Domain logic - pure tag and version rules independent of git operations

pub mod branch;
pub mod tag;
pub mod version;

pub use branch::BranchContext;
pub use tag::ParsedTagName;
pub use version::{compare_versions, DeclaredVersion};
