//! User interface module - terminal output for a tagging run.
//!
//! All formatting lives in `formatter`; this module re-exports it so callers
//! can write `ui::display_status(..)`.

pub mod formatter;

pub use formatter::{
    display_banner, display_boundary_warning, display_changed_modules, display_comparison,
    display_created_tag, display_dry_run_tag, display_error, display_planned_tags,
    display_status, display_success,
};
