pub mod boundary;
pub mod config;
pub mod detector;
pub mod domain;
pub mod engine;
pub mod error;
pub mod git;
pub mod planner;
pub mod resolver;
pub mod ui;
pub mod version_file;
pub mod writer;

pub use engine::{RunPlan, RunSummary, Vertag};
pub use error::{Result, VertagError};
