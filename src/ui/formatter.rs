//! Pure formatting functions for UI output.
//!
//! Progress lines for the user go to stdout, errors and warnings to stderr.
//! Styling comes from `console`, which drops colors when not on a terminal.

use crate::boundary::BoundaryWarning;
use crate::planner::NextTagPlan;
use crate::resolver::ComparisonPoint;
use console::style;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// "VerTag" in the FIGlet standard font
const BANNER: [&str; 6] = [
    "__     __             _____",
    "\\ \\   / /  ___  _ __ |_   _|  __ _   __ _",
    " \\ \\ / /  / _ \\| '__|  | |   / _` | / _` |",
    "  \\ V /  |  __/| |     | |  | (_| || (_| |",
    "   \\_/    \\___||_|     |_|   \\__,_| \\__, |",
    "                                    |___/",
];

/// Print the run header.
pub fn display_banner() {
    for line in BANNER {
        println!("{}", style(line).bold().cyan());
    }
}

/// Display which branch is compared against which commit.
///
/// # Arguments
/// * `branch` - Full ref name of the current branch
/// * `point` - The resolved comparison point
pub fn display_comparison(branch: &str, point: &ComparisonPoint) {
    println!("{}", style("Comparing").bold());
    println!("  Current branch: {}", branch);
    println!("to");
    match point.tag() {
        Some(tag) => println!("  {} ({})", point.commit(), tag),
        None => println!("  {} (root commit)", point.commit()),
    }
    println!();
}

/// Display the modules that changed since the comparison point.
pub fn display_changed_modules(modules: &[String]) {
    println!("{}", style("Modules changed").bold());
    if modules.is_empty() {
        println!("  (none)");
    }
    for module in modules {
        println!("  {}", module);
    }
    println!();
}

/// Display the planned tags, with the previous tag of each module if any.
pub fn display_planned_tags(plan: &NextTagPlan) {
    if plan.is_empty() {
        return;
    }

    println!("{}", style("Next tags").bold());
    for entry in plan.entries() {
        match &entry.previous {
            Some(previous) => println!(
                "  {} -> {}",
                style(previous).red(),
                style(&entry.tag).green()
            ),
            None => println!("  {}", style(&entry.tag).green()),
        }
    }
    println!();
}

/// Report a tag a dry run would have created.
pub fn display_dry_run_tag(tag: &str) {
    println!("{} Would have created tag: {}", style("[Dry run]").dim(), tag);
}

/// Report a tag that was created and pushed.
pub fn display_created_tag(tag: &str) {
    display_success(&format!("Created tag: {}", tag));
}

/// Display a boundary warning to the user.
///
/// Shows a yellow warning icon followed by the warning message.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}
