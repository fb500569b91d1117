use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use vertag::config::{self, VertagOptions};
use vertag::git::TaggerIdentity;
use vertag::{ui, Vertag};

#[derive(Parser)]
#[command(
    name = "vertag",
    about = "Create and push semantic version tags for changed modules in a monorepo"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute the next tag of every changed module and push it
    Apply(ApplyArgs),
    /// Print version information
    Version(VersionArgs),
}

#[derive(Args)]
struct ApplyArgs {
    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<PathBuf>,

    #[arg(long, default_value = ".", help = "Path to the repository root")]
    repo_root: PathBuf,

    #[arg(long, help = "Modules directory, relative to the repository root")]
    modules_dir: Option<String>,

    #[arg(long, help = "Name of the per-module version file")]
    version_file: Option<String>,

    #[arg(long, help = "Name recorded as the tagger of created tags")]
    tagger_name: Option<String>,

    #[arg(long, help = "Email recorded as the tagger of created tags")]
    tagger_email: Option<String>,

    #[arg(long, help = "URL of a remote to register and push tags to")]
    remote_url: Option<String>,

    #[arg(long, help = "Name under which --remote-url is registered")]
    remote_name: Option<String>,

    #[arg(long, help = "Preview the tags without creating or pushing them")]
    dry_run: bool,

    #[arg(
        long,
        help = "Compare against the latest unstable tag on the current branch"
    )]
    branch_diff: bool,

    #[arg(short, long, help = "Enable debug logging")]
    verbose: bool,
}

#[derive(Args)]
struct VersionArgs {
    #[arg(short, long, help = "Print only the version number")]
    short: bool,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    output: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Serialize)]
struct VersionInfo {
    version: &'static str,
    commit: &'static str,
    date: &'static str,
}

impl VersionInfo {
    fn current() -> Self {
        VersionInfo {
            version: env!("CARGO_PKG_VERSION"),
            commit: option_env!("VERTAG_COMMIT").unwrap_or("none"),
            date: option_env!("VERTAG_BUILD_DATE").unwrap_or("unknown"),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Version(args) => print_version(&args),
        Command::Apply(args) => {
            init_tracing(args.verbose);
            if let Err(e) = apply(&args) {
                ui::display_error(&e.to_string());
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn apply(args: &ApplyArgs) -> vertag::Result<()> {
    let options = build_options(args)?;

    ui::display_banner();
    let engine = Vertag::open(options)?;
    let summary = engine.run()?;

    if summary.report.dry_run {
        ui::display_status(&format!(
            "Dry run complete, {} tag(s) planned",
            summary.report.created.len()
        ));
    } else if !summary.report.created.is_empty() {
        ui::display_success(&format!(
            "Pushed {} tag(s)",
            summary.report.created.len()
        ));
    }
    Ok(())
}

/// Merge the configuration file with command-line flags; flags win
fn build_options(args: &ApplyArgs) -> vertag::Result<VertagOptions> {
    let config = config::load_config(args.config.as_deref(), &args.repo_root)?;
    let mut options = VertagOptions::from_config(&args.repo_root, &config);

    if let Some(dir) = &args.modules_dir {
        options.modules_dir = dir.clone();
    }
    if let Some(file) = &args.version_file {
        options.version_file = file.clone();
    }
    if let Some(name) = &args.remote_name {
        options.remote_name = name.clone();
    }
    if args.remote_url.is_some() {
        options.remote_url = args.remote_url.clone();
    }

    let name = args.tagger_name.clone().or(config.tagger.name);
    let email = args.tagger_email.clone().or(config.tagger.email);
    options.tagger = match (name, email) {
        (Some(name), Some(email)) => Some(TaggerIdentity::new(name, email)),
        _ => None,
    };

    options.dry_run = args.dry_run;
    options.branch_diff = args.branch_diff;
    Ok(options)
}

fn print_version(args: &VersionArgs) -> Result<()> {
    let info = VersionInfo::current();

    if args.short {
        println!("{}", info.version);
        return Ok(());
    }

    match args.output {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&info)
                .context("Failed to serialize version information")?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            println!("vertag {}", info.version);
            println!("commit: {}", info.commit);
            println!("built: {}", info.date);
        }
    }
    Ok(())
}
