use crate::domain::branch::DEFAULT_STABLE_BRANCHES;
use crate::error::{Result, VertagError};
use crate::git::TaggerIdentity;
use crate::version_file::DEFAULT_VERSION_FILE;
use crate::writer::DEFAULT_REMOTE_NAME;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// File name looked up at the repository root
pub const CONFIG_FILE_NAME: &str = "vertag.toml";

/// Represents the complete configuration for vertag.
///
/// Every field is optional in the file; command-line flags override it.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_modules_dir")]
    pub modules_dir: String,

    #[serde(default = "default_version_file")]
    pub version_file: String,

    #[serde(default = "default_stable_branches")]
    pub stable_branches: Vec<String>,

    #[serde(default)]
    pub tagger: TaggerConfig,

    #[serde(default)]
    pub remote: RemoteConfig,
}

fn default_modules_dir() -> String {
    "modules".to_string()
}

fn default_version_file() -> String {
    DEFAULT_VERSION_FILE.to_string()
}

/// Returns the default list of branches that produce stable tags.
fn default_stable_branches() -> Vec<String> {
    DEFAULT_STABLE_BRANCHES.iter().map(|b| b.to_string()).collect()
}

fn default_remote_name() -> String {
    DEFAULT_REMOTE_NAME.to_string()
}

/// Identity written on annotated tags
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct TaggerConfig {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Remote registered before pushing, when a URL is given
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RemoteConfig {
    #[serde(default = "default_remote_name")]
    pub name: String,
    pub url: Option<String>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig {
            name: default_remote_name(),
            url: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            modules_dir: default_modules_dir(),
            version_file: default_version_file(),
            stable_branches: default_stable_branches(),
            tagger: TaggerConfig::default(),
            remote: RemoteConfig::default(),
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `vertag.toml` at the repository root
/// 3. `vertag/config.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If a file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&Path>, repo_root: &Path) -> Result<Config> {
    let path = if let Some(path) = config_path {
        Some(path.to_path_buf())
    } else if repo_root.join(CONFIG_FILE_NAME).exists() {
        Some(repo_root.join(CONFIG_FILE_NAME))
    } else {
        dirs::config_dir()
            .map(|dir| dir.join("vertag").join("config.toml"))
            .filter(|p| p.exists())
    };

    let Some(path) = path else {
        debug!("no configuration file found, using defaults");
        return Ok(Config::default());
    };

    let contents = fs::read_to_string(&path).map_err(|e| {
        VertagError::config(format!("cannot read {}: {}", path.display(), e))
    })?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| VertagError::config(format!("cannot parse {}: {}", path.display(), e)))?;

    debug!(path = %path.display(), "loaded configuration");
    Ok(config)
}

/// Explicit settings for one run of the engine.
///
/// Built once from the file configuration and command-line flags, then
/// handed to the engine; nothing is read from process-wide state later.
#[derive(Debug, Clone, PartialEq)]
pub struct VertagOptions {
    pub repo_root: PathBuf,
    /// Modules root relative to `repo_root`
    pub modules_dir: String,
    pub version_file: String,
    pub stable_branches: Vec<String>,
    pub tagger: Option<TaggerIdentity>,
    pub remote_name: String,
    pub remote_url: Option<String>,
    pub dry_run: bool,
    pub branch_diff: bool,
}

impl VertagOptions {
    /// Options with defaults for everything but the repository root
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        Self::from_config(repo_root, &Config::default())
    }

    pub fn from_config(repo_root: impl Into<PathBuf>, config: &Config) -> Self {
        let tagger = match (&config.tagger.name, &config.tagger.email) {
            (Some(name), Some(email)) => Some(TaggerIdentity::new(name, email)),
            _ => None,
        };

        VertagOptions {
            repo_root: repo_root.into(),
            modules_dir: config.modules_dir.clone(),
            version_file: config.version_file.clone(),
            stable_branches: config.stable_branches.clone(),
            tagger,
            remote_name: config.remote.name.clone(),
            remote_url: config.remote.url.clone(),
            dry_run: false,
            branch_diff: false,
        }
    }

    /// Absolute filesystem path of the modules root
    pub fn modules_full_path(&self) -> PathBuf {
        self.repo_root.join(&self.modules_dir)
    }

    /// Check the options are complete enough for the requested run
    pub fn validate(&self) -> Result<()> {
        if self.modules_dir.trim().is_empty() {
            return Err(VertagError::config("modules directory must not be empty"));
        }
        let modules_dir = Path::new(&self.modules_dir);
        if modules_dir.has_root()
            || modules_dir
                .components()
                .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
        {
            return Err(VertagError::config(format!(
                "modules directory '{}' must be relative to the repository root and stay inside it",
                self.modules_dir
            )));
        }
        if self.version_file.trim().is_empty() {
            return Err(VertagError::config("version file name must not be empty"));
        }
        if !self.dry_run {
            match &self.tagger {
                Some(t) if !t.name.trim().is_empty() && !t.email.trim().is_empty() => {}
                _ => {
                    return Err(VertagError::config(
                        "tagger name and email are required to create tags",
                    ))
                }
            }
        }
        Ok(())
    }
}
