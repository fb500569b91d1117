use serial_test::serial;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::{NamedTempFile, TempDir};
use vertag::config::{load_config, Config, VertagOptions, CONFIG_FILE_NAME};
use vertag::VertagError;

#[test]
fn test_load_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    let toml_content = r#"
modules_dir = "infra/modules"
version_file = "MODULE_VERSION"
stable_branches = ["main", "release"]

[tagger]
name = "Release Bot"
email = "release@example.com"

[remote]
name = "publish"
url = "https://example.com/infra.git"
"#;
    temp_file.write_all(toml_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let root = TempDir::new().unwrap();
    let config = load_config(Some(temp_file.path()), root.path()).unwrap();

    assert_eq!(config.modules_dir, "infra/modules");
    assert_eq!(config.version_file, "MODULE_VERSION");
    assert_eq!(config.stable_branches, vec!["main", "release"]);
    assert_eq!(config.tagger.name.as_deref(), Some("Release Bot"));
    assert_eq!(config.remote.name, "publish");
    assert_eq!(
        config.remote.url.as_deref(),
        Some("https://example.com/infra.git")
    );

    let options = VertagOptions::from_config(root.path(), &config);
    assert_eq!(
        options.modules_full_path(),
        root.path().join("infra/modules")
    );
    assert!(options.validate().is_ok());
}

#[test]
fn test_empty_file_uses_defaults() {
    let temp_file = NamedTempFile::new().unwrap();
    let root = TempDir::new().unwrap();

    let config = load_config(Some(temp_file.path()), root.path()).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_repo_root_file_is_found() {
    let root = TempDir::new().unwrap();
    fs::write(
        root.path().join(CONFIG_FILE_NAME),
        "modules_dir = \"terraform\"\n",
    )
    .unwrap();

    let config = load_config(None, root.path()).unwrap();
    assert_eq!(config.modules_dir, "terraform");
}

#[test]
fn test_explicit_path_wins_over_repo_root() {
    let root = TempDir::new().unwrap();
    fs::write(
        root.path().join(CONFIG_FILE_NAME),
        "modules_dir = \"terraform\"\n",
    )
    .unwrap();

    let mut explicit = NamedTempFile::new().unwrap();
    explicit.write_all(b"modules_dir = \"stacks\"\n").unwrap();
    explicit.flush().unwrap();

    let config = load_config(Some(explicit.path()), root.path()).unwrap();
    assert_eq!(config.modules_dir, "stacks");
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let root = TempDir::new().unwrap();
    let result = load_config(Some(Path::new("/nonexistent/vertag.toml")), root.path());
    assert!(matches!(result, Err(VertagError::Config(_))));
}

#[test]
fn test_invalid_toml_is_an_error() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"modules_dir = [unclosed").unwrap();
    temp_file.flush().unwrap();

    let root = TempDir::new().unwrap();
    let result = load_config(Some(temp_file.path()), root.path());
    match result {
        Err(VertagError::Config(msg)) => assert!(msg.contains("cannot parse")),
        other => panic!("expected a configuration error, got {:?}", other),
    }
}

#[cfg(target_os = "linux")]
#[test]
#[serial]
fn test_user_config_dir_is_used_as_fallback() {
    let config_home = TempDir::new().unwrap();
    let dir = config_home.path().join("vertag");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("config.toml"), "version_file = \"RELEASE\"\n").unwrap();

    let previous = std::env::var_os("XDG_CONFIG_HOME");
    std::env::set_var("XDG_CONFIG_HOME", config_home.path());

    let root = TempDir::new().unwrap();
    let result = load_config(None, root.path());

    match previous {
        Some(value) => std::env::set_var("XDG_CONFIG_HOME", value),
        None => std::env::remove_var("XDG_CONFIG_HOME"),
    }

    assert_eq!(result.unwrap().version_file, "RELEASE");
}
