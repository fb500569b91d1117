// tests/cli_test.rs
use git2::{IndexAddOption, Repository, RepositoryInitOptions, Signature, Time};
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn vertag(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_vertag"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute vertag")
}

fn commit_all(repo: &Repository, time: i64) {
    let mut index = repo.index().unwrap();
    index
        .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
        .unwrap();
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let sig = Signature::new("Test", "test@example.com", &Time::new(time, 0)).unwrap();
    let parents = match repo.head() {
        Ok(head) => vec![head.peel_to_commit().unwrap()],
        Err(_) => vec![],
    };
    let parent_refs: Vec<&git2::Commit> = parents.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, "change", &tree, &parent_refs)
        .unwrap();
}

/// Repository on `main` where only module `alpha` changed after the root commit
fn fixture_repo() -> TempDir {
    let dir = TempDir::new().unwrap();
    let mut opts = RepositoryInitOptions::new();
    opts.initial_head("main");
    let repo = Repository::init_opts(dir.path(), &opts).unwrap();

    let write = |path: &str, content: &str| {
        let full = dir.path().join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    };
    write("modules/alpha/VERSION", "2.0\n");
    write("modules/alpha/main.tf", "a0\n");
    write("modules/beta/VERSION", "1.0\n");
    write("modules/beta/main.tf", "b0\n");
    commit_all(&repo, 1_000);

    write("modules/alpha/main.tf", "a1\n");
    commit_all(&repo, 2_000);

    // Keeps any user-level configuration out of the run
    write("vertag.toml", "");
    dir
}

fn path_arg(path: &Path) -> String {
    path.display().to_string()
}

#[test]
fn test_vertag_help() {
    let output = vertag(&["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("vertag"));
    assert!(stdout.contains("apply"));
    assert!(stdout.contains("version"));
}

#[test]
fn test_version_short() {
    let output = vertag(&["version", "--short"]);

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.trim(), env!("CARGO_PKG_VERSION"));
}

#[test]
fn test_version_short_flag_alias() {
    let output = vertag(&["version", "-s"]);

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.trim(), env!("CARGO_PKG_VERSION"));
}

#[test]
fn test_version_json() {
    let output = vertag(&["version"]);

    assert!(output.status.success());
    let info: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(info["version"], env!("CARGO_PKG_VERSION"));
    assert!(info["commit"].is_string());
    assert!(info["date"].is_string());
}

#[test]
fn test_version_text() {
    let output = vertag(&["version", "--output", "text"]);

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with(&format!("vertag {}", env!("CARGO_PKG_VERSION"))));
    assert!(stdout.contains("commit:"));
}

#[test]
fn test_apply_dry_run_prints_planned_tag() {
    let repo = fixture_repo();
    let output = vertag(&["apply", "--repo-root", &path_arg(repo.path()), "--dry-run"]);

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Would have created tag: alpha/2.0.0"));
    assert!(!stdout.contains("beta/1.0.0"));

    let raw = Repository::open(repo.path()).unwrap();
    assert_eq!(raw.tag_names(None).unwrap().len(), 0);
}

#[test]
fn test_apply_without_tagger_fails() {
    let repo = fixture_repo();
    let output = vertag(&["apply", "--repo-root", &path_arg(repo.path())]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("tagger"));
}

#[test]
fn test_apply_outside_repository_fails() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("vertag.toml"), "").unwrap();
    let output = vertag(&["apply", "--repo-root", &path_arg(dir.path()), "--dry-run"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Cannot open repository"));
}

#[test]
fn test_apply_pushes_to_remote_url() {
    let repo = fixture_repo();
    let remote_dir = TempDir::new().unwrap();
    let remote = Repository::init_bare(remote_dir.path()).unwrap();

    let output = vertag(&[
        "apply",
        "--repo-root",
        &path_arg(repo.path()),
        "--tagger-name",
        "Release Bot",
        "--tagger-email",
        "release@example.com",
        "--remote-url",
        &path_arg(remote_dir.path()),
    ]);

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(remote.find_reference("refs/tags/alpha/2.0.0").is_ok());
    assert!(remote.find_reference("refs/tags/beta/1.0.0").is_err());
}
