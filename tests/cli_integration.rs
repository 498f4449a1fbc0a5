//! Integration tests for the release-commit binary.
//!
//! These tests exercise the CLI end to end. None of them reach the network:
//! they either fail verification or stop at dry-run / no-files.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Environment variables the binary reads; cleared so CI settings don't leak in.
const AMBIENT_VARS: &[&str] = &[
    "GH_TOKEN",
    "GITHUB_TOKEN",
    "GITHUB_REF",
    "GIT_BRANCH",
    "BRANCH_NAME",
    "RELEASE_COMMIT_CONFIG",
    "GITHUB_API_URL",
    "RUST_LOG",
];

/// Get a command for running release-commit in `dir` with a clean environment.
fn release_commit(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("release-commit").unwrap();
    for var in AMBIENT_VARS {
        cmd.env_remove(var);
    }
    cmd.arg("--cwd").arg(dir);
    cmd
}

fn write(dir: &Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

const CONFIG: &str = r#"
repository_url = "https://github.com/acme/widgets.git"
branches = ["main"]

[plugin]
files = ["CHANGELOG.md", "dist/**"]
"#;

// =============================================================================
// Basics
// =============================================================================

#[test]
fn help_lists_commands() {
    Command::cargo_bin("release-commit")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("verify"))
        .stdout(predicate::str::contains("prepare"))
        .stdout(predicate::str::contains("completion"));
}

#[test]
fn version_flag_works() {
    Command::cargo_bin("release-commit")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("release-commit"));
}

#[test]
fn completion_generates_script() {
    Command::cargo_bin("release-commit")
        .unwrap()
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("release-commit"));
}

// =============================================================================
// verify
// =============================================================================

mod verify {
    use super::*;

    #[test]
    fn missing_token() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), ".release-commit.toml", CONFIG);

        release_commit(dir.path())
            .arg("verify")
            .assert()
            .failure()
            .stderr(predicate::str::contains("EGHNOAUTH"));
    }

    #[test]
    fn missing_files_option() {
        let dir = TempDir::new().unwrap();

        release_commit(dir.path())
            .env("GITHUB_TOKEN", "ghs_cli")
            .args(["verify", "--repository-url", "acme/widgets", "--branch", "main"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("EINVALIDCONFIG"));
    }

    #[test]
    fn missing_repository() {
        let dir = TempDir::new().unwrap();

        release_commit(dir.path())
            .env("GITHUB_TOKEN", "ghs_cli")
            .args(["verify", "--file", "CHANGELOG.md"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("ENOREPO"));
    }

    #[test]
    fn succeeds_from_config_file() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), ".release-commit.toml", CONFIG);

        release_commit(dir.path())
            .env("GH_TOKEN", "ghs_cli")
            .arg("verify")
            .assert()
            .success()
            .stdout(predicate::str::contains("acme/widgets:main"))
            .stdout(predicate::str::contains("2 pattern(s)"));
    }

    #[test]
    fn flags_override_config() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), ".release-commit.toml", CONFIG);

        release_commit(dir.path())
            .env("GH_TOKEN", "ghs_cli")
            .args(["verify", "--repository-url", "git@github.com:other/repo.git", "--branch", "next"])
            .assert()
            .success()
            .stdout(predicate::str::contains("other/repo:next"));
    }

    #[test]
    fn ci_branch_wins_over_config() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), ".release-commit.toml", CONFIG);

        release_commit(dir.path())
            .env("GH_TOKEN", "ghs_cli")
            .env("GITHUB_REF", "refs/heads/beta")
            .arg("verify")
            .assert()
            .success()
            .stdout(predicate::str::contains("acme/widgets:beta"));
    }

    #[test]
    fn token_not_printed() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), ".release-commit.toml", CONFIG);

        release_commit(dir.path())
            .env("GH_TOKEN", "ghs_supersecretvalue")
            .args(["--debug", "verify"])
            .assert()
            .success()
            .stdout(predicate::str::contains("ghs_supersecretvalue").not())
            .stderr(predicate::str::contains("ghs_supersecretvalue").not());
    }

    #[test]
    fn malformed_config_file() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), ".release-commit.toml", "this is = = not toml");

        release_commit(dir.path())
            .env("GH_TOKEN", "ghs_cli")
            .arg("verify")
            .assert()
            .failure()
            .stderr(predicate::str::contains("EINVALIDCONFIG"));
    }

    #[test]
    fn mistyped_option_is_invalid_config() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            ".release-commit.toml",
            &format!("{}dry_run = \"yes\"\n", CONFIG),
        );

        release_commit(dir.path())
            .env("GH_TOKEN", "ghs_cli")
            .arg("verify")
            .assert()
            .failure()
            .stderr(predicate::str::contains("EINVALIDCONFIG: Invalid configuration"))
            .stderr(predicate::str::contains("dry_run"));
    }

    #[test]
    fn explicit_config_must_exist() {
        let dir = TempDir::new().unwrap();

        release_commit(dir.path())
            .env("GH_TOKEN", "ghs_cli")
            .args(["--config", "missing.toml", "verify"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("EINVALIDCONFIG"))
            .stderr(predicate::str::contains("missing.toml"));
    }
}

// =============================================================================
// prepare
// =============================================================================

mod prepare {
    use super::*;

    #[test]
    fn dry_run_lists_files() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), ".release-commit.toml", CONFIG);
        write(dir.path(), "CHANGELOG.md", "# 1.0.0\n");
        write(dir.path(), "dist/app.js", "console.log(1)\n");

        release_commit(dir.path())
            .env("GH_TOKEN", "ghs_cli")
            .args(["prepare", "--dry-run", "--next-version", "1.0.0"])
            .assert()
            .success()
            .stdout(predicate::str::contains("would commit 2 file(s)"))
            .stdout(predicate::str::contains("CHANGELOG.md"))
            .stdout(predicate::str::contains("dist/app.js"));
    }

    #[test]
    fn dry_run_json() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), ".release-commit.toml", CONFIG);
        write(dir.path(), "CHANGELOG.md", "# 1.0.0\n");

        let output = release_commit(dir.path())
            .env("GH_TOKEN", "ghs_cli")
            .args(["prepare", "--dry-run", "--json"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(value["status"], "dry_run");
        assert_eq!(value["files"], serde_json::json!(["CHANGELOG.md"]));
    }

    #[test]
    fn no_matching_files_is_success() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), ".release-commit.toml", CONFIG);

        release_commit(dir.path())
            .env("GH_TOKEN", "ghs_cli")
            .arg("prepare")
            .assert()
            .success()
            .stdout(predicate::str::contains("nothing to commit"));
    }

    #[test]
    fn empty_pattern_list_is_no_op() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            ".release-commit.toml",
            "repository_url = \"acme/widgets\"\nbranches = [\"main\"]\n[plugin]\nfiles = []\n",
        );

        release_commit(dir.path())
            .env("GH_TOKEN", "ghs_cli")
            .arg("prepare")
            .assert()
            .success();
    }

    #[test]
    fn missing_token_fails() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), ".release-commit.toml", CONFIG);
        write(dir.path(), "CHANGELOG.md", "x");

        release_commit(dir.path())
            .args(["prepare", "--dry-run"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("EGHNOAUTH"));
    }
}
