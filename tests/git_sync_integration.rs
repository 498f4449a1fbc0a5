//! Integration tests for local clone sync.
//!
//! These tests build a bare "remote", a release clone, and a second clone
//! that plays the part of the API commit, then check that sync lands the
//! release clone exactly on the remote tip.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

use release_commit::core::token::Token;
use release_commit::core::types::RepoInfo;
use release_commit::git::{Git, GitError, GitSync, LocalSync, SyncRequest, DEFAULT_SERVER_URL};

// =============================================================================
// Test Fixtures
// =============================================================================

fn run_git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn configure(dir: &Path) {
    run_git(dir, &["config", "user.email", "test@example.com"]);
    run_git(dir, &["config", "user.name", "Test User"]);
}

/// A bare remote with one commit on main, plus a clone of it.
struct Fixture {
    root: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let root = TempDir::new().expect("failed to create temp dir");
        let seed = root.path().join("seed");
        std::fs::create_dir(&seed).unwrap();

        run_git(&seed, &["init", "-b", "main"]);
        configure(&seed);
        std::fs::write(seed.join("CHANGELOG.md"), "# 0.1.0\n").unwrap();
        run_git(&seed, &["add", "."]);
        run_git(&seed, &["commit", "-m", "initial"]);

        run_git(root.path(), &["clone", "--bare", "seed", "origin.git"]);
        run_git(root.path(), &["clone", "origin.git", "work"]);
        configure(&root.path().join("work"));

        Self { root }
    }

    fn work(&self) -> std::path::PathBuf {
        self.root.path().join("work")
    }

    /// Push a commit to origin from a separate clone, the way the API would.
    fn remote_commit(&self, file: &str, content: &str) -> String {
        let other = self.root.path().join("other");
        if !other.exists() {
            run_git(self.root.path(), &["clone", "origin.git", "other"]);
            configure(&other);
        } else {
            run_git(&other, &["pull", "--ff-only"]);
        }
        std::fs::write(other.join(file), content).unwrap();
        run_git(&other, &["add", "."]);
        run_git(&other, &["commit", "-m", "chore(release): 1.0.0 [skip ci]"]);
        run_git(&other, &["push", "origin", "main"]);
        run_git(&other, &["rev-parse", "HEAD"])
    }

    fn request(&self) -> SyncRequest {
        SyncRequest {
            work_dir: self.work(),
            remote: "origin".into(),
            repo: RepoInfo::new("acme", "widgets", "main"),
            server_url: DEFAULT_SERVER_URL.into(),
            token: Token::new("ghs_sync_test"),
        }
    }
}

// =============================================================================
// Sync
// =============================================================================

#[test]
fn sync_lands_on_remote_tip() {
    let fx = Fixture::new();
    let pushed = fx.remote_commit("CHANGELOG.md", "# 1.0.0\n");

    let head = GitSync.fetch_and_reset(&fx.request()).unwrap();

    assert_eq!(head, pushed);
    assert_eq!(run_git(&fx.work(), &["rev-parse", "HEAD"]), pushed);
    assert_eq!(
        std::fs::read_to_string(fx.work().join("CHANGELOG.md")).unwrap(),
        "# 1.0.0\n"
    );
}

#[test]
fn sync_discards_local_edits() {
    let fx = Fixture::new();
    std::fs::write(fx.work().join("CHANGELOG.md"), "# 1.0.0 (local render)\n").unwrap();
    let pushed = fx.remote_commit("CHANGELOG.md", "# 1.0.0\n");

    GitSync.fetch_and_reset(&fx.request()).unwrap();

    assert_eq!(run_git(&fx.work(), &["status", "--porcelain"]), "");
    assert_eq!(Git::open(&fx.work()).unwrap().head_oid().unwrap(), pushed);
}

#[test]
fn sync_from_subdirectory() {
    let fx = Fixture::new();
    let sub = fx.work().join("packages");
    std::fs::create_dir(&sub).unwrap();
    let pushed = fx.remote_commit("VERSION", "1.0.0\n");

    let request = SyncRequest {
        work_dir: sub,
        ..fx.request()
    };
    assert_eq!(GitSync.fetch_and_reset(&request).unwrap(), pushed);
}

#[test]
fn local_remote_url_is_left_alone() {
    let fx = Fixture::new();
    fx.remote_commit("VERSION", "1.0.0\n");
    let git = Git::open(&fx.work()).unwrap();
    let before = git.remote_url("origin").unwrap();
    assert!(before.ends_with("origin.git"));

    GitSync.fetch_and_reset(&fx.request()).unwrap();

    let after = Git::open(&fx.work()).unwrap().remote_url("origin").unwrap();
    assert_eq!(after, before);
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn missing_remote_is_reported() {
    let fx = Fixture::new();
    let request = SyncRequest {
        remote: "upstream".into(),
        ..fx.request()
    };

    let err = GitSync.fetch_and_reset(&request).unwrap_err();
    assert_eq!(
        err,
        GitError::RemoteNotFound {
            name: "upstream".into()
        }
    );
}

#[test]
fn not_a_repository() {
    let dir = TempDir::new().unwrap();
    let request = SyncRequest {
        work_dir: dir.path().to_path_buf(),
        remote: "origin".into(),
        repo: RepoInfo::new("acme", "widgets", "main"),
        server_url: DEFAULT_SERVER_URL.into(),
        token: Token::new("t"),
    };

    let err = GitSync.fetch_and_reset(&request).unwrap_err();
    assert!(matches!(err, GitError::NotARepo { .. }));
}

#[test]
fn failed_fetch_restores_original_url() {
    let fx = Fixture::new();
    let git = Git::open(&fx.work()).unwrap();
    // Nothing listens on port 1; the fetch fails after the URL was rewritten.
    let original = "https://127.0.0.1:1/acme/widgets.git";
    git.set_remote_url("origin", original).unwrap();

    let err = GitSync.fetch_and_reset(&fx.request()).unwrap_err();

    assert!(matches!(err, GitError::FetchFailed { .. }));
    assert!(!err.to_string().contains("ghs_sync_test"));
    let restored = Git::open(&fx.work()).unwrap().remote_url("origin").unwrap();
    assert_eq!(restored, original);
}

#[test]
fn missing_branch_on_remote() {
    let fx = Fixture::new();
    let request = SyncRequest {
        repo: RepoInfo::new("acme", "widgets", "release"),
        ..fx.request()
    };

    // Either the fetch rejects the refspec or the tracking ref never appears.
    let err = GitSync.fetch_and_reset(&request).unwrap_err();
    assert!(matches!(
        err,
        GitError::FetchFailed { .. } | GitError::RefNotFound { .. }
    ));
}
