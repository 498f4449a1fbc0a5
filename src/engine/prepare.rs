//! engine::prepare
//!
//! Build one release commit on the remote branch.
//!
//! # Sequence
//!
//! | Phase                 | Work                                                  |
//! |-----------------------|-------------------------------------------------------|
//! | `ResolvingTargets`    | token, repository, file patterns, blobs read from disk |
//! | `ReadingBase`         | branch tip, then its commit for the base tree         |
//! | `UploadingBlobs`      | one blob per file, concurrently, all-or-nothing       |
//! | `BuildingTree`        | overlay the blobs onto the base tree                  |
//! | `CheckingIdempotency` | new tree == base tree means nothing to commit         |
//! | `BuildingCommit`      | message, identities, commit with the tip as parent    |
//! | `UpdatingRef`         | fast-forward the branch                               |
//! | `SyncingLocal`        | fetch and hard-reset the local clone                  |
//!
//! No matching files and dry-run both finish right after `ResolvingTargets`
//! without touching the remote.
//!
//! # Failure
//!
//! Remote objects created before a failure are left in place; they are
//! unreferenced. A sync failure after the ref moved is `ELOCALSYNC`, with
//! the new commit sha in the details.

use futures::future::try_join_all;
use serde::Serialize;
use tracing::{info, warn};

use super::phase::{Phase, PhaseTracker};
use super::Context;
use crate::core::config::PluginConfig;
use crate::core::identity::{resolve_identity, IdentityRole};
use crate::core::message::render_commit_message;
use crate::core::repo::resolve_repo_info;
use crate::core::token::resolve_token;
use crate::core::types::{FileBlob, RemoteBlob, RepoInfo};
use crate::error::{ErrorCode, PluginError};
use crate::files::{read_files_as_blobs, resolve_files};
use crate::forge::{CreateCommitRequest, Forge, ForgeConnector, ForgeError, GitHubConnector, TreeEntry};
use crate::git::{server_url_from_env, GitSync, LocalSync, SyncRequest};

/// How a prepare run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PrepareOutcome {
    /// No file matched the patterns.
    NoFiles,
    /// Dry run: these files would have been committed.
    DryRun { files: Vec<String> },
    /// Content already matches the branch; nothing was committed.
    Unchanged { tree_sha: String },
    /// A commit was created, the branch moved, and the local clone synced.
    Committed {
        commit_sha: String,
        tree_sha: String,
        files: Vec<String>,
    },
}

impl PrepareOutcome {
    /// The new commit, if one was created.
    pub fn commit_sha(&self) -> Option<&str> {
        match self {
            PrepareOutcome::Committed { commit_sha, .. } => Some(commit_sha),
            _ => None,
        }
    }
}

/// Run the pipeline against GitHub and the local clone.
///
/// The API base comes from `GITHUB_API_URL` when set.
pub async fn prepare(config: &PluginConfig, ctx: &mut Context) -> Result<PrepareOutcome, PluginError> {
    let connector = GitHubConnector::from_env(ctx.env());
    prepare_with(config, ctx, &connector, &GitSync).await
}

/// Run the pipeline with explicit forge and sync implementations.
///
/// On `Committed`, `ctx.next_release.git_head` is set to the new commit.
pub async fn prepare_with(
    config: &PluginConfig,
    ctx: &mut Context,
    connector: &dyn ForgeConnector,
    sync: &dyn LocalSync,
) -> Result<PrepareOutcome, PluginError> {
    let mut phases = PhaseTracker::new();
    let result = run(config, ctx, connector, sync, &mut phases).await;

    match &result {
        Ok(outcome) => {
            if let (Some(sha), Some(release)) = (outcome.commit_sha(), ctx.next_release.as_mut()) {
                release.git_head = sha.to_string();
            }
        }
        Err(err) => {
            let failed_in = phases.fail(err);
            if failed_in.mutates_remote() {
                warn!(phase = %failed_in, "Aborted after remote writes began; created objects are unreferenced");
            }
        }
    }

    result
}

async fn run(
    config: &PluginConfig,
    ctx: &Context,
    connector: &dyn ForgeConnector,
    sync: &dyn LocalSync,
    phases: &mut PhaseTracker,
) -> Result<PrepareOutcome, PluginError> {
    phases.advance(Phase::ResolvingTargets);

    let token = resolve_token(ctx.env(), config.github_token.as_deref())?;
    let repo = resolve_repo_info(ctx.env(), &ctx.options)?;
    let patterns = config.patterns()?;

    let files = resolve_files(patterns, &ctx.cwd)?;
    if files.is_empty() {
        warn!("No files matched the specified patterns, skipping commit");
        phases.advance(Phase::Done);
        return Ok(PrepareOutcome::NoFiles);
    }

    let blobs = read_files_as_blobs(&files, &ctx.cwd)?;
    info!("Preparing to commit {} file(s) to {}", blobs.len(), repo);

    if config.is_dry_run() {
        info!("Dry run: would commit {} file(s) to {}", blobs.len(), repo);
        for blob in &blobs {
            info!("  {} ({})", blob.path, blob.encoding);
        }
        phases.advance(Phase::Done);
        return Ok(PrepareOutcome::DryRun { files });
    }

    let forge = connector.connect(&token);
    let forge = forge.as_ref();

    phases.advance(Phase::ReadingBase);
    let tip = forge
        .get_ref(&repo)
        .await
        .map_err(api_error("read branch reference"))?;
    let base = forge
        .get_commit(&repo, &tip.sha)
        .await
        .map_err(api_error("read base commit"))?;
    info!(commit = %tip.sha, tree = %base.tree_sha, "Read base commit");

    phases.advance(Phase::UploadingBlobs);
    let uploaded = upload_blobs(forge, &repo, &blobs)
        .await
        .map_err(api_error("upload blob"))?;

    phases.advance(Phase::BuildingTree);
    let entries: Vec<TreeEntry> = uploaded
        .iter()
        .map(|b| TreeEntry::new(b.path.clone(), b.sha.clone()))
        .collect();
    let tree_sha = forge
        .create_tree(&repo, &base.tree_sha, &entries)
        .await
        .map_err(api_error("create tree"))?;

    phases.advance(Phase::CheckingIdempotency);
    if tree_sha == base.tree_sha {
        phases.advance(Phase::NoOp);
        info!("No changes detected, skipping commit");
        phases.advance(Phase::Done);
        return Ok(PrepareOutcome::Unchanged { tree_sha });
    }

    phases.advance(Phase::BuildingCommit);
    let message = render_commit_message(config.commit_message.as_deref(), ctx.next_release.as_ref());
    let author = resolve_identity(
        ctx.env(),
        IdentityRole::Author,
        config.author_name.as_deref(),
        config.author_email.as_deref(),
    );
    let committer = resolve_identity(
        ctx.env(),
        IdentityRole::Committer,
        config.committer_name.as_deref(),
        config.committer_email.as_deref(),
    );
    if author.is_some() || committer.is_some() {
        info!("Using explicit commit identity; the commit will not be signed automatically");
    } else {
        info!("No explicit identity; the commit will be signed by the token's identity");
    }

    let commit_sha = forge
        .create_commit(
            &repo,
            CreateCommitRequest {
                message,
                tree_sha: tree_sha.clone(),
                parents: vec![tip.sha.clone()],
                author,
                committer,
            },
        )
        .await
        .map_err(api_error("create commit"))?;

    phases.advance(Phase::UpdatingRef);
    forge
        .update_ref(&repo, &commit_sha)
        .await
        .map_err(api_error("update branch reference"))?;
    info!(commit = %commit_sha, "Created commit on {}", repo);

    phases.advance(Phase::SyncingLocal);
    let request = SyncRequest {
        work_dir: ctx.cwd.clone(),
        remote: ctx.remote.clone(),
        repo: repo.clone(),
        server_url: server_url_from_env(ctx.env()),
        token,
    };
    let head = sync.fetch_and_reset(&request).map_err(|e| {
        PluginError::with_details(
            ErrorCode::LocalSync,
            format!(
                "Commit {} was pushed to {} but the local repository could not be synced",
                commit_sha, repo
            ),
            format!("commit {}: {}", commit_sha, e),
        )
    })?;
    info!(head = %head, "Synced local repository");

    phases.advance(Phase::Done);
    Ok(PrepareOutcome::Committed {
        commit_sha,
        tree_sha,
        files,
    })
}

/// Upload every blob concurrently; the first failure fails the batch.
async fn upload_blobs(
    forge: &dyn Forge,
    repo: &RepoInfo,
    blobs: &[FileBlob],
) -> Result<Vec<RemoteBlob>, ForgeError> {
    try_join_all(blobs.iter().map(|blob| async move {
        let sha = forge.create_blob(repo, &blob.content, blob.encoding).await?;
        Ok::<_, ForgeError>(RemoteBlob {
            path: blob.path.clone(),
            sha,
        })
    }))
    .await
}

fn api_error(step: &'static str) -> impl Fn(ForgeError) -> PluginError {
    move |err| {
        PluginError::with_details(
            ErrorCode::GitHubApi,
            format!("GitHub API request failed: {}", step),
            err.to_string(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::PipelineOptions;
    use crate::core::env::MapEnv;
    use crate::core::types::NextRelease;
    use crate::forge::mock::MockForge;
    use crate::git::MockSync;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn context(dir: &TempDir) -> Context {
        Context::new(dir.path(), Arc::new(MapEnv::new().with("GH_TOKEN", "ghs_test")))
            .with_options(PipelineOptions {
                repository_url: Some("https://github.com/owner/repo.git".into()),
                branches: vec!["main".into()],
            })
    }

    fn write(dir: &TempDir, path: &str, content: &str) {
        let full = dir.path().join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full, content).unwrap();
    }

    #[tokio::test]
    async fn commits_changed_file() {
        let dir = TempDir::new().unwrap();
        write(&dir, "CHANGELOG.md", "# 1.0.0\n");
        let forge = MockForge::new().with_branch("main", &[("CHANGELOG.md", "old\n")]);
        let sync = MockSync::new();
        let mut ctx = context(&dir).with_next_release(NextRelease {
            version: "1.0.0".into(),
            git_tag: "v1.0.0".into(),
            git_head: "before".into(),
        });

        let outcome = prepare_with(&PluginConfig::with_files(["CHANGELOG.md"]), &mut ctx, &forge, &sync)
            .await
            .unwrap();

        let sha = outcome.commit_sha().unwrap().to_string();
        assert_eq!(forge.tip("main"), Some(sha.clone()));
        assert_eq!(ctx.next_release.unwrap().git_head, sha);
        assert_eq!(
            forge.commit(&sha).unwrap().message,
            "chore(release): 1.0.0 [skip ci]"
        );
        assert_eq!(sync.requests().len(), 1);
    }

    #[tokio::test]
    async fn unchanged_content_is_noop() {
        let dir = TempDir::new().unwrap();
        write(&dir, "CHANGELOG.md", "same\n");
        let forge = MockForge::new().with_branch("main", &[("CHANGELOG.md", "same\n")]);
        let sync = MockSync::new();
        let mut ctx = context(&dir);

        let outcome = prepare_with(&PluginConfig::with_files(["CHANGELOG.md"]), &mut ctx, &forge, &sync)
            .await
            .unwrap();

        assert!(matches!(outcome, PrepareOutcome::Unchanged { .. }));
        assert!(!forge.operation_kinds().contains(&"create_commit"));
        assert!(!forge.operation_kinds().contains(&"update_ref"));
        assert!(sync.requests().is_empty());
    }

    #[tokio::test]
    async fn no_matching_files_makes_no_calls() {
        let dir = TempDir::new().unwrap();
        let forge = MockForge::new().with_branch("main", &[]);
        let mut ctx = context(&dir);

        let outcome = prepare_with(&PluginConfig::with_files(["dist/**"]), &mut ctx, &forge, &MockSync::new())
            .await
            .unwrap();

        assert_eq!(outcome, PrepareOutcome::NoFiles);
        assert!(forge.operations().is_empty());
    }

    #[tokio::test]
    async fn sync_failure_is_elocalsync_with_sha() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a.txt", "new");
        let forge = MockForge::new().with_branch("main", &[("a.txt", "old")]);
        let sync = MockSync::failing(crate::git::GitError::RemoteNotFound {
            name: "origin".into(),
        });
        let mut ctx = context(&dir);

        let err = prepare_with(&PluginConfig::with_files(["a.txt"]), &mut ctx, &forge, &sync)
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::LocalSync);
        let tip = forge.tip("main").unwrap();
        assert!(err.details.unwrap().contains(&tip));
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let json = serde_json::to_value(PrepareOutcome::Unchanged {
            tree_sha: "t".into(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"status": "unchanged", "tree_sha": "t"}));

        let json = serde_json::to_value(PrepareOutcome::NoFiles).unwrap();
        assert_eq!(json, serde_json::json!({"status": "no_files"}));
    }
}
