//! forge::traits
//!
//! Forge trait definition for the Git Data primitives.
//!
//! # Design
//!
//! The `Forge` trait is async because every primitive is a network call.
//! Each method maps to exactly one remote endpoint and is parameterized by
//! the [`RepoInfo`] it targets. No method retries: retry policy belongs to
//! the pipeline.
//!
//! Reads go low to high (ref, commit, tree); writes go high to low
//! (blobs, tree, commit, ref). The orchestrator owns that ordering; the
//! forge only exposes the steps.
//!
//! # Example
//!
//! ```ignore
//! use release_commit::forge::{Forge, TreeEntry};
//!
//! async fn overlay(forge: &dyn Forge, repo: &RepoInfo) -> Result<String, ForgeError> {
//!     let tip = forge.get_ref(repo).await?;
//!     let commit = forge.get_commit(repo, &tip.sha).await?;
//!     let blob = forge.create_blob(repo, "hello\n", BlobEncoding::Utf8).await?;
//!     let tree = forge
//!         .create_tree(repo, &commit.tree_sha, &[TreeEntry::new("hello.txt", blob)])
//!         .await?;
//!     Ok(tree)
//! }
//! ```

use async_trait::async_trait;
use thiserror::Error;

use crate::core::identity::GitIdentity;
use crate::core::types::{BlobEncoding, RepoInfo};

/// Errors from forge operations.
///
/// These error types map to common failure modes when talking to the
/// GitHub API. All of them become `EGHAPI` at the plugin boundary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ForgeError {
    /// Authentication failed (invalid token, expired, insufficient permissions).
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded.
    #[error("rate limited")]
    RateLimited,

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Network or connection error.
    #[error("network error: {0}")]
    NetworkError(String),
}

/// The tip of a branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefTarget {
    /// Fully qualified ref (`refs/heads/main`)
    pub name: String,
    /// Commit the ref points at
    pub sha: String,
}

/// A commit as seen through the Git Data API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    /// Commit sha
    pub sha: String,
    /// Root tree of the commit
    pub tree_sha: String,
    /// Parent commit shas
    pub parents: Vec<String>,
}

/// A path overlaid onto a base tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// `/`-separated path inside the repository
    pub path: String,
    /// Blob placed at `path`
    pub blob_sha: String,
}

impl TreeEntry {
    /// Create an overlay entry.
    pub fn new(path: impl Into<String>, blob_sha: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            blob_sha: blob_sha.into(),
        }
    }
}

/// Request to create a commit object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCommitRequest {
    /// Commit message
    pub message: String,
    /// Tree the commit snapshots
    pub tree_sha: String,
    /// Parent commits (exactly one for release commits)
    pub parents: Vec<String>,
    /// Explicit author; `None` lets the remote attribute the credential
    pub author: Option<GitIdentity>,
    /// Explicit committer; `None` lets the remote sign as the credential
    pub committer: Option<GitIdentity>,
}

/// The Forge trait for the Git Data primitives.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; blob uploads are issued
/// concurrently against one forge.
///
/// # Error Handling
///
/// All methods return `Result<T, ForgeError>`. Nothing is retried.
#[async_trait]
pub trait Forge: Send + Sync {
    /// Get the forge name (e.g., "github").
    fn name(&self) -> &'static str;

    /// Current tip of `repo.branch`.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the repository or branch does not exist
    async fn get_ref(&self, repo: &RepoInfo) -> Result<RefTarget, ForgeError>;

    /// Read a commit object.
    async fn get_commit(&self, repo: &RepoInfo, sha: &str) -> Result<CommitInfo, ForgeError>;

    /// Upload content as a blob and return its sha.
    async fn create_blob(
        &self,
        repo: &RepoInfo,
        content: &str,
        encoding: BlobEncoding,
    ) -> Result<String, ForgeError>;

    /// Create a tree that overlays `entries` onto `base_tree_sha`.
    ///
    /// Paths not named in `entries` are inherited unchanged from the base.
    async fn create_tree(
        &self,
        repo: &RepoInfo,
        base_tree_sha: &str,
        entries: &[TreeEntry],
    ) -> Result<String, ForgeError>;

    /// Create a commit object and return its sha.
    async fn create_commit(
        &self,
        repo: &RepoInfo,
        request: CreateCommitRequest,
    ) -> Result<String, ForgeError>;

    /// Fast-forward `repo.branch` to `sha`.
    ///
    /// # Errors
    ///
    /// - `ApiError` (422) if the update is not a fast-forward; never forces
    async fn update_ref(&self, repo: &RepoInfo, sha: &str) -> Result<(), ForgeError>;
}
