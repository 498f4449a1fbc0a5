//! forge::mock
//!
//! Mock forge implementation for deterministic testing.
//!
//! # Design
//!
//! The mock keeps an in-memory object store shaped like a real repository:
//! blobs, flattened trees, commits and branch refs. Object ids are
//! content-addressed, so overlaying files that already match the base tree
//! yields the base tree's sha, exactly as the real service does. Every call
//! is recorded and any primitive can be configured to fail.
//!
//! # Example
//!
//! ```
//! use release_commit::core::types::{BlobEncoding, RepoInfo};
//! use release_commit::forge::mock::MockForge;
//! use release_commit::forge::{Forge, TreeEntry};
//!
//! # tokio_test::block_on(async {
//! let forge = MockForge::new().with_branch("main", &[("README.md", "hello\n")]);
//! let repo = RepoInfo::new("owner", "repo", "main");
//!
//! let tip = forge.get_ref(&repo).await.unwrap();
//! let commit = forge.get_commit(&repo, &tip.sha).await.unwrap();
//!
//! // Same content at the same path: tree unchanged.
//! let blob = forge.create_blob(&repo, "hello\n", BlobEncoding::Utf8).await.unwrap();
//! let tree = forge
//!     .create_tree(&repo, &commit.tree_sha, &[TreeEntry::new("README.md", blob)])
//!     .await
//!     .unwrap();
//! assert_eq!(tree, commit.tree_sha);
//! # });
//! ```

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use super::traits::{CommitInfo, CreateCommitRequest, Forge, ForgeError, RefTarget, TreeEntry};
use crate::core::identity::GitIdentity;
use crate::core::types::{BlobEncoding, RepoInfo};

/// Mock forge for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping. Clones share state.
#[derive(Debug, Clone)]
pub struct MockForge {
    /// Internal state shared across clones.
    inner: Arc<Mutex<MockForgeInner>>,
}

/// Internal mutable state.
#[derive(Debug, Default)]
struct MockForgeInner {
    /// Blob bytes by sha.
    blobs: HashMap<String, Vec<u8>>,
    /// Flattened trees (path -> blob sha) by sha.
    trees: HashMap<String, BTreeMap<String, String>>,
    /// Commits by sha.
    commits: HashMap<String, MockCommit>,
    /// Branch name -> commit sha.
    refs: HashMap<String, String>,
    /// Commits created so far, mixed into commit ids.
    commit_counter: u64,
    /// Method to fail on (for testing error paths).
    fail_on: Option<FailOn>,
    /// Files another writer pushes just before the next `update_ref`.
    concurrent_push: Option<Vec<(String, String)>>,
    /// Recorded operations for verification.
    operations: Vec<MockOperation>,
}

/// A commit stored by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCommit {
    pub tree_sha: String,
    pub parents: Vec<String>,
    pub message: String,
    pub author: Option<GitIdentity>,
    pub committer: Option<GitIdentity>,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Fail get_ref with the given error.
    GetRef(ForgeError),
    /// Fail get_commit with the given error.
    GetCommit(ForgeError),
    /// Fail create_blob with the given error.
    CreateBlob(ForgeError),
    /// Fail create_tree with the given error.
    CreateTree(ForgeError),
    /// Fail create_commit with the given error.
    CreateCommit(ForgeError),
    /// Fail update_ref with the given error.
    UpdateRef(ForgeError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    GetRef {
        branch: String,
    },
    GetCommit {
        sha: String,
    },
    CreateBlob {
        content: String,
        encoding: BlobEncoding,
    },
    CreateTree {
        base_tree: String,
        entries: Vec<TreeEntry>,
    },
    CreateCommit {
        request: CreateCommitRequest,
    },
    UpdateRef {
        branch: String,
        sha: String,
    },
}

impl MockOperation {
    /// Short name of the primitive, for ordering assertions.
    pub fn kind(&self) -> &'static str {
        match self {
            MockOperation::GetRef { .. } => "get_ref",
            MockOperation::GetCommit { .. } => "get_commit",
            MockOperation::CreateBlob { .. } => "create_blob",
            MockOperation::CreateTree { .. } => "create_tree",
            MockOperation::CreateCommit { .. } => "create_commit",
            MockOperation::UpdateRef { .. } => "update_ref",
        }
    }

    /// Whether the operation writes to the remote.
    pub fn is_write(&self) -> bool {
        !matches!(
            self,
            MockOperation::GetRef { .. } | MockOperation::GetCommit { .. }
        )
    }
}

fn digest(kind: &str, payload: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(kind.as_bytes());
    hasher.update([0u8]);
    hasher.update(payload);
    let mut sha = hex::encode(hasher.finalize());
    sha.truncate(40);
    sha
}

impl MockForgeInner {
    fn store_blob(&mut self, bytes: Vec<u8>) -> String {
        let sha = digest("blob", &bytes);
        self.blobs.entry(sha.clone()).or_insert(bytes);
        sha
    }

    fn store_tree(&mut self, tree: BTreeMap<String, String>) -> String {
        let mut payload = Vec::new();
        for (path, blob) in &tree {
            payload.extend_from_slice(path.as_bytes());
            payload.push(0);
            payload.extend_from_slice(blob.as_bytes());
            payload.push(b'\n');
        }
        let sha = digest("tree", &payload);
        self.trees.entry(sha.clone()).or_insert(tree);
        sha
    }

    fn store_commit(&mut self, commit: MockCommit) -> String {
        self.commit_counter += 1;
        let payload = format!(
            "{}\n{}\n{}\n{}",
            commit.tree_sha,
            commit.parents.join(" "),
            self.commit_counter,
            commit.message
        );
        let sha = digest("commit", payload.as_bytes());
        self.commits.insert(sha.clone(), commit);
        sha
    }

    /// Commit `files` on top of `branch` (or as a root commit).
    fn push_files(&mut self, branch: &str, files: &[(String, String)], message: &str) -> String {
        let parent = self.refs.get(branch).cloned();
        let mut tree = parent
            .as_ref()
            .and_then(|p| self.commits.get(p))
            .and_then(|c| self.trees.get(&c.tree_sha))
            .cloned()
            .unwrap_or_default();

        for (path, content) in files {
            let blob = self.store_blob(content.as_bytes().to_vec());
            tree.insert(path.clone(), blob);
        }
        let tree_sha = self.store_tree(tree);
        let sha = self.store_commit(MockCommit {
            tree_sha,
            parents: parent.into_iter().collect(),
            message: message.to_string(),
            author: None,
            committer: None,
        });
        self.refs.insert(branch.to_string(), sha.clone());
        sha
    }

    /// Whether `ancestor` is reachable from `descendant` via first parents.
    fn is_ancestor(&self, ancestor: &str, descendant: &str) -> bool {
        let mut current = Some(descendant.to_string());
        while let Some(sha) = current {
            if sha == ancestor {
                return true;
            }
            current = self
                .commits
                .get(&sha)
                .and_then(|c| c.parents.first().cloned());
        }
        false
    }
}

impl MockForge {
    /// Create a new empty mock forge.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockForgeInner::default())),
        }
    }

    /// Seed a branch with an initial commit holding `files`.
    ///
    /// Calling it again for the same branch adds a commit on top.
    pub fn with_branch(self, branch: &str, files: &[(&str, &str)]) -> Self {
        self.advance_branch(branch, files);
        self
    }

    /// Configure the mock to fail on a specific operation.
    ///
    /// # Example
    ///
    /// ```
    /// use release_commit::forge::mock::{MockForge, FailOn};
    /// use release_commit::forge::ForgeError;
    ///
    /// let forge = MockForge::new()
    ///     .fail_on(FailOn::CreateBlob(ForgeError::RateLimited));
    /// ```
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        self.state().fail_on = Some(fail_on);
        self
    }

    /// Clear the failure configuration.
    pub fn clear_fail_on(&self) {
        self.state().fail_on = None;
    }

    /// Simulate another writer pushing `files` to the branch right before
    /// the next `update_ref` call.
    pub fn with_concurrent_push(self, files: &[(&str, &str)]) -> Self {
        self.state().concurrent_push = Some(owned_files(files));
        self
    }

    /// Push a commit holding `files` directly, bypassing the recorded API.
    pub fn advance_branch(&self, branch: &str, files: &[(&str, &str)]) -> String {
        self.state()
            .push_files(branch, &owned_files(files), "external commit")
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.state().operations.clone()
    }

    /// Recorded operation kinds, in call order.
    pub fn operation_kinds(&self) -> Vec<&'static str> {
        self.state().operations.iter().map(|op| op.kind()).collect()
    }

    /// Clear recorded operations.
    pub fn clear_operations(&self) {
        self.state().operations.clear();
    }

    /// Current tip of a branch.
    pub fn tip(&self, branch: &str) -> Option<String> {
        self.state().refs.get(branch).cloned()
    }

    /// A stored commit.
    pub fn commit(&self, sha: &str) -> Option<MockCommit> {
        self.state().commits.get(sha).cloned()
    }

    /// Content of `path` at the tip of `branch`.
    pub fn file_at(&self, branch: &str, path: &str) -> Option<Vec<u8>> {
        let inner = self.state();
        let tip = inner.refs.get(branch)?;
        let commit = inner.commits.get(tip)?;
        let blob = inner.trees.get(&commit.tree_sha)?.get(path)?;
        inner.blobs.get(blob).cloned()
    }

    /// Number of commits in the store.
    pub fn commit_count(&self) -> usize {
        self.state().commits.len()
    }

    fn state(&self) -> MutexGuard<'_, MockForgeInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record an operation.
    fn record(&self, op: MockOperation) {
        self.state().operations.push(op);
    }

    /// Check if we should fail and return the error if so.
    fn check_fail(&self, expected: &str) -> Result<(), ForgeError> {
        let inner = self.state();
        let err = match &inner.fail_on {
            Some(FailOn::GetRef(e)) if expected == "get_ref" => e,
            Some(FailOn::GetCommit(e)) if expected == "get_commit" => e,
            Some(FailOn::CreateBlob(e)) if expected == "create_blob" => e,
            Some(FailOn::CreateTree(e)) if expected == "create_tree" => e,
            Some(FailOn::CreateCommit(e)) if expected == "create_commit" => e,
            Some(FailOn::UpdateRef(e)) if expected == "update_ref" => e,
            _ => return Ok(()),
        };
        Err(err.clone())
    }
}

impl Default for MockForge {
    fn default() -> Self {
        Self::new()
    }
}

fn owned_files(files: &[(&str, &str)]) -> Vec<(String, String)> {
    files
        .iter()
        .map(|(p, c)| (p.to_string(), c.to_string()))
        .collect()
}

#[async_trait]
impl Forge for MockForge {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn get_ref(&self, repo: &RepoInfo) -> Result<RefTarget, ForgeError> {
        self.record(MockOperation::GetRef {
            branch: repo.branch.clone(),
        });
        self.check_fail("get_ref")?;

        let inner = self.state();
        let sha = inner
            .refs
            .get(&repo.branch)
            .cloned()
            .ok_or_else(|| ForgeError::NotFound(format!("branch '{}'", repo.branch)))?;

        Ok(RefTarget {
            name: format!("refs/heads/{}", repo.branch),
            sha,
        })
    }

    async fn get_commit(&self, _repo: &RepoInfo, sha: &str) -> Result<CommitInfo, ForgeError> {
        self.record(MockOperation::GetCommit {
            sha: sha.to_string(),
        });
        self.check_fail("get_commit")?;

        let inner = self.state();
        let commit = inner
            .commits
            .get(sha)
            .ok_or_else(|| ForgeError::NotFound(format!("commit {}", sha)))?;

        Ok(CommitInfo {
            sha: sha.to_string(),
            tree_sha: commit.tree_sha.clone(),
            parents: commit.parents.clone(),
        })
    }

    async fn create_blob(
        &self,
        _repo: &RepoInfo,
        content: &str,
        encoding: BlobEncoding,
    ) -> Result<String, ForgeError> {
        self.record(MockOperation::CreateBlob {
            content: content.to_string(),
            encoding,
        });
        self.check_fail("create_blob")?;

        let bytes = match encoding {
            BlobEncoding::Utf8 => content.as_bytes().to_vec(),
            BlobEncoding::Base64 => STANDARD.decode(content).map_err(|e| ForgeError::ApiError {
                status: 422,
                message: format!("invalid base64 content: {}", e),
            })?,
        };

        Ok(self.state().store_blob(bytes))
    }

    async fn create_tree(
        &self,
        _repo: &RepoInfo,
        base_tree_sha: &str,
        entries: &[TreeEntry],
    ) -> Result<String, ForgeError> {
        self.record(MockOperation::CreateTree {
            base_tree: base_tree_sha.to_string(),
            entries: entries.to_vec(),
        });
        self.check_fail("create_tree")?;

        let mut inner = self.state();
        let mut tree = inner
            .trees
            .get(base_tree_sha)
            .cloned()
            .ok_or_else(|| ForgeError::ApiError {
                status: 422,
                message: format!("base_tree {} does not exist", base_tree_sha),
            })?;

        for entry in entries {
            if !inner.blobs.contains_key(&entry.blob_sha) {
                return Err(ForgeError::ApiError {
                    status: 422,
                    message: format!("blob {} does not exist", entry.blob_sha),
                });
            }
            tree.insert(entry.path.clone(), entry.blob_sha.clone());
        }

        Ok(inner.store_tree(tree))
    }

    async fn create_commit(
        &self,
        _repo: &RepoInfo,
        request: CreateCommitRequest,
    ) -> Result<String, ForgeError> {
        self.record(MockOperation::CreateCommit {
            request: request.clone(),
        });
        self.check_fail("create_commit")?;

        let mut inner = self.state();
        if !inner.trees.contains_key(&request.tree_sha) {
            return Err(ForgeError::ApiError {
                status: 422,
                message: format!("tree {} does not exist", request.tree_sha),
            });
        }

        Ok(inner.store_commit(MockCommit {
            tree_sha: request.tree_sha,
            parents: request.parents,
            message: request.message,
            author: request.author,
            committer: request.committer,
        }))
    }

    async fn update_ref(&self, repo: &RepoInfo, sha: &str) -> Result<(), ForgeError> {
        self.record(MockOperation::UpdateRef {
            branch: repo.branch.clone(),
            sha: sha.to_string(),
        });
        self.check_fail("update_ref")?;

        let mut inner = self.state();
        if let Some(files) = inner.concurrent_push.take() {
            inner.push_files(&repo.branch, &files, "concurrent commit");
        }

        let current = inner
            .refs
            .get(&repo.branch)
            .cloned()
            .ok_or_else(|| ForgeError::NotFound(format!("branch '{}'", repo.branch)))?;

        if !inner.commits.contains_key(sha) {
            return Err(ForgeError::ApiError {
                status: 422,
                message: "Object does not exist".into(),
            });
        }
        if !inner.is_ancestor(&current, sha) {
            return Err(ForgeError::ApiError {
                status: 422,
                message: "Update is not a fast forward".into(),
            });
        }

        inner.refs.insert(repo.branch.clone(), sha.to_string());
        Ok(())
    }
}
