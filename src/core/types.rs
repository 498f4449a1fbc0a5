//! core::types
//!
//! Domain types shared across a single commit run.
//!
//! # Types
//!
//! - [`RepoInfo`] - Target repository coordinates (owner, repo, branch)
//! - [`BlobEncoding`] - How blob content is transported to the API
//! - [`FileBlob`] - A local file prepared for upload
//! - [`RemoteBlob`] - An uploaded blob keyed by its path
//! - [`NextRelease`] - Release metadata supplied by the pipeline
//!
//! All of these are run-scoped: created and discarded inside one
//! `prepare` invocation.

use serde::{Deserialize, Serialize};

/// Target coordinates of the remote branch.
///
/// All three fields are non-empty once resolved; see
/// [`resolve_repo_info`](crate::core::repo::resolve_repo_info).
///
/// # Example
///
/// ```
/// use release_commit::core::types::RepoInfo;
///
/// let info = RepoInfo::new("octocat", "hello-world", "main");
/// assert_eq!(info.to_string(), "octocat/hello-world:main");
/// assert_eq!(info.slug(), "octocat/hello-world");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoInfo {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name, without any `.git` suffix
    pub repo: String,
    /// Branch the commit lands on
    pub branch: String,
}

impl RepoInfo {
    /// Create repository coordinates.
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            branch: branch.into(),
        }
    }

    /// `owner/repo`.
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

impl std::fmt::Display for RepoInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}:{}", self.owner, self.repo, self.branch)
    }
}

/// Transport encoding of blob content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlobEncoding {
    /// Plain UTF-8 text
    #[serde(rename = "utf-8")]
    Utf8,
    /// Base64 of the raw bytes (binary files)
    #[serde(rename = "base64")]
    Base64,
}

impl BlobEncoding {
    /// The encoding name the GitHub API expects.
    pub fn as_str(&self) -> &'static str {
        match self {
            BlobEncoding::Utf8 => "utf-8",
            BlobEncoding::Base64 => "base64",
        }
    }
}

impl std::fmt::Display for BlobEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A local file ready to be uploaded as a blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileBlob {
    /// Path relative to the working directory, `/`-separated
    pub path: String,
    /// File content in the given encoding
    pub content: String,
    /// Encoding of `content`
    pub encoding: BlobEncoding,
}

/// A blob that exists on the remote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteBlob {
    /// Path the blob is placed at in the new tree
    pub path: String,
    /// Content-addressed id returned by the remote
    pub sha: String,
}

/// Release metadata handed over by the pipeline.
///
/// `git_head` is overwritten with the new commit sha once a commit lands,
/// so downstream steps tag the right commit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextRelease {
    /// Version being released (e.g. `1.2.3`)
    pub version: String,
    /// Tag that will be created (e.g. `v1.2.3`)
    pub git_tag: String,
    /// Commit the release points at
    pub git_head: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_info_display() {
        let info = RepoInfo::new("owner", "repo", "release/1.x");
        assert_eq!(format!("{}", info), "owner/repo:release/1.x");
    }

    #[test]
    fn blob_encoding_names() {
        assert_eq!(BlobEncoding::Utf8.as_str(), "utf-8");
        assert_eq!(BlobEncoding::Base64.to_string(), "base64");
    }

    #[test]
    fn blob_encoding_serializes_as_api_name() {
        let json = serde_json::to_string(&BlobEncoding::Utf8).unwrap();
        assert_eq!(json, "\"utf-8\"");
        let parsed: BlobEncoding = serde_json::from_str("\"base64\"").unwrap();
        assert_eq!(parsed, BlobEncoding::Base64);
    }
}
