//! forge::github
//!
//! GitHub forge implementation over the Git Data REST API.
//!
//! # Endpoints
//!
//! | Primitive       | Request                                         |
//! |-----------------|-------------------------------------------------|
//! | `get_ref`       | `GET   /repos/{o}/{r}/git/ref/heads/{branch}`   |
//! | `get_commit`    | `GET   /repos/{o}/{r}/git/commits/{sha}`        |
//! | `create_blob`   | `POST  /repos/{o}/{r}/git/blobs`                |
//! | `create_tree`   | `POST  /repos/{o}/{r}/git/trees`                |
//! | `create_commit` | `POST  /repos/{o}/{r}/git/commits`              |
//! | `update_ref`    | `PATCH /repos/{o}/{r}/git/refs/heads/{branch}`  |
//!
//! # Authentication
//!
//! A static bearer token is sent on every request. The token never appears
//! in `Debug` output or error messages.
//!
//! # Rate Limiting
//!
//! Returns `ForgeError::RateLimited` when limits are hit. No retries.
//!
//! # Example
//!
//! ```ignore
//! use release_commit::core::token::Token;
//! use release_commit::forge::github::GitHubForge;
//!
//! let forge = GitHubForge::new(Token::new("ghs_xxx"));
//! let tip = forge.get_ref(&repo).await?;
//! ```

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::traits::{CommitInfo, CreateCommitRequest, Forge, ForgeError, RefTarget, TreeEntry};
use crate::core::identity::GitIdentity;
use crate::core::token::Token;
use crate::core::types::{BlobEncoding, RepoInfo};

/// Default GitHub API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = "release-commit";

/// Mode of a regular, non-executable file.
const FILE_MODE: &str = "100644";

/// GitHub forge implementation.
pub struct GitHubForge {
    /// HTTP client for making requests
    client: Client,
    /// Bearer token sent on every request
    token: Token,
    /// API base URL (configurable for GitHub Enterprise and tests)
    api_base: String,
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for GitHubForge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubForge")
            .field("token", &self.token.prefix())
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl GitHubForge {
    /// Create a forge against `api.github.com`.
    pub fn new(token: Token) -> Self {
        Self::with_api_base(token, DEFAULT_API_BASE)
    }

    /// Create a forge against a custom API base URL.
    ///
    /// Use this for GitHub Enterprise (`https://github.example.com/api/v3`).
    pub fn with_api_base(token: Token, api_base: impl Into<String>) -> Self {
        let api_base: String = api_base.into();
        Self {
            client: Client::new(),
            token,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    /// The API base URL in use.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Build common headers for API requests.
    fn headers(&self) -> Result<HeaderMap, ForgeError> {
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.token.expose()))
            .map_err(|_| ForgeError::AuthFailed("token contains invalid characters".into()))?;

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        Ok(headers)
    }

    /// Build URL for a repository endpoint.
    fn repo_url(&self, repo: &RepoInfo, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api_base, repo.owner, repo.repo, path
        )
    }

    /// Send a request and decode the JSON body.
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ForgeError> {
        let response = request
            .headers(self.headers()?)
            .send()
            .await
            .map_err(|e| ForgeError::NetworkError(e.to_string()))?;

        self.handle_response(response).await
    }

    /// Handle API response, mapping errors appropriately.
    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> Result<T, ForgeError> {
        let status = response.status();

        if status.is_success() {
            response.json().await.map_err(|e| ForgeError::ApiError {
                status: status.as_u16(),
                message: format!("Failed to parse response: {}", e),
            })
        } else {
            Err(Self::error_from_response(response, status).await)
        }
    }

    /// Map an error response from the API.
    async fn error_from_response(response: Response, status: StatusCode) -> ForgeError {
        // GitHub Apps use X-Accepted-GitHub-Permissions, classic OAuth uses X-Accepted-OAuth-Scopes.
        let headers = response.headers();
        let required_permissions = header_string(headers, "X-Accepted-GitHub-Permissions");
        let required_scopes = header_string(headers, "X-Accepted-OAuth-Scopes");
        let rate_remaining = header_string(headers, "X-RateLimit-Remaining");

        let message = match response.json::<GitHubErrorResponse>().await {
            Ok(err) => err.message,
            Err(_) => "Unknown error".to_string(),
        };

        match status {
            StatusCode::UNAUTHORIZED => ForgeError::AuthFailed("Invalid or expired token".into()),
            // Secondary rate limits come back as 403 with no remaining quota.
            StatusCode::FORBIDDEN if rate_remaining.as_deref() == Some("0") => ForgeError::RateLimited,
            StatusCode::FORBIDDEN => {
                let mut err_msg = format!("Permission denied: {}", message);
                if let Some(perms) = required_permissions.filter(|p| !p.is_empty()) {
                    err_msg.push_str(&format!(" [required: {}]", perms));
                } else if let Some(scopes) = required_scopes.filter(|s| !s.is_empty()) {
                    err_msg.push_str(&format!(" [required scopes: {}]", scopes));
                }
                ForgeError::AuthFailed(err_msg)
            }
            StatusCode::NOT_FOUND => ForgeError::NotFound(message),
            StatusCode::TOO_MANY_REQUESTS => ForgeError::RateLimited,
            _ if status.is_server_error() => ForgeError::ApiError {
                status: status.as_u16(),
                message: format!("GitHub server error: {}", message),
            },
            _ => ForgeError::ApiError {
                status: status.as_u16(),
                message,
            },
        }
    }
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

#[async_trait]
impl Forge for GitHubForge {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn get_ref(&self, repo: &RepoInfo) -> Result<RefTarget, ForgeError> {
        let url = self.repo_url(repo, &format!("git/ref/heads/{}", repo.branch));
        debug!(%url, "get ref");

        let reference: GitHubRef = self
            .execute(self.client.get(&url))
            .await
            .map_err(|e| match e {
                ForgeError::NotFound(_) => ForgeError::NotFound(format!(
                    "branch '{}' or repository '{}' not found",
                    repo.branch,
                    repo.slug()
                )),
                other => other,
            })?;

        Ok(RefTarget {
            name: reference.ref_name,
            sha: reference.object.sha,
        })
    }

    async fn get_commit(&self, repo: &RepoInfo, sha: &str) -> Result<CommitInfo, ForgeError> {
        let url = self.repo_url(repo, &format!("git/commits/{}", sha));
        debug!(%url, "get commit");

        let commit: GitHubCommit = self.execute(self.client.get(&url)).await?;
        Ok(commit.into())
    }

    async fn create_blob(
        &self,
        repo: &RepoInfo,
        content: &str,
        encoding: BlobEncoding,
    ) -> Result<String, ForgeError> {
        let url = self.repo_url(repo, "git/blobs");
        let body = CreateBlobBody {
            content,
            encoding: encoding.as_str(),
        };
        debug!(%url, %encoding, bytes = content.len(), "create blob");

        let created: GitHubSha = self.execute(self.client.post(&url).json(&body)).await?;
        Ok(created.sha)
    }

    async fn create_tree(
        &self,
        repo: &RepoInfo,
        base_tree_sha: &str,
        entries: &[TreeEntry],
    ) -> Result<String, ForgeError> {
        let url = self.repo_url(repo, "git/trees");
        let body = CreateTreeBody {
            base_tree: base_tree_sha,
            tree: entries
                .iter()
                .map(|e| TreeEntryBody {
                    path: &e.path,
                    mode: FILE_MODE,
                    kind: "blob",
                    sha: &e.blob_sha,
                })
                .collect(),
        };
        debug!(%url, base_tree = base_tree_sha, entries = entries.len(), "create tree");

        let created: GitHubSha = self.execute(self.client.post(&url).json(&body)).await?;
        Ok(created.sha)
    }

    async fn create_commit(
        &self,
        repo: &RepoInfo,
        request: CreateCommitRequest,
    ) -> Result<String, ForgeError> {
        let url = self.repo_url(repo, "git/commits");
        let body = CreateCommitBody {
            message: &request.message,
            tree: &request.tree_sha,
            parents: &request.parents,
            author: request.author.as_ref(),
            committer: request.committer.as_ref(),
        };
        debug!(%url, tree = %request.tree_sha, "create commit");

        let created: GitHubSha = self.execute(self.client.post(&url).json(&body)).await?;
        Ok(created.sha)
    }

    async fn update_ref(&self, repo: &RepoInfo, sha: &str) -> Result<(), ForgeError> {
        let url = self.repo_url(repo, &format!("git/refs/heads/{}", repo.branch));
        let body = UpdateRefBody { sha, force: false };
        debug!(%url, sha, "update ref");

        let _: GitHubRef = self.execute(self.client.patch(&url).json(&body)).await?;
        Ok(())
    }
}

// --------------------------------------------------------------------------
// Wire formats
// --------------------------------------------------------------------------

/// Request body for creating a blob.
#[derive(Serialize)]
struct CreateBlobBody<'a> {
    content: &'a str,
    encoding: &'a str,
}

/// Request body for creating a tree.
#[derive(Serialize)]
struct CreateTreeBody<'a> {
    base_tree: &'a str,
    tree: Vec<TreeEntryBody<'a>>,
}

/// One overlay entry of a tree request.
#[derive(Serialize)]
struct TreeEntryBody<'a> {
    path: &'a str,
    mode: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    sha: &'a str,
}

/// Request body for creating a commit.
#[derive(Serialize)]
struct CreateCommitBody<'a> {
    message: &'a str,
    tree: &'a str,
    parents: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<&'a GitIdentity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    committer: Option<&'a GitIdentity>,
}

/// Request body for updating a ref.
#[derive(Serialize)]
struct UpdateRefBody<'a> {
    sha: &'a str,
    force: bool,
}

/// GitHub error response format.
#[derive(Deserialize)]
struct GitHubErrorResponse {
    message: String,
}

/// Any response that only matters for its sha.
#[derive(Deserialize)]
struct GitHubSha {
    sha: String,
}

/// GitHub ref response format.
#[derive(Deserialize)]
struct GitHubRef {
    #[serde(rename = "ref")]
    ref_name: String,
    object: GitHubSha,
}

/// GitHub git commit response format.
#[derive(Deserialize)]
struct GitHubCommit {
    sha: String,
    tree: GitHubSha,
    #[serde(default)]
    parents: Vec<GitHubSha>,
}

impl From<GitHubCommit> for CommitInfo {
    fn from(commit: GitHubCommit) -> Self {
        CommitInfo {
            sha: commit.sha,
            tree_sha: commit.tree.sha,
            parents: commit.parents.into_iter().map(|p| p.sha).collect(),
        }
    }
}
