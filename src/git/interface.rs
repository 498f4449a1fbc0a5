//! git::interface
//!
//! Local repository access using git2.
//!
//! Only the operations the post-commit sync needs are exposed: reading and
//! re-pointing a remote URL, fetching one branch, and hard-resetting the
//! working tree. No other module imports `git2` directly.
//!
//! # Error Handling
//!
//! Git errors are categorized into typed variants:
//! - [`GitError::NotARepo`]: Not inside a Git repository
//! - [`GitError::RemoteNotFound`]: The named remote is not configured
//! - [`GitError::RefNotFound`]: Requested ref does not exist
//! - [`GitError::FetchFailed`]: The network fetch failed
//!
//! # Example
//!
//! ```ignore
//! use release_commit::git::Git;
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! git.fetch_branch("origin", "main", None)?;
//! let head = git.reset_hard("refs/remotes/origin/main")?;
//! println!("HEAD is now {}", head);
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::core::token::Token;

/// Username GitHub expects alongside an installation or PAT token.
pub const TOKEN_USERNAME: &str = "x-access-token";

/// Errors from Git operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GitError {
    /// Not inside a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// Repository is bare (no working directory).
    #[error("bare repository not supported")]
    BareRepo,

    /// The remote is not configured.
    #[error("remote not found: {name}")]
    RemoteNotFound {
        /// Remote name
        name: String,
    },

    /// Requested ref does not exist.
    #[error("ref not found: {refname}")]
    RefNotFound {
        /// The ref that was not found
        refname: String,
    },

    /// Fetching from the remote failed.
    #[error("fetch from '{remote}' failed: {message}")]
    FetchFailed {
        /// Remote name
        remote: String,
        /// libgit2 message
        message: String,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl GitError {
    /// Create a GitError from a git2::Error with context.
    fn from_git2(err: git2::Error, context: &str) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound | git2::ErrorCode::UnbornBranch
                if context.starts_with("refs/") || context == "HEAD" =>
            {
                GitError::RefNotFound {
                    refname: context.to_string(),
                }
            }
            _ => GitError::Internal {
                message: format!("{}: {}", context, err.message()),
            },
        }
    }
}

impl From<git2::Error> for GitError {
    fn from(err: git2::Error) -> Self {
        GitError::Internal {
            message: err.message().to_string(),
        }
    }
}

/// The Git interface.
pub struct Git {
    /// The underlying git2 repository
    repo: git2::Repository,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl Git {
    /// Open a repository at the given path.
    ///
    /// Uses `git2::Repository::discover`, so `path` can be any directory
    /// within the repository.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if no repository is found
    /// - [`GitError::BareRepo`] if the repository has no working directory
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::discover(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;

        if repo.is_bare() {
            return Err(GitError::BareRepo);
        }

        Ok(Self { repo })
    }

    /// Configured URL of a remote.
    pub fn remote_url(&self, name: &str) -> Result<String, GitError> {
        let remote = self.find_remote(name)?;
        Ok(remote.url().unwrap_or_default().to_string())
    }

    /// Point a remote at a new URL.
    pub fn set_remote_url(&self, name: &str, url: &str) -> Result<(), GitError> {
        self.find_remote(name)?;
        self.repo
            .remote_set_url(name, url)
            .map_err(|e| GitError::from_git2(e, name))
    }

    /// Fetch `refs/heads/<branch>` into `refs/remotes/<remote>/<branch>`.
    ///
    /// When `token` is given it answers credential challenges as
    /// `x-access-token`. A rejected credential is not retried.
    pub fn fetch_branch(
        &self,
        remote: &str,
        branch: &str,
        token: Option<&Token>,
    ) -> Result<(), GitError> {
        let mut handle = self.find_remote(remote)?;

        let mut callbacks = git2::RemoteCallbacks::new();
        if let Some(token) = token {
            let secret = token.expose().to_string();
            let mut attempted = false;
            callbacks.credentials(move |_url, _username, _allowed| {
                if attempted {
                    return Err(git2::Error::from_str("credentials rejected"));
                }
                attempted = true;
                git2::Cred::userpass_plaintext(TOKEN_USERNAME, &secret)
            });
        }

        let mut options = git2::FetchOptions::new();
        options.remote_callbacks(callbacks);

        let refspec = format!("+refs/heads/{0}:refs/remotes/{1}/{0}", branch, remote);
        debug!(remote, branch, "fetching");

        handle
            .fetch(&[refspec.as_str()], Some(&mut options), None)
            .map_err(|e| GitError::FetchFailed {
                remote: remote.to_string(),
                message: e.message().to_string(),
            })
    }

    /// Get HEAD commit sha.
    ///
    /// # Errors
    ///
    /// - [`GitError::RefNotFound`] if HEAD is unborn (new repository)
    pub fn head_oid(&self) -> Result<String, GitError> {
        let commit = self
            .repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .map_err(|e| GitError::from_git2(e, "HEAD"))?;
        Ok(commit.id().to_string())
    }

    /// Hard-reset the current branch, index and working tree to `refname`.
    ///
    /// Returns the new HEAD sha. Local uncommitted changes are discarded.
    pub fn reset_hard(&self, refname: &str) -> Result<String, GitError> {
        let target = self
            .repo
            .find_reference(refname)
            .and_then(|r| r.peel(git2::ObjectType::Commit))
            .map_err(|e| GitError::from_git2(e, refname))?;

        self.repo
            .reset(&target, git2::ResetType::Hard, None)
            .map_err(|e| GitError::from_git2(e, refname))?;

        debug!(refname, sha = %target.id(), "reset working tree");
        Ok(target.id().to_string())
    }

    fn find_remote(&self, name: &str) -> Result<git2::Remote<'_>, GitError> {
        self.repo
            .find_remote(name)
            .map_err(|_| GitError::RemoteNotFound {
                name: name.to_string(),
            })
    }
}
