//! forge::factory
//!
//! Forge creation.
//!
//! # Design
//!
//! The token is only known once verification has resolved it, so the
//! pipeline receives a [`ForgeConnector`] rather than a ready forge. The
//! connector turns a token into a boxed [`Forge`]; commands pass
//! [`GitHubConnector`], tests pass a [`MockForge`](super::mock::MockForge).
//!
//! # API Base
//!
//! `GITHUB_API_URL` (set by GitHub Actions, also on Enterprise runners)
//! overrides `https://api.github.com`.
//!
//! # Example
//!
//! ```ignore
//! use release_commit::core::env::ProcessEnv;
//! use release_commit::forge::{ForgeConnector, GitHubConnector};
//!
//! let connector = GitHubConnector::from_env(&ProcessEnv);
//! let forge = connector.connect(&token);
//! let tip = forge.get_ref(&repo).await?;
//! ```

use super::github::{GitHubForge, DEFAULT_API_BASE};
use super::mock::MockForge;
use super::traits::Forge;
use crate::core::env::Env;
use crate::core::token::Token;

/// Environment variable overriding the API base URL.
pub const GITHUB_API_URL: &str = "GITHUB_API_URL";

/// Turns a resolved token into a forge.
pub trait ForgeConnector: Send + Sync {
    /// Create a forge authenticated with `token`.
    fn connect(&self, token: &Token) -> Box<dyn Forge>;
}

/// Connector for the real GitHub API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubConnector {
    api_base: String,
}

impl GitHubConnector {
    /// Connector against an explicit API base.
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
        }
    }

    /// Connector against `GITHUB_API_URL`, or `api.github.com` when unset.
    pub fn from_env(env: &dyn Env) -> Self {
        Self::new(api_base_from_env(env))
    }

    /// The API base URL forges will use.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }
}

impl Default for GitHubConnector {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}

impl ForgeConnector for GitHubConnector {
    fn connect(&self, token: &Token) -> Box<dyn Forge> {
        Box::new(GitHubForge::with_api_base(token.clone(), self.api_base.clone()))
    }
}

/// A mock connects to itself; clones share recorded state.
impl ForgeConnector for MockForge {
    fn connect(&self, _token: &Token) -> Box<dyn Forge> {
        Box::new(self.clone())
    }
}

/// API base URL from the environment.
///
/// # Example
///
/// ```
/// use release_commit::core::env::MapEnv;
/// use release_commit::forge::api_base_from_env;
///
/// assert_eq!(api_base_from_env(&MapEnv::new()), "https://api.github.com");
///
/// let env = MapEnv::new().with("GITHUB_API_URL", "https://ghe.example.com/api/v3");
/// assert_eq!(api_base_from_env(&env), "https://ghe.example.com/api/v3");
/// ```
pub fn api_base_from_env(env: &dyn Env) -> String {
    env.var(GITHUB_API_URL)
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
}
