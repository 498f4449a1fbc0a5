//! core::config::schema
//!
//! Configuration schema types.
//!
//! # File Layout
//!
//! ```toml
//! repository_url = "https://github.com/octocat/hello-world.git"
//! branches = ["main", { name = "beta", channel = "beta" }]
//! remote = "origin"
//!
//! [plugin]
//! files = ["CHANGELOG.md", "dist/**"]
//! commit_message = "chore(release): ${nextRelease.version} [skip ci]"
//! dry_run = false
//! ```
//!
//! Keys also accept the camelCase spelling used by JavaScript release
//! configs (`repositoryUrl`, `commitMessage`, `githubToken`, ...).
//!
//! # Validation
//!
//! `files` is deliberately loosely typed: an absent or non-array value is a
//! plugin-level `EINVALIDCONFIG` reported by verification, not a TOML parse
//! failure.

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::error::{ErrorCode, PluginError};

/// Default local remote used by sync.
pub const DEFAULT_REMOTE: &str = "origin";

/// Whole configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ReleaseConfig {
    /// Repository URL (HTTPS, SSH, or `owner/repo`)
    #[serde(alias = "repositoryUrl")]
    pub repository_url: Option<String>,

    /// Release branches; the first one is the fallback commit target
    pub branches: Vec<BranchSpec>,

    /// Local remote name re-pointed by sync (default: "origin")
    pub remote: Option<String>,

    /// Plugin options
    pub plugin: PluginConfig,
}

impl ReleaseConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(remote) = &self.remote {
            if remote.is_empty() || remote.chars().any(char::is_whitespace) {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid remote name '{}'",
                    remote
                )));
            }
        }

        for branch in &self.branches {
            if branch.name().trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "branch names cannot be empty".into(),
                ));
            }
        }

        Ok(())
    }

    /// The remote name sync operates on.
    pub fn remote(&self) -> &str {
        self.remote.as_deref().unwrap_or(DEFAULT_REMOTE)
    }

    /// Split out the pipeline-level options.
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            repository_url: self.repository_url.clone(),
            branches: self.branches.clone(),
        }
    }
}

/// A configured release branch: either a bare name or a table with `name`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum BranchSpec {
    /// `"main"`
    Name(String),
    /// `{ name = "beta", channel = "beta" }`
    Detailed {
        /// Branch name
        name: String,
        /// Distribution channel, if any
        #[serde(default, skip_serializing_if = "Option::is_none")]
        channel: Option<String>,
    },
}

impl BranchSpec {
    /// The branch name regardless of form.
    pub fn name(&self) -> &str {
        match self {
            BranchSpec::Name(name) => name,
            BranchSpec::Detailed { name, .. } => name,
        }
    }
}

impl From<&str> for BranchSpec {
    fn from(name: &str) -> Self {
        BranchSpec::Name(name.to_string())
    }
}

/// Pipeline options consulted by repository resolution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineOptions {
    /// Repository URL
    pub repository_url: Option<String>,
    /// Configured release branches
    pub branches: Vec<BranchSpec>,
}

/// The raw `files` option.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FilesOption {
    /// A list of glob patterns
    Patterns(Vec<String>),
    /// Anything else (a string, a number, a table, ...)
    Malformed(serde_json::Value),
}

/// Plugin options.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PluginConfig {
    /// Glob patterns of files to commit
    pub files: Option<FilesOption>,

    /// Token used when neither `GH_TOKEN` nor `GITHUB_TOKEN` is set
    #[serde(alias = "githubToken")]
    pub github_token: Option<String>,

    /// Report instead of committing
    #[serde(alias = "dryRun")]
    pub dry_run: Option<bool>,

    /// Commit message template
    #[serde(alias = "commitMessage")]
    pub commit_message: Option<String>,

    /// Commit author name
    #[serde(alias = "authorName")]
    pub author_name: Option<String>,

    /// Commit author email
    #[serde(alias = "authorEmail")]
    pub author_email: Option<String>,

    /// Committer name
    #[serde(alias = "committerName")]
    pub committer_name: Option<String>,

    /// Committer email
    #[serde(alias = "committerEmail")]
    pub committer_email: Option<String>,
}

// Custom Debug to avoid exposing github_token
impl std::fmt::Debug for PluginConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginConfig")
            .field("files", &self.files)
            .field("has_github_token", &self.github_token.is_some())
            .field("dry_run", &self.dry_run)
            .field("commit_message", &self.commit_message)
            .field("author_name", &self.author_name)
            .field("author_email", &self.author_email)
            .field("committer_name", &self.committer_name)
            .field("committer_email", &self.committer_email)
            .finish()
    }
}

impl PluginConfig {
    /// Config with the given file patterns and everything else unset.
    pub fn with_files<S: Into<String>>(patterns: impl IntoIterator<Item = S>) -> Self {
        Self {
            files: Some(FilesOption::Patterns(
                patterns.into_iter().map(Into::into).collect(),
            )),
            ..Self::default()
        }
    }

    /// The configured patterns.
    ///
    /// # Errors
    ///
    /// `EINVALIDCONFIG` when `files` is absent or not an array of strings.
    pub fn patterns(&self) -> Result<&[String], PluginError> {
        match &self.files {
            Some(FilesOption::Patterns(patterns)) => Ok(patterns),
            _ => Err(PluginError::new(
                ErrorCode::InvalidConfig,
                "Plugin option \"files\" must be provided and must be an array",
            )),
        }
    }

    /// Whether dry-run mode is on.
    pub fn is_dry_run(&self) -> bool {
        self.dry_run.unwrap_or(false)
    }
}
