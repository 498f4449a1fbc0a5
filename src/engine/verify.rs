//! engine::verify
//!
//! Precondition checks run before a release.
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. A token is available (`EGHNOAUTH`)
//! 2. `files` is an array (`EINVALIDCONFIG`) with at least one pattern (`ENOFILES`)
//! 3. Repository URL and branch resolve (`ENOREPO`, `ENOBRANCH`)
//!
//! Verification makes no network calls.

use tracing::info;

use super::Context;
use crate::core::config::PluginConfig;
use crate::core::repo::resolve_repo_info;
use crate::core::token::{resolve_token, Token};
use crate::core::types::RepoInfo;
use crate::error::{ErrorCode, PluginError};

/// What verification resolved.
#[derive(Debug, Clone)]
pub struct Verified {
    /// The bearer token
    pub token: Token,
    /// Target repository and branch
    pub repo: RepoInfo,
    /// Configured file patterns (non-empty)
    pub patterns: Vec<String>,
}

/// Check that a release can run.
///
/// # Errors
///
/// The first unmet precondition, as described in the module docs.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use release_commit::core::config::{PipelineOptions, PluginConfig};
/// use release_commit::core::env::MapEnv;
/// use release_commit::engine::{verify_conditions, Context};
///
/// let env = MapEnv::new().with("GITHUB_TOKEN", "ghs_abc");
/// let ctx = Context::new(".", Arc::new(env)).with_options(PipelineOptions {
///     repository_url: Some("https://github.com/octocat/hello-world.git".into()),
///     branches: vec!["main".into()],
/// });
///
/// let verified = verify_conditions(&PluginConfig::with_files(["CHANGELOG.md"]), &ctx).unwrap();
/// assert_eq!(verified.repo.to_string(), "octocat/hello-world:main");
/// ```
pub fn verify_conditions(config: &PluginConfig, ctx: &Context) -> Result<Verified, PluginError> {
    let token = resolve_token(ctx.env(), config.github_token.as_deref())?;
    info!("Using GitHub token: {}", token.prefix());

    let patterns = config.patterns()?;
    if patterns.is_empty() {
        return Err(PluginError::new(
            ErrorCode::NoFiles,
            "At least one file pattern must be specified in \"files\"",
        ));
    }

    let repo = resolve_repo_info(ctx.env(), &ctx.options)?;
    info!(repository = %repo.slug(), branch = %repo.branch, "Verification successful");

    Ok(Verified {
        token,
        repo,
        patterns: patterns.to_vec(),
    })
}
