//! engine
//!
//! Orchestrates a release commit: verify, then prepare.
//!
//! # Architecture
//!
//! The host pipeline calls two operations:
//!
//! 1. [`verify_conditions`]: checks token, file patterns, and repository
//!    coordinates, failing on the first unmet precondition
//! 2. [`prepare`]: resolves files, builds one commit on the remote through
//!    the Git Data API, and syncs the local clone onto it
//!
//! `prepare` walks the [`Phase`] state machine. Every resolution error is
//! raised before the first remote call; once remote writes begin, any
//! failure aborts the rest of the sequence without rollback.
//!
//! # Example
//!
//! ```ignore
//! use release_commit::engine::{prepare, verify_conditions, Context};
//!
//! let mut ctx = Context::new(cwd, Arc::new(ProcessEnv)).with_options(options);
//! verify_conditions(&plugin, &ctx)?;
//! let outcome = prepare(&plugin, &mut ctx).await?;
//! ```

pub mod phase;
pub mod prepare;
pub mod verify;

pub use phase::{Phase, PhaseTracker};
pub use prepare::{prepare, prepare_with, PrepareOutcome};
pub use verify::{verify_conditions, Verified};

use std::path::PathBuf;
use std::sync::Arc;

use crate::core::config::schema::DEFAULT_REMOTE;
use crate::core::config::PipelineOptions;
use crate::core::env::Env;
use crate::core::types::NextRelease;

/// Everything the host pipeline supplies to a run.
#[derive(Clone)]
pub struct Context {
    /// Working directory; file patterns and the local clone are found here.
    pub cwd: PathBuf,
    /// Environment access.
    pub env: Arc<dyn Env>,
    /// Pipeline options (`repositoryUrl`, `branches`).
    pub options: PipelineOptions,
    /// Local remote re-pointed by sync.
    pub remote: String,
    /// Release metadata; `git_head` is updated after a commit.
    pub next_release: Option<NextRelease>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("cwd", &self.cwd)
            .field("options", &self.options)
            .field("remote", &self.remote)
            .field("next_release", &self.next_release)
            .finish_non_exhaustive()
    }
}

impl Context {
    /// A context with default options and no release metadata.
    pub fn new(cwd: impl Into<PathBuf>, env: Arc<dyn Env>) -> Self {
        Self {
            cwd: cwd.into(),
            env,
            options: PipelineOptions::default(),
            remote: DEFAULT_REMOTE.to_string(),
            next_release: None,
        }
    }

    /// Set the pipeline options.
    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the local remote name.
    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = remote.into();
        self
    }

    /// Set the release metadata.
    pub fn with_next_release(mut self, release: NextRelease) -> Self {
        self.next_release = Some(release);
        self
    }

    /// The environment as a trait object.
    pub fn env(&self) -> &dyn Env {
        self.env.as_ref()
    }
}
