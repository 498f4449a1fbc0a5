//! cli
//!
//! Command-line interface layer for release-commit.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Install the tracing subscriber
//! - Load configuration and apply flag overrides
//! - Delegate to [`crate::engine`]
//!
//! The CLI layer is thin and uses `anyhow` for error reporting; typed
//! errors live below it.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::core::config::{self, ReleaseConfig};
use crate::core::env::{Env, ProcessEnv};
use crate::engine::Context;
use crate::error::PluginError;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    init_tracing(cli.log_level());
    commands::dispatch(cli)
}

/// Install a stderr subscriber; `RUST_LOG` wins over `default_level`.
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // A subscriber may already be installed (tests); keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Working directory from `--cwd`, else the process directory.
pub fn resolve_cwd(cwd: Option<PathBuf>) -> Result<PathBuf> {
    match cwd {
        Some(path) => Ok(path),
        None => std::env::current_dir().context("failed to determine current directory"),
    }
}

/// Load config for `cwd`, logging any warnings.
///
/// Load failures surface as `EINVALIDCONFIG`.
pub fn load_config(cwd: &Path, explicit: Option<&Path>, env: &dyn Env) -> Result<ReleaseConfig> {
    let loaded = config::load(cwd, explicit, env).map_err(PluginError::from)?;
    for warning in &loaded.warnings {
        warn!(path = %warning.path.display(), "{}", warning.message);
    }
    Ok(loaded.config)
}

/// Build the run context from a loaded config.
pub fn build_context(cwd: PathBuf, config: &ReleaseConfig) -> Context {
    Context::new(cwd, Arc::new(ProcessEnv))
        .with_options(config.pipeline_options())
        .with_remote(config.remote())
}
