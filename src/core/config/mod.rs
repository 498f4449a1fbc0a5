//! core::config
//!
//! Configuration loading.
//!
//! # Locations
//!
//! Searched in order, first hit wins:
//! 1. An explicit path (`--config <path>`); it must exist
//! 2. `$RELEASE_COMMIT_CONFIG` if set
//! 3. `<cwd>/.release-commit.toml` (canonical)
//! 4. `<cwd>/release-commit.toml`
//!
//! No file found is not an error: defaults are used and verification then
//! reports whatever is missing (e.g. `files`).
//!
//! # Precedence
//!
//! File values are overridden by CLI flags; that merge happens in the CLI
//! layer, not here.
//!
//! # Example
//!
//! ```no_run
//! use release_commit::core::config::load;
//! use release_commit::core::env::ProcessEnv;
//! use std::path::Path;
//!
//! let result = load(Path::new("."), None, &ProcessEnv).unwrap();
//! for warning in &result.warnings {
//!     eprintln!("warning: {}", warning.message);
//! }
//! println!("remote: {}", result.config.remote());
//! ```

pub mod schema;

pub use schema::{BranchSpec, FilesOption, PipelineOptions, PluginConfig, ReleaseConfig};

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::env::Env;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "RELEASE_COMMIT_CONFIG";

/// Canonical config file name, relative to the working directory.
pub const CANONICAL_FILE: &str = ".release-commit.toml";

/// Compatibility config file name, relative to the working directory.
pub const COMPAT_FILE: &str = "release-commit.toml";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Warnings generated during config loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// The warning message.
    pub message: String,
    /// The path that triggered the warning.
    pub path: PathBuf,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: ReleaseConfig,
    /// The file it came from, if any.
    pub path: Option<PathBuf>,
    /// Any warnings generated during loading.
    pub warnings: Vec<ConfigWarning>,
}

/// Load configuration for a run rooted at `cwd`.
///
/// # Errors
///
/// Returns an error if an explicit file is missing, or if a found file
/// cannot be read, parsed, or validated.
pub fn load(
    cwd: &Path,
    explicit: Option<&Path>,
    env: &dyn Env,
) -> Result<ConfigLoadResult, ConfigError> {
    let mut warnings = Vec::new();

    let path = match explicit {
        Some(path) => {
            let path = resolve(cwd, path);
            if !path.exists() {
                return Err(ConfigError::NotFound(path));
            }
            Some(path)
        }
        None => find(cwd, env, &mut warnings),
    };

    let config = match &path {
        Some(path) => read_config(path)?,
        None => ReleaseConfig::default(),
    };
    config.validate()?;

    Ok(ConfigLoadResult {
        config,
        path,
        warnings,
    })
}

/// Locate a config file in the standard places.
fn find(cwd: &Path, env: &dyn Env, warnings: &mut Vec<ConfigWarning>) -> Option<PathBuf> {
    if let Some(from_env) = env.var(CONFIG_ENV) {
        let path = resolve(cwd, Path::new(&from_env));
        if path.exists() {
            return Some(path);
        }
        warnings.push(ConfigWarning {
            message: format!("${} points to a missing file, ignoring it", CONFIG_ENV),
            path,
        });
    }

    let canonical = cwd.join(CANONICAL_FILE);
    let compat = cwd.join(COMPAT_FILE);

    if canonical.exists() {
        if compat.exists() {
            warnings.push(ConfigWarning {
                message: format!(
                    "Both config files exist; using '{}' and ignoring this one",
                    canonical.display()
                ),
                path: compat,
            });
        }
        return Some(canonical);
    }

    if compat.exists() {
        return Some(compat);
    }

    None
}

fn resolve(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// Read and parse a config file.
fn read_config(path: &Path) -> Result<ReleaseConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
