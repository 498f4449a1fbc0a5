//! error
//!
//! Error taxonomy surfaced to the release pipeline.
//!
//! # Design
//!
//! Every failure that leaves the library is a [`PluginError`] carrying a
//! stable machine-readable [`ErrorCode`], a human message, and optional
//! upstream detail. Layer errors are mapped into it at the boundary with a
//! message naming the failed step.
//!
//! Error messages MUST NOT contain bearer tokens.
//!
//! # Example
//!
//! ```
//! use release_commit::error::{ErrorCode, PluginError};
//!
//! let err = PluginError::new(ErrorCode::NoRepo, "No repository URL found");
//! assert_eq!(err.to_string(), "ENOREPO: No repository URL found");
//! assert_eq!(err.code.as_str(), "ENOREPO");
//! ```

use thiserror::Error;

use crate::core::config::ConfigError;

/// Stable error kinds reported to the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// No usable GitHub credential.
    NoAuth,
    /// Pattern list invalid or empty, or a matched file unreadable.
    NoFiles,
    /// Repository URL missing or unparseable.
    NoRepo,
    /// Target branch could not be determined.
    NoBranch,
    /// Malformed plugin options.
    InvalidConfig,
    /// Any rejection from the GitHub API.
    GitHubApi,
    /// The remote commit exists but the local working copy could not be synced.
    LocalSync,
}

impl ErrorCode {
    /// The wire name of this code (e.g. `EGHAPI`).
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NoAuth => "EGHNOAUTH",
            ErrorCode::NoFiles => "ENOFILES",
            ErrorCode::NoRepo => "ENOREPO",
            ErrorCode::NoBranch => "ENOBRANCH",
            ErrorCode::InvalidConfig => "EINVALIDCONFIG",
            ErrorCode::GitHubApi => "EGHAPI",
            ErrorCode::LocalSync => "ELOCALSYNC",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error raised by `verify_conditions` or `prepare`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct PluginError {
    /// Machine-readable kind.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// Upstream detail (HTTP status and body message, io error, ...).
    pub details: Option<String>,
}

impl PluginError {
    /// Create an error without upstream detail.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Create an error carrying upstream detail.
    pub fn with_details(
        code: ErrorCode,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            details: Some(details.into()),
        }
    }
}

impl From<ConfigError> for PluginError {
    fn from(err: ConfigError) -> Self {
        PluginError::with_details(ErrorCode::InvalidConfig, "Invalid configuration", err.to_string())
    }
}
