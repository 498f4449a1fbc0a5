//! core::token
//!
//! Bearer token resolution.
//!
//! # Precedence
//!
//! 1. `GH_TOKEN`
//! 2. `GITHUB_TOKEN`
//! 3. `github_token` from plugin config
//!
//! # Security
//!
//! [`Token`] never prints its value through `Debug` or `Display`. Only
//! [`Token::prefix`] may appear in logs.

use crate::core::env::Env;
use crate::error::{ErrorCode, PluginError};

/// Primary token variable.
pub const GH_TOKEN: &str = "GH_TOKEN";
/// Secondary token variable (set by GitHub Actions).
pub const GITHUB_TOKEN: &str = "GITHUB_TOKEN";

/// A GitHub bearer credential.
///
/// # Example
///
/// ```
/// use release_commit::core::token::Token;
///
/// let token = Token::new("ghs_abcdef123456");
/// assert_eq!(token.prefix(), "ghs_...");
/// assert!(!format!("{:?}", token).contains("abcdef"));
/// assert_eq!(token.expose(), "ghs_abcdef123456");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    /// Wrap a raw token value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw value, for request headers and authenticated URLs only.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// A short non-sensitive prefix for diagnostics.
    pub fn prefix(&self) -> String {
        let head: String = self.0.chars().take(4).collect();
        format!("{}...", head)
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Token({})", self.prefix())
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.prefix())
    }
}

/// Resolve the bearer token.
///
/// # Errors
///
/// `EGHNOAUTH` when no source provides a non-empty token.
pub fn resolve_token(env: &dyn Env, config_token: Option<&str>) -> Result<Token, PluginError> {
    env.var(GH_TOKEN)
        .or_else(|| env.var(GITHUB_TOKEN))
        .or_else(|| config_token.filter(|t| !t.is_empty()).map(String::from))
        .map(Token::new)
        .ok_or_else(|| {
            PluginError::new(
                ErrorCode::NoAuth,
                "No GitHub authentication token found. Please provide GH_TOKEN, GITHUB_TOKEN \
                 environment variable, or github_token in plugin config.",
            )
        })
}
