//! core::env
//!
//! Injected access to environment variables.
//!
//! Token, branch, and identity lookups all go through [`Env`] so that tests
//! supply fixtures instead of mutating process state.
//!
//! Empty values are treated as unset, matching how CI systems export
//! variables they have no value for.

use std::collections::HashMap;

/// Read-only view of environment variables.
pub trait Env: Send + Sync {
    /// Raw value of `key`, if set.
    fn raw(&self, key: &str) -> Option<String>;

    /// Value of `key`, treating an empty string as unset.
    fn var(&self, key: &str) -> Option<String> {
        self.raw(key).filter(|v| !v.is_empty())
    }
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Env for ProcessEnv {
    fn raw(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// A fixed set of variables.
///
/// # Example
///
/// ```
/// use release_commit::core::env::{Env, MapEnv};
///
/// let env = MapEnv::from_pairs([("GITHUB_TOKEN", "abc"), ("GIT_BRANCH", "")]);
/// assert_eq!(env.var("GITHUB_TOKEN").as_deref(), Some("abc"));
/// assert_eq!(env.var("GIT_BRANCH"), None);
/// assert_eq!(env.var("MISSING"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    /// Create an empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an environment from key/value pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Set a variable, returning `self` for chaining.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}

impl Env for MapEnv {
    fn raw(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}
