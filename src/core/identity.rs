//! core::identity
//!
//! Commit author/committer resolution.
//!
//! Each field resolves config-then-environment independently
//! (`author_name` or `GIT_AUTHOR_NAME`, and so on). An identity exists only
//! when both name and email are known.
//!
//! # Auto-signing
//!
//! When a commit is created with neither author nor committer, GitHub
//! attributes and signs it as the calling credential (e.g. a GitHub App),
//! which shows up as "Verified". Supplying either identity disables that.
//!
//! The release tool's default bot identity is exported by the host pipeline
//! even when nobody configured it, so it is treated as absent. If the host
//! tool ever changes its default, this comparison silently stops matching.

use serde::{Deserialize, Serialize};

use crate::core::env::Env;

/// Name of the host release tool's default bot identity.
pub const DEFAULT_BOT_NAME: &str = "semantic-release-bot";

/// Email of the host release tool's default bot identity.
pub const DEFAULT_BOT_EMAIL: &str = "semantic-release-bot@martynus.net";

/// A git identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitIdentity {
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
}

impl GitIdentity {
    /// Whether this is exactly the host tool's default bot identity.
    pub fn is_default_bot(&self) -> bool {
        self.name == DEFAULT_BOT_NAME && self.email == DEFAULT_BOT_EMAIL
    }
}

impl std::fmt::Display for GitIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// Which side of the commit an identity fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityRole {
    /// `GIT_AUTHOR_*`
    Author,
    /// `GIT_COMMITTER_*`
    Committer,
}

impl IdentityRole {
    fn name_var(&self) -> &'static str {
        match self {
            IdentityRole::Author => "GIT_AUTHOR_NAME",
            IdentityRole::Committer => "GIT_COMMITTER_NAME",
        }
    }

    fn email_var(&self) -> &'static str {
        match self {
            IdentityRole::Author => "GIT_AUTHOR_EMAIL",
            IdentityRole::Committer => "GIT_COMMITTER_EMAIL",
        }
    }
}

/// Resolve an identity for `role`.
///
/// Returns `None` when name or email is missing, or when the result is the
/// default bot identity.
///
/// # Example
///
/// ```
/// use release_commit::core::env::MapEnv;
/// use release_commit::core::identity::{resolve_identity, IdentityRole};
///
/// let env = MapEnv::from_pairs([
///     ("GIT_AUTHOR_NAME", "semantic-release-bot"),
///     ("GIT_AUTHOR_EMAIL", "semantic-release-bot@martynus.net"),
/// ]);
/// assert!(resolve_identity(&env, IdentityRole::Author, None, None).is_none());
///
/// let me = resolve_identity(&env, IdentityRole::Author, Some("Ada"), Some("ada@example.com"));
/// assert_eq!(me.unwrap().to_string(), "Ada <ada@example.com>");
/// ```
pub fn resolve_identity(
    env: &dyn Env,
    role: IdentityRole,
    config_name: Option<&str>,
    config_email: Option<&str>,
) -> Option<GitIdentity> {
    let name = config_name
        .filter(|n| !n.is_empty())
        .map(String::from)
        .or_else(|| env.var(role.name_var()))?;
    let email = config_email
        .filter(|e| !e.is_empty())
        .map(String::from)
        .or_else(|| env.var(role.email_var()))?;

    let identity = GitIdentity { name, email };
    if identity.is_default_bot() {
        return None;
    }
    Some(identity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::env::MapEnv;

    #[test]
    fn config_over_env() {
        let env = MapEnv::from_pairs([
            ("GIT_COMMITTER_NAME", "Env Name"),
            ("GIT_COMMITTER_EMAIL", "env@example.com"),
        ]);
        let id = resolve_identity(&env, IdentityRole::Committer, Some("Cfg"), None).unwrap();
        assert_eq!(id.name, "Cfg");
        assert_eq!(id.email, "env@example.com");
    }

    #[test]
    fn env_only() {
        let env = MapEnv::from_pairs([
            ("GIT_AUTHOR_NAME", "Env Name"),
            ("GIT_AUTHOR_EMAIL", "env@example.com"),
        ]);
        let id = resolve_identity(&env, IdentityRole::Author, None, None).unwrap();
        assert_eq!(
            id,
            GitIdentity {
                name: "Env Name".into(),
                email: "env@example.com".into()
            }
        );
    }

    #[test]
    fn roles_use_separate_variables() {
        let env = MapEnv::from_pairs([
            ("GIT_AUTHOR_NAME", "A"),
            ("GIT_AUTHOR_EMAIL", "a@example.com"),
        ]);
        assert!(resolve_identity(&env, IdentityRole::Committer, None, None).is_none());
    }

    #[test]
    fn incomplete_identity_is_absent() {
        let env = MapEnv::from_pairs([("GIT_AUTHOR_NAME", "Only Name")]);
        assert!(resolve_identity(&env, IdentityRole::Author, None, None).is_none());
        assert!(resolve_identity(&MapEnv::new(), IdentityRole::Author, None, Some("x@y.z")).is_none());
    }

    #[test]
    fn default_bot_suppressed_from_config() {
        let id = resolve_identity(
            &MapEnv::new(),
            IdentityRole::Author,
            Some(DEFAULT_BOT_NAME),
            Some(DEFAULT_BOT_EMAIL),
        );
        assert!(id.is_none());
    }

    #[test]
    fn bot_name_with_other_email_is_kept() {
        let id = resolve_identity(
            &MapEnv::new(),
            IdentityRole::Author,
            Some(DEFAULT_BOT_NAME),
            Some("bot@example.com"),
        );
        assert!(id.is_some());
    }
}
