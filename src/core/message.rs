//! core::message
//!
//! Commit message rendering.
//!
//! Recognized placeholders are `${nextRelease.version}`,
//! `${nextRelease.gitTag}` and `${nextRelease.gitHead}`; every occurrence
//! is replaced. Anything else is left verbatim.

use crate::core::types::NextRelease;

/// Template used when none is configured.
pub const DEFAULT_TEMPLATE: &str = "chore(release): ${nextRelease.version} [skip ci]";

/// Message used when no release metadata is available.
pub const FALLBACK_MESSAGE: &str = "chore(release): update [skip ci]";

const VERSION: &str = "${nextRelease.version}";
const GIT_TAG: &str = "${nextRelease.gitTag}";
const GIT_HEAD: &str = "${nextRelease.gitHead}";

/// Render the commit message.
///
/// # Example
///
/// ```
/// use release_commit::core::message::{render_commit_message, FALLBACK_MESSAGE};
/// use release_commit::core::types::NextRelease;
///
/// let release = NextRelease {
///     version: "1.2.3".into(),
///     git_tag: "v1.2.3".into(),
///     git_head: "abc123".into(),
/// };
/// assert_eq!(
///     render_commit_message(Some("chore: ${nextRelease.version}"), Some(&release)),
///     "chore: 1.2.3"
/// );
/// assert_eq!(render_commit_message(Some("chore: ${nextRelease.version}"), None), FALLBACK_MESSAGE);
/// ```
pub fn render_commit_message(template: Option<&str>, release: Option<&NextRelease>) -> String {
    let Some(release) = release else {
        return FALLBACK_MESSAGE.to_string();
    };

    template
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_TEMPLATE)
        .replace(VERSION, &release.version)
        .replace(GIT_TAG, &release.git_tag)
        .replace(GIT_HEAD, &release.git_head)
}
