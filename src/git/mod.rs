//! git
//!
//! Local repository operations.
//!
//! # Architecture
//!
//! This module is the only doorway to the local clone. All repository
//! access flows through [`Git`]; no other module imports `git2`.
//!
//! # Responsibilities
//!
//! - Repository discovery and opening
//! - Remote URL reads and rewrites
//! - Single-branch fetch with token credentials
//! - Hard reset onto a remote-tracking ref
//!
//! # Invariants
//!
//! - The remote URL is restored after every sync attempt
//! - Tokens never appear in `Debug` output

mod interface;
mod sync;

pub use interface::{Git, GitError, TOKEN_USERNAME};
pub use sync::{
    authenticated_url, redact_url, server_url_from_env, GitSync, LocalSync, MockSync, SyncRequest,
    DEFAULT_SERVER_URL, GITHUB_SERVER_URL,
};
