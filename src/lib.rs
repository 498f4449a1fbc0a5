//! release-commit - Commit release artifacts to GitHub through the Git Data API
//!
//! release-commit is a release-pipeline step that takes files produced
//! during a release (changelogs, version manifests, build outputs), builds
//! exactly one commit containing them on the remote branch through the
//! GitHub REST API, and then syncs the local clone onto that commit. No
//! local `git commit` or `git push` is involved, so the commit is made with
//! the token's identity and can be signed by GitHub.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - `verify_conditions` and `prepare`, driven by a phase machine
//! - [`core`] - Configuration, environment, token, repository, identity, and message resolution
//! - [`files`] - Glob resolution and blob reading
//! - [`forge`] - Git Data API abstraction with GitHub and in-memory implementations
//! - [`git`] - Local clone operations (fetch, hard reset)
//! - [`error`] - Stable error codes surfaced to the pipeline
//!
//! # Guarantees
//!
//! 1. At most one commit is created per run, and none when content is unchanged
//! 2. The branch only ever moves by fast-forward
//! 3. No remote call happens before every local precondition has passed
//! 4. Bearer tokens never appear in logs, errors, or debug output

pub mod cli;
pub mod core;
pub mod engine;
pub mod error;
pub mod files;
pub mod forge;
pub mod git;
