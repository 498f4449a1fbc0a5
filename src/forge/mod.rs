//! forge
//!
//! Abstraction over the remote Git Data API.
//!
//! # Architecture
//!
//! The `Forge` trait exposes the six primitives a release commit needs
//! (read ref, read commit, create blob, create tree, create commit, move
//! ref). The pipeline only sees `dyn Forge` obtained from a
//! [`ForgeConnector`], so GitHub and the in-memory mock are interchangeable.
//!
//! - Reads happen before any write
//! - The ref is moved last, and never forced
//! - Forge failures surface as `EGHAPI` at the plugin boundary
//!
//! # Modules
//!
//! - `traits`: Core `Forge` trait and request/response types
//! - [`github`]: GitHub implementation over the REST API
//! - [`mock`]: Mock implementation for deterministic testing
//! - `factory`: Connectors and API base selection

mod factory;
pub mod github;
pub mod mock;
mod traits;

pub use factory::{api_base_from_env, ForgeConnector, GitHubConnector, GITHUB_API_URL};
pub use traits::*;
