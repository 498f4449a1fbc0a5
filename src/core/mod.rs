//! core
//!
//! Domain types and the pure resolution steps of a commit run.
//!
//! # Modules
//!
//! - [`types`] - RepoInfo, FileBlob, RemoteBlob, NextRelease
//! - [`env`] - Injected environment access
//! - [`config`] - Configuration schema and loading
//! - [`repo`] - Repository URL parsing and branch detection
//! - [`token`] - Bearer token resolution
//! - [`identity`] - Author/committer resolution
//! - [`message`] - Commit message rendering
//!
//! # Design Principles
//!
//! - Nothing here performs network I/O
//! - Environment lookups go through [`env::Env`], never `std::env` directly
//! - Resolution failures surface as [`PluginError`](crate::error::PluginError)
//!   before any remote mutation

pub mod config;
pub mod env;
pub mod identity;
pub mod message;
pub mod repo;
pub mod token;
pub mod types;
