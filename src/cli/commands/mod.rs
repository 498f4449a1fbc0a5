//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Loads configuration and applies flag overrides
//! 2. Calls the engine to run the operation
//! 3. Formats and displays output
//!
//! Handlers do NOT talk to GitHub or the local repository directly.
//!
//! # Async Commands
//!
//! `prepare` does network I/O through an async engine. Its handler builds
//! a tokio runtime and blocks on the engine future.

mod completion;
mod prepare;
mod verify;

pub use completion::completion;
pub use prepare::{prepare, PrepareArgs};
pub use verify::verify;

use anyhow::Result;

use super::args::{next_release, Cli, Command};
use super::resolve_cwd;

/// Dispatch a parsed command line to its handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Verify { target } => {
            let cwd = resolve_cwd(cli.cwd)?;
            verify(&cwd, cli.config.as_deref(), &target)
        }
        Command::Prepare {
            target,
            dry_run,
            commit_message,
            next_version,
            git_tag,
            git_head,
            json,
        } => {
            let cwd = resolve_cwd(cli.cwd)?;
            let args = PrepareArgs {
                target,
                dry_run,
                commit_message,
                next_release: next_release(next_version, git_tag, git_head),
                json,
            };
            prepare(&cwd, cli.config.as_deref(), &args)
        }
        Command::Completion { shell } => completion(shell),
    }
}
