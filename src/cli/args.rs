//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--config <path>`: Use this config file instead of searching
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Warnings and errors only

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::core::config::{BranchSpec, FilesOption, ReleaseConfig};
use crate::core::types::NextRelease;

/// release-commit - Commit release artifacts to GitHub through the Git Data API
#[derive(Parser, Debug)]
#[command(name = "release-commit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if release-commit was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Config file (default: search .release-commit.toml, release-commit.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true, conflicts_with = "quiet")]
    pub debug: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// Default log level implied by the global flags.
    ///
    /// `RUST_LOG` overrides this when set.
    pub fn log_level(&self) -> &'static str {
        if self.debug {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check that a release commit can be made
    #[command(
        name = "verify",
        long_about = "Check that a release commit can be made.\n\n\
            Verifies, in order, that a GitHub token is available, that at least one \
            file pattern is configured, and that the repository and branch can be \
            resolved. Stops at the first failure. Makes no network calls.",
        after_help = "\
EXAMPLES:
    # Verify using .release-commit.toml
    release-commit verify

    # Verify with patterns given on the command line
    release-commit verify --file CHANGELOG.md --file 'dist/**'"
    )]
    Verify {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Commit matching files to the release branch
    #[command(
        name = "prepare",
        long_about = "Commit matching files to the release branch.\n\n\
            Uploads the matching files as blobs, overlays them onto the branch's \
            current tree, and creates one commit only if the tree changed. The \
            branch is fast-forwarded, never forced, and the local clone is then \
            fetched and hard-reset onto the new commit.",
        after_help = "\
EXAMPLES:
    # Commit the changelog for version 1.2.3
    release-commit prepare --next-version 1.2.3 --git-tag v1.2.3

    # See what would be committed
    release-commit prepare --dry-run

    # Machine-readable outcome
    release-commit prepare --json"
    )]
    Prepare {
        #[command(flatten)]
        target: TargetArgs,

        /// Report what would be committed without touching the remote
        #[arg(long)]
        dry_run: bool,

        /// Commit message template
        #[arg(long, value_name = "TEMPLATE")]
        commit_message: Option<String>,

        /// Version being released (${nextRelease.version})
        #[arg(long, value_name = "VERSION")]
        next_version: Option<String>,

        /// Tag being released (${nextRelease.gitTag})
        #[arg(long, value_name = "TAG")]
        git_tag: Option<String>,

        /// Commit the release was computed from (${nextRelease.gitHead})
        #[arg(long, value_name = "SHA")]
        git_head: Option<String>,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
EXAMPLES:
    # Bash (add to ~/.bashrc)
    release-commit completion bash >> ~/.bashrc

    # Zsh (add to ~/.zshrc)
    release-commit completion zsh >> ~/.zshrc"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Overrides shared by `verify` and `prepare`.
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Repository URL (HTTPS, SSH, or owner/repo)
    #[arg(long, value_name = "URL")]
    pub repository_url: Option<String>,

    /// Release branch; repeat for several (the first is the fallback target)
    #[arg(long = "branch", value_name = "NAME")]
    pub branches: Vec<String>,

    /// File pattern; repeat for several (replaces configured files)
    #[arg(long = "file", value_name = "PATTERN")]
    pub files: Vec<String>,

    /// Local remote to sync (default: origin)
    #[arg(long, value_name = "NAME")]
    pub remote: Option<String>,
}

impl TargetArgs {
    /// Apply these overrides on top of a loaded config.
    pub fn apply(&self, config: &mut ReleaseConfig) {
        if let Some(url) = &self.repository_url {
            config.repository_url = Some(url.clone());
        }
        if !self.branches.is_empty() {
            config.branches = self
                .branches
                .iter()
                .map(|b| BranchSpec::Name(b.clone()))
                .collect();
        }
        if !self.files.is_empty() {
            config.plugin.files = Some(FilesOption::Patterns(self.files.clone()));
        }
        if let Some(remote) = &self.remote {
            config.remote = Some(remote.clone());
        }
    }
}

/// Release metadata from `prepare` flags; `None` when no version is given.
pub fn next_release(
    version: Option<String>,
    git_tag: Option<String>,
    git_head: Option<String>,
) -> Option<NextRelease> {
    let version = version?;
    Some(NextRelease {
        git_tag: git_tag.unwrap_or_else(|| format!("v{}", version)),
        git_head: git_head.unwrap_or_default(),
        version,
    })
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
