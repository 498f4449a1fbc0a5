//! prepare command - Commit release files to the branch

use std::path::Path;

use anyhow::{Context as _, Result};

use crate::cli::args::TargetArgs;
use crate::cli::{build_context, load_config};
use crate::core::env::ProcessEnv;
use crate::core::types::NextRelease;
use crate::engine::{self, PrepareOutcome};

/// Flags for a `prepare` run.
#[derive(Debug, Clone, Default)]
pub struct PrepareArgs {
    /// Repository, branch, file, and remote overrides
    pub target: TargetArgs,
    /// Force dry-run regardless of config
    pub dry_run: bool,
    /// Commit message template override
    pub commit_message: Option<String>,
    /// Release metadata for the commit message
    pub next_release: Option<NextRelease>,
    /// Print the outcome as JSON
    pub json: bool,
}

/// Commit matching files from `cwd` to the release branch.
pub fn prepare(cwd: &Path, config_path: Option<&Path>, args: &PrepareArgs) -> Result<()> {
    let mut config = load_config(cwd, config_path, &ProcessEnv)?;
    args.target.apply(&mut config);
    if args.dry_run {
        config.plugin.dry_run = Some(true);
    }
    if let Some(template) = &args.commit_message {
        config.plugin.commit_message = Some(template.clone());
    }

    let mut ctx = build_context(cwd.to_path_buf(), &config);
    if let Some(release) = &args.next_release {
        ctx = ctx.with_next_release(release.clone());
    }

    let rt = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let outcome = rt.block_on(engine::prepare(&config.plugin, &mut ctx))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome);
    }
    Ok(())
}

fn print_outcome(outcome: &PrepareOutcome) {
    match outcome {
        PrepareOutcome::NoFiles => println!("No files matched; nothing to commit"),
        PrepareOutcome::DryRun { files } => {
            println!("Dry run: would commit {} file(s)", files.len());
            for file in files {
                println!("  {}", file);
            }
        }
        PrepareOutcome::Unchanged { .. } => println!("Files unchanged; no commit created"),
        PrepareOutcome::Committed { commit_sha, .. } => println!("{}", commit_sha),
    }
}
