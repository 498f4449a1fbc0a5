//! verify command - Check release preconditions

use std::path::Path;

use anyhow::Result;

use crate::cli::args::TargetArgs;
use crate::cli::{build_context, load_config};
use crate::core::env::ProcessEnv;
use crate::engine::verify_conditions;

/// Check that a release commit can be made from `cwd`.
pub fn verify(cwd: &Path, config_path: Option<&Path>, target: &TargetArgs) -> Result<()> {
    let mut config = load_config(cwd, config_path, &ProcessEnv)?;
    target.apply(&mut config);

    let ctx = build_context(cwd.to_path_buf(), &config);
    let verified = verify_conditions(&config.plugin, &ctx)?;

    println!(
        "Ready to commit {} pattern(s) to {}",
        verified.patterns.len(),
        verified.repo
    );
    Ok(())
}
