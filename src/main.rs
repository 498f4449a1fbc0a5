//! release-commit binary entry point

use std::process::ExitCode;

use release_commit::error::PluginError;

fn main() -> ExitCode {
    match release_commit::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            if let Some(details) = err
                .downcast_ref::<PluginError>()
                .and_then(|e| e.details.as_deref())
            {
                eprintln!("  {}", details);
            }
            for cause in err.chain().skip(1) {
                eprintln!("  caused by: {}", cause);
            }
            ExitCode::FAILURE
        }
    }
}
