//! CLI command-name contract for logging.

use crate::cli::parse::Commands;

/// Command name recorded on the command span (e.g. "build", "resolve").
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Build { .. } => "build",
        Commands::Inspect { .. } => "inspect",
        Commands::Validate { .. } => "validate",
        Commands::Resolve { .. } => "resolve",
    }
}
