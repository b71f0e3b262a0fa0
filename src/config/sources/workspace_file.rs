//! Workspace config file source: docnav.toml in the working directory, or an
//! explicit file given on the command line.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::File;
use std::path::Path;
use tracing::debug;

pub const WORKSPACE_CONFIG_FILE: &str = "docnav.toml";

/// Add the workspace config file. An explicit file must exist; the implicit
/// `docnav.toml` is optional.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    workspace_root: &Path,
    explicit: Option<&Path>,
) -> ConfigBuilder<DefaultState> {
    match explicit {
        Some(path) => {
            debug!(config_path = %path.display(), "Using explicit configuration file");
            builder.add_source(File::from(path).required(true))
        }
        None => {
            let path = workspace_root.join(WORKSPACE_CONFIG_FILE);
            if path.is_file() {
                debug!(config_path = %path.display(), "Using workspace configuration");
            }
            builder.add_source(File::from(path).required(false))
        }
    }
}
