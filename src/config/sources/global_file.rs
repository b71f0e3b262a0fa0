//! Global config file source: the platform config dir, e.g.
//! ~/.config/docnav/config.toml on Linux.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::File;
use directories::ProjectDirs;
use std::path::PathBuf;
use tracing::debug;

/// Path to the global config file, if a home directory can be determined.
pub fn global_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "docnav").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Add the global config file to the builder if it exists.
pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    match global_config_path() {
        Some(path) if path.is_file() => {
            debug!(config_path = %path.display(), "Using global configuration");
            builder.add_source(File::from(path).required(false))
        }
        _ => builder,
    }
}
