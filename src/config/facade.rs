//! Layered configuration loading.

use super::merge::merge_policy;
use super::sources::{env, global_file, workspace_file};
use super::DocnavConfig;
use crate::error::ApiError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loads [`DocnavConfig`] from every configured source.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    workspace_root: PathBuf,
    file: Option<PathBuf>,
    use_global: bool,
    use_env: bool,
}

impl ConfigLoader {
    pub fn new(workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            workspace_root: workspace_root.into(),
            file: None,
            use_global: true,
            use_env: true,
        }
    }

    /// Use an explicit config file instead of `docnav.toml`.
    pub fn with_file(mut self, file: Option<PathBuf>) -> Self {
        self.file = file;
        self
    }

    pub fn with_global(mut self, enabled: bool) -> Self {
        self.use_global = enabled;
        self
    }

    pub fn with_env(mut self, enabled: bool) -> Self {
        self.use_env = enabled;
        self
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Load and validate.
    pub fn load(&self) -> Result<DocnavConfig, ApiError> {
        let mut builder = merge_policy::builder_with_defaults()?;
        if self.use_global {
            builder = global_file::add_to_builder(builder);
        }
        builder = workspace_file::add_to_builder(builder, &self.workspace_root, self.file.as_deref());
        if self.use_env {
            builder = env::add_to_builder(builder);
        }

        let config: DocnavConfig = builder.build()?.try_deserialize()?;
        debug!(
            extensions = ?config.builder.extensions,
            max_attempts = config.resolver.max_attempts,
            "Configuration loaded"
        );
        config.validated()
    }
}
