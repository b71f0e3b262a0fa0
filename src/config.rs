//! Configuration System
//!
//! Hierarchical configuration for the builder, the content resolver and
//! logging. Sources are layered defaults, then the user's global config file,
//! then `docnav.toml` in the working directory (or an explicit `--config`
//! file), then `DOCNAV__*` environment variables.

use crate::content::ResolverConfig;
use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::tree::builder::BuildOptions;
use crate::tree::filter::{ExtensionFilter, DEFAULT_EXTENSIONS, DEFAULT_IGNORE_PATTERNS};
use serde::{Deserialize, Serialize};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use sources::global_file::global_config_path;
pub use sources::workspace_file::WORKSPACE_CONFIG_FILE;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocnavConfig {
    /// Manifest builder settings
    #[serde(default)]
    pub builder: BuilderConfig,

    /// Content resolver settings
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Manifest builder settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuilderConfig {
    /// Document extensions without the leading dot; empty accepts every file
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Names or relative paths to skip
    #[serde(default = "default_ignore")]
    pub ignore: Vec<String>,

    #[serde(default)]
    pub include_hidden: bool,

    #[serde(default)]
    pub include_mtime: bool,

    #[serde(default)]
    pub prune_empty_dirs: bool,

    #[serde(default = "default_true")]
    pub follow_symlinks: bool,
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect()
}

fn default_ignore() -> Vec<String> {
    DEFAULT_IGNORE_PATTERNS.iter().map(|s| s.to_string()).collect()
}

fn default_true() -> bool {
    true
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            ignore: default_ignore(),
            include_hidden: false,
            include_mtime: false,
            prune_empty_dirs: false,
            follow_symlinks: true,
        }
    }
}

impl BuilderConfig {
    pub fn filter(&self) -> ExtensionFilter {
        ExtensionFilter::new(&self.extensions)
            .with_ignore_patterns(self.ignore.iter().cloned())
            .with_hidden(self.include_hidden)
    }

    pub fn options(&self) -> BuildOptions {
        BuildOptions {
            include_mtime: self.include_mtime,
            prune_empty_dirs: self.prune_empty_dirs,
            follow_symlinks: self.follow_symlinks,
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Builder(String),
    Resolver(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Builder(msg) => write!(f, "Builder: {}", msg),
            ValidationError::Resolver(msg) => write!(f, "Resolver: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl DocnavConfig {
    /// Validate the whole configuration, collecting every problem.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.builder.extensions.iter().any(|e| e.contains('/')) {
            errors.push(ValidationError::Builder(
                "extensions must not contain '/'".to_string(),
            ));
        }
        if self.builder.ignore.iter().any(|p| p.trim().is_empty()) {
            errors.push(ValidationError::Builder(
                "ignore patterns must not be empty".to_string(),
            ));
        }
        if let Err(msg) = self.resolver.validate() {
            errors.push(ValidationError::Resolver(msg));
        }
        if let Err(msg) = self.logging.validate() {
            errors.push(ValidationError::Logging(msg));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate and fold every error into one [`ApiError`].
    pub fn validated(self) -> Result<Self, ApiError> {
        self.validate().map_err(|errors| {
            ApiError::ConfigError(
                errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; "),
            )
        })?;
        Ok(self)
    }
}
