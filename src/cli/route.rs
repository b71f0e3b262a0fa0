//! CLI route: single route table and run context. Dispatches to domain services and presentation.

use crate::cli::help::command_name;
use crate::cli::output::RunOutput;
use crate::cli::parse::Commands;
use crate::cli::presentation::{
    format_build_summary, format_inspect_json, format_inspect_text, format_validate_text,
    format_warnings, BuildSummary, ManifestSummary,
};
use crate::config::{BuilderConfig, ConfigLoader, DocnavConfig};
use crate::content::{ContentCache, ContentResolver, FsContentSource};
use crate::error::ApiError;
use crate::manifest::codec::{read_manifest, write_manifest};
use crate::nav::NavigationStore;
use crate::tree::builder::ManifestBuilder;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, info_span};

/// Runtime context for CLI execution: working directory and loaded configuration.
pub struct RunContext {
    workspace_root: PathBuf,
    config: DocnavConfig,
}

impl RunContext {
    /// Load configuration for `workspace_root`, honoring an explicit config file.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = ConfigLoader::new(&workspace_root)
            .with_file(config_path)
            .load()?;
        Ok(Self::with_config(workspace_root, config))
    }

    pub fn with_config(workspace_root: PathBuf, config: DocnavConfig) -> Self {
        Self {
            workspace_root,
            config,
        }
    }

    pub fn config(&self) -> &DocnavConfig {
        &self.config
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<RunOutput, ApiError> {
        let span = info_span!("command", name = command_name(command));
        let _guard = span.enter();
        let started = Instant::now();

        let result = match command {
            Commands::Build {
                root,
                out,
                ext,
                ignore,
                include_mtime,
                prune_empty_dirs,
                format,
            } => {
                let mut builder_config = self.config.builder.clone();
                if let Some(ext) = ext {
                    builder_config.extensions = ext.clone();
                }
                builder_config.ignore.extend(ignore.iter().cloned());
                builder_config.include_mtime |= *include_mtime;
                builder_config.prune_empty_dirs |= *prune_empty_dirs;
                self.handle_build(root, out, &builder_config, format)
            }
            Commands::Inspect { manifest, format } => self.handle_inspect(manifest, format),
            Commands::Validate { manifest } => self.handle_validate(manifest),
            Commands::Resolve {
                manifest,
                root,
                address,
            } => self.handle_resolve(manifest, root, address),
        };

        info!(
            ok = result.is_ok(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace_root.join(path)
        }
    }

    fn handle_build(
        &self,
        root: &Path,
        out: &Path,
        builder_config: &BuilderConfig,
        format: &str,
    ) -> Result<RunOutput, ApiError> {
        let started = Instant::now();
        let built = ManifestBuilder::new(self.resolve_path(root))
            .with_filter(builder_config.filter())
            .with_options(builder_config.options())
            .build()?;

        let out_path = self.resolve_path(out);
        write_manifest(&built.manifest, &out_path)?;

        let summary = BuildSummary {
            out: out.display().to_string(),
            manifest: ManifestSummary::of(&built.manifest),
            warnings: built.warnings.len(),
            duration_ms: started.elapsed().as_millis(),
        };
        let stdout = format_build_summary(&summary, format)?;
        Ok(RunOutput::text(stdout).with_diagnostics(format_warnings(&built.warnings)))
    }

    fn handle_inspect(&self, manifest: &Path, format: &str) -> Result<RunOutput, ApiError> {
        let manifest = Arc::new(read_manifest(&self.resolve_path(manifest))?);
        let stdout = match format {
            "json" => format_inspect_json(&manifest)?,
            _ => format_inspect_text(&manifest),
        };
        Ok(RunOutput::text(stdout))
    }

    fn handle_validate(&self, manifest: &Path) -> Result<RunOutput, ApiError> {
        let manifest = read_manifest(&self.resolve_path(manifest))?;
        Ok(RunOutput::text(format_validate_text(&manifest)))
    }

    fn handle_resolve(&self, manifest: &Path, root: &Path, address: &str) -> Result<RunOutput, ApiError> {
        let manifest = Arc::new(read_manifest(&self.resolve_path(manifest))?);
        let store = NavigationStore::new(Arc::clone(&manifest));
        let id = store.resolve_address(address)?;

        let resolver = ContentResolver::new(
            manifest,
            Arc::new(ContentCache::new()),
            Arc::new(FsContentSource::new(self.resolve_path(root))),
            self.config.resolver.clone(),
        );

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ApiError::Io(format!("Failed to start runtime: {}", e)))?;
        let content = runtime.block_on(resolver.resolve(&id))?;
        Ok(RunOutput::text(content.text.clone()))
    }
}
