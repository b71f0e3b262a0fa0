//! Merge rules: defaults, override order, conflict handling.

use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with scalar defaults applied.
///
/// Later sources override earlier ones key by key; lists are replaced, not
/// appended.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("builder.include_hidden", false)?
        .set_default("builder.include_mtime", false)?
        .set_default("builder.prune_empty_dirs", false)?
        .set_default("builder.follow_symlinks", true)?
        .set_default("resolver.max_attempts", 3)?
        .set_default("resolver.retry_base_delay_ms", 100)?
        .set_default("resolver.retry_max_delay_ms", 2_000)?
        .set_default("resolver.load_timeout_ms", 10_000)?
        .set_default("logging.level", "info")?
        .set_default("logging.format", "text")?
        .set_default("logging.output", "stderr")
}
