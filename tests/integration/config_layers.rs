//! Integration tests for configuration layering

use crate::integration::test_utils::ENV_MUTEX;
use docnav::config::{ConfigLoader, WORKSPACE_CONFIG_FILE};
use std::fs;
use tempfile::TempDir;

struct EnvGuard(Vec<&'static str>);

impl EnvGuard {
    fn set(vars: &[(&'static str, &str)]) -> Self {
        for (key, value) in vars {
            std::env::set_var(key, value);
        }
        Self(vars.iter().map(|(k, _)| *k).collect())
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for key in &self.0 {
            std::env::remove_var(key);
        }
    }
}

#[test]
fn test_env_overrides_workspace_file() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join(WORKSPACE_CONFIG_FILE),
        "[resolver]\nmax_attempts = 4\nload_timeout_ms = 300\n",
    )
    .unwrap();

    let _env = EnvGuard::set(&[
        ("DOCNAV__RESOLVER__MAX_ATTEMPTS", "6"),
        ("DOCNAV__BUILDER__EXTENSIONS", "md,rst"),
    ]);
    let config = ConfigLoader::new(temp.path()).with_global(false).load().unwrap();

    assert_eq!(config.resolver.max_attempts, 6);
    assert_eq!(config.resolver.load_timeout_ms, 300);
    assert_eq!(config.builder.extensions, vec!["md", "rst"]);
}

#[test]
fn test_invalid_env_value_fails_validation() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let temp = TempDir::new().unwrap();

    let _env = EnvGuard::set(&[("DOCNAV__RESOLVER__MAX_ATTEMPTS", "0")]);
    let result = ConfigLoader::new(temp.path()).with_global(false).load();
    assert!(result.is_err());
}

#[test]
fn test_logging_section_from_file() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join(WORKSPACE_CONFIG_FILE),
        "[logging]\nenabled = true\nlevel = \"debug\"\nformat = \"json\"\n",
    )
    .unwrap();

    let config = ConfigLoader::new(temp.path()).with_global(false).load().unwrap();
    assert!(config.logging.enabled);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, "json");
    assert_eq!(config.logging.output, "stderr");
}
