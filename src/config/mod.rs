//! Configuration management.
//!
//! Provides the [`Config`] structure with type-safe parameter validation,
//! a fluent [`ConfigBuilder`], and loading from files and environment
//! variables.

pub mod core;

pub use self::core::{Config, ConfigBuilder};

use crate::core::error::Result;
use std::path::Path;

/// Default configuration file name looked up by the driver
pub const DEFAULT_CONFIG_FILE: &str = "traffic-gbdt.toml";

/// Default model file name written by the driver
pub const DEFAULT_MODEL_FILE: &str = "traffic-model.json";

/// Resolve the effective configuration: file (if given) or defaults, then
/// environment overrides, then validation.
pub fn resolve_config<P: AsRef<Path>>(path: Option<P>) -> Result<Config> {
    let Some(path) = path else {
        return Config::load_from_environment();
    };
    log::info!("Loading configuration from {}", path.as_ref().display());
    let mut config = Config::load_from_file(path)?;
    config.apply_environment_overrides()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_config_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&path, "num_leaves = 5\n").unwrap();

        let config = resolve_config(Some(&path)).unwrap();
        assert_eq!(config.num_leaves, 5);
    }

    #[test]
    fn test_resolve_config_without_file_reads_environment() {
        let config = resolve_config(None::<&str>).unwrap();
        assert_eq!(config, Config::load_from_environment().unwrap());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_resolve_config_missing_file() {
        let result = resolve_config(Some("/nonexistent/traffic-gbdt.toml"));
        assert!(result.unwrap_err().is_config_error());
    }
}
