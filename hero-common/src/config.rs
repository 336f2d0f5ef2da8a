//! Configuration file resolution and loading
//!
//! Config resolution priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. Compiled defaults (no file; fallback)

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Resolve the config file path from CLI argument and environment variable.
/// Returns `None` when neither is set (caller falls back to defaults).
pub fn resolve_config_path(cli_arg: Option<&Path>, env_var_name: &str) -> Option<PathBuf> {
    let env_path = std::env::var(env_var_name).ok().map(PathBuf::from);

    if cli_arg.is_some() && env_path.is_some() {
        warn!(
            "Config file given both on the command line and via {}; using the command line",
            env_var_name
        );
    }

    // Priority 1: command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: environment variable
    env_path
}

/// Load a TOML config from `path`, or return compiled defaults when no
/// path was resolved. A resolved path that cannot be read or parsed is a
/// hard configuration error, not a silent fallback.
pub fn load_toml<T: DeserializeOwned + Default>(path: Option<&Path>) -> Result<T> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
            let config = toml::from_str(&content)
                .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;
            info!("Configuration loaded from {}", path.display());
            Ok(config)
        }
        None => {
            info!("No config file given; using compiled defaults");
            Ok(T::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(default)]
    struct Sample {
        answer: u32,
    }

    #[test]
    fn cli_argument_wins_over_environment() {
        let cli = PathBuf::from("/tmp/cli.toml");
        // Env var unset in this test; CLI path should pass through.
        let resolved = resolve_config_path(Some(&cli), "HERO_TEST_CONFIG_UNSET");
        assert_eq!(resolved, Some(cli));
    }

    #[test]
    fn loads_defaults_without_a_path() {
        let config: Sample = load_toml(None).unwrap();
        assert_eq!(config, Sample::default());
    }

    #[test]
    fn unreadable_path_is_an_error() {
        let result: Result<Sample> = load_toml(Some(Path::new("/nonexistent/cfg.toml")));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn parses_toml_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.toml");
        std::fs::write(&path, "answer = 42\n").unwrap();
        let config: Sample = load_toml(Some(&path)).unwrap();
        assert_eq!(config.answer, 42);
    }
}
