//! Configuration file loading.
//!
//! The configuration file is searched for in the following order:
//! 1. An explicit path (the `--config` flag)
//! 2. The `HERALD_CONFIG` environment variable
//! 3. `./herald.config.ron` (current working directory)
//! 4. `/etc/herald/herald.config.ron` (system-wide config)

use std::path::{Path, PathBuf};

use herald_delivery::{DeliveryConfig, SystemError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::summarizer::SummarizerConfig;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "HERALD_CONFIG";

/// Locations tried when neither a flag nor the environment names a file.
pub const DEFAULT_PATHS: [&str; 2] = ["./herald.config.ron", "/etc/herald/herald.config.ron"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file does not exist: {}", .0.display())]
    MissingExplicit(PathBuf),

    #[error("HERALD_CONFIG points to non-existent file: {}", .0.display())]
    MissingEnvPath(PathBuf),

    #[error("No configuration file found. Tried:\n  - HERALD_CONFIG environment variable\n{tried}")]
    NotFound { tried: String },

    #[error("Failed to read config from {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },

    #[error(transparent)]
    Invalid(#[from] SystemError),
}

/// Top-level configuration file contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeraldConfig {
    /// Delivery engine settings
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Destination addresses, in delivery order
    #[serde(default)]
    pub subscribers: Vec<String>,

    /// Backend used to summarise each briefing category
    #[serde(default)]
    pub summarizer: SummarizerConfig,
}

impl HeraldConfig {
    /// Locate the configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly named file does not exist or no
    /// default location holds one.
    pub fn find(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
        let defaults = DEFAULT_PATHS.map(PathBuf::from);
        find_in(
            explicit,
            std::env::var_os(CONFIG_ENV).map(PathBuf::from),
            &defaults,
        )
    }

    /// Read, parse and validate the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read or parsed, or the delivery
    /// settings are invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = ron::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        config.delivery.validate()?;
        Ok(config)
    }
}

fn find_in(
    explicit: Option<&Path>,
    env: Option<PathBuf>,
    defaults: &[PathBuf],
) -> Result<PathBuf, ConfigError> {
    if let Some(path) = explicit {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        return Err(ConfigError::MissingExplicit(path.to_path_buf()));
    }

    if let Some(path) = env {
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::MissingEnvPath(path));
    }

    if let Some(path) = defaults.iter().find(|path| path.exists()) {
        return Ok(path.clone());
    }

    let tried = defaults
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::NotFound { tried })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use herald_delivery::DeliveryMode;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::summarizer::SummarizerProvider;

    const SAMPLE: &str = r#"(
        delivery: (
            mode: long,
            dry_run: true,
            max_retries: 3,
        ),
        subscribers: ["+15550001", "+15550002"],
        summarizer: (provider: gemini),
    )"#;

    #[test]
    fn load_parses_and_fills_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("herald.config.ron");
        fs::write(&path, SAMPLE).expect("write config");

        let config = HeraldConfig::load(&path).expect("valid config");

        assert_eq!(config.delivery.mode, DeliveryMode::Long);
        assert!(config.delivery.dry_run);
        assert_eq!(config.delivery.max_retries, 3);
        assert_eq!(config.delivery.inter_segment_delay_seconds, 5);
        assert_eq!(config.subscribers, vec!["+15550001", "+15550002"]);
        assert_eq!(config.summarizer.provider, SummarizerProvider::Gemini);
        assert_eq!(config.summarizer.model(), "gemini-2.0-flash-exp");
    }

    #[test]
    fn load_rejects_invalid_delivery_settings() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("bad.ron");
        fs::write(&path, "(delivery: (max_retries: 0))").expect("write config");

        assert!(matches!(
            HeraldConfig::load(&path),
            Err(ConfigError::Invalid(SystemError::Configuration(_)))
        ));
    }

    #[test]
    fn load_reports_parse_errors_with_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("broken.ron");
        fs::write(&path, "(delivery: (mode: sideways))").expect("write config");

        let error = HeraldConfig::load(&path).expect_err("unknown mode");
        assert!(matches!(error, ConfigError::Parse { .. }));
        assert!(error.to_string().contains("broken.ron"));
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let config: HeraldConfig = ron::from_str("()").expect("empty struct");
        assert_eq!(config, HeraldConfig::default());
    }

    #[test]
    fn explicit_path_wins_over_environment() {
        let dir = tempfile::tempdir().expect("temp dir");
        let explicit = dir.path().join("explicit.ron");
        let from_env = dir.path().join("env.ron");
        fs::write(&explicit, "()").expect("write config");
        fs::write(&from_env, "()").expect("write config");

        let found = find_in(Some(&explicit), Some(from_env), &[]).expect("found");
        assert_eq!(found, explicit);
    }

    #[test]
    fn missing_environment_path_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("nope.ron");
        let fallback = dir.path().join("fallback.ron");
        fs::write(&fallback, "()").expect("write config");

        assert!(matches!(
            find_in(None, Some(missing), &[fallback]),
            Err(ConfigError::MissingEnvPath(_))
        ));
    }

    #[test]
    fn defaults_are_tried_in_order() {
        let dir = tempfile::tempdir().expect("temp dir");
        let first = dir.path().join("first.ron");
        let second = dir.path().join("second.ron");
        fs::write(&second, "()").expect("write config");

        let found = find_in(None, None, &[first.clone(), second.clone()]).expect("found");
        assert_eq!(found, second);

        fs::remove_file(&second).expect("remove");
        let error = find_in(None, None, &[first, second]).expect_err("nothing left");
        assert!(error.to_string().contains("first.ron"));
    }
}
