//! Application configuration.
//!
//! Three layers, later wins: built-in defaults, an optional JSON config
//! file, then command-line flags. Resolution is a pure function over the
//! parsed layers; only `load_config_file` touches the filesystem.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::account::default_account_store;
use crate::types::ReviewConfig;

/// Config filename within the config directory.
const CONFIG_FILENAME: &str = "config.json";

// ============================================================================
// TYPES
// ============================================================================

/// Error loading or resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("learned threshold must be at least 1")]
    ZeroThreshold,
}

/// One partial configuration layer. Every field is optional.
///
/// Used both for the JSON file and for command-line overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigLayer {
    /// JSON deck to use instead of the built-in deck.
    pub deck: Option<PathBuf>,
    /// Account store location.
    pub accounts: Option<PathBuf>,
    pub learned_threshold: Option<u32>,
    pub celebration_ms: Option<u64>,
    /// Where to write logs while the TUI is running.
    pub log_file: Option<PathBuf>,
}

impl ConfigLayer {
    /// Overlay `other` on top of `self`.
    pub fn merge(self, other: ConfigLayer) -> ConfigLayer {
        ConfigLayer {
            deck: other.deck.or(self.deck),
            accounts: other.accounts.or(self.accounts),
            learned_threshold: other.learned_threshold.or(self.learned_threshold),
            celebration_ms: other.celebration_ms.or(self.celebration_ms),
            log_file: other.log_file.or(self.log_file),
        }
    }
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// None means the built-in deck.
    pub deck_path: Option<PathBuf>,
    pub account_store: PathBuf,
    pub review: ReviewConfig,
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            deck_path: None,
            account_store: default_account_store(),
            review: ReviewConfig::default(),
            log_file: None,
        }
    }
}

impl AppConfig {
    /// Apply a merged layer on top of the defaults.
    pub fn resolve(layer: ConfigLayer) -> Result<AppConfig, ConfigError> {
        let defaults = AppConfig::default();

        let learned_threshold = layer
            .learned_threshold
            .unwrap_or(defaults.review.learned_threshold);
        if learned_threshold == 0 {
            return Err(ConfigError::ZeroThreshold);
        }

        let celebration = layer
            .celebration_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.review.celebration);

        Ok(AppConfig {
            deck_path: layer.deck,
            account_store: layer.accounts.unwrap_or(defaults.account_store),
            review: ReviewConfig {
                learned_threshold,
                celebration,
            },
            log_file: layer.log_file,
        })
    }
}

// ============================================================================
// FILE LOADING
// ============================================================================

/// Default config file location.
///
/// On Linux: ~/.config/vocab-retention/config.json
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vocab-retention")
        .join(CONFIG_FILENAME)
}

/// Read a config layer from `path`.
///
/// A missing file yields an empty layer unless `required` is set
/// (an explicit `--config` must exist).
pub fn load_config_file(path: &Path, required: bool) -> Result<ConfigLayer, ConfigError> {
    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => {
            return Ok(ConfigLayer::default());
        }
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let layer = serde_json::from_str(&contents).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "loaded config file");
    Ok(layer)
}

// ============================================================================
// TESTS
// ============================================================================
