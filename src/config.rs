//! Normalizer settings read from `feednorm.toml`.
//!
//! Every key is optional. An absent file, an empty file or a missing key
//! falls back to the built-in defaults (240-character descriptions, `...`
//! ellipsis, built-in tracking list only). Keys the normalizer does not know
//! are reported with a warning and otherwise ignored.
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

use crate::util::{DEFAULT_DESCRIPTION_LIMIT, ELLIPSIS};

/// Largest settings file accepted, in bytes.
const MAX_CONFIG_BYTES: u64 = 64 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: more than {limit} bytes")]
    TooLarge { limit: u64 },

    #[error("Invalid value for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// How descriptions are bounded and links are cleaned.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum entry description length in characters, ellipsis included.
    pub description_limit: usize,

    pub ellipsis: String,

    /// Query parameters removed from links on top of the built-in tracking list.
    pub extra_tracking_params: Vec<String>,

    /// Drop `#fragment` parts from links.
    pub strip_fragments: bool,

    /// Pretty-print CLI output. `--pretty` turns it on regardless.
    pub pretty: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            description_limit: DEFAULT_DESCRIPTION_LIMIT,
            ellipsis: ELLIPSIS.to_string(),
            extra_tracking_params: Vec::new(),
            strip_fragments: false,
            pretty: false,
        }
    }
}

const KNOWN_KEYS: &[&str] = &[
    "description_limit",
    "ellipsis",
    "extra_tracking_params",
    "strip_fragments",
    "pretty",
];

impl Config {
    /// Reads settings from `path`. A file that does not exist yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let file = match std::fs::File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        // Read one byte past the limit so an oversized file is detected without
        // loading it whole.
        let mut content = String::new();
        file.take(MAX_CONFIG_BYTES + 1).read_to_string(&mut content)?;
        if content.len() as u64 > MAX_CONFIG_BYTES {
            return Err(ConfigError::TooLarge {
                limit: MAX_CONFIG_BYTES,
            });
        }

        let config = Self::from_toml(&content)?;
        tracing::info!(
            path = %path.display(),
            description_limit = config.description_limit,
            extra_tracking_params = config.extra_tracking_params.len(),
            strip_fragments = config.strip_fragments,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Parses settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = content.parse()?;
        for key in table.keys().filter(|k| !KNOWN_KEYS.contains(&k.as_str())) {
            tracing::warn!(key = %key, "Unknown config key, ignoring");
        }

        let config: Config = toml::Value::Table(table).try_into()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let ellipsis_len = self.ellipsis.chars().count();
        if self.description_limit <= ellipsis_len {
            return Err(ConfigError::Invalid {
                key: "description_limit",
                reason: format!(
                    "{} leaves no room next to a {}-character ellipsis",
                    self.description_limit, ellipsis_len
                ),
            });
        }
        if let Some(param) = self
            .extra_tracking_params
            .iter()
            .find(|p| p.trim().is_empty() || p.contains(['=', '&']))
        {
            return Err(ConfigError::Invalid {
                key: "extra_tracking_params",
                reason: format!("{param:?} is not a query parameter name"),
            });
        }
        Ok(())
    }
}
