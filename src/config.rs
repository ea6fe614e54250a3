//! Runtime configuration.
//!
//! Resolution order: explicit path, `SIGNBANK_CORE_CONFIG`, the per-user
//! config file, compiled defaults. A missing file falls back to defaults;
//! a malformed one is an error.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;

pub const CONFIG_ENV: &str = "SIGNBANK_CORE_CONFIG";
pub const STORE_ENV: &str = "SIGNBANK_CORE_STORE";

fn default_store_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("signbank-core").join("store.json"))
        .unwrap_or_else(|| PathBuf::from("signbank_store.json"))
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_revision_user() -> String {
    "csv-import".to_string()
}

fn default_open_quote() -> String {
    "“".to_string()
}

fn default_close_quote() -> String {
    "”".to_string()
}

/// Marker pair delimiting the free text of an example sentence tuple,
/// `“`/`”` unless configured otherwise.
///
/// The text ends at the first occurrence of `close` followed by the tuple's
/// closing parenthesis, so it may contain plain double quotes, commas and
/// parentheses. Texts containing `close` itself are refused on write.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct QuoteMarkers {
    #[serde(default = "default_open_quote")]
    pub open: String,

    #[serde(default = "default_close_quote")]
    pub close: String,
}

impl Default for QuoteMarkers {
    fn default() -> Self {
        QuoteMarkers {
            open: default_open_quote(),
            close: default_close_quote(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_revision_user")]
    pub revision_user: String,

    #[serde(default)]
    pub sentence_quote: QuoteMarkers,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            store_path: default_store_path(),
            log_level: default_log_level(),
            revision_user: default_revision_user(),
            sentence_quote: QuoteMarkers::default(),
        }
    }
}

fn user_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("signbank-core").join("config.toml"))
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Config> {
        Ok(toml::from_str::<Config>(text)?)
    }

    pub fn load_file(path: &Path) -> Result<Config> {
        let text = fs::read_to_string(path)?;
        Config::from_toml(&text)
    }

    pub fn resolve(explicit: Option<&Path>) -> Result<Config> {
        let candidate = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var(CONFIG_ENV).ok().map(PathBuf::from))
            .or_else(user_config_file);

        let mut config = match candidate {
            Some(path) if path.exists() => {
                info!("loading config from {}", path.display());
                Config::load_file(&path)?
            }
            Some(path) => {
                warn!("config file {} not found, using defaults", path.display());
                Config::default()
            }
            None => Config::default(),
        };

        if let Ok(store) = std::env::var(STORE_ENV) {
            if !store.trim().is_empty() {
                config.store_path = PathBuf::from(store);
            }
        }

        Ok(config)
    }
}
