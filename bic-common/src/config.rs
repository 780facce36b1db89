//! Configuration loading
//!
//! Each setting is resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing or broken config file is logged and ignored; it never stops
//! the service from starting.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::quote_number::QuoteNumberConfig;
use crate::{Error, Result};

/// Path of the TOML config file
pub const CONFIG_FILE_ENV: &str = "BIC_CONFIG";
/// Data directory holding the database and uploaded receipts
pub const DATA_DIR_ENV: &str = "BIC_DATA_DIR";
/// HTTP listen address
pub const BIND_ADDR_ENV: &str = "BIC_BIND_ADDR";
/// Speech-to-text API key
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5740";
pub const DEFAULT_TRANSCRIPTION_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TRANSCRIPTION_MODEL: &str = "gpt-4o-mini-transcribe";

/// Speech-to-text settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_TRANSCRIPTION_URL.to_string(),
            model: DEFAULT_TRANSCRIPTION_MODEL.to_string(),
        }
    }
}

/// Contents of the TOML config file; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub data_dir: Option<PathBuf>,
    pub bind_addr: Option<String>,
    pub transcription: TranscriptionConfig,
    pub quote_numbers: QuoteNumberConfig,
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_file: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub bind_addr: Option<String>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct IntakeConfig {
    pub data_dir: PathBuf,
    pub bind_addr: String,
    pub transcription: TranscriptionConfig,
    pub quote_numbers: QuoteNumberConfig,
}

impl IntakeConfig {
    /// Defaults rooted at `data_dir`, ignoring environment and files
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            transcription: TranscriptionConfig::default(),
            quote_numbers: QuoteNumberConfig::default(),
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("bic.db")
    }

    /// Root directory for uploaded receipt files
    pub fn receipts_dir(&self) -> PathBuf {
        self.data_dir.join("receipts")
    }

    /// Reject settings the service cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.quote_numbers.max_attempts == 0 {
            return Err(Error::Config(
                "quote_numbers.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.quote_numbers.tag.trim().is_empty() {
            return Err(Error::Config("quote_numbers.tag must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Non-empty environment variable
fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Parse a TOML config file
pub fn read_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))
}

/// Platform config file location, if one exists
fn default_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("bic").join("intake.toml"));
    if let Some(path) = user_config.filter(|p| p.exists()) {
        return Some(path);
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/bic/intake.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// OS-dependent default data directory
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("bic"))
        .unwrap_or_else(|| PathBuf::from("./bic_data"))
}

/// Resolve the service configuration
pub fn load_config(cli: &CliOverrides) -> IntakeConfig {
    let config_file = cli
        .config_file
        .clone()
        .or_else(|| env_value(CONFIG_FILE_ENV).map(PathBuf::from))
        .or_else(default_config_file);

    let toml_config = match config_file {
        Some(path) => match read_toml_config(&path) {
            Ok(config) => {
                info!("Loaded config file: {}", path.display());
                config
            }
            Err(e) => {
                warn!("Ignoring config file {}: {}", path.display(), e);
                TomlConfig::default()
            }
        },
        None => {
            info!("No config file found, using defaults");
            TomlConfig::default()
        }
    };

    let data_dir = cli
        .data_dir
        .clone()
        .or_else(|| env_value(DATA_DIR_ENV).map(PathBuf::from))
        .or(toml_config.data_dir)
        .unwrap_or_else(default_data_dir);

    let bind_addr = cli
        .bind_addr
        .clone()
        .or_else(|| env_value(BIND_ADDR_ENV))
        .or(toml_config.bind_addr)
        .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

    let mut transcription = toml_config.transcription;
    if let Some(key) = env_value(OPENAI_API_KEY_ENV) {
        transcription.api_key = Some(key);
    }

    IntakeConfig {
        data_dir,
        bind_addr,
        transcription,
        quote_numbers: toml_config.quote_numbers,
    }
}
