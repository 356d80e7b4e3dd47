use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::script::SCRIPT_DIRECT_PUSH_MAX;
use crate::types::common::{CodecLimits, DEFAULT_METADATA_MAX_LEN};

/// Application configuration loaded from coinspark.toml or environment variables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub codec: CodecConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodecConfig {
    pub metadata_max_len: usize,
    pub max_transfers: usize,
    pub script_max_payload: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when RUST_LOG is not set
    pub filter: String,
}

impl Default for CodecConfig {
    fn default() -> Self {
        let limits = CodecLimits::default();
        Self {
            metadata_max_len: DEFAULT_METADATA_MAX_LEN,
            max_transfers: limits.max_transfers,
            script_max_payload: SCRIPT_DIRECT_PUSH_MAX,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "error".to_string(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            codec: CodecConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from coinspark.toml and environment variables.
    /// Environment variables take precedence over file configuration
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new("coinspark"), false)
    }

    /// Load with an explicit config file, which must exist when `required`
    pub fn load_from(path: &Path, required: bool) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Config::builder()
            .set_default("codec.metadata_max_len", defaults.codec.metadata_max_len as i64)?
            .set_default("codec.max_transfers", defaults.codec.max_transfers as i64)?
            .set_default(
                "codec.script_max_payload",
                defaults.codec.script_max_payload as i64,
            )?
            .set_default("logging.filter", defaults.logging.filter)?
            .add_source(File::from(path).required(required))
            // COINSPARK__CODEC__METADATA_MAX_LEN and friends
            .add_source(Environment::with_prefix("COINSPARK").separator("__"))
            .build()?;

        let app_config: AppConfig = config.try_deserialize()?;
        app_config.validate()?;
        Ok(app_config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.codec.script_max_payload == 0 || self.codec.script_max_payload > SCRIPT_DIRECT_PUSH_MAX {
            return Err(ConfigError::Message(format!(
                "codec.script_max_payload must be between 1 and {}",
                SCRIPT_DIRECT_PUSH_MAX
            )));
        }

        if self.codec.metadata_max_len > self.codec.script_max_payload {
            return Err(ConfigError::Message(format!(
                "codec.metadata_max_len {} exceeds codec.script_max_payload {}",
                self.codec.metadata_max_len, self.codec.script_max_payload
            )));
        }

        Ok(())
    }

    /// Get default config values for CLI argument defaults
    pub fn get_defaults() -> Self {
        Self::load().unwrap_or_default()
    }

    pub fn limits(&self) -> CodecLimits {
        CodecLimits {
            metadata_max_len: self.codec.metadata_max_len,
            max_transfers: self.codec.max_transfers,
        }
    }
}
