//! Configuration management for the LoomTrack backend
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with LOOM_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Flat-file storage configuration
    pub storage: StorageConfig,

    /// Text-summary service configuration
    pub summary: SummaryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory holding the collection files
    pub data_dir: String,

    /// Roll collection file name
    pub rolls_file: String,

    /// Work-order collection file name
    pub work_orders_file: String,

    /// Maximum number of undo snapshots kept in memory
    pub history_limit: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SummaryConfig {
    /// Text-summary service endpoint
    pub api_endpoint: String,

    /// Text-summary service API key
    pub api_key: String,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("LOOM_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("storage.data_dir", "data")?
            .set_default("storage.rolls_file", "loom-data.json")?
            .set_default("storage.work_orders_file", "work-orders.json")?
            .set_default("storage.history_limit", 20)?
            .set_default("summary.api_endpoint", "")?
            .set_default("summary.api_key", "")?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (LOOM_ prefix)
            .add_source(
                Environment::with_prefix("LOOM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}
