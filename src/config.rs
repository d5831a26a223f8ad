//! Defines the configuration settings for the chat-contact-parser application.
//!
//! Values are resolved in three layers: built-in defaults, then an optional
//! TOML file, then command line / environment overrides.

use crate::scoring::ScoringWeights;
use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::Path;

const DEFAULT_CONFIG_PATHS: [&str; 2] = ["./contact-parser.toml", "./config.toml"];

/// TOML Configuration file structure
#[derive(Deserialize, Debug, Default)]
pub(crate) struct ConfigFile {
    scoring: Option<ScoringConfig>,
    server: Option<ServerConfig>,
    batch: Option<BatchConfig>,
}

#[derive(Deserialize, Debug, Default)]
struct ScoringConfig {
    name: Option<u8>,
    phone: Option<u8>,
    address: Option<u8>,
    pincode: Option<u8>,
    city: Option<u8>,
    state: Option<u8>,
}

#[derive(Deserialize, Debug, Default)]
struct ServerConfig {
    port: Option<u16>,
    max_concurrency: Option<usize>,
}

#[derive(Deserialize, Debug, Default)]
struct BatchConfig {
    workers: Option<usize>,
    validate: Option<bool>,
}

/// Values supplied on the command line (or through their environment
/// variables). `None` leaves the file or default value in place.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub port: Option<u16>,
    pub max_concurrency: Option<usize>,
    pub workers: Option<usize>,
    pub validate: bool,
}

/// Application configuration settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Points awarded per populated field in the confidence score.
    pub weights: ScoringWeights,
    /// Port the HTTP API listens on.
    pub server_port: u16,
    /// Maximum number of requests the HTTP API parses at once.
    pub max_concurrency: usize,
    /// Maximum number of messages parsed at once in batch mode.
    pub batch_workers: usize,
    /// Run the strict validator on every batch record.
    pub validate_in_batch: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            weights: ScoringWeights::default(),
            server_port: 8080,
            max_concurrency: 16,
            batch_workers: 8,
            validate_in_batch: false,
        }
    }
}

pub(crate) fn parse_config_str(content: &str) -> Result<ConfigFile, toml::de::Error> {
    toml::from_str(content)
}

/// Load configuration from a TOML file
pub(crate) fn load_config_file(file_path: &str) -> anyhow::Result<ConfigFile> {
    let path = Path::new(file_path);
    if !path.exists() {
        tracing::warn!("Configuration file {} not found, using defaults", file_path);
        return Ok(ConfigFile::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", file_path))?;

    let config = parse_config_str(&content)
        .with_context(|| format!("Failed to parse TOML configuration from {}", file_path))?;

    tracing::info!("Loaded configuration from {}", file_path);
    Ok(config)
}

pub(crate) fn apply_file_config(config: &mut Config, file_config: &ConfigFile) {
    if let Some(scoring) = &file_config.scoring {
        let weights = &mut config.weights;
        if let Some(name) = scoring.name {
            weights.name = name;
        }
        if let Some(phone) = scoring.phone {
            weights.phone = phone;
        }
        if let Some(address) = scoring.address {
            weights.address = address;
        }
        if let Some(pincode) = scoring.pincode {
            weights.pincode = pincode;
        }
        if let Some(city) = scoring.city {
            weights.city = city;
        }
        if let Some(state) = scoring.state {
            weights.state = state;
        }
    }

    if let Some(server) = &file_config.server {
        if let Some(port) = server.port {
            config.server_port = port;
        }
        if let Some(concurrency) = server.max_concurrency {
            config.max_concurrency = concurrency;
        }
    }

    if let Some(batch) = &file_config.batch {
        if let Some(workers) = batch.workers {
            config.batch_workers = workers;
        }
        if let Some(validate) = batch.validate {
            config.validate_in_batch = validate;
        }
    }
}

/// Apply command line arguments to the Config instance
pub(crate) fn apply_overrides(config: &mut Config, overrides: &ConfigOverrides) {
    if let Some(port) = overrides.port {
        config.server_port = port;
    }
    if let Some(concurrency) = overrides.max_concurrency {
        config.max_concurrency = concurrency;
    }
    if let Some(workers) = overrides.workers {
        config.batch_workers = workers;
    }
    if overrides.validate {
        config.validate_in_batch = true;
    }
}

pub(crate) fn validate_config(config: &mut Config) {
    if config.max_concurrency == 0 {
        config.max_concurrency = 1;
        tracing::warn!("Concurrency was set to 0. Setting to 1.");
    }

    if config.batch_workers == 0 {
        config.batch_workers = 1;
        tracing::warn!("Batch workers was set to 0. Setting to 1.");
    }

    let total = config.weights.total();
    if total != 100 {
        tracing::warn!(
            "Scoring weights sum to {} instead of 100. Confidence is still capped at 100.",
            total
        );
    }
}

/// Builds the effective configuration.
///
/// With an explicit path, a file that exists but cannot be read or parsed is
/// an error. Without one, the default locations are tried in order and
/// unusable files are skipped with a warning.
pub fn build_config(config_path: Option<&str>, overrides: &ConfigOverrides) -> anyhow::Result<Config> {
    let mut config = Config::default();

    if let Some(file_path) = config_path {
        let file_config = load_config_file(file_path)?;
        apply_file_config(&mut config, &file_config);
    } else {
        for path in DEFAULT_CONFIG_PATHS.iter() {
            if Path::new(path).exists() {
                match load_config_file(path) {
                    Ok(file_config) => {
                        apply_file_config(&mut config, &file_config);
                        break;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load configuration from {}: {:#}", path, e);
                    }
                }
            }
        }
    }

    apply_overrides(&mut config, overrides);

    validate_config(&mut config);

    tracing::debug!("Final configuration: {:?}", config);

    Ok(config)
}
