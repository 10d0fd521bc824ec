use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads, parses and validates a configuration file
///
/// Missing optional sections (`[http]`) fall back to their defaults before
/// validation runs, so the returned value is always ready to hand to
/// [`crate::crawler::run_crawl`].
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Loaded and validated configuration
/// * `Err(ConfigError)` - The file could not be read, parsed or validated
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use depthcrawl::config::load_config;
///
/// let config = load_config(Path::new("config.toml")).unwrap();
/// println!("Downloaders: {}", config.crawler.downloaders);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from TOML text
///
/// # Returns
///
/// * `Ok(Config)` - Parsed and validated configuration
/// * `Err(ConfigError::Parse)` - Malformed TOML or a missing required key
/// * `Err(ConfigError::Validation)` - Values outside their allowed ranges
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;

    tracing::debug!(
        "Parsed configuration: depth={} downloaders={} extractors={} per_host={}",
        config.crawler.max_depth,
        config.crawler.downloaders,
        config.crawler.extractors,
        config.crawler.per_host
    );

    Ok(config)
}

/// Computes a hex-encoded SHA-256 digest of the configuration file
///
/// Logged at startup so two runs can be matched to the exact file they used.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 digest of the raw file bytes
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read(path)?;
    Ok(hex::encode(Sha256::digest(&content)))
}

/// Loads a configuration and returns both the config and its hash
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok((Config, String))` - Validated configuration and its digest
/// * `Err(ConfigError)` - Failed to load, parse or validate the configuration
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}
