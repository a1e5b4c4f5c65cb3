//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::EdgeConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Base domain override, as supplied by the hosting environment.
pub const SUBDOMAIN_BASE_ENV: &str = "SUBDOMAIN_BASE";
pub const BIND_ADDRESS_ENV: &str = "EDGE_BIND_ADDRESS";
pub const ORIGIN_ADDRESS_ENV: &str = "EDGE_ORIGIN_ADDRESS";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load a TOML file, apply environment overrides, then validate.
pub fn load_config(path: &Path) -> Result<EdgeConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config = parse_config(&content)?;
    finish(config, |key| std::env::var(key).ok())
}

/// Defaults plus environment overrides, for deployments without a file.
pub fn load_from_env() -> Result<EdgeConfig, ConfigError> {
    finish(EdgeConfig::default(), |key| std::env::var(key).ok())
}

/// Parse TOML without touching the environment or validating.
pub fn parse_config(content: &str) -> Result<EdgeConfig, ConfigError> {
    toml::from_str(content).map_err(ConfigError::Parse)
}

/// Overlay environment values onto `config`. Empty values are ignored.
pub fn apply_env_overrides<F>(config: &mut EdgeConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(base) = lookup(SUBDOMAIN_BASE_ENV) {
        config.rewrite.subdomain_base = base.trim().to_string();
    }
    if let Some(addr) = lookup(BIND_ADDRESS_ENV) {
        config.listener.bind_address = addr;
    }
    if let Some(addr) = lookup(ORIGIN_ADDRESS_ENV) {
        config.origin.address = addr;
    }
}

fn finish<F>(mut config: EdgeConfig, lookup: F) -> Result<EdgeConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    apply_env_overrides(&mut config, lookup);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}
