//! Service configuration.
//!
//! Hierarchical loading with figment, lowest to highest precedence:
//! 1. Programmatic defaults (`ServiceConfig::default()`)
//! 2. An optional YAML file
//! 3. Environment variables with the `APPCONFIG_` prefix, `__` as the
//!    nesting separator (`APPCONFIG_LISTING__DEFAULT_LIMIT=25`)

use std::path::Path;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ENV_PREFIX: &str = "APPCONFIG_";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid listing.default_limit: {0}. Must be at least 1")]
    InvalidDefaultLimit(usize),

    #[error("invalid listing.max_limit: {max} is below listing.default_limit {default}")]
    MaxBelowDefault { max: usize, default: usize },

    #[error("invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("failed to load configuration")]
    Load(#[source] Box<figment::Error>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub listing: ListingConfig,
    pub logging: LoggingConfig,
}

/// Page size policy for `list_applications`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    /// Used when a query asks for `limit == 0`.
    pub default_limit: usize,
    /// Larger limits are clamped to this.
    pub max_limit: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            default_limit: 64,
            max_limit: 1024,
        }
    }
}

impl ListingConfig {
    pub fn effective_limit(&self, requested: usize) -> usize {
        match requested {
            0 => self.default_limit,
            n => n.min(self.max_limit),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default directive for the tracing filter; `RUST_LOG` still wins.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load defaults, then `path` (if given), then the environment.
    pub fn load(path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(ServiceConfig::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        let config: ServiceConfig = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| ConfigError::Load(Box::new(e)))?;

        Self::validate(&config)?;
        Ok(config)
    }

    pub fn validate(config: &ServiceConfig) -> Result<(), ConfigError> {
        Self::validate_listing(&config.listing)?;

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        Ok(())
    }

    pub fn validate_listing(listing: &ListingConfig) -> Result<(), ConfigError> {
        if listing.default_limit == 0 {
            return Err(ConfigError::InvalidDefaultLimit(listing.default_limit));
        }
        if listing.max_limit < listing.default_limit {
            return Err(ConfigError::MaxBelowDefault {
                max: listing.max_limit,
                default: listing.default_limit,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use rstest::rstest;

    #[test]
    fn test_default_config() {
        let config = ServiceConfig::default();
        assert_eq!(config.listing.default_limit, 64);
        assert_eq!(config.listing.max_limit, 1024);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        ConfigLoader::validate(&config).expect("default config should be valid");
    }

    #[test]
    fn test_yaml_parsing_fills_missing_sections() {
        let yaml = r"
listing:
  default_limit: 10
logging:
  format: json
";
        let config: ServiceConfig = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.listing.default_limit, 10);
        assert_eq!(config.listing.max_limit, 1024);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_file_then_env_precedence() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "appconfig.yaml",
                r"
listing:
  default_limit: 10
  max_limit: 100
logging:
  level: debug
",
            )?;
            jail.set_env("APPCONFIG_LISTING__MAX_LIMIT", "50");

            let config = ConfigLoader::load(Some(Path::new("appconfig.yaml")))
                .map_err(|e| e.to_string())?;

            assert_eq!(config.listing.default_limit, 10);
            assert_eq!(config.listing.max_limit, 50);
            assert_eq!(config.logging.level, "debug");
            Ok(())
        });
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        Jail::expect_with(|_jail| {
            let config = ConfigLoader::load(None).map_err(|e| e.to_string())?;
            assert_eq!(config, ServiceConfig::default());
            Ok(())
        });
    }

    #[test]
    fn test_invalid_env_value_is_load_error() {
        Jail::expect_with(|jail| {
            jail.set_env("APPCONFIG_LISTING__DEFAULT_LIMIT", "lots");
            let result = ConfigLoader::load(None);
            assert!(matches!(result, Err(ConfigError::Load(_))));
            Ok(())
        });
    }

    #[rstest]
    #[case::zero_default(0, 10, "info")]
    #[case::max_below_default(20, 10, "info")]
    #[case::bad_level(10, 20, "verbose")]
    fn test_validate_rejects(#[case] default_limit: usize, #[case] max_limit: usize, #[case] level: &str) {
        let config = ServiceConfig {
            listing: ListingConfig {
                default_limit,
                max_limit,
            },
            logging: LoggingConfig {
                level: level.to_string(),
                format: LogFormat::Pretty,
            },
        };
        assert!(ConfigLoader::validate(&config).is_err());
    }

    #[rstest]
    #[case::zero_means_default(0, 64)]
    #[case::within_bounds(10, 10)]
    #[case::clamped(5000, 1024)]
    fn test_effective_limit(#[case] requested: usize, #[case] expected: usize) {
        assert_eq!(ListingConfig::default().effective_limit(requested), expected);
    }
}
