//! OIE Configuration Management
//!
//! Handles configuration from environment variables and TOML files
//! with defaults suitable for interactive use.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default ceiling on the number of encoded tuples a single pattern may need
pub const DEFAULT_MAX_TABLE_SIZE: usize = 65_536;

/// Default compiled-expression size limit handed to the regex engine (64 MiB)
pub const DEFAULT_REGEX_SIZE_LIMIT: usize = 64 * 1024 * 1024;

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OieConfig {
    /// Pattern engine limits
    pub engine: EngineConfig,

    /// Named extraction patterns
    pub extractor: ExtractorConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl OieConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(size) = std::env::var("OIE_MAX_TABLE_SIZE") {
            config.engine.max_table_size = parse_env("OIE_MAX_TABLE_SIZE", size)?;
        }
        if let Ok(limit) = std::env::var("OIE_REGEX_SIZE_LIMIT") {
            config.engine.regex_size_limit = parse_env("OIE_REGEX_SIZE_LIMIT", limit)?;
        }

        // Logging
        if let Ok(level) = std::env::var("OIE_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(json) = std::env::var("OIE_LOG_JSON") {
            config.logging.json_format = parse_env("OIE_LOG_JSON", json)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        let env_config = Self::from_env()?;

        // Only override if env values differ from defaults
        if env_config.engine.max_table_size != EngineConfig::default().max_table_size {
            self.engine.max_table_size = env_config.engine.max_table_size;
        }
        if env_config.engine.regex_size_limit != EngineConfig::default().regex_size_limit {
            self.engine.regex_size_limit = env_config.engine.regex_size_limit;
        }
        if env_config.logging.level != LoggingConfig::default().level {
            self.logging.level = env_config.logging.level;
        }
        if env_config.logging.json_format {
            self.logging.json_format = true;
        }

        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.max_table_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "engine.max_table_size".to_string(),
                value: "0".to_string(),
            });
        }
        for rule in &self.extractor.patterns {
            if rule.name.trim().is_empty() {
                return Err(ConfigError::MissingRequired(format!(
                    "name for pattern {:?}",
                    rule.pattern
                )));
            }
            if !(0.0..=1.0).contains(&rule.confidence) {
                return Err(ConfigError::InvalidValue {
                    key: format!("extractor.patterns.{}.confidence", rule.name),
                    value: rule.confidence.to_string(),
                });
            }
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value,
    })
}

/// Pattern engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum size of the per-pattern encoding table
    pub max_table_size: usize,

    /// Size limit for the compiled character-level expression, in bytes
    pub regex_size_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_table_size: DEFAULT_MAX_TABLE_SIZE,
            regex_size_limit: DEFAULT_REGEX_SIZE_LIMIT,
        }
    }
}

/// A named extraction pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternRule {
    /// Rule name reported with every match
    pub name: String,

    /// Layered pattern source, e.g. `"the_word NN_pos"`
    pub pattern: String,

    /// Confidence attached to matches of this rule
    #[serde(default = "default_confidence")]
    pub confidence: f32,
}

impl PatternRule {
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
            confidence: default_confidence(),
        }
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }
}

fn default_confidence() -> f32 {
    1.0
}

/// Extractor configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Rules compiled by the extractor, in evaluation order
    pub patterns: Vec<PatternRule>,

    /// Keep overlapping matches instead of resolving them
    pub allow_overlaps: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,

    /// Include file/line in logs
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            include_location: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
