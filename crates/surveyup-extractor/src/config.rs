//! Configuration for the Extractor

use serde::{Deserialize, Serialize};

/// Configuration for the Extractor
///
/// Sizes are counted in characters, not bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Maximum chunk size (characters)
    pub max_chunk_size: usize,

    /// How far back from a naive cut to look for a question boundary (characters)
    pub lookback: usize,
}

impl ExtractorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_chunk_size == 0 {
            return Err("max_chunk_size must be greater than 0".to_string());
        }
        if self.lookback == 0 {
            return Err("lookback must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            max_chunk_size: 20_000,
            lookback: 4_000,
        }
    }
}

impl ExtractorConfig {
    /// Aggressive preset: smaller chunks, so each oracle response stays short
    pub fn aggressive() -> Self {
        Self {
            max_chunk_size: 10_000,
            lookback: 3_000,
        }
    }

    /// Lenient preset: larger chunks for more context per call
    pub fn lenient() -> Self {
        Self {
            max_chunk_size: 30_000,
            lookback: 5_000,
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ExtractorConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_aggressive_config_is_valid() {
        let config = ExtractorConfig::aggressive();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_lenient_config_is_valid() {
        let config = ExtractorConfig::lenient();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_max_chunk_size() {
        let mut config = ExtractorConfig::default();
        config.max_chunk_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_lookback() {
        let mut config = ExtractorConfig::default();
        config.lookback = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ExtractorConfig::lenient();
        let toml_str = config.to_toml().unwrap();
        let parsed = ExtractorConfig::from_toml(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed = ExtractorConfig::from_toml("max_chunk_size = 500").unwrap();
        assert_eq!(parsed.max_chunk_size, 500);
        assert_eq!(parsed.lookback, ExtractorConfig::default().lookback);
    }
}
