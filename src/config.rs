//! Configuration surface for test generation and call synthesis.
//!
//! The values normally come from a command line; they can also be read from a
//! JSON document where every field is optional.

use crate::error::{GenerationError, GenerationResult};
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// How candidate values are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestMode {
    /// Independent uniform samples within the configured bounds
    Random,
    /// Deterministic enumeration of every combination, up to `num_tests`
    Exhaustive,
}

impl fmt::Display for TestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestMode::Random => write!(f, "random"),
            TestMode::Exhaustive => write!(f, "exhaustive"),
        }
    }
}

/// Configuration for generators, strategies and the call optimizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Generation mode for parameter tuples
    pub mode: TestMode,

    /// Number of random samples, or the cap on exhaustive combinations
    pub num_tests: usize,

    /// Inclusive lower bound for generated integers
    pub int_lower: i64,

    /// Exclusive upper bound for generated integers
    pub int_upper: i64,

    /// Smallest generated array length (inclusive)
    pub array_min_size: usize,

    /// Largest generated array length (inclusive)
    pub array_max_size: usize,

    /// Number of candidate outputs tried before falling back to real execution
    pub synthesis_budget: usize,

    /// Seed for the ChaCha8 random source
    pub seed: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            mode: TestMode::Random,
            num_tests: 100,
            int_lower: -3,
            int_upper: 3,
            array_min_size: 0,
            array_max_size: 2,
            synthesis_budget: 10,
            seed: 0,
        }
    }
}

impl GenerationConfig {
    /// Check bounds before any generator is built
    pub fn validate(&self) -> GenerationResult<()> {
        if self.int_upper <= self.int_lower {
            return Err(GenerationError::IntegerRange {
                lower: BigInt::from(self.int_lower),
                upper: BigInt::from(self.int_upper),
            });
        }
        if self.array_max_size < self.array_min_size {
            return Err(GenerationError::ArraySize {
                min: self.array_min_size,
                max: self.array_max_size,
            });
        }
        Ok(())
    }

    pub fn int_lower(&self) -> BigInt {
        BigInt::from(self.int_lower)
    }

    pub fn int_upper(&self) -> BigInt {
        BigInt::from(self.int_upper)
    }

    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: GenerationConfig =
            serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        log::debug!("Loaded generation config: {:?}", config);
        Ok(config)
    }

    /// Read and parse a JSON config file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&text)
    }
}

/// Errors loading a configuration document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Io(String),
    Parse(String),
    Invalid(GenerationError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "Failed to read config: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Failed to parse config: {}", msg),
            ConfigError::Invalid(e) => write!(f, "Invalid config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<GenerationError> for ConfigError {
    fn from(e: GenerationError) -> Self {
        ConfigError::Invalid(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = GenerationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.mode, TestMode::Random);
    }

    #[test]
    fn test_inverted_integer_bounds_rejected() {
        let config = GenerationConfig {
            int_lower: 5,
            int_upper: 5,
            ..GenerationConfig::default()
        };
        match config.validate() {
            Err(GenerationError::IntegerRange { lower, upper }) => {
                assert_eq!(lower, BigInt::from(5));
                assert_eq!(upper, BigInt::from(5));
            }
            other => panic!("Expected IntegerRange error, got {:?}", other),
        }
    }

    #[test]
    fn test_inverted_array_bounds_rejected() {
        let config = GenerationConfig {
            array_min_size: 3,
            array_max_size: 1,
            ..GenerationConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(GenerationError::ArraySize { min: 3, max: 1 })
        );
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = GenerationConfig::from_json_str(
            r#"{"mode": "exhaustive", "num_tests": 12, "int_lower": -1}"#,
        )
        .unwrap();
        assert_eq!(config.mode, TestMode::Exhaustive);
        assert_eq!(config.num_tests, 12);
        assert_eq!(config.int_lower, -1);
        assert_eq!(config.int_upper, GenerationConfig::default().int_upper);
    }

    #[test]
    fn test_json_with_inverted_bounds_is_invalid() {
        let result = GenerationConfig::from_json_str(r#"{"int_lower": 4, "int_upper": 2}"#);
        assert!(matches!(result, Err(ConfigError::Invalid(GenerationError::IntegerRange { .. }))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"synthesis_budget": 25, "seed": 7}}"#).unwrap();

        let config = GenerationConfig::load(file.path()).unwrap();
        assert_eq!(config.synthesis_budget, 25);
        assert_eq!(config.seed, 7);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = GenerationConfig::load(dir.path().join("absent.json"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
