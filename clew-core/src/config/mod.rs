//! Configuration types for Clew

use crate::ClewError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub quality: QualityConfig,
    #[serde(default)]
    pub training: TrainingConfig,
}

/// Quality thresholds applied while filtering events and alignment records.
///
/// These were hardcoded literals in earlier pipelines; they live here so
/// tests and configuration files can override them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityConfig {
    /// Minimum basecall confidence for an event to participate in
    /// calibration and normalization.
    #[serde(default = "default_min_event_confidence")]
    pub min_event_confidence: f64,
    /// Minimum fraction of the reference a record must span.
    #[serde(default = "default_min_reference_cover")]
    pub min_reference_cover: f64,
    /// Minimum fraction of the query that must be aligned.
    #[serde(default = "default_min_query_cover")]
    pub min_query_cover: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Buckets with fewer assigned reads than this are dropped before any
    /// normalization work is scheduled.
    #[serde(default = "default_reads_threshold")]
    pub reads_threshold: usize,
    /// Middle base a hairpin candidate 7-mer must carry.
    #[serde(default = "default_base_of_interest")]
    pub base_of_interest: char,
    /// Worker threads for bucket fan-out (0 = all available cores).
    #[serde(default)]
    pub threads: usize,
}

// Default value functions
fn default_min_event_confidence() -> f64 {
    0.30
}
fn default_min_reference_cover() -> f64 {
    0.8
}
fn default_min_query_cover() -> f64 {
    0.8
}
fn default_reads_threshold() -> usize {
    20
}
fn default_base_of_interest() -> char {
    'A'
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            min_event_confidence: default_min_event_confidence(),
            min_reference_cover: default_min_reference_cover(),
            min_query_cover: default_min_query_cover(),
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            reads_threshold: default_reads_threshold(),
            base_of_interest: default_base_of_interest(),
            threads: 0,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ClewError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ClewError> {
        if !(0.0..=1.0).contains(&self.quality.min_event_confidence) {
            return Err(ClewError::Configuration(format!(
                "min_event_confidence must be in [0, 1], got {}",
                self.quality.min_event_confidence
            )));
        }
        for (name, value) in [
            ("min_reference_cover", self.quality.min_reference_cover),
            ("min_query_cover", self.quality.min_query_cover),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ClewError::Configuration(format!(
                    "{} must be in [0, 1], got {}",
                    name, value
                )));
            }
        }
        if !matches!(self.training.base_of_interest, 'A' | 'T' | 'G' | 'C') {
            return Err(ClewError::Configuration(format!(
                "base_of_interest must be one of A, T, G, C, got {:?}",
                self.training.base_of_interest
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.quality.min_event_confidence, 0.30);
        assert_eq!(config.quality.min_reference_cover, 0.8);
        assert_eq!(config.quality.min_query_cover, 0.8);
        assert_eq!(config.training.reads_threshold, 20);
        assert_eq!(config.training.base_of_interest, 'A');
        assert_eq!(config.training.threads, 0);
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[training]\nreads_threshold = 5").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.training.reads_threshold, 5);
        assert_eq!(config.quality.min_event_confidence, 0.30);
    }

    #[test]
    fn test_invalid_confidence_rejected() {
        let config = Config {
            quality: QualityConfig {
                min_event_confidence: 1.5,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_base_rejected() {
        let config = Config {
            training: TrainingConfig {
                base_of_interest: 'N',
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
