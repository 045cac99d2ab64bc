//! Runtime configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use kinemetric_calibration::CalibrationConfig;
use kinemetric_metrics::RubricConfig;

use crate::ConfigError;

/// Admission control settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Credits debited per submitted assessment
    pub units_per_assessment: u32,
    /// Credits debited for a paired left/right stance submission
    pub paired_stance_units: u32,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            units_per_assessment: 1,
            paired_stance_units: 2,
        }
    }
}

/// Logging bootstrap settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Everything a running pipeline needs
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub calibration: CalibrationConfig,
    pub rubrics: RubricConfig,
    pub orchestrator: OrchestratorConfig,
    pub logging: LoggingConfig,
}

impl RuntimeConfig {
    /// Parse a JSON document; missing keys take defaults
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.orchestrator.units_per_assessment, 1);
        assert_eq!(config.orchestrator.paired_stance_units, 2);
        assert_eq!(config.calibration.default_height_cm, 175.0);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_document() {
        let config = RuntimeConfig::from_json_str(
            r#"{ "calibration": { "default_height_cm": 170.0 }, "logging": { "json": true } }"#,
        )
        .unwrap();
        assert_eq!(config.calibration.default_height_cm, 170.0);
        assert_eq!(config.calibration.max_factor, 5.0);
        assert!(config.logging.json);
        assert_eq!(config.rubrics, RubricConfig::default());
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(RuntimeConfig::from_json_str("{}").unwrap(), RuntimeConfig::default());
    }

    #[test]
    fn test_bad_document() {
        assert!(matches!(
            RuntimeConfig::from_json_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            RuntimeConfig::load("/nonexistent/kinemetric.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
