//! Calibration constants

use serde::{Deserialize, Serialize};

/// Tunable calibration policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Height assumed when it cannot be estimated from the video
    pub default_height_cm: f64,
    /// Weight of the stated height when blending with the estimate
    pub stated_height_weight: f64,
    /// Stated heights at or below this are ignored
    pub min_stated_height_cm: f64,
    /// Exclusive lower bound for a usable factor
    pub min_factor: f64,
    /// Exclusive upper bound for a usable factor
    pub max_factor: f64,
    /// Centimeters per pose coordinate unit
    pub pose_unit_cm: f64,
    /// Visibility below which a critical landmark is reported
    pub quality_visibility: f64,
    /// Maximum shoulder height difference (pose units) before reporting
    pub max_shoulder_level_diff: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            default_height_cm: 175.0,
            stated_height_weight: 0.8,
            min_stated_height_cm: 100.0,
            min_factor: 0.2,
            max_factor: 5.0,
            pose_unit_cm: 100.0,
            quality_visibility: 0.6,
            max_shoulder_level_diff: 0.05,
        }
    }
}

impl CalibrationConfig {
    /// Whether `factor` lies strictly inside the validity band
    pub fn in_band(&self, factor: f64) -> bool {
        factor.is_finite() && factor > self.min_factor && factor < self.max_factor
    }

    /// Stated height if it is plausible enough to use
    pub fn usable_stated_height(&self, stated: Option<f64>) -> Option<f64> {
        stated.filter(|h| h.is_finite() && *h > self.min_stated_height_cm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_is_exclusive() {
        let config = CalibrationConfig::default();
        assert!(config.in_band(1.0));
        assert!(!config.in_band(0.2));
        assert!(!config.in_band(5.0));
        assert!(!config.in_band(f64::NAN));
    }

    #[test]
    fn test_stated_height_floor() {
        let config = CalibrationConfig::default();
        assert_eq!(config.usable_stated_height(Some(100.0)), None);
        assert_eq!(config.usable_stated_height(Some(180.0)), Some(180.0));
        assert_eq!(config.usable_stated_height(None), None);
    }
}
