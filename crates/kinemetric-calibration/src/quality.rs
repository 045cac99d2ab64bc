//! Capture-quality checks for calibration footage
//!
//! Issues are informational: they travel with the calibration result and
//! never fail a job.

use std::fmt;

use serde::{Deserialize, Serialize};

use kinemetric_core::{LandmarkFrame, LandmarkName};

use crate::CalibrationConfig;

/// Landmarks that must be clearly visible for a trustworthy calibration
pub const CRITICAL_LANDMARKS: [LandmarkName; 7] = [
    LandmarkName::Nose,
    LandmarkName::LeftShoulder,
    LandmarkName::RightShoulder,
    LandmarkName::LeftHip,
    LandmarkName::RightHip,
    LandmarkName::LeftAnkle,
    LandmarkName::RightAnkle,
];

/// Problem detected in calibration footage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QualityIssue {
    NoFrames,
    LowVisibility { landmark: LandmarkName, visibility: f64 },
    ShouldersNotLevel { difference: f64 },
}

impl fmt::Display for QualityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityIssue::NoFrames => write!(f, "no frames available for calibration"),
            QualityIssue::LowVisibility {
                landmark,
                visibility,
            } => write!(f, "low visibility on {} ({:.2})", landmark, visibility),
            QualityIssue::ShouldersNotLevel { difference } => write!(
                f,
                "shoulders not level ({:.3}); stand square to the camera",
                difference
            ),
        }
    }
}

/// Check a reference frame for calibration quality problems
pub fn check_capture_quality(
    frame: Option<&LandmarkFrame>,
    config: &CalibrationConfig,
) -> Vec<QualityIssue> {
    let Some(frame) = frame else {
        return vec![QualityIssue::NoFrames];
    };

    let mut issues: Vec<QualityIssue> = CRITICAL_LANDMARKS
        .iter()
        .filter_map(|&landmark| {
            let visibility = frame.visibility(landmark).unwrap_or(0.0);
            (visibility < config.quality_visibility).then_some(QualityIssue::LowVisibility {
                landmark,
                visibility,
            })
        })
        .collect();

    if let Some((left, right)) = frame.pair(LandmarkName::LeftShoulder, LandmarkName::RightShoulder)
    {
        let difference = (left.y - right.y).abs();
        if difference > config.max_shoulder_level_diff {
            issues.push(QualityIssue::ShouldersNotLevel { difference });
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinemetric_core::Landmark;

    fn full_frame(visibility: f64) -> LandmarkFrame {
        let mut frame = LandmarkFrame::new(0);
        for &name in CRITICAL_LANDMARKS.iter() {
            frame.insert(name, Landmark::new(0.5, 0.5, 0.0, visibility));
        }
        frame
    }

    #[test]
    fn test_clean_frame() {
        let config = CalibrationConfig::default();
        assert!(check_capture_quality(Some(&full_frame(0.95)), &config).is_empty());
    }

    #[test]
    fn test_reports_issues() {
        let config = CalibrationConfig::default();
        assert_eq!(check_capture_quality(None, &config), vec![QualityIssue::NoFrames]);

        let issues = check_capture_quality(Some(&full_frame(0.55)), &config);
        assert_eq!(issues.len(), CRITICAL_LANDMARKS.len());

        let mut frame = full_frame(0.9);
        frame.insert(LandmarkName::RightShoulder, Landmark::new(0.6, 0.6, 0.0, 0.9));
        let issues = check_capture_quality(Some(&frame), &config);
        assert!(matches!(issues[0], QualityIssue::ShouldersNotLevel { .. }));
    }
}
