//! Squat: depth and trunk control

use kinemetric_calibration::AppliedCalibration;
use kinemetric_core::{lean_from_vertical, AssessmentType, LandmarkFrame, LandmarkName};

use super::{center, hip_center, mean_knee_angle};
use crate::{
    Band, Calculator, Extremum, FeedbackBuilder, MeasurementResult, Measurements, ScoreSheet,
    SquatRubric, Unit,
};

/// Squat calculator
#[derive(Debug, Clone, Default)]
pub struct SquatCalculator {
    rubric: SquatRubric,
}

impl SquatCalculator {
    pub fn new(rubric: SquatRubric) -> Self {
        Self { rubric }
    }

    pub fn rubric(&self) -> &SquatRubric {
        &self.rubric
    }

    /// ROM sub-score from the minimum knee angle
    pub fn rom_score(&self, min_knee_angle: f64) -> f64 {
        let r = &self.rubric;
        100.0 * (1.0 - (min_knee_angle - r.optimal_knee_angle).abs() / r.knee_angle_tolerance)
    }

    /// Trunk sub-score from the maximum lean
    pub fn trunk_score(&self, max_lean: f64) -> f64 {
        let r = &self.rubric;
        100.0 - r.lean_penalty * (max_lean - r.lean_tolerance).max(0.0)
    }
}

impl Calculator for SquatCalculator {
    fn assessment(&self) -> AssessmentType {
        AssessmentType::Squat
    }

    fn compute(&self, frames: &[LandmarkFrame], calibration: &AppliedCalibration) -> MeasurementResult {
        let r = &self.rubric;
        let factor = calibration.general;
        let mut min_knee = Extremum::min();
        let mut max_lean = Extremum::max();

        for (pos, frame) in frames.iter().enumerate() {
            if let Some(knee) = mean_knee_angle(frame, factor) {
                min_knee.observe(knee, pos, frame.index);
            }
            let shoulders = center(
                frame,
                LandmarkName::LeftShoulder,
                LandmarkName::RightShoulder,
                factor,
            );
            if let (Some(shoulders), Some(hips)) = (shoulders, hip_center(frame, factor)) {
                max_lean.observe(lean_from_vertical(shoulders, hips), pos, frame.index);
            }
        }

        if min_knee.value().is_none() && max_lean.value().is_none() {
            return MeasurementResult::insufficient(
                AssessmentType::Squat,
                calibration,
                &[
                    ("min_knee_angle", Unit::Degrees),
                    ("max_trunk_lean", Unit::Degrees),
                ],
                &[("rom", 100.0), ("trunk", 100.0), ("control", 100.0)],
            );
        }

        let mut sheet = ScoreSheet::new();
        let rom = sheet.component(
            "rom",
            min_knee.value().map_or(0.0, |v| self.rom_score(v)),
            100.0,
            r.rom_weight,
        );
        sheet.component(
            "trunk",
            max_lean.value().map_or(0.0, |v| self.trunk_score(v)),
            100.0,
            r.trunk_weight,
        );
        sheet.component("control", r.control_score, 100.0, r.control_weight);
        let composite = sheet.composite();

        let mut feedback = FeedbackBuilder::new();
        match min_knee.value() {
            Some(v) => {
                feedback.when(
                    v > r.shallow_depth_angle,
                    format!(
                        "Squat depth is limited (knee angle {:.0}°). Aim to bring the thighs toward parallel.",
                        v
                    ),
                );
            }
            None => {
                feedback.push("Knee angle could not be measured; keep hips, knees and ankles in view.");
            }
        }
        match max_lean.value() {
            Some(v) => {
                feedback.when(
                    v > r.excessive_lean,
                    format!(
                        "Excessive forward trunk lean ({:.0}°). Keep the chest up and brace the core.",
                        v
                    ),
                );
            }
            None => {
                feedback.push("Trunk lean could not be measured; keep shoulders and hips in view.");
            }
        }
        let feedback = feedback.finish(
            composite,
            &[
                Band::at_least(r.good_band, "Excellent squat mechanics."),
                Band::at_least(r.fair_band, "Solid squat pattern with room to refine."),
            ],
            "Work on squat control: slow the descent and hold the bottom position with a neutral spine.",
        );

        let mut measurements = Measurements::new();
        measurements
            .push("min_knee_angle", min_knee.value(), Unit::Degrees)
            .push("max_trunk_lean", max_lean.value(), Unit::Degrees)
            .push("rom_score", Some(rom), Unit::Ratio);

        MeasurementResult {
            assessment: AssessmentType::Squat,
            measurements: measurements.into_vec(),
            sub_scores: sheet.into_sub_scores(),
            composite,
            representative_frames: [
                min_knee.frame("deepest_knee_angle"),
                max_lean.frame("max_trunk_lean"),
            ]
            .into_iter()
            .flatten()
            .collect(),
            feedback,
            calibration: *calibration,
            insufficient_data: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinemetric_core::Landmark;

    fn frame(index: usize, knee_x_offset: f64, shoulder_x: f64) -> LandmarkFrame {
        let mut f = LandmarkFrame::new(index);
        for (dx, side_hip, side_knee, side_ankle, side_sh) in [
            (
                -0.1,
                LandmarkName::LeftHip,
                LandmarkName::LeftKnee,
                LandmarkName::LeftAnkle,
                LandmarkName::LeftShoulder,
            ),
            (
                0.1,
                LandmarkName::RightHip,
                LandmarkName::RightKnee,
                LandmarkName::RightAnkle,
                LandmarkName::RightShoulder,
            ),
        ] {
            f.insert(side_hip, Landmark::new(0.5 + dx, 0.5, 0.0, 0.9));
            f.insert(side_knee, Landmark::new(0.5 + dx, 0.7, -knee_x_offset, 0.9));
            f.insert(side_ankle, Landmark::new(0.5 + dx, 0.9, 0.0, 0.9));
            f.insert(side_sh, Landmark::new(shoulder_x + dx, 0.1, 0.0, 0.9));
        }
        f
    }

    #[test]
    fn test_straight_legs_upright() {
        let calc = SquatCalculator::default();
        let frames: Vec<_> = (0..3).map(|i| frame(i, 0.0, 0.5)).collect();
        let result = calc.compute(&frames, &AppliedCalibration::default());
        assert!(!result.insufficient_data);
        assert!((result.measurement("min_knee_angle").unwrap() - 180.0).abs() < 1e-4);
        assert!(result.measurement("max_trunk_lean").unwrap().abs() < 1e-4);
        // ROM = 100 * (1 - 80/80) = 0, trunk 100, control 100
        assert!(result.sub_score("rom").unwrap().abs() < 1e-3);
        assert!((result.composite - 60.0).abs() < 1e-3);
        assert!(result.feedback[0].contains("depth"));
        assert!(result.feedback.last().unwrap().contains("control"));
    }

    #[test]
    fn test_deepest_frame_is_first_occurrence() {
        let calc = SquatCalculator::default();
        let frames = vec![frame(10, 0.0, 0.5), frame(11, 0.1, 0.5), frame(12, 0.1, 0.5)];
        let result = calc.compute(&frames, &AppliedCalibration::default());
        let deepest = result.frame("deepest_knee_angle").unwrap();
        assert_eq!(deepest.frame_index, 11);
        assert_eq!(deepest.position, 1);
    }

    #[test]
    fn test_lean_penalty() {
        let calc = SquatCalculator::default();
        assert_eq!(calc.trunk_score(10.0), 100.0);
        assert_eq!(calc.trunk_score(20.0), 60.0);
        assert_eq!(calc.rom_score(100.0), 100.0);
        assert_eq!(calc.rom_score(140.0), 50.0);
    }

    #[test]
    fn test_missing_trunk_is_skipped_not_fabricated() {
        let calc = SquatCalculator::default();
        let mut f = frame(0, 0.1, 0.5);
        f.landmarks.remove(&LandmarkName::LeftShoulder);
        let result = calc.compute(&[f], &AppliedCalibration::default());
        assert!(!result.insufficient_data);
        assert_eq!(result.measurement("max_trunk_lean"), None);
        assert_eq!(result.sub_score("trunk"), Some(0.0));
        assert!(result.frame("max_trunk_lean").is_none());
    }
}
