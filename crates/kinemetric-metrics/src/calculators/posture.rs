//! Static posture: frontal symmetry and sagittal alignment

use kinemetric_calibration::AppliedCalibration;
use kinemetric_core::{distance, horizontal_tilt, AssessmentType, LandmarkFrame, LandmarkName};

use super::{center, hip_center};
use crate::{
    Band, Calculator, Extremum, FeedbackBuilder, Mean, MeasurementResult, Measurements,
    PostureRubric, ScoreSheet, Unit,
};

/// Posture calculator
#[derive(Debug, Clone, Default)]
pub struct PostureCalculator {
    rubric: PostureRubric,
}

impl PostureCalculator {
    pub fn new(rubric: PostureRubric) -> Self {
        Self { rubric }
    }

    /// Alignment score from mean absolute shoulder and hip tilt
    pub fn alignment_score(&self, shoulder_tilt: Option<f64>, hip_tilt: Option<f64>) -> f64 {
        let tilt = match (shoulder_tilt, hip_tilt) {
            (Some(s), Some(h)) => (s + h) / 2.0,
            (Some(v), None) | (None, Some(v)) => v,
            (None, None) => return 0.0,
        };
        100.0 - self.rubric.tilt_penalty * tilt
    }
}

/// Which side sits lower for a signed tilt
fn lower_side(signed_tilt: f64) -> &'static str {
    if signed_tilt >= 0.0 {
        "right"
    } else {
        "left"
    }
}

impl Calculator for PostureCalculator {
    fn assessment(&self) -> AssessmentType {
        AssessmentType::Posture
    }

    fn compute(&self, frames: &[LandmarkFrame], calibration: &AppliedCalibration) -> MeasurementResult {
        let r = &self.rubric;
        let factor = calibration.general;

        let mut shoulder_abs = Mean::default();
        let mut shoulder_signed = Mean::default();
        let mut hip_abs = Mean::default();
        let mut hip_signed = Mean::default();
        let mut ap_abs = Mean::default();
        let mut ap_signed = Mean::default();
        let mut shift_abs = Mean::default();
        let mut shift_signed = Mean::default();
        let mut worst_shoulder = Extremum::max();
        let mut worst_hip = Extremum::max();

        for (pos, frame) in frames.iter().enumerate() {
            if let Some((l, r)) = frame.pair(LandmarkName::LeftShoulder, LandmarkName::RightShoulder) {
                let tilt = horizontal_tilt(l * factor, r * factor);
                shoulder_abs.push(tilt.abs());
                shoulder_signed.push(tilt);
                worst_shoulder.observe(tilt.abs(), pos, frame.index);
            }

            let Some((lh, rh)) = frame.pair(LandmarkName::LeftHip, LandmarkName::RightHip) else {
                continue;
            };
            let tilt = horizontal_tilt(lh * factor, rh * factor);
            hip_abs.push(tilt.abs());
            hip_signed.push(tilt);
            worst_hip.observe(tilt.abs(), pos, frame.index);

            let hip_width = distance(lh * factor, rh * factor);
            if hip_width <= 0.0 {
                continue;
            }
            let ankles = center(frame, LandmarkName::LeftAnkle, LandmarkName::RightAnkle, factor);
            let (Some(ankles), Some(hips)) = (ankles, hip_center(frame, factor)) else {
                continue;
            };
            if let Some(nose) = frame.get_scaled(LandmarkName::Nose, factor) {
                let ap = (nose.z - ankles.z) / hip_width;
                ap_abs.push(ap.abs());
                ap_signed.push(ap);
            }
            let shift = (hips.x - ankles.x) / hip_width;
            shift_abs.push(shift.abs());
            shift_signed.push(shift);
        }

        if shoulder_abs.count() == 0 && hip_abs.count() == 0 {
            return MeasurementResult::insufficient(
                AssessmentType::Posture,
                calibration,
                &[
                    ("avg_shoulder_tilt", Unit::Degrees),
                    ("avg_hip_tilt", Unit::Degrees),
                    ("ap_proxy", Unit::Ratio),
                    ("lateral_shift", Unit::Ratio),
                ],
                &[("alignment", 100.0)],
            );
        }

        let shoulder = shoulder_abs.value();
        let hip = hip_abs.value();
        let ap = ap_abs.value();
        let shift = shift_abs.value();

        let mut sheet = ScoreSheet::new();
        sheet.component("alignment", self.alignment_score(shoulder, hip), 100.0, 1.0);
        let composite = sheet.composite();

        let mut feedback = FeedbackBuilder::new();
        if let Some(v) = shoulder {
            feedback.when(
                v > r.shoulder_tilt_feedback,
                format!(
                    "Shoulders are uneven ({:.1}°, {} side lower).",
                    v,
                    lower_side(shoulder_signed.value().unwrap_or(0.0))
                ),
            );
        }
        if let Some(v) = hip {
            feedback.when(
                v > r.hip_tilt_feedback,
                format!(
                    "Pelvis is tilted ({:.1}°, {} side lower).",
                    v,
                    lower_side(hip_signed.value().unwrap_or(0.0))
                ),
            );
        }
        if let Some(v) = ap {
            let direction = if ap_signed.value().unwrap_or(0.0) < 0.0 {
                "ahead of"
            } else {
                "behind"
            };
            if v > r.ap_significant {
                feedback.push(format!(
                    "Significant sagittal offset: head sits well {} the base of support.",
                    direction
                ));
            } else if v > r.ap_mild {
                feedback.push(format!(
                    "Mild sagittal offset: head sits slightly {} the base of support.",
                    direction
                ));
            }
        }
        if let Some(v) = shift {
            let side = if shift_signed.value().unwrap_or(0.0) >= 0.0 {
                "right"
            } else {
                "left"
            };
            if v > r.shift_significant {
                feedback.push(format!("Significant lateral shift of the pelvis to the {}.", side));
            } else if v > r.shift_moderate {
                feedback.push(format!("Moderate lateral shift of the pelvis to the {}.", side));
            }
        }
        let feedback = feedback.finish(
            composite,
            &[
                Band::above(r.good_band, "Very good postural alignment."),
                Band::above(r.fair_band, "Average posture; some asymmetry to address."),
            ],
            "Noticeable postural asymmetry; work on mobility and corrective strength.",
        );

        let mut measurements = Measurements::new();
        measurements
            .push("avg_shoulder_tilt", shoulder, Unit::Degrees)
            .push("avg_hip_tilt", hip, Unit::Degrees)
            .push("ap_proxy", ap, Unit::Ratio)
            .push("lateral_shift", shift, Unit::Ratio)
            .push("max_shoulder_tilt", worst_shoulder.value(), Unit::Degrees)
            .push("max_hip_tilt", worst_hip.value(), Unit::Degrees);

        MeasurementResult {
            assessment: AssessmentType::Posture,
            measurements: measurements.into_vec(),
            sub_scores: sheet.into_sub_scores(),
            composite,
            representative_frames: [
                worst_shoulder.frame("max_shoulder_tilt"),
                worst_hip.frame("max_hip_tilt"),
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
