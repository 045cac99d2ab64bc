//! Shoulder circumduction: overhead range, symmetry and trunk compensation

use kinemetric_calibration::AppliedCalibration;
use kinemetric_core::{angle, horizontal_tilt, AssessmentType, LandmarkFrame, LandmarkName, Side};

use crate::{
    ramp, Band, Calculator, Extremum, FeedbackBuilder, Mean, MeasurementResult, Measurements,
    ScoreSheet, ShoulderRubric, Unit,
};

/// Shoulder circumduction calculator
#[derive(Debug, Clone, Default)]
pub struct ShoulderCalculator {
    rubric: ShoulderRubric,
}

/// Arm elevation relative to the trunk on one side.
///
/// The raw angle is taken against the trunk axis extended above the
/// shoulder, so 0° is arm hanging and 180° is arm overhead. Taking
/// 180° minus the raw hip-shoulder-elbow angle would invert that scale and
/// put an overhead arm at 0°, below the 135°→175° ROM ramp; the reflected
/// axis keeps overhead at the top.
fn elevation(frame: &LandmarkFrame, side: Side, factor: f64) -> Option<f64> {
    let hip = frame.get_scaled(LandmarkName::hip(side), factor)?;
    let shoulder = frame.get_scaled(LandmarkName::shoulder(side), factor)?;
    let elbow = frame.get_scaled(LandmarkName::elbow(side), factor)?;
    let trunk_up = shoulder + (shoulder - hip);
    Some(180.0 - angle(trunk_up, shoulder, elbow))
}

impl ShoulderCalculator {
    pub fn new(rubric: ShoulderRubric) -> Self {
        Self { rubric }
    }

    pub fn rom_score(&self, mean_max_elevation: f64) -> f64 {
        let r = &self.rubric;
        r.rom_points * ramp(mean_max_elevation, r.rom_floor_angle, r.rom_optimal_angle)
    }

    pub fn symmetry_score(&self, gap: f64) -> f64 {
        let r = &self.rubric;
        r.symmetry_points * (1.0 - gap / r.symmetry_gap_cap).max(0.0)
    }

    pub fn trunk_score(&self, mean_tilt: f64) -> f64 {
        let r = &self.rubric;
        let excess = (mean_tilt - r.trunk_tilt_tolerance).max(0.0);
        r.trunk_points * (1.0 - excess / r.trunk_tilt_range).max(0.0)
    }
}

impl Calculator for ShoulderCalculator {
    fn assessment(&self) -> AssessmentType {
        AssessmentType::ShoulderCircumduction
    }

    fn compute(&self, frames: &[LandmarkFrame], calibration: &AppliedCalibration) -> MeasurementResult {
        let r = &self.rubric;
        let factor = calibration.general;
        let mut max_left = Extremum::max();
        let mut max_right = Extremum::max();
        let mut tilt = Mean::default();
        let mut max_tilt = Extremum::max();

        for (pos, frame) in frames.iter().enumerate() {
            if let Some(e) = elevation(frame, Side::Left, factor) {
                max_left.observe(e, pos, frame.index);
            }
            if let Some(e) = elevation(frame, Side::Right, factor) {
                max_right.observe(e, pos, frame.index);
            }
            if let Some((l, r)) = frame.pair(LandmarkName::LeftShoulder, LandmarkName::RightShoulder) {
                let t = horizontal_tilt(l * factor, r * factor).abs();
                tilt.push(t);
                max_tilt.observe(t, pos, frame.index);
            }
        }

        let (left, right) = (max_left.value(), max_right.value());
        if left.is_none() && right.is_none() {
            return MeasurementResult::insufficient(
                AssessmentType::ShoulderCircumduction,
                calibration,
                &[
                    ("max_elevation_left", Unit::Degrees),
                    ("max_elevation_right", Unit::Degrees),
                    ("avg_trunk_tilt", Unit::Degrees),
                ],
                &[
                    ("rom", r.rom_points),
                    ("scapular_control", r.scapular_points),
                    ("symmetry", r.symmetry_points),
                    ("trunk_compensation", r.trunk_points),
                    ("control", r.control_points),
                ],
            );
        }

        let mean_max = match (left, right) {
            (Some(l), Some(r)) => (l + r) / 2.0,
            (Some(v), None) | (None, Some(v)) => v,
            (None, None) => 0.0,
        };
        let gap = match (left, right) {
            (Some(l), Some(r)) => Some((l - r).abs()),
            _ => None,
        };

        let mut sheet = ScoreSheet::new();
        sheet.component("rom", self.rom_score(mean_max), r.rom_points, 1.0);
        sheet.component("scapular_control", r.scapular_points, r.scapular_points, 1.0);
        sheet.component(
            "symmetry",
            gap.map_or(0.0, |g| self.symmetry_score(g)),
            r.symmetry_points,
            1.0,
        );
        sheet.component(
            "trunk_compensation",
            tilt.value().map_or(0.0, |t| self.trunk_score(t)),
            r.trunk_points,
            1.0,
        );
        sheet.component("control", r.control_points, r.control_points, 1.0);
        let composite = sheet.composite();

        let mut feedback = FeedbackBuilder::new();
        feedback.when(
            mean_max < r.limited_elevation,
            format!(
                "Overhead range is limited (average peak elevation {:.0}°). Work on thoracic and shoulder mobility.",
                mean_max
            ),
        );
        match (left, right, gap) {
            (Some(l), Some(rt), Some(g)) if g > r.asymmetry_feedback => {
                let weaker = if l < rt { Side::Left } else { Side::Right };
                feedback.push(format!(
                    "Left/right asymmetry of {:.0}°; the {} shoulder reaches less range.",
                    g, weaker
                ));
            }
            (Some(_), None, _) | (None, Some(_), _) => {
                feedback.push("Only one arm was visible; symmetry could not be assessed.");
            }
            _ => {}
        }
        if let Some(t) = max_tilt.value() {
            feedback.when(
                t > r.tilt_feedback,
                format!(
                    "Trunk compensation detected (up to {:.0}° of lateral tilt). Keep the ribs stacked over the pelvis.",
                    t
                ),
            );
        }
        let feedback = feedback.finish(
            composite,
            &[
                Band::above(r.good_band, "Optimal shoulder mobility and control."),
                Band::at_least(r.fair_band, "Functional shoulder mobility with room to improve."),
            ],
            "Shoulder dysfunction indicators present; consider a targeted mobility program.",
        );

        let mut measurements = Measurements::new();
        measurements
            .push("max_elevation_left", left, Unit::Degrees)
            .push("max_elevation_right", right, Unit::Degrees)
            .push("elevation_gap", gap, Unit::Degrees)
            .push("avg_trunk_tilt", tilt.value(), Unit::Degrees)
            .push("max_trunk_tilt", max_tilt.value(), Unit::Degrees);

        MeasurementResult {
            assessment: AssessmentType::ShoulderCircumduction,
            measurements: measurements.into_vec(),
            sub_scores: sheet.into_sub_scores(),
            composite,
            representative_frames: [
                max_left.frame("max_elevation_left"),
                max_right.frame("max_elevation_right"),
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
