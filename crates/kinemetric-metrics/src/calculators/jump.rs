//! Countermovement vertical jump: power, landing mechanics and symmetry
//!
//! Phases are found from the hip-centre trajectory: a standing baseline from
//! the leading frames, take-off when the hips first rise past the flight
//! threshold, peak at the highest point, touchdown when they fall back.

use kinemetric_calibration::AppliedCalibration;
use kinemetric_core::{angle, AssessmentType, LandmarkFrame, LandmarkName, Point3, Side};

use super::{hip_center, knee_angle, mean_knee_angle};
use crate::{
    mean, ramp, variance, Band, Calculator, Extremum, FeedbackBuilder, JumpRubric,
    MeasurementResult, Measurements, RepresentativeFrame, ScoreSheet, Unit,
};

/// Vertical jump calculator
#[derive(Debug, Clone, Default)]
pub struct JumpCalculator {
    rubric: JumpRubric,
}

/// Frontal-plane knee deviation, counted only when the knee falls medial
/// to the hip-ankle line.
fn frontal_valgus(frame: &LandmarkFrame, side: Side, factor: f64) -> Option<f64> {
    let hip = frame.get_scaled(LandmarkName::hip(side), factor)?.frontal();
    let knee = frame.get_scaled(LandmarkName::knee(side), factor)?.frontal();
    let ankle = frame.get_scaled(LandmarkName::ankle(side), factor)?.frontal();
    let midline = hip_center(frame, factor)?.x;

    let span = ankle.y - hip.y;
    if span.abs() < f64::EPSILON {
        return None;
    }
    let t = (knee.y - hip.y) / span;
    let line_x = hip.x + t * (ankle.x - hip.x);
    let medial = (knee.x - midline).abs() < (line_x - midline).abs();

    let deviation = (180.0 - angle(hip, knee, ankle)).max(0.0);
    Some(if medial { deviation } else { 0.0 })
}

struct HipSample {
    pos: usize,
    frame_index: usize,
    point: Point3,
    rise_cm: f64,
}

impl HipSample {
    fn frame(&self, label: &str) -> RepresentativeFrame {
        RepresentativeFrame {
            label: label.to_string(),
            position: self.pos,
            frame_index: self.frame_index,
            value: self.rise_cm,
        }
    }
}

impl JumpCalculator {
    pub fn new(rubric: JumpRubric) -> Self {
        Self { rubric }
    }

    /// Power component (0-100) from jump height in cm
    pub fn power_score(&self, height_cm: f64) -> f64 {
        100.0 * ramp(height_cm, self.rubric.power_floor_cm, self.rubric.power_optimal_cm)
    }

    /// Valgus component (0-100) from landing valgus in degrees
    pub fn valgus_score(&self, valgus: f64) -> f64 {
        let r = &self.rubric;
        let points = (r.valgus_points - r.valgus_penalty * (valgus - r.valgus_tolerance).max(0.0)).max(0.0);
        100.0 * points / r.valgus_points
    }

    /// Landing control (0-100) from post-touchdown hip sway in cm
    pub fn landing_score(&self, sway_cm: f64) -> f64 {
        let r = &self.rubric;
        100.0 - r.landing_penalty_per_cm * (sway_cm - r.landing_sway_tolerance_cm).max(0.0)
    }

    /// Symmetry component (0-100) from the left/right knee angle gap
    pub fn symmetry_score(&self, gap: f64) -> f64 {
        100.0 - self.rubric.symmetry_penalty * gap
    }
}

impl Calculator for JumpCalculator {
    fn assessment(&self) -> AssessmentType {
        AssessmentType::VerticalJump
    }

    fn compute(&self, frames: &[LandmarkFrame], calibration: &AppliedCalibration) -> MeasurementResult {
        let r = &self.rubric;
        let factor = calibration.general;

        let mut hips: Vec<HipSample> = frames
            .iter()
            .enumerate()
            .filter_map(|(pos, frame)| {
                hip_center(frame, factor).map(|point| HipSample {
                    pos,
                    frame_index: frame.index,
                    point,
                    rise_cm: 0.0,
                })
            })
            .collect();

        if hips.len() <= r.baseline_frames.max(1) {
            return MeasurementResult::insufficient(
                AssessmentType::VerticalJump,
                calibration,
                &[
                    ("jump_height", Unit::Centimeters),
                    ("countermovement_depth", Unit::Degrees),
                    ("landing_valgus", Unit::Degrees),
                ],
                &[
                    ("power", 100.0),
                    ("landing_control", 100.0),
                    ("valgus", 100.0),
                    ("symmetry", 100.0),
                ],
            );
        }

        let baseline_ys: Vec<f64> = hips
            .iter()
            .take(r.baseline_frames.max(1))
            .map(|h| h.point.y)
            .collect();
        let baseline = mean(&baseline_ys).unwrap_or(0.0);
        for h in hips.iter_mut() {
            // y grows downward
            h.rise_cm = calibration.to_cm(baseline - h.point.y);
        }

        let takeoff = hips
            .iter()
            .position(|h| h.rise_cm > r.flight_threshold_cm);
        let peak = takeoff.map(|t| {
            let mut best = t;
            for (i, h) in hips.iter().enumerate().skip(t) {
                if h.rise_cm > hips[best].rise_cm {
                    best = i;
                }
            }
            best
        });
        let landing = peak.and_then(|p| {
            hips.iter()
                .enumerate()
                .skip(p + 1)
                .find(|(_, h)| h.rise_cm <= r.flight_threshold_cm)
                .map(|(i, _)| i)
        });

        let jump_height = peak.map_or(0.0, |p| hips[p].rise_cm.max(0.0));
        let flight_time = match (takeoff, landing) {
            (Some(t), Some(l)) => {
                Some(hips[l].frame_index.saturating_sub(hips[t].frame_index) as f64 / r.frame_rate)
            }
            _ => None,
        };
        let flight_height = flight_time.map(|t| r.gravity_cm_s2 * t * t / 8.0);

        // countermovement: deepest knee bend before leaving the ground
        let takeoff_pos = takeoff.map_or(frames.len(), |t| hips[t].pos);
        let mut depth = Extremum::min();
        for (pos, frame) in frames.iter().enumerate().take(takeoff_pos) {
            if let Some(k) = mean_knee_angle(frame, factor) {
                depth.observe(k, pos, frame.index);
            }
        }
        let knee_gap = depth.position().and_then(|pos| {
            let frame = &frames[pos];
            let left = knee_angle(frame, Side::Left, factor)?;
            let right = knee_angle(frame, Side::Right, factor)?;
            Some((left - right).abs())
        });

        // landing window
        let mut landing_valgus = Extremum::max();
        let mut landing_sway = None;
        if let Some(l) = landing {
            let start = hips[l].pos;
            let end = (start + r.landing_window).min(frames.len());
            for (pos, frame) in frames.iter().enumerate().take(end).skip(start) {
                for side in [Side::Left, Side::Right] {
                    if let Some(v) = frontal_valgus(frame, side, factor) {
                        landing_valgus.observe(v, pos, frame.index);
                    }
                }
            }
            let window: Vec<&HipSample> = hips
                .iter()
                .filter(|h| h.pos >= start && h.pos < end)
                .collect();
            let xs: Vec<f64> = window.iter().map(|h| h.point.x).collect();
            let zs: Vec<f64> = window.iter().map(|h| h.point.z).collect();
            if let (Some(vx), Some(vz)) = (variance(&xs), variance(&zs)) {
                landing_sway = Some(calibration.to_cm((vx + vz).sqrt()));
            }
        }

        let mut sheet = ScoreSheet::new();
        sheet.component("power", self.power_score(jump_height), 100.0, r.power_weight);
        let landing_control = sheet.component(
            "landing_control",
            landing_sway.map_or(0.0, |s| self.landing_score(s)),
            100.0,
            r.landing_weight,
        );
        sheet.component(
            "valgus",
            landing_valgus.value().map_or(0.0, |v| self.valgus_score(v)),
            100.0,
            r.valgus_weight,
        );
        sheet.component(
            "symmetry",
            knee_gap.map_or(0.0, |g| self.symmetry_score(g)),
            100.0,
            r.symmetry_weight,
        );
        let composite = sheet.composite();

        let mut feedback = FeedbackBuilder::new();
        feedback.when(
            takeoff.is_none(),
            "No clear flight phase detected; make sure the full jump stays in frame.",
        );
        feedback.when(
            jump_height < r.low_height_feedback,
            format!(
                "Jump height of {:.1} cm; develop lower-body power with plyometric work.",
                jump_height
            ),
        );
        if let Some(v) = landing_valgus.value() {
            feedback.when(
                v > r.valgus_feedback,
                format!(
                    "Knee valgus of {:.1}° on landing is an injury risk; land with knees over toes.",
                    v
                ),
            );
        }
        feedback.when(
            landing.is_some() && landing_control < r.landing_feedback,
            "Landing is unstable; practice soft, controlled landings.",
        );
        let feedback = feedback.finish(
            composite,
            &[
                Band::above(r.good_band, "Explosive jump with well-controlled landing."),
                Band::at_least(r.fair_band, "Good jump mechanics with room to improve."),
            ],
            "Focus on jump technique and landing control.",
        );

        let mut measurements = Measurements::new();
        measurements
            .push("jump_height", Some(jump_height), Unit::Centimeters)
            .push("flight_time", flight_time, Unit::Seconds)
            .push("flight_time_height", flight_height, Unit::Centimeters)
            .push("countermovement_depth", depth.value(), Unit::Degrees)
            .push("landing_valgus", landing_valgus.value(), Unit::Degrees)
            .push("landing_sway", landing_sway, Unit::Centimeters)
            .push("knee_symmetry_gap", knee_gap, Unit::Degrees);

        let mut representative_frames: Vec<RepresentativeFrame> =
            depth.frame("countermovement").into_iter().collect();
        representative_frames.extend(takeoff.map(|t| hips[t].frame("takeoff")));
        representative_frames.extend(peak.map(|p| hips[p].frame("peak_height")));
        representative_frames.extend(landing.map(|l| hips[l].frame("landing")));

        MeasurementResult {
            assessment: AssessmentType::VerticalJump,
            measurements: measurements.into_vec(),
            sub_scores: sheet.into_sub_scores(),
            composite,
            representative_frames,
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

    fn body(index: usize, hip_y: f64, knee_dz: f64, medial: f64) -> LandmarkFrame {
        let mut f = LandmarkFrame::new(index);
        for (side, x, inward) in [(Side::Left, 0.45, 1.0), (Side::Right, 0.55, -1.0)] {
            f.insert(LandmarkName::hip(side), Landmark::new(x, hip_y, 0.0, 0.9));
            f.insert(
                LandmarkName::knee(side),
                Landmark::new(x + inward * medial, hip_y + 0.2, -knee_dz, 0.9),
            );
            f.insert(LandmarkName::ankle(side), Landmark::new(x, hip_y + 0.4, 0.0, 0.9));
        }
        f
    }

    fn jump(landing_medial: f64) -> Vec<LandmarkFrame> {
        let track = [
            (0.5, 0.0),
            (0.5, 0.0),
            (0.5, 0.0),
            (0.5, 0.0),
            (0.5, 0.0),
            (0.55, 0.1),
            (0.55, 0.1),
            (0.45, 0.0),
            (0.3, 0.0),
            (0.15, 0.0),
            (0.3, 0.0),
            (0.45, 0.0),
        ];
        let mut frames: Vec<_> = track
            .iter()
            .enumerate()
            .map(|(i, &(y, dz))| body(i, y, dz, 0.0))
            .collect();
        for i in 12..20 {
            frames.push(body(i, 0.5, 0.0, landing_medial));
        }
        frames
    }

    #[test]
    fn test_clean_jump() {
        let calc = JumpCalculator::default();
        let result = calc.compute(&jump(0.0), &AppliedCalibration::default());
        assert!(!result.insufficient_data);
        assert!((result.measurement("jump_height").unwrap() - 35.0).abs() < 1e-6);
        assert_eq!(result.frame("takeoff").unwrap().frame_index, 7);
        assert_eq!(result.frame("peak_height").unwrap().frame_index, 9);
        assert_eq!(result.frame("landing").unwrap().frame_index, 12);
        assert_eq!(result.frame("countermovement").unwrap().frame_index, 5);
        assert!((result.measurement("countermovement_depth").unwrap() - 126.869_897_6).abs() < 1e-4);
        // 0.4 * 75 + 0.3 * 100 + 0.2 * 100 + 0.1 * 100
        assert!((result.composite - 90.0).abs() < 1e-6);
        assert_eq!(
            result.feedback,
            vec!["Explosive jump with well-controlled landing.".to_string()]
        );
    }

    #[test]
    fn test_medial_knee_on_landing() {
        let calc = JumpCalculator::default();
        let result = calc.compute(&jump(0.025), &AppliedCalibration::default());
        let valgus = result.measurement("landing_valgus").unwrap();
        assert!(valgus > 12.0, "{}", valgus);
        assert!(result.feedback.iter().any(|l| l.contains("valgus")));

        // knees pushed outward do not count
        let result = calc.compute(&jump(-0.025), &AppliedCalibration::default());
        assert_eq!(result.measurement("landing_valgus"), Some(0.0));
    }

    #[test]
    fn test_no_flight_phase() {
        let calc = JumpCalculator::default();
        let frames: Vec<_> = (0..12).map(|i| body(i, 0.5, 0.0, 0.0)).collect();
        let result = calc.compute(&frames, &AppliedCalibration::default());
        assert!(!result.insufficient_data);
        assert_eq!(result.measurement("jump_height"), Some(0.0));
        assert!(result.feedback[0].starts_with("No clear flight phase"));
        assert!(result.frame("landing").is_none());
    }

    #[test]
    fn test_component_curves() {
        let calc = JumpCalculator::default();
        assert_eq!(calc.power_score(20.0), 0.0);
        assert_eq!(calc.power_score(30.0), 50.0);
        assert_eq!(calc.power_score(45.0), 100.0);
        assert_eq!(calc.valgus_score(5.0), 100.0);
        assert_eq!(calc.valgus_score(10.0), 50.0);
        assert_eq!(calc.valgus_score(20.0), 0.0);
    }
}
