//! Single-leg stance: balance, pelvic control and knee alignment

use kinemetric_calibration::AppliedCalibration;
use kinemetric_core::{angle, horizontal_tilt, AssessmentType, LandmarkFrame, LandmarkName, Side};

use crate::{
    std_dev, variance, Band, Calculator, Extremum, FeedbackBuilder, MeasurementResult,
    Measurements, ScoreSheet, StanceRubric, Unit,
};

/// Single-leg stance calculator for one stance leg
#[derive(Debug, Clone)]
pub struct StanceCalculator {
    side: Side,
    rubric: StanceRubric,
}

impl StanceCalculator {
    pub fn new(side: Side, rubric: StanceRubric) -> Self {
        Self { side, rubric }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Stability points for an ankle sway amplitude in cm
    pub fn stability_score(&self, sway_cm: f64) -> f64 {
        let r = &self.rubric;
        if sway_cm <= r.sway_excellent {
            r.stability_full
        } else if sway_cm <= r.sway_fair {
            r.stability_partial
        } else {
            r.stability_low
        }
    }

    /// Pelvic control points for the largest absolute drop in degrees
    pub fn pelvic_score(&self, drop: f64) -> f64 {
        let r = &self.rubric;
        if drop <= r.pelvic_excellent {
            r.pelvic_full
        } else if drop <= r.pelvic_fair {
            r.pelvic_partial
        } else {
            r.pelvic_low
        }
    }

    /// Knee alignment points for the largest valgus deviation in degrees
    pub fn knee_score(&self, valgus: f64) -> f64 {
        let r = &self.rubric;
        if valgus <= r.valgus_limit {
            r.knee_full
        } else {
            r.knee_low
        }
    }

    pub fn duration_score(&self, seconds: f64) -> f64 {
        let r = &self.rubric;
        r.duration_points * (seconds / r.duration_cap_secs).min(1.0)
    }
}

impl Calculator for StanceCalculator {
    fn assessment(&self) -> AssessmentType {
        match self.side {
            Side::Left => AssessmentType::SingleLegStanceLeft,
            Side::Right => AssessmentType::SingleLegStanceRight,
        }
    }

    fn compute(&self, frames: &[LandmarkFrame], calibration: &AppliedCalibration) -> MeasurementResult {
        let r = &self.rubric;
        let stance = self.side;
        let free = stance.opposite();
        let general = calibration.general;
        // lower-limb points: general scale, then limb correction
        let limb = general * calibration.lower_limb_correction();

        let mut usable = 0usize;
        let mut max_drop = Extremum::max();
        let mut signed_drop_at_max = 0.0;
        let mut max_valgus = Extremum::max();
        let mut sway_samples: Vec<(f64, f64, usize, usize)> = Vec::new();

        for (pos, frame) in frames.iter().enumerate() {
            let stance_hip = frame.get_scaled(LandmarkName::hip(stance), limb);
            let knee = frame.get_scaled(LandmarkName::knee(stance), limb);
            let ankle = frame.get_scaled(LandmarkName::ankle(stance), limb);

            if let (Some(hip), Some(knee), Some(ankle)) = (stance_hip, knee, ankle) {
                usable += 1;
                let valgus = (180.0 - angle(hip, knee, ankle)).max(0.0);
                max_valgus.observe(valgus, pos, frame.index);
            }

            if let (Some(hip), Some(free_hip)) = (
                frame.get_scaled(LandmarkName::hip(stance), general),
                frame.get_scaled(LandmarkName::hip(free), general),
            ) {
                // positive: free-leg side sits lower
                let drop = horizontal_tilt(hip, free_hip);
                let before = max_drop.position();
                max_drop.observe(drop.abs(), pos, frame.index);
                if max_drop.position() != before {
                    signed_drop_at_max = drop;
                }
            }

            if let (Some(ankle), Some(_)) = (ankle, frame.get(LandmarkName::foot_index(stance))) {
                sway_samples.push((ankle.x, ankle.z, pos, frame.index));
            }
        }

        if usable == 0 && sway_samples.is_empty() && max_drop.value().is_none() {
            return MeasurementResult::insufficient(
                self.assessment(),
                calibration,
                &[
                    ("sway", Unit::Centimeters),
                    ("max_pelvic_drop", Unit::Degrees),
                    ("max_knee_valgus", Unit::Degrees),
                    ("stance_time", Unit::Seconds),
                ],
                &[
                    ("stability", r.stability_full),
                    ("pelvic_control", r.pelvic_full),
                    ("knee_alignment", r.knee_full),
                    ("symmetry", r.symmetry_points),
                    ("duration", r.duration_points),
                ],
            );
        }

        let xs: Vec<f64> = sway_samples.iter().map(|s| s.0).collect();
        let zs: Vec<f64> = sway_samples.iter().map(|s| s.1).collect();
        let sway_cm = match (variance(&xs), variance(&zs)) {
            (Some(vx), Some(vz)) => Some(calibration.to_cm((vx + vz).sqrt())),
            _ => None,
        };
        let mut worst_sway = Extremum::max();
        if let (Some(mx), Some(mz)) = (crate::mean(&xs), crate::mean(&zs)) {
            for &(x, z, pos, index) in &sway_samples {
                let offset = (x - mx).hypot(z - mz);
                worst_sway.observe(calibration.to_cm(offset), pos, index);
            }
        }
        let stance_time = usable as f64 / r.frame_rate;

        let mut sheet = ScoreSheet::new();
        let stability = sheet.component(
            "stability",
            sway_cm.map_or(0.0, |s| self.stability_score(s)),
            r.stability_full,
            1.0,
        );
        let pelvic = sheet.component(
            "pelvic_control",
            max_drop.value().map_or(0.0, |d| self.pelvic_score(d)),
            r.pelvic_full,
            1.0,
        );
        let knee = sheet.component(
            "knee_alignment",
            max_valgus.value().map_or(0.0, |v| self.knee_score(v)),
            r.knee_full,
            1.0,
        );
        sheet.component("symmetry", r.symmetry_score, r.symmetry_points, 1.0);
        let duration = sheet.component(
            "duration",
            self.duration_score(stance_time),
            r.duration_points,
            1.0,
        );
        let composite = sheet.composite();

        let drop = max_drop.value().unwrap_or(0.0);
        let valgus = max_valgus.value().unwrap_or(0.0);
        let sway = sway_cm.unwrap_or(0.0);

        let mut feedback = FeedbackBuilder::new();
        feedback
            .when(
                pelvic < r.pelvic_feedback_score && drop > r.pelvic_feedback_drop,
                format!(
                    "Pelvic drop of {:.1}° on the {} side; strengthen the {} hip abductors.",
                    drop, free, stance
                ),
            )
            .when(
                knee < r.knee_feedback_score && valgus > r.valgus_feedback,
                format!(
                    "Knee deviation of {:.1}° on the {} leg; keep the knee tracking over the toes.",
                    valgus, stance
                ),
            )
            .when(
                stability < r.stability_feedback_score && sway > r.sway_feedback,
                format!(
                    "Ankle sway of {:.1} cm indicates limited balance; practice single-leg holds.",
                    sway
                ),
            )
            .when(
                stability < r.core_feedback_score,
                "Add core stability work to reduce compensatory sway.",
            )
            .when(
                duration < r.duration_feedback_score,
                format!(
                    "Stance held for {:.1} s; build up to {:.0} s.",
                    stance_time, r.duration_cap_secs
                ),
            );
        let feedback = feedback.finish(
            composite,
            &[
                Band::at_least(r.excellent_band, "Excellent single-leg balance."),
                Band::at_least(r.good_band, "Good single-leg balance."),
                Band::at_least(r.fair_band, "Fair single-leg balance; targeted work recommended."),
            ],
            "Poor single-leg balance; prioritize stability training.",
        );

        let mut measurements = Measurements::new();
        measurements
            .push("sway", sway_cm, Unit::Centimeters)
            .push("sway_x", std_dev(&xs).map(|v| calibration.to_cm(v)), Unit::Centimeters)
            .push("sway_z", std_dev(&zs).map(|v| calibration.to_cm(v)), Unit::Centimeters)
            .push("max_pelvic_drop", max_drop.value(), Unit::Degrees)
            .push(
                "pelvic_drop_signed",
                max_drop.value().map(|_| signed_drop_at_max),
                Unit::Degrees,
            )
            .push("max_knee_valgus", max_valgus.value(), Unit::Degrees)
            .push("stance_time", Some(stance_time), Unit::Seconds)
            .push("frames_analyzed", Some(usable as f64), Unit::Count);

        MeasurementResult {
            assessment: self.assessment(),
            measurements: measurements.into_vec(),
            sub_scores: sheet.into_sub_scores(),
            composite,
            representative_frames: [
                worst_sway.frame("worst_sway"),
                max_drop.frame("max_pelvic_drop"),
                max_valgus.frame("max_knee_valgus"),
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

    /// Left-leg stance with the ankle offset by `dx` pose units
    fn frame(index: usize, dx: f64, free_hip_drop: f64) -> LandmarkFrame {
        LandmarkFrame::new(index)
            .with(LandmarkName::LeftHip, Landmark::new(0.45, 0.5, 0.0, 0.9))
            .with(LandmarkName::RightHip, Landmark::new(0.55, 0.5 + free_hip_drop, 0.0, 0.9))
            .with(LandmarkName::LeftKnee, Landmark::new(0.45, 0.7, 0.0, 0.9))
            .with(LandmarkName::LeftAnkle, Landmark::new(0.45 + dx, 0.9, 0.0, 0.9))
            .with(LandmarkName::LeftFootIndex, Landmark::new(0.44 + dx, 0.95, -0.05, 0.9))
    }

    fn sway_frames(amplitude: f64, count: usize) -> Vec<LandmarkFrame> {
        (0..count)
            .map(|i| {
                let dx = if i % 2 == 0 { amplitude } else { -amplitude };
                frame(i, dx, 0.0)
            })
            .collect()
    }

    #[test]
    fn test_stability_bands() {
        let calc = StanceCalculator::new(Side::Left, StanceRubric::default());
        assert_eq!(calc.stability_score(1.0), 40.0);
        assert_eq!(calc.stability_score(1.5), 40.0);
        assert_eq!(calc.stability_score(2.0), 24.0);
        assert_eq!(calc.stability_score(3.0), 24.0);
        assert_eq!(calc.stability_score(5.0), 12.0);
    }

    #[test]
    fn test_sway_of_one_centimeter() {
        let calc = StanceCalculator::new(Side::Left, StanceRubric::default());
        let result = calc.compute(&sway_frames(0.01, 60), &AppliedCalibration::default());
        assert!((result.measurement("sway").unwrap() - 1.0).abs() < 1e-6);
        assert_eq!(result.sub_score("stability"), Some(40.0));
        assert_eq!(result.measurement("stance_time"), Some(2.0));
        assert!(result.frame("worst_sway").is_some());
    }

    #[test]
    fn test_pelvic_drop_feedback() {
        let calc = StanceCalculator::new(Side::Left, StanceRubric::default());
        // 0.1 wide, 0.015 drop: ~8.5°, partial credit and no feedback
        let frames: Vec<_> = (0..30).map(|i| frame(i, 0.0, 0.015)).collect();
        let result = calc.compute(&frames, &AppliedCalibration::default());
        let drop = result.measurement("max_pelvic_drop").unwrap();
        assert!(drop > 7.0 && drop < 10.0);
        assert!(result.measurement("pelvic_drop_signed").unwrap() > 0.0);
        assert_eq!(result.sub_score("pelvic_control"), Some(15.0));
        assert!(!result.feedback[0].starts_with("Pelvic drop"));

        // 0.025 drop: ~14°
        let frames: Vec<_> = (0..30).map(|i| frame(i, 0.0, 0.025)).collect();
        let result = calc.compute(&frames, &AppliedCalibration::default());
        assert_eq!(result.sub_score("pelvic_control"), Some(5.0));
        assert!(result.feedback[0].starts_with("Pelvic drop"));
        assert!(result.feedback[0].contains("right side"));
    }

    #[test]
    fn test_full_duration_caps() {
        let calc = StanceCalculator::new(Side::Left, StanceRubric::default());
        assert_eq!(calc.duration_score(40.0), 10.0);
        assert_eq!(calc.duration_score(10.0), 5.0);
    }

    #[test]
    fn test_free_leg_landmarks_only_is_insufficient() {
        let calc = StanceCalculator::new(Side::Right, StanceRubric::default());
        let frames: Vec<_> = (0..5)
            .map(|i| {
                LandmarkFrame::new(i).with(LandmarkName::LeftKnee, Landmark::new(0.4, 0.7, 0.0, 0.9))
            })
            .collect();
        let result = calc.compute(&frames, &AppliedCalibration::default());
        assert!(result.insufficient_data);
        assert_eq!(result.assessment, AssessmentType::SingleLegStanceRight);
    }
}
