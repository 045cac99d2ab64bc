//! Property suites for the geometry kernel, calibration and calculators

use proptest::prelude::*;

use kinemetric_calibration::{AnthropometryProfile, AppliedCalibration, CalibrationEngine, HeightEstimate};
use kinemetric_core::{angle, distance, AssessmentType, Point3, Side};
use kinemetric_metrics::CalculatorTable;
use kinemetric_test::{jitter, shoulder_sweep, squat_hold, squat_rep, JumpCapture, StanceCapture};

fn coord() -> impl Strategy<Value = f64> {
    -10.0f64..10.0
}

fn point() -> impl Strategy<Value = Point3> {
    (coord(), coord(), coord()).prop_map(|(x, y, z)| Point3::new(x, y, z))
}

fn any_f64_point() -> impl Strategy<Value = Point3> {
    (any::<f64>(), any::<f64>(), any::<f64>()).prop_map(|(x, y, z)| Point3::new(x, y, z))
}

proptest! {
    #[test]
    fn collinear_angle_is_straight(a in point(), dir in point(), s in 0.1f64..5.0, t in 0.1f64..5.0) {
        prop_assume!(dir.norm() > 1e-3);
        let b = a + dir * s;
        let c = b + dir * t;
        prop_assert!((angle(a, b, c) - 180.0).abs() < 1e-4);
    }

    #[test]
    fn distance_to_self_is_zero(p in point()) {
        prop_assert_eq!(distance(p, p), 0.0);
    }

    #[test]
    fn angle_stays_in_range(a in any_f64_point(), b in any_f64_point(), c in any_f64_point()) {
        let v = angle(a, b, c);
        prop_assert!((0.0..=180.0).contains(&v), "angle {}", v);
    }

    #[test]
    fn degenerate_rays_do_not_panic(a in point()) {
        let v = angle(a, a, a);
        prop_assert!((0.0..=180.0).contains(&v));
    }

    #[test]
    fn matching_heights_give_unit_factor(height in 100.5f64..250.0) {
        let engine = CalibrationEngine::default();
        let estimate = HeightEstimate { raw_cm: height, measured: true, frame_index: Some(0) };
        let factor = engine.general_factor(Some(height), &estimate);
        prop_assert!((factor - 1.0).abs() < 1e-12);
    }

    #[test]
    fn squat_depth_is_recovered(bottom in 60.0f64..170.0) {
        let frames = squat_rep(bottom, 21);
        let result = CalculatorTable::default()
            .compute(AssessmentType::Squat, &frames, &AppliedCalibration::default())
            .unwrap();
        prop_assert!((result.measurement("min_knee_angle").unwrap() - bottom).abs() < 1e-6);
        prop_assert!((0.0..=100.0).contains(&result.composite));
    }

    #[test]
    fn calculators_are_deterministic(seed in any::<u64>(), amplitude in 0.0f64..0.02) {
        let table = CalculatorTable::default();
        let calibration = AppliedCalibration::default();
        let captures = [
            (AssessmentType::Squat, jitter(&squat_rep(95.0, 15), amplitude, seed)),
            (AssessmentType::ShoulderCircumduction, jitter(&shoulder_sweep(170.0, 5.0, 15), amplitude, seed)),
            (
                AssessmentType::SingleLegStanceLeft,
                jitter(&StanceCapture::default().side(Side::Left).frames(30).generate(), amplitude, seed),
            ),
            (AssessmentType::VerticalJump, jitter(&JumpCapture::default().generate(), amplitude, seed)),
        ];
        for (assessment, frames) in &captures {
            let first = table.compute(*assessment, frames, &calibration).unwrap();
            let second = table.compute(*assessment, frames, &calibration).unwrap();
            prop_assert_eq!(first.composite, second.composite);
            prop_assert_eq!(&first.feedback, &second.feedback);
            prop_assert!((0.0..=100.0).contains(&first.composite));
            prop_assert!(first.sub_scores.iter().all(|s| s.value >= 0.0));
        }
    }
}

#[test]
fn unit_factor_leaves_distances_unchanged() {
    let engine = CalibrationEngine::default();
    let profile = AnthropometryProfile {
        stated_height_cm: Some(175.0),
        ..Default::default()
    };
    let estimate = HeightEstimate { raw_cm: 175.0, measured: true, frame_index: Some(0) };
    let factor = engine.general_factor(profile.stated_height_cm, &estimate);
    assert_eq!(factor, 1.0);

    let a = Point3::new(0.1, 0.2, 0.3);
    let b = Point3::new(0.4, -0.2, 0.0);
    assert_eq!(distance(a * factor, b * factor), distance(a, b));
}

#[test]
fn constant_squat_scores_full_rom() {
    let result = CalculatorTable::default()
        .compute(AssessmentType::Squat, &squat_hold(100.0, 12), &AppliedCalibration::default())
        .unwrap();
    assert!((result.measurement("min_knee_angle").unwrap() - 100.0).abs() < 1e-9);
    assert!((result.sub_score("rom").unwrap() - 100.0).abs() < 1e-6);
}
