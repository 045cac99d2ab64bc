//! Benchmarks for calibration and metric calculators

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use kinemetric_calibration::{AnthropometryProfile, AppliedCalibration, CalibrationEngine};
use kinemetric_core::{AssessmentType, LandmarkFrame, Side};
use kinemetric_metrics::CalculatorTable;
use kinemetric_test::{jitter, shoulder_sweep, squat_rep, standing, JumpCapture, StanceCapture};

fn captures() -> Vec<(AssessmentType, Vec<LandmarkFrame>)> {
    vec![
        (AssessmentType::Squat, jitter(&squat_rep(95.0, 90), 0.003, 1)),
        (AssessmentType::Posture, jitter(&standing(90), 0.003, 2)),
        (
            AssessmentType::ShoulderCircumduction,
            jitter(&shoulder_sweep(170.0, 0.0, 150), 0.003, 3),
        ),
        (
            AssessmentType::SingleLegStanceLeft,
            StanceCapture::default().side(Side::Left).frames(600).generate(),
        ),
        (AssessmentType::VerticalJump, JumpCapture::default().generate()),
    ]
}

fn bench_calculators(c: &mut Criterion) {
    let table = CalculatorTable::default();
    let calibration = AppliedCalibration::default();
    let mut group = c.benchmark_group("calculator");

    for (assessment, frames) in captures() {
        group.bench_with_input(
            BenchmarkId::from_parameter(assessment),
            &frames,
            |bench, frames| {
                bench.iter(|| black_box(table.compute(assessment, black_box(frames), &calibration)))
            },
        );
    }
    group.finish();
}

fn bench_calibration(c: &mut Criterion) {
    let engine = CalibrationEngine::default();
    let frames = standing(30);
    let profile = AnthropometryProfile {
        stated_height_cm: Some(180.0),
        manual_thigh_cm: Some(45.0),
        manual_shin_cm: Some(42.0),
        ..Default::default()
    };

    c.bench_function("calibrate", |bench| {
        bench.iter(|| black_box(engine.calibrate(black_box(&frames), Some(&profile))))
    });
}

criterion_group!(benches, bench_calculators, bench_calibration);
criterion_main!(benches);
