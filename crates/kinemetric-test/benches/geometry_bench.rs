//! Benchmarks for the geometry kernel and landmark access

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use kinemetric_core::{angle, distance, horizontal_tilt, midpoint, LandmarkName, Point3};
use kinemetric_test::standing_frame;

fn bench_angle(c: &mut Criterion) {
    let a = Point3::new(0.45, 0.52, 0.0);
    let b = Point3::new(0.45, 0.72, 0.0);
    let cc = Point3::new(0.45, 0.75, 0.18);

    c.bench_function("angle", |bench| {
        bench.iter(|| black_box(angle(black_box(a), black_box(b), black_box(cc))))
    });
}

fn bench_distance_midpoint(c: &mut Criterion) {
    let a = Point3::new(0.42, 0.22, 0.0);
    let b = Point3::new(0.58, 0.24, 0.01);

    c.bench_function("distance", |bench| {
        bench.iter(|| black_box(distance(black_box(a), black_box(b))))
    });
    c.bench_function("midpoint", |bench| {
        bench.iter(|| black_box(midpoint(black_box(a), black_box(b))))
    });
    c.bench_function("horizontal_tilt", |bench| {
        bench.iter(|| black_box(horizontal_tilt(black_box(a), black_box(b))))
    });
}

fn bench_landmark_lookup(c: &mut Criterion) {
    let frame = standing_frame(0);

    c.bench_function("landmark_get_scaled", |bench| {
        bench.iter(|| black_box(frame.get_scaled(black_box(LandmarkName::LeftKnee), 1.2)))
    });
    c.bench_function("landmark_name_parse", |bench| {
        bench.iter(|| black_box("right_foot_index".parse::<LandmarkName>()))
    });
}

criterion_group!(
    benches,
    bench_angle,
    bench_distance_midpoint,
    bench_landmark_lookup,
);
criterion_main!(benches);
