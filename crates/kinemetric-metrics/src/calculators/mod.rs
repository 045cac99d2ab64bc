//! Per-assessment metric calculators

pub mod squat;
pub mod posture;
pub mod shoulder;
pub mod stance;
pub mod jump;

pub use squat::*;
pub use posture::*;
pub use shoulder::*;
pub use stance::*;
pub use jump::*;

use kinemetric_core::{angle, midpoint, LandmarkFrame, LandmarkName, Point3, Side};

/// Hip-knee-ankle angle on one side, scaled by `factor`
pub(crate) fn knee_angle(frame: &LandmarkFrame, side: Side, factor: f64) -> Option<f64> {
    let hip = frame.get_scaled(LandmarkName::hip(side), factor)?;
    let knee = frame.get_scaled(LandmarkName::knee(side), factor)?;
    let ankle = frame.get_scaled(LandmarkName::ankle(side), factor)?;
    Some(angle(hip, knee, ankle))
}

/// Mean knee angle over the visible sides
pub(crate) fn mean_knee_angle(frame: &LandmarkFrame, factor: f64) -> Option<f64> {
    match (
        knee_angle(frame, Side::Left, factor),
        knee_angle(frame, Side::Right, factor),
    ) {
        (Some(l), Some(r)) => Some((l + r) / 2.0),
        (Some(v), None) | (None, Some(v)) => Some(v),
        (None, None) => None,
    }
}

/// Midpoint of a visible landmark pair, scaled by `factor`
pub(crate) fn center(
    frame: &LandmarkFrame,
    left: LandmarkName,
    right: LandmarkName,
    factor: f64,
) -> Option<Point3> {
    let (l, r) = frame.pair(left, right)?;
    let m = midpoint(l * factor, r * factor);
    m.is_finite().then_some(m)
}

/// Hip center
pub(crate) fn hip_center(frame: &LandmarkFrame, factor: f64) -> Option<Point3> {
    center(frame, LandmarkName::LeftHip, LandmarkName::RightHip, factor)
}
