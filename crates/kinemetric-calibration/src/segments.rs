//! Body segment measurement

use serde::{Deserialize, Serialize};

use kinemetric_core::{distance, LandmarkFrame, LandmarkName};

/// Measured body segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    Trunk,
    ShoulderWidth,
    PelvisWidth,
    UpperArmLeft,
    UpperArmRight,
    ForearmLeft,
    ForearmRight,
    ThighLeft,
    ThighRight,
    ShinLeft,
    ShinRight,
}

impl Segment {
    /// All segments in report order
    pub fn all() -> &'static [Segment] {
        &[
            Segment::Trunk,
            Segment::ShoulderWidth,
            Segment::PelvisWidth,
            Segment::UpperArmLeft,
            Segment::UpperArmRight,
            Segment::ForearmLeft,
            Segment::ForearmRight,
            Segment::ThighLeft,
            Segment::ThighRight,
            Segment::ShinLeft,
            Segment::ShinRight,
        ]
    }

    /// Landmarks bounding the segment
    pub fn endpoints(self) -> (LandmarkName, LandmarkName) {
        use LandmarkName::*;
        match self {
            Segment::Trunk => (LeftShoulder, LeftHip),
            Segment::ShoulderWidth => (LeftShoulder, RightShoulder),
            Segment::PelvisWidth => (LeftHip, RightHip),
            Segment::UpperArmLeft => (LeftShoulder, LeftElbow),
            Segment::UpperArmRight => (RightShoulder, RightElbow),
            Segment::ForearmLeft => (LeftElbow, LeftWrist),
            Segment::ForearmRight => (RightElbow, RightWrist),
            Segment::ThighLeft => (LeftHip, LeftKnee),
            Segment::ThighRight => (RightHip, RightKnee),
            Segment::ShinLeft => (LeftKnee, LeftAnkle),
            Segment::ShinRight => (RightKnee, RightAnkle),
        }
    }

    /// Lower-limb segments take the limb factor
    pub fn is_lower_limb(self) -> bool {
        matches!(
            self,
            Segment::ThighLeft | Segment::ThighRight | Segment::ShinLeft | Segment::ShinRight
        )
    }
}

/// One segment length with its detection confidence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentMeasurement {
    pub segment: Segment,
    /// Length in centimeters; absent when an endpoint is not visible
    pub length_cm: Option<f64>,
    /// Lower visibility of the two endpoints
    pub confidence: f64,
}

impl SegmentMeasurement {
    pub fn is_valid(&self) -> bool {
        self.length_cm.is_some()
    }
}

/// Measure every segment on one frame.
///
/// Lengths are scaled by `general` (or `limb` for lower-limb segments) and
/// converted to centimeters. Segments with an invisible endpoint are kept
/// with no length.
pub fn measure_segments(
    frame: &LandmarkFrame,
    general: f64,
    limb: f64,
    pose_unit_cm: f64,
) -> Vec<SegmentMeasurement> {
    Segment::all()
        .iter()
        .map(|&segment| {
            let (a, b) = segment.endpoints();
            let confidence = frame
                .visibility(a)
                .unwrap_or(0.0)
                .min(frame.visibility(b).unwrap_or(0.0));
            let factor = if segment.is_lower_limb() { limb } else { general };
            let length_cm = frame
                .pair(a, b)
                .map(|(pa, pb)| distance(pa, pb) * factor * pose_unit_cm);
            SegmentMeasurement {
                segment,
                length_cm,
                confidence,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinemetric_core::Landmark;

    #[test]
    fn test_measure_partial_frame() {
        let frame = LandmarkFrame::new(0)
            .with(LandmarkName::LeftHip, Landmark::new(0.4, 0.5, 0.0, 0.9))
            .with(LandmarkName::LeftKnee, Landmark::new(0.4, 0.9, 0.0, 0.7))
            .with(LandmarkName::LeftAnkle, Landmark::new(0.4, 1.3, 0.0, 0.3));

        let segments = measure_segments(&frame, 1.0, 1.5, 100.0);
        assert_eq!(segments.len(), Segment::all().len());

        let thigh = segments.iter().find(|m| m.segment == Segment::ThighLeft).unwrap();
        assert!((thigh.length_cm.unwrap() - 60.0).abs() < 1e-9);
        assert!((thigh.confidence - 0.7).abs() < 1e-12);

        let shin = segments.iter().find(|m| m.segment == Segment::ShinLeft).unwrap();
        assert!(!shin.is_valid());
        assert!((shin.confidence - 0.3).abs() < 1e-12);
    }
}
