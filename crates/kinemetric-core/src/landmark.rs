//! Landmark vocabulary and per-frame access
//!
//! A [`LandmarkFrame`] is what the pose estimator returns for one video
//! frame: named body points with a detection confidence. Lookups apply a
//! fixed visibility policy and report low-confidence points as absent.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{KinemetricError, Point3};

/// Minimum visibility for a landmark to count as present
pub const VISIBILITY_THRESHOLD: f64 = 0.5;

/// Body side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! landmark_names {
    ($($variant:ident => $name:literal,)*) => {
        /// The 33-point body landmark vocabulary, in estimator index order
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum LandmarkName {
            $($variant,)*
        }

        impl LandmarkName {
            /// All landmarks in index order
            pub fn all() -> &'static [LandmarkName] {
                &[$(LandmarkName::$variant,)*]
            }

            /// Canonical snake_case name
            pub fn as_str(self) -> &'static str {
                match self {
                    $(LandmarkName::$variant => $name,)*
                }
            }
        }

        impl FromStr for LandmarkName {
            type Err = KinemetricError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(LandmarkName::$variant),)*
                    other => Err(KinemetricError::UnknownLandmark(other.to_string())),
                }
            }
        }
    };
}

landmark_names! {
    Nose => "nose",
    LeftEyeInner => "left_eye_inner",
    LeftEye => "left_eye",
    LeftEyeOuter => "left_eye_outer",
    RightEyeInner => "right_eye_inner",
    RightEye => "right_eye",
    RightEyeOuter => "right_eye_outer",
    LeftEar => "left_ear",
    RightEar => "right_ear",
    MouthLeft => "mouth_left",
    MouthRight => "mouth_right",
    LeftShoulder => "left_shoulder",
    RightShoulder => "right_shoulder",
    LeftElbow => "left_elbow",
    RightElbow => "right_elbow",
    LeftWrist => "left_wrist",
    RightWrist => "right_wrist",
    LeftPinky => "left_pinky",
    RightPinky => "right_pinky",
    LeftIndex => "left_index",
    RightIndex => "right_index",
    LeftThumb => "left_thumb",
    RightThumb => "right_thumb",
    LeftHip => "left_hip",
    RightHip => "right_hip",
    LeftKnee => "left_knee",
    RightKnee => "right_knee",
    LeftAnkle => "left_ankle",
    RightAnkle => "right_ankle",
    LeftHeel => "left_heel",
    RightHeel => "right_heel",
    LeftFootIndex => "left_foot_index",
    RightFootIndex => "right_foot_index",
}

impl LandmarkName {
    /// Number of landmarks
    pub fn count() -> usize {
        33
    }

    /// Estimator index of this landmark
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn shoulder(side: Side) -> Self {
        match side {
            Side::Left => LandmarkName::LeftShoulder,
            Side::Right => LandmarkName::RightShoulder,
        }
    }

    pub fn elbow(side: Side) -> Self {
        match side {
            Side::Left => LandmarkName::LeftElbow,
            Side::Right => LandmarkName::RightElbow,
        }
    }

    pub fn wrist(side: Side) -> Self {
        match side {
            Side::Left => LandmarkName::LeftWrist,
            Side::Right => LandmarkName::RightWrist,
        }
    }

    pub fn hip(side: Side) -> Self {
        match side {
            Side::Left => LandmarkName::LeftHip,
            Side::Right => LandmarkName::RightHip,
        }
    }

    pub fn knee(side: Side) -> Self {
        match side {
            Side::Left => LandmarkName::LeftKnee,
            Side::Right => LandmarkName::RightKnee,
        }
    }

    pub fn ankle(side: Side) -> Self {
        match side {
            Side::Left => LandmarkName::LeftAnkle,
            Side::Right => LandmarkName::RightAnkle,
        }
    }

    pub fn heel(side: Side) -> Self {
        match side {
            Side::Left => LandmarkName::LeftHeel,
            Side::Right => LandmarkName::RightHeel,
        }
    }

    pub fn foot_index(side: Side) -> Self {
        match side {
            Side::Left => LandmarkName::LeftFootIndex,
            Side::Right => LandmarkName::RightFootIndex,
        }
    }
}

impl fmt::Display for LandmarkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One detected landmark
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub position: Point3,
    /// Detection confidence in [0, 1]
    pub visibility: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64, z: f64, visibility: f64) -> Self {
        Self {
            position: Point3::new(x, y, z),
            visibility,
        }
    }

    /// Whether this landmark passes the visibility policy
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visibility >= VISIBILITY_THRESHOLD && self.position.is_finite()
    }
}

/// Landmarks detected on a single video frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    /// Frame index within the source video
    pub index: usize,
    /// Presentation timestamp, if the estimator reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_ms: Option<u64>,
    pub landmarks: BTreeMap<LandmarkName, Landmark>,
}

impl LandmarkFrame {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            timestamp_ms: None,
            landmarks: BTreeMap::new(),
        }
    }

    /// Builder-style insert
    pub fn with(mut self, name: LandmarkName, landmark: Landmark) -> Self {
        self.landmarks.insert(name, landmark);
        self
    }

    pub fn insert(&mut self, name: LandmarkName, landmark: Landmark) {
        self.landmarks.insert(name, landmark);
    }

    /// Coordinate of `name` if present and visible, else `None`
    pub fn get(&self, name: LandmarkName) -> Option<Point3> {
        self.landmarks
            .get(&name)
            .filter(|lm| lm.is_visible())
            .map(|lm| lm.position)
    }

    /// Visible coordinate pre-multiplied by a calibration factor
    pub fn get_scaled(&self, name: LandmarkName, factor: f64) -> Option<Point3> {
        self.get(name).map(|p| p * factor)
    }

    /// Raw visibility regardless of the policy threshold
    pub fn visibility(&self, name: LandmarkName) -> Option<f64> {
        self.landmarks.get(&name).map(|lm| lm.visibility)
    }

    /// Both sides of a paired landmark, if both are visible
    pub fn pair(&self, left: LandmarkName, right: LandmarkName) -> Option<(Point3, Point3)> {
        Some((self.get(left)?, self.get(right)?))
    }

    /// Number of landmarks passing the visibility policy
    pub fn visible_count(&self) -> usize {
        self.landmarks.values().filter(|lm| lm.is_visible()).count()
    }
}
