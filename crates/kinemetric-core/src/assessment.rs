//! Assessment types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{KinemetricError, Side};

/// Kind of diagnostic an athlete can request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssessmentType {
    Squat,
    Posture,
    ShoulderCircumduction,
    SingleLegStanceLeft,
    SingleLegStanceRight,
    VerticalJump,
    AnthropometryCalibration,
}

impl AssessmentType {
    /// All assessment types
    pub fn all() -> &'static [AssessmentType] {
        &[
            AssessmentType::Squat,
            AssessmentType::Posture,
            AssessmentType::ShoulderCircumduction,
            AssessmentType::SingleLegStanceLeft,
            AssessmentType::SingleLegStanceRight,
            AssessmentType::VerticalJump,
            AssessmentType::AnthropometryCalibration,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AssessmentType::Squat => "SQUAT",
            AssessmentType::Posture => "POSTURE",
            AssessmentType::ShoulderCircumduction => "SHOULDER_CIRCUMDUCTION",
            AssessmentType::SingleLegStanceLeft => "SINGLE_LEG_STANCE_LEFT",
            AssessmentType::SingleLegStanceRight => "SINGLE_LEG_STANCE_RIGHT",
            AssessmentType::VerticalJump => "VERTICAL_JUMP",
            AssessmentType::AnthropometryCalibration => "ANTHROPOMETRY_CALIBRATION",
        }
    }

    /// Stance leg for single-leg stance variants
    pub fn stance_side(self) -> Option<Side> {
        match self {
            AssessmentType::SingleLegStanceLeft => Some(Side::Left),
            AssessmentType::SingleLegStanceRight => Some(Side::Right),
            _ => None,
        }
    }

    /// Whether the type produces a movement score (as opposed to a calibration)
    pub fn is_scored(self) -> bool {
        !matches!(self, AssessmentType::AnthropometryCalibration)
    }
}

impl fmt::Display for AssessmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssessmentType {
    type Err = KinemetricError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AssessmentType::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| KinemetricError::UnknownAssessment(s.to_string()))
    }
}
