//! Measurement result model

use serde::{Deserialize, Serialize};

use kinemetric_calibration::AppliedCalibration;
use kinemetric_core::AssessmentType;

/// Feedback line emitted when no usable frames were found
pub const INSUFFICIENT_DATA: &str =
    "Insufficient data: key landmarks were not visible long enough to analyze this movement.";

/// Unit of a scalar measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Degrees,
    Centimeters,
    Seconds,
    /// Dimensionless ratio
    Ratio,
    Count,
}

/// Named scalar measurement; `None` when it could not be measured
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub name: String,
    pub value: Option<f64>,
    pub unit: Unit,
}

/// One rubric component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubScore {
    pub name: String,
    /// Points awarded, floored at 0
    pub value: f64,
    /// Points available
    pub max: f64,
}

/// Extremum frame selected for snapshotting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepresentativeFrame {
    pub label: String,
    /// Position in the analyzed sequence
    pub position: usize,
    /// Frame index in the source video
    pub frame_index: usize,
    /// Measurement value at this frame
    pub value: f64,
}

/// Output of one calculator run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementResult {
    pub assessment: AssessmentType,
    pub measurements: Vec<Measurement>,
    pub sub_scores: Vec<SubScore>,
    /// Composite score in [0, 100]
    pub composite: f64,
    pub representative_frames: Vec<RepresentativeFrame>,
    pub feedback: Vec<String>,
    pub calibration: AppliedCalibration,
    pub insufficient_data: bool,
}

impl MeasurementResult {
    /// Zeroed result for a sequence with nothing to analyze
    pub fn insufficient(
        assessment: AssessmentType,
        calibration: &AppliedCalibration,
        measurements: &[(&str, Unit)],
        sub_scores: &[(&str, f64)],
    ) -> Self {
        Self {
            assessment,
            measurements: measurements
                .iter()
                .map(|&(name, unit)| Measurement {
                    name: name.to_string(),
                    value: None,
                    unit,
                })
                .collect(),
            sub_scores: sub_scores
                .iter()
                .map(|&(name, max)| SubScore {
                    name: name.to_string(),
                    value: 0.0,
                    max,
                })
                .collect(),
            composite: 0.0,
            representative_frames: Vec::new(),
            feedback: vec![INSUFFICIENT_DATA.to_string()],
            calibration: *calibration,
            insufficient_data: true,
        }
    }

    /// Value of a named measurement, if measured
    pub fn measurement(&self, name: &str) -> Option<f64> {
        self.measurements
            .iter()
            .find(|m| m.name == name)
            .and_then(|m| m.value)
    }

    /// Points of a named sub-score
    pub fn sub_score(&self, name: &str) -> Option<f64> {
        self.sub_scores.iter().find(|s| s.name == name).map(|s| s.value)
    }

    /// Representative frame by label
    pub fn frame(&self, label: &str) -> Option<&RepresentativeFrame> {
        self.representative_frames.iter().find(|f| f.label == label)
    }

    /// Full result as a JSON document
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Incremental builder for measurement lists
#[derive(Debug, Default)]
pub struct Measurements(Vec<Measurement>);

impl Measurements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: &str, value: Option<f64>, unit: Unit) -> &mut Self {
        self.0.push(Measurement {
            name: name.to_string(),
            value: value.filter(|v| v.is_finite()),
            unit,
        });
        self
    }

    pub fn into_vec(self) -> Vec<Measurement> {
        self.0
    }
}
