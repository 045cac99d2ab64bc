//! Calculator capability and dispatch table

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use kinemetric_calibration::AppliedCalibration;
use kinemetric_core::{AssessmentType, LandmarkFrame, Side};

use crate::{
    JumpCalculator, MeasurementResult, PostureCalculator, RubricConfig, ShoulderCalculator,
    SquatCalculator, StanceCalculator,
};

/// Turns an ordered landmark sequence into a scored result.
///
/// Implementations scan frames forward once, skip frames missing the
/// landmarks a measurement needs, and never fail: an unusable sequence
/// yields a zeroed result flagged as insufficient data.
pub trait Calculator: Send + Sync + fmt::Debug {
    /// Assessment this calculator scores
    fn assessment(&self) -> AssessmentType;

    fn compute(&self, frames: &[LandmarkFrame], calibration: &AppliedCalibration)
        -> MeasurementResult;
}

/// Scored assessment, each variant carrying its calculator
#[derive(Debug, Clone)]
pub enum Assessment {
    Squat(SquatCalculator),
    Posture(PostureCalculator),
    ShoulderCircumduction(ShoulderCalculator),
    SingleLegStance(StanceCalculator),
    VerticalJump(JumpCalculator),
    /// Calculator supplied by the embedding application
    Custom(Arc<dyn Calculator>),
}

impl Assessment {
    /// Build the calculator for a scored assessment type
    pub fn for_type(assessment: AssessmentType, rubrics: &RubricConfig) -> Option<Self> {
        let calculator = match assessment {
            AssessmentType::Squat => Assessment::Squat(SquatCalculator::new(rubrics.squat.clone())),
            AssessmentType::Posture => {
                Assessment::Posture(PostureCalculator::new(rubrics.posture.clone()))
            }
            AssessmentType::ShoulderCircumduction => {
                Assessment::ShoulderCircumduction(ShoulderCalculator::new(rubrics.shoulder.clone()))
            }
            AssessmentType::SingleLegStanceLeft => Assessment::SingleLegStance(
                StanceCalculator::new(Side::Left, rubrics.stance.clone()),
            ),
            AssessmentType::SingleLegStanceRight => Assessment::SingleLegStance(
                StanceCalculator::new(Side::Right, rubrics.stance.clone()),
            ),
            AssessmentType::VerticalJump => {
                Assessment::VerticalJump(JumpCalculator::new(rubrics.jump.clone()))
            }
            AssessmentType::AnthropometryCalibration => return None,
        };
        Some(calculator)
    }
}

impl Calculator for Assessment {
    fn assessment(&self) -> AssessmentType {
        match self {
            Assessment::Squat(c) => c.assessment(),
            Assessment::Posture(c) => c.assessment(),
            Assessment::ShoulderCircumduction(c) => c.assessment(),
            Assessment::SingleLegStance(c) => c.assessment(),
            Assessment::VerticalJump(c) => c.assessment(),
            Assessment::Custom(c) => c.assessment(),
        }
    }

    fn compute(
        &self,
        frames: &[LandmarkFrame],
        calibration: &AppliedCalibration,
    ) -> MeasurementResult {
        let result = match self {
            Assessment::Squat(c) => c.compute(frames, calibration),
            Assessment::Posture(c) => c.compute(frames, calibration),
            Assessment::ShoulderCircumduction(c) => c.compute(frames, calibration),
            Assessment::SingleLegStance(c) => c.compute(frames, calibration),
            Assessment::VerticalJump(c) => c.compute(frames, calibration),
            Assessment::Custom(c) => c.compute(frames, calibration),
        };
        debug!(
            assessment = %result.assessment,
            frames = frames.len(),
            composite = result.composite,
            insufficient = result.insufficient_data,
            "assessment scored"
        );
        result
    }
}

/// Assessment type → calculator lookup, built once at startup
#[derive(Debug, Clone)]
pub struct CalculatorTable {
    entries: BTreeMap<AssessmentType, Assessment>,
}

impl CalculatorTable {
    pub fn new(rubrics: &RubricConfig) -> Self {
        let entries = AssessmentType::all()
            .iter()
            .filter_map(|&t| Assessment::for_type(t, rubrics).map(|c| (t, c)))
            .collect();
        Self { entries }
    }

    /// Replace the calculator for the assessment `calculator` reports
    pub fn register(&mut self, calculator: Arc<dyn Calculator>) {
        self.entries
            .insert(calculator.assessment(), Assessment::Custom(calculator));
    }

    pub fn get(&self, assessment: AssessmentType) -> Option<&Assessment> {
        self.entries.get(&assessment)
    }

    /// Run the calculator for `assessment`, if one is registered
    pub fn compute(
        &self,
        assessment: AssessmentType,
        frames: &[LandmarkFrame],
        calibration: &AppliedCalibration,
    ) -> Option<MeasurementResult> {
        self.get(assessment).map(|c| c.compute(frames, calibration))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CalculatorTable {
    fn default() -> Self {
        CalculatorTable::new(&RubricConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_covers_scored_types() {
        let table = CalculatorTable::default();
        for &t in AssessmentType::all() {
            assert_eq!(table.get(t).is_some(), t.is_scored(), "{}", t);
            if let Some(c) = table.get(t) {
                assert_eq!(c.assessment(), t);
            }
        }
        assert_eq!(table.len(), 6);
    }

    #[derive(Debug)]
    struct FixedScore;

    impl Calculator for FixedScore {
        fn assessment(&self) -> AssessmentType {
            AssessmentType::Posture
        }

        fn compute(&self, _frames: &[LandmarkFrame], calibration: &AppliedCalibration) -> MeasurementResult {
            let mut result = MeasurementResult::insufficient(AssessmentType::Posture, calibration, &[], &[]);
            result.composite = 42.0;
            result.insufficient_data = false;
            result
        }
    }

    #[test]
    fn test_register_overrides_entry() {
        let mut table = CalculatorTable::default();
        table.register(Arc::new(FixedScore));
        assert_eq!(table.len(), 6);
        let result = table
            .compute(AssessmentType::Posture, &[], &AppliedCalibration::default())
            .unwrap();
        assert_eq!(result.composite, 42.0);
        assert!(matches!(table.get(AssessmentType::Posture), Some(Assessment::Custom(_))));
    }

    #[test]
    fn test_empty_sequence_is_insufficient() {
        let table = CalculatorTable::default();
        let calibration = AppliedCalibration::default();
        for &t in AssessmentType::all().iter().filter(|t| t.is_scored()) {
            let result = table.compute(t, &[], &calibration).unwrap();
            assert!(result.insufficient_data, "{}", t);
            assert_eq!(result.composite, 0.0);
            assert_eq!(result.feedback, vec![crate::INSUFFICIENT_DATA.to_string()]);
            assert!(result.sub_scores.iter().all(|s| s.value == 0.0));
        }
    }
}
