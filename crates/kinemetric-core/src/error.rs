//! Error types shared across the pipeline

use thiserror::Error;

/// Core errors
///
/// Numerical and missing-data conditions never surface here; geometry and
/// landmark lookups absorb them locally.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KinemetricError {
    // Vocabulary errors
    #[error("Unknown landmark: {0}")]
    UnknownLandmark(String),

    #[error("Unknown assessment type: {0}")]
    UnknownAssessment(String),
}

/// Result type for core operations
pub type KinemetricResult<T> = std::result::Result<T, KinemetricError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AssessmentType, LandmarkName};

    #[test]
    fn test_vocabulary_errors() {
        assert_eq!(
            "left_tail".parse::<LandmarkName>(),
            Err(KinemetricError::UnknownLandmark("left_tail".to_string()))
        );
        assert_eq!(
            "DEADLIFT".parse::<AssessmentType>(),
            Err(KinemetricError::UnknownAssessment("DEADLIFT".to_string()))
        );
    }
}
