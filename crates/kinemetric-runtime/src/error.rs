//! Error types for job execution

use serde::{Deserialize, Serialize};
use thiserror::Error;

use kinemetric_core::JobId;

use crate::JobStatus;

/// Failure reported by an external collaborator
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CollaboratorError {
    #[error("Video not found: {0}")]
    VideoNotFound(String),

    #[error("Pose estimation failed: {0}")]
    Estimation(String),

    #[error("Artifact store unavailable: {0}")]
    Storage(String),

    #[error("Collaborator timed out")]
    Timeout,
}

/// Job orchestration errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum JobError {
    // Admission errors
    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: u32, available: i64 },

    // Collaborator errors
    #[error("Pose estimation error: {0}")]
    PoseEstimation(CollaboratorError),

    #[error("Artifact error: {0}")]
    Artifact(CollaboratorError),

    // Execution errors
    #[error("Computation failed: {0}")]
    Computation(String),

    // State errors
    #[error("Invalid transition for job {job}: {from} -> {to}")]
    InvalidTransition {
        job: JobId,
        from: JobStatus,
        to: JobStatus,
    },

    #[error("Job not found: {0}")]
    JobNotFound(JobId),

    #[error("Result already exists for job {0}")]
    ResultAlreadyExists(JobId),
}

impl JobError {
    /// Failure category recorded on the job
    pub fn kind(&self) -> FailureKind {
        match self {
            JobError::InsufficientBalance { .. } => FailureKind::InsufficientBalance,
            JobError::PoseEstimation(_) | JobError::Artifact(_) => FailureKind::Collaborator,
            _ => FailureKind::Computation,
        }
    }
}

/// Why a job ended FAILED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Admission control rejected the job; nothing was debited
    InsufficientBalance,
    /// Pose estimation or artifact storage failed
    Collaborator,
    /// Metric computation or result persistence failed
    Computation,
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for job operations
pub type JobResult<T> = std::result::Result<T, JobError>;
