//! Diagnostic job model and state machine

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kinemetric_calibration::AppliedCalibration;
use kinemetric_core::{AssessmentType, AthleteId, JobId};

use crate::FailureKind;

/// Opaque reference to the recorded video
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VideoRef(pub String);

impl VideoRef {
    pub fn new(uri: impl Into<String>) -> Self {
        VideoRef(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Job lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    /// Created, admission not yet decided
    Pending,
    /// Credits reserved, waiting for a worker
    Queued,
    /// A worker is running the analysis
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Whether the state machine allows `self → to`
    pub fn can_transition_to(self, to: JobStatus) -> bool {
        use JobStatus::*;
        matches!(
            (self, to),
            (Pending, Queued)
                | (Pending, Failed)
                | (Queued, Processing)
                | (Queued, Failed)
                | (Processing, Completed)
                | (Processing, Failed)
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobStatus::Pending => "PENDING",
            JobStatus::Queued => "QUEUED",
            JobStatus::Processing => "PROCESSING",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// One requested diagnostic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticJob {
    pub id: JobId,
    pub athlete: AthleteId,
    pub assessment: AssessmentType,
    pub video: VideoRef,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub queued_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Set only when FAILED
    pub error: Option<String>,
    pub failure: Option<FailureKind>,
    /// Factors the analysis ran with
    pub calibration: Option<AppliedCalibration>,
    /// Credits reserved for this job
    pub units_debited: u32,
    pub refunded: bool,
    /// Partner job of a paired left/right submission
    pub paired_with: Option<JobId>,
}

impl DiagnosticJob {
    pub fn new(id: JobId, athlete: AthleteId, assessment: AssessmentType, video: VideoRef) -> Self {
        Self {
            id,
            athlete,
            assessment,
            video,
            status: JobStatus::Pending,
            created_at: Utc::now(),
            queued_at: None,
            started_at: None,
            finished_at: None,
            error: None,
            failure: None,
            calibration: None,
            units_debited: 0,
            refunded: false,
            paired_with: None,
        }
    }

    /// Whether the job failed at admission
    pub fn is_insufficient_balance(&self) -> bool {
        self.failure == Some(FailureKind::InsufficientBalance)
    }

    /// Apply a status change and stamp the matching timestamp
    pub(crate) fn set_status(&mut self, to: JobStatus) {
        let now = Utc::now();
        match to {
            JobStatus::Queued => self.queued_at = Some(now),
            JobStatus::Processing => self.started_at = Some(now),
            JobStatus::Completed | JobStatus::Failed => self.finished_at = Some(now),
            JobStatus::Pending => {}
        }
        self.status = to;
    }
}
