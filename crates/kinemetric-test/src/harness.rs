//! Pipeline harness
//!
//! Wires an orchestrator to scripted collaborators so a test can hand in a
//! synthetic capture and get back the terminal job and its result.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use kinemetric_core::{AssessmentType, AthleteId, LandmarkFrame, Side};
use kinemetric_runtime::{
    AssessmentResult, DiagnosticJob, InMemoryArtifactStore, InMemoryLedger, JobResult, JobStatus, Orchestrator,
    RuntimeConfig, VideoRef,
};

use crate::collaborators::ScriptedPoseEstimator;
use crate::synthetic::{self, JumpCapture, StanceCapture};

/// Orchestrator type driven by the harness
pub type HarnessOrchestrator = Orchestrator<Arc<ScriptedPoseEstimator>, InMemoryLedger, InMemoryArtifactStore>;

/// Orchestrator plus the handle needed to script its pose estimator
pub struct PipelineHarness {
    pub orchestrator: HarnessOrchestrator,
    pose: Arc<ScriptedPoseEstimator>,
    next_video: AtomicU64,
}

impl PipelineHarness {
    pub fn new(config: RuntimeConfig) -> Self {
        let pose = Arc::new(ScriptedPoseEstimator::new());
        let orchestrator = Orchestrator::new(
            &config,
            Arc::clone(&pose),
            InMemoryLedger::new(),
            InMemoryArtifactStore::new(),
        );
        Self {
            orchestrator,
            pose,
            next_video: AtomicU64::new(1),
        }
    }

    pub fn pose(&self) -> &ScriptedPoseEstimator {
        &self.pose
    }

    /// Credit an athlete
    pub fn fund(&self, athlete: AthleteId, units: u32) {
        self.orchestrator.ledger().deposit(athlete, units);
    }

    /// Register a capture under a fresh video reference
    pub fn upload(&self, frames: Vec<LandmarkFrame>) -> VideoRef {
        let n = self.next_video.fetch_add(1, Ordering::SeqCst);
        let video = VideoRef::new(format!("mem://capture/{}", n));
        self.pose.script(&video, frames);
        video
    }

    /// Submit and run one assessment to a terminal state
    pub async fn run(
        &self,
        athlete: AthleteId,
        assessment: AssessmentType,
        frames: Vec<LandmarkFrame>,
    ) -> JobResult<DiagnosticJob> {
        let video = self.upload(frames);
        self.orchestrator.submit_and_run(athlete, assessment, video).await
    }

    pub fn result(&self, job: &DiagnosticJob) -> Option<AssessmentResult> {
        self.orchestrator.result(job.id)
    }
}

impl Default for PipelineHarness {
    fn default() -> Self {
        PipelineHarness::new(RuntimeConfig::default())
    }
}

/// Well-formed capture for each scored assessment
pub fn reference_captures() -> BTreeMap<AssessmentType, Vec<LandmarkFrame>> {
    let mut captures = BTreeMap::new();
    captures.insert(AssessmentType::Squat, synthetic::squat_rep(95.0, 41));
    captures.insert(AssessmentType::Posture, synthetic::standing(30));
    captures.insert(
        AssessmentType::ShoulderCircumduction,
        synthetic::shoulder_sweep(175.0, 0.0, 61),
    );
    captures.insert(
        AssessmentType::SingleLegStanceLeft,
        StanceCapture::default().side(Side::Left).sway(0.5).generate(),
    );
    captures.insert(
        AssessmentType::SingleLegStanceRight,
        StanceCapture::default().side(Side::Right).sway(0.5).generate(),
    );
    captures.insert(AssessmentType::VerticalJump, JumpCapture::default().generate());
    captures
}

/// Outcome of running the full battery for one athlete
#[derive(Debug, Default)]
pub struct BatteryReport {
    pub jobs: Vec<DiagnosticJob>,
    pub composites: BTreeMap<AssessmentType, f64>,
}

impl BatteryReport {
    pub fn all_completed(&self) -> bool {
        self.jobs
            .iter()
            .all(|j| j.status == JobStatus::Completed)
    }
}

/// Run every scored assessment on its reference capture
pub async fn run_battery(harness: &PipelineHarness, athlete: AthleteId) -> JobResult<BatteryReport> {
    let mut report = BatteryReport::default();
    for (assessment, frames) in reference_captures() {
        let job = harness.run(athlete, assessment, frames).await?;
        if let Some(composite) = harness.result(&job).and_then(|r| r.composite()) {
            report.composites.insert(assessment, composite);
        }
        report.jobs.push(job);
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinemetric_runtime::CreditLedger;

    #[tokio::test]
    async fn test_battery() {
        let harness = PipelineHarness::default();
        let athlete = AthleteId::new(1);
        harness.fund(athlete, 10);

        let report = run_battery(&harness, athlete).await.unwrap();
        assert_eq!(report.jobs.len(), 6);
        assert!(report.all_completed());
        assert_eq!(report.composites.len(), 6);
        assert_eq!(harness.pose().calls(), 6);
        assert_eq!(harness.orchestrator.ledger().get_balance(athlete), 4);
    }
}
