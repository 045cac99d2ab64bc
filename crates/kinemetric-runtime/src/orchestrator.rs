//! Job orchestrator
//!
//! Drives diagnostic jobs through admission control, pose estimation,
//! calibration, metric computation and report assembly. Every admitted job
//! ends COMPLETED with exactly one result, or FAILED with its credits
//! refunded exactly once.

use std::sync::Arc;

use tokio::task::{self, JoinHandle};
use tracing::{debug, info, warn};

use kinemetric_calibration::{AnthropometryProfile, CalibrationEngine, CalibrationError};
use kinemetric_core::{AssessmentType, AthleteId, JobId, LandmarkFrame};
use kinemetric_metrics::CalculatorTable;

use crate::{
    ArtifactStore, AssessmentResult, CreditLedger, DiagnosticJob, JobError, JobResult, JobStatus,
    JobStore, OrchestratorConfig, PoseEstimator, ProfileStore, ReportAssembler, RuntimeConfig, VideoRef,
};

struct Inner<P, L, A> {
    pose: P,
    ledger: L,
    artifacts: A,
    jobs: JobStore,
    profiles: ProfileStore,
    calculators: Arc<CalculatorTable>,
    calibration: CalibrationEngine,
    assembler: ReportAssembler,
    config: OrchestratorConfig,
}

/// Shared handle to the pipeline; clones refer to the same stores
pub struct Orchestrator<P, L, A> {
    inner: Arc<Inner<P, L, A>>,
}

impl<P, L, A> Clone for Orchestrator<P, L, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P, L, A> Orchestrator<P, L, A>
where
    P: PoseEstimator,
    L: CreditLedger,
    A: ArtifactStore,
{
    /// Build a pipeline; the calculator table is constructed once here
    pub fn new(config: &RuntimeConfig, pose: P, ledger: L, artifacts: A) -> Self {
        Self::with_calculators(config, CalculatorTable::new(&config.rubrics), pose, ledger, artifacts)
    }

    /// Build a pipeline around a prepared calculator table
    pub fn with_calculators(
        config: &RuntimeConfig,
        calculators: CalculatorTable,
        pose: P,
        ledger: L,
        artifacts: A,
    ) -> Self {
        let calculators = Arc::new(calculators);
        debug!(calculators = calculators.len(), "orchestrator ready");
        Self {
            inner: Arc::new(Inner {
                pose,
                ledger,
                artifacts,
                jobs: JobStore::new(),
                profiles: ProfileStore::new(),
                calculators,
                calibration: CalibrationEngine::new(config.calibration.clone()),
                assembler: ReportAssembler::new(),
                config: config.orchestrator.clone(),
            }),
        }
    }

    // Admission

    /// Create a job and run admission control.
    ///
    /// With enough credits the units are debited and the job is QUEUED.
    /// Otherwise nothing is debited and the job is returned FAILED with
    /// an insufficient-balance failure.
    pub fn submit(
        &self,
        athlete: AthleteId,
        assessment: AssessmentType,
        video: VideoRef,
    ) -> JobResult<DiagnosticJob> {
        let inner = &self.inner;
        let job = inner.jobs.create(athlete, assessment, video);
        let units = inner.config.units_per_assessment;
        info!(job = %job.id, athlete = %athlete, assessment = %assessment, "job submitted");

        if inner.ledger.debit(athlete, units) {
            inner.jobs.mark_queued(job.id, units, None)
        } else {
            self.reject(job.id, athlete, units)
        }
    }

    /// Submit left and right single-leg stance together for one debit.
    ///
    /// Each job carries its own share of the units and refunds only that
    /// share if it fails.
    pub fn submit_paired_stance(
        &self,
        athlete: AthleteId,
        left_video: VideoRef,
        right_video: VideoRef,
    ) -> JobResult<(DiagnosticJob, DiagnosticJob)> {
        let inner = &self.inner;
        let left = inner
            .jobs
            .create(athlete, AssessmentType::SingleLegStanceLeft, left_video);
        let right = inner
            .jobs
            .create(athlete, AssessmentType::SingleLegStanceRight, right_video);
        let units = inner.config.paired_stance_units;
        info!(left = %left.id, right = %right.id, athlete = %athlete, "paired stance submitted");

        if inner.ledger.debit(athlete, units) {
            let right_units = units / 2;
            let left = inner.jobs.mark_queued(left.id, units - right_units, Some(right.id))?;
            let right = inner.jobs.mark_queued(right.id, right_units, Some(left.id))?;
            Ok((left, right))
        } else {
            let left = self.reject(left.id, athlete, units)?;
            let right = self.reject(right.id, athlete, units)?;
            Ok((left, right))
        }
    }

    fn reject(&self, id: JobId, athlete: AthleteId, required: u32) -> JobResult<DiagnosticJob> {
        let err = JobError::InsufficientBalance {
            required,
            available: self.inner.ledger.get_balance(athlete),
        };
        warn!(job = %id, athlete = %athlete, error = %err, "admission rejected");
        self.inner.jobs.fail_and_claim_refund(id, err.kind(), &err.to_string())?;
        self.inner.jobs.get(id).ok_or(JobError::JobNotFound(id))
    }

    // Execution

    /// Drive a QUEUED job to a terminal state.
    ///
    /// Errors are returned only when the job cannot be started (unknown id
    /// or not QUEUED). Failures during execution are recorded on the job,
    /// which is returned FAILED.
    pub async fn run_job(&self, id: JobId) -> JobResult<DiagnosticJob> {
        let job = self.inner.jobs.transition(id, JobStatus::Processing)?;
        match self.execute(&job).await {
            Ok(done) => Ok(done),
            Err(err) => {
                self.fail(&job, &err);
                self.inner.jobs.get(id).ok_or(JobError::JobNotFound(id))
            }
        }
    }

    /// Spawn `run_job` on the tokio runtime
    pub fn dispatch(&self, id: JobId) -> JoinHandle<JobResult<DiagnosticJob>> {
        let this = self.clone();
        tokio::spawn(async move { this.run_job(id).await })
    }

    /// Submit and, if admitted, run to completion
    pub async fn submit_and_run(
        &self,
        athlete: AthleteId,
        assessment: AssessmentType,
        video: VideoRef,
    ) -> JobResult<DiagnosticJob> {
        let job = self.submit(athlete, assessment, video)?;
        if job.status == JobStatus::Queued {
            self.run_job(job.id).await
        } else {
            Ok(job)
        }
    }

    async fn execute(&self, job: &DiagnosticJob) -> JobResult<DiagnosticJob> {
        let inner = &self.inner;
        let frames = inner
            .pose
            .estimate(&job.video)
            .await
            .map_err(JobError::PoseEstimation)?;
        debug!(job = %job.id, frames = frames.len(), "pose estimation finished");
        let frames = Arc::new(frames);

        if job.assessment.is_scored() {
            self.execute_scored(job, frames).await
        } else {
            self.execute_calibration(job, frames).await
        }
    }

    async fn execute_scored(
        &self,
        job: &DiagnosticJob,
        frames: Arc<Vec<LandmarkFrame>>,
    ) -> JobResult<DiagnosticJob> {
        let inner = &self.inner;
        let profile = inner.profiles.get(job.athlete);
        let calibration = inner.calibration.resolve(profile.as_ref(), &frames);
        inner.jobs.update(job.id, |j| j.calibration = Some(calibration))?;

        let table = Arc::clone(&inner.calculators);
        let input = Arc::clone(&frames);
        let assessment = job.assessment;
        let result = task::spawn_blocking(move || table.compute(assessment, &input, &calibration))
            .await
            .map_err(|e| JobError::Computation(e.to_string()))?
            .ok_or_else(|| JobError::Computation(format!("no calculator for {}", assessment)))?;
        debug!(
            job = %job.id,
            composite = result.composite,
            insufficient = result.insufficient_data,
            calibrated = calibration.calibrated,
            "metrics computed"
        );

        let assembled = inner.assembler.assemble(job, &frames, &result, &inner.artifacts)?;
        inner.jobs.complete(job.id, assembled)
    }

    async fn execute_calibration(
        &self,
        job: &DiagnosticJob,
        frames: Arc<Vec<LandmarkFrame>>,
    ) -> JobResult<DiagnosticJob> {
        let inner = &self.inner;
        let profile = inner.profiles.get(job.athlete);
        let engine = inner.calibration.clone();
        let input = Arc::clone(&frames);
        let report = task::spawn_blocking(move || engine.calibrate(&input, profile.as_ref()))
            .await
            .map_err(|e| JobError::Computation(e.to_string()))?;
        inner.jobs.update(job.id, |j| j.calibration = Some(report.applied))?;
        for issue in &report.quality_issues {
            info!(job = %job.id, issue = %issue, "capture quality");
        }

        let assembled = inner
            .assembler
            .assemble_calibration(job, &frames, &report, &inner.artifacts)?;
        let done = inner.jobs.complete(job.id, assembled)?;

        if report.applied.calibrated {
            let applied = report.applied;
            inner.profiles.update(job.athlete, |p| {
                p.record_calibration(job.id, applied.general, Some(applied.limb), report.segments.clone())
            });
            info!(job = %job.id, athlete = %job.athlete, general = applied.general, limb = applied.limb, "profile calibrated");
        } else {
            warn!(job = %job.id, fallback = ?report.applied.fallback, "calibration not stored");
        }
        Ok(done)
    }

    fn fail(&self, job: &DiagnosticJob, err: &JobError) {
        let inner = &self.inner;
        warn!(job = %job.id, athlete = %job.athlete, error = %err, "job failed");
        match inner.jobs.fail_and_claim_refund(job.id, err.kind(), &err.to_string()) {
            Ok(Some(units)) => {
                inner
                    .ledger
                    .refund(job.athlete, units, &format!("job {} failed: {}", job.id, err));
            }
            Ok(None) => {}
            Err(e) => warn!(job = %job.id, error = %e, "could not record failure"),
        }
    }

    // Queries

    pub fn job(&self, id: JobId) -> Option<DiagnosticJob> {
        self.inner.jobs.get(id)
    }

    pub fn result(&self, id: JobId) -> Option<AssessmentResult> {
        self.inner.jobs.result(id)
    }

    pub fn jobs_for(&self, athlete: AthleteId) -> Vec<DiagnosticJob> {
        self.inner.jobs.jobs_for(athlete)
    }

    pub fn profile(&self, athlete: AthleteId) -> Option<AnthropometryProfile> {
        self.inner.profiles.get(athlete)
    }

    pub fn set_stated_height(&self, athlete: AthleteId, height_cm: f64) -> Result<(), CalibrationError> {
        self.inner.profiles.set_stated_height(athlete, height_cm)
    }

    pub fn set_manual_limbs(&self, athlete: AthleteId, thigh_cm: f64, shin_cm: f64) -> Result<(), CalibrationError> {
        self.inner.profiles.set_manual_limbs(athlete, thigh_cm, shin_cm)
    }

    pub fn ledger(&self) -> &L {
        &self.inner.ledger
    }

    pub fn artifacts(&self) -> &A {
        &self.inner.artifacts
    }

    pub fn calculators(&self) -> &CalculatorTable {
        &self.inner.calculators
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CollaboratorError, InMemoryArtifactStore, InMemoryLedger, FailureKind};
    use kinemetric_core::{Landmark, LandmarkName, Side};

    struct FixedPose(Vec<LandmarkFrame>);

    impl PoseEstimator for FixedPose {
        async fn estimate(&self, _video: &VideoRef) -> Result<Vec<LandmarkFrame>, CollaboratorError> {
            Ok(self.0.clone())
        }
    }

    struct BrokenPose;

    impl PoseEstimator for BrokenPose {
        async fn estimate(&self, video: &VideoRef) -> Result<Vec<LandmarkFrame>, CollaboratorError> {
            Err(CollaboratorError::VideoNotFound(video.to_string()))
        }
    }

    fn standing() -> Vec<LandmarkFrame> {
        (0..5)
            .map(|i| {
                let mut f = LandmarkFrame::new(i).with(LandmarkName::Nose, Landmark::new(0.5, 0.05, 0.0, 0.99));
                for (side, x) in [(Side::Left, 0.45), (Side::Right, 0.55)] {
                    f.insert(LandmarkName::shoulder(side), Landmark::new(x, 0.2, 0.0, 0.9));
                    f.insert(LandmarkName::hip(side), Landmark::new(x, 0.5, 0.0, 0.9));
                    f.insert(LandmarkName::knee(side), Landmark::new(x, 0.7, 0.0, 0.9));
                    f.insert(LandmarkName::ankle(side), Landmark::new(x, 0.9, 0.0, 0.9));
                    f.insert(LandmarkName::heel(side), Landmark::new(x, 0.92, 0.0, 0.9));
                }
                f
            })
            .collect()
    }

    fn orchestrator<P: PoseEstimator>(pose: P) -> Orchestrator<P, InMemoryLedger, InMemoryArtifactStore> {
        Orchestrator::new(
            &RuntimeConfig::default(),
            pose,
            InMemoryLedger::new(),
            InMemoryArtifactStore::new(),
        )
    }

    #[tokio::test]
    async fn test_posture_completes() {
        let orch = orchestrator(FixedPose(standing()));
        let athlete = AthleteId::new(1);
        orch.ledger().deposit(athlete, 1);

        let job = orch
            .submit_and_run(athlete, AssessmentType::Posture, VideoRef::new("mem://p"))
            .await
            .unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(orch.ledger().get_balance(athlete), 0);
        let result = orch.result(job.id).unwrap();
        assert!(result.composite().unwrap() > 90.0);
        assert!(orch.artifacts().get(&result.report).is_some());
        assert!(!job.calibration.unwrap().calibrated);
    }

    #[tokio::test]
    async fn test_insufficient_balance() {
        let orch = orchestrator(FixedPose(standing()));
        let athlete = AthleteId::new(2);
        let job = orch
            .submit(athlete, AssessmentType::Squat, VideoRef::new("mem://s"))
            .unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.failure, Some(FailureKind::InsufficientBalance));
        assert!(job.queued_at.is_none());
        assert_eq!(orch.ledger().get_balance(athlete), 0);
        assert!(orch.run_job(job.id).await.is_err());
    }

    #[tokio::test]
    async fn test_collaborator_failure_refunds() {
        let orch = orchestrator(BrokenPose);
        let athlete = AthleteId::new(3);
        orch.ledger().deposit(athlete, 2);

        let job = orch
            .submit_and_run(athlete, AssessmentType::Squat, VideoRef::new("mem://missing"))
            .await
            .unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.failure, Some(FailureKind::Collaborator));
        assert!(job.refunded);
        assert_eq!(orch.ledger().get_balance(athlete), 2);
        assert!(orch.result(job.id).is_none());
    }

    #[tokio::test]
    async fn test_calibration_updates_profile() {
        let orch = orchestrator(FixedPose(standing()));
        let athlete = AthleteId::new(4);
        orch.ledger().deposit(athlete, 2);
        orch.set_stated_height(athlete, 180.0).unwrap();

        let job = orch
            .submit_and_run(athlete, AssessmentType::AnthropometryCalibration, VideoRef::new("mem://c"))
            .await
            .unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        let profile = orch.profile(athlete).unwrap();
        assert_eq!(profile.source_job, Some(job.id));
        assert!(profile.general_factor.is_some());

        let squat = orch
            .submit_and_run(athlete, AssessmentType::Squat, VideoRef::new("mem://s"))
            .await
            .unwrap();
        assert!(squat.calibration.unwrap().calibrated);
    }

    #[tokio::test]
    async fn test_dispatch() {
        let orch = orchestrator(FixedPose(standing()));
        let athlete = AthleteId::new(5);
        orch.ledger().deposit(athlete, 2);
        let (left, right) = orch
            .submit_paired_stance(athlete, VideoRef::new("mem://l"), VideoRef::new("mem://r"))
            .unwrap();
        assert_eq!(orch.ledger().get_balance(athlete), 0);
        assert_eq!(left.paired_with, Some(right.id));

        let a = orch.dispatch(left.id);
        let b = orch.dispatch(right.id);
        assert_eq!(a.await.unwrap().unwrap().status, JobStatus::Completed);
        assert_eq!(b.await.unwrap().unwrap().status, JobStatus::Completed);
        assert_eq!(orch.jobs_for(athlete).len(), 2);
    }
}
