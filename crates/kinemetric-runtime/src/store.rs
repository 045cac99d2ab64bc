//! Job, result and profile storage

use std::collections::{BTreeMap, HashMap};

use parking_lot::{Mutex, RwLock};
use tracing::info;

use kinemetric_calibration::{AnthropometryProfile, CalibrationError};
use kinemetric_core::{AssessmentType, AthleteId, JobId};

use crate::{AssessmentResult, DiagnosticJob, FailureKind, JobError, JobResult, JobStatus, VideoRef};

#[derive(Debug)]
struct JobTable {
    next_id: JobId,
    jobs: BTreeMap<JobId, DiagnosticJob>,
    results: HashMap<JobId, AssessmentResult>,
}

/// Jobs and their results behind one lock
///
/// Completion (result insert + COMPLETED) and failure (FAILED + refund
/// claim) each happen in a single critical section, so a job is never
/// observed with a result and a FAILED status, or COMPLETED without one.
#[derive(Debug)]
pub struct JobStore {
    table: Mutex<JobTable>,
}

impl Default for JobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl JobStore {
    pub fn new() -> Self {
        Self {
            table: Mutex::new(JobTable {
                next_id: JobId::new(1),
                jobs: BTreeMap::new(),
                results: HashMap::new(),
            }),
        }
    }

    /// Create a PENDING job
    pub fn create(&self, athlete: AthleteId, assessment: AssessmentType, video: VideoRef) -> DiagnosticJob {
        let mut table = self.table.lock();
        let id = table.next_id;
        table.next_id = id.next();
        let job = DiagnosticJob::new(id, athlete, assessment, video);
        table.jobs.insert(id, job.clone());
        job
    }

    pub fn get(&self, id: JobId) -> Option<DiagnosticJob> {
        self.table.lock().jobs.get(&id).cloned()
    }

    pub fn result(&self, id: JobId) -> Option<AssessmentResult> {
        self.table.lock().results.get(&id).cloned()
    }

    /// Jobs for one athlete, oldest first
    pub fn jobs_for(&self, athlete: AthleteId) -> Vec<DiagnosticJob> {
        self.table
            .lock()
            .jobs
            .values()
            .filter(|j| j.athlete == athlete)
            .cloned()
            .collect()
    }

    /// Apply `f` to a job under the lock
    pub fn update<T>(&self, id: JobId, f: impl FnOnce(&mut DiagnosticJob) -> T) -> JobResult<T> {
        let mut table = self.table.lock();
        let job = table.jobs.get_mut(&id).ok_or(JobError::JobNotFound(id))?;
        Ok(f(job))
    }

    /// Validated status change
    pub fn transition(&self, id: JobId, to: JobStatus) -> JobResult<DiagnosticJob> {
        let mut table = self.table.lock();
        let job = table.jobs.get_mut(&id).ok_or(JobError::JobNotFound(id))?;
        transition_locked(job, to)?;
        Ok(job.clone())
    }

    /// QUEUED with the credits that were reserved for it
    pub fn mark_queued(&self, id: JobId, units: u32, paired_with: Option<JobId>) -> JobResult<DiagnosticJob> {
        let mut table = self.table.lock();
        let job = table.jobs.get_mut(&id).ok_or(JobError::JobNotFound(id))?;
        transition_locked(job, JobStatus::Queued)?;
        job.units_debited = units;
        job.paired_with = paired_with;
        Ok(job.clone())
    }

    /// Store the result and mark COMPLETED in one step
    pub fn complete(&self, id: JobId, result: AssessmentResult) -> JobResult<DiagnosticJob> {
        let mut table = self.table.lock();
        if table.results.contains_key(&id) {
            return Err(JobError::ResultAlreadyExists(id));
        }
        let job = table.jobs.get_mut(&id).ok_or(JobError::JobNotFound(id))?;
        transition_locked(job, JobStatus::Completed)?;
        let job = job.clone();
        table.results.insert(id, result);
        info!(job = %id, athlete = %job.athlete, "job completed");
        Ok(job)
    }

    /// Mark FAILED and claim the refund.
    ///
    /// Returns the units to refund: the debited amount the first time a
    /// refund is claimed for this job, `None` afterwards or when nothing
    /// was debited. Any partial result is discarded.
    pub fn fail_and_claim_refund(
        &self,
        id: JobId,
        kind: FailureKind,
        message: &str,
    ) -> JobResult<Option<u32>> {
        let mut table = self.table.lock();
        let JobTable { jobs, results, .. } = &mut *table;
        let job = jobs.get_mut(&id).ok_or(JobError::JobNotFound(id))?;
        if job.status != JobStatus::Failed {
            transition_locked(job, JobStatus::Failed)?;
            job.error = Some(message.to_string());
            job.failure = Some(kind);
            results.remove(&id);
        }
        if job.refunded || job.units_debited == 0 {
            return Ok(None);
        }
        job.refunded = true;
        Ok(Some(job.units_debited))
    }

    pub fn len(&self) -> usize {
        self.table.lock().jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.lock().jobs.is_empty()
    }
}

fn transition_locked(job: &mut DiagnosticJob, to: JobStatus) -> JobResult<()> {
    if !job.status.can_transition_to(to) {
        return Err(JobError::InvalidTransition {
            job: job.id,
            from: job.status,
            to,
        });
    }
    info!(job = %job.id, from = %job.status, to = %to, "job transition");
    job.set_status(to);
    Ok(())
}

/// At most one anthropometry profile per athlete
#[derive(Debug, Default)]
pub struct ProfileStore {
    profiles: RwLock<HashMap<AthleteId, AnthropometryProfile>>,
}

impl ProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, athlete: AthleteId) -> Option<AnthropometryProfile> {
        self.profiles.read().get(&athlete).cloned()
    }

    /// Mutate the athlete's profile, creating it on first use
    pub fn update<T>(&self, athlete: AthleteId, f: impl FnOnce(&mut AnthropometryProfile) -> T) -> T {
        let mut profiles = self.profiles.write();
        let profile = profiles
            .entry(athlete)
            .or_insert_with(|| AnthropometryProfile::new(athlete));
        f(profile)
    }

    pub fn set_stated_height(&self, athlete: AthleteId, height_cm: f64) -> Result<(), CalibrationError> {
        self.update(athlete, |p| p.set_stated_height(height_cm))
    }

    pub fn set_manual_limbs(&self, athlete: AthleteId, thigh_cm: f64, shin_cm: f64) -> Result<(), CalibrationError> {
        self.update(athlete, |p| p.set_manual_limbs(thigh_cm, shin_cm))
    }

    pub fn len(&self) -> usize {
        self.profiles.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.read().is_empty()
    }
}
