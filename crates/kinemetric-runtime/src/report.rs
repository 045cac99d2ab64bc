//! Assessment result and report assembly

use std::collections::BTreeMap;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use kinemetric_calibration::CalibrationReport;
use kinemetric_core::{AssessmentType, AthleteId, JobId, LandmarkFrame, Side};
use kinemetric_metrics::MeasurementResult;

use crate::{ArtifactRef, ArtifactStore, DiagnosticJob, JobError, JobResult};

/// Headline scores, typed per assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Headline {
    Squat {
        composite: f64,
        min_knee_angle: Option<f64>,
        max_trunk_lean: Option<f64>,
    },
    Posture {
        composite: f64,
        avg_shoulder_tilt: Option<f64>,
        avg_hip_tilt: Option<f64>,
    },
    ShoulderCircumduction {
        composite: f64,
        max_elevation_left: Option<f64>,
        max_elevation_right: Option<f64>,
    },
    SingleLegStance {
        side: Side,
        composite: f64,
        sway_cm: Option<f64>,
        max_pelvic_drop: Option<f64>,
        stance_time: Option<f64>,
    },
    VerticalJump {
        composite: f64,
        jump_height_cm: Option<f64>,
        landing_control: Option<f64>,
    },
    Calibration {
        general_factor: f64,
        limb_factor: f64,
        calibrated: bool,
        estimated_height_cm: f64,
    },
}

impl Headline {
    /// Headline for a scored result; calibrations go through `from_calibration`
    pub fn from_measurement(result: &MeasurementResult) -> Option<Self> {
        let composite = result.composite;
        let m = |name: &str| result.measurement(name);
        let headline = match result.assessment {
            AssessmentType::Squat => Headline::Squat {
                composite,
                min_knee_angle: m("min_knee_angle"),
                max_trunk_lean: m("max_trunk_lean"),
            },
            AssessmentType::Posture => Headline::Posture {
                composite,
                avg_shoulder_tilt: m("avg_shoulder_tilt"),
                avg_hip_tilt: m("avg_hip_tilt"),
            },
            AssessmentType::ShoulderCircumduction => Headline::ShoulderCircumduction {
                composite,
                max_elevation_left: m("max_elevation_left"),
                max_elevation_right: m("max_elevation_right"),
            },
            AssessmentType::SingleLegStanceLeft | AssessmentType::SingleLegStanceRight => {
                Headline::SingleLegStance {
                    side: result.assessment.stance_side().unwrap_or(Side::Left),
                    composite,
                    sway_cm: m("sway"),
                    max_pelvic_drop: m("max_pelvic_drop"),
                    stance_time: m("stance_time"),
                }
            }
            AssessmentType::VerticalJump => Headline::VerticalJump {
                composite,
                jump_height_cm: m("jump_height"),
                landing_control: result.sub_score("landing_control"),
            },
            AssessmentType::AnthropometryCalibration => return None,
        };
        Some(headline)
    }

    /// Headline for a calibration run
    pub fn from_calibration(report: &CalibrationReport) -> Self {
        Headline::Calibration {
            general_factor: report.applied.general,
            limb_factor: report.applied.limb,
            calibrated: report.applied.calibrated,
            estimated_height_cm: report.height.raw_cm,
        }
    }

    /// Composite score, absent for calibrations
    pub fn composite(&self) -> Option<f64> {
        match *self {
            Headline::Squat { composite, .. }
            | Headline::Posture { composite, .. }
            | Headline::ShoulderCircumduction { composite, .. }
            | Headline::SingleLegStance { composite, .. }
            | Headline::VerticalJump { composite, .. } => Some(composite),
            Headline::Calibration { .. } => None,
        }
    }
}

/// Result record of a completed job; immutable once stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub job: JobId,
    pub athlete: AthleteId,
    pub assessment: AssessmentType,
    pub headline: Headline,
    /// Full calculator or calibration output
    pub raw: serde_json::Value,
    pub report: ArtifactRef,
    /// Snapshot references by representative-frame label
    pub snapshots: BTreeMap<String, ArtifactRef>,
    pub created_at: DateTime<Utc>,
}

impl AssessmentResult {
    pub fn composite(&self) -> Option<f64> {
        self.headline.composite()
    }
}

/// Turns calculator output into stored artifacts and a result record
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportAssembler;

impl ReportAssembler {
    pub fn new() -> Self {
        ReportAssembler
    }

    /// Assemble a scored assessment
    pub fn assemble<A: ArtifactStore + ?Sized>(
        &self,
        job: &DiagnosticJob,
        frames: &[LandmarkFrame],
        result: &MeasurementResult,
        store: &A,
    ) -> JobResult<AssessmentResult> {
        let headline = Headline::from_measurement(result).ok_or_else(|| {
            JobError::Computation(format!("{} is not a scored assessment", result.assessment))
        })?;
        let mut snapshots = BTreeMap::new();
        for rep in &result.representative_frames {
            let Some(frame) = frames.get(rep.position) else {
                continue;
            };
            let snapshot = json!({
                "job": job.id,
                "label": rep.label,
                "frame_index": rep.frame_index,
                "value": rep.value,
                "landmarks": frame.landmarks,
            });
            let reference = store_json(store, &snapshot_key(job.id, &rep.label), &snapshot)?;
            snapshots.insert(rep.label.clone(), reference);
        }

        let raw = result.to_json();
        self.finish(job, headline, raw, snapshots, store)
    }

    /// Assemble a calibration run
    pub fn assemble_calibration<A: ArtifactStore + ?Sized>(
        &self,
        job: &DiagnosticJob,
        frames: &[LandmarkFrame],
        report: &CalibrationReport,
        store: &A,
    ) -> JobResult<AssessmentResult> {
        let mut snapshots = BTreeMap::new();
        let reference_frame = report
            .height
            .frame_index
            .and_then(|index| frames.iter().find(|f| f.index == index));
        if let Some(frame) = reference_frame {
            let label = "reference_frame";
            let snapshot = json!({
                "job": job.id,
                "label": label,
                "frame_index": frame.index,
                "value": report.height.raw_cm,
                "landmarks": frame.landmarks,
            });
            let reference = store_json(store, &snapshot_key(job.id, label), &snapshot)?;
            snapshots.insert(label.to_string(), reference);
        }

        let raw = serde_json::to_value(report).map_err(|e| JobError::Computation(e.to_string()))?;
        self.finish(job, Headline::from_calibration(report), raw, snapshots, store)
    }

    fn finish<A: ArtifactStore + ?Sized>(
        &self,
        job: &DiagnosticJob,
        headline: Headline,
        raw: serde_json::Value,
        snapshots: BTreeMap<String, ArtifactRef>,
        store: &A,
    ) -> JobResult<AssessmentResult> {
        let document = json!({
            "job": job.id,
            "athlete": job.athlete,
            "assessment": job.assessment,
            "video": job.video,
            "headline": headline,
            "result": raw,
            "snapshots": snapshots,
        });
        let report = store_json(store, &format!("jobs/{}/report.json", job.id.0), &document)?;
        debug!(job = %job.id, snapshots = snapshots.len(), size = report.size, "report stored");

        Ok(AssessmentResult {
            job: job.id,
            athlete: job.athlete,
            assessment: job.assessment,
            headline,
            raw,
            report,
            snapshots,
            created_at: Utc::now(),
        })
    }
}

fn snapshot_key(job: JobId, label: &str) -> String {
    format!("jobs/{}/snapshots/{}.json", job.0, label)
}

fn store_json<A: ArtifactStore + ?Sized>(
    store: &A,
    key: &str,
    value: &serde_json::Value,
) -> JobResult<ArtifactRef> {
    let body = serde_json::to_vec(value).map_err(|e| JobError::Computation(e.to_string()))?;
    store.put(key, Bytes::from(body)).map_err(JobError::Artifact)
}
