//! Athlete anthropometry profile

use serde::{Deserialize, Serialize};

use kinemetric_core::{AthleteId, JobId};

use crate::{CalibrationError, SegmentMeasurement};

/// Per-athlete body measurements and the most recent calibration
///
/// At most one exists per athlete. It is created lazily and updated in
/// place by calibration jobs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnthropometryProfile {
    pub athlete: AthleteId,
    /// Self-reported height
    pub stated_height_cm: Option<f64>,
    /// Manually measured thigh length
    pub manual_thigh_cm: Option<f64>,
    /// Manually measured shin length
    pub manual_shin_cm: Option<f64>,
    /// Most recent general factor
    pub general_factor: Option<f64>,
    /// Most recent limb factor
    pub limb_factor: Option<f64>,
    /// Calibration job that produced the factors
    pub source_job: Option<JobId>,
    /// Segment lengths from the last calibration
    #[serde(default)]
    pub segments: Vec<SegmentMeasurement>,
}

impl AnthropometryProfile {
    pub fn new(athlete: AthleteId) -> Self {
        Self {
            athlete,
            ..Default::default()
        }
    }

    /// Set the self-reported height
    pub fn set_stated_height(&mut self, height_cm: f64) -> Result<(), CalibrationError> {
        if !height_cm.is_finite() || height_cm <= 0.0 {
            return Err(CalibrationError::InvalidHeight(height_cm));
        }
        self.stated_height_cm = Some(height_cm);
        Ok(())
    }

    /// Set manual lower-limb measurements
    pub fn set_manual_limbs(&mut self, thigh_cm: f64, shin_cm: f64) -> Result<(), CalibrationError> {
        for (segment, value) in [("thigh", thigh_cm), ("shin", shin_cm)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(CalibrationError::InvalidLimbLength { segment, value });
            }
        }
        self.manual_thigh_cm = Some(thigh_cm);
        self.manual_shin_cm = Some(shin_cm);
        Ok(())
    }

    /// Manual thigh+shin length, only when both were measured
    pub fn manual_leg_cm(&self) -> Option<f64> {
        Some(self.manual_thigh_cm? + self.manual_shin_cm?)
    }

    /// Record the outcome of a calibration job
    pub fn record_calibration(
        &mut self,
        job: JobId,
        general: f64,
        limb: Option<f64>,
        segments: Vec<SegmentMeasurement>,
    ) {
        self.general_factor = Some(general);
        self.limb_factor = limb;
        self.source_job = Some(job);
        self.segments = segments;
    }
}
