//! Calibration engine
//!
//! Produces the scale factors a job's metric calculators apply to raw pose
//! coordinates. Every estimate degrades to a documented default instead of
//! failing; implausible factors are replaced by 1.0 and the run is flagged
//! as uncalibrated.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use kinemetric_core::{distance, LandmarkFrame, LandmarkName, Point3, Side};

use crate::{
    check_capture_quality, measure_segments, AnthropometryProfile, CalibrationConfig, QualityIssue,
    SegmentMeasurement,
};

/// Reason a run proceeds without a real-world scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum CalibrationFallback {
    /// No stored factor, stated height or manual limb lengths to derive one from
    NoReferenceHeight,
    /// A computed factor fell outside the validity band
    OutOfBand { factor: f64 },
}

/// Factors a calculator actually uses
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AppliedCalibration {
    /// Whole-body factor
    pub general: f64,
    /// Lower-limb factor
    pub limb: f64,
    /// False when any factor was replaced by a fallback
    pub calibrated: bool,
    pub fallback: Option<CalibrationFallback>,
    /// Centimeters per pose unit
    pub pose_unit_cm: f64,
}

impl AppliedCalibration {
    /// A trusted calibration
    pub fn new(general: f64, limb: f64, pose_unit_cm: f64) -> Self {
        Self {
            general,
            limb,
            calibrated: true,
            fallback: None,
            pose_unit_cm,
        }
    }

    /// Identity scale flagged as uncalibrated
    pub fn uncalibrated(reason: CalibrationFallback, pose_unit_cm: f64) -> Self {
        Self {
            general: 1.0,
            limb: 1.0,
            calibrated: false,
            fallback: Some(reason),
            pose_unit_cm,
        }
    }

    /// Extra correction for lower-limb coordinates already scaled by `general`
    pub fn lower_limb_correction(&self) -> f64 {
        self.limb / self.general
    }

    /// Convert a scaled pose-unit length to centimeters
    #[inline]
    pub fn to_cm(&self, units: f64) -> f64 {
        units * self.pose_unit_cm
    }
}

impl Default for AppliedCalibration {
    fn default() -> Self {
        AppliedCalibration::uncalibrated(
            CalibrationFallback::NoReferenceHeight,
            CalibrationConfig::default().pose_unit_cm,
        )
    }
}

/// Body height measured from video
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeightEstimate {
    /// Estimated height in centimeters
    pub raw_cm: f64,
    /// False when the default height was substituted
    pub measured: bool,
    /// Frame the estimate was taken on
    pub frame_index: Option<usize>,
}

/// Full output of a calibration run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationReport {
    pub height: HeightEstimate,
    pub stated_height_cm: Option<f64>,
    /// General factor before band validation
    pub general_factor: f64,
    /// Limb factor before band validation
    pub limb_factor: f64,
    pub applied: AppliedCalibration,
    pub segments: Vec<SegmentMeasurement>,
    pub quality_issues: Vec<QualityIssue>,
}

/// Computes general and limb calibration factors
#[derive(Debug, Clone, Default)]
pub struct CalibrationEngine {
    config: CalibrationConfig,
}

impl CalibrationEngine {
    pub fn new(config: CalibrationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// Frame used for static measurements: the middle frame when it shows
    /// head and heels, else the first frame that does, else the middle one.
    pub fn reference_frame<'a>(&self, frames: &'a [LandmarkFrame]) -> Option<&'a LandmarkFrame> {
        let middle = frames.get(frames.len() / 2)?;
        if height_units(middle).is_some() {
            return Some(middle);
        }
        frames
            .iter()
            .find(|f| height_units(f).is_some())
            .or(Some(middle))
    }

    /// Head-to-heel height estimate, defaulting when landmarks are missing
    pub fn estimate_height(&self, frames: &[LandmarkFrame]) -> HeightEstimate {
        let reference = self.reference_frame(frames);
        match reference.and_then(height_units) {
            Some(units) => HeightEstimate {
                raw_cm: units * self.config.pose_unit_cm,
                measured: true,
                frame_index: reference.map(|f| f.index),
            },
            None => HeightEstimate {
                raw_cm: self.config.default_height_cm,
                measured: false,
                frame_index: None,
            },
        }
    }

    /// Stated height ÷ estimated height, blending the two when a stated
    /// height exists. Without one the factor is 1.0.
    pub fn general_factor(&self, stated_height_cm: Option<f64>, estimate: &HeightEstimate) -> f64 {
        let raw = estimate.raw_cm;
        match self.config.usable_stated_height(stated_height_cm) {
            Some(stated) if raw > 0.0 => {
                let effective = raw + self.config.stated_height_weight * (stated - raw);
                effective / raw
            }
            _ => 1.0,
        }
    }

    /// Mean thigh+shin length over the visible sides of a frame, in pose units
    pub fn estimate_leg_units(&self, frame: &LandmarkFrame) -> Option<f64> {
        let lengths: Vec<f64> = [Side::Left, Side::Right]
            .iter()
            .filter_map(|&side| {
                let hip = frame.get(LandmarkName::hip(side))?;
                let knee = frame.get(LandmarkName::knee(side))?;
                let ankle = frame.get(LandmarkName::ankle(side))?;
                Some(distance(hip, knee) + distance(knee, ankle))
            })
            .filter(|len| *len > 0.0)
            .collect();

        if lengths.is_empty() {
            None
        } else {
            Some(lengths.iter().sum::<f64>() / lengths.len() as f64)
        }
    }

    /// Manual leg length ÷ raw estimated leg length; the general factor
    /// when either side of the ratio is unknown.
    pub fn limb_factor(&self, general: f64, manual_leg_cm: Option<f64>, leg_units: Option<f64>) -> f64 {
        match (manual_leg_cm, leg_units) {
            (Some(manual), Some(units)) if units > 0.0 => manual / (units * self.config.pose_unit_cm),
            _ => general,
        }
    }

    /// Apply the validity band to a factor pair
    pub fn finalize(&self, general: f64, limb: f64) -> AppliedCalibration {
        let mut applied = AppliedCalibration::new(general, limb, self.config.pose_unit_cm);

        if !self.config.in_band(general) {
            warn!(factor = general, "general calibration factor out of band; using 1.0");
            applied.general = 1.0;
            applied.calibrated = false;
            applied.fallback = Some(CalibrationFallback::OutOfBand { factor: general });
        }
        if !self.config.in_band(limb) {
            warn!(factor = limb, "limb calibration factor out of band; using 1.0");
            applied.limb = 1.0;
            applied.calibrated = false;
            if applied.fallback.is_none() {
                applied.fallback = Some(CalibrationFallback::OutOfBand { factor: limb });
            }
        }
        applied
    }

    /// Run a full calibration over a frame sequence
    pub fn calibrate(
        &self,
        frames: &[LandmarkFrame],
        profile: Option<&AnthropometryProfile>,
    ) -> CalibrationReport {
        let stated = profile.and_then(|p| p.stated_height_cm);
        let manual_leg = profile.and_then(|p| p.manual_leg_cm());

        let height = self.estimate_height(frames);
        let general = self.general_factor(stated, &height);
        let reference = self.reference_frame(frames);
        let leg_units = reference.and_then(|f| self.estimate_leg_units(f));
        let limb = self.limb_factor(general, manual_leg, leg_units);
        let mut applied = self.finalize(general, limb);
        let stated = self.config.usable_stated_height(stated);
        let limb_measured = manual_leg.is_some() && leg_units.is_some_and(|u| u > 0.0);
        if stated.is_none() && !limb_measured && applied.fallback.is_none() {
            applied.calibrated = false;
            applied.fallback = Some(CalibrationFallback::NoReferenceHeight);
        }

        let segments = reference
            .map(|f| measure_segments(f, applied.general, applied.limb, self.config.pose_unit_cm))
            .unwrap_or_default();
        let quality_issues = check_capture_quality(reference, &self.config);

        debug!(
            height_cm = height.raw_cm,
            measured = height.measured,
            general,
            limb,
            issues = quality_issues.len(),
            "calibration computed"
        );

        CalibrationReport {
            height,
            stated_height_cm: stated,
            general_factor: general,
            limb_factor: limb,
            applied,
            segments,
            quality_issues,
        }
    }

    /// Factors for a scored job.
    ///
    /// Stored profile factors win; otherwise a stated height or manual limb
    /// lengths let the job calibrate from its own frames; otherwise the run
    /// is uncalibrated.
    pub fn resolve(
        &self,
        profile: Option<&AnthropometryProfile>,
        frames: &[LandmarkFrame],
    ) -> AppliedCalibration {
        if let Some(profile) = profile {
            if let Some(general) = profile.general_factor {
                let limb = profile.limb_factor.unwrap_or(general);
                return self.finalize(general, limb);
            }
            let stated = self.config.usable_stated_height(profile.stated_height_cm);
            if stated.is_some() || profile.manual_leg_cm().is_some() {
                return self.calibrate(frames, Some(profile)).applied;
            }
        }
        AppliedCalibration::uncalibrated(
            CalibrationFallback::NoReferenceHeight,
            self.config.pose_unit_cm,
        )
    }
}

/// Vertical nose-to-heel distance, heels averaged when both are visible
fn height_units(frame: &LandmarkFrame) -> Option<f64> {
    let head = frame.get(LandmarkName::Nose)?;
    let heel_y = match (
        frame.get(LandmarkName::LeftHeel),
        frame.get(LandmarkName::RightHeel),
    ) {
        (Some(l), Some(r)) => (l.y + r.y) / 2.0,
        (Some(p), None) | (None, Some(p)) => p.y,
        (None, None) => return None,
    };
    let units = (head.y - heel_y).abs();
    (units.is_finite() && units > 0.0).then_some(units)
}

/// Scale a point by a calibration factor
#[inline]
pub fn scale(point: Point3, factor: f64) -> Point3 {
    point * factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinemetric_core::Landmark;

    fn standing(index: usize, height_units: f64) -> LandmarkFrame {
        LandmarkFrame::new(index)
            .with(LandmarkName::Nose, Landmark::new(0.5, 0.0, 0.0, 0.99))
            .with(LandmarkName::LeftHeel, Landmark::new(0.45, height_units, 0.0, 0.9))
            .with(LandmarkName::RightHeel, Landmark::new(0.55, height_units, 0.0, 0.9))
            .with(LandmarkName::LeftHip, Landmark::new(0.45, 0.9, 0.0, 0.9))
            .with(LandmarkName::LeftKnee, Landmark::new(0.45, 1.3, 0.0, 0.9))
            .with(LandmarkName::LeftAnkle, Landmark::new(0.45, 1.7, 0.0, 0.9))
    }

    fn profile(stated: Option<f64>) -> AnthropometryProfile {
        AnthropometryProfile {
            stated_height_cm: stated,
            ..Default::default()
        }
    }

    #[test]
    fn test_matching_height_is_identity() {
        let engine = CalibrationEngine::default();
        let frames = vec![standing(0, 1.75), standing(1, 1.75), standing(2, 1.75)];
        let report = engine.calibrate(&frames, Some(&profile(Some(175.0))));
        assert_eq!(report.height.raw_cm, 175.0);
        assert_eq!(report.general_factor, 1.0);
        assert_eq!(report.applied.general, 1.0);
        assert!(report.applied.calibrated);
    }

    #[test]
    fn test_blend_toward_stated() {
        let engine = CalibrationEngine::default();
        let frames = vec![standing(0, 1.5)];
        let report = engine.calibrate(&frames, Some(&profile(Some(180.0))));
        // effective = 150 + 0.8 * 30 = 174
        assert!((report.general_factor - 174.0 / 150.0).abs() < 1e-12);
    }

    #[test]
    fn test_missing_landmarks_default_height() {
        let engine = CalibrationEngine::default();
        let frames = vec![LandmarkFrame::new(0)];
        let estimate = engine.estimate_height(&frames);
        assert!(!estimate.measured);
        assert_eq!(estimate.raw_cm, 175.0);
        assert!(engine.estimate_height(&[]).raw_cm == 175.0);
    }

    #[test]
    fn test_single_heel_fallback() {
        let frame = LandmarkFrame::new(0)
            .with(LandmarkName::Nose, Landmark::new(0.5, 0.1, 0.0, 0.9))
            .with(LandmarkName::RightHeel, Landmark::new(0.5, 1.7, 0.0, 0.9));
        let estimate = CalibrationEngine::default().estimate_height(&[frame]);
        assert!(estimate.measured);
        assert!((estimate.raw_cm - 160.0).abs() < 1e-9);
    }

    #[test]
    fn test_limb_factor_from_manual() {
        let engine = CalibrationEngine::default();
        // raw leg 0.8 units = 80 cm; manual 88 cm
        assert!((engine.limb_factor(1.0, Some(88.0), Some(0.8)) - 1.1).abs() < 1e-12);
        assert_eq!(engine.limb_factor(1.2, None, Some(0.8)), 1.2);
        assert_eq!(engine.limb_factor(1.2, Some(88.0), None), 1.2);
    }

    #[test]
    fn test_out_of_band_falls_back() {
        let engine = CalibrationEngine::default();
        let applied = engine.finalize(7.5, 1.1);
        assert_eq!(applied.general, 1.0);
        assert_eq!(applied.limb, 1.1);
        assert!(!applied.calibrated);
        assert_eq!(applied.fallback, Some(CalibrationFallback::OutOfBand { factor: 7.5 }));

        let applied = engine.finalize(1.0, 0.1);
        assert_eq!(applied.limb, 1.0);
        assert!(!applied.calibrated);
    }

    #[test]
    fn test_resolve_prefers_stored_factors() {
        let engine = CalibrationEngine::default();
        let mut p = profile(Some(180.0));
        p.general_factor = Some(1.2);
        let applied = engine.resolve(Some(&p), &[]);
        assert_eq!(applied.general, 1.2);
        assert_eq!(applied.limb, 1.2);
        assert!(applied.calibrated);

        let applied = engine.resolve(None, &[]);
        assert!(!applied.calibrated);
        assert_eq!(applied.fallback, Some(CalibrationFallback::NoReferenceHeight));
    }

    #[test]
    fn test_calibrate_without_height_is_flagged() {
        let engine = CalibrationEngine::default();
        let report = engine.calibrate(&[standing(0, 1.7)], None);
        assert_eq!(report.general_factor, 1.0);
        assert!(!report.applied.calibrated);
        assert!(report.quality_issues.iter().any(|i| matches!(i, QualityIssue::LowVisibility { .. })));
    }

    #[test]
    fn test_manual_limbs_calibrate_without_height() {
        let engine = CalibrationEngine::default();
        let mut p = profile(None);
        p.set_manual_limbs(48.0, 48.0).unwrap();
        let frames = vec![standing(0, 1.75)];

        // leg 0.8 units = 80 cm against 96 cm manual
        let applied = engine.resolve(Some(&p), &frames);
        assert_eq!(applied.general, 1.0);
        assert!((applied.limb - 1.2).abs() < 1e-12);
        assert!(applied.calibrated);
        assert_eq!(applied.fallback, None);

        let report = engine.calibrate(&frames, Some(&p));
        assert!(report.applied.calibrated);
        assert!((report.applied.limb - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_manual_limbs_without_leg_landmarks_stay_flagged() {
        let engine = CalibrationEngine::default();
        let mut p = profile(None);
        p.set_manual_limbs(48.0, 48.0).unwrap();
        let frames = vec![LandmarkFrame::new(0)];
        let applied = engine.resolve(Some(&p), &frames);
        assert!(!applied.calibrated);
        assert_eq!(applied.limb, 1.0);
        assert_eq!(applied.fallback, Some(CalibrationFallback::NoReferenceHeight));
    }

    #[test]
    fn test_identity_leaves_distances() {
        let applied = AppliedCalibration::new(1.0, 1.0, 100.0);
        let a = scale(Point3::new(0.1, 0.2, 0.3), applied.general);
        let b = scale(Point3::new(0.4, 0.6, 0.3), applied.general);
        assert_eq!(distance(a, b), distance(Point3::new(0.1, 0.2, 0.3), Point3::new(0.4, 0.6, 0.3)));
    }
}
